//! Autopeças Client - typed access to the storefront REST backend.
//!
//! # Overview
//!
//! [`ApiClient`] maps one method onto each backend endpoint: catalog, auth,
//! cart, orders, addresses, shipping, coupons, admin and payments. It keeps
//! a bearer token in a [`Session`] and unwraps the backend's
//! `{"success": true, "data": ...}` envelope.
//!
//! ```no_run
//! use autopecas_client::{ApiClient, LoginRequest, ProductQuery};
//! use autopecas_core::Email;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::from_env()?;
//!
//! let page = client.get_products(&ProductQuery::default()).await?;
//! println!("{} products", page.products.len());
//!
//! let email = Email::parse("cliente@exemplo.com")?;
//! client.login(&LoginRequest::new(email, "senha-secreta")).await?;
//! let cart = client.get_cart().await?;
//! println!("total: {}", cart.summary.display_total());
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`config`] - `AUTOPECAS_*` environment configuration
//! - [`session`] - Token stores and the session handed to the client
//! - [`envelope`] - Success/error envelope normalization
//! - [`types`] - Request and response records
//! - [`payments`] - Card/PIX payment routes and payload validation

#![cfg_attr(not(test), forbid(unsafe_code))]

mod client;
pub mod config;
mod endpoints;
pub mod envelope;
pub mod error;
pub mod payments;
pub mod session;
pub mod types;

pub use client::{Access, ApiClient};
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, Result};
pub use payments::{
    Identification, Payer, PaymentData, PaymentResponse, validate_payment_data,
};
pub use reqwest::Method;
pub use session::{FileTokenStore, MemoryTokenStore, Session, TokenStore, TokenStoreError};
pub use types::*;
