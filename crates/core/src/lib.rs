//! Autopeças Core - Shared types library.
//!
//! This crate provides the types shared by every Autopeças component:
//! - `client` - Typed HTTP client for the storefront/admin REST backend
//! - `cli` - Maintenance programs (migrations, seed data, URL patches)
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP clients. Database encoding for the ID newtypes
//! is available behind the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, BRL prices, CPF/CNPJ tax IDs, emails and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
