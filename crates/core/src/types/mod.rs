//! Core types for Autopeças.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod status;
pub mod tax_id;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CurrencyCode, Price, format_currency};
pub use status::*;
pub use tax_id::{Cnpj, Cpf, TaxId, TaxIdError, validate_cnpj, validate_cpf};
