//! Request and response records exchanged with the backend.
//!
//! All records use camelCase field names on the wire. Money is
//! [`rust_decimal::Decimal`]; the backend sends it either as a JSON number or
//! as a numeric string, and both decode.

mod cart;
mod content;
mod coupon;
mod order;
mod product;
mod shipping;
mod user;

pub use cart::*;
pub use content::*;
pub use coupon::*;
pub use order::*;
pub use product::*;
pub use shipping::*;
pub use user::*;

use serde::{Deserialize, Serialize};

/// Page metadata attached to list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub total_pages: u32,
}

impl Pagination {
    /// Whether another page follows this one.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Reply to the health probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl Health {
    /// Whether the backend reported itself healthy.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

pub(crate) const fn default_true() -> bool {
    true
}
