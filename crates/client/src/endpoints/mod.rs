//! Endpoint groups, one `impl ApiClient` block per backend resource.
//!
//! | module | paths | token |
//! |--------|-------|-------|
//! | `catalog` | `/health`, `/products`, `/categories`, `/slides` | never |
//! | `account` | `/auth`, `/users/addresses` | after login |
//! | `cart` | `/cart` | always |
//! | `orders` | `/orders` | always |
//! | `checkout` | `/shipping/calculate`, `/coupons/validate` | coupons only |
//! | `admin` | `/admin` | always |

mod account;
mod admin;
mod cart;
mod catalog;
mod checkout;
mod orders;

use serde::Serialize;

/// `?limit=` query, omitted when unset.
#[derive(Debug, Clone, Copy, Serialize)]
pub(crate) struct Limit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// `?q=&limit=` search query.
#[derive(Debug, Clone, Copy, Serialize)]
pub(crate) struct Search<'a> {
    pub q: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Percent-encode a value for use as a single path segment.
pub(crate) fn segment(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_escapes_reserved_characters() {
        assert_eq!(segment("freios"), "freios");
        assert_eq!(segment("óleo e filtros"), "%C3%B3leo%20e%20filtros");
        assert_eq!(segment("a/b?c"), "a%2Fb%3Fc");
    }
}
