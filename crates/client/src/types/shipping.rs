//! Shipping quotes.

use autopecas_core::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Body of `POST /shipping/calculate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingQuote {
    /// Destination CEP; punctuation is stripped before sending.
    pub zip_code: String,
    pub items: Vec<ShippingItem>,
}

impl ShippingQuote {
    /// Destination CEP as its 8 digits, `None` if it has any other length.
    #[must_use]
    pub fn normalized_zip_code(&self) -> Option<String> {
        let digits: String = self
            .zip_code
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        (digits.len() == 8).then_some(digits)
    }
}

/// A product and quantity to quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// One delivery option returned by the quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingOption {
    /// Service name, e.g. `PAC` or `SEDEX`.
    pub service: String,
    #[serde(default)]
    pub carrier: Option<String>,
    pub price: Decimal,
    /// Business days until delivery.
    #[serde(default)]
    pub delivery_days: Option<u32>,
    #[serde(default)]
    pub free: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_zip_code_normalization() {
        let mut quote = ShippingQuote {
            zip_code: "01310-100".to_string(),
            items: vec![],
        };
        assert_eq!(quote.normalized_zip_code().as_deref(), Some("01310100"));

        quote.zip_code = "0131".to_string();
        assert_eq!(quote.normalized_zip_code(), None);
    }

    #[test]
    fn test_option_decodes() {
        let option: ShippingOption = serde_json::from_str(
            r#"{"service": "SEDEX", "carrier": "Correios", "price": "42.10", "deliveryDays": 2}"#,
        )
        .unwrap();
        assert_eq!(option.delivery_days, Some(2));
        assert!(!option.free);
    }
}
