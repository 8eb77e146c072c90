//! Shopping cart.

use autopecas_core::{CartId, CartItemId, ProductId, format_currency};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The signed-in customer's cart.
///
/// `summary` is computed by the backend and used as sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(default)]
    pub id: Option<CartId>,
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub summary: CartSummary,
}

impl Cart {
    /// Whether the cart holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find the line for `product_id`.
    #[must_use]
    pub fn item_for(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }
}

/// One cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    pub product_id: ProductId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub quantity: u32,
    pub unit_price: Decimal,
    #[serde(default)]
    pub subtotal: Option<Decimal>,
    /// Units the backend still has in stock.
    #[serde(default)]
    pub stock: Option<i32>,
}

impl CartItem {
    /// Line total, as sent or `unit_price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.subtotal
            .unwrap_or_else(|| self.unit_price * Decimal::from(self.quantity))
    }
}

/// Totals for the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    #[serde(default)]
    pub subtotal: Decimal,
    #[serde(default)]
    pub shipping: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub total: Decimal,
    #[serde(default)]
    pub item_count: u32,
    #[serde(default)]
    pub free_shipping: bool,
}

impl CartSummary {
    /// Total formatted for display, e.g. `R$ 1.234,56`.
    #[must_use]
    pub fn display_total(&self) -> String {
        format_currency(self.total)
    }
}

/// Body of `POST /cart/items`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCart {
    pub product_id: ProductId,
    pub quantity: u32,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub(crate) struct QuantityUpdate {
    pub quantity: u32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_cart_decodes_backend_shape() {
        let cart: Cart = serde_json::from_value(json!({
            "id": 3,
            "items": [
                {"id": 10, "productId": 7, "name": "Amortecedor", "quantity": 2, "unitPrice": "250.00"},
                {"id": 11, "productId": 8, "quantity": 1, "unitPrice": 99.9, "subtotal": 99.9}
            ],
            "summary": {"subtotal": "599.90", "shipping": 0, "total": "599.90", "itemCount": 3, "freeShipping": true}
        }))
        .unwrap();

        assert_eq!(cart.items.len(), 2);
        assert_eq!(
            cart.item_for(ProductId::new(7)).unwrap().line_total(),
            "500.00".parse::<Decimal>().unwrap()
        );
        assert!(cart.summary.free_shipping);
        assert_eq!(cart.summary.item_count, 3);
        assert_eq!(cart.summary.display_total(), "R$\u{a0}599,90");
    }

    #[test]
    fn test_empty_cart_defaults() {
        let cart: Cart = serde_json::from_value(json!({})).unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.summary, CartSummary::default());
    }

    #[test]
    fn test_add_to_cart_body() {
        let body = AddToCart {
            product_id: ProductId::new(7),
            quantity: 2,
        };
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({"productId": 7, "quantity": 2})
        );
    }
}
