//! Orders and checkout.

use autopecas_core::{
    AddressId, OrderId, OrderStatus, PaymentMethodKind, PaymentStatus, ProductId,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Pagination, PostalAddress};

/// A placed order. Created by checkout and only changed by admins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub payment_method: Option<PaymentMethodKind>,
    #[serde(default)]
    pub subtotal: Option<Decimal>,
    #[serde(default)]
    pub shipping_cost: Option<Decimal>,
    #[serde(default)]
    pub discount: Option<Decimal>,
    pub total: Decimal,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub shipping_address: Option<PostalAddress>,
    #[serde(default)]
    pub tracking_code: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Whether the customer may still cancel the order.
    #[must_use]
    pub const fn is_cancellable(&self) -> bool {
        matches!(self.status, OrderStatus::Pending | OrderStatus::Confirmed)
            && !self.payment_status.is_paid()
    }
}

/// One order line, priced at checkout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    #[serde(default)]
    pub product_name: Option<String>,
    pub quantity: u32,
    pub unit_price: Decimal,
    #[serde(default)]
    pub subtotal: Option<Decimal>,
}

/// Body of `POST /orders`: turns the current cart into an order.
///
/// Either `address_id` or `shipping_address` names the destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrder {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_id: Option<AddressId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<PostalAddress>,
    pub payment_method: PaymentMethodKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Filters for order listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
}

/// One page of orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct OrderList {
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Body of `PUT /admin/orders/{id}/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_order_decodes() {
        let order: Order = serde_json::from_value(json!({
            "id": 42,
            "orderNumber": "AP-2024-000042",
            "status": "pending",
            "paymentStatus": "pending",
            "paymentMethod": "pix",
            "total": "349.80",
            "items": [{"productId": 7, "quantity": 2, "unitPrice": "174.90"}],
            "createdAt": "2024-05-01T12:30:00.000Z"
        }))
        .unwrap();
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.payment_method, Some(PaymentMethodKind::Pix));
        assert!(order.is_cancellable());
    }

    #[test]
    fn test_paid_order_not_cancellable() {
        let order: Order = serde_json::from_value(json!({
            "id": 1,
            "orderNumber": "AP-1",
            "status": "confirmed",
            "paymentStatus": "approved",
            "total": 10
        }))
        .unwrap();
        assert!(!order.is_cancellable());
    }

    #[test]
    fn test_query_serializes_status() {
        let query = OrderQuery {
            status: Some(OrderStatus::Shipped),
            ..OrderQuery::default()
        };
        assert_eq!(serde_json::to_value(query).unwrap(), json!({"status": "shipped"}));
    }
}
