//! Checkout and order history.

use tracing::{info, instrument};

use autopecas_core::OrderId;

use crate::client::{Access, ApiClient};
use crate::error::Result;
use crate::types::{CreateOrder, Order, OrderList, OrderQuery};

impl ApiClient {
    /// Turn the current cart into an order.
    ///
    /// # Errors
    ///
    /// Returns error if the cart is empty, stock ran out or the address is
    /// rejected.
    #[instrument(skip(self, order), fields(payment_method = %order.payment_method))]
    pub async fn create_order(&self, order: &CreateOrder) -> Result<Order> {
        let created: Order = self.post(Access::Authenticated, "/orders", order).await?;
        info!(order_id = %created.id, order_number = %created.order_number, "Order created");
        Ok(created)
    }

    /// The signed-in customer's orders.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_orders(&self, query: &OrderQuery) -> Result<OrderList> {
        self.get_query(Access::Authenticated, "/orders", query)
            .await
    }

    /// Get one of the customer's orders.
    ///
    /// # Errors
    ///
    /// Returns error if the order is not found.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get_order(&self, id: OrderId) -> Result<Order> {
        self.get(Access::Authenticated, &format!("/orders/{id}"))
            .await
    }

    /// Cancel an order that has not been paid or shipped.
    ///
    /// # Errors
    ///
    /// Returns error if the backend refuses the cancellation.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn cancel_order(&self, id: OrderId) -> Result<Order> {
        self.post(
            Access::Authenticated,
            &format!("/orders/{id}/cancel"),
            &serde_json::Map::new(),
        )
        .await
    }
}
