//! Shopping cart.

use tracing::instrument;

use autopecas_core::CartItemId;

use crate::client::{Access, ApiClient};
use crate::error::{ApiError, Result};
use crate::types::{AddToCart, Cart, QuantityUpdate};

impl ApiClient {
    /// The signed-in customer's cart.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_cart(&self) -> Result<Cart> {
        self.get(Access::Authenticated, "/cart").await
    }

    /// Add a product, merging with an existing line for the same product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` for a zero quantity, or the
    /// backend's error (e.g. insufficient stock).
    #[instrument(skip(self))]
    pub async fn add_to_cart(&self, item: &AddToCart) -> Result<Cart> {
        if item.quantity == 0 {
            return Err(ApiError::InvalidRequest(
                "quantity must be at least 1".to_string(),
            ));
        }
        self.post(Access::Authenticated, "/cart/items", item).await
    }

    /// Set the quantity of a cart line.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` for a zero quantity (use
    /// [`ApiClient::remove_cart_item`]), or the backend's error.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn update_cart_item(&self, item_id: CartItemId, quantity: u32) -> Result<Cart> {
        if quantity == 0 {
            return Err(ApiError::InvalidRequest(
                "quantity must be at least 1".to_string(),
            ));
        }
        self.put(
            Access::Authenticated,
            &format!("/cart/items/{item_id}"),
            &QuantityUpdate { quantity },
        )
        .await
    }

    /// Remove a cart line.
    ///
    /// # Errors
    ///
    /// Returns error if the line is not found.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn remove_cart_item(&self, item_id: CartItemId) -> Result<()> {
        self.delete(Access::Authenticated, &format!("/cart/items/{item_id}"))
            .await
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<()> {
        self.delete(Access::Authenticated, "/cart").await
    }
}
