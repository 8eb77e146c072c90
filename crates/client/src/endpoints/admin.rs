//! Back-office endpoints under `/admin`.
//!
//! The backend does not describe these responses, so they come back as
//! [`serde_json::Value`] with the success envelope already removed. Every
//! call is authenticated and needs an account with the admin role.

use serde_json::Value;
use tracing::{info, instrument};

use autopecas_core::{CategoryId, CouponId, OrderId, ProductId, SlideId};

use crate::client::{Access, ApiClient};
use crate::error::Result;
use crate::types::{
    CategoryInput, CouponInput, OrderQuery, OrderStatusUpdate, ProductInput, ProductQuery,
    SlideInput, UserQuery,
};

impl ApiClient {
    /// Sales, order and stock counters for the dashboard.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails or the account is not an admin.
    #[instrument(skip(self))]
    pub async fn get_dashboard(&self) -> Result<Value> {
        self.get(Access::Authenticated, "/admin/dashboard").await
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// All products, including inactive ones.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn admin_get_products(&self, query: &ProductQuery) -> Result<Value> {
        self.get_query(Access::Authenticated, "/admin/products", query)
            .await
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns error if the product is rejected.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn admin_create_product(&self, input: &ProductInput) -> Result<Value> {
        let created = self
            .post(Access::Authenticated, "/admin/products", input)
            .await?;
        info!("Product created");
        Ok(created)
    }

    /// Replace a product.
    ///
    /// # Errors
    ///
    /// Returns error if the product is not found or rejected.
    #[instrument(skip(self, input), fields(product_id = %id))]
    pub async fn admin_update_product(&self, id: ProductId, input: &ProductInput) -> Result<Value> {
        self.put(Access::Authenticated, &format!("/admin/products/{id}"), input)
            .await
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns error if the product is not found.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn admin_delete_product(&self, id: ProductId) -> Result<()> {
        self.delete(Access::Authenticated, &format!("/admin/products/{id}"))
            .await
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns error if the category is rejected (e.g. duplicate slug).
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn admin_create_category(&self, input: &CategoryInput) -> Result<Value> {
        self.post(Access::Authenticated, "/admin/categories", input)
            .await
    }

    /// Replace a category.
    ///
    /// # Errors
    ///
    /// Returns error if the category is not found or rejected.
    #[instrument(skip(self, input), fields(category_id = %id))]
    pub async fn admin_update_category(&self, id: CategoryId, input: &CategoryInput) -> Result<Value> {
        self.put(Access::Authenticated, &format!("/admin/categories/{id}"), input)
            .await
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns error if the category is not found or still has products.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn admin_delete_category(&self, id: CategoryId) -> Result<()> {
        self.delete(Access::Authenticated, &format!("/admin/categories/{id}"))
            .await
    }

    // =========================================================================
    // Slides
    // =========================================================================

    /// All slides, including inactive ones.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn admin_get_slides(&self) -> Result<Value> {
        self.get(Access::Authenticated, "/admin/slides").await
    }

    /// Create a slide.
    ///
    /// # Errors
    ///
    /// Returns error if the slide is rejected.
    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn admin_create_slide(&self, input: &SlideInput) -> Result<Value> {
        self.post(Access::Authenticated, "/admin/slides", input)
            .await
    }

    /// Replace a slide.
    ///
    /// # Errors
    ///
    /// Returns error if the slide is not found or rejected.
    #[instrument(skip(self, input), fields(slide_id = %id))]
    pub async fn admin_update_slide(&self, id: SlideId, input: &SlideInput) -> Result<Value> {
        self.put(Access::Authenticated, &format!("/admin/slides/{id}"), input)
            .await
    }

    /// Delete a slide.
    ///
    /// # Errors
    ///
    /// Returns error if the slide is not found.
    #[instrument(skip(self), fields(slide_id = %id))]
    pub async fn admin_delete_slide(&self, id: SlideId) -> Result<()> {
        self.delete(Access::Authenticated, &format!("/admin/slides/{id}"))
            .await
    }

    // =========================================================================
    // Coupons
    // =========================================================================

    /// All coupons.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn admin_get_coupons(&self) -> Result<Value> {
        self.get(Access::Authenticated, "/admin/coupons").await
    }

    /// Create a coupon.
    ///
    /// # Errors
    ///
    /// Returns error if the coupon is rejected (e.g. duplicate code).
    #[instrument(skip(self, input), fields(code = %input.code))]
    pub async fn admin_create_coupon(&self, input: &CouponInput) -> Result<Value> {
        self.post(Access::Authenticated, "/admin/coupons", input)
            .await
    }

    /// Replace a coupon.
    ///
    /// # Errors
    ///
    /// Returns error if the coupon is not found or rejected.
    #[instrument(skip(self, input), fields(coupon_id = %id))]
    pub async fn admin_update_coupon(&self, id: CouponId, input: &CouponInput) -> Result<Value> {
        self.put(Access::Authenticated, &format!("/admin/coupons/{id}"), input)
            .await
    }

    /// Delete a coupon.
    ///
    /// # Errors
    ///
    /// Returns error if the coupon is not found.
    #[instrument(skip(self), fields(coupon_id = %id))]
    pub async fn admin_delete_coupon(&self, id: CouponId) -> Result<()> {
        self.delete(Access::Authenticated, &format!("/admin/coupons/{id}"))
            .await
    }

    // =========================================================================
    // Orders and users
    // =========================================================================

    /// Every customer's orders.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn admin_get_orders(&self, query: &OrderQuery) -> Result<Value> {
        self.get_query(Access::Authenticated, "/admin/orders", query)
            .await
    }

    /// Move an order to a new status, optionally with a tracking code.
    ///
    /// # Errors
    ///
    /// Returns error if the order is not found or the transition is refused.
    #[instrument(skip(self, update), fields(order_id = %id, status = %update.status))]
    pub async fn update_order_status(&self, id: OrderId, update: &OrderStatusUpdate) -> Result<Value> {
        let updated = self
            .put(Access::Authenticated, &format!("/admin/orders/{id}/status"), update)
            .await?;
        info!("Order status updated");
        Ok(updated)
    }

    /// Registered accounts.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn admin_get_users(&self, query: &UserQuery) -> Result<Value> {
        self.get_query(Access::Authenticated, "/admin/users", query)
            .await
    }
}
