//! Public catalog: health, products, categories and slides.

use tracing::instrument;

use autopecas_core::ProductId;

use super::{Limit, Search, segment};
use crate::client::{Access, ApiClient};
use crate::error::Result;
use crate::types::{Category, Health, Product, ProductList, ProductQuery, Slide};

impl ApiClient {
    /// Probe `GET /health`.
    ///
    /// # Errors
    ///
    /// Returns error if the backend is unreachable or unhealthy.
    #[instrument(skip(self))]
    pub async fn health(&self) -> Result<Health> {
        self.get(Access::Public, "/health").await
    }

    /// List products matching `query`.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_products(&self, query: &ProductQuery) -> Result<ProductList> {
        self.get_query(Access::Public, "/products", query).await
    }

    /// Get a single product.
    ///
    /// # Errors
    ///
    /// Returns error if the product is not found or the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product> {
        self.get(Access::Public, &format!("/products/{id}")).await
    }

    /// Products flagged as featured on the home page.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_featured_products(&self, limit: Option<u32>) -> Result<Vec<Product>> {
        self.get_query(Access::Public, "/products/featured", &Limit { limit })
            .await
    }

    /// Full-text search over name, SKU and brand.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn search_products(&self, term: &str, limit: Option<u32>) -> Result<Vec<Product>> {
        self.get_query(
            Access::Public,
            "/products/search",
            &Search {
                q: term.trim(),
                limit,
            },
        )
        .await
    }

    /// Every brand present in the catalog.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_brands(&self) -> Result<Vec<String>> {
        self.get(Access::Public, "/products/brands").await
    }

    /// All categories, top-level ones carrying their children.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_categories(&self) -> Result<Vec<Category>> {
        self.get(Access::Public, "/categories").await
    }

    /// Get a category by slug.
    ///
    /// # Errors
    ///
    /// Returns error if the category is not found or the API request fails.
    #[instrument(skip(self))]
    pub async fn get_category(&self, slug: &str) -> Result<Category> {
        self.get(Access::Public, &format!("/categories/{}", segment(slug)))
            .await
    }

    /// Active home-page slides, in display order.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_slides(&self) -> Result<Vec<Slide>> {
        let mut slides: Vec<Slide> = self.get(Access::Public, "/slides").await?;
        slides.sort_by_key(|slide| slide.position);
        Ok(slides)
    }
}
