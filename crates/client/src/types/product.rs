//! Catalog products.

use std::collections::BTreeMap;

use autopecas_core::{CategoryId, Price, ProductId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Pagination, default_true};

/// A product as listed in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    pub original_price: Decimal,
    /// Sale price. Expected to be at most `original_price`; the backend
    /// owns that rule.
    #[serde(default)]
    pub discount_price: Option<Decimal>,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    /// Free-form technical specification ("Voltagem" -> "12V", ...).
    #[serde(default)]
    pub specifications: Option<BTreeMap<String, Value>>,
    #[serde(flatten)]
    pub dimensions: ProductDimensions,
    #[serde(default)]
    pub featured: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// The price a customer pays: the discount price when there is one.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        self.discount_price.unwrap_or(self.original_price)
    }

    /// Effective price in reais.
    #[must_use]
    pub fn price(&self) -> Price {
        Price::brl(self.effective_price())
    }

    /// Whether a discount price below the original is set.
    #[must_use]
    pub fn has_discount(&self) -> bool {
        self.discount_price
            .is_some_and(|discount| discount < self.original_price)
    }

    /// Whole-number discount percentage, `0` without a discount.
    #[must_use]
    pub fn discount_percentage(&self) -> u32 {
        if !self.has_discount() || self.original_price.is_zero() {
            return 0;
        }
        let off = (self.original_price - self.effective_price()) / self.original_price
            * Decimal::ONE_HUNDRED;
        off.round().to_u32().unwrap_or(0)
    }

    /// Whether at least one unit is available.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Package dimensions used for shipping quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProductDimensions {
    /// Kilograms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<Decimal>,
    /// Centimetres.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<Decimal>,
}

/// Sort order for catalog listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    Newest,
    PriceAsc,
    PriceDesc,
    Name,
}

/// Filters for [`ApiClient::get_products`](crate::ApiClient::get_products).
///
/// Unset fields are left out of the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Category slug.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<ProductSort>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
}

/// One page of products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProductList {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Product fields sent by the admin create and update endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub original_price: Decimal,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub discount_price: Option<Decimal>,
    pub stock: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specifications: Option<BTreeMap<String, Value>>,
    #[serde(flatten)]
    pub dimensions: ProductDimensions,
    pub featured: bool,
    pub is_active: bool,
}
