//! Discount coupons.

use autopecas_core::{CouponId, DiscountType};
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::default_true;

/// A discount coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: CouponId,
    pub code: String,
    pub discount_type: DiscountType,
    /// Percent for `Percentage`, reais for `Fixed`.
    pub discount_value: Decimal,
    #[serde(default)]
    pub min_order_value: Option<Decimal>,
    #[serde(default)]
    pub max_uses: Option<u32>,
    #[serde(default)]
    pub used_count: u32,
    #[serde(default)]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Coupon {
    /// Discount this coupon gives on `subtotal`, never more than the subtotal.
    ///
    /// Returns zero below the minimum order value. The backend remains the
    /// authority; this is for previews.
    #[must_use]
    pub fn discount_for(&self, subtotal: Decimal) -> Decimal {
        if self.min_order_value.is_some_and(|min| subtotal < min) {
            return Decimal::ZERO;
        }

        let discount = match self.discount_type {
            DiscountType::Percentage => (subtotal * self.discount_value / Decimal::ONE_HUNDRED)
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
            DiscountType::Fixed => self.discount_value,
        };
        discount.clamp(Decimal::ZERO, subtotal.max(Decimal::ZERO))
    }
}

/// Coupon fields sent by the admin endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponInput {
    pub code: String,
    pub discount_type: DiscountType,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_value: Decimal,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub min_order_value: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_uses: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<DateTime<Utc>>,
    pub is_active: bool,
}

/// Body of `POST /coupons/validate`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CouponCheck<'a> {
    pub code: &'a str,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
}

/// Reply to a coupon check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponValidation {
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub coupon: Option<Coupon>,
}
