//! Shipping quotes and coupon checks.

use rust_decimal::Decimal;
use tracing::instrument;

use crate::client::{Access, ApiClient};
use crate::error::{ApiError, Result};
use crate::types::{CouponCheck, CouponValidation, ShippingOption, ShippingQuote};

impl ApiClient {
    /// Quote delivery options for `quote`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` if the CEP does not have 8 digits
    /// or there is nothing to ship, otherwise the backend's error.
    #[instrument(skip(self, quote), fields(zip_code = %quote.zip_code))]
    pub async fn calculate_shipping(&self, quote: &ShippingQuote) -> Result<Vec<ShippingOption>> {
        let zip_code = quote
            .normalized_zip_code()
            .ok_or_else(|| ApiError::InvalidRequest("CEP must have 8 digits".to_string()))?;
        if quote.items.is_empty() {
            return Err(ApiError::InvalidRequest(
                "at least one item is required".to_string(),
            ));
        }

        let body = ShippingQuote {
            zip_code,
            items: quote.items.clone(),
        };
        self.post(Access::Public, "/shipping/calculate", &body)
            .await
    }

    /// Check `code` against an order subtotal.
    ///
    /// An unknown or expired coupon is a successful call with
    /// `valid == false` when the backend answers that way, or an
    /// `ApiError::Api` when it answers with an error status.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn validate_coupon(&self, code: &str, subtotal: Decimal) -> Result<CouponValidation> {
        let code = code.trim().to_uppercase();
        if code.is_empty() {
            return Err(ApiError::InvalidRequest("coupon code is required".to_string()));
        }

        let body = CouponCheck {
            code: &code,
            subtotal,
        };
        self.post(Access::Authenticated, "/coupons/validate", &body)
            .await
    }
}
