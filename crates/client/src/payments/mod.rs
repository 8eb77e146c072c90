//! Card and PIX payments.
//!
//! Payloads are checked with [`validate_payment_data`] and then forwarded to
//! the backend's payment routes, which talk to the payment processor:
//!
//! - `POST /payments/process_payment` - card
//! - `POST /payments/process_pix` - PIX, answered with a QR code
//! - `GET /payments/{id}` - current status
//! - `GET /payments/methods` - methods enabled for the store
//!
//! The processor's answer is returned as sent, whatever the HTTP status: a
//! declined card is a `PaymentResponse` with `success() == false`, not an
//! error. Only transport failures and unreadable bodies are errors.

mod validation;

pub use validation::{Identification, Payer, PaymentData, validate_payment_data};

use autopecas_core::{PaymentMethodKind, PaymentStatus};
use reqwest::{Method, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::client::{Access, ApiClient};
use crate::endpoints::segment;
use crate::error::{ApiError, Result};

/// The payment route's JSON body, unmodified.
///
/// Accessors look at the top level first and then inside `data`, so both
/// `{"success": true, "paymentId": 1}` and
/// `{"success": true, "data": {"paymentId": 1}}` work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentResponse(Value);

impl PaymentResponse {
    /// Wrap a raw body.
    #[must_use]
    pub const fn new(body: Value) -> Self {
        Self(body)
    }

    /// Whether the backend reported success.
    #[must_use]
    pub fn success(&self) -> bool {
        self.0.get("success").and_then(Value::as_bool).unwrap_or(false)
    }

    /// Processor payment ID, as text whether sent as a number or string.
    #[must_use]
    pub fn payment_id(&self) -> Option<String> {
        match self.field(&["paymentId", "payment_id", "id"])? {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }

    /// Processor status, `None` when absent.
    #[must_use]
    pub fn status(&self) -> Option<PaymentStatus> {
        self.field(&["status"])
            .and_then(|status| PaymentStatus::deserialize(status).ok())
    }

    /// Processor reason for the status (`cc_rejected_insufficient_amount`, ...).
    #[must_use]
    pub fn status_detail(&self) -> Option<&str> {
        self.str_field(&["statusDetail", "status_detail"])
    }

    /// Whether the processor approved the payment.
    #[must_use]
    pub fn is_approved(&self) -> bool {
        self.status().is_some_and(|status| status.is_paid())
    }

    /// PIX copy-and-paste code.
    #[must_use]
    pub fn qr_code(&self) -> Option<&str> {
        self.str_field(&["qrCode", "qr_code"])
    }

    /// PIX QR code as a base64 PNG.
    #[must_use]
    pub fn qr_code_base64(&self) -> Option<&str> {
        self.str_field(&["qrCodeBase64", "qr_code_base64"])
    }

    /// Hosted page showing the PIX QR code.
    #[must_use]
    pub fn ticket_url(&self) -> Option<&str> {
        self.str_field(&["ticketUrl", "ticket_url"])
    }

    /// Failure text, `error` before `message`.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.str_field(&["error", "message"])
    }

    /// The body as received.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    /// Unwrap the body.
    #[must_use]
    pub fn into_inner(self) -> Value {
        self.0
    }

    fn field(&self, names: &[&str]) -> Option<&Value> {
        let data = self.0.get("data");
        names
            .iter()
            .find_map(|name| self.0.get(name).filter(|v| !v.is_null()))
            .or_else(|| {
                names
                    .iter()
                    .find_map(|name| data?.get(name).filter(|v| !v.is_null()))
            })
    }

    fn str_field(&self, names: &[&str]) -> Option<&str> {
        self.field(names).and_then(Value::as_str)
    }
}

impl ApiClient {
    /// Charge a tokenized card.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidPayment` if `data` fails validation (nothing
    /// is sent), or a transport/parse error. A declined card is not an error.
    #[instrument(skip(self, data), fields(order_id = ?data.order_id))]
    pub async fn create_card_payment(&self, data: &PaymentData) -> Result<PaymentResponse> {
        self.submit_payment(PaymentMethodKind::Card, "/payments/process_payment", data)
            .await
    }

    /// Create a PIX charge. `payment_method_id` defaults to `pix`.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::create_card_payment`].
    #[instrument(skip(self, data), fields(order_id = ?data.order_id))]
    pub async fn create_pix_payment(&self, data: &PaymentData) -> Result<PaymentResponse> {
        let mut data = data.clone();
        if data
            .payment_method_id
            .as_deref()
            .is_none_or(|id| id.trim().is_empty())
        {
            data.payment_method_id = Some("pix".to_string());
        }
        self.submit_payment(PaymentMethodKind::Pix, "/payments/process_pix", &data)
            .await
    }

    /// Current state of a payment.
    ///
    /// # Errors
    ///
    /// Returns a transport/parse error; an unknown ID is a response with
    /// `success() == false`.
    #[instrument(skip(self))]
    pub async fn get_payment_status(&self, payment_id: &str) -> Result<PaymentResponse> {
        let request = self.request(Method::GET, &format!("/payments/{}", segment(payment_id)));
        self.payment_passthrough(request).await.map(PaymentResponse)
    }

    /// Payment methods the store accepts, as sent by the backend.
    ///
    /// # Errors
    ///
    /// Returns a transport/parse error.
    #[instrument(skip(self))]
    pub async fn get_payment_methods(&self) -> Result<Value> {
        let request = self.request(Method::GET, "/payments/methods");
        self.payment_passthrough(request).await
    }

    async fn submit_payment(
        &self,
        kind: PaymentMethodKind,
        endpoint: &str,
        data: &PaymentData,
    ) -> Result<PaymentResponse> {
        let problems = validate_payment_data(data, kind);
        if !problems.is_empty() {
            warn!(%kind, problems = problems.len(), "Payment data rejected before sending");
            return Err(ApiError::InvalidPayment(problems));
        }

        let request = self.request(Method::POST, endpoint).json(data);
        let response = PaymentResponse(self.payment_passthrough(request).await?);
        info!(
            %kind,
            success = response.success(),
            payment_id = response.payment_id().as_deref().unwrap_or("-"),
            "Payment submitted"
        );
        Ok(response)
    }

    /// Send with the session token when there is one and return the body
    /// whatever the status.
    async fn payment_passthrough(&self, request: RequestBuilder) -> Result<Value> {
        let (status, body) = self
            .send(Access::Authenticated, request)
            .await
            .inspect_err(|e| error!(error = %e, "Payment request failed"))?;

        let body = body.map_err(|e| {
            error!(status = status.as_u16(), error = %e, "Payment response is not JSON");
            ApiError::Parse(e)
        })?;

        debug!(status = status.as_u16(), "Payment response received");
        Ok(body)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_card_response_accessors() {
        let response = PaymentResponse::new(json!({
            "success": true,
            "paymentId": 1_234_567_890_u64,
            "status": "approved",
            "statusDetail": "accredited"
        }));
        assert!(response.success());
        assert_eq!(response.payment_id().as_deref(), Some("1234567890"));
        assert_eq!(response.status(), Some(PaymentStatus::Approved));
        assert!(response.is_approved());
        assert_eq!(response.status_detail(), Some("accredited"));
        assert_eq!(response.error(), None);
    }

    #[test]
    fn test_pix_response_inside_data() {
        let response = PaymentResponse::new(json!({
            "success": true,
            "data": {
                "payment_id": "abc",
                "status": "pending",
                "qr_code": "00020126580014br.gov.bcb.pix",
                "qr_code_base64": "iVBORw0KGgo="
            }
        }));
        assert_eq!(response.payment_id().as_deref(), Some("abc"));
        assert_eq!(response.qr_code(), Some("00020126580014br.gov.bcb.pix"));
        assert_eq!(response.qr_code_base64(), Some("iVBORw0KGgo="));
        assert!(!response.is_approved());
    }

    #[test]
    fn test_declined_response() {
        let response = PaymentResponse::new(json!({
            "success": false,
            "error": "Pagamento recusado",
            "status": "rejected"
        }));
        assert!(!response.success());
        assert_eq!(response.error(), Some("Pagamento recusado"));
        assert_eq!(response.status(), Some(PaymentStatus::Rejected));
    }

    #[test]
    fn test_unknown_status_is_kept() {
        let response = PaymentResponse::new(json!({"status": "something_new"}));
        assert_eq!(response.status(), Some(PaymentStatus::Unknown));
        assert!(!response.success());
    }
}
