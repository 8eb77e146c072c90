//! Status and kind enums shared by orders, payments and accounts.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// Set by checkout (`Pending`) and moved forward by admin status updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Payment status as reported by the payment processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Approved,
    Authorized,
    InProcess,
    InMediation,
    Rejected,
    Cancelled,
    Refunded,
    ChargedBack,
    /// Any status this client does not know about yet.
    #[serde(other)]
    Unknown,
}

impl PaymentStatus {
    /// Whether the payment has been settled in the store's favor.
    #[must_use]
    pub const fn is_paid(&self) -> bool {
        matches!(self, Self::Approved | Self::Authorized)
    }

    /// Whether the processor will not change this status any more.
    #[must_use]
    pub const fn is_final(&self) -> bool {
        matches!(
            self,
            Self::Approved | Self::Rejected | Self::Cancelled | Self::Refunded | Self::ChargedBack
        )
    }
}

/// How a payment is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethodKind {
    /// Credit or debit card, tokenized in the browser.
    Card,
    /// PIX instant transfer, paid by QR code.
    Pix,
}

impl std::fmt::Display for PaymentMethodKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Card => write!(f, "card"),
            Self::Pix => write!(f, "pix"),
        }
    }
}

/// Payer document type accepted by the payment processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentificationType {
    #[serde(rename = "CPF")]
    Cpf,
    #[serde(rename = "CNPJ")]
    Cnpj,
}

impl std::fmt::Display for IdentificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cpf => write!(f, "CPF"),
            Self::Cnpj => write!(f, "CNPJ"),
        }
    }
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Customer,
    /// Access to the `/admin` endpoints.
    Admin,
}

/// How a coupon reduces the order total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// Percentage of the subtotal.
    Percentage,
    /// Fixed amount in reais.
    Fixed,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Shipped).unwrap(),
            "\"shipped\""
        );
        assert_eq!("cancelled".parse::<OrderStatus>(), Ok(OrderStatus::Cancelled));
        assert!("lost".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_unknown_payment_status_is_tolerated() {
        let status: PaymentStatus = serde_json::from_str("\"in_process\"").unwrap();
        assert_eq!(status, PaymentStatus::InProcess);

        let status: PaymentStatus = serde_json::from_str("\"partially_refunded\"").unwrap();
        assert_eq!(status, PaymentStatus::Unknown);
    }

    #[test]
    fn test_payment_status_predicates() {
        assert!(PaymentStatus::Approved.is_paid());
        assert!(PaymentStatus::Approved.is_final());
        assert!(!PaymentStatus::Pending.is_final());
        assert!(!PaymentStatus::Rejected.is_paid());
    }

    #[test]
    fn test_identification_type_is_uppercase() {
        assert_eq!(
            serde_json::to_string(&IdentificationType::Cnpj).unwrap(),
            "\"CNPJ\""
        );
        let parsed: IdentificationType = serde_json::from_str("\"CPF\"").unwrap();
        assert_eq!(parsed, IdentificationType::Cpf);
    }
}
