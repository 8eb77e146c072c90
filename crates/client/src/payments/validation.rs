//! Payment payloads and their client-side checks.

use autopecas_core::{IdentificationType, OrderId, PaymentMethodKind, validate_cnpj, validate_cpf};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payload for the card and PIX payment routes.
///
/// Field names follow the payment processor's snake_case format, which the
/// backend forwards unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentData {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub transaction_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Card token produced by the processor's browser SDK.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Card brand (`visa`, `master`, ...) or `pix`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installments: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer_id: Option<String>,
    /// Order being paid, echoed back as the processor's external reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
    #[serde(default)]
    pub payer: Payer,
}

/// Who is paying.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// May be absent or `null` in incoming payloads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identification: Option<Identification>,
}

/// Payer tax document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identification {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub id_type: Option<IdentificationType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
}

impl Identification {
    /// CPF identification for `number`.
    #[must_use]
    pub fn cpf(number: impl Into<String>) -> Self {
        Self {
            id_type: Some(IdentificationType::Cpf),
            number: Some(number.into()),
        }
    }

    /// CNPJ identification for `number`.
    #[must_use]
    pub fn cnpj(number: impl Into<String>) -> Self {
        Self {
            id_type: Some(IdentificationType::Cnpj),
            number: Some(number.into()),
        }
    }
}

/// Check `data` against the rules for `kind`.
///
/// Returns every violated rule as a readable sentence; an empty list means
/// the payload may be sent. Blank strings count as missing.
///
/// Rules for both kinds: a positive transaction amount, a description, a
/// payer email, and a payer identification whose number is a
/// valid CPF or CNPJ for its type. Cards additionally need a token, a
/// payment method and at least one installment; PIX needs the payer's first
/// and last name.
#[must_use]
pub fn validate_payment_data(data: &PaymentData, kind: PaymentMethodKind) -> Vec<String> {
    let mut errors = Vec::new();

    match data.transaction_amount {
        None => errors.push("transaction amount is required".to_string()),
        Some(amount) if amount <= Decimal::ZERO => {
            errors.push("transaction amount must be greater than zero".to_string());
        }
        Some(_) => {}
    }

    if is_blank(data.description.as_deref()) {
        errors.push("description is required".to_string());
    }

    if is_blank(data.payer.email.as_deref()) {
        errors.push("payer email is required".to_string());
    }

    validate_identification(data.payer.identification.as_ref(), &mut errors);

    match kind {
        PaymentMethodKind::Card => {
            if is_blank(data.token.as_deref()) {
                errors.push("card token is required".to_string());
            }
            if is_blank(data.payment_method_id.as_deref()) {
                errors.push("payment method is required".to_string());
            }
            if data.installments.is_none_or(|n| n < 1) {
                errors.push("installments must be at least 1".to_string());
            }
        }
        PaymentMethodKind::Pix => {
            if is_blank(data.payer.first_name.as_deref()) {
                errors.push("payer first name is required".to_string());
            }
            if is_blank(data.payer.last_name.as_deref()) {
                errors.push("payer last name is required".to_string());
            }
        }
    }

    errors
}

fn validate_identification(identification: Option<&Identification>, errors: &mut Vec<String>) {
    let id_type = identification.and_then(|id| id.id_type);
    let number = identification
        .and_then(|id| id.number.as_deref())
        .map(str::trim)
        .filter(|number| !number.is_empty());

    if id_type.is_none() {
        errors.push("payer identification type is required".to_string());
    }

    let Some(number) = number else {
        errors.push("payer identification number is required".to_string());
        return;
    };

    match id_type {
        Some(IdentificationType::Cpf) if !validate_cpf(number) => {
            errors.push("payer identification number is not a valid CPF".to_string());
        }
        Some(IdentificationType::Cnpj) if !validate_cnpj(number) => {
            errors.push("payer identification number is not a valid CNPJ".to_string());
        }
        _ => {}
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}
