//! Accounts, authentication and saved addresses.

use core::fmt;

use autopecas_core::{AddressId, Cpf, Email, UserId, UserRole};
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};

/// A customer or admin account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub cpf: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Whether the account may call the `/admin` endpoints.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }
}

/// A Brazilian postal address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PostalAddress {
    pub street: String,
    pub number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    /// Two-letter state code (`SP`, `RJ`, ...).
    pub state: String,
    pub zip_code: String,
}

impl fmt::Display for PostalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.street, self.number)?;
        if let Some(complement) = &self.complement {
            write!(f, " - {complement}")?;
        }
        write!(
            f,
            ", {}, {}/{}, CEP {}",
            self.neighborhood, self.city, self.state, self.zip_code
        )
    }
}

/// An address saved on the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAddress {
    pub id: AddressId,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub recipient_name: Option<String>,
    #[serde(flatten)]
    pub address: PostalAddress,
    /// At most one address per account is the default; the backend
    /// enforces it.
    #[serde(default)]
    pub is_default: bool,
}

/// Body for creating or replacing a saved address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_name: Option<String>,
    #[serde(flatten)]
    pub address: PostalAddress,
    pub is_default: bool,
}

/// Body of `POST /auth/register`.
#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: Email,
    #[serde(serialize_with = "expose")]
    pub password: SecretString,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpf: Option<Cpf>,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: Email,
    #[serde(serialize_with = "expose")]
    pub password: SecretString,
}

impl LoginRequest {
    #[must_use]
    pub fn new(email: Email, password: impl Into<String>) -> Self {
        Self {
            email,
            password: SecretString::from(password.into()),
        }
    }
}

/// Reply to login and registration.
#[derive(Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

impl fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthResponse")
            .field("token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

/// Body of `PUT /auth/profile`. Unset fields are left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Body of `PUT /auth/password`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    #[serde(serialize_with = "expose")]
    pub current_password: SecretString,
    #[serde(serialize_with = "expose")]
    pub new_password: SecretString,
}

/// Page selector for the admin user list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UserQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

fn expose<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}
