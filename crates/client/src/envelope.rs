//! Response envelope handling.
//!
//! The backend answers in one of two shapes:
//!
//! - success: `{"success": true, "data": <payload>}` or the bare payload
//! - error: `{"error": "...", "message": "...", "errors": [{"msg": "..."}]}`
//!
//! Both are normalized here, immediately after a body is decoded, so the
//! endpoint modules only ever see the payload or an [`ApiError::Api`].
//!
//! [`ApiError::Api`]: crate::ApiError::Api

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Result;

/// Unwrap `{"success": true, "data": ...}` to its `data`; anything else is
/// already the payload and is returned unchanged.
#[must_use]
pub fn normalize(body: Value) -> Value {
    match body {
        Value::Object(mut map)
            if map.get("success") == Some(&Value::Bool(true)) && map.contains_key("data") =>
        {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Normalize `body` and decode the payload into `T`.
///
/// # Errors
///
/// Returns `ApiError::Parse` if the payload does not match `T`.
pub fn decode<T: DeserializeOwned>(body: Value) -> Result<T> {
    Ok(serde_json::from_value(normalize(body))?)
}

/// Pick the most specific message out of an error body.
///
/// Preference order: first entry of `errors` (`msg`, then `message`, or the
/// entry itself when it is a string), then `message`, then `error`. Empty
/// strings are skipped.
#[must_use]
pub fn error_message(body: &Value) -> Option<String> {
    let first = body
        .get("errors")
        .and_then(Value::as_array)
        .and_then(|errors| errors.first());

    first
        .and_then(|entry| text(entry.get("msg")))
        .or_else(|| first.and_then(|entry| text(entry.get("message"))))
        .or_else(|| text(first))
        .or_else(|| text(body.get("message")))
        .or_else(|| text(body.get("error")))
        .map(str::to_owned)
}

/// A non-empty string value.
fn text(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
}

/// Message used when a failed response carries no usable JSON body.
#[must_use]
pub fn network_error_message(status: u16) -> String {
    format!("Network error: the server responded with HTTP {status}")
}

/// Message used when a JSON error body names no message at all.
#[must_use]
pub fn generic_error_message(status: u16) -> String {
    format!("Request failed with HTTP {status}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_unwraps_success_envelope() {
        let body = json!({"success": true, "data": {"foo": 1}});
        assert_eq!(normalize(body), json!({"foo": 1}));
    }

    #[test]
    fn test_bare_body_unchanged() {
        assert_eq!(normalize(json!({"foo": 1})), json!({"foo": 1}));
        assert_eq!(normalize(json!([1, 2])), json!([1, 2]));
    }

    #[test]
    fn test_failed_or_dataless_envelope_unchanged() {
        let failed = json!({"success": false, "data": {"foo": 1}});
        assert_eq!(normalize(failed.clone()), failed);

        let dataless = json!({"success": true, "message": "ok"});
        assert_eq!(normalize(dataless.clone()), dataless);
    }

    #[test]
    fn test_null_data_is_kept() {
        assert_eq!(normalize(json!({"success": true, "data": null})), Value::Null);
    }

    #[test]
    fn test_decode_accepts_both_shapes() {
        #[derive(serde::Deserialize)]
        struct Foo {
            foo: i32,
        }

        let wrapped: Foo = decode(json!({"success": true, "data": {"foo": 1}})).unwrap();
        let bare: Foo = decode(json!({"foo": 2})).unwrap();
        assert_eq!((wrapped.foo, bare.foo), (1, 2));
    }

    #[test]
    fn test_validation_error_wins() {
        let body = json!({
            "error": "Validation failed",
            "message": "Invalid input",
            "errors": [{"msg": "Email invalid"}, {"msg": "Password too short"}]
        });
        assert_eq!(error_message(&body).unwrap(), "Email invalid");
    }

    #[test]
    fn test_validation_entry_message_field() {
        let body = json!({"errors": [{"message": "CEP inválido"}]});
        assert_eq!(error_message(&body).unwrap(), "CEP inválido");

        let body = json!({"errors": ["Quantidade indisponível"]});
        assert_eq!(error_message(&body).unwrap(), "Quantidade indisponível");
    }

    #[test]
    fn test_message_then_error() {
        let body = json!({"error": "Unauthorized", "message": "Token expired"});
        assert_eq!(error_message(&body).unwrap(), "Token expired");

        let body = json!({"error": "Forbidden"});
        assert_eq!(error_message(&body).unwrap(), "Forbidden");
    }

    #[test]
    fn test_empty_messages_fall_through() {
        let body = json!({"errors": [{"msg": ""}], "message": "Dados inválidos"});
        assert_eq!(error_message(&body).unwrap(), "Dados inválidos");

        let body = json!({"errors": [{"msg": "", "message": "CPF inválido"}], "message": "x"});
        assert_eq!(error_message(&body).unwrap(), "CPF inválido");

        let body = json!({"errors": [""], "message": "", "error": "Bad Request"});
        assert_eq!(error_message(&body).unwrap(), "Bad Request");
    }

    #[test]
    fn test_no_usable_message() {
        assert_eq!(error_message(&json!({"errors": []})), None);
        assert_eq!(error_message(&json!({"error": {"code": 1}})), None);
        assert_eq!(error_message(&json!("plain")), None);
    }
}
