use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use url::Url;

/// Bearer credential proving an authenticated session.
///
/// Opaque to this crate. Persisted in the `access_token` cookie by
/// [`SessionStore`](crate::session::SessionStore).
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize, From, Into)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// Never print credentials, even at debug level.
impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SessionToken(<{} chars>)", self.0.len())
    }
}

/// One-time code appended to the entry URL by the Telegram bot.
///
/// Consumed exactly once by
/// [`ApiClient::exchange_callback_token`](crate::api::ApiClient::exchange_callback_token).
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct CallbackToken(String);

impl CallbackToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for CallbackToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CallbackToken(<{} chars>)", self.0.len())
    }
}

/// User profile as returned by `GET /api/users/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct User {
    pub id: i64,
    pub telegram_id: i64,
    pub phone_number: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub loan_amount: Option<u64>,
    #[serde(default)]
    pub loan_term: Option<u32>,
    #[serde(default)]
    pub loan_purpose: Option<String>,
    #[serde(default)]
    pub monthly_income: Option<u64>,
    pub created_at: String,
}

/// A login event recorded by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct AuthSession {
    pub id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub device_info: Option<String>,
    pub created_at: String,
    pub is_active: bool,
}

/// Device descriptor for the current request, from `GET /api/users/me/device-info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct DeviceInfo {
    pub device_info: String,
    pub ip_address: String,
}

/// Response of `POST /api/auth/telegram`.
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct AuthTokenGrant {
    /// Callback token the bot will hand back on the entry URL.
    pub auth_token: CallbackToken,
    /// Bot deep link the browser must navigate to.
    pub telegram_url: Url,
}

/// Response of `POST /api/auth/verify`.
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct VerifyResponse {
    pub access_token: SessionToken,
    pub token_type: String,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_debug_hides_value() {
        let token = SessionToken::new("secret-value");
        let printed = format!("{token:?}");
        assert!(!printed.contains("secret"));
        assert!(printed.contains("12 chars"));
    }

    #[test]
    fn test_token_display_is_raw_value() {
        let token = CallbackToken::new("ABC");
        assert_eq!(token.to_string(), "ABC");
    }

    #[test]
    fn test_user_optional_fields_default_to_none() {
        let json = serde_json::json!({
            "id": 1,
            "telegram_id": 123456789,
            "phone_number": "+79990000000",
            "created_at": "2024-01-15T10:30:00"
        });
        let user: User = serde_json::from_value(json).unwrap();
        assert_eq!(user.telegram_id, 123_456_789);
        assert!(user.first_name.is_none());
        assert!(user.loan_amount.is_none());
    }

    #[test]
    fn test_verify_response_parses_backend_shape() {
        let json = serde_json::json!({
            "access_token": "jwt.token.value",
            "token_type": "bearer",
            "user": {
                "id": 7,
                "telegram_id": 42,
                "phone_number": "+70000000000",
                "loan_amount": 100000,
                "loan_term": 12,
                "created_at": "2024-01-15T10:30:00Z"
            }
        });
        let response: VerifyResponse = serde_json::from_value(json).unwrap();
        assert_eq!(response.access_token.as_str(), "jwt.token.value");
        assert_eq!(response.user.loan_term, Some(12));
    }

    #[test]
    fn test_grant_rejects_relative_telegram_url() {
        let json = serde_json::json!({
            "auth_token": "abc",
            "telegram_url": "not a url"
        });
        assert!(serde_json::from_value::<AuthTokenGrant>(json).is_err());
    }
}
