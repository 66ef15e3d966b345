use super::cookies;
use super::jar::CookieBackend;
use crate::config::ClientConfig;
use crate::types::SessionToken;

/// Persists the single active [`SessionToken`] for this browser profile.
///
/// Presence of a non-empty token cookie is the only thing that makes the
/// client "authenticated".
pub struct SessionStore {
    backend: Box<dyn CookieBackend>,
    cookie_name: String,
    ttl_days: i64,
    secure: bool,
}

impl SessionStore {
    /// Create a store using the cookie settings from `config`.
    #[must_use]
    pub fn new(config: &ClientConfig, backend: impl CookieBackend) -> Self {
        Self {
            backend: Box::new(backend),
            cookie_name: config.session_cookie_name.clone(),
            ttl_days: config.session_ttl_days,
            secure: config.secure_cookies(),
        }
    }

    /// True iff a non-empty session token cookie exists.
    #[must_use]
    pub fn has_session(&self) -> bool {
        let present = self.read().is_some();
        tracing::debug!(present, "Session check");
        present
    }

    /// Write the token cookie, replacing any existing token.
    pub fn save(&self, token: &SessionToken) {
        tracing::debug!(token_len = token.as_str().len(), secure = self.secure, "Saving session token");
        self.backend.set(cookies::session_cookie(
            &self.cookie_name,
            token.as_str(),
            self.ttl_days,
            self.secure,
        ));
    }

    /// Remove the token cookie. Idempotent.
    pub fn clear(&self) {
        self.backend.remove(&self.cookie_name);
    }

    /// Current token, if any.
    #[must_use]
    pub fn read(&self) -> Option<SessionToken> {
        self.backend
            .get(&self.cookie_name)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
            .map(SessionToken::from)
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("cookie_name", &self.cookie_name)
            .field("ttl_days", &self.ttl_days)
            .field("secure", &self.secure)
            .finish_non_exhaustive()
    }
}
