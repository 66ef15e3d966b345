use std::time::Duration;

use url::Url;

use crate::error::Error;

const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Deployment environment; decides whether session cookies carry `Secure`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Loopback API hosts mean local development, anything else production.
    #[must_use]
    pub fn infer(api_url: &Url) -> Self {
        match api_url.host_str() {
            Some("localhost" | "127.0.0.1" | "[::1]" | "::1") => Self::Development,
            _ => Self::Production,
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(Error::Config(format!(
                "KREDITSCORE_ENV: unknown environment {other:?}"
            ))),
        }
    }
}

/// Client configuration.
///
/// Use [`from_env()`](ClientConfig::from_env) for convention-based setup,
/// or [`new()`](ClientConfig::new) with `with_*` methods for full control.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ClientConfig {
    pub(crate) api_url: Url,
    pub(crate) environment: Environment,
    pub(crate) timeout: Duration,
    pub(crate) session_cookie_name: String,
    pub(crate) session_ttl_days: i64,
}

impl ClientConfig {
    /// Create a configuration for the given backend base URL.
    ///
    /// The environment is inferred from the host; see [`Environment::infer`].
    #[must_use]
    pub fn new(api_url: Url) -> Self {
        Self {
            environment: Environment::infer(&api_url),
            api_url,
            timeout: Duration::from_secs(30),
            session_cookie_name: "access_token".into(),
            session_ttl_days: 7,
        }
    }

    /// Create config from environment variables.
    ///
    /// # Optional env vars
    /// - `KREDITSCORE_API_URL`: backend base URL (default `http://localhost:8000`)
    /// - `KREDITSCORE_ENV`: `development` or `production` (default: inferred from the API host)
    /// - `KREDITSCORE_HTTP_TIMEOUT_SECS`: per-request timeout (default 30)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, Error> {
        let api_url: Url = std::env::var("KREDITSCORE_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string())
            .parse()
            .map_err(|e| Error::Config(format!("KREDITSCORE_API_URL: {e}")))?;

        let mut config = Self::new(api_url);

        if let Ok(env) = std::env::var("KREDITSCORE_ENV") {
            config = config.with_environment(env.parse()?);
        }
        if let Ok(secs) = std::env::var("KREDITSCORE_HTTP_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("KREDITSCORE_HTTP_TIMEOUT_SECS: {e}")))?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_session_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.session_cookie_name = name.into();
        self
    }

    #[must_use]
    pub fn with_session_ttl_days(mut self, days: i64) -> Self {
        self.session_ttl_days = days;
        self
    }

    /// Backend base URL.
    #[must_use]
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    #[must_use]
    pub fn environment(&self) -> Environment {
        self.environment
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub fn session_cookie_name(&self) -> &str {
        &self.session_cookie_name
    }

    #[must_use]
    pub fn session_ttl_days(&self) -> i64 {
        self.session_ttl_days
    }

    /// Whether session cookies are restricted to secure channels.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Resolve an API path (e.g. `/api/users/me`) against the base URL.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, Error> {
        self.api_url
            .join(path)
            .map_err(|e| Error::Config(format!("invalid endpoint {path}: {e}")))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL.parse().expect("valid default URL"))
    }
}
