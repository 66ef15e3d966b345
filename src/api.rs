use std::sync::Arc;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::Value as JsonValue;
use tokio::sync::watch;

use crate::config::ClientConfig;
use crate::controller::AuthState;
use crate::error::Error;
use crate::loan::LoanDraft;
use crate::navigation::{Destination, Navigator};
use crate::session::SessionStore;
use crate::types::{AuthSession, AuthTokenGrant, CallbackToken, DeviceInfo, User, VerifyResponse};

const AUTH_TELEGRAM_PATH: &str = "/api/auth/telegram";
const AUTH_VERIFY_PATH: &str = "/api/auth/verify";
const AUTH_LOGOUT_PATH: &str = "/api/auth/logout";
const USER_ME_PATH: &str = "/api/users/me";
const USER_SESSIONS_PATH: &str = "/api/users/me/sessions";
const USER_DEVICE_INFO_PATH: &str = "/api/users/me/device-info";

/// HTTP client for the KreditScore backend.
///
/// Every request carries the current session token as a bearer credential
/// when one exists. Any `401` response clears the session, publishes
/// [`AuthState::Unauthenticated`] and sends the navigator to the entry route
/// before the error reaches the caller; callers must not repeat that cleanup.
pub struct ApiClient {
    config: ClientConfig,
    http: reqwest::Client,
    session: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
    auth_state: watch::Sender<AuthState>,
}

impl ApiClient {
    /// Create a client with the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Network`] if the HTTP client cannot be initialised.
    pub fn new(
        config: ClientConfig,
        session: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("kreditscore-auth/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let (auth_state, _) = watch::channel(AuthState::Initializing);
        Ok(Self {
            config,
            http,
            session,
            navigator,
            auth_state,
        })
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    #[must_use]
    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    /// Authorization state shared with every controller built on this client.
    pub(crate) fn auth_state(&self) -> &watch::Sender<AuthState> {
        &self.auth_state
    }

    /// Start Telegram verification, optionally carrying a loan draft.
    ///
    /// `POST /api/auth/telegram`; the body is the draft, or `{}` without one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Network`] on transport failure, or
    /// [`Error::Api`] if the backend refuses the request.
    pub async fn request_auth_token(
        &self,
        draft: Option<&LoanDraft>,
    ) -> Result<AuthTokenGrant, Error> {
        let body = match draft {
            Some(draft) => serde_json::to_value(draft)?,
            None => JsonValue::Object(serde_json::Map::new()),
        };
        let request = self.request(Method::POST, AUTH_TELEGRAM_PATH)?.json(&body);
        let response = self.send(request, "auth token request").await?;
        response.json::<AuthTokenGrant>().await.map_err(Into::into)
    }

    /// Exchange a callback token for a session token.
    ///
    /// `POST /api/auth/verify` with `{"auth_token": ...}`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AuthExchange`] if the backend rejects the token
    /// (any non-success status), or [`Error::Network`] on transport failure.
    pub async fn exchange_callback_token(
        &self,
        token: &CallbackToken,
    ) -> Result<VerifyResponse, Error> {
        let request = self
            .request(Method::POST, AUTH_VERIFY_PATH)?
            .json(&serde_json::json!({ "auth_token": token }));

        match self.send(request, "callback token exchange").await {
            Ok(response) => response.json::<VerifyResponse>().await.map_err(Into::into),
            Err(Error::Api { status, detail, .. }) => Err(Error::AuthExchange { status, detail }),
            Err(Error::Unauthorized) => Err(Error::AuthExchange {
                status: StatusCode::UNAUTHORIZED.as_u16(),
                detail: "callback token rejected".into(),
            }),
            Err(e) => Err(e),
        }
    }

    /// Notify the backend that the session ends. Callers treat failure as non-fatal.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Network`] or [`Error::Api`]; never retried.
    pub async fn logout(&self) -> Result<(), Error> {
        let request = self.request(Method::POST, AUTH_LOGOUT_PATH)?;
        self.send(request, "logout").await?;
        Ok(())
    }

    /// `GET /api/users/me`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthorized`] without a valid session.
    pub async fn fetch_current_user(&self) -> Result<User, Error> {
        let request = self.request(Method::GET, USER_ME_PATH)?;
        let response = self.send(request, "current user request").await?;
        response.json::<User>().await.map_err(Into::into)
    }

    /// `GET /api/users/me/sessions`. A body that is not a JSON array reads as no sessions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthorized`] without a valid session.
    pub async fn fetch_sessions(&self) -> Result<Vec<AuthSession>, Error> {
        let request = self.request(Method::GET, USER_SESSIONS_PATH)?;
        let response = self.send(request, "sessions request").await?;
        let body = response.json::<JsonValue>().await?;
        if !body.is_array() {
            tracing::warn!("Sessions response is not an array, treating as empty");
            return Ok(Vec::new());
        }
        serde_json::from_value(body).map_err(Into::into)
    }

    /// `GET /api/users/me/device-info`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthorized`] without a valid session.
    pub async fn fetch_device_info(&self) -> Result<DeviceInfo, Error> {
        let request = self.request(Method::GET, USER_DEVICE_INFO_PATH)?;
        let response = self.send(request, "device info request").await?;
        response.json::<DeviceInfo>().await.map_err(Into::into)
    }

    /// Build a request with the session token attached, if any.
    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, Error> {
        let url = self.config.endpoint(path)?;
        let request = self.http.request(method, url);
        Ok(match self.session.read() {
            Some(token) => request.bearer_auth(token.as_str()),
            None => request,
        })
    }

    /// Send, applying the process-wide `401` policy, then require success.
    async fn send(
        &self,
        request: RequestBuilder,
        operation: &'static str,
    ) -> Result<reqwest::Response, Error> {
        let response = request.send().await.inspect_err(|e| {
            tracing::error!(error = %e, operation, "Request failed");
        })?;

        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!(operation, "Unauthorized response, clearing session");
            self.session.clear();
            self.auth_state.send_replace(AuthState::Unauthenticated);
            self.navigator.navigate(Destination::Entry);
            return Err(Error::Unauthorized);
        }

        Self::ensure_success(response, operation).await
    }

    /// Checks HTTP response status; returns the response on success or an error with details.
    async fn ensure_success(
        response: reqwest::Response,
        operation: &'static str,
    ) -> Result<reqwest::Response, Error> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let detail = response.text().await.unwrap_or_default();
        tracing::warn!(operation, status, "Backend returned an error");
        Err(Error::Api {
            operation,
            status,
            detail,
        })
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("api_url", &self.config.api_url.as_str())
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
