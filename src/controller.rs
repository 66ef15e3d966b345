//! The authorization handshake state machine.
//!
//! ```text
//!  Initializing ──session present──────────────────────────────▶ Authenticated
//!       │
//!       ├─no callback token──▶ Unauthenticated ──submit──▶ (external redirect)
//!       │
//!       └─callback token─────▶ Exchanging ──ok + persisted──▶ Authenticated
//!                                   │
//!                                   └──rejected / network / not persisted──▶ ExchangeFailed
//! ```
//!
//! The state is published on a [`tokio::sync::watch`] channel owned by the
//! [`ApiClient`], so the client's `401` handling and the controller update the
//! same value and presentation code never re-checks cookies itself.

use std::sync::Arc;

use tokio::sync::watch;
use url::Url;

use crate::api::ApiClient;
use crate::callback::take_callback_token;
use crate::error::Error;
use crate::navigation::{Destination, Navigator};
use crate::profile::Profile;
use crate::session::SessionStore;
use crate::types::CallbackToken;
use crate::validation::LoanApplicationForm;

/// Why a callback token exchange did not produce a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeFailure {
    /// The backend rejected the callback token.
    Rejected,
    /// The exchange request never completed.
    Network,
    /// The backend answered, but not with a usable session.
    Unexpected,
    /// A session token was issued but did not persist in the cookie store.
    StoragePersistence,
}

impl ExchangeFailure {
    fn from_error(error: &Error) -> Self {
        match error {
            Error::AuthExchange { .. } => Self::Rejected,
            Error::StoragePersistence => Self::StoragePersistence,
            Error::Network(e) if !e.is_decode() => Self::Network,
            _ => Self::Unexpected,
        }
    }

    /// Message to surface to the user.
    #[must_use]
    pub fn user_message(self) -> &'static str {
        match self {
            Self::Rejected => "Authorization failed. Please try again.",
            Self::Network => "Could not reach the server. Please try again.",
            Self::Unexpected => "The server returned an unexpected response. Please try again.",
            Self::StoragePersistence => {
                "Authorization succeeded but the session could not be saved. \
                 Check that cookies are enabled for this site."
            }
        }
    }
}

/// Observable authorization state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// Initial load has not been evaluated yet.
    Initializing,
    /// No session; the loan application form is shown.
    Unauthenticated,
    /// A callback token was found and is being exchanged.
    Exchanging,
    /// A session token is stored.
    Authenticated,
    /// The exchange failed; the user may start over.
    ExchangeFailed(ExchangeFailure),
}

/// Coordinates the session store, callback parsing and API calls.
pub struct AuthController {
    api: Arc<ApiClient>,
}

impl AuthController {
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Current state.
    ///
    /// `Authenticated` is re-checked against the session store, so a cookie
    /// that expired or was removed outside the client publishes
    /// [`AuthState::Unauthenticated`] here.
    #[must_use]
    pub fn state(&self) -> AuthState {
        let current = *self.api.auth_state().borrow();
        if current == AuthState::Authenticated && !self.session().has_session() {
            tracing::info!("Session no longer present, leaving Authenticated");
            return self.publish(AuthState::Unauthenticated);
        }
        current
    }

    /// Receiver notified on every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.api.auth_state().subscribe()
    }

    #[must_use]
    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    fn session(&self) -> &SessionStore {
        self.api.session()
    }

    fn navigator(&self) -> &dyn Navigator {
        self.api.navigator().as_ref()
    }

    /// Publish a state. `Authenticated` is downgraded when no session exists.
    fn publish(&self, next: AuthState) -> AuthState {
        let next = match next {
            AuthState::Authenticated if !self.session().has_session() => {
                tracing::warn!("Refusing Authenticated state without a session");
                AuthState::Unauthenticated
            }
            other => other,
        };
        self.api.auth_state().send_replace(next);
        next
    }

    /// Evaluate the page on initial load.
    ///
    /// An existing session wins outright. Otherwise a callback token on the
    /// current URL is stripped from the visible address and exchanged; without
    /// one the controller settles in [`AuthState::Unauthenticated`] and makes no
    /// network calls.
    pub async fn initialize(&self) -> AuthState {
        if self.session().has_session() {
            tracing::info!("Existing session found");
            let state = self.publish(AuthState::Authenticated);
            self.navigator().navigate(Destination::Profile);
            return state;
        }

        let (token, stripped) = take_callback_token(&self.navigator().current_url());
        let Some(token) = token else {
            tracing::debug!("No callback token, showing application form");
            return self.publish(AuthState::Unauthenticated);
        };

        // The token must be off the visible URL before the exchange starts.
        self.navigator().replace_url(stripped);
        tracing::info!(token_len = token.as_str().len(), "Callback token found");
        self.complete_exchange(&token).await
    }

    async fn complete_exchange(&self, token: &CallbackToken) -> AuthState {
        self.publish(AuthState::Exchanging);

        match self.exchange(token).await {
            Ok(()) => {
                let state = self.publish(AuthState::Authenticated);
                self.navigator().navigate(Destination::Profile);
                state
            }
            Err(e) => {
                tracing::error!(error = %e, "Authorization exchange failed");
                self.publish(AuthState::ExchangeFailed(ExchangeFailure::from_error(&e)))
            }
        }
    }

    async fn exchange(&self, token: &CallbackToken) -> Result<(), Error> {
        let response = self.api.exchange_callback_token(token).await?;
        tracing::debug!(
            token_len = response.access_token.as_str().len(),
            telegram_id = response.user.telegram_id,
            "Exchange succeeded"
        );
        self.session().save(&response.access_token);

        if !self.session().has_session() {
            return Err(Error::StoragePersistence);
        }
        Ok(())
    }

    /// Validate the form, request a callback token, and leave for the Telegram bot.
    ///
    /// Allowed from [`AuthState::Unauthenticated`] and
    /// [`AuthState::ExchangeFailed`]. No request is made while the form has
    /// violations. On success the navigator has been sent to the bot URL, which
    /// is also returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an invalid form,
    /// [`Error::InvalidState`] when called from any other state, or the
    /// API client's error if the token request fails.
    pub async fn submit_application(&self, form: &LoanApplicationForm) -> Result<Url, Error> {
        match self.state() {
            AuthState::Unauthenticated | AuthState::ExchangeFailed(_) => {}
            _ => return Err(Error::InvalidState("application already submitted or signed in")),
        }

        let draft = form.clone().into_draft().map_err(Error::Validation)?;
        let grant = self.api.request_auth_token(Some(&draft)).await?;

        tracing::info!(url = %grant.telegram_url, "Redirecting to Telegram bot");
        self.navigator()
            .navigate(Destination::External(grant.telegram_url.clone()));
        Ok(grant.telegram_url)
    }

    /// Sign out: best-effort backend logout, then always clear and return to entry.
    pub async fn logout(&self) {
        if let Err(e) = self.api.logout().await {
            tracing::warn!(error = %e, "Logout request failed");
        }
        self.session().clear();
        self.publish(AuthState::Unauthenticated);
        self.navigator().navigate(Destination::Entry);
    }

    /// Gate for the profile view. Without a session the controller falls back
    /// to [`AuthState::Unauthenticated`], navigates to the entry route and
    /// returns `false`.
    pub fn guard_profile(&self) -> bool {
        if self.session().has_session() {
            if self.state() != AuthState::Authenticated {
                self.publish(AuthState::Authenticated);
            }
            return true;
        }
        tracing::info!("Profile requested without a session");
        self.publish(AuthState::Unauthenticated);
        self.navigator().navigate(Destination::Entry);
        false
    }

    /// Load everything the profile view shows.
    ///
    /// The user, session list and device info are requested concurrently; the
    /// first failure fails the whole load.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthorized`] without a session (the controller is then
    /// [`AuthState::Unauthenticated`]), or the first failing request's error.
    pub async fn load_profile(&self) -> Result<Profile, Error> {
        if !self.guard_profile() {
            return Err(Error::Unauthorized);
        }

        let loaded = tokio::try_join!(
            self.api.fetch_current_user(),
            self.api.fetch_sessions(),
            self.api.fetch_device_info(),
        );

        match loaded {
            Ok((user, sessions, device)) => Ok(Profile::new(user, sessions, device)),
            Err(e) => {
                if matches!(e, Error::Unauthorized) {
                    self.publish(AuthState::Unauthenticated);
                }
                tracing::error!(error = %e, "Failed to load profile");
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for AuthController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthController")
            .field("state", &*self.api.auth_state().borrow())
            .finish_non_exhaustive()
    }
}
