use crate::validation::ValidationErrors;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Transport failure, timeout, or an undecodable response body.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A success response whose JSON did not have the expected shape.
    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The backend answered `401 Unauthorized`.
    ///
    /// By the time a caller sees this, the session has already been cleared
    /// and the navigator sent to the entry route.
    #[error("Not authorized")]
    Unauthorized,

    /// The backend rejected the callback token (expired, malformed, already used).
    #[error("Authorization exchange rejected ({status}): {detail}")]
    AuthExchange { status: u16, detail: String },

    /// The exchange succeeded but the session token did not survive the write.
    #[error("Session token was not persisted by the cookie store")]
    StoragePersistence,

    #[error("{operation} failed ({status}): {detail}")]
    Api {
        operation: &'static str,
        status: u16,
        detail: String,
    },

    #[error("Invalid loan application: {0}")]
    Validation(ValidationErrors),

    #[error("Operation not allowed: {0}")]
    InvalidState(&'static str),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Message suitable for showing to the end user.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::AuthExchange { .. } => "Authorization failed. Please try again.",
            Self::StoragePersistence => {
                "Authorization succeeded but the session could not be saved. \
                 Check that cookies are enabled for this site."
            }
            Self::Validation(_) => "Please correct the highlighted fields.",
            Self::Unauthorized => "Your session has ended. Please sign in again.",
            Self::Network(_)
            | Self::Decode(_)
            | Self::Api { .. }
            | Self::InvalidState(_)
            | Self::Config(_) => {
                "Something went wrong. Please try again."
            }
        }
    }
}
