#![doc = include_str!("../README.md")]

pub mod api;
pub mod callback;
pub mod config;
pub mod controller;
pub mod error;
pub mod loan;
pub mod navigation;
pub mod profile;
pub mod session;
pub mod types;
pub mod validation;

// Re-exports for convenient access
pub use api::ApiClient;
pub use callback::{CALLBACK_PARAM, take_callback_token};
pub use config::{ClientConfig, Environment};
pub use controller::{AuthController, AuthState, ExchangeFailure};
pub use error::Error;
pub use loan::{LoanDraft, LoanPurpose, PaymentEstimate, format_rubles, group_digits};
pub use navigation::{Destination, MemoryNavigator, Navigator};
pub use profile::Profile;
pub use session::{CookieBackend, MemoryCookieJar, SessionStore};
pub use types::{AuthSession, AuthTokenGrant, CallbackToken, DeviceInfo, SessionToken, User, VerifyResponse};
pub use validation::{LoanApplicationForm, LoanField, ValidationErrors, validate};
