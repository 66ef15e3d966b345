//! Cookie-backed session token persistence.
//!
//! The browser cookie jar is abstracted behind [`CookieBackend`]; hosts plug in
//! their own (a `document.cookie` bridge, a webview store) or use the bundled
//! [`MemoryCookieJar`].
//!
//! ```rust,ignore
//! use kreditscore_auth::{ClientConfig, MemoryCookieJar, SessionStore, SessionToken};
//!
//! let store = SessionStore::new(&ClientConfig::default(), MemoryCookieJar::new());
//! store.save(&SessionToken::new("token"));
//! assert!(store.has_session());
//! ```

mod cookies;
mod jar;
mod store;

pub use jar::{CookieBackend, MemoryCookieJar};
pub use store::SessionStore;
