use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use cookie::{Cookie, CookieJar};
use time::OffsetDateTime;

use super::cookies::is_expired;

/// Host-provided cookie storage for the site.
///
/// Implementations never fail: a write that does not take effect is detected
/// by reading the cookie back, not by an error.
pub trait CookieBackend: Send + Sync + 'static {
    /// Look up a live cookie by name.
    fn get(&self, name: &str) -> Option<Cookie<'static>>;

    /// Store a cookie, replacing any cookie with the same name.
    fn set(&self, cookie: Cookie<'static>);

    /// Delete a cookie by name. Deleting a missing cookie is a no-op.
    fn remove(&self, name: &str);
}

impl<T: CookieBackend> CookieBackend for Arc<T> {
    fn get(&self, name: &str) -> Option<Cookie<'static>> {
        (**self).get(name)
    }

    fn set(&self, cookie: Cookie<'static>) {
        (**self).set(cookie);
    }

    fn remove(&self, name: &str) {
        (**self).remove(name);
    }
}

/// In-process cookie jar with browser-like expiry.
#[derive(Debug, Default)]
pub struct MemoryCookieJar {
    jar: Mutex<CookieJar>,
}

impl MemoryCookieJar {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CookieJar> {
        self.jar.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CookieBackend for MemoryCookieJar {
    fn get(&self, name: &str) -> Option<Cookie<'static>> {
        let mut jar = self.lock();
        let cookie = jar.get(name)?.clone();
        if is_expired(&cookie, OffsetDateTime::now_utc()) {
            jar.remove(name.to_string());
            return None;
        }
        Some(cookie)
    }

    fn set(&self, cookie: Cookie<'static>) {
        self.lock().add(cookie);
    }

    fn remove(&self, name: &str) {
        self.lock().remove(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use cookie::Cookie;
    use time::Duration;

    use super::*;

    #[test]
    fn test_set_then_get() {
        let jar = MemoryCookieJar::new();
        jar.set(Cookie::new("access_token", "abc"));
        assert_eq!(jar.get("access_token").unwrap().value(), "abc");
        assert!(jar.get("other").is_none());
    }

    #[test]
    fn test_set_overwrites_same_name() {
        let jar = MemoryCookieJar::new();
        jar.set(Cookie::new("access_token", "first"));
        jar.set(Cookie::new("access_token", "second"));
        assert_eq!(jar.get("access_token").unwrap().value(), "second");
    }

    #[test]
    fn test_expired_cookie_reads_as_absent() {
        let jar = MemoryCookieJar::new();
        let cookie = Cookie::build(("access_token", "abc"))
            .expires(OffsetDateTime::now_utc() - Duration::minutes(1))
            .build();
        jar.set(cookie);
        assert!(jar.get("access_token").is_none());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let jar = MemoryCookieJar::new();
        jar.remove("access_token");
        jar.set(Cookie::new("access_token", "abc"));
        jar.remove("access_token");
        jar.remove("access_token");
        assert!(jar.get("access_token").is_none());
    }

    #[test]
    fn test_shared_through_arc() {
        let jar = Arc::new(MemoryCookieJar::new());
        let backend: Box<dyn CookieBackend> = Box::new(Arc::clone(&jar));
        backend.set(Cookie::new("access_token", "abc"));
        assert!(jar.get("access_token").is_some());
    }
}
