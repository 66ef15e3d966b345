use cookie::{Cookie, SameSite};
use time::{Duration, OffsetDateTime};

/// Create the session cookie.
pub(super) fn session_cookie(
    name: &str,
    token: &str,
    ttl_days: i64,
    secure: bool,
) -> Cookie<'static> {
    let ttl = Duration::days(ttl_days);
    Cookie::build((name.to_string(), token.to_string()))
        .secure(secure)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(ttl)
        .expires(OffsetDateTime::now_utc() + ttl)
        .build()
}

/// Whether a stored cookie has passed its expiry.
pub(super) fn is_expired(cookie: &Cookie<'_>, now: OffsetDateTime) -> bool {
    cookie.expires_datetime().is_some_and(|at| at <= now)
}
