use url::Url;

use crate::types::CallbackToken;

/// Query parameter the Telegram bot uses to hand the callback token back.
pub const CALLBACK_PARAM: &str = "auth_token";

/// Extract the callback token from `url`.
///
/// Returns the token (if present and non-empty) together with `url` stripped
/// of every `auth_token` pair. Other query pairs are kept; an empty query is
/// removed entirely.
#[must_use]
pub fn take_callback_token(url: &Url) -> (Option<CallbackToken>, Url) {
    let mut token = None;
    let mut found = false;
    let mut kept = Vec::new();
    for (key, value) in url.query_pairs() {
        if key == CALLBACK_PARAM {
            found = true;
            if token.is_none() && !value.is_empty() {
                token = Some(CallbackToken::new(value.into_owned()));
            }
        } else {
            kept.push((key.into_owned(), value.into_owned()));
        }
    }

    if !found {
        return (None, url.clone());
    }

    let mut stripped = url.clone();
    if kept.is_empty() {
        stripped.set_query(None);
    } else {
        stripped
            .query_pairs_mut()
            .clear()
            .extend_pairs(kept.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }

    (token, stripped)
}
