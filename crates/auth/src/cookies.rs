//! Session cookie construction

use std::time::Duration;

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::OffsetDateTime;

/// Name of the cookie holding a session credential
pub const SESSION_COOKIE_NAME: &str = "session";

/// Cookie that installs `value` as the session for `max_age`.
pub fn session_cookie(value: String, max_age: Duration, secure: bool) -> Cookie<'static> {
    let max_age = time::Duration::seconds(i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX));

    Cookie::build((SESSION_COOKIE_NAME, value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(max_age)
        .build()
}

/// Cookie that removes the session from the browser.
pub fn clear_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, ""))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .expires(OffsetDateTime::UNIX_EPOCH)
        .build()
}
