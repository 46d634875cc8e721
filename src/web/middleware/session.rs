//! Session cookie extraction and response cookies.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::convert::Infallible;

use crate::auth::{SessionCookie, SESSION_COOKIE_NAME};

/// The session secret sent by the browser, if any.
///
/// Extraction never fails; handlers pass the value to the actions, which
/// decide whether a missing session is an error.
#[derive(Debug, Clone, Default)]
pub struct SessionSecret(pub Option<String>);

impl SessionSecret {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionSecret
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let secret = jar
            .get(SESSION_COOKIE_NAME)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty());
        Ok(SessionSecret(secret))
    }
}

fn session_cookie(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .build()
}

/// Apply a session cookie change to the response jar.
pub fn apply_session_cookie(jar: CookieJar, effect: SessionCookie, secure: bool) -> CookieJar {
    match effect {
        SessionCookie::Set(secret) => jar.add(session_cookie(secret, secure)),
        SessionCookie::Clear => {
            let mut cookie = session_cookie(String::new(), secure);
            cookie.make_removal();
            jar.add(cookie)
        }
    }
}
