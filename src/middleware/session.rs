//! Session binding
//!
//! The session remembers one thing: the dataset the user is currently
//! working with. It travels in a signed cookie, so a tampered value is
//! simply ignored.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use sha2::{Digest, Sha512};

use crate::AppError;
use crate::upload::is_secure;

/// Cookie name
pub const SESSION_COOKIE_NAME: &str = "flowguard_session";

/// Typed session contents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    current_file: Option<String>,
}

impl SessionState {
    /// Read the session from a verified cookie jar
    pub fn from_jar(jar: &SignedCookieJar) -> Self {
        let current_file = jar
            .get(SESSION_COOKIE_NAME)
            .map(|cookie| cookie.value().to_string())
            .filter(|name| is_secure(name));
        Self { current_file }
    }

    pub fn current_file(&self) -> Option<&str> {
        self.current_file.as_deref()
    }

    /// Which file is relevant: an explicit request parameter wins over the
    /// bound file
    pub fn resolve<'a>(&'a self, explicit: Option<&'a str>) -> Option<&'a str> {
        explicit
            .filter(|name| !name.is_empty())
            .or(self.current_file())
    }

    pub fn bind(&mut self, name: impl Into<String>) {
        self.current_file = Some(name.into());
    }

    /// Drop the binding if it points at `name`; returns whether it did
    pub fn forget(&mut self, name: &str) -> bool {
        if self.current_file.as_deref() == Some(name) {
            self.current_file = None;
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.current_file = None;
    }

    /// Write the session back into the jar
    pub fn apply(&self, jar: SignedCookieJar, secure: bool) -> SignedCookieJar {
        match &self.current_file {
            Some(name) => jar.add(
                Cookie::build((SESSION_COOKIE_NAME, name.clone()))
                    .path("/")
                    .http_only(true)
                    .same_site(SameSite::Lax)
                    .secure(secure),
            ),
            None => jar.remove(Cookie::build(SESSION_COOKIE_NAME).path("/")),
        }
    }
}

/// Signing key for the session cookie. Without a configured secret a random
/// key is used and sessions end on restart.
pub fn signing_key(secret: Option<&str>) -> Key {
    match secret {
        Some(secret) => {
            let digest = Sha512::digest(secret.as_bytes());
            Key::try_from(digest.as_slice()).unwrap_or_else(|_| Key::generate())
        }
        None => {
            tracing::warn!("SESSION_SECRET not set, using a random session key");
            Key::generate()
        }
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for SessionState
where
    S: Send + Sync,
    Key: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = SignedCookieJar::<Key>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::InternalError("Failed to read session cookie".to_string()))?;
        Ok(Self::from_jar(&jar))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_precedence() {
        let mut session = SessionState::default();
        assert_eq!(session.resolve(None), None);

        session.bind("a.csv");
        assert_eq!(session.resolve(None), Some("a.csv"));
        assert_eq!(session.resolve(Some("b.csv")), Some("b.csv"));
        assert_eq!(session.resolve(Some("")), Some("a.csv"));
    }

    #[test]
    fn test_latest_upload_wins() {
        let mut session = SessionState::default();
        session.bind("a.csv");
        session.bind("b.csv");
        assert_eq!(session.current_file(), Some("b.csv"));
    }

    #[test]
    fn test_forget_only_matching() {
        let mut session = SessionState::default();
        session.bind("b.csv");

        assert!(!session.forget("a.csv"));
        assert_eq!(session.current_file(), Some("b.csv"));

        assert!(session.forget("b.csv"));
        assert_eq!(session.current_file(), None);
    }

    #[test]
    fn test_cookie_round_trip() {
        let key = signing_key(Some("test-secret"));
        let mut session = SessionState::default();
        session.bind("flows.csv");

        let jar = session.apply(SignedCookieJar::new(key.clone()), false);
        assert_eq!(SessionState::from_jar(&jar).current_file(), Some("flows.csv"));

        session.clear();
        let jar = session.apply(jar, false);
        assert_eq!(SessionState::from_jar(&jar), SessionState::default());
    }

    #[test]
    fn test_same_secret_same_key() {
        let a = signing_key(Some("secret"));
        let b = signing_key(Some("secret"));
        assert_eq!(a.master(), b.master());
    }
}
