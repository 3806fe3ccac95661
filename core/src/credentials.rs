//! Credential accessor.
//!
//! The backend issues its JWT as an `access_token` cookie. Clients read it
//! back from whatever cookie store they have (`document.cookie` in the
//! browser, a configured cookie string natively) and send it as a bearer
//! token. An absent token is not an error: it is a precondition every
//! authenticated call checks first.

use std::fmt;

/// Cookie holding the bearer token.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Bearer token for the `Authorization` header.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token value.
    pub fn secret(&self) -> &str {
        &self.0
    }

    /// Value of the `Authorization` header.
    pub fn authorization_value(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(****)")
    }
}

impl fmt::Display for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Bearer ****")
    }
}

/// Find a cookie's value in a `name=value; name2=value2` header.
///
/// Pairs are split at their first `=`, so values containing `=` (base64
/// padding) survive intact.
pub fn cookie_value<'a>(cookie_header: &'a str, name: &str) -> Option<&'a str> {
    cookie_header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// Extract the bearer token from a cookie header.
pub fn token_from_cookies(cookie_header: &str) -> Option<BearerToken> {
    cookie_value(cookie_header, ACCESS_TOKEN_COOKIE).map(BearerToken::new)
}

/// Anything that can produce a cookie header.
pub trait CookieStore {
    fn cookie_header(&self) -> Option<String>;
}

impl CookieStore for String {
    fn cookie_header(&self) -> Option<String> {
        Some(self.clone())
    }
}

impl CookieStore for Option<String> {
    fn cookie_header(&self) -> Option<String> {
        self.clone()
    }
}

/// Reads the bearer token from a cookie store on demand.
#[derive(Clone, Debug)]
pub struct CredentialAccessor<S> {
    store: S,
}

impl<S: CookieStore> CredentialAccessor<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Current token, if the store holds one.
    pub fn bearer_token(&self) -> Option<BearerToken> {
        self.store
            .cookie_header()
            .and_then(|header| token_from_cookies(&header))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_found_among_cookies() {
        let header = "theme=dark; access_token=eyJhbGciOi.payload.sig; lang=en";
        let token = token_from_cookies(header).unwrap();
        assert_eq!(token.secret(), "eyJhbGciOi.payload.sig");
        assert_eq!(token.authorization_value(), "Bearer eyJhbGciOi.payload.sig");
    }

    #[test]
    fn test_value_with_equals_sign_is_kept() {
        let token = token_from_cookies("access_token=abc==").unwrap();
        assert_eq!(token.secret(), "abc==");
    }

    #[test]
    fn test_absent_or_empty_token() {
        assert!(token_from_cookies("").is_none());
        assert!(token_from_cookies("theme=dark").is_none());
        assert!(token_from_cookies("access_token=").is_none());
        assert!(token_from_cookies("my_access_token=abc").is_none());
    }

    #[test]
    fn test_token_never_printed() {
        let token = BearerToken::new("super-secret");
        assert!(!format!("{} {:?}", token, token).contains("super-secret"));
    }

    #[test]
    fn test_accessor_over_optional_store() {
        let accessor = CredentialAccessor::new(None::<String>);
        assert!(accessor.bearer_token().is_none());

        let accessor = CredentialAccessor::new(Some("access_token=t1".to_string()));
        assert_eq!(accessor.bearer_token().unwrap().secret(), "t1");
    }
}
