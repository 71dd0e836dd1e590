//! Request hooks.
//!
//! Hooks see every concrete [`Request`] right before it is handed to the
//! transport, in the order they were registered on the client. They are the
//! place for authentication and other cross-cutting headers.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use base64::Engine;

use crate::Request;

/// Mutates a request before dispatch.
pub trait RequestHook: Send + Sync {
    /// Adjust `request` in place.
    fn before_send(&self, request: &mut Request);
}

impl<F> RequestHook for F
where
    F: Fn(&mut Request) + Send + Sync,
{
    fn before_send(&self, request: &mut Request) {
        self(request);
    }
}

// ============================================================================
// Header Injection
// ============================================================================

/// Sets or removes headers on every request.
///
/// A `None` value removes the header, which lets a client strip a header that
/// an endpoint declares.
///
/// ```
/// use restive_core::{HeaderInjection, Method, Request, RequestHook};
///
/// let hook = HeaderInjection::new()
///     .set("X-Client", "restive")
///     .remove("Cookie");
///
/// let mut request = Request::builder(Method::Get, "https://api.example.com".parse().unwrap())
///     .header("Cookie", "session=1")
///     .build();
/// hook.before_send(&mut request);
///
/// assert_eq!(request.header("X-Client"), Some("restive"));
/// assert_eq!(request.header("Cookie"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderInjection {
    headers: BTreeMap<String, Option<String>>,
}

impl HeaderInjection {
    /// No header changes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name` to `value`, or remove it when `value` is `None`.
    ///
    /// Names match regardless of case; the last change for a name wins.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: Option<String>) -> Self {
        let name = name.into();
        self.headers.retain(|key, _| !key.eq_ignore_ascii_case(&name));
        self.headers.insert(name, value);
        self
    }

    /// Set `name` to `value`.
    #[must_use]
    pub fn set(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.header(name, Some(value.into()))
    }

    /// Remove `name`.
    #[must_use]
    pub fn remove(self, name: impl Into<String>) -> Self {
        self.header(name, None)
    }

    /// The planned changes.
    #[must_use]
    pub fn headers(&self) -> &BTreeMap<String, Option<String>> {
        &self.headers
    }
}

impl<K, V> FromIterator<(K, Option<V>)> for HeaderInjection
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, Option<V>)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |hook, (name, value)| hook.header(name, value.map(Into::into)))
    }
}

impl RequestHook for HeaderInjection {
    fn before_send(&self, request: &mut Request) {
        for (name, value) in &self.headers {
            match value {
                Some(value) => request.set_header(name.clone(), value.clone()),
                None => {
                    request.remove_header(name);
                }
            }
        }
    }
}

// ============================================================================
// Authentication
// ============================================================================

/// Adds `Authorization: Bearer <token>`.
#[derive(Clone)]
pub struct BearerAuth {
    token: Arc<str>,
}

impl BearerAuth {
    /// Authenticate with `token`.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Arc::from(token.into()),
        }
    }
}

impl fmt::Debug for BearerAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerAuth").field("token", &"***").finish()
    }
}

impl RequestHook for BearerAuth {
    fn before_send(&self, request: &mut Request) {
        request.set_header("Authorization", format!("Bearer {}", self.token));
    }
}

/// Adds `Authorization: Basic <base64(user:pass)>`.
#[derive(Clone)]
pub struct BasicAuth {
    /// Base64-encoded "username:password".
    encoded_credentials: Arc<str>,
}

impl BasicAuth {
    /// Authenticate with `username` and `password`.
    #[must_use]
    pub fn new(username: impl AsRef<str>, password: impl AsRef<str>) -> Self {
        let credentials = format!("{}:{}", username.as_ref(), password.as_ref());
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
        Self {
            encoded_credentials: Arc::from(encoded),
        }
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth").field("credentials", &"***").finish()
    }
}

impl RequestHook for BasicAuth {
    fn before_send(&self, request: &mut Request) {
        request.set_header("Authorization", format!("Basic {}", self.encoded_credentials));
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;
    use crate::Method;

    fn sample_request() -> Request {
        let url = Url::parse("https://api.example.com/users").expect("valid URL");
        Request::builder(Method::Get, url)
            .header("Accept", "text/plain")
            .build()
    }

    #[test]
    fn header_injection_sets_and_removes() {
        let hook: HeaderInjection = [
            ("Accept", Some("application/json")),
            ("X-Api-Key", Some("k")),
            ("X-Missing", None),
        ]
        .into_iter()
        .collect();

        let mut request = sample_request();
        hook.before_send(&mut request);
        check_headers(&request, &[("Accept", "application/json"), ("X-Api-Key", "k")]);

        let mut request = sample_request();
        HeaderInjection::new().remove("Accept").before_send(&mut request);
        assert!(request.headers().is_empty());
    }

    fn check_headers(request: &Request, expected: &[(&str, &str)]) {
        assert_eq!(request.headers().len(), expected.len());
        for (name, value) in expected {
            assert_eq!(request.header(name), Some(*value), "header {name}");
        }
    }

    #[test]
    fn bearer_auth_header() {
        let mut request = sample_request();
        BearerAuth::new("s3cr3t").before_send(&mut request);
        assert_eq!(request.header("Authorization"), Some("Bearer s3cr3t"));
    }

    #[test]
    fn basic_auth_header() {
        let mut request = sample_request();
        BasicAuth::new("aladdin", "opensesame").before_send(&mut request);
        assert_eq!(
            request.header("Authorization"),
            Some("Basic YWxhZGRpbjpvcGVuc2VzYW1l")
        );
    }

    #[test]
    fn credentials_are_not_debug_printed() {
        assert!(!format!("{:?}", BearerAuth::new("s3cr3t")).contains("s3cr3t"));
        assert!(!format!("{:?}", BasicAuth::new("u", "p")).contains("dTpw"));
    }

    #[test]
    fn closures_are_hooks() {
        let hook = |request: &mut Request| request.set_header("X-Request-Id", "42");
        let mut request = sample_request();
        hook.before_send(&mut request);
        assert_eq!(request.header("X-Request-Id"), Some("42"));
    }

    #[test]
    fn hooks_match_header_names_regardless_of_case() {
        let mut request = Request::builder(
            Method::Get,
            Url::parse("https://api.example.com/me").expect("valid URL"),
        )
        .header("authorization", "Bearer stale")
        .header("x-debug", "1")
        .build();

        BearerAuth::new("fresh").before_send(&mut request);
        HeaderInjection::new()
            .set("X-CLIENT", "a")
            .set("x-client", "b")
            .remove("X-Debug")
            .before_send(&mut request);

        check_headers(&request, &[("Authorization", "Bearer fresh"), ("X-Client", "b")]);
    }
}
