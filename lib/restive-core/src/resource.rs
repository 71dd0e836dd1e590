//! Declarative request descriptors.
//!
//! An [`Endpoint`] is the serializable part of a request description: method,
//! path relative to the client's base URL, query items, headers and body. A
//! [`Resource`] pairs an endpoint with the [`Decode`] strategy that turns the
//! response into a typed value.
//!
//! # Example
//!
//! ```
//! use restive_core::{CommonHeader, Endpoint, Resource};
//!
//! #[derive(serde::Deserialize)]
//! struct User { id: u64, name: String }
//!
//! let users: Resource<Vec<User>> = Resource::json(
//!     Endpoint::get("/users")
//!         .query("id", "7")
//!         .with_header(CommonHeader::AcceptJson),
//! );
//!
//! let request = users.to_request(&"https://api.example.com".parse().unwrap()).unwrap();
//! assert_eq!(request.url().as_str(), "https://api.example.com/users?id=7");
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::decode::{Json, RawBytes, Status};
use crate::request::find_header;
use crate::{
    CommonHeader, ContentType, Decode, Decoder, Error, Method, Request, ResponseMeta, Result,
    TransportError, to_form, to_json,
};

// ============================================================================
// Endpoint
// ============================================================================

/// A single `name=value` query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryItem {
    /// Parameter name.
    pub name: String,
    /// Parameter value, not yet encoded.
    pub value: String,
}

impl QueryItem {
    /// Create a query item.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Serializable description of one logical request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoint {
    additional_headers: BTreeMap<String, String>,
    method: Method,
    path: String,
    query_items: Vec<QueryItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<Bytes>,
}

impl Endpoint {
    /// Create an endpoint with no headers, query or body.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            ..Self::default()
        }
    }

    /// `GET` endpoint.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// `POST` endpoint.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// Add a header, replacing any previous value for that name in any casing.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.additional_headers
            .retain(|key, _| !key.eq_ignore_ascii_case(&name));
        self.additional_headers.insert(name, value.into());
        self
    }

    /// Add one of the [`CommonHeader`]s.
    #[must_use]
    pub fn with_header(self, header: CommonHeader) -> Self {
        self.header(header.name(), header.value())
    }

    /// Append a query item.
    #[must_use]
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_items.push(QueryItem::new(name, value));
        self
    }

    /// Set a raw body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set a JSON body along with its `Content-Type`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Other`] if `value` cannot be serialized.
    pub fn json_body<T: Serialize>(self, value: &T) -> Result<Self> {
        let body = to_json(value)?;
        Ok(self.with_header(CommonHeader::ContentTypeJson).body(body))
    }

    /// Set a form URL-encoded body along with its `Content-Type`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Other`] if `value` is not form encodable.
    pub fn form_body<T: Serialize>(self, value: &T) -> Result<Self> {
        let body = to_form(value)?;
        Ok(self.with_header(CommonHeader::ContentTypeForm).body(body))
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Path relative to the base URL.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Headers sent with the request, and only those.
    #[must_use]
    pub fn additional_headers(&self) -> &BTreeMap<String, String> {
        &self.additional_headers
    }

    /// Query items, in order.
    #[must_use]
    pub fn query_items(&self) -> &[QueryItem] {
        &self.query_items
    }

    /// Request body.
    #[must_use]
    pub fn body_bytes(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Declared content type, if it is one we know.
    #[must_use]
    pub fn content_type(&self) -> Option<ContentType> {
        let (_, value) = find_header(&self.additional_headers, CommonHeader::ContentTypeJson.name())?;
        [ContentType::Json, ContentType::FormUrlEncoded]
            .into_iter()
            .find(|content_type| content_type.as_str() == value.as_str())
    }

    /// Resolve the full URL against `base_url`.
    ///
    /// The path is appended as path segments with exactly one `/` between base
    /// and path; an empty path leaves the base untouched. Query items are
    /// appended in order, and no `?` is added when there are none.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Domain`] with a bad URL code if `base_url` cannot carry a
    /// path, or if the path holds a `.` or `..` segment (plain or percent-encoded).
    pub fn url(&self, base_url: &Url) -> Result<Url> {
        let mut url = base_url.clone();

        let path = self.path.trim_start_matches('/');
        if path.split('/').any(is_dot_segment) {
            return Err(TransportError::bad_url(format!("dot segment in path '{}'", self.path)).into());
        }
        if !path.is_empty() {
            let mut segments = url.path_segments_mut().map_err(|()| {
                Error::from(TransportError::bad_url(format!(
                    "cannot append '{}' to {base_url}",
                    self.path
                )))
            })?;
            segments.pop_if_empty().extend(path.split('/'));
        }

        if !self.query_items.is_empty() {
            url.query_pairs_mut().extend_pairs(
                self.query_items
                    .iter()
                    .map(|item| (item.name.as_str(), item.value.as_str())),
            );
        }

        Ok(url)
    }

    /// Build the concrete request against `base_url`.
    ///
    /// Headers are exactly [`Self::additional_headers`]; nothing is merged in.
    ///
    /// # Errors
    ///
    /// See [`Self::url`].
    pub fn to_request(&self, base_url: &Url) -> Result<Request> {
        let url = self.url(base_url)?;
        let request = Request::builder(self.method, url)
            .headers(
                self.additional_headers
                    .iter()
                    .map(|(name, value)| (name.clone(), value.clone())),
            )
            .maybe_body(self.body.clone())
            .build();
        Ok(request)
    }
}

// `url` would silently drop these instead of sending them.
fn is_dot_segment(segment: &str) -> bool {
    let segment = segment.to_ascii_lowercase().replace("%2e", ".");
    segment == "." || segment == ".."
}

// ============================================================================
// Resource
// ============================================================================

/// An [`Endpoint`] with the strategy decoding its response into `T`.
pub struct Resource<T> {
    endpoint: Endpoint,
    decode: Arc<dyn Decode<T>>,
}

impl<T> Resource<T> {
    /// Pair an endpoint with a decode strategy.
    #[must_use]
    pub fn new(endpoint: Endpoint, decode: impl Decode<T> + 'static) -> Self {
        Self {
            endpoint,
            decode: Arc::new(decode),
        }
    }

    /// Pair an endpoint with a decoding closure.
    ///
    /// ```
    /// use restive_core::{Endpoint, Error, Resource};
    ///
    /// let count: Resource<usize> = Resource::with_fn(Endpoint::get("/count"), |decoder, body, meta| {
    ///     decoder.check_status(meta)?;
    ///     let text = std::str::from_utf8(body.ok_or(Error::InvalidResponseEmpty)?).map_err(Error::other)?;
    ///     text.trim().parse().map_err(Error::other)
    /// });
    /// ```
    #[must_use]
    pub fn with_fn<F>(endpoint: Endpoint, decode: F) -> Self
    where
        F: Fn(&Decoder, Option<&Bytes>, &ResponseMeta) -> Result<T> + Send + Sync + 'static,
    {
        Self::new(endpoint, decode)
    }

    /// The request description.
    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Build the concrete request against `base_url`.
    ///
    /// # Errors
    ///
    /// See [`Endpoint::url`].
    pub fn to_request(&self, base_url: &Url) -> Result<Request> {
        self.endpoint.to_request(base_url)
    }

    /// Run the decode strategy.
    ///
    /// # Errors
    ///
    /// Whatever the strategy reports.
    pub fn decode(&self, decoder: &Decoder, body: Option<&Bytes>, meta: &ResponseMeta) -> Result<T> {
        self.decode.decode(decoder, body, meta)
    }
}

impl<T: DeserializeOwned> Resource<T> {
    /// Decode the JSON body with [`Decoder::decode`].
    #[must_use]
    pub fn json(endpoint: Endpoint) -> Self {
        Self::new(endpoint, Json)
    }
}

impl Resource<()> {
    /// Only check the status.
    #[must_use]
    pub fn status(endpoint: Endpoint) -> Self {
        Self::new(endpoint, Status)
    }
}

impl Resource<Bytes> {
    /// Return the body as received.
    #[must_use]
    pub fn raw(endpoint: Endpoint) -> Self {
        Self::new(endpoint, RawBytes)
    }
}

impl<T> Clone for Resource<T> {
    fn clone(&self) -> Self {
        Self {
            endpoint: self.endpoint.clone(),
            decode: Arc::clone(&self.decode),
        }
    }
}

impl<T> fmt::Debug for Resource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("endpoint", &self.endpoint)
            .field("output", &std::any::type_name::<T>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert2::{check, let_assert};

    use super::*;
    use crate::TransportErrorCode;

    fn base() -> Url {
        Url::parse("https://api.example.com").expect("valid URL")
    }

    #[test]
    fn builds_url_with_path_and_query() {
        let endpoint = Endpoint::get("/users").query("id", "7");
        let request = endpoint.to_request(&base()).expect("request");

        check!(request.url().as_str() == "https://api.example.com/users?id=7");
        check!(request.method() == Method::Get);
        check!(request.headers().is_empty());
        check!(request.body().is_none());
    }

    #[test]
    fn empty_path_and_no_query_keep_base() {
        for base in [
            "https://api.example.com/",
            "https://api.example.com/v1",
            "https://api.example.com/v1/?token=abc",
        ] {
            let base = Url::parse(base).expect("valid URL");
            check!(Endpoint::get("").url(&base).ok() == Some(base.clone()));
        }
    }

    #[test]
    fn single_slash_between_base_and_path() {
        let expected = "https://api.example.com/v1/users/7";
        for (base, path) in [
            ("https://api.example.com/v1", "users/7"),
            ("https://api.example.com/v1/", "users/7"),
            ("https://api.example.com/v1", "/users/7"),
            ("https://api.example.com/v1/", "/users/7"),
        ] {
            let base = Url::parse(base).expect("valid URL");
            let url = Endpoint::get(path).url(&base).expect("url");
            check!(url.as_str() == expected);
        }
    }

    #[test]
    fn query_items_keep_order_and_encoding() {
        let endpoint = Endpoint::get("search")
            .query("q", "rust & http")
            .query("page", "2")
            .query("q", "again");
        let url = endpoint.url(&base()).expect("url");

        check!(url.as_str() == "https://api.example.com/search?q=rust+%26+http&page=2&q=again");
        let pairs: Vec<_> = url.query_pairs().into_owned().collect();
        check!(pairs.len() == 3);
    }

    #[test]
    fn query_items_extend_existing_query() {
        let base = Url::parse("https://api.example.com/?key=secret").expect("valid URL");
        let url = Endpoint::get("users").query("id", "7").url(&base).expect("url");
        check!(url.as_str() == "https://api.example.com/users?key=secret&id=7");
    }

    #[test]
    fn headers_are_exactly_the_additional_headers() {
        let endpoint = Endpoint::new(Method::Delete, "users/7")
            .header("X-Trace", "abc")
            .with_header(CommonHeader::AcceptJson)
            .header("X-Trace", "def");
        let request = endpoint.to_request(&base()).expect("request");

        let expected: HashMap<String, String> = [
            ("X-Trace".to_string(), "def".to_string()),
            ("Accept".to_string(), "application/json".to_string()),
        ]
        .into_iter()
        .collect();
        check!(request.headers() == &expected);
        check!(request.method() == Method::Delete);
    }

    #[test]
    fn json_and_form_bodies_set_content_type() {
        #[derive(Serialize)]
        struct Login<'a> {
            user: &'a str,
        }

        let endpoint = Endpoint::post("login").json_body(&Login { user: "ann" }).expect("json");
        check!(endpoint.content_type() == Some(ContentType::Json));
        check!(endpoint.body_bytes() == Some(&Bytes::from(r#"{"user":"ann"}"#)));

        let endpoint = Endpoint::post("login").form_body(&Login { user: "ann" }).expect("form");
        check!(endpoint.content_type() == Some(ContentType::FormUrlEncoded));
        let request = endpoint.to_request(&base()).expect("request");
        check!(request.body() == Some(&Bytes::from("user=ann")));
        check!(request.header("Content-Type") == Some("application/x-www-form-urlencoded"));
    }

    #[test]
    fn header_names_ignore_case() {
        let endpoint = Endpoint::post("users")
            .header("content-type", "text/plain")
            .with_header(CommonHeader::ContentTypeJson)
            .header("X-TRACE", "abc")
            .header("x-trace", "def");

        check!(endpoint.additional_headers().len() == 2);
        check!(endpoint.content_type() == Some(ContentType::Json));
        let request = endpoint.to_request(&base()).expect("request");
        check!(request.header("X-Trace") == Some("def"));
    }

    #[test]
    fn dot_segments_are_bad_urls() {
        let base = Url::parse("https://api.example.com/v1").expect("valid URL");
        for path in ["../admin", "users/./7", "/..", "%2e%2E/admin", ".%2e"] {
            let_assert!(Err(Error::Domain(err)) = Endpoint::get(path).url(&base));
            check!(err.code() == TransportErrorCode::BadUrl);
        }

        let url = Endpoint::get("files/.hidden/v1..2").url(&base).expect("url");
        check!(url.as_str() == "https://api.example.com/v1/files/.hidden/v1..2");
    }

    #[test]
    fn cannot_be_a_base_url_is_a_bad_url() {
        let base = Url::parse("mailto:someone@example.com").expect("valid URL");
        let result = Endpoint::get("users").to_request(&base);

        let_assert!(Err(Error::Domain(err)) = result);
        check!(err.code() == TransportErrorCode::BadUrl);
    }

    #[test]
    fn endpoint_serde() {
        let endpoint = Endpoint::get("users").query("id", "7").with_header(CommonHeader::AcceptJson);
        let json = serde_json::to_value(&endpoint).expect("serialize");
        check!(
            json == serde_json::json!({
                "additional_headers": { "Accept": "application/json" },
                "method": "GET",
                "path": "users",
                "query_items": [{ "name": "id", "value": "7" }],
            })
        );

        let back: Endpoint = serde_json::from_value(json).expect("deserialize");
        check!(back == endpoint);

        let minimal: Endpoint =
            serde_json::from_str(r#"{"method":"DELETE","path":"users/7"}"#).expect("deserialize");
        check!(minimal == Endpoint::new(Method::Delete, "users/7"));
    }

    #[test]
    fn resource_runs_its_strategy() {
        let resource: Resource<u16> =
            Resource::with_fn(Endpoint::get("status"), |_decoder, _body, meta| Ok(meta.status()));
        let meta = ResponseMeta::new(418, HashMap::new());

        let cloned = resource.clone();
        check!(cloned.decode(&Decoder::default(), None, &meta).ok() == Some(418));
        check!(format!("{resource:?}").contains("u16"));
    }
}
