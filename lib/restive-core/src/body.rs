//! Body serialization utilities and frequently used headers.

use bytes::Bytes;

use crate::{Error, Result};

/// Content type for request bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// JSON content type (`application/json`).
    Json,
    /// Form URL-encoded content type (`application/x-www-form-urlencoded`).
    FormUrlEncoded,
}

impl ContentType {
    /// Get the MIME type string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::FormUrlEncoded => "application/x-www-form-urlencoded",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Frequently used request headers.
///
/// ```
/// use restive_core::{CommonHeader, Endpoint};
///
/// let endpoint = Endpoint::get("/users").with_header(CommonHeader::AcceptJson);
/// assert_eq!(endpoint.additional_headers().get("Accept").map(String::as_str), Some("application/json"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommonHeader {
    /// `Accept: application/json`
    AcceptJson,
    /// `Content-Type: application/x-www-form-urlencoded`
    ContentTypeForm,
    /// `Content-Type: application/json`
    ContentTypeJson,
}

impl CommonHeader {
    /// Header name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AcceptJson => "Accept",
            Self::ContentTypeForm | Self::ContentTypeJson => "Content-Type",
        }
    }

    /// Header value.
    #[must_use]
    pub const fn value(&self) -> &'static str {
        match self {
            Self::AcceptJson | Self::ContentTypeJson => ContentType::Json.as_str(),
            Self::ContentTypeForm => ContentType::FormUrlEncoded.as_str(),
        }
    }

    /// `(name, value)` pair, owned.
    #[must_use]
    pub fn pair(&self) -> (String, String) {
        (self.name().to_string(), self.value().to_string())
    }
}

/// Serialize a value to JSON bytes.
///
/// # Example
///
/// ```
/// use restive_core::to_json;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct User { name: String }
///
/// let user = User { name: "Alice".to_string() };
/// let bytes = to_json(&user).expect("serialize");
/// assert_eq!(bytes.as_ref(), br#"{"name":"Alice"}"#);
/// ```
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<Bytes> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(Error::other)
}

/// Serialize a value to form URL-encoded bytes.
///
/// Uses `serde_html_form`, so `Vec<T>` fields become repeated keys
/// (e.g., `tags=a&tags=b&tags=c`).
///
/// # Example
///
/// ```
/// use restive_core::to_form;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Login { username: String, password: String }
///
/// let login = Login { username: "alice".to_string(), password: "secret".to_string() };
/// let bytes = to_form(&login).expect("serialize");
/// assert_eq!(bytes.as_ref(), b"username=alice&password=secret");
/// ```
pub fn to_form<T: serde::Serialize>(value: &T) -> Result<Bytes> {
    serde_html_form::to_string(value)
        .map(|s| Bytes::from(s.into_bytes()))
        .map_err(Error::other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_header_pairs() {
        assert_eq!(
            CommonHeader::AcceptJson.pair(),
            ("Accept".to_string(), "application/json".to_string())
        );
        assert_eq!(CommonHeader::ContentTypeJson.name(), "Content-Type");
        assert_eq!(
            CommonHeader::ContentTypeForm.value(),
            "application/x-www-form-urlencoded"
        );
    }

    #[test]
    fn to_form_rejects_scalars() {
        let err = to_form(&42_u32).expect_err("only maps and structs are form encodable");
        assert!(matches!(err, Error::Other(_)));
    }
}
