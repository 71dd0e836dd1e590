//! HTTP response handling.
//!
//! Transports answer with a [`RawResponse`]; the client only lets
//! [`RawResponse::Http`] through and hands its [`ResponseMeta`] and body to the
//! resource's decode strategy.
//!
//! An HTTP body is `None` when the exchange cannot carry one (see
//! [`body_forbidden`]) and `Some` otherwise, even when it is zero bytes long.

use std::collections::HashMap;

use bytes::Bytes;
use url::Url;

use crate::request::find_header;
use crate::{HttpStatus, Method, StatusCategory};

/// Status and headers of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMeta {
    status: u16,
    headers: HashMap<String, String>,
}

impl ResponseMeta {
    /// Creates response metadata.
    #[must_use]
    pub fn new(status: u16, headers: HashMap<String, String>) -> Self {
        Self { status, headers }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Classified status, `None` when the code is outside `100..600`.
    #[must_use]
    pub const fn http_status(&self) -> Option<HttpStatus> {
        HttpStatus::new(self.status)
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Single header value by name, ignoring case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name).map(|(_, value)| value.as_str())
    }

    /// Status is 4xx or 5xx, or is no valid HTTP status at all.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.http_status().is_none_or(|status| status.is_error())
    }

    /// Status is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        StatusCategory::classify(self.status) == Some(StatusCategory::Success)
    }
}

/// What a transport produced for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawResponse {
    /// A regular HTTP response.
    Http {
        /// Status and headers.
        meta: ResponseMeta,
        /// Response body; `None` when the response has no message body at all.
        body: Option<Bytes>,
    },
    /// Content fetched through a non-HTTP scheme (e.g. `file:`).
    NonHttp {
        /// Where the content came from.
        url: Url,
        /// The content.
        body: Bytes,
    },
}

impl RawResponse {
    /// An HTTP response with a body.
    #[must_use]
    pub fn http(status: u16, headers: HashMap<String, String>, body: impl Into<Bytes>) -> Self {
        Self::Http {
            meta: ResponseMeta::new(status, headers),
            body: Some(body.into()),
        }
    }

    /// An HTTP response without a message body.
    #[must_use]
    pub fn http_without_body(status: u16, headers: HashMap<String, String>) -> Self {
        Self::Http {
            meta: ResponseMeta::new(status, headers),
            body: None,
        }
    }

    /// Split an HTTP response into body and metadata, `None` otherwise.
    #[must_use]
    pub fn into_http(self) -> Option<(Option<Bytes>, ResponseMeta)> {
        match self {
            Self::Http { meta, body } => Some((body, meta)),
            Self::NonHttp { .. } => None,
        }
    }

    /// The body, whatever the protocol.
    #[must_use]
    pub fn body(&self) -> Option<&Bytes> {
        match self {
            Self::Http { body, .. } => body.as_ref(),
            Self::NonHttp { body, .. } => Some(body),
        }
    }
}

/// Exchanges that never carry a response body: `HEAD` requests and `1xx`, `204`, `304` statuses.
#[must_use]
pub fn body_forbidden(method: Method, status: u16) -> bool {
    method == Method::Head || matches!(status, 100..200 | 204 | 304)
}
