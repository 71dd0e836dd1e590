//! Exchange reporting.
//!
//! Every HTTP exchange that reaches the client is handed to a [`Reporter`]
//! after the response arrived and before it is decoded. Reporting never
//! influences the outcome.

use bytes::Bytes;
use tracing::trace;

use crate::{Request, ResponseMeta};

/// Default number of body bytes included in a trace record.
pub const DEFAULT_BODY_LIMIT: usize = 1024;

/// Records request/response exchanges.
pub trait Reporter: Send + Sync + std::fmt::Debug {
    /// Record one exchange. Must not block.
    fn record(&self, request: &Request, meta: &ResponseMeta, body: Option<&Bytes>);
}

/// Emits each exchange as a `trace!` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TracingReporter {
    body_limit: usize,
}

impl Default for TracingReporter {
    fn default() -> Self {
        Self::new(DEFAULT_BODY_LIMIT)
    }
}

impl TracingReporter {
    /// Include at most `body_limit` bytes of each body.
    #[must_use]
    pub const fn new(body_limit: usize) -> Self {
        Self { body_limit }
    }

    /// The body excerpt put in the trace record.
    #[must_use]
    pub fn excerpt(&self, body: Option<&Bytes>) -> String {
        let Some(body) = body else {
            return String::from("<none>");
        };
        let shown = body.get(..self.body_limit).unwrap_or(&body[..]);
        let mut excerpt = String::from_utf8_lossy(shown).into_owned();
        if shown.len() < body.len() {
            excerpt.push_str(&format!("... ({} bytes)", body.len()));
        }
        excerpt
    }
}

impl Reporter for TracingReporter {
    fn record(&self, request: &Request, meta: &ResponseMeta, body: Option<&Bytes>) {
        trace!(
            method = %request.method(),
            url = %request.url(),
            request_headers = ?request.headers(),
            status = meta.status(),
            response_headers = ?meta.headers(),
            body = %self.excerpt(body),
            "http exchange"
        );
    }
}

/// Discards every record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoopReporter;

impl Reporter for NoopReporter {
    fn record(&self, _request: &Request, _meta: &ResponseMeta, _body: Option<&Bytes>) {}
}
