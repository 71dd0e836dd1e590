//! HTTP status classification.
//!
//! [`StatusCategory`] groups a status code by its hundreds digit and
//! [`HttpStatus`] pairs a code with its category.
//!
//! ```
//! use restive_core::{HttpStatus, StatusCategory};
//!
//! assert_eq!(StatusCategory::classify(404), Some(StatusCategory::ClientError));
//! assert!(HttpStatus::new(503).is_some_and(|status| status.is_error()));
//! assert_eq!(StatusCategory::classify(600), None);
//! ```

use derive_more::Display;

/// Status codes cacheable by default (RFC 7231 section 6.1).
pub const DEFAULT_CACHEABLE: [u16; 11] = [200, 203, 204, 206, 300, 301, 404, 405, 410, 414, 501];

/// Class of an HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum StatusCategory {
    /// 1xx
    #[display("informational")]
    Informational,
    /// 2xx
    #[display("success")]
    Success,
    /// 3xx
    #[display("redirection")]
    Redirection,
    /// 4xx
    #[display("client error")]
    ClientError,
    /// 5xx
    #[display("server error")]
    ServerError,
}

impl StatusCategory {
    /// Classify a status code, `None` outside `100..600`.
    #[must_use]
    pub const fn classify(code: u16) -> Option<Self> {
        match code {
            100..200 => Some(Self::Informational),
            200..300 => Some(Self::Success),
            300..400 => Some(Self::Redirection),
            400..500 => Some(Self::ClientError),
            500..600 => Some(Self::ServerError),
            _ => None,
        }
    }

    /// Client or server error.
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, Self::ClientError | Self::ServerError)
    }

    /// Anything that is not an error, redirections and informational included.
    #[must_use]
    pub const fn is_success(self) -> bool {
        !self.is_error()
    }
}

/// A status code known to fall in `100..600`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display("{code} ({category})")]
pub struct HttpStatus {
    code: u16,
    category: StatusCategory,
}

impl HttpStatus {
    /// Classify `code`, `None` when it is not a valid HTTP status.
    #[must_use]
    pub const fn new(code: u16) -> Option<Self> {
        match StatusCategory::classify(code) {
            Some(category) => Some(Self { code, category }),
            None => None,
        }
    }

    /// Numeric status code.
    #[must_use]
    pub const fn code(&self) -> u16 {
        self.code
    }

    /// Category of the code.
    #[must_use]
    pub const fn category(&self) -> StatusCategory {
        self.category
    }

    /// See [`StatusCategory::is_error`].
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.category.is_error()
    }

    /// See [`StatusCategory::is_success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.category.is_success()
    }

    /// See [`is_default_cacheable`].
    #[must_use]
    pub fn is_default_cacheable(&self) -> bool {
        is_default_cacheable(self.code)
    }
}

/// Whether responses with this status may be cached without explicit freshness information.
///
/// The client never consults this; it is offered to callers layering their own cache.
#[must_use]
pub fn is_default_cacheable(code: u16) -> bool {
    DEFAULT_CACHEABLE.contains(&code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_out_of_range() {
        assert_eq!(StatusCategory::classify(0), None);
        assert_eq!(StatusCategory::classify(99), None);
        assert_eq!(StatusCategory::classify(600), None);
        assert_eq!(StatusCategory::classify(u16::MAX), None);
        assert!(HttpStatus::new(42).is_none());
    }

    #[test]
    fn classify_boundaries() {
        let cases = [
            (100, StatusCategory::Informational),
            (199, StatusCategory::Informational),
            (200, StatusCategory::Success),
            (299, StatusCategory::Success),
            (300, StatusCategory::Redirection),
            (399, StatusCategory::Redirection),
            (400, StatusCategory::ClientError),
            (499, StatusCategory::ClientError),
            (500, StatusCategory::ServerError),
            (599, StatusCategory::ServerError),
        ];
        for (code, expected) in cases {
            assert_eq!(StatusCategory::classify(code), Some(expected), "code {code}");
        }
    }

    #[test]
    fn error_predicates() {
        assert!(StatusCategory::ClientError.is_error());
        assert!(StatusCategory::ServerError.is_error());
        assert!(StatusCategory::Redirection.is_success());
        assert!(StatusCategory::Informational.is_success());

        let status = HttpStatus::new(401).expect("valid status");
        assert_eq!(status.code(), 401);
        assert!(status.is_error());
        assert!(!status.is_success());
        assert_eq!(status.to_string(), "401 (client error)");
    }

    #[test]
    fn default_cacheable_is_exactly_the_rfc_set() {
        let cacheable: Vec<u16> = (0..=999).filter(|code| is_default_cacheable(*code)).collect();
        assert_eq!(cacheable, DEFAULT_CACHEABLE);

        assert!(HttpStatus::new(404).is_some_and(|s| s.is_default_cacheable()));
        assert!(HttpStatus::new(201).is_some_and(|s| !s.is_default_cacheable()));
    }
}
