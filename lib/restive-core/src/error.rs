//! Error types for restive.
//!
//! Every failure surfaced by the client is one of the eight [`Error`] kinds.
//! Raw failures from transports or decode strategies go through
//! [`Error::translate`], which is idempotent.

use derive_more::{Display, Error};

use crate::DecodingReport;

/// Boxed error accepted by [`Error::translate`] and carried by [`Error::Other`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// ============================================================================
// Transport Error
// ============================================================================

/// Machine code of a network-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum TransportErrorCode {
    /// The request was cancelled before completion.
    #[display("cancelled")]
    Cancelled,
    /// The URL could not be built or parsed.
    #[display("bad URL")]
    BadUrl,
    /// The transport gave up waiting.
    #[display("timed out")]
    TimedOut,
    /// No connection could be established.
    #[display("cannot connect to host")]
    CannotConnect,
    /// The connection dropped while exchanging data.
    #[display("network connection lost")]
    ConnectionLost,
    /// TLS handshake or certificate validation failed.
    #[display("secure connection failed")]
    SecureConnectionFailed,
    /// Anything the transport could not classify.
    #[display("unknown")]
    Unknown,
}

impl TransportErrorCode {
    /// Numeric code in the network error domain.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Unknown => -1,
            Self::Cancelled => -999,
            Self::BadUrl => -1000,
            Self::TimedOut => -1001,
            Self::CannotConnect => -1004,
            Self::ConnectionLost => -1005,
            Self::SecureConnectionFailed => -1200,
        }
    }

    /// Inverse of [`Self::code`]; unassigned codes become [`Self::Unknown`].
    #[must_use]
    pub const fn from_code(code: i32) -> Self {
        match code {
            -999 => Self::Cancelled,
            -1000 => Self::BadUrl,
            -1001 => Self::TimedOut,
            -1004 => Self::CannotConnect,
            -1005 => Self::ConnectionLost,
            -1200 => Self::SecureConnectionFailed,
            _ => Self::Unknown,
        }
    }
}

/// A failure raised by a transport while sending a request.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("{code} ({}): {message}", code.code())]
pub struct TransportError {
    code: TransportErrorCode,
    message: String,
}

impl TransportError {
    /// Create a transport error.
    #[must_use]
    pub fn new(code: TransportErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Create a bad URL error.
    #[must_use]
    pub fn bad_url(message: impl Into<String>) -> Self {
        Self::new(TransportErrorCode::BadUrl, message)
    }

    /// The machine code.
    #[must_use]
    pub const fn code(&self) -> TransportErrorCode {
        self.code
    }

    /// Human readable detail.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// TLS or certificate failure.
    #[must_use]
    pub fn is_secure_connection_failure(&self) -> bool {
        self.code == TransportErrorCode::SecureConnectionFailed
    }
}

// ============================================================================
// Error Type
// ============================================================================

/// Main error type for restive operations.
#[derive(Debug, Display)]
pub enum Error {
    /// Network error from the transport, carrying its machine code.
    #[display("network error: {_0}")]
    Domain(TransportError),

    /// The body did not decode into the target type.
    #[display("{_0}")]
    JsonDecodingFailure(Box<DecodingReport>),

    /// A body was required but the response had none.
    #[display("invalid response: empty body")]
    InvalidResponseEmpty,

    /// The transport answered with something that is not an HTTP response.
    #[display("invalid response: not HTTP")]
    InvalidResponseNotHttp,

    /// Any failure without a more specific kind.
    #[display("{_0}")]
    Other(BoxError),

    /// The secure connection could not be established.
    #[display("SSL error: {_0}")]
    Ssl(TransportError),

    /// Application-level error code, raised by resource decode strategies.
    #[display("API error status {_0}")]
    StatusApi(i64),

    /// The HTTP status is a client or server error (or not a valid status at all).
    #[display("HTTP error status {_0}")]
    StatusHttp(u16),
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Domain(err) | Self::Ssl(err) => Some(err),
            Self::JsonDecodingFailure(report) => Some(&**report),
            Self::Other(err) => Some(&**err),
            Self::InvalidResponseEmpty
            | Self::InvalidResponseNotHttp
            | Self::StatusApi(_)
            | Self::StatusHttp(_) => None,
        }
    }
}

impl From<TransportError> for Error {
    fn from(err: TransportError) -> Self {
        if err.is_secure_connection_failure() {
            Self::Ssl(err)
        } else {
            Self::Domain(err)
        }
    }
}

impl From<DecodingReport> for Error {
    fn from(report: DecodingReport) -> Self {
        Self::JsonDecodingFailure(Box::new(report))
    }
}

impl Error {
    /// Classify an arbitrary failure.
    ///
    /// - an [`Error`] is returned unchanged,
    /// - a [`TransportError`] becomes [`Error::Ssl`] for TLS failures, [`Error::Domain`] otherwise,
    /// - anything else is wrapped in [`Error::Other`].
    #[must_use]
    pub fn translate(err: BoxError) -> Self {
        let err = match err.downcast::<Self>() {
            Ok(err) => return *err,
            Err(err) => err,
        };
        match err.downcast::<TransportError>() {
            Ok(err) => Self::from(*err),
            Err(err) => Self::Other(err),
        }
    }

    /// Wrap any error as [`Error::Other`].
    #[must_use]
    pub fn other(err: impl Into<BoxError>) -> Self {
        Self::Other(err.into())
    }

    /// Status code carried by [`Error::StatusHttp`] or [`Error::StatusApi`].
    #[must_use]
    pub fn status(&self) -> Option<i64> {
        match self {
            Self::StatusHttp(code) => Some(i64::from(*code)),
            Self::StatusApi(code) => Some(*code),
            _ => None,
        }
    }

    /// The status is 401 Unauthorized.
    #[must_use]
    pub fn is_authorization_error(&self) -> bool {
        self.status() == Some(401)
    }

    /// The status is 404 Not Found.
    #[must_use]
    pub fn is_not_found_error(&self) -> bool {
        self.status() == Some(404)
    }

    /// The decoding report, for [`Error::JsonDecodingFailure`].
    #[must_use]
    pub fn decoding_report(&self) -> Option<&DecodingReport> {
        match self {
            Self::JsonDecodingFailure(report) => Some(&**report),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(Error::StatusHttp(404).to_string(), "HTTP error status 404");
        assert_eq!(Error::StatusApi(1042).to_string(), "API error status 1042");
        assert_eq!(
            Error::InvalidResponseEmpty.to_string(),
            "invalid response: empty body"
        );
        assert_eq!(
            Error::Domain(TransportError::new(
                TransportErrorCode::TimedOut,
                "no answer after 30s"
            ))
            .to_string(),
            "network error: timed out (-1001): no answer after 30s"
        );
    }

    #[test]
    fn translate_is_identity_on_translated_errors() {
        let translated = Error::translate(Box::new(Error::StatusHttp(503)));
        assert!(matches!(translated, Error::StatusHttp(503)));

        let translated = Error::translate(Box::new(Error::InvalidResponseNotHttp));
        assert!(matches!(translated, Error::InvalidResponseNotHttp));

        let inner = TransportError::new(TransportErrorCode::CannotConnect, "refused");
        let once = Error::translate(Box::new(inner.clone()));
        let twice = Error::translate(Box::new(once));
        assert!(matches!(twice, Error::Domain(err) if err == inner));
    }

    #[test]
    fn translate_secure_transport_failure() {
        let err = TransportError::new(TransportErrorCode::SecureConnectionFailed, "bad cert");
        assert!(matches!(Error::translate(Box::new(err)), Error::Ssl(_)));

        let from_code = TransportErrorCode::from_code(-1200);
        assert_eq!(from_code, TransportErrorCode::SecureConnectionFailed);
    }

    #[test]
    fn translate_network_failure_keeps_code() {
        let err = TransportError::new(TransportErrorCode::ConnectionLost, "reset by peer");
        let Error::Domain(err) = Error::translate(Box::new(err)) else {
            panic!("expected a domain error");
        };
        assert_eq!(err.code().code(), -1005);
        assert_eq!(err.message(), "reset by peer");
    }

    #[test]
    fn translate_wraps_unknown_failures() {
        let io = std::io::Error::other("disk on fire");
        let err = Error::translate(Box::new(io));
        assert!(matches!(err, Error::Other(_)));
        assert_eq!(err.to_string(), "disk on fire");
        assert!(err.source().is_some());
    }

    #[test]
    fn authorization_and_not_found_predicates() {
        assert!(Error::StatusHttp(401).is_authorization_error());
        assert!(Error::StatusApi(401).is_authorization_error());
        assert!(!Error::StatusHttp(403).is_authorization_error());
        assert!(!Error::InvalidResponseEmpty.is_authorization_error());
        assert!(!Error::other("401").is_authorization_error());

        assert!(Error::StatusHttp(404).is_not_found_error());
        assert!(Error::StatusApi(404).is_not_found_error());
        assert!(!Error::StatusHttp(401).is_not_found_error());
        assert!(!Error::InvalidResponseNotHttp.is_not_found_error());
    }

    #[test]
    fn unknown_codes_map_to_unknown() {
        assert_eq!(TransportErrorCode::from_code(-4242), TransportErrorCode::Unknown);
        assert_eq!(TransportErrorCode::Unknown.code(), -1);
    }
}
