//! Core types and traits for the restive typed HTTP resource client.
//!
//! This crate is transport agnostic:
//! - [`HttpStatus`] and [`StatusCategory`] - status classification
//! - [`Endpoint`] and [`Resource`] - declarative request descriptors
//! - [`Request`] and [`RequestBuilder`] - concrete HTTP requests
//! - [`ResponseMeta`] and [`RawResponse`] - what a transport returns
//! - [`Decoder`] and [`Decode`] - response decoding strategies
//! - [`DecodingReport`] - diagnostics for bodies that fail to decode
//! - [`Error`] and [`Result`] - the closed error taxonomy
//! - [`Transport`], [`RequestHook`], [`Reporter`], [`ScratchStorage`] - collaborators

mod body;
pub mod decode;
mod diagnostics;
mod error;
mod hook;
mod method;
pub mod prelude;
mod report;
mod request;
mod resource;
mod response;
mod scratch;
mod status;
mod transport;

pub use body::{CommonHeader, ContentType, to_form, to_json};
pub use decode::{Decode, Decoder};
pub use diagnostics::{DECODE_FAILED_PREFIX, DecodingReport, pretty_json};
pub use error::{BoxError, Error, Result, TransportError, TransportErrorCode};
pub use hook::{BasicAuth, BearerAuth, HeaderInjection, RequestHook};
pub use method::{Method, UnknownMethod};
pub use report::{DEFAULT_BODY_LIMIT, NoopReporter, Reporter, TracingReporter};
pub use request::{Request, RequestBuilder};
pub use resource::{Endpoint, QueryItem, Resource};
pub use response::{RawResponse, ResponseMeta, body_forbidden};
pub use scratch::{ScratchStorage, TempDirStorage};
pub use status::{DEFAULT_CACHEABLE, HttpStatus, StatusCategory, is_default_cacheable};
pub use transport::Transport;
