//! Tower middleware layers for the hyper transport.
//!
//! Layers wrap the transport's `Service<Request, Response = RawResponse>`
//! and see every dispatch, including the ones that fail before a response
//! arrives. Request mutation that depends on the client (authentication,
//! injected headers) belongs in [`RequestHook`](crate::RequestHook)s instead.
//!
//! - [`LoggingLayer`] - Logs requests/responses using `tracing`
//! - [`ConcurrencyLimitLayer`] - Limits concurrent requests (from `tower`)
//!
//! # Example
//!
//! ```
//! use restive::HyperTransport;
//! use restive::middleware::{ConcurrencyLimitLayer, LoggingLayer};
//!
//! let transport = HyperTransport::builder()
//!     .layer(LoggingLayer::new())
//!     .layer(ConcurrencyLimitLayer::new(16))
//!     .build();
//! ```

mod logging;

pub use logging::{LogLevel, Logging, LoggingLayer};
pub use tower::limit::ConcurrencyLimitLayer;
