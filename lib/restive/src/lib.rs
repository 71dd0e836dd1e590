//! Typed HTTP resource client.
//!
//! Describe requests declaratively as [`Resource`]s, execute them with an
//! [`ApiClient`], and get typed values or one of the [`Error`] kinds back.
//!
//! # Example
//!
//! ```no_run
//! use restive::prelude::*;
//!
//! #[derive(Debug, Deserialize)]
//! pub struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! # async fn run() -> restive::Result<()> {
//! let client = ApiClient::builder("https://api.example.com")
//!     .hook(HeaderInjection::new().set("X-Client", "restive"))
//!     .store_decoding_errors(true)
//!     .build()?;
//!
//! let users = Resource::<Vec<User>>::json(
//!     Endpoint::get("users").with_header(CommonHeader::AcceptJson),
//! );
//!
//! match client.request(&users).await {
//!     Ok(users) => println!("{users:?}"),
//!     Err(err) if err.is_authorization_error() => println!("please log in"),
//!     Err(err) => println!("{err}"),
//! }
//! # Ok(())
//! # }
//! ```

mod api_client;
mod client;
mod config;
mod connector;
pub mod middleware;
pub mod prelude;

pub use api_client::{ApiClient, ApiClientBuilder};
pub use client::{BoxedService, HyperTransport, HyperTransportBuilder, ServiceFuture};
pub use config::{TransportConfig, TransportConfigBuilder};

// Re-export tower for middleware composition
pub use tower;

// Re-export core types
pub use restive_core::{
    BasicAuth, BearerAuth, BoxError, CommonHeader, ContentType, DEFAULT_CACHEABLE, Decode,
    Decoder, DecodingReport, Endpoint, Error, HeaderInjection, HttpStatus, Method, NoopReporter,
    QueryItem, RawResponse, Reporter, Request, RequestBuilder, RequestHook, Resource,
    ResponseMeta, Result, ScratchStorage, StatusCategory, TempDirStorage, TracingReporter,
    Transport, TransportError, TransportErrorCode, decode, is_default_cacheable, pretty_json,
    to_form, to_json,
};

pub use url;
