//! Prelude module for convenient imports.
//!
//! ```
//! use restive::prelude::*;
//! ```

pub use crate::{
    ApiClient, BearerAuth, CommonHeader, Endpoint, Error, HeaderInjection, HyperTransport, Method,
    RequestHook, Resource, ResponseMeta, Result,
};
pub use serde::{Deserialize, Serialize};
