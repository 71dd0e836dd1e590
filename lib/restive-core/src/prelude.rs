//! Prelude module for convenient imports.
//!
//! ```
//! use restive_core::prelude::*;
//! ```

pub use crate::{
    CommonHeader, Decode, Decoder, Endpoint, Error, HttpStatus, Method, RawResponse, Request,
    RequestHook, Resource, ResponseMeta, Result, Transport,
};
