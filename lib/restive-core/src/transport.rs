//! The network execution capability.
//!
//! [`Transport`] is the seam between the request pipeline and the network:
//! `restive` ships a hyper-based implementation, tests use in-memory ones.

use std::future::Future;
use std::sync::Arc;

use crate::{BoxError, RawResponse, Request};

/// Sends a request and returns whatever came back.
///
/// One call is one attempt; transports must not retry. Failures are raw: the
/// client classifies them with [`Error::translate`](crate::Error::translate),
/// so a transport should report network failures as a
/// [`TransportError`](crate::TransportError) carrying the matching code.
///
/// Dropping the returned future cancels the request.
pub trait Transport: Send + Sync {
    /// Send `request`.
    fn send(&self, request: Request) -> impl Future<Output = Result<RawResponse, BoxError>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn send(&self, request: Request) -> impl Future<Output = Result<RawResponse, BoxError>> + Send {
        (**self).send(request)
    }
}

impl<T: Transport> Transport for &T {
    fn send(&self, request: Request) -> impl Future<Output = Result<RawResponse, BoxError>> + Send {
        (**self).send(request)
    }
}
