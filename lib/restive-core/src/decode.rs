//! Response decoding.
//!
//! [`Decoder`] is the generic decode helper: it refuses missing bodies and
//! error statuses, then decodes JSON and turns structural failures into a
//! [`DecodingReport`]. Resources pick a [`Decode`] strategy that may call it
//! or bypass it.

use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::{DecodingReport, Error, ResponseMeta, Result, ScratchStorage, TempDirStorage};

// ============================================================================
// Decoder
// ============================================================================

/// Generic decode helper shared by every resource executed by a client.
#[derive(Debug, Clone)]
pub struct Decoder {
    store_decoding_errors: bool,
    scratch: Arc<dyn ScratchStorage>,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(false, Arc::new(TempDirStorage::default()))
    }
}

impl Decoder {
    /// Create a decoder.
    ///
    /// When `store_decoding_errors` is set, every structural decoding failure
    /// saves its payload to `scratch`.
    #[must_use]
    pub fn new(store_decoding_errors: bool, scratch: Arc<dyn ScratchStorage>) -> Self {
        Self {
            store_decoding_errors,
            scratch,
        }
    }

    /// Whether failing payloads are saved.
    #[must_use]
    pub const fn is_storing_decoding_errors(&self) -> bool {
        self.store_decoding_errors
    }

    /// Where failing payloads are saved.
    #[must_use]
    pub fn scratch_storage(&self) -> &dyn ScratchStorage {
        self.scratch.as_ref()
    }

    /// Fail with [`Error::StatusHttp`] unless the status is a valid, non-error status.
    pub fn check_status(&self, meta: &ResponseMeta) -> Result<()> {
        if meta.is_error() {
            return Err(Error::StatusHttp(meta.status()));
        }
        Ok(())
    }

    /// Decode a response body into `T`.
    ///
    /// Checks, in order: the body is present, the status is not an error, the
    /// body is valid JSON for `T`. The status check comes first so an error
    /// page that is not JSON still reports the status.
    pub fn decode<T: DeserializeOwned>(&self, body: Option<&[u8]>, meta: &ResponseMeta) -> Result<T> {
        let body = body.ok_or(Error::InvalidResponseEmpty)?;
        self.check_status(meta)?;
        self.decode_json(body)
    }

    /// Decode JSON bytes into `T`, without looking at the status.
    pub fn decode_json<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        let mut deserializer = serde_json::Deserializer::from_slice(bytes);
        let value = match serde_path_to_error::deserialize(&mut deserializer) {
            Ok(value) => value,
            Err(err) => {
                let path = err.path().to_string();
                return Err(self.failure::<T>(err.into_inner(), path, bytes));
            }
        };
        // trailing characters after the document
        if let Err(err) = deserializer.end() {
            return Err(self.failure::<T>(err, ".".to_string(), bytes));
        }
        Ok(value)
    }

    fn failure<T>(&self, error: serde_json::Error, path: String, bytes: &[u8]) -> Error {
        if error.is_io() {
            return Error::other(error);
        }
        let mut report =
            DecodingReport::describe_at(error, path, Some(bytes), std::any::type_name::<T>());
        if self.store_decoding_errors {
            report.persist(self.scratch.as_ref());
        }
        Error::from(report)
    }
}

// ============================================================================
// Decode Strategies
// ============================================================================

/// How a resource turns a response into a value.
///
/// Strategies receive the raw metadata and decide themselves whether to use
/// the [`Decoder`]; this is also where application-level failures such as
/// [`Error::StatusApi`] are raised.
///
/// Any `Fn(&Decoder, Option<&Bytes>, &ResponseMeta) -> Result<T>` is a strategy:
///
/// ```
/// use bytes::Bytes;
/// use restive_core::{Decoder, Error, ResponseMeta, Result};
///
/// #[derive(serde::Deserialize)]
/// struct Envelope { code: i64, total: u32 }
///
/// fn decode_total(decoder: &Decoder, body: Option<&Bytes>, meta: &ResponseMeta) -> Result<u32> {
///     let envelope: Envelope = decoder.decode(body.map(|b| &b[..]), meta)?;
///     if envelope.code != 0 {
///         return Err(Error::StatusApi(envelope.code));
///     }
///     Ok(envelope.total)
/// }
/// ```
pub trait Decode<T>: Send + Sync {
    /// Decode `body` (absent when the response carried none).
    fn decode(&self, decoder: &Decoder, body: Option<&Bytes>, meta: &ResponseMeta) -> Result<T>;
}

impl<T, F> Decode<T> for F
where
    F: Fn(&Decoder, Option<&Bytes>, &ResponseMeta) -> Result<T> + Send + Sync,
{
    fn decode(&self, decoder: &Decoder, body: Option<&Bytes>, meta: &ResponseMeta) -> Result<T> {
        self(decoder, body, meta)
    }
}

/// JSON body through [`Decoder::decode`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Json;

impl<T: DeserializeOwned> Decode<T> for Json {
    fn decode(&self, decoder: &Decoder, body: Option<&Bytes>, meta: &ResponseMeta) -> Result<T> {
        decoder.decode(body.map(|bytes| &bytes[..]), meta)
    }
}

/// Only the status matters; the body is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct Status;

impl Decode<()> for Status {
    fn decode(&self, decoder: &Decoder, _body: Option<&Bytes>, meta: &ResponseMeta) -> Result<()> {
        decoder.check_status(meta)
    }
}

/// The body bytes as received, after the status check; a missing body is empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawBytes;

impl Decode<Bytes> for RawBytes {
    fn decode(&self, decoder: &Decoder, body: Option<&Bytes>, meta: &ResponseMeta) -> Result<Bytes> {
        decoder.check_status(meta)?;
        Ok(body.cloned().unwrap_or_default())
    }
}
