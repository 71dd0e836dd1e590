//! Human-readable reports for JSON decoding failures.
//!
//! A [`DecodingReport`] is built when a body does not decode into the target
//! type. Its `Display` output looks like:
//!
//! ```text
//! Error decoding. Details follow...
//! Decodable type: my_api::User
//! Error: missing field `name`
//!        at line 1 column 8
//!        path: .
//! JSON:
//! {
//!   "id": 7
//! }
//! File saved to: /tmp/DecodeFailed-20240102_030405.json
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use derive_more::Error;
use serde_json::Value;
use tracing::{debug, error};

use crate::ScratchStorage;

/// Name prefix of persisted payloads.
pub const DECODE_FAILED_PREFIX: &str = "DecodeFailed";

/// Indentation of continuation lines, aligned after `Error: `.
const CONTINUATION: &str = "\n       ";

/// Diagnosis of a body that failed to decode.
#[derive(Debug, Error)]
pub struct DecodingReport {
    source: serde_json::Error,
    path: String,
    target_type: &'static str,
    payload: Option<Bytes>,
    pretty_payload: Option<String>,
    saved_to: Option<PathBuf>,
}

impl DecodingReport {
    /// Build a report from a path-aware decoding error.
    #[must_use]
    pub fn describe(
        error: serde_path_to_error::Error<serde_json::Error>,
        payload: Option<&[u8]>,
        target_type: &'static str,
    ) -> Self {
        let path = error.path().to_string();
        Self::describe_at(error.into_inner(), path, payload, target_type)
    }

    /// Build a report from a decoding error that occurred at `path`.
    #[must_use]
    pub fn describe_at(
        error: serde_json::Error,
        path: impl Into<String>,
        payload: Option<&[u8]>,
        target_type: &'static str,
    ) -> Self {
        Self {
            source: error,
            path: path.into(),
            target_type,
            payload: payload.map(Bytes::copy_from_slice),
            pretty_payload: payload.and_then(pretty_json),
            saved_to: None,
        }
    }

    /// Underlying `serde_json` error.
    #[must_use]
    pub fn decode_error(&self) -> &serde_json::Error {
        &self.source
    }

    /// Path of the offending field (`.` for the document root).
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Name of the type the body was decoded into.
    #[must_use]
    pub fn target_type(&self) -> &'static str {
        self.target_type
    }

    /// The offending payload, as received.
    #[must_use]
    pub fn payload(&self) -> Option<&Bytes> {
        self.payload.as_ref()
    }

    /// Pretty, key-sorted rendition of the payload, when it is valid JSON.
    #[must_use]
    pub fn pretty_payload(&self) -> Option<&str> {
        self.pretty_payload.as_deref()
    }

    /// Where the payload was saved, if it was.
    #[must_use]
    pub fn saved_to(&self) -> Option<&Path> {
        self.saved_to.as_deref()
    }

    /// The decode error message, wrapped for reading.
    #[must_use]
    pub fn detail(&self) -> String {
        self.source.to_string().replace(" at line ", &format!("{CONTINUATION}at line "))
    }

    /// Save the payload to `storage`; the pretty rendition when there is one, raw bytes otherwise.
    ///
    /// Failures are logged and otherwise ignored. Only the first call writes.
    pub fn persist(&mut self, storage: &dyn ScratchStorage) {
        if self.saved_to.is_some() {
            return;
        }
        let content = match (&self.pretty_payload, &self.payload) {
            (Some(pretty), _) => pretty.as_bytes(),
            (None, Some(raw)) => &raw[..],
            (None, None) => return,
        };

        match storage.write_unique(DECODE_FAILED_PREFIX, content) {
            Ok(location) => {
                debug!(location = %location.display(), "saved decoding failure");
                self.saved_to = Some(location);
            }
            Err(err) => {
                error!(error = %err, target_type = self.target_type, "failed to store decoding failure");
            }
        }
    }
}

impl fmt::Display for DecodingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Error decoding. Details follow...")?;
        writeln!(f, "Decodable type: {}", self.target_type)?;
        write!(f, "Error: {}{CONTINUATION}path: {}", self.detail(), self.path)?;
        if let Some(pretty) = &self.pretty_payload {
            write!(f, "\nJSON:\n{pretty}")?;
        }
        if let Some(location) = &self.saved_to {
            write!(f, "\nFile saved to: {}", location.display())?;
        }
        Ok(())
    }
}

/// Pretty-print `bytes` with object keys sorted, `None` if it is not JSON.
#[must_use]
pub fn pretty_json(bytes: &[u8]) -> Option<String> {
    let value = serde_json::from_slice::<Value>(bytes).ok()?;
    serde_json::to_string_pretty(&sorted(value)).ok()
}

fn sorted(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let entries: BTreeMap<String, Value> =
                map.into_iter().map(|(key, value)| (key, sorted(value))).collect();
            Value::Object(entries.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sorted).collect()),
        other => other,
    }
}
