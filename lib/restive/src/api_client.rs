//! The resource client.
//!
//! [`ApiClient`] binds a transport to a base URL and runs every request
//! through the same pipeline: request hooks, dispatch, HTTP-shape check,
//! reporting, then the resource's decode strategy.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use restive_core::{
    Decoder, Error, Reporter, Request, RequestHook, Resource, ResponseMeta, Result, ScratchStorage,
    TempDirStorage, TracingReporter, Transport, TransportError,
};
use tracing::debug;
use url::Url;

use crate::HyperTransport;

/// Executes [`Resource`]s against a fixed base URL.
///
/// Cloning is cheap and clones share hooks, reporter and decoder. Every
/// [`request`](Self::request) is an independent future; dropping it cancels
/// the exchange.
///
/// # Example
///
/// ```no_run
/// use restive::{ApiClient, BearerAuth, Endpoint, Resource};
///
/// #[derive(Debug, serde::Deserialize)]
/// struct User {
///     id: u64,
///     name: String,
/// }
///
/// # async fn run() -> restive::Result<()> {
/// let client = ApiClient::builder("https://api.example.com")
///     .hook(BearerAuth::new("my-token"))
///     .build()?;
///
/// let user: User = client
///     .request(&Resource::json(Endpoint::get("/users").query("id", "7")))
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct ApiClient<T = HyperTransport> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    transport: T,
    base_url: Url,
    hooks: Vec<Arc<dyn RequestHook>>,
    reporter: Arc<dyn Reporter>,
    decoder: Decoder,
}

impl<T> Clone for ApiClient<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for ApiClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("hooks_count", &self.inner.hooks.len())
            .field("reporter", &self.inner.reporter)
            .field("decoder", &self.inner.decoder)
            .finish_non_exhaustive()
    }
}

impl ApiClient<HyperTransport> {
    /// Client over the default [`HyperTransport`], with no hooks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Domain`] with a bad URL code if `base_url` is not a valid base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::builder(base_url).build()
    }

    /// Start configuring a client over the default [`HyperTransport`].
    ///
    /// The transport is only created by [`ApiClientBuilder::build`], and not at
    /// all when [`ApiClientBuilder::transport`] replaces it.
    #[must_use]
    pub fn builder(base_url: impl Into<String>) -> ApiClientBuilder<HyperTransport> {
        ApiClientBuilder::with_transport_fn(base_url, HyperTransport::new)
    }
}

impl<T: Transport> ApiClient<T> {
    /// Build a request from `resource`, execute it, and decode the response.
    ///
    /// # Errors
    ///
    /// Any [`Error`] kind: bad URL, transport failure, non-HTTP response, or
    /// whatever the resource's decode strategy reports.
    pub async fn request<R>(&self, resource: &Resource<R>) -> Result<R> {
        let request = resource.to_request(&self.inner.base_url)?;
        let (body, meta) = self.execute(request).await?;
        resource.decode(&self.inner.decoder, body.as_ref(), &meta)
    }

    /// Apply the hooks to `request`, send it, and return the HTTP body and metadata.
    ///
    /// The status is not checked: error statuses are returned like any other.
    ///
    /// # Errors
    ///
    /// Translated transport failures, or [`Error::InvalidResponseNotHttp`].
    pub async fn execute(&self, mut request: Request) -> Result<(Option<Bytes>, ResponseMeta)> {
        for hook in &self.inner.hooks {
            hook.before_send(&mut request);
        }
        if !self.inner.hooks.is_empty() {
            debug!(count = self.inner.hooks.len(), url = %request.url(), "applied request hooks");
        }

        let sent = request.clone();
        let response = self
            .inner
            .transport
            .send(request)
            .await
            .map_err(Error::translate)?;

        let (body, meta) = response.into_http().ok_or(Error::InvalidResponseNotHttp)?;
        self.inner.reporter.record(&sent, &meta, body.as_ref());

        Ok((body, meta))
    }
}

impl<T> ApiClient<T> {
    /// Base URL every resource path is resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// The underlying transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    /// The decoder handed to decode strategies.
    #[must_use]
    pub fn decoder(&self) -> &Decoder {
        &self.inner.decoder
    }

    /// Whether payloads that fail to decode are saved to scratch storage.
    #[must_use]
    pub fn is_storing_decoding_errors(&self) -> bool {
        self.inner.decoder.is_storing_decoding_errors()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`ApiClient`].
///
/// Hooks run in the order they are added.
pub struct ApiClientBuilder<T = HyperTransport> {
    base_url: String,
    make_transport: Box<dyn FnOnce() -> T + Send>,
    hooks: Vec<Arc<dyn RequestHook>>,
    reporter: Arc<dyn Reporter>,
    store_decoding_errors: bool,
    scratch: Option<Arc<dyn ScratchStorage>>,
}

impl<T> fmt::Debug for ApiClientBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClientBuilder")
            .field("base_url", &self.base_url)
            .field("hooks_count", &self.hooks.len())
            .field("reporter", &self.reporter)
            .field("store_decoding_errors", &self.store_decoding_errors)
            .field("scratch", &self.scratch)
            .finish_non_exhaustive()
    }
}

impl<T> ApiClientBuilder<T> {
    /// Start configuring a client over `transport`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, transport: T) -> Self
    where
        T: Send + 'static,
    {
        Self::with_transport_fn(base_url, move || transport)
    }

    /// Start configuring a client whose transport is made by `make_transport`
    /// when the client is built.
    #[must_use]
    pub fn with_transport_fn(
        base_url: impl Into<String>,
        make_transport: impl FnOnce() -> T + Send + 'static,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            make_transport: Box::new(make_transport),
            hooks: Vec::new(),
            reporter: Arc::new(TracingReporter::default()),
            store_decoding_errors: false,
            scratch: None,
        }
    }

    /// Replace the transport.
    #[must_use]
    pub fn transport<U: Send + 'static>(self, transport: U) -> ApiClientBuilder<U> {
        ApiClientBuilder {
            base_url: self.base_url,
            make_transport: Box::new(move || transport),
            hooks: self.hooks,
            reporter: self.reporter,
            store_decoding_errors: self.store_decoding_errors,
            scratch: self.scratch,
        }
    }

    /// Append a request hook.
    #[must_use]
    pub fn hook(mut self, hook: impl RequestHook + 'static) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    /// Replace the reporter (a [`TracingReporter`] by default).
    #[must_use]
    pub fn reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporter = Arc::new(reporter);
        self
    }

    /// Save payloads that fail to decode (off by default).
    #[must_use]
    pub fn store_decoding_errors(mut self, enabled: bool) -> Self {
        self.store_decoding_errors = enabled;
        self
    }

    /// Where failing payloads are saved (the system temporary directory by default).
    #[must_use]
    pub fn scratch_storage(mut self, storage: impl ScratchStorage + 'static) -> Self {
        self.scratch = Some(Arc::new(storage));
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Domain`] with a bad URL code if the base URL does not
    /// parse or cannot carry a path.
    pub fn build(self) -> Result<ApiClient<T>> {
        let base_url = Url::parse(&self.base_url)
            .map_err(|err| TransportError::bad_url(format!("{}: {err}", self.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(TransportError::bad_url(format!("{base_url} cannot be a base URL")).into());
        }

        let scratch = self
            .scratch
            .unwrap_or_else(|| Arc::new(TempDirStorage::default()));
        let decoder = Decoder::new(self.store_decoding_errors, scratch);

        Ok(ApiClient {
            inner: Arc::new(Inner {
                transport: (self.make_transport)(),
                base_url,
                hooks: self.hooks,
                reporter: self.reporter,
                decoder,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};
    use restive_core::{NoopReporter, TransportErrorCode};

    use super::*;

    #[test]
    fn builder_defaults() {
        let client = ApiClient::new("https://api.example.com/v1").expect("client");

        check!(client.base_url().as_str() == "https://api.example.com/v1");
        check!(!client.is_storing_decoding_errors());
        check!(format!("{client:?}").contains("TracingReporter"));
    }

    #[test]
    fn builder_options() {
        let dir = tempfile::tempdir().expect("temp dir");
        let client = ApiClient::builder("https://api.example.com")
            .reporter(NoopReporter)
            .store_decoding_errors(true)
            .scratch_storage(TempDirStorage::new(dir.path()))
            .hook(|request: &mut Request| request.set_header("X-Client", "restive"))
            .build()
            .expect("client");

        check!(client.is_storing_decoding_errors());
        check!(format!("{client:?}").contains("hooks_count: 1"));
        check!(format!("{:?}", client.decoder().scratch_storage()).contains("TempDirStorage"));
    }

    #[test]
    fn invalid_base_urls_are_bad_urls() {
        for base_url in ["not a url", "mailto:someone@example.com"] {
            let_assert!(Err(Error::Domain(err)) = ApiClient::new(base_url));
            check!(err.code() == TransportErrorCode::BadUrl);
        }
    }

    #[test]
    fn transport_is_made_only_when_building() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        static MADE: AtomicUsize = AtomicUsize::new(0);
        let make = || {
            MADE.fetch_add(1, Ordering::SeqCst);
            HyperTransport::new()
        };

        let builder = ApiClientBuilder::with_transport_fn("https://api.example.com", make);
        check!(MADE.load(Ordering::SeqCst) == 0);

        let replaced = builder.transport(NoopTransport).build().expect("client");
        check!(MADE.load(Ordering::SeqCst) == 0);
        check!(replaced.base_url().as_str() == "https://api.example.com/");

        ApiClientBuilder::with_transport_fn("https://api.example.com", make)
            .build()
            .expect("client");
        check!(MADE.load(Ordering::SeqCst) == 1);
    }

    #[derive(Debug)]
    struct NoopTransport;
}
