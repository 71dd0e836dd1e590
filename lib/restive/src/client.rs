//! HTTP transport implementation using hyper-util.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use restive_core::{
    BoxError, Method, RawResponse, Transport, TransportError, TransportErrorCode, body_forbidden,
};
use tower::Layer;
use tower::limit::ConcurrencyLimitLayer;
use tower::util::BoxCloneService;
use tower_service::Service;
use url::Url;

use crate::middleware::LoggingLayer;
use crate::{
    Error, Request, Result,
    config::{TransportConfig, TransportConfigBuilder},
    connector::https_connector,
};

// ============================================================================
// Type-Erased Service for Middleware Composition
// ============================================================================

/// Type-erased service for middleware composition.
pub type BoxedService = BoxCloneService<Request, RawResponse, Error>;

/// Future type for Tower Service implementation.
pub type ServiceFuture = Pin<Box<dyn Future<Output = Result<RawResponse>> + Send + 'static>>;

/// Thread-safe wrapper for `BoxedService`.
///
/// `BoxCloneService` is not `Sync`; a transport must be.
#[derive(Clone)]
struct SyncService {
    inner: Arc<Mutex<BoxedService>>,
}

impl SyncService {
    fn new(service: BoxedService) -> Self {
        Self {
            inner: Arc::new(Mutex::new(service)),
        }
    }

    fn call(&self, request: Request) -> ServiceFuture {
        // Lock, clone the service, and release the lock immediately
        let mut service = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();

        Box::pin(async move { service.call(request).await })
    }
}

// ============================================================================
// Raw Transport (internal, used for direct hyper access)
// ============================================================================

#[derive(Clone)]
struct RawHyperTransport {
    inner: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    config: TransportConfig,
}

impl RawHyperTransport {
    fn new(config: TransportConfig) -> Self {
        let connector = https_connector(config.connect_timeout);

        let inner = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_idle_per_host)
            .build(connector);

        Self { inner, config }
    }

    fn build_hyper_request(request: Request) -> Result<http::Request<Full<Bytes>>> {
        let (method, url, headers, body) = request.into_parts();

        let mut builder = http::Request::builder()
            .method(http::Method::from(method))
            .uri(url.as_str());

        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let body = body.map_or_else(Full::default, Full::new);
        builder
            .body(body)
            .map_err(|err| TransportError::bad_url(format!("{url}: {err}")).into())
    }

    fn extract_headers(headers: &http::HeaderMap) -> HashMap<String, String> {
        headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect()
    }

    async fn execute(&self, request: Request) -> Result<RawResponse> {
        match request.url().scheme() {
            "http" | "https" => {}
            "file" => return read_file(request.url()).await,
            scheme => {
                return Err(TransportError::bad_url(format!("unsupported scheme '{scheme}'")).into());
            }
        }

        let method = request.method();
        let hyper_request = Self::build_hyper_request(request)?;

        tokio::time::timeout(self.config.timeout, self.exchange(method, hyper_request))
            .await
            .map_err(|_| {
                TransportError::new(
                    TransportErrorCode::TimedOut,
                    format!("no complete response within {:?}", self.config.timeout),
                )
            })?
    }

    async fn exchange(
        &self,
        method: Method,
        request: http::Request<Full<Bytes>>,
    ) -> Result<RawResponse> {
        let response = self
            .inner
            .request(request)
            .await
            .map_err(|err| map_hyper_error(&err))?;

        let status = response.status().as_u16();
        let headers = Self::extract_headers(response.headers());
        if body_forbidden(method, status) {
            return Ok(RawResponse::http_without_body(status, headers));
        }

        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|err| TransportError::new(TransportErrorCode::ConnectionLost, err.to_string()))?
            .to_bytes();

        Ok(RawResponse::http(status, headers, body))
    }
}

async fn read_file(url: &Url) -> Result<RawResponse> {
    let path = url
        .to_file_path()
        .map_err(|()| TransportError::bad_url(format!("not a local file: {url}")))?;
    let body = tokio::fs::read(&path).await.map_err(Error::other)?;

    Ok(RawResponse::NonHttp {
        url: url.clone(),
        body: Bytes::from(body),
    })
}

fn map_hyper_error(err: &hyper_util::client::legacy::Error) -> Error {
    let message = error_chain(err);

    let code = if is_tls_failure(err) {
        TransportErrorCode::SecureConnectionFailed
    } else if err.is_connect() {
        TransportErrorCode::CannotConnect
    } else {
        TransportErrorCode::ConnectionLost
    };

    TransportError::new(code, message).into()
}

fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(err) = source {
        message.push_str(": ");
        message.push_str(&err.to_string());
        source = err.source();
    }
    message
}

fn is_tls_failure(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(err) = current {
        if err.is::<rustls::Error>() {
            return true;
        }
        // hyper-rustls reports handshake failures as io errors wrapping the rustls error
        if let Some(io) = err.downcast_ref::<std::io::Error>()
            && io.get_ref().is_some_and(|inner| inner.is::<rustls::Error>())
        {
            return true;
        }
        let message = err.to_string().to_lowercase();
        if message.contains("certificate") || message.contains("tls") || message.contains("ssl") {
            return true;
        }
        current = err.source();
    }
    false
}

impl Service<Request> for RawHyperTransport {
    type Response = RawResponse;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let transport = self.clone();
        Box::pin(async move { transport.execute(request).await })
    }
}

// ============================================================================
// Public Transport
// ============================================================================

/// HTTP transport using hyper-util with connection pooling, TLS, and middleware support.
///
/// `file:` URLs are read from disk and answered as [`RawResponse::NonHttp`].
///
/// # Example
///
/// ```
/// use restive::HyperTransport;
/// use std::time::Duration;
///
/// let transport = HyperTransport::builder()
///     .timeout(Duration::from_secs(30))
///     .with_logging()
///     .build();
/// ```
#[derive(Clone)]
pub struct HyperTransport {
    service: SyncService,
    config: TransportConfig,
}

impl std::fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransport")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HyperTransport {
    /// Create a transport with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(TransportConfig::default())
    }

    /// Create a transport with custom configuration (no middleware).
    #[must_use]
    pub fn with_config(config: TransportConfig) -> Self {
        let raw = RawHyperTransport::new(config.clone());
        Self::with_service(BoxCloneService::new(raw), config)
    }

    fn with_service(service: BoxedService, config: TransportConfig) -> Self {
        Self {
            service: SyncService::new(service),
            config,
        }
    }

    /// Create a new transport builder.
    #[must_use]
    pub fn builder() -> HyperTransportBuilder {
        HyperTransportBuilder::default()
    }

    /// Get the transport configuration.
    #[must_use]
    pub const fn config(&self) -> &TransportConfig {
        &self.config
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HyperTransport {
    fn send(
        &self,
        request: Request,
    ) -> impl Future<Output = std::result::Result<RawResponse, BoxError>> + Send {
        let response = self.service.call(request);
        async move { response.await.map_err(BoxError::from) }
    }
}

impl Service<Request> for HyperTransport {
    type Response = RawResponse;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        // SyncService is always ready (the underlying service is polled when called)
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        self.service.call(request)
    }
}

/// Builder for [`HyperTransport`].
///
/// # Example
///
/// ```
/// use restive::HyperTransport;
/// use restive::middleware::LoggingLayer;
///
/// let transport = HyperTransport::builder()
///     .layer(LoggingLayer::debug())
///     .with_concurrency_limit(8)
///     .build();
/// ```
#[derive(Default)]
pub struct HyperTransportBuilder {
    config: TransportConfigBuilder,
    layers: Vec<Arc<dyn Fn(BoxedService) -> BoxedService + Send + Sync>>,
}

impl std::fmt::Debug for HyperTransportBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransportBuilder")
            .field("config", &self.config)
            .field("layers_count", &self.layers.len())
            .finish()
    }
}

impl HyperTransportBuilder {
    // ========================================================================
    // Core Configuration
    // ========================================================================

    /// Set the exchange timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.timeout(timeout);
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.connect_timeout(timeout);
        self
    }

    /// Set the maximum idle connections per host.
    #[must_use]
    pub fn pool_idle_per_host(mut self, count: usize) -> Self {
        self.config = self.config.pool_idle_per_host(count);
        self
    }

    /// Set the idle connection timeout.
    #[must_use]
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.pool_idle_timeout(timeout);
        self
    }

    // ========================================================================
    // Middleware
    // ========================================================================

    /// Add a Tower layer to the transport.
    ///
    /// Layers are applied in order: first added = outermost (processes requests first).
    #[must_use]
    pub fn layer<L>(mut self, layer: L) -> Self
    where
        L: Layer<BoxedService> + Send + Sync + 'static,
        L::Service: Service<Request, Response = RawResponse, Error = Error> + Clone + Send + 'static,
        <L::Service as Service<Request>>::Future: Send + 'static,
    {
        self.layers.push(Arc::new(move |service| {
            BoxCloneService::new(layer.layer(service))
        }));
        self
    }

    /// Add request/response logging.
    #[must_use]
    pub fn with_logging(self) -> Self {
        self.layer(LoggingLayer::new())
    }

    /// Add debug-level logging (includes headers).
    #[must_use]
    pub fn with_debug_logging(self) -> Self {
        self.layer(LoggingLayer::debug())
    }

    /// Limit the number of requests in flight.
    #[must_use]
    pub fn with_concurrency_limit(self, max: usize) -> Self {
        self.layer(ConcurrencyLimitLayer::new(max))
    }

    // ========================================================================
    // Build
    // ========================================================================

    /// Build the transport with all configured middleware.
    #[must_use]
    pub fn build(self) -> HyperTransport {
        let config = self.config.build();
        let raw = RawHyperTransport::new(config.clone());

        let mut service: BoxedService = BoxCloneService::new(raw);

        // Apply user layers in order (first added = outermost)
        for layer_fn in self.layers.iter().rev() {
            service = layer_fn(service);
        }

        HyperTransport::with_service(service, config)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use assert2::{check, let_assert};

    use super::*;

    fn request(url: &str) -> Request {
        Request::builder(Method::Get, Url::parse(url).expect("valid URL")).build()
    }

    #[test]
    fn transport_builder_config() {
        let transport = HyperTransport::builder()
            .timeout(Duration::from_secs(5))
            .pool_idle_per_host(16)
            .build();

        check!(transport.config().timeout == Duration::from_secs(5));
        check!(transport.config().pool_idle_per_host == 16);
        check!(format!("{transport:?}").contains("HyperTransport"));
    }

    #[tokio::test]
    async fn file_urls_are_not_http() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(br#"{"id":7}"#).expect("write");
        let url = Url::from_file_path(file.path()).expect("absolute path");

        let response = HyperTransport::new()
            .send(request(url.as_str()))
            .await
            .expect("read file");

        let_assert!(RawResponse::NonHttp { url: read_from, body } = response);
        check!(read_from == url);
        check!(body == Bytes::from(r#"{"id":7}"#));
    }

    #[tokio::test]
    async fn unsupported_scheme_is_a_bad_url() {
        let_assert!(Err(err) = HyperTransport::new().send(request("ftp://example.com/file")).await);
        let_assert!(Error::Domain(err) = Error::translate(err));
        check!(err.code() == TransportErrorCode::BadUrl);
    }

    #[test]
    fn tls_failures_are_recognized() {
        let io = std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            rustls::Error::InvalidCertificate(rustls::CertificateError::Expired),
        );
        check!(is_tls_failure(&io));
        check!(!is_tls_failure(&std::io::Error::other("connection refused")));
    }
}
