//! Timeouts and pooling for [`HyperTransport`](crate::HyperTransport).

use std::time::Duration;

/// Transport settings.
///
/// Defaults: 60s exchange, 10s connect, 32 idle connections per host kept for 90s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Whole-exchange timeout, from dispatch until the body is read.
    pub timeout: Duration,
    /// Limit on opening a TCP and TLS connection.
    pub connect_timeout: Duration,
    /// Idle pooled connections kept per host.
    pub pool_idle_per_host: usize,
    /// How long a pooled connection may stay idle.
    pub pool_idle_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
            pool_idle_per_host: 32,
            pool_idle_timeout: Duration::from_secs(90),
        }
    }
}

impl TransportConfig {
    /// Start from the defaults and override what you need.
    #[must_use]
    pub fn builder() -> TransportConfigBuilder {
        TransportConfigBuilder::default()
    }
}

/// Builder for [`TransportConfig`], starting from the defaults.
#[derive(Debug, Clone, Default)]
pub struct TransportConfigBuilder(TransportConfig);

impl TransportConfigBuilder {
    /// Give up on an exchange after `timeout`, body included.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.0.timeout = timeout;
        self
    }

    /// Give up on opening a connection after `timeout`.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.0.connect_timeout = timeout;
        self
    }

    /// Keep at most `count` idle connections per host.
    #[must_use]
    pub const fn pool_idle_per_host(mut self, count: usize) -> Self {
        self.0.pool_idle_per_host = count;
        self
    }

    /// Close idle connections after `timeout`.
    #[must_use]
    pub const fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.0.pool_idle_timeout = timeout;
        self
    }

    /// Finish the configuration.
    #[must_use]
    pub const fn build(self) -> TransportConfig {
        self.0
    }
}
