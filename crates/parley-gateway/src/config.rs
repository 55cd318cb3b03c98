//! Gateway client configuration

use std::time::Duration;

/// Reconnect policy
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Connection attempts before giving up
    pub max_attempts: u32,
    /// First retry delay; doubles each attempt
    pub base_delay: Duration,
    /// Ceiling for the computed delay
    pub max_delay: Duration,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
        }
    }
}

/// Gateway client configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// WebSocket URL of the gateway
    pub gateway_url: String,
    /// Base URL of the REST API, used for snapshot hydration
    pub rest_url: String,
    /// Authentication token sent with Identify and Resume
    pub token: String,
    /// Reconnect policy
    pub reconnect: ReconnectConfig,
    /// Member count above which a guild's inline member list is treated
    /// as truncated and re-fetched over REST
    pub large_threshold: usize,
    /// Capacity of the outbound frame queue
    pub outbound_buffer: usize,
}

impl GatewayConfig {
    /// Create a configuration with default tuning for the given endpoints
    pub fn new(
        gateway_url: impl Into<String>,
        rest_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            gateway_url: gateway_url.into(),
            rest_url: rest_url.into(),
            token: token.into(),
            reconnect: ReconnectConfig::default(),
            large_threshold: 250,
            outbound_buffer: 64,
        }
    }

    /// Override the reconnect policy
    #[must_use]
    pub fn with_reconnect(mut self, reconnect: ReconnectConfig) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Override the large-guild threshold
    #[must_use]
    pub fn with_large_threshold(mut self, threshold: usize) -> Self {
        self.large_threshold = threshold;
        self
    }
}
