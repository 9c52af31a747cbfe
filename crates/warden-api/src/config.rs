// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use warden_core::PasswordHasherConfig;

use crate::auth::JwtConfig;
use crate::middleware::RateLimitConfig;

// =============================================================================
// ApiConfig
// =============================================================================

/// Configuration for the API server.
///
/// `jwt` has no defaults; everything else does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Server host address.
    #[serde(default = "default_host")]
    pub host: IpAddr,
    /// Server port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Token signing configuration.
    pub jwt: JwtConfig,
    /// Rate limiting configuration.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Argon2 cost parameters.
    #[serde(default)]
    pub password: PasswordHasherConfig,
    /// Request timeout.
    #[serde(default = "default_request_timeout", with = "duration_secs")]
    pub request_timeout: Duration,
    /// Interval between revocation sweeps.
    #[serde(default = "default_sweep_interval", with = "duration_secs")]
    pub sweep_interval: Duration,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0))
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_sweep_interval() -> Duration {
    warden_core::revocation::DEFAULT_SWEEP_INTERVAL
}

impl ApiConfig {
    /// Creates a configuration with default server settings.
    pub fn new(jwt: JwtConfig) -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            jwt,
            rate_limit: RateLimitConfig::default(),
            password: PasswordHasherConfig::default(),
            request_timeout: default_request_timeout(),
            sweep_interval: default_sweep_interval(),
        }
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Sets the host address.
    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    /// Sets the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the rate limit configuration.
    pub fn with_rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Sets the password hashing cost.
    pub fn with_password(mut self, password: PasswordHasherConfig) -> Self {
        self.password = password;
        self
    }

    /// Sets the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the revocation sweep interval.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }
}

// =============================================================================
// Duration Serde
// =============================================================================

/// Serializes a `Duration` as whole seconds.
pub(crate) mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt() -> JwtConfig {
        JwtConfig::new("test-secret-key-that-is-long-enough", "warden", "warden-clients", 60)
    }

    #[test]
    fn test_defaults() {
        let config = ApiConfig::new(jwt());
        assert_eq!(config.socket_addr().port(), 8080);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.sweep_interval, Duration::from_secs(60));
        assert!(config.rate_limit.enabled);
    }

    #[test]
    fn test_builder_methods() {
        let config = ApiConfig::new(jwt())
            .with_host(IpAddr::V4(Ipv4Addr::LOCALHOST))
            .with_port(9000)
            .with_rate_limit(RateLimitConfig::disabled())
            .with_request_timeout(Duration::from_secs(5));

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:9000");
        assert!(!config.rate_limit.enabled);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_deserialize_requires_jwt() {
        let err = serde_json::from_str::<ApiConfig>(r#"{"port": 9000}"#).unwrap_err();
        assert!(err.to_string().contains("jwt"));

        let config: ApiConfig = serde_json::from_str(
            r#"{
                "jwt": {"secret": "s", "issuer": "i", "audience": "a", "expiry_minutes": 5},
                "request_timeout": 10
            }"#,
        )
        .unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_secret_not_serialized() {
        let json = serde_json::to_string(&ApiConfig::new(jwt())).unwrap();
        assert!(!json.contains("test-secret-key"));
    }
}
