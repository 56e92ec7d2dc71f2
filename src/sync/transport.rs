//! Single-attempt HTTP transport.
//!
//! Owns the `reqwest::Client` (and with it the connection pool) and executes
//! exactly one attempt per call. Retry and rate limiting live in the
//! executor, never here.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use serde::Serialize;

use super::error::TransportError;

/// Transport-level settings.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Time allowed to establish a connection
    pub connect_timeout: Duration,
    /// Overall deadline for a single request attempt
    pub request_timeout: Duration,
    /// TCP keep-alive interval
    pub keepalive: Duration,
    /// Idle connections kept per host
    pub pool_max_idle: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            keepalive: Duration::from_secs(30),
            pool_max_idle: 4,
        }
    }
}

/// An immutable description of a request.
///
/// The body is buffered once as bytes; every attempt sends an independent
/// copy, so an exhausted stream can never leak into a retry.
#[derive(Debug, Clone)]
pub struct RequestTemplate {
    pub method: reqwest::Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl RequestTemplate {
    pub fn new(method: reqwest::Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Buffers `body` as the JSON request payload.
    pub fn with_json<T: Serialize>(mut self, body: &T) -> Result<Self, TransportError> {
        let bytes = serde_json::to_vec(body).map_err(|e| TransportError::Invalid(e.to_string()))?;
        self.body = Some(bytes);
        Ok(self)
    }
}

/// HTTP transport with IPv4-forced dialing and bounded lifetimes.
pub struct Transport {
    client: reqwest::Client,
}

impl Transport {
    /// Builds the underlying client.
    ///
    /// The local address is pinned to `0.0.0.0` so connections always dial
    /// IPv4, sidestepping hosts whose AAAA records point at unreachable
    /// addresses on constrained networks.
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .local_address(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .tcp_keepalive(config.keepalive)
            .pool_max_idle_per_host(config.pool_max_idle)
            .build()
            .map_err(|e| TransportError::Invalid(e.to_string()))?;
        Ok(Self { client })
    }

    /// Executes a single attempt of `template`.
    pub async fn send(
        &self,
        template: &RequestTemplate,
    ) -> Result<reqwest::Response, TransportError> {
        let mut request = self.client.request(template.method.clone(), &template.url);
        for (name, value) in &template.headers {
            request = request.header(name, value);
        }
        if let Some(body) = &template.body {
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body.clone());
        }
        request.send().await.map_err(TransportError::from_reqwest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_buffers_json_body() {
        let template = RequestTemplate::new(reqwest::Method::POST, "http://x.test/api/")
            .with_json(&serde_json::json!({"url": "https://example.com"}))
            .unwrap();
        let body = template.body.as_deref().unwrap();
        assert_eq!(body, br#"{"url":"https://example.com"}"#);
    }

    #[test]
    fn test_template_clone_keeps_independent_body() {
        let template = RequestTemplate::new(reqwest::Method::POST, "http://x.test/api/")
            .with_json(&serde_json::json!({"a": 1}))
            .unwrap();
        let copy = template.clone();
        assert_eq!(template.body, copy.body);
    }

    #[test]
    fn test_default_config_timeouts() {
        let config = TransportConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }
}
