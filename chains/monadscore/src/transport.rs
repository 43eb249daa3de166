//! Per-request transport settings: headers, timeout and the optional proxy tunnel.
//!
//! A [`TransportConfig`] is built fresh for every request attempt and never
//! shared between identities. The builder holds only immutable data, so it can
//! be used from any number of tasks at once.

use core_logic::{NetworkError, ProxyConfig, TunnelKind};
use rand::seq::SliceRandom;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, ORIGIN, REFERER, USER_AGENT,
};
use std::time::Duration;
use tracing::warn;

pub const USER_AGENTS: [&str; 4] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/134.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/15.1 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/105.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Firefox/102.0",
];

const ACCEPT_VALUE: &str = "application/json, text/plain, */*";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyTunnel {
    pub kind: TunnelKind,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub headers: HeaderMap,
    pub proxy: Option<ProxyTunnel>,
    pub timeout: Duration,
}

impl TransportConfig {
    pub fn user_agent(&self) -> Option<&str> {
        self.headers.get(USER_AGENT).and_then(|v| v.to_str().ok())
    }

    /// Bearer token carried in the `Authorization` header, if any.
    pub fn bearer_token(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
    }

    /// Builds the reqwest client that carries these settings.
    pub fn to_client(&self) -> Result<reqwest::Client, NetworkError> {
        let mut builder = reqwest::Client::builder()
            .default_headers(self.headers.clone())
            .timeout(self.timeout);

        if let Some(tunnel) = &self.proxy {
            let proxy = reqwest::Proxy::all(&tunnel.url).map_err(|e| NetworkError::Transport {
                endpoint: tunnel.url.clone(),
                reason: format!("invalid proxy: {}", e),
            })?;
            builder = builder.proxy(proxy);
        }

        builder.build().map_err(|e| NetworkError::Transport {
            endpoint: "client".to_string(),
            reason: e.to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct TransportBuilder {
    origin: HeaderValue,
    referer: HeaderValue,
    timeout: Duration,
}

impl TransportBuilder {
    pub fn new(origin: &str, timeout: Duration) -> Result<Self, core_logic::ConfigError> {
        let invalid = || core_logic::ConfigError::InvalidValue {
            field: "origin".to_string(),
            reason: format!("'{}' is not a valid header value", origin),
        };
        let origin_trimmed = origin.trim_end_matches('/');

        Ok(Self {
            origin: HeaderValue::from_str(origin_trimmed).map_err(|_| invalid())?,
            referer: HeaderValue::from_str(&format!("{}/", origin_trimmed))
                .map_err(|_| invalid())?,
            timeout,
        })
    }

    /// Assembles headers and the proxy tunnel for one request attempt.
    ///
    /// A proxy with an unsupported scheme is dropped with a warning; the request
    /// then goes out directly.
    pub fn build(&self, proxy: Option<&ProxyConfig>, token: Option<&str>) -> TransportConfig {
        let mut headers = HeaderMap::new();

        let user_agent = USER_AGENTS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(USER_AGENTS[0]);
        headers.insert(USER_AGENT, HeaderValue::from_static(user_agent));
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ORIGIN, self.origin.clone());
        headers.insert(REFERER, self.referer.clone());

        if let Some(token) = token {
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => {
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => warn!("Session token contains invalid header characters, sending without it"),
            }
        }

        let proxy = proxy.and_then(|p| match p.scheme() {
            Ok(scheme) => Some(ProxyTunnel {
                kind: scheme.tunnel(),
                url: p.url.clone(),
            }),
            Err(e) => {
                warn!("{}", e);
                None
            }
        });

        TransportConfig {
            headers,
            proxy,
            timeout: self.timeout,
        }
    }
}
