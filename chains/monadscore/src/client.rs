//! Resilient request execution against the scoring service.
//!
//! [`RequestExecutor`] wraps an [`HttpBackend`] with the bounded retry policy:
//! every failed attempt (network error or non-2xx status) is retried after a
//! growing delay until the attempt budget is spent, then the last error is
//! returned as-is.

use crate::transport::{TransportBuilder, TransportConfig};
use async_trait::async_trait;
use core_logic::{with_retry, NetworkError, ProxyConfig, RetryConfig};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            _ => Err(NetworkError::UnsupportedMethod {
                method: s.to_string(),
            }),
        }
    }
}

/// A 2xx response with its decoded body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn message(&self) -> Option<&str> {
        self.body.get("message").and_then(Value::as_str)
    }
}

/// One HTTP round trip. Non-2xx statuses must come back as
/// [`NetworkError::HttpError`] with the decoded body attached.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    async fn send(
        &self,
        method: HttpMethod,
        url: &str,
        payload: Option<&Value>,
        transport: &TransportConfig,
    ) -> Result<ApiResponse, NetworkError>;
}

/// Decodes a body as JSON, falling back to a JSON string of the raw text.
fn decode_body(text: String) -> Value {
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ReqwestBackend;

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn send(
        &self,
        method: HttpMethod,
        url: &str,
        payload: Option<&Value>,
        transport: &TransportConfig,
    ) -> Result<ApiResponse, NetworkError> {
        let client = transport.to_client()?;

        let mut request = match method {
            HttpMethod::Get => client.get(url),
            HttpMethod::Post => client.post(url),
            HttpMethod::Put => client.put(url),
        };
        if let Some(payload) = payload {
            request = request.json(payload);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                NetworkError::Timeout {
                    timeout_ms: transport.timeout.as_millis() as u64,
                    endpoint: url.to_string(),
                }
            } else {
                NetworkError::Transport {
                    endpoint: url.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| NetworkError::InvalidResponse {
                endpoint: url.to_string(),
                reason: e.to_string(),
            })?;

        if !status.is_success() {
            return Err(NetworkError::HttpError {
                status_code: status.as_u16(),
                endpoint: url.to_string(),
                body: (!text.is_empty()).then(|| decode_body(text)),
            });
        }

        Ok(ApiResponse {
            status: status.as_u16(),
            body: decode_body(text),
        })
    }
}

/// Per-identity request context: the assigned proxy and the current bearer token.
#[derive(Debug, Clone, Copy, Default)]
pub struct Session<'a> {
    pub proxy: Option<&'a ProxyConfig>,
    pub token: Option<&'a str>,
}

impl<'a> Session<'a> {
    pub fn new(proxy: Option<&'a ProxyConfig>) -> Self {
        Self { proxy, token: None }
    }

    pub fn with_token(self, token: &'a str) -> Self {
        Self {
            token: Some(token),
            ..self
        }
    }
}

pub struct RequestExecutor<B = ReqwestBackend> {
    backend: B,
    transport: TransportBuilder,
    retry: RetryConfig,
}

impl<B: HttpBackend> RequestExecutor<B> {
    pub fn new(backend: B, transport: TransportBuilder, retry: RetryConfig) -> Self {
        Self {
            backend,
            transport,
            retry,
        }
    }

    pub fn retry_config(&self) -> RetryConfig {
        self.retry
    }

    /// Issues one logical request with retries. A fresh transport is built for every attempt.
    pub async fn execute(
        &self,
        method: HttpMethod,
        url: &str,
        payload: Option<&Value>,
        session: Session<'_>,
    ) -> Result<ApiResponse, NetworkError> {
        let operation_name = format!("{} {}", method, url);

        with_retry(
            self.retry,
            &operation_name,
            NetworkError::is_retryable,
            || async move {
                let transport = self.transport.build(session.proxy, session.token);
                self.backend.send(method, url, payload, &transport).await
            },
        )
        .await
    }

    /// Like [`execute`](Self::execute), for methods given as text. Unknown
    /// methods fail before any I/O and are never retried.
    pub async fn execute_str(
        &self,
        method: &str,
        url: &str,
        payload: Option<&Value>,
        session: Session<'_>,
    ) -> Result<ApiResponse, NetworkError> {
        let method = method.parse::<HttpMethod>()?;
        debug!("{} {}", method, url);
        self.execute(method, url, payload, session).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parsing() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("POST".parse::<HttpMethod>().unwrap(), HttpMethod::Post);
        assert_eq!("Put".parse::<HttpMethod>().unwrap(), HttpMethod::Put);

        match "delete".parse::<HttpMethod>() {
            Err(NetworkError::UnsupportedMethod { method }) => assert_eq!(method, "delete"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_decode_body_falls_back_to_text() {
        assert_eq!(
            decode_body(r#"{"token":"abc"}"#.to_string()),
            serde_json::json!({ "token": "abc" })
        );
        assert_eq!(
            decode_body("Bad Gateway".to_string()),
            Value::String("Bad Gateway".to_string())
        );
    }

    #[test]
    fn test_session_with_token_keeps_proxy() {
        let proxy = ProxyConfig::new("http://1.2.3.4:8080");
        let session = Session::new(Some(&proxy)).with_token("tok");
        assert_eq!(session.proxy, Some(&proxy));
        assert_eq!(session.token, Some("tok"));
    }
}
