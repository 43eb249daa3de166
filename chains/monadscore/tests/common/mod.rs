#![allow(dead_code)]

use async_trait::async_trait;
use core_logic::{MessageSigner, NetworkError, WalletError};
use monadscore::client::{ApiResponse, HttpBackend, HttpMethod, RequestExecutor};
use monadscore::config::MonadConfig;
use monadscore::pipeline::IdentityPipeline;
use monadscore::transport::{ProxyTunnel, TransportBuilder, TransportConfig};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const BASE: &str = "http://mock.test";

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: HttpMethod,
    pub path: String,
    pub payload: Option<Value>,
    pub bearer: Option<String>,
    pub user_agent: Option<String>,
    pub proxy: Option<ProxyTunnel>,
}

type Reply = Result<ApiResponse, NetworkError>;

/// In-memory backend answering by path. Each route holds a queue of replies;
/// the last reply repeats once the queue is down to one entry.
#[derive(Default)]
pub struct ScriptedBackend {
    routes: Mutex<HashMap<String, Vec<Reply>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, path: &str, replies: Vec<Reply>) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), replies);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.path == path)
            .collect()
    }
}

pub fn ok(body: Value) -> Reply {
    Ok(ApiResponse { status: 200, body })
}

pub fn network_down(path: &str) -> Reply {
    Err(NetworkError::Transport {
        endpoint: format!("{}{}", BASE, path),
        reason: "connection refused".to_string(),
    })
}

pub fn http_error(path: &str, status_code: u16, body: Value) -> Reply {
    Err(NetworkError::HttpError {
        status_code,
        endpoint: format!("{}{}", BASE, path),
        body: Some(body),
    })
}

#[async_trait]
impl HttpBackend for ScriptedBackend {
    async fn send(
        &self,
        method: HttpMethod,
        url: &str,
        payload: Option<&Value>,
        transport: &TransportConfig,
    ) -> Result<ApiResponse, NetworkError> {
        let path = url.strip_prefix(BASE).unwrap_or(url).to_string();

        self.calls.lock().unwrap().push(RecordedCall {
            method,
            path: path.clone(),
            payload: payload.cloned(),
            bearer: transport.bearer_token().map(str::to_string),
            user_agent: transport.user_agent().map(str::to_string),
            proxy: transport.proxy.clone(),
        });

        let mut routes = self.routes.lock().unwrap();
        match routes.get_mut(&path) {
            Some(replies) if replies.len() > 1 => replies.remove(0),
            Some(replies) if !replies.is_empty() => replies[0].clone(),
            _ => Err(NetworkError::HttpError {
                status_code: 404,
                endpoint: url.to_string(),
                body: None,
            }),
        }
    }
}

/// Signer that records every challenge; fails or panics for configured addresses.
#[derive(Default)]
pub struct FakeSigner {
    pub signed: Mutex<Vec<String>>,
    pub fail_for: Option<String>,
    pub panic_for: Option<String>,
}

#[async_trait]
impl MessageSigner for FakeSigner {
    async fn sign_message(
        &self,
        message: &str,
        address: &str,
        _private_key: &str,
    ) -> Result<String, WalletError> {
        if self.panic_for.as_deref() == Some(address) {
            panic!("signer blew up for {}", address);
        }
        if self.fail_for.as_deref() == Some(address) {
            return Err(WalletError::SigningFailed {
                address: address.to_string(),
                reason: "bad key".to_string(),
            });
        }
        self.signed.lock().unwrap().push(message.to_string());
        Ok("0xsig".to_string())
    }
}

pub fn test_config() -> MonadConfig {
    MonadConfig {
        api_base_url: BASE.to_string(),
        ip_echo_url: format!("{}/ip", BASE),
        initial_backoff_ms: 1,
        step_delay_ms: 0,
        cycle_interval_secs: 1,
        ..Default::default()
    }
}

pub fn executor(backend: Arc<ScriptedBackend>, config: &MonadConfig) -> RequestExecutor<SharedBackend> {
    let transport = TransportBuilder::new(&config.origin, Duration::from_secs(60)).unwrap();
    RequestExecutor::new(SharedBackend(backend), transport, config.retry_config())
}

/// Lets a test keep a handle on the backend it hands to the executor.
pub struct SharedBackend(pub Arc<ScriptedBackend>);

#[async_trait]
impl HttpBackend for SharedBackend {
    async fn send(
        &self,
        method: HttpMethod,
        url: &str,
        payload: Option<&Value>,
        transport: &TransportConfig,
    ) -> Result<ApiResponse, NetworkError> {
        self.0.send(method, url, payload, transport).await
    }
}

pub fn pipeline(
    backend: Arc<ScriptedBackend>,
    signer: Arc<FakeSigner>,
    config: MonadConfig,
) -> IdentityPipeline<SharedBackend, FakeSigner> {
    let executor = Arc::new(executor(backend, &config));
    IdentityPipeline::new(executor, signer, Arc::new(config))
}

/// Backend where every endpoint succeeds.
pub fn happy_backend() -> ScriptedBackend {
    ScriptedBackend::new()
        .on("/ip", vec![ok(serde_json::json!({ "ip": "203.0.113.7" }))])
        .on("/user", vec![ok(serde_json::json!({ "token": "bootstrap-token" }))])
        .on("/user/login", vec![ok(serde_json::json!({ "token": "login-token" }))])
        .on(
            "/user/claim-task",
            vec![ok(serde_json::json!({ "message": "Task claimed successfully" }))],
        )
        .on(
            "/user/update-start-time",
            vec![ok(serde_json::json!({
                "message": "Start time updated successfully",
                "user": { "totalPoints": 1200 }
            }))],
        )
}
