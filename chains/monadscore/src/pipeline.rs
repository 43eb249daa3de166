//! Per-identity workflow: public IP lookup, token bootstrap and login, the three
//! task claims, and the node start-time update.
//!
//! Authentication failures stop the identity for this cycle; claim and node-start
//! failures are recorded and processing moves on.

use crate::client::{HttpBackend, HttpMethod, RequestExecutor, Session};
use crate::config::MonadConfig;
use anyhow::{anyhow, Context, Result};
use core_logic::{Identity, MessageSigner, NetworkError, ProxyConfig, TaskResult};
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{error, info};

/// Claimed in this order on every cycle.
pub const TASK_IDS: [&str; 3] = ["task003", "task002", "task001"];

const SUCCESS_MARKERS: [&str; 2] = ["successfully", "成功"];

const IP_NOT_FOUND: &str = "IP not found";
const IP_LOOKUP_FAILED: &str = "IP lookup failed";

/// Case-insensitive check for the success wording the service uses.
pub fn is_success_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    SUCCESS_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Ownership challenge shown to the wallet before login.
pub fn challenge_message(address: &str) -> String {
    format!(
        "Request from monadscore.xyz\n\nMessage\n\nSign this message to verify ownership and continue to dashboard!\n\n{}",
        address
    )
}

/// Message carried by an error response, or the error itself.
fn failure_detail(err: &NetworkError) -> String {
    err.server_message()
        .map(str::to_string)
        .unwrap_or_else(|| err.to_string())
}

fn total_points(body: &Value) -> Option<Value> {
    body.get("user")
        .and_then(|user| user.get("totalPoints"))
        .cloned()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Init,
    ResolvingPublicIp,
    Authenticating,
    ClaimingTasks,
    StartingNode,
    Done,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Points {
    Reported(Value),
    /// Node start succeeded but the response had no point total.
    Unknown,
    /// Node start failed and the error response had no point total.
    NotApplicable,
}

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Points::Reported(Value::String(s)) => f.write_str(s),
            Points::Reported(v) => write!(f, "{}", v),
            Points::Unknown => f.write_str("unknown"),
            Points::NotApplicable => f.write_str("N/A"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClaimOutcome {
    pub task_id: &'static str,
    pub result: TaskResult,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    pub state: PipelineState,
    pub public_ip: String,
    pub auth_succeeded: bool,
    pub auth_error: Option<String>,
    pub claims: Vec<ClaimOutcome>,
    pub node_start: Option<TaskResult>,
    pub total_points: Option<Points>,
}

impl PipelineOutcome {
    fn new() -> Self {
        Self {
            state: PipelineState::Init,
            public_ip: String::new(),
            auth_succeeded: false,
            auth_error: None,
            claims: Vec::with_capacity(TASK_IDS.len()),
            node_start: None,
            total_points: None,
        }
    }
}

pub struct IdentityPipeline<B, S> {
    executor: Arc<RequestExecutor<B>>,
    signer: Arc<S>,
    config: Arc<MonadConfig>,
}

impl<B, S> IdentityPipeline<B, S>
where
    B: HttpBackend,
    S: MessageSigner,
{
    pub fn new(executor: Arc<RequestExecutor<B>>, signer: Arc<S>, config: Arc<MonadConfig>) -> Self {
        Self {
            executor,
            signer,
            config,
        }
    }

    /// Runs every step for one identity and reports what happened.
    pub async fn run(&self, identity: &Identity, proxy: Option<&ProxyConfig>) -> PipelineOutcome {
        let mut outcome = PipelineOutcome::new();
        let session = Session::new(proxy);

        outcome.state = PipelineState::ResolvingPublicIp;
        outcome.public_ip = self.resolve_public_ip(session).await;
        info!("IP in use: {}", outcome.public_ip);

        outcome.state = PipelineState::Authenticating;
        info!("Authenticating...");
        let login_token = match self.authenticate(identity, session).await {
            Ok(token) => {
                outcome.auth_succeeded = true;
                info!("Authentication SUCCESS");
                token
            }
            Err(e) => {
                error!("Authentication FAILED: {:#}", e);
                outcome.auth_error = Some(format!("{:#}", e));
                outcome.state = PipelineState::Failed;
                return outcome;
            }
        };
        let session = session.with_token(&login_token);

        outcome.state = PipelineState::ClaimingTasks;
        for (i, task_id) in TASK_IDS.into_iter().enumerate() {
            let result = self.claim_task(identity, task_id, session).await;
            if result.success {
                info!("Claim task {}/{} SUCCESS", i + 1, TASK_IDS.len());
            } else {
                error!(
                    "Claim task {}/{} FAILED: {}",
                    i + 1,
                    TASK_IDS.len(),
                    result.message
                );
            }
            outcome.claims.push(ClaimOutcome { task_id, result });
        }

        outcome.state = PipelineState::StartingNode;
        info!("Starting node...");
        let (result, points) = self.start_node(identity, session).await;
        if result.success {
            info!("Start node SUCCESS: {}", result.message);
        } else {
            error!("Start node FAILED: {}", result.message);
        }
        info!("Total points: {}", points);
        outcome.node_start = Some(result);
        outcome.total_points = Some(points);

        outcome.state = PipelineState::Done;
        outcome
    }

    /// Best-effort lookup of the egress IP, for the operator only.
    async fn resolve_public_ip(&self, session: Session<'_>) -> String {
        match self
            .executor
            .execute(HttpMethod::Get, &self.config.ip_echo_url, None, session)
            .await
        {
            Ok(response) => response
                .body
                .get("ip")
                .and_then(Value::as_str)
                .unwrap_or(IP_NOT_FOUND)
                .to_string(),
            Err(_) => IP_LOOKUP_FAILED.to_string(),
        }
    }

    /// Bootstrap token, challenge signature, then login. Returns the login token.
    ///
    /// The signature is produced but not sent; the login call only presents the
    /// wallet address under the bootstrap token.
    async fn authenticate(&self, identity: &Identity, session: Session<'_>) -> Result<String> {
        let bootstrap_token = self
            .fetch_bootstrap_token(&identity.address, session)
            .await
            .context("bootstrap token request failed")?;

        info!("Signing wallet challenge...");
        tokio::time::sleep(self.config.step_delay()).await;
        self.signer
            .sign_message(
                &challenge_message(&identity.address),
                &identity.address,
                &identity.private_key,
            )
            .await
            .context("challenge signing failed")?;
        info!("Signature created");
        tokio::time::sleep(self.config.step_delay()).await;

        self.login(&identity.address, session.with_token(&bootstrap_token))
            .await
            .context("login request failed")
    }

    async fn fetch_bootstrap_token(&self, address: &str, session: Session<'_>) -> Result<String> {
        let payload = json!({ "wallet": address, "invite": null });
        let response = self
            .executor
            .execute(
                HttpMethod::Post,
                &self.config.endpoint("/user"),
                Some(&payload),
                session,
            )
            .await?;
        token_from(&response.body)
    }

    async fn login(&self, address: &str, session: Session<'_>) -> Result<String> {
        let payload = json!({ "wallet": address });
        let response = self
            .executor
            .execute(
                HttpMethod::Post,
                &self.config.endpoint("/user/login"),
                Some(&payload),
                session,
            )
            .await?;
        token_from(&response.body)
    }

    async fn claim_task(
        &self,
        identity: &Identity,
        task_id: &str,
        session: Session<'_>,
    ) -> TaskResult {
        let payload = json!({ "wallet": identity.address, "taskId": task_id });
        let message = match self
            .executor
            .execute(
                HttpMethod::Post,
                &self.config.endpoint("/user/claim-task"),
                Some(&payload),
                session,
            )
            .await
        {
            Ok(response) => response
                .message()
                .map(str::to_string)
                .unwrap_or_else(|| {
                    "Task claimed successfully, but the server returned no message.".to_string()
                }),
            Err(e) => format!("Failed to claim task {}: {}", task_id, failure_detail(&e)),
        };

        TaskResult::new(is_success_message(&message), message)
    }

    /// Registers the node start time and reads the point total from whichever
    /// body came back.
    async fn start_node(&self, identity: &Identity, session: Session<'_>) -> (TaskResult, Points) {
        let payload = json!({
            "wallet": identity.address,
            "startTime": chrono::Utc::now().timestamp_millis(),
        });

        let (message, points) = match self
            .executor
            .execute(
                HttpMethod::Put,
                &self.config.endpoint("/user/update-start-time"),
                Some(&payload),
                session,
            )
            .await
        {
            Ok(response) => (
                response
                    .message()
                    .unwrap_or("Node started successfully")
                    .to_string(),
                total_points(&response.body)
                    .map(Points::Reported)
                    .unwrap_or(Points::Unknown),
            ),
            Err(e) => (
                format!("Failed to start node: {}", failure_detail(&e)),
                e.body()
                    .and_then(total_points)
                    .map(Points::Reported)
                    .unwrap_or(Points::NotApplicable),
            ),
        };

        (TaskResult::new(is_success_message(&message), message), points)
    }
}

fn token_from(body: &Value) -> Result<String> {
    body.get("token")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| anyhow!("response has no token"))
}
