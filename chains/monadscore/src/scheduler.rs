use crate::client::HttpBackend;
use crate::config::MonadConfig;
use crate::pipeline::{IdentityPipeline, PipelineState};
use anyhow::Result;
use core_logic::{Identity, MessageSigner, ProxyConfig, ProxyManager, WalletError, WalletManager};
use std::sync::Arc;
use tracing::{error, info, warn, Instrument};

/// Proxy for the identity at `index`: round-robin over the list, none when it is empty.
pub fn assign_proxy(index: usize, proxies: &[ProxyConfig]) -> Option<&ProxyConfig> {
    if proxies.is_empty() {
        None
    } else {
        proxies.get(index % proxies.len())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleSummary {
    pub processed: usize,
    pub authenticated: usize,
    pub failed: usize,
}

pub struct CycleScheduler<B, S> {
    pipeline: Arc<IdentityPipeline<B, S>>,
    config: Arc<MonadConfig>,
    use_proxy: bool,
}

impl<B, S> CycleScheduler<B, S>
where
    B: HttpBackend + 'static,
    S: MessageSigner + 'static,
{
    pub fn new(pipeline: Arc<IdentityPipeline<B, S>>, config: Arc<MonadConfig>, use_proxy: bool) -> Self {
        Self {
            pipeline,
            config,
            use_proxy,
        }
    }

    /// Runs cycles until the identity store comes back empty.
    pub async fn run_forever(&self) -> Result<()> {
        loop {
            match self.run_cycle().await {
                Ok(summary) => info!(
                    "Cycle complete | Processed: {} | Authenticated: {} | Failed: {}",
                    summary.processed, summary.authenticated, summary.failed
                ),
                Err(e) => {
                    error!("{}", e);
                    return Ok(());
                }
            }

            info!(
                "Waiting {}h before the next cycle...",
                self.config.cycle_interval().as_secs_f64() / 3600.0
            );
            tokio::time::sleep(self.config.cycle_interval()).await;
        }
    }

    fn load_proxies(&self) -> Vec<ProxyConfig> {
        if !self.use_proxy {
            return Vec::new();
        }

        let proxies = match ProxyManager::load_proxies(&self.config.proxy_file) {
            Ok(p) => p,
            Err(e) => {
                error!("Failed to read proxies: {}", e);
                Vec::new()
            }
        };
        if proxies.is_empty() {
            warn!(
                "No proxies in {}, continuing without proxies.",
                self.config.proxy_file
            );
        }
        proxies
    }

    fn load_identities(&self) -> Result<Vec<Identity>, WalletError> {
        let identities = match WalletManager::load_identities(&self.config.accounts_file) {
            Ok(ids) => ids,
            Err(e) => {
                error!("Failed to read identities: {}", e);
                Vec::new()
            }
        };

        if identities.is_empty() {
            return Err(WalletError::EmptyIdentityList {
                path: self.config.accounts_file.clone(),
            });
        }
        Ok(identities)
    }

    /// One pass over every identity, strictly one at a time.
    ///
    /// Each pipeline runs in its own task and is awaited before the next starts,
    /// so a panic inside one identity is reported and the cycle moves on.
    pub async fn run_cycle(&self) -> Result<CycleSummary, WalletError> {
        let proxies = self.load_proxies();
        let identities = self.load_identities()?;
        let total = identities.len();
        let mut summary = CycleSummary::default();

        for (i, identity) in identities.into_iter().enumerate() {
            let proxy = assign_proxy(i, &proxies).cloned();
            let pipeline = Arc::clone(&self.pipeline);
            let span = tracing::info_span!("account", index = i + 1);

            info!("{}", "=".repeat(80));
            info!("Account: {}/{}", i + 1, total);
            info!("Wallet: {}", identity.address);
            if let Some(p) = &proxy {
                info!("Proxy: {}", p);
            }

            let handle = tokio::spawn(
                async move { pipeline.run(&identity, proxy.as_ref()).await }.instrument(span),
            );

            summary.processed += 1;
            match handle.await {
                Ok(outcome) if outcome.state == PipelineState::Done => summary.authenticated += 1,
                Ok(_) => summary.failed += 1,
                Err(e) => {
                    error!("Account {} processing FAILED: {}", i + 1, e);
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }
}
