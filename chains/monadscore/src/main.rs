use anyhow::Result;
use clap::Parser;
use core_logic::setup_logger;
use dialoguer::{theme::ColorfulTheme, Confirm};
use monadscore::client::{ReqwestBackend, RequestExecutor};
use monadscore::config::MonadConfig;
use monadscore::pipeline::IdentityPipeline;
use monadscore::scheduler::CycleScheduler;
use monadscore::signer::EthersSigner;
use monadscore::transport::TransportBuilder;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Keep guard alive for file logging
    let _log_guard = setup_logger("monadscore");

    let args = Args::parse();
    info!("Loading config from: {}", args.config);

    let config = match MonadConfig::load(&args.config) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            error!("Failed to load config: {:#}", e);
            return Ok(());
        }
    };

    let use_proxy = match Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Use a proxy?")
        .default(false)
        .interact()
    {
        Ok(answer) => answer,
        Err(_) => {
            warn!("Cannot prompt (not a terminal). Running without proxies.");
            false
        }
    };

    let transport = TransportBuilder::new(&config.origin, config.request_timeout())?;
    let executor = Arc::new(RequestExecutor::new(
        ReqwestBackend,
        transport,
        config.retry_config(),
    ));
    let pipeline = Arc::new(IdentityPipeline::new(
        executor,
        Arc::new(EthersSigner),
        Arc::clone(&config),
    ));

    CycleScheduler::new(pipeline, config, use_proxy)
        .run_forever()
        .await
}
