use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use payslip_engine::api::{AppState, create_router};
use payslip_engine::config::ConfigLoader;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Policy directory containing policy.yaml and health_allowance.yaml.
    /// Uses the built-in policy when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:3000")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(dir) => ConfigLoader::load(dir)
            .with_context(|| format!("loading policy from {}", dir.display()))?,
        None => ConfigLoader::default(),
    };
    let policy = config.policy();
    info!(
        code = %policy.metadata.code,
        version = %policy.metadata.version,
        effective_date = %policy.metadata.effective_date,
        "Policy loaded"
    );

    let app = create_router(AppState::new(config));
    let listener = TcpListener::bind(cli.bind)
        .await
        .with_context(|| format!("binding {}", cli.bind))?;
    info!(address = %cli.bind, "Payslip engine listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
