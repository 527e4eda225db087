//! kubeip agent
//!
//! Runs on every node of a Kubernetes cluster that needs a static public IP
//! address. The agent resolves credentials, connects to the API server,
//! identifies the node it runs on and then stays up until it is told to stop.

mod cli;
mod config;
mod logging;
mod shutdown;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::{debug, error, info, info_span, Instrument};

use cli::{Cli, Command};
use config::Config;
use kubeip_core::{Explorer, NodeDescriptor, NodeLookup};
use kubeip_k8s::K8sClient;

/// Connect to the cluster, resolve the node and wait for shutdown
async fn run(config: Config, shutdown: watch::Receiver<bool>) -> Result<()> {
    info!(develop_mode = config.develop_mode, "kubeip agent started");

    let client = K8sClient::connect(config.kubeconfig.as_deref()).await?;
    let explorer = Explorer::new(client, config.node_name.clone());

    run_agent(&explorer, &config, shutdown).await?;
    Ok(())
}

/// Resolve the current node, then block until shutdown is requested
async fn run_agent<L: NodeLookup>(
    explorer: &Explorer<L>,
    config: &Config,
    mut shutdown: watch::Receiver<bool>,
) -> Result<NodeDescriptor> {
    let node = explorer.get_node().await.context("getting node")?;

    debug!(node = %node.name, "node name");
    if config.develop_mode {
        info!(
            node = %node.name,
            cloud = %node.cloud,
            instance = ?node.instance,
            region = ?node.region,
            zone = ?node.zone,
            pool = ?node.pool,
            external_ips = ?node.external_ips,
            internal_ips = ?node.internal_ips,
            retry_interval = ?config.retry_interval,
            retry_attempts = config.retry_attempts,
            "Resolved node"
        );
    }

    shutdown::wait(&mut shutdown).await;

    info!("kubeip agent stopped");
    Ok(node)
}

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let Command::Run(args) = Cli::parse_args().command;

    let config = Config::from_args(&args);

    // Initialize logging
    logging::init_logging(&config.log_level, config.log_json);

    let span = info_span!("kubeip-agent", version = env!("CARGO_PKG_VERSION"));

    let result = async {
        config.validate().context("Invalid configuration")?;
        let shutdown_rx =
            shutdown::signal_channel().context("installing signal handlers")?;
        run(config, shutdown_rx).await
    }
    .instrument(span)
    .await;

    if let Err(e) = result {
        error!(version = env!("CARGO_PKG_VERSION"), "kubeip agent failed: {e:#}");
        std::process::exit(1);
    }
}
