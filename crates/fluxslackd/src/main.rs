use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use fluxslack_core::{init_tracing, SlackNotifier};
use fluxslackd::{start_server, Cli};
use tracing::{info, Level};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    init_tracing(cli.json, level);

    let config = cli.notifier_config();
    let notifier = SlackNotifier::new(&config).context("failed to initialize Slack notifier")?;

    // The webhook URL carries a secret token; only log its host.
    info!(
        endpoint = notifier.client().endpoint().host_str().unwrap_or_default(),
        cluster = %config.cluster_name,
        "Forwarding Flux events to Slack"
    );

    start_server(Arc::new(notifier), cli.listen_addr())
        .await
        .context("event receiver failed")?;

    info!("bye");
    Ok(())
}
