use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

use linkpage::app::EditGate;
use linkpage::config::Config;
use linkpage::content::BioGenerator;
use linkpage::session::Session;
use linkpage::store::{build_http_client, Repository, SheetClient, SnapshotCache};
use linkpage::sync::SyncEvent;
use linkpage::ui::describe_sync_event;

/// Get the config directory path (~/.config/linkpage/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("linkpage"))
}

#[derive(Parser, Debug)]
#[command(name = "linkpage", about = "Edit a link-in-bio page from the terminal")]
struct Args {
    /// Config file (default: ~/.config/linkpage/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Spreadsheet endpoint URL, overrides config and LINKPAGE_ENDPOINT
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; the TUI owns stdout while it runs
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = match args.config {
        Some(path) => path,
        None => get_config_dir()?.join("config.toml"),
    };
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config '{}'", config_path.display()))?;
    config.apply_env(|key| std::env::var(key).ok());
    if let Some(endpoint) = args.endpoint {
        config.endpoint_url = endpoint;
    }
    tracing::debug!(?config, "Configuration loaded");

    let endpoint = config.endpoint().context("Invalid endpoint URL")?;
    let client = build_http_client().context("Failed to create HTTP client")?;

    let store = match endpoint {
        Some(url) => {
            tracing::info!(endpoint = %url, "Using remote store");
            SheetClient::new(client.clone(), Some(url), config.request_timeout())
        }
        None => {
            eprintln!("No endpoint configured: running local-only, edits will not be saved.");
            SheetClient::unconfigured()
        }
    };
    let repo = Repository::new(Arc::new(store), SnapshotCache::new());

    let bio = config.bio_api_key().map(|key| {
        BioGenerator::new(client, key, config.bio.model.clone(), config.bio.base_url.clone())
    });

    let (event_tx, mut event_rx) = mpsc::channel::<SyncEvent>(32);
    let mut session = Session::new(
        repo,
        EditGate::new(config.admin_password()),
        bio,
        config.debounce(),
        event_tx,
    );
    session.load().await;

    let result = linkpage::ui::run(&mut session, &mut event_rx).await;

    // Flush edit mode and drain in-flight writes even if the TUI failed.
    // Outcomes are read concurrently so no write task blocks on a full channel.
    let report = async {
        while let Some(event) = event_rx.recv().await {
            if let Some(text) = describe_sync_event(&event) {
                println!("{}", text);
            }
        }
    };
    tokio::join!(session.shutdown(), report);
    result
}
