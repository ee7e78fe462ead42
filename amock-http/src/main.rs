use std::path::PathBuf;
use std::sync::Arc;

use amock_core::{Config, Database};
use amock_store::{JsonFileStore, TableStore};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "amock", version, about = "Serve synthetic JSON tables over HTTP")]
struct Cli {
    /// Address to listen on, as `[http://]host[:port]`.
    address: Option<String>,
    /// Config file to use instead of the discovered one.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(short, long)]
    verbose: bool,
    /// Where collections and inferred schemas are stored.
    #[arg(long, default_value = ".amock")]
    data_root: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .init();

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_env(std::env::vars())?;
    if let Some(address) = &cli.address {
        config.apply_address(address)?;
    }
    tracing::debug!(?config, "configuration loaded");

    let sources = config.table_sources()?;
    let store: Arc<dyn TableStore> = Arc::new(JsonFileStore::open(&cli.data_root)?);
    let db = Arc::new(Database::hydrate(store, &sources, config.init_count).await?);

    let base_url = config.base_url();
    println!("amock listening on {base_url}");
    for line in amock_http::route_listing(&db, &base_url) {
        println!("  {line}");
    }

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    axum::serve(listener, amock_http::app(db)).await?;

    Ok(())
}
