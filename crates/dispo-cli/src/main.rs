mod render;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use dispo_cache::{KvStore, MemoryStore, NoopStore};
use dispo_core::StoreRef;
use dispo_dutchie::{ClientConfig, DutchieClient};
use dispo_specials::SpecialsAggregator;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "dispo-cli")]
#[command(about = "Dispensary store list and specials from the Dutchie Plus API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List every store visible to the API token.
    Stores {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Show products on special, per store.
    Specials {
        /// Store to query as `ID=NAME`; repeatable. Defaults to every store.
        #[arg(long = "store", value_parser = parse_store_ref)]
        stores: Vec<StoreRef>,
        /// Stores fetched concurrently per batch; 0 fetches all at once.
        /// Overrides `DISPO_SPECIALS_BATCH_SIZE`.
        #[arg(long)]
        batch_size: Option<usize>,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

fn parse_store_ref(raw: &str) -> Result<StoreRef, String> {
    let (id, name) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ID=NAME, got \"{raw}\""))?;
    let (id, name) = (id.trim(), name.trim());
    if id.is_empty() {
        return Err(format!("store id is empty in \"{raw}\""));
    }
    let name = if name.is_empty() { id } else { name };
    Ok(StoreRef::new(id, name))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = dispo_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(?config, "loaded configuration");

    let client = DutchieClient::new(ClientConfig::from_app_config(&config))?;
    let cache: Arc<dyn KvStore> = if config.cache_enabled {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(NoopStore)
    };
    let aggregator = SpecialsAggregator::new(client)
        .with_cache(cache)
        .with_ttl_secs(config.cache_ttl_secs);

    match cli.command {
        Commands::Stores { json } => {
            let stores = aggregator.fetch_store_list().await;
            render::print_stores(&stores, json)?;
        }
        Commands::Specials {
            stores,
            batch_size,
            json,
        } => {
            let stores = if stores.is_empty() {
                aggregator
                    .fetch_store_list()
                    .await
                    .iter()
                    .map(StoreRef::from)
                    .collect()
            } else {
                stores
            };

            let batch_size = batch_size.unwrap_or(config.specials_batch_size);
            let result = if batch_size == 0 {
                aggregator.fetch_multiple_store_specials(&stores).await
            } else {
                aggregator
                    .fetch_multiple_store_specials_batched(&stores, batch_size)
                    .await
            };
            render::print_specials(&result, json)?;
        }
    }

    Ok(())
}
