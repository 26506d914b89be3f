//! ids-enrich - Batch CLI
//!
//! Usage: `ids-enrich <batch.json>`
//! Reads a JSON array of traffic records, runs the pipeline and prints the
//! result as JSON on stdout.

use std::path::PathBuf;

use anyhow::{bail, Context};

use ids_enrich::constants::{APP_NAME, APP_VERSION};
use ids_enrich::logic::features::load_records;
use ids_enrich::{Config, Pipeline};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    let Some(path) = std::env::args().nth(1).map(PathBuf::from) else {
        bail!("usage: {} <batch.json>", APP_NAME);
    };

    log::info!("Starting {} v{}...", APP_NAME, APP_VERSION);

    let config = Config::from_env();
    let records = load_records(&path)
        .with_context(|| format!("failed to load batch {}", path.display()))?;

    let pipeline = Pipeline::from_config(&config);
    let result = pipeline.run(&records).await;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
