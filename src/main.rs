use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use allergy_core::config::{parse_bool_env_value, parse_u64_env_value};
use allergy_core::{
    CoreConfig, DEFAULT_CACHE_TTL, DEFAULT_DATA_FILE, DEFAULT_OTHER_THRESHOLD, DataMode,
};
use api_rest::{AppState, build_router};

/// Main entry point for the allergy insights server
///
/// Resolves configuration from the environment once, then serves the pages and JSON API.
///
/// # Environment Variables
/// - `ALLERGY_REST_ADDR`: server address (default: "0.0.0.0:3000")
/// - `ALLERGY_DATA_FILE`: backing bundle (default: "data_visualization/jsonResponse.json")
/// - `ALLERGY_CACHE_TTL_SECS`: cache lifetime in seconds (default: 60000)
/// - `ALLERGY_OTHER_THRESHOLD`: minimum category size before pooling into "Other" (default: 5)
/// - `ALLERGY_CORRECT_CATEGORIES`: re-file known allergens on load (default: true)
/// - `ALLERGY_USE_SAMPLE_DATA`: serve the built-in sample bundle from memory (default: false)
///
/// # Errors
/// Returns an error if:
/// - a configuration value cannot be parsed or is out of range,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("allergy_run=info".parse()?)
                .add_directive("allergy_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("ALLERGY_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let cfg = Arc::new(config_from_env()?);

    match cfg.data_mode() {
        DataMode::File => tracing::info!("-- Using bundle file {}", cfg.data_file().display()),
        DataMode::Sample => tracing::info!("-- Using built-in sample data"),
    }
    tracing::info!(
        "-- Other threshold {}, cache TTL {}s, category correction {}",
        cfg.other_threshold(),
        cfg.cache_ttl().as_secs(),
        if cfg.correct_categories() { "on" } else { "off" }
    );
    tracing::info!("++ Starting allergy insights on {}", addr);

    let app = build_router(AppState::from_config(cfg));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn config_from_env() -> anyhow::Result<CoreConfig> {
    let data_file = std::env::var("ALLERGY_DATA_FILE")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DATA_FILE.into());

    let cache_ttl_secs = parse_u64_env_value(
        "ALLERGY_CACHE_TTL_SECS",
        std::env::var("ALLERGY_CACHE_TTL_SECS").ok(),
        DEFAULT_CACHE_TTL.as_secs(),
    )?;
    let other_threshold = parse_u64_env_value(
        "ALLERGY_OTHER_THRESHOLD",
        std::env::var("ALLERGY_OTHER_THRESHOLD").ok(),
        DEFAULT_OTHER_THRESHOLD as u64,
    )?;
    let correct_categories = parse_bool_env_value(
        "ALLERGY_CORRECT_CATEGORIES",
        std::env::var("ALLERGY_CORRECT_CATEGORIES").ok(),
        true,
    )?;
    let use_sample_data = parse_bool_env_value(
        "ALLERGY_USE_SAMPLE_DATA",
        std::env::var("ALLERGY_USE_SAMPLE_DATA").ok(),
        false,
    )?;

    let data_mode = if use_sample_data {
        DataMode::Sample
    } else {
        DataMode::File
    };

    Ok(CoreConfig::new(
        PathBuf::from(data_file),
        Duration::from_secs(cache_ttl_secs),
        usize::try_from(other_threshold)?,
        correct_categories,
        data_mode,
    )?)
}
