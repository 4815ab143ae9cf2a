//! chanserv - Slack channel moderation bot.

use chanserv::config::{Config, validate};
use chanserv::db::Database;
use chanserv::handlers::Bot;
use chanserv::http::{AppState, run_http_server};
use chanserv::metrics;
use chanserv::platform::SlackClient;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        return Err(anyhow::anyhow!(
            "configuration has {} problem(s), see errors above",
            errors.len()
        ));
    }

    info!(
        bot = %config.bot.name,
        workspace = %config.bot.workspace_domain,
        "Starting chanserv"
    );

    metrics::init();

    let db = Database::new(&config.database.path).await?;
    let platform = Arc::new(SlackClient::new(&config.slack)?);

    let bot = Arc::new(Bot::new(db, platform, config.bot.clone()));
    let commands = bot.initialize();
    info!(count = commands.len(), "Commands registered");

    let state = AppState {
        bot,
        signing_secret: Arc::from(config.slack.signing_secret.as_str()),
    };

    tokio::select! {
        result = run_http_server(config.http.address, state) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown requested");
        }
    }

    info!("Chanserv stopped");
    Ok(())
}
