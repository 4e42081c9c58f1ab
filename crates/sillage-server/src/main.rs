use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sillage_core::model::CompletionModel;
use sillage_llm::factory::create_completion_model;
use sillage_server::config::ServerConfig;
use sillage_server::search::TavilySearchClient;
use sillage_server::state::AppState;

const SWEEP_INTERVAL: Duration = Duration::from_secs(3600);

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sillage_server=info".into()),
        )
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "configuration error, refusing to start");
            std::process::exit(1);
        }
    };
    tracing::info!(provider = %config.provider, model = %config.model_id, "configuration loaded");

    let model: Arc<dyn CompletionModel> = Arc::from(create_completion_model(
        &config.provider,
        config.api_key.clone(),
        config.model_id.clone(),
    ));
    let provider = Arc::new(TavilySearchClient::from_env());

    let state = AppState::new(model, provider);

    // Hourly sweep of expired task records.
    let sweep_store = state.store.clone();
    let max_age = chrono::Duration::hours(config.task_max_age_hours);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        interval.tick().await;
        loop {
            interval.tick().await;
            let removed = sweep_store.sweep(max_age);
            if removed > 0 {
                tracing::info!(removed, "swept expired tasks");
            }
        }
    });

    let app = sillage_server::app_router(state);

    let addr = config.bind_addr();
    tracing::info!("Sillage server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
