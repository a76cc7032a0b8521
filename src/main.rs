mod api;
mod config;
mod constants;
mod dispatcher;
mod error;
mod events;
mod orchestrator;
mod prefs;
mod push;
mod rest;
mod session;
mod urgency;

use std::sync::Arc;

use api::{run_server, AppState};
use config::AppConfig;
use orchestrator::LiveOrderService;
use rest::OrdersApi;
use session::{EnvSession, SessionProvider};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();

    // Setup Logging
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting ordercast...");

    // Load Configuration
    let config = AppConfig::load();
    info!("Loaded Configuration: {:?}", config);

    let session: Arc<dyn SessionProvider> = Arc::new(EnvSession::new(
        config.venue_id.clone(),
        config.token_env_var.clone(),
    ));

    let service = Arc::new(LiveOrderService::new(&config, session.clone())?);
    let orders = OrdersApi::new(config.api.base_url.clone())?;

    // Open the push channel when the session and preference allow it.
    service.start().await;

    let app_state = Arc::new(AppState {
        service,
        session,
        orders,
        config,
    });

    info!("Initializing Dashboard API...");
    run_server(app_state).await;

    Ok(())
}
