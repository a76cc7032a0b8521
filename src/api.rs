use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;
use crate::events::Order;
use crate::orchestrator::LiveOrderService;
use crate::rest::OrdersApi;
use crate::session::SessionProvider;
use crate::urgency::{self, UrgencyLevel};

pub struct AppState {
    pub service: Arc<LiveOrderService>,
    pub session: Arc<dyn SessionProvider>,
    pub orders: OrdersApi,
    pub config: AppConfig,
}

pub async fn run_server(state: Arc<AppState>) {
    let bind_addr = state.config.bind_addr.clone();
    let app = Router::new()
        .route("/health", get(health))
        .route("/status", get(get_status))
        .route("/connection/toggle", post(toggle_connection))
        .route("/connection/enabled", post(set_enabled))
        .route("/send", post(send_message))
        .route("/orders", get(get_orders))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await.unwrap();
    info!("Dashboard API listening on {}", bind_addr);
    axum::serve(listener, app).await.unwrap();
}

async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

async fn get_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.service.status())
}

async fn toggle_connection(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.service.toggle_connection().await;
    Json(state.service.status())
}

#[derive(serde::Deserialize)]
struct EnabledBody {
    enabled: bool,
}

async fn set_enabled(
    State(state): State<Arc<AppState>>,
    Json(body): Json<EnabledBody>,
) -> impl IntoResponse {
    match state.service.set_enabled(body.enabled) {
        Ok(()) => Json(state.service.status()).into_response(),
        Err(e) => (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to persist preference: {e}"),
        )
            .into_response(),
    }
}

async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let sent = state.service.send_message(&body);
    Json(json!({"sent": sent}))
}

/// Order annotated with the staff-facing triage projections. Derived per
/// request, never stored.
#[derive(serde::Serialize)]
struct TriagedOrder {
    #[serde(flatten)]
    order: Order,
    urgency: UrgencyLevel,
    is_late: bool,
}

/// Authoritative read path: the venue's active orders with urgency and
/// lateness computed at response time.
async fn get_orders(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let identity = match state.session.current_identity().await {
        Some(id) if id.is_complete() => id,
        _ => {
            return (
                axum::http::StatusCode::UNAUTHORIZED,
                "No authenticated venue session",
            )
                .into_response()
        }
    };

    match state.orders.fetch_active_orders(&identity).await {
        Ok(orders) => {
            let cfg = &state.config.urgency;
            let triaged: Vec<TriagedOrder> = orders
                .into_iter()
                .map(|order| TriagedOrder {
                    urgency: urgency::classify_order(&order, cfg),
                    is_late: urgency::is_order_late(&order, cfg),
                    order,
                })
                .collect();
            Json(triaged).into_response()
        }
        Err(e) => (
            axum::http::StatusCode::BAD_GATEWAY,
            format!("Failed to fetch orders: {e}"),
        )
            .into_response(),
    }
}
