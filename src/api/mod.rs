//! HTTP surface.

use axum::{
    routing::{get, patch, put},
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod actor;
pub mod dto;
pub mod error;
pub mod orders;
pub mod returns;
pub mod warehouses;

use crate::publisher::EventPublisher;
use crate::services::Services;
use crate::store::Repositories;

#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub repos: Repositories,
}

impl AppState {
    pub fn new(repos: Repositories, publisher: EventPublisher) -> Self {
        Self { services: Services::new(repos.clone(), publisher), repos }
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/orders", get(orders::list_orders).post(orders::place_order))
        .route("/orders/allocate-warehouse/:id", put(orders::allocate_warehouse))
        .route("/orders/:id", get(orders::get_order).delete(orders::delete_order))
        .route("/orders/:id/status", patch(orders::update_status))
        .route("/orders/:id/deliver", patch(orders::mark_delivered))
        .route("/returns", get(returns::list_returns).post(returns::open_return))
        .route("/returns/:id", get(returns::get_return))
        .route("/returns/:id/status", patch(returns::update_status))
        .route("/returns/:id/refund", patch(returns::set_refund_status))
        .route("/returns/:id/complete", patch(returns::mark_complete))
        .route("/returns/:id/pickup", patch(returns::update_pickup))
        .route("/warehouses", get(warehouses::list_warehouses))
        .route("/warehouses/:id", get(warehouses::get_warehouse));

    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "opensase-fulfillment"})) }))
        .nest("/api/v1", api)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()))
        .with_state(state)
}
