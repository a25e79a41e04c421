pub mod config;
pub mod controllers;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
pub mod sessions;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use models::Venue;
use services::checkout::CheckoutClient;
use services::pricing::PriceAggregator;
use services::seat_map::SeatMap;
use sessions::SessionStore;

// Shared state для всего приложения
#[derive(Clone)]
pub struct AppState {
    pub config: config::Config,
    pub seat_map: SeatMap,
    pub pricing: PriceAggregator,
    pub sessions: SessionStore,
    pub checkout: CheckoutClient,
}

impl AppState {
    pub fn new(config: config::Config) -> Result<Arc<Self>, error::StartupError> {
        let venue = match &config.venue.layout_file {
            Some(path) => Venue::from_file(path)?,
            None => Venue::default_layout().validated()?,
        };
        info!(
            "Venue '{}' loaded: {} sections, {} seats",
            venue.name,
            venue.sections.len(),
            venue.capacity()
        );

        let checkout = CheckoutClient::from_config(&config.checkout, &config.circuit_breaker, &config.venue.currency)?;

        Ok(Arc::new(Self {
            seat_map: SeatMap::new(Arc::new(venue)),
            pricing: PriceAggregator::new(config.venue.service_fee),
            sessions: SessionStore::new(),
            checkout,
            config,
        }))
    }
}

/// Корневой роутер: пробы и `/api`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Seat Selection API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", controllers::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
