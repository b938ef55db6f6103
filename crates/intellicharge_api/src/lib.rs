//! IntelliCharge API Library
//!
//! HTTP surface through which the dashboard UI drives the IntelliCharge engine.

mod battery;
mod booking;
mod station;

use axum::{
    Json, Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use intellicharge_core::store::Storage;
use intellicharge_engine::{Effect, Engine, NotificationLevel};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tower_http::trace::TraceLayer;

pub type DynEngine = Engine<Box<dyn Storage + Send>>;
pub type SharedEngine = Arc<Mutex<DynEngine>>;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
}

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> impl IntoResponse {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// First error notification among the effects, if any.
pub(crate) fn error_message(effects: &[Effect]) -> Option<String> {
    effects.iter().find_map(|effect| match effect {
        Effect::Notify {
            level: NotificationLevel::Error,
            message,
        } => Some(message.clone()),
        _ => None,
    })
}

pub(crate) fn lock(engine: &SharedEngine) -> MutexGuard<'_, DynEngine> {
    engine.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}

/// Create the application router with all endpoints
pub fn create_app(engine: DynEngine) -> Router {
    let shared_engine = Arc::new(Mutex::new(engine));
    Router::new()
        .route("/health", get(health_check))
        .route("/stations", get(station::list_stations))
        .route("/stations/load", post(station::load_stations))
        .route("/stations/filter", put(station::change_filter))
        .route("/stations/stats", get(station::get_stats))
        .route("/stations/{station_id}", get(station::get_station))
        .route("/quote", get(booking::get_quote))
        .route("/estimate", get(booking::get_estimate))
        .route(
            "/bookings",
            get(booking::list_bookings).post(booking::create_booking),
        )
        .route("/battery", get(battery::get_battery))
        .route("/battery/drain", post(battery::drain))
        .route("/battery/charge", post(battery::charge))
        .route("/battery/efficiency", post(battery::set_efficiency))
        .layer(TraceLayer::new_for_http())
        .with_state(shared_engine)
}

#[cfg(test)]
pub(crate) mod test_support {
    use intellicharge_core::config::DemoConfig;
    use intellicharge_core::store::MemoryStorage;
    use intellicharge_engine::Action;

    use super::*;

    /// Engine with a seeded station set around the default location.
    pub fn loaded_engine() -> DynEngine {
        let storage: Box<dyn Storage + Send> = Box::new(MemoryStorage::new());
        let mut engine = Engine::new(DemoConfig::default(), storage, Some(42));
        engine.dispatch(Action::LoadStations { origin: None });
        engine
    }

    pub fn shared(engine: DynEngine) -> SharedEngine {
        Arc::new(Mutex::new(engine))
    }
}
