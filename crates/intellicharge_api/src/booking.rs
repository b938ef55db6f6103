use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use intellicharge_core::booking::Handoff;
use intellicharge_core::pricing::{self, format_currency, parse_duration};
use intellicharge_core::{Booking, BookingError, BookingQuote, StationType, VehicleType};
use intellicharge_engine::{Action, Effect};
use serde::{Deserialize, Serialize};

use crate::{SharedEngine, error_message, error_response, lock};

/// Raw form values; unparseable numbers count as missing.
#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct QuoteQuery {
    #[serde(rename = "type")]
    pub station_type: Option<String>,
    pub duration: Option<String>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    #[serde(flatten)]
    pub quote: BookingQuote,
    pub formatted_total: String,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EstimateQuery {
    pub station: Option<String>,
    pub price: Option<String>,
    #[serde(rename = "type")]
    pub station_type: Option<String>,
    pub duration: Option<String>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateResponse {
    pub station_name: String,
    pub badge: String,
    pub price_per_kwh: f64,
    pub estimated_cost: f64,
    pub formatted_cost: String,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    /// Station picked on the map
    pub station_id: Option<u32>,
    /// Parameters from the station handoff page, used when no station id is given
    pub handoff: Option<Handoff>,
    pub date_time: Option<String>,
    pub duration: Option<i64>,
    pub vehicle: Option<String>,
}

fn vehicle_from_form(value: Option<&str>) -> Option<VehicleType> {
    let value = value.map(str::trim).filter(|value| !value.is_empty())?;
    Some(VehicleType::from_name(&value.to_lowercase()).unwrap_or(VehicleType::Other))
}

/// Hourly-rate quote for a station type and duration
pub async fn get_quote(Query(query): Query<QuoteQuery>) -> Json<QuoteResponse> {
    let station_type = query.station_type.as_deref().and_then(StationType::from_name);
    let duration = query.duration.as_deref().and_then(parse_duration);
    let quote = pricing::quote(station_type, duration);
    Json(QuoteResponse {
        formatted_total: format_currency(quote.total),
        quote,
    })
}

/// Energy-model estimate for the station handoff page
pub async fn get_estimate(Query(query): Query<EstimateQuery>) -> Json<EstimateResponse> {
    let handoff = Handoff {
        station: query.station,
        price: query.price,
        station_type: query.station_type,
    };
    let price_per_kwh = handoff.price_per_kwh();
    let estimated_cost = pricing::estimate_energy_cost(
        price_per_kwh,
        query.duration.as_deref().and_then(parse_duration),
    );
    Json(EstimateResponse {
        station_name: handoff.station_name().to_string(),
        badge: handoff.badge().to_string(),
        price_per_kwh,
        estimated_cost,
        formatted_cost: format_currency(estimated_cost),
    })
}

pub async fn list_bookings(State(engine): State<SharedEngine>) -> Json<Vec<Booking>> {
    let engine = lock(&engine);
    Json(engine.bookings())
}

/// Open the booking form, fill it in and confirm it in one step
pub async fn create_booking(
    State(engine): State<SharedEngine>,
    Json(payload): Json<CreateBookingRequest>,
) -> impl IntoResponse {
    let mut engine = lock(&engine);

    let open = match (payload.station_id, payload.handoff) {
        (Some(station_id), _) => Action::OpenBooking(station_id),
        (None, Some(handoff)) => Action::OpenHandoff(handoff),
        (None, None) => {
            return error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                BookingError::NoStationSelected.to_string(),
            )
            .into_response();
        }
    };
    let effects = engine.dispatch(open);
    if let Some(message) = error_message(&effects) {
        return error_response(StatusCode::NOT_FOUND, message).into_response();
    }

    engine.dispatch(Action::UpdateBookingDraft {
        date_time: payload.date_time,
        duration_minutes: payload.duration,
        vehicle: vehicle_from_form(payload.vehicle.as_deref()),
    });

    let effects = engine.dispatch(Action::ConfirmBooking);
    let booking = effects.iter().find_map(|effect| match effect {
        Effect::PersistBooking(booking) => Some(booking.clone()),
        _ => None,
    });
    if let Some(booking) = booking {
        tracing::info!("Created booking {}", booking.id);
        return (StatusCode::CREATED, Json(booking)).into_response();
    }

    // The form stays open on failure; a new request starts from scratch.
    engine.dispatch(Action::CancelBooking);
    let persist_failed = effects
        .iter()
        .any(|effect| matches!(effect, Effect::PersistFailed(_)));
    let status = if persist_failed {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    error_response(status, error_message(&effects).unwrap_or_default()).into_response()
}
