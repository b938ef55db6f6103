use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use intellicharge_core::battery::RangeWarning;
use intellicharge_core::{Coordinate, Station, StationFilter, StationStats};
use intellicharge_engine::{Action, Effect};
use serde::{Deserialize, Serialize};

use crate::{SharedEngine, error_message, error_response, lock};

#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StationsQuery {
    pub filter: Option<String>,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LoadStationsRequest {
    /// Position reported by the coordinate source, if any
    pub origin: Option<Coordinate>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationsResponse {
    pub origin: Option<Coordinate>,
    pub stations: Vec<Station>,
    pub stats: StationStats,
    pub range_warning: Option<RangeWarning>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRequest {
    pub filter: StationFilter,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationDetails {
    pub station: Station,
    pub label: String,
    pub power: String,
    pub connectors: String,
}

impl From<Station> for StationDetails {
    fn from(station: Station) -> Self {
        StationDetails {
            label: station.station_type.label().into(),
            power: station.station_type.power_rating().into(),
            connectors: station.station_type.connectors().into(),
            station,
        }
    }
}

/// List the current stations, optionally narrowed by `?filter=`
pub async fn list_stations(
    State(engine): State<SharedEngine>,
    Query(query): Query<StationsQuery>,
) -> impl IntoResponse {
    let engine = lock(&engine);
    let filter = match query.filter.as_deref() {
        None => engine.state().active_filter,
        Some(name) => match StationFilter::from_name(name) {
            Some(filter) => filter,
            None => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Unknown station filter '{name}'"),
                )
                .into_response();
            }
        },
    };
    Json(filter.apply(&engine.state().stations)).into_response()
}

/// Regenerate stations around the given origin
pub async fn load_stations(
    State(engine): State<SharedEngine>,
    Json(payload): Json<LoadStationsRequest>,
) -> Json<StationsResponse> {
    tracing::info!("Loading stations around {:?}", payload.origin);
    let mut engine = lock(&engine);
    engine.dispatch(Action::LoadStations {
        origin: payload.origin,
    });

    let state = engine.state();
    Json(StationsResponse {
        origin: state.origin,
        stations: state.visible_stations(),
        stats: state.stats(),
        range_warning: state.range_warning(),
    })
}

/// Change the active station filter
pub async fn change_filter(
    State(engine): State<SharedEngine>,
    Json(payload): Json<FilterRequest>,
) -> impl IntoResponse {
    let mut engine = lock(&engine);
    let effects = engine.dispatch(Action::ChangeFilter(payload.filter));
    let stations = effects
        .into_iter()
        .find_map(|effect| match effect {
            Effect::RenderStations(stations) => Some(stations),
            _ => None,
        })
        .unwrap_or_default();
    Json(stations)
}

pub async fn get_stats(State(engine): State<SharedEngine>) -> Json<StationStats> {
    let engine = lock(&engine);
    Json(engine.state().stats())
}

/// Select a station and return its details
pub async fn get_station(
    State(engine): State<SharedEngine>,
    Path(station_id): Path<u32>,
) -> impl IntoResponse {
    let mut engine = lock(&engine);
    let effects = engine.dispatch(Action::SelectStation(station_id));
    let details = effects.iter().find_map(|effect| match effect {
        Effect::ShowStationDetails(station) => Some(station.clone()),
        _ => None,
    });
    match details {
        Some(station) => (StatusCode::OK, Json(StationDetails::from(station))).into_response(),
        None => error_response(
            StatusCode::NOT_FOUND,
            error_message(&effects).unwrap_or_else(|| format!("Station {station_id} not found")),
        )
        .into_response(),
    }
}
