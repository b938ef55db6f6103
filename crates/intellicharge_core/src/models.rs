use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// New York City, used when no coordinate source answers.
    pub const DEFAULT_ORIGIN: Coordinate = Coordinate {
        latitude: 40.7128,
        longitude: -74.0060,
    };

    pub fn new(latitude: f64, longitude: f64) -> Self {
        Coordinate {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4},{:.4}", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StationType {
    Fast,
    Normal,
    Free,
}

impl StationType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "fast" => Some(StationType::Fast),
            "normal" => Some(StationType::Normal),
            "free" => Some(StationType::Free),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StationType::Fast => "fast",
            StationType::Normal => "normal",
            StationType::Free => "free",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StationType::Fast => "Fast Charger",
            StationType::Normal => "Normal Charger",
            StationType::Free => "Free Station",
        }
    }

    pub fn power_rating(&self) -> &'static str {
        match self {
            StationType::Fast => "150-350 kW",
            StationType::Normal | StationType::Free => "7-22 kW",
        }
    }

    pub fn connectors(&self) -> &'static str {
        match self {
            StationType::Fast => "CCS, CHAdeMO",
            StationType::Normal | StationType::Free => "Type 2, Type 1",
        }
    }
}

/// A generated charging station. Created fresh on every generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub id: u32,
    pub name: String,
    #[serde(rename = "type")]
    pub station_type: StationType,
    pub price_label: String,
    pub position: Coordinate,
    pub address: String,
    pub distance_km: f64,
    pub distance_label: String,
    pub available: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StationFilter {
    #[default]
    All,
    Fast,
    Normal,
    Free,
}

impl StationFilter {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "all" => Some(StationFilter::All),
            other => StationType::from_name(other).map(StationFilter::from),
        }
    }

    pub fn matches(&self, station: &Station) -> bool {
        match self {
            StationFilter::All => true,
            StationFilter::Fast => station.station_type == StationType::Fast,
            StationFilter::Normal => station.station_type == StationType::Normal,
            StationFilter::Free => station.station_type == StationType::Free,
        }
    }

    /// Keeps the stations matching this filter, preserving their order.
    pub fn apply(&self, stations: &[Station]) -> Vec<Station> {
        stations
            .iter()
            .filter(|station| self.matches(station))
            .cloned()
            .collect()
    }
}

impl From<StationType> for StationFilter {
    fn from(station_type: StationType) -> Self {
        match station_type {
            StationType::Fast => StationFilter::Fast,
            StationType::Normal => StationFilter::Normal,
            StationType::Free => StationFilter::Free,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationStats {
    pub total_stations: usize,
    pub fast_chargers: usize,
    pub free_stations: usize,
}

impl StationStats {
    pub fn from_stations(stations: &[Station]) -> Self {
        let count = |station_type| {
            stations
                .iter()
                .filter(|station| station.station_type == station_type)
                .count()
        };
        StationStats {
            total_stations: stations.len(),
            fast_chargers: count(StationType::Fast),
            free_stations: count(StationType::Free),
        }
    }
}

/// Price estimate for a prospective booking. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingQuote {
    pub charging_cost: f64,
    pub service_fee: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    Tesla,
    Nissan,
    Chevrolet,
    Bmw,
    Audi,
    #[serde(other)]
    Other,
}

impl VehicleType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "tesla" => Some(VehicleType::Tesla),
            "nissan" => Some(VehicleType::Nissan),
            "chevrolet" => Some(VehicleType::Chevrolet),
            "bmw" => Some(VehicleType::Bmw),
            "audi" => Some(VehicleType::Audi),
            "other" => Some(VehicleType::Other),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            VehicleType::Tesla => "Tesla",
            VehicleType::Nissan => "Nissan Leaf",
            VehicleType::Chevrolet => "Chevrolet Bolt",
            VehicleType::Bmw => "BMW i3",
            VehicleType::Audi => "Audi e-tron",
            VehicleType::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
}

/// A confirmed charging reservation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    /// Absent for bookings made through the station handoff page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station_id: Option<u32>,
    pub station_name: String,
    pub date_time: String,
    #[serde(rename = "duration")]
    pub duration_minutes: u32,
    #[serde(rename = "vehicle")]
    pub vehicle_type: VehicleType,
    pub status: BookingStatus,
    pub price: f64,
    pub created_at: DateTime<Utc>,
}
