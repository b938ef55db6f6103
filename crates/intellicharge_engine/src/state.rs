use intellicharge_core::battery::{BatteryState, RangeWarning, nearest_distance_km};
use intellicharge_core::booking::BookingDraft;
use intellicharge_core::{Coordinate, Station, StationFilter, StationStats};
use serde::Serialize;

/// Everything the dashboard knows between two actions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub origin: Option<Coordinate>,
    /// Sorted by ascending distance from `origin`
    pub stations: Vec<Station>,
    pub active_filter: StationFilter,
    pub selected_station: Option<u32>,
    /// Booking form contents while the form is open
    pub draft: Option<BookingDraft>,
    pub battery: BatteryState,
}

impl AppState {
    pub fn new(battery: BatteryState) -> Self {
        AppState {
            origin: None,
            stations: Vec::new(),
            active_filter: StationFilter::All,
            selected_station: None,
            draft: None,
            battery,
        }
    }

    pub fn station(&self, station_id: u32) -> Option<&Station> {
        self.stations.iter().find(|station| station.id == station_id)
    }

    pub fn visible_stations(&self) -> Vec<Station> {
        self.active_filter.apply(&self.stations)
    }

    pub fn stats(&self) -> StationStats {
        StationStats::from_stations(&self.stations)
    }

    pub fn range_warning(&self) -> Option<RangeWarning> {
        self.battery.range_warning(nearest_distance_km(&self.stations))
    }
}
