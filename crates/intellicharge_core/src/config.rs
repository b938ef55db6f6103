use serde::{Deserialize, Serialize};

use crate::battery::BatteryState;
use crate::generator::{AddressPool, StationTemplate};
use crate::{ConfigError, Coordinate, StationType};

pub const DEFAULT_STORAGE_KEY: &str = "intellicharge_bookings";

/// Demo dashboard configuration. Every section falls back to its defaults
/// when absent from the JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DemoConfig {
    pub app: AppConfig,
    pub mock_data: MockDataConfig,
    pub battery: BatteryState,
    pub storage: StorageConfig,
}

impl DemoConfig {
    /// Rejects battery settings the range model cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let battery = &self.battery;
        let checks = [
            ("capacityKwh", "> 0", battery.capacity_kwh, battery.capacity_kwh > 0.0),
            (
                "percentage",
                "between 0 and 100",
                battery.percentage,
                (0.0..=100.0).contains(&battery.percentage),
            ),
            (
                "efficiencyKmPerKwh",
                "> 0",
                battery.efficiency_km_per_kwh,
                battery.efficiency_km_per_kwh > 0.0,
            ),
            (
                "reserveBufferKm",
                ">= 0",
                battery.reserve_buffer_km,
                battery.reserve_buffer_km >= 0.0,
            ),
        ];

        for (field, expected, value, valid) in checks {
            if !valid || !value.is_finite() {
                return Err(ConfigError::InvalidBattery {
                    field,
                    expected,
                    value,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub name: String,
    pub default_location: Coordinate,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            name: "IntelliCharge".into(),
            default_location: Coordinate::DEFAULT_ORIGIN,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MockDataConfig {
    /// Station placement radius in degrees (0.05 is roughly 5 km)
    pub radius: f64,
    pub station_count: usize,
    pub addresses: AddressPool,
    pub catalog: Vec<StationTemplate>,
}

const STATION_NAMES: [&str; 14] = [
    "Downtown EV Hub",
    "Central Station",
    "Green Energy Point",
    "EcoCharge Station",
    "Power Plaza",
    "Electric Avenue",
    "Charge Central",
    "EV Oasis",
    "Power Point",
    "Green Station",
    "Eco Hub",
    "Charge Zone",
    "Power Station",
    "Electric Hub",
];

const CATALOG: [(StationType, &str); 10] = [
    (StationType::Fast, "$0.35/kWh"),
    (StationType::Fast, "$0.43/kWh"),
    (StationType::Normal, "$0.28/kWh"),
    (StationType::Normal, "$0.32/kWh"),
    (StationType::Free, "Free"),
    (StationType::Fast, "$0.38/kWh"),
    (StationType::Normal, "$0.25/kWh"),
    (StationType::Free, "Free"),
    (StationType::Fast, "$0.40/kWh"),
    (StationType::Normal, "$0.30/kWh"),
];

impl Default for MockDataConfig {
    fn default() -> Self {
        let names: Vec<String> = STATION_NAMES.iter().map(|name| name.to_string()).collect();
        MockDataConfig {
            radius: 0.05,
            station_count: 10,
            addresses: AddressPool::default(),
            catalog: CATALOG
                .iter()
                .map(|(station_type, price_label)| StationTemplate {
                    station_type: *station_type,
                    name_pool: names.clone(),
                    price_label: price_label.to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageConfig {
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            key: DEFAULT_STORAGE_KEY.into(),
        }
    }
}
