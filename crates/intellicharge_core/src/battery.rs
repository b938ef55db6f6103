use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Station;

/// Efficiency used for unrecognised driving modes.
pub const DEFAULT_EFFICIENCY_KM_PER_KWH: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EfficiencyMode {
    City,
    Normal,
    Highway,
    Eco,
}

impl EfficiencyMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "city" => Some(EfficiencyMode::City),
            "normal" => Some(EfficiencyMode::Normal),
            "highway" => Some(EfficiencyMode::Highway),
            "eco" => Some(EfficiencyMode::Eco),
            _ => None,
        }
    }

    pub fn km_per_kwh(&self) -> f64 {
        match self {
            EfficiencyMode::City => 5.5,
            EfficiencyMode::Normal => 6.0,
            EfficiencyMode::Highway => 6.5,
            EfficiencyMode::Eco => 7.0,
        }
    }
}

/// Battery charge level classification, from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatteryStatus {
    Excellent,
    Good,
    Fair,
    Low,
    Critical,
}

impl BatteryStatus {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 80.0 {
            BatteryStatus::Excellent
        } else if percentage >= 60.0 {
            BatteryStatus::Good
        } else if percentage >= 40.0 {
            BatteryStatus::Fair
        } else if percentage >= 20.0 {
            BatteryStatus::Low
        } else {
            BatteryStatus::Critical
        }
    }
}

impl fmt::Display for BatteryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BatteryStatus::Excellent => "Excellent",
            BatteryStatus::Good => "Good",
            BatteryStatus::Fair => "Fair",
            BatteryStatus::Low => "Low",
            BatteryStatus::Critical => "Critical",
        };
        f.write_str(label)
    }
}

/// Colour band of the battery gauge ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GaugeLevel {
    Green,
    Yellow,
    Red,
}

impl GaugeLevel {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 60.0 {
            GaugeLevel::Green
        } else if percentage >= 30.0 {
            GaugeLevel::Yellow
        } else {
            GaugeLevel::Red
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeWarning {
    pub nearest_distance_km: f64,
    pub required_range_km: f64,
    pub estimated_range_km: f64,
}

impl fmt::Display for RangeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Warning: Insufficient range! Need {:.1} km, have {:.1} km",
            self.required_range_km, self.estimated_range_km
        )
    }
}

/// Snapshot of the battery for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatteryReport {
    pub percentage: f64,
    pub status: BatteryStatus,
    pub estimated_range_km: f64,
    pub capacity_kwh: f64,
    pub efficiency_km_per_kwh: f64,
    pub gauge_level: GaugeLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatteryState {
    pub capacity_kwh: f64,
    /// State of charge, 0 to 100
    pub percentage: f64,
    pub efficiency_km_per_kwh: f64,
    /// Distance kept in reserve on top of the trip to the nearest station
    pub reserve_buffer_km: f64,
}

impl Default for BatteryState {
    fn default() -> Self {
        BatteryState {
            capacity_kwh: 75.0,
            percentage: 75.0,
            efficiency_km_per_kwh: DEFAULT_EFFICIENCY_KM_PER_KWH,
            reserve_buffer_km: 10.0,
        }
    }
}

impl BatteryState {
    pub fn drain(&mut self) {
        self.percentage = (self.percentage - 1.0).max(0.0);
    }

    pub fn charge(&mut self) {
        self.percentage = (self.percentage + 1.0).min(100.0);
    }

    /// Applies the efficiency of a driving mode, falling back to
    /// [`DEFAULT_EFFICIENCY_KM_PER_KWH`] for unknown modes.
    pub fn set_efficiency_mode(&mut self, mode: &str) {
        self.efficiency_km_per_kwh = EfficiencyMode::from_name(mode)
            .map_or(DEFAULT_EFFICIENCY_KM_PER_KWH, |mode| mode.km_per_kwh());
    }

    /// `(capacity * percentage / 100) * efficiency`
    pub fn estimated_range_km(&self) -> f64 {
        let available_kwh = self.capacity_kwh * self.percentage / 100.0;
        available_kwh * self.efficiency_km_per_kwh
    }

    pub fn status(&self) -> BatteryStatus {
        BatteryStatus::from_percentage(self.percentage)
    }

    /// Returns a warning when the estimated range cannot cover the trip to
    /// the nearest station plus the reserve buffer. No station, no warning.
    pub fn range_warning(&self, nearest_distance_km: Option<f64>) -> Option<RangeWarning> {
        let nearest_distance_km = nearest_distance_km?;
        let required_range_km = nearest_distance_km + self.reserve_buffer_km;
        let estimated_range_km = self.estimated_range_km();

        (estimated_range_km < required_range_km).then_some(RangeWarning {
            nearest_distance_km,
            required_range_km,
            estimated_range_km,
        })
    }

    pub fn report(&self) -> BatteryReport {
        BatteryReport {
            percentage: self.percentage,
            status: self.status(),
            estimated_range_km: self.estimated_range_km(),
            capacity_kwh: self.capacity_kwh,
            efficiency_km_per_kwh: self.efficiency_km_per_kwh,
            gauge_level: GaugeLevel::from_percentage(self.percentage),
        }
    }
}

/// Distance to the closest station, if any.
pub fn nearest_distance_km(stations: &[Station]) -> Option<f64> {
    stations
        .iter()
        .map(|station| station.distance_km)
        .min_by(f64::total_cmp)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn battery_at(percentage: f64) -> BatteryState {
        BatteryState {
            percentage,
            ..BatteryState::default()
        }
    }

    #[test]
    fn test_estimated_range() {
        assert_abs_diff_eq!(BatteryState::default().estimated_range_km(), 337.5);
        assert_eq!(battery_at(0.0).estimated_range_km(), 0.0);
    }

    #[test]
    fn test_status_thresholds() {
        assert_eq!(battery_at(100.0).status(), BatteryStatus::Excellent);
        assert_eq!(battery_at(80.0).status(), BatteryStatus::Excellent);
        assert_eq!(battery_at(79.0).status(), BatteryStatus::Good);
        assert_eq!(battery_at(60.0).status(), BatteryStatus::Good);
        assert_eq!(battery_at(59.0).status(), BatteryStatus::Fair);
        assert_eq!(battery_at(40.0).status(), BatteryStatus::Fair);
        assert_eq!(battery_at(39.0).status(), BatteryStatus::Low);
        assert_eq!(battery_at(20.0).status(), BatteryStatus::Low);
        assert_eq!(battery_at(19.0).status(), BatteryStatus::Critical);
        assert_eq!(battery_at(0.0).status(), BatteryStatus::Critical);
        assert_eq!(BatteryStatus::Good.to_string(), "Good");
    }

    #[test]
    fn test_drain_and_charge_are_clamped() {
        let mut battery = battery_at(1.0);
        battery.drain();
        assert_eq!(battery.percentage, 0.0);
        battery.drain();
        assert_eq!(battery.percentage, 0.0);

        let mut battery = battery_at(99.0);
        battery.charge();
        assert_eq!(battery.percentage, 100.0);
        battery.charge();
        assert_eq!(battery.percentage, 100.0);
    }

    #[test]
    fn test_efficiency_modes() {
        let mut battery = BatteryState::default();
        battery.set_efficiency_mode("city");
        assert_eq!(battery.efficiency_km_per_kwh, 5.5);
        battery.set_efficiency_mode("highway");
        assert_eq!(battery.efficiency_km_per_kwh, 6.5);
        battery.set_efficiency_mode("eco");
        assert_eq!(battery.efficiency_km_per_kwh, 7.0);
        battery.set_efficiency_mode("ludicrous");
        assert_eq!(battery.efficiency_km_per_kwh, 6.0);
    }

    #[test]
    fn test_no_warning_when_range_covers_nearest_station() {
        let battery = BatteryState::default();
        assert_eq!(battery.range_warning(Some(300.0)), None);
    }

    #[test]
    fn test_warning_when_range_is_short() {
        let battery = BatteryState::default();
        let warning = battery.range_warning(Some(340.0)).expect("Expected a warning");
        assert_abs_diff_eq!(warning.required_range_km, 350.0);
        assert_abs_diff_eq!(warning.estimated_range_km, 337.5);
        assert_eq!(
            warning.to_string(),
            "Warning: Insufficient range! Need 350.0 km, have 337.5 km"
        );
    }

    #[test]
    fn test_no_warning_without_stations() {
        let battery = battery_at(0.0);
        assert_eq!(battery.range_warning(None), None);
        assert_eq!(nearest_distance_km(&[]), None);
    }

    #[test]
    fn test_gauge_levels() {
        assert_eq!(battery_at(60.0).report().gauge_level, GaugeLevel::Green);
        assert_eq!(battery_at(45.0).report().gauge_level, GaugeLevel::Yellow);
        assert_eq!(battery_at(29.0).report().gauge_level, GaugeLevel::Red);
    }
}
