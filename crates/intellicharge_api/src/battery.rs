use axum::{Json, extract::State};
use intellicharge_core::battery::{BatteryReport, RangeWarning};
use intellicharge_engine::{Action, AppState};
use serde::{Deserialize, Serialize};

use crate::{SharedEngine, lock};

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatteryResponse {
    pub battery: BatteryReport,
    pub range_warning: Option<RangeWarning>,
    /// Human readable form of `range_warning`
    pub warning_message: Option<String>,
}

impl From<&AppState> for BatteryResponse {
    fn from(state: &AppState) -> Self {
        let range_warning = state.range_warning();
        BatteryResponse {
            battery: state.battery.report(),
            warning_message: range_warning.as_ref().map(ToString::to_string),
            range_warning,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EfficiencyRequest {
    pub mode: String,
}

pub async fn get_battery(State(engine): State<SharedEngine>) -> Json<BatteryResponse> {
    let engine = lock(&engine);
    Json(BatteryResponse::from(engine.state()))
}

/// Drain one percent of charge
pub async fn drain(State(engine): State<SharedEngine>) -> Json<BatteryResponse> {
    battery_action(&engine, Action::DrainBattery)
}

/// Add one percent of charge
pub async fn charge(State(engine): State<SharedEngine>) -> Json<BatteryResponse> {
    battery_action(&engine, Action::ChargeBattery)
}

/// Switch the driving mode; unknown modes reset to the default efficiency
pub async fn set_efficiency(
    State(engine): State<SharedEngine>,
    Json(payload): Json<EfficiencyRequest>,
) -> Json<BatteryResponse> {
    battery_action(&engine, Action::SetEfficiencyMode(payload.mode))
}

fn battery_action(engine: &SharedEngine, action: Action) -> Json<BatteryResponse> {
    let mut engine = lock(engine);
    engine.dispatch(action);
    Json(BatteryResponse::from(engine.state()))
}
