//! IntelliCharge core
//!
//! Distance math, mock station generation, pricing, battery range estimation
//! and the booking store shared by every IntelliCharge front end.

pub mod battery;
pub mod booking;
pub mod config;
pub mod generator;
pub mod geo;
mod models;
pub mod pricing;
pub mod store;

pub use crate::models::*;

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BookingError {
    #[error("Missing required booking field: {field}")]
    MissingField { field: &'static str },
    #[error("No station selected for booking")]
    NoStationSelected,
    #[error("Station {station_id} not found")]
    StationNotFound { station_id: u32 },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Storage serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid battery.{field}: expected {expected}, got {value}")]
    InvalidBattery {
        field: &'static str,
        expected: &'static str,
        value: f64,
    },
}
