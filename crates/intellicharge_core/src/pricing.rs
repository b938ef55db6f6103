//! Booking price computation.
//!
//! Two independent models exist and are deliberately kept apart:
//! the hourly-rate [`quote`] used once a station is chosen, and the
//! energy based [`estimate_energy_cost`] used on the station handoff page.

use crate::{BookingQuote, StationType};

/// Flat fee added to any booking with a non-zero charging cost.
pub const SERVICE_FEE: f64 = 2.50;
/// Hourly rate applied to station types without a dedicated rate.
pub const DEFAULT_HOURLY_RATE: f64 = 0.30;
/// Average charging power assumed by the energy estimate.
pub const ASSUMED_POWER_KW: f64 = 7.0;

impl StationType {
    pub fn hourly_rate(&self) -> f64 {
        match self {
            StationType::Fast => 0.45,
            StationType::Normal => 0.25,
            StationType::Free => 0.0,
        }
    }
}

/// Hourly rate for a station type, `None` meaning an unrecognised type.
pub fn hourly_rate(station_type: Option<StationType>) -> f64 {
    station_type.map_or(DEFAULT_HOURLY_RATE, |station_type| {
        station_type.hourly_rate()
    })
}

/// Quote a booking from the station's hourly rate.
///
/// Missing or non-positive durations quote zero.
pub fn quote(station_type: Option<StationType>, duration_minutes: Option<i64>) -> BookingQuote {
    let duration_minutes = positive_minutes(duration_minutes);
    let charging_cost = hourly_rate(station_type) * duration_minutes / 60.0;
    let service_fee = if charging_cost > 0.0 { SERVICE_FEE } else { 0.0 };
    let quote = BookingQuote {
        charging_cost,
        service_fee,
        total: charging_cost + service_fee,
    };
    tracing::debug!(?station_type, duration_minutes, ?quote, "Computed booking quote");
    quote
}

/// Energy based estimate: `7 kW * hours * price per kWh`.
pub fn estimate_energy_cost(price_per_kwh: f64, duration_minutes: Option<i64>) -> f64 {
    let price_per_kwh = if price_per_kwh.is_finite() {
        price_per_kwh
    } else {
        0.0
    };
    let energy_kwh = ASSUMED_POWER_KW * positive_minutes(duration_minutes) / 60.0;
    energy_kwh * price_per_kwh
}

fn positive_minutes(duration_minutes: Option<i64>) -> f64 {
    duration_minutes.filter(|minutes| *minutes > 0).unwrap_or(0) as f64
}

/// Extracts the first decimal number of a price label such as `"$0.35/kWh"`.
/// Labels without any digits, like `"Free"`, parse as 0.
pub fn parse_price_label(text: &str) -> f64 {
    let bytes = text.as_bytes();
    let Some(start) = bytes.iter().position(u8::is_ascii_digit) else {
        return 0.0;
    };

    let mut end = start;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end + 1 < bytes.len() && bytes[end] == b'.' && bytes[end + 1].is_ascii_digit() {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }

    text[start..end].parse().unwrap_or(0.0)
}

/// Parses a leading integer the way form inputs are read: surrounding
/// whitespace and trailing garbage are ignored, no digits means `None`.
pub fn parse_duration(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|value| sign * value)
}

pub fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

pub fn format_currency(amount: f64) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    format!("${:.2}", round_to_cents(amount))
}
