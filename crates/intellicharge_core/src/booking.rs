//! Booking confirmation: turning a draft into an immutable [`Booking`].

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pricing::{self, parse_price_label, round_to_cents};
use crate::{Booking, BookingError, BookingQuote, BookingStatus, Station, StationType, VehicleType};

/// `YYYY-MM-DDTHH:MM`, the shape of a local date-time form input.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Minutes between now and the suggested booking start.
pub const DEFAULT_SLOT_LEAD_MINUTES: i64 = 30;

/// How a draft is priced. The two models are not reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "model")]
pub enum PricingModel {
    /// Station hourly rate plus service fee; `None` is an unrecognised type.
    Hourly { station_type: Option<StationType> },
    /// Assumed 7 kW charge priced per kWh.
    Energy { price_per_kwh: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDraft {
    pub station_id: Option<u32>,
    pub station_name: String,
    pub pricing: PricingModel,
    pub date_time: Option<String>,
    pub duration_minutes: Option<i64>,
    pub vehicle: Option<VehicleType>,
}

impl BookingDraft {
    /// Draft for a station picked on the map, starting at the default slot.
    pub fn for_station(station: &Station, now: NaiveDateTime) -> Self {
        BookingDraft {
            station_id: Some(station.id),
            station_name: station.name.clone(),
            pricing: PricingModel::Hourly {
                station_type: Some(station.station_type),
            },
            date_time: Some(default_slot(now)),
            duration_minutes: None,
            vehicle: None,
        }
    }

    /// Current quote for the draft.
    ///
    /// The hourly model quotes zero until a duration and a vehicle are both
    /// chosen. The energy model has no service fee.
    pub fn quote(&self) -> BookingQuote {
        match self.pricing {
            PricingModel::Hourly { station_type } => {
                if self.vehicle.is_none() {
                    return BookingQuote::default();
                }
                pricing::quote(station_type, self.duration_minutes)
            }
            PricingModel::Energy { price_per_kwh } => {
                let cost = pricing::estimate_energy_cost(price_per_kwh, self.duration_minutes);
                BookingQuote {
                    charging_cost: cost,
                    service_fee: 0.0,
                    total: cost,
                }
            }
        }
    }

    /// Start and end of the charging window, when the start parses.
    pub fn window(&self) -> Option<BookingWindow> {
        booking_window(
            self.date_time.as_deref()?,
            self.duration_minutes.unwrap_or(0),
        )
    }

    /// Validates the draft and snapshots its price into a confirmed booking.
    ///
    /// `last_id` is the id of the most recent stored booking, used to keep
    /// ids strictly increasing.
    pub fn confirm(
        &self,
        now: DateTime<Utc>,
        last_id: Option<&str>,
    ) -> Result<Booking, BookingError> {
        let date_time = self
            .date_time
            .as_deref()
            .map(str::trim)
            .filter(|date_time| !date_time.is_empty())
            .ok_or(BookingError::MissingField { field: "dateTime" })?;
        let duration_minutes = self
            .duration_minutes
            .filter(|minutes| *minutes > 0)
            .and_then(|minutes| u32::try_from(minutes).ok())
            .ok_or(BookingError::MissingField { field: "duration" })?;
        let vehicle_type = self
            .vehicle
            .ok_or(BookingError::MissingField { field: "vehicle" })?;

        Ok(Booking {
            id: next_booking_id(now, last_id),
            station_id: self.station_id,
            station_name: self.station_name.clone(),
            date_time: date_time.to_string(),
            duration_minutes,
            vehicle_type,
            status: BookingStatus::Confirmed,
            price: round_to_cents(self.quote().total),
            created_at: now,
        })
    }
}

/// Booking id from the creation time in epoch milliseconds, bumped past
/// `last_id` when that one is not older.
pub fn next_booking_id(now: DateTime<Utc>, last_id: Option<&str>) -> String {
    let millis = now.timestamp_millis();
    let previous = last_id.and_then(|id| id.parse::<i64>().ok());
    match previous {
        Some(previous) if previous >= millis => previous
            .checked_add(1)
            .unwrap_or(millis)
            .to_string(),
        _ => millis.to_string(),
    }
}

/// Suggested booking start: now plus [`DEFAULT_SLOT_LEAD_MINUTES`].
pub fn default_slot(now: NaiveDateTime) -> String {
    (now + Duration::minutes(DEFAULT_SLOT_LEAD_MINUTES))
        .format(DATE_TIME_FORMAT)
        .to_string()
}

/// Charging slot shown in the booking summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// `None` when the start does not parse or the end falls outside the
/// representable range.
pub fn booking_window(date_time: &str, duration_minutes: i64) -> Option<BookingWindow> {
    let start = NaiveDateTime::parse_from_str(date_time.trim(), DATE_TIME_FORMAT).ok()?;
    let end = start.checked_add_signed(Duration::try_minutes(duration_minutes.max(0))?)?;
    Some(BookingWindow { start, end })
}

/// Parameters handed over by the station list when opening the booking page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handoff {
    pub station: Option<String>,
    pub price: Option<String>,
    #[serde(rename = "type")]
    pub station_type: Option<String>,
}

impl Handoff {
    pub const DEFAULT_STATION_NAME: &'static str = "Selected Station";
    pub const DEFAULT_PRICE: &'static str = "0.35";

    pub fn station_name(&self) -> &str {
        self.station
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(Self::DEFAULT_STATION_NAME)
    }

    pub fn badge(&self) -> &str {
        self.station_type
            .as_deref()
            .filter(|station_type| !station_type.is_empty())
            .unwrap_or("Station")
    }

    pub fn price_per_kwh(&self) -> f64 {
        let label = self
            .price
            .as_deref()
            .filter(|price| !price.is_empty())
            .unwrap_or(Self::DEFAULT_PRICE);
        parse_price_label(label)
    }

    /// Draft priced with the energy model, starting at the default slot.
    pub fn draft(&self, now: NaiveDateTime) -> BookingDraft {
        BookingDraft {
            station_id: None,
            station_name: self.station_name().to_string(),
            pricing: PricingModel::Energy {
                price_per_kwh: self.price_per_kwh(),
            },
            date_time: Some(default_slot(now)),
            duration_minutes: None,
            vehicle: None,
        }
    }
}
