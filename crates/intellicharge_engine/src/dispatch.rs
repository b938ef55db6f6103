use chrono::{DateTime, FixedOffset, Utc};
use intellicharge_core::battery::{BatteryReport, RangeWarning};
use intellicharge_core::booking::{BookingDraft, BookingWindow, Handoff};
use intellicharge_core::config::DemoConfig;
use intellicharge_core::generator::generate;
use intellicharge_core::{
    Booking, BookingError, BookingQuote, Coordinate, Station, StationFilter, StationStats,
    VehicleType,
};
use rand::RngCore;
use serde::Serialize;

use crate::state::AppState;

pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in all required fields";
pub const BOOKED_MESSAGE: &str = "Slot booked successfully!";

/// Everything the dashboard can ask of the core.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Regenerate stations around `origin`, or the configured default location.
    LoadStations { origin: Option<Coordinate> },
    ChangeFilter(StationFilter),
    SelectStation(u32),
    OpenBooking(u32),
    /// Open the booking form from the station handoff page.
    OpenHandoff(Handoff),
    /// Replace the booking form fields.
    UpdateBookingDraft {
        date_time: Option<String>,
        duration_minutes: Option<i64>,
        vehicle: Option<VehicleType>,
    },
    CancelBooking,
    ConfirmBooking,
    DrainBattery,
    ChargeBattery,
    SetEfficiencyMode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
}

/// Instructions for the rendering collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "data")]
pub enum Effect {
    RenderStations(Vec<Station>),
    RenderStats(StationStats),
    ShowStationDetails(Station),
    OpenBookingForm(BookingDraft),
    CloseBookingForm,
    ShowQuote(BookingQuote),
    /// Start and end of the slot; `None` until the start time parses.
    ShowBookingWindow(Option<BookingWindow>),
    PersistBooking(Booking),
    /// A booking that was confirmed but could not be stored.
    PersistFailed(Booking),
    RenderBookings(Vec<Booking>),
    RenderBattery(BatteryReport),
    RangeWarning(Option<RangeWarning>),
    Notify {
        level: NotificationLevel,
        message: String,
    },
}

impl Effect {
    fn error(message: impl Into<String>) -> Self {
        Effect::Notify {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }

    fn success(message: impl Into<String>) -> Self {
        Effect::Notify {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }
}

/// What a handler may read besides the state.
pub struct Context<'a> {
    pub config: &'a DemoConfig,
    pub rng: &'a mut dyn RngCore,
    /// Local wall clock of the user
    pub now: DateTime<FixedOffset>,
    pub last_booking_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: AppState,
    pub effects: Vec<Effect>,
}

/// Computes the next state and the side effects of one action.
///
/// The input state is never modified; persistence is left to the caller
/// through [`Effect::PersistBooking`].
pub fn reduce(state: &AppState, action: Action, ctx: &mut Context<'_>) -> Transition {
    let mut next = state.clone();
    let mut effects = Vec::new();

    match action {
        Action::LoadStations { origin } => {
            let origin = origin.unwrap_or(ctx.config.app.default_location);
            let mock = &ctx.config.mock_data;
            next.stations = generate(
                origin,
                mock.station_count,
                mock.radius,
                &mock.catalog,
                &mock.addresses,
                &mut *ctx.rng,
            );
            next.origin = Some(origin);
            next.selected_station = None;
            effects.push(Effect::RenderStations(next.visible_stations()));
            effects.push(Effect::RenderStats(next.stats()));
            effects.push(Effect::RangeWarning(next.range_warning()));
        }
        Action::ChangeFilter(filter) => {
            next.active_filter = filter;
            effects.push(Effect::RenderStations(next.visible_stations()));
        }
        Action::SelectStation(station_id) => match state.station(station_id) {
            Some(station) => {
                next.selected_station = Some(station_id);
                effects.push(Effect::ShowStationDetails(station.clone()));
            }
            None => effects.push(Effect::error(
                BookingError::StationNotFound { station_id }.to_string(),
            )),
        },
        Action::OpenBooking(station_id) => match state.station(station_id) {
            Some(station) => {
                let draft = BookingDraft::for_station(station, ctx.now.naive_local());
                open_booking_form(&mut next, draft, &mut effects);
            }
            None => effects.push(Effect::error(
                BookingError::StationNotFound { station_id }.to_string(),
            )),
        },
        Action::OpenHandoff(handoff) => {
            let draft = handoff.draft(ctx.now.naive_local());
            open_booking_form(&mut next, draft, &mut effects);
        }
        Action::UpdateBookingDraft {
            date_time,
            duration_minutes,
            vehicle,
        } => match next.draft.as_mut() {
            Some(draft) => {
                draft.date_time = date_time;
                draft.duration_minutes = duration_minutes;
                draft.vehicle = vehicle;
                effects.push(Effect::ShowQuote(draft.quote()));
                effects.push(Effect::ShowBookingWindow(draft.window()));
            }
            None => effects.push(Effect::error(BookingError::NoStationSelected.to_string())),
        },
        Action::CancelBooking => {
            next.draft = None;
            effects.push(Effect::CloseBookingForm);
        }
        Action::ConfirmBooking => confirm_booking(&mut next, ctx, &mut effects),
        Action::DrainBattery => {
            next.battery.drain();
            battery_changed(&next, &mut effects);
        }
        Action::ChargeBattery => {
            next.battery.charge();
            battery_changed(&next, &mut effects);
        }
        Action::SetEfficiencyMode(mode) => {
            next.battery.set_efficiency_mode(&mode);
            battery_changed(&next, &mut effects);
        }
    }

    Transition {
        state: next,
        effects,
    }
}

fn open_booking_form(next: &mut AppState, draft: BookingDraft, effects: &mut Vec<Effect>) {
    effects.push(Effect::ShowQuote(draft.quote()));
    effects.push(Effect::ShowBookingWindow(draft.window()));
    effects.push(Effect::OpenBookingForm(draft.clone()));
    next.draft = Some(draft);
}

fn confirm_booking(next: &mut AppState, ctx: &Context<'_>, effects: &mut Vec<Effect>) {
    let Some(draft) = next.draft.as_ref() else {
        effects.push(Effect::error(BookingError::NoStationSelected.to_string()));
        return;
    };

    match draft.confirm(
        ctx.now.with_timezone(&Utc),
        ctx.last_booking_id.as_deref(),
    ) {
        Ok(booking) => {
            tracing::info!(
                "Confirmed booking {} at {} for {}",
                booking.id,
                booking.station_name,
                booking.date_time
            );
            next.draft = None;
            effects.push(Effect::PersistBooking(booking));
            effects.push(Effect::CloseBookingForm);
            effects.push(Effect::success(BOOKED_MESSAGE));
        }
        Err(BookingError::MissingField { field }) => {
            tracing::info!("Rejected booking, missing {}", field);
            effects.push(Effect::error(MISSING_FIELDS_MESSAGE));
        }
        Err(error) => effects.push(Effect::error(error.to_string())),
    }
}

fn battery_changed(next: &AppState, effects: &mut Vec<Effect>) {
    tracing::info!(
        "Battery at {}% ({:.1} km range)",
        next.battery.percentage,
        next.battery.estimated_range_km()
    );
    effects.push(Effect::RenderBattery(next.battery.report()));
    effects.push(Effect::RangeWarning(next.range_warning()));
}
