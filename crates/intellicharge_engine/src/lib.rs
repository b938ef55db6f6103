//! IntelliCharge engine
//!
//! Owns the dashboard state and routes every UI action through [`reduce`],
//! then carries out the persistence side effects against the booking store.

mod dispatch;
mod state;

pub use crate::dispatch::*;
pub use crate::state::AppState;

use chrono::{DateTime, FixedOffset, Local};
use intellicharge_core::booking::BookingDraft;
use intellicharge_core::config::DemoConfig;
use intellicharge_core::store::{BookingStore, Storage};
use intellicharge_core::Booking;
use rand::SeedableRng;
use rand::rngs::StdRng;

pub struct Engine<S> {
    config: DemoConfig,
    state: AppState,
    store: BookingStore<S>,
    rng: StdRng,
}

impl<S: Storage> Engine<S> {
    /// A fixed `seed` makes station generation reproducible.
    pub fn new(config: DemoConfig, storage: S, seed: Option<u64>) -> Self {
        let store = BookingStore::new(storage, config.storage.key.clone());
        let rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Engine {
            state: AppState::new(config.battery),
            config,
            store,
            rng,
        }
    }

    pub fn config(&self) -> &DemoConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn bookings(&self) -> Vec<Booking> {
        self.store.list()
    }

    pub fn dispatch(&mut self, action: Action) -> Vec<Effect> {
        self.dispatch_at(action, Local::now().fixed_offset())
    }

    /// Dispatch with an explicit wall clock.
    pub fn dispatch_at(&mut self, action: Action, now: DateTime<FixedOffset>) -> Vec<Effect> {
        tracing::debug!(?action, "Dispatching action");
        let last_booking_id = match action {
            Action::ConfirmBooking => self.store.last().map(|booking| booking.id),
            _ => None,
        };
        let mut ctx = Context {
            config: &self.config,
            rng: &mut self.rng,
            now,
            last_booking_id,
        };
        let open_draft = self.state.draft.clone();
        let Transition { state, effects } = reduce(&self.state, action, &mut ctx);
        self.state = state;
        self.apply(effects, open_draft)
    }

    /// Carries out persistence effects. When a booking cannot be saved the
    /// form stays open with `open_draft` and only the failure is reported.
    fn apply(&mut self, effects: Vec<Effect>, open_draft: Option<BookingDraft>) -> Vec<Effect> {
        let mut applied = Vec::with_capacity(effects.len() + 1);
        let mut persist_failed = false;

        for effect in effects {
            match effect {
                Effect::PersistBooking(booking) => {
                    match self.store.append(booking.clone()) {
                        Ok(()) => {
                            applied.push(Effect::PersistBooking(booking));
                            applied.push(Effect::RenderBookings(self.store.list()));
                        }
                        Err(error) => {
                            tracing::error!("Could not save booking {}: {}", booking.id, error);
                            persist_failed = true;
                            self.state.draft = open_draft.clone();
                            applied.push(Effect::PersistFailed(booking));
                            applied.push(Effect::Notify {
                                level: NotificationLevel::Error,
                                message: format!("Could not save booking: {error}"),
                            });
                        }
                    }
                }
                Effect::CloseBookingForm
                | Effect::Notify {
                    level: NotificationLevel::Success,
                    ..
                } if persist_failed => {}
                effect => applied.push(effect),
            }
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::TimeZone;
    use intellicharge_core::battery::BatteryState;
    use intellicharge_core::booking::Handoff;
    use intellicharge_core::store::MemoryStorage;
    use intellicharge_core::{
        BookingQuote, BookingStatus, Coordinate, StationFilter, StationType, StorageError,
        VehicleType,
    };

    use super::*;

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2026, 10, 19, 14, 0, 0)
            .unwrap()
    }

    fn engine() -> Engine<MemoryStorage> {
        Engine::new(DemoConfig::default(), MemoryStorage::new(), Some(42))
    }

    fn loaded_engine() -> Engine<MemoryStorage> {
        let mut engine = engine();
        engine.dispatch_at(Action::LoadStations { origin: None }, now());
        engine
    }

    fn fill_draft(engine: &mut Engine<MemoryStorage>) -> Vec<Effect> {
        engine.dispatch_at(
            Action::UpdateBookingDraft {
                date_time: Some("2026-10-19T15:00".into()),
                duration_minutes: Some(60),
                vehicle: Some(VehicleType::Tesla),
            },
            now(),
        )
    }

    fn first_of_type(engine: &Engine<MemoryStorage>, station_type: StationType) -> u32 {
        engine
            .state()
            .stations
            .iter()
            .find(|station| station.station_type == station_type)
            .map(|station| station.id)
            .expect("No station of the requested type")
    }

    #[test]
    fn test_load_stations_uses_default_location() {
        let mut engine = engine();
        let effects = engine.dispatch_at(Action::LoadStations { origin: None }, now());

        assert_eq!(engine.state().origin, Some(Coordinate::DEFAULT_ORIGIN));
        assert_eq!(engine.state().stations.len(), 10);
        assert!(matches!(&effects[0], Effect::RenderStations(stations) if stations.len() == 10));
        assert!(effects.contains(&Effect::RenderStats(engine.state().stats())));
        // 337.5 km of range covers stations a few kilometers away.
        assert!(effects.contains(&Effect::RangeWarning(None)));
    }

    #[test]
    fn test_seeded_engines_generate_identical_stations() {
        assert_eq!(loaded_engine().state().stations, loaded_engine().state().stations);
    }

    #[test]
    fn test_change_filter() {
        let mut engine = loaded_engine();
        let effects = engine.dispatch_at(Action::ChangeFilter(StationFilter::Free), now());

        let Effect::RenderStations(stations) = &effects[0] else {
            panic!("Expected RenderStations");
        };
        assert_eq!(stations.len(), 2);
        assert!(stations.iter().all(|s| s.station_type == StationType::Free));
        assert_eq!(engine.state().stations.len(), 10);
    }

    #[test]
    fn test_select_unknown_station() {
        let mut engine = loaded_engine();
        let effects = engine.dispatch_at(Action::SelectStation(99), now());
        assert_eq!(
            effects,
            vec![Effect::Notify {
                level: NotificationLevel::Error,
                message: "Station 99 not found".into(),
            }]
        );
        assert_eq!(engine.state().selected_station, None);
    }

    #[test]
    fn test_booking_flow() {
        let mut engine = loaded_engine();
        let station_id = first_of_type(&engine, StationType::Fast);

        let effects = engine.dispatch_at(Action::OpenBooking(station_id), now());
        assert!(effects.contains(&Effect::ShowQuote(BookingQuote::default())));
        let draft = engine.state().draft.as_ref().unwrap();
        assert_eq!(draft.date_time.as_deref(), Some("2026-10-19T14:30"));

        let effects = fill_draft(&mut engine);
        let Effect::ShowQuote(quote) = &effects[0] else {
            panic!("Expected ShowQuote");
        };
        assert_abs_diff_eq!(quote.total, 2.95, epsilon = 1e-9);

        let effects = engine.dispatch_at(Action::ConfirmBooking, now());
        assert!(effects.contains(&Effect::CloseBookingForm));
        assert!(effects.contains(&Effect::Notify {
            level: NotificationLevel::Success,
            message: BOOKED_MESSAGE.into(),
        }));
        assert_eq!(engine.state().draft, None);

        let bookings = engine.bookings();
        assert_eq!(bookings.len(), 1);
        assert!(effects.contains(&Effect::RenderBookings(bookings.clone())));
        let booking = &bookings[0];
        assert_eq!(booking.station_id, Some(station_id));
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.price, 2.95);
        assert_eq!(booking.id, now().timestamp_millis().to_string());
    }

    #[test]
    fn test_same_millisecond_bookings_get_increasing_ids() {
        let mut engine = loaded_engine();
        let station_id = first_of_type(&engine, StationType::Normal);

        for _ in 0..2 {
            engine.dispatch_at(Action::OpenBooking(station_id), now());
            fill_draft(&mut engine);
            engine.dispatch_at(Action::ConfirmBooking, now());
        }

        let ids: Vec<i64> = engine
            .bookings()
            .iter()
            .map(|booking| booking.id.parse().unwrap())
            .collect();
        assert_eq!(ids, vec![now().timestamp_millis(), now().timestamp_millis() + 1]);
    }

    #[test]
    fn test_confirm_with_missing_fields_creates_nothing() {
        let mut engine = loaded_engine();
        let station_id = first_of_type(&engine, StationType::Fast);
        engine.dispatch_at(Action::OpenBooking(station_id), now());
        engine.dispatch_at(
            Action::UpdateBookingDraft {
                date_time: Some("2026-10-19T15:00".into()),
                duration_minutes: Some(60),
                vehicle: None,
            },
            now(),
        );

        let effects = engine.dispatch_at(Action::ConfirmBooking, now());
        assert_eq!(
            effects,
            vec![Effect::Notify {
                level: NotificationLevel::Error,
                message: MISSING_FIELDS_MESSAGE.into(),
            }]
        );
        assert!(engine.bookings().is_empty());
        assert!(engine.state().draft.is_some());
    }

    #[test]
    fn test_confirm_without_draft() {
        let mut engine = loaded_engine();
        let effects = engine.dispatch_at(Action::ConfirmBooking, now());
        assert!(matches!(
            &effects[..],
            [Effect::Notify { level: NotificationLevel::Error, .. }]
        ));
        assert!(engine.bookings().is_empty());
    }

    #[test]
    fn test_cancel_booking_closes_form() {
        let mut engine = loaded_engine();
        engine.dispatch_at(Action::OpenBooking(1), now());
        let effects = engine.dispatch_at(Action::CancelBooking, now());
        assert_eq!(effects, vec![Effect::CloseBookingForm]);
        assert_eq!(engine.state().draft, None);
    }

    #[test]
    fn test_handoff_booking_uses_energy_price() {
        let mut engine = engine();
        engine.dispatch_at(
            Action::OpenHandoff(Handoff {
                station: Some("Library Charger".into()),
                price: Some("$0.30/kWh".into()),
                station_type: Some("normal".into()),
            }),
            now(),
        );
        fill_draft(&mut engine);
        engine.dispatch_at(Action::ConfirmBooking, now());

        let bookings = engine.bookings();
        assert_eq!(bookings.len(), 1);
        assert_eq!(bookings[0].station_id, None);
        assert_eq!(bookings[0].station_name, "Library Charger");
        assert_eq!(bookings[0].price, 2.1);
    }

    #[test]
    fn test_battery_actions_report_and_warn() {
        let mut config = DemoConfig::default();
        config.battery = BatteryState {
            capacity_kwh: 10.0,
            percentage: 2.0,
            efficiency_km_per_kwh: 6.0,
            reserve_buffer_km: 10.0,
        };
        let mut engine = Engine::new(config, MemoryStorage::new(), Some(1));
        engine.dispatch_at(Action::LoadStations { origin: None }, now());

        let effects = engine.dispatch_at(Action::DrainBattery, now());
        let Effect::RenderBattery(report) = &effects[0] else {
            panic!("Expected RenderBattery");
        };
        assert_eq!(report.percentage, 1.0);
        assert!(matches!(&effects[1], Effect::RangeWarning(Some(_))));

        let effects = engine.dispatch_at(Action::SetEfficiencyMode("eco".into()), now());
        let Effect::RenderBattery(report) = &effects[0] else {
            panic!("Expected RenderBattery");
        };
        assert_eq!(report.efficiency_km_per_kwh, 7.0);

        engine.dispatch_at(Action::ChargeBattery, now());
        assert_eq!(engine.state().battery.percentage, 2.0);
    }

    #[test]
    fn test_no_range_warning_without_stations() {
        let mut config = DemoConfig::default();
        config.battery.percentage = 0.0;
        let mut engine = Engine::new(config, MemoryStorage::new(), Some(1));

        let effects = engine.dispatch_at(Action::DrainBattery, now());
        assert_eq!(effects[1], Effect::RangeWarning(None));
    }

    struct FailingStorage;

    impl Storage for FailingStorage {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn set(&mut self, _key: &str, _value: String) -> Result<(), StorageError> {
            Err(std::io::Error::other("disk full").into())
        }
    }

    #[test]
    fn test_failed_write_reports_error_instead_of_success() {
        let mut engine = Engine::new(DemoConfig::default(), FailingStorage, Some(42));
        engine.dispatch_at(Action::LoadStations { origin: None }, now());
        engine.dispatch_at(Action::OpenBooking(1), now());
        engine.dispatch_at(
            Action::UpdateBookingDraft {
                date_time: Some("2026-10-19T15:00".into()),
                duration_minutes: Some(30),
                vehicle: Some(VehicleType::Audi),
            },
            now(),
        );

        let effects = engine.dispatch_at(Action::ConfirmBooking, now());
        assert!(!effects.iter().any(|effect| matches!(
            effect,
            Effect::Notify {
                level: NotificationLevel::Success,
                ..
            } | Effect::PersistBooking(_)
        )));
        assert!(effects.iter().any(|effect| matches!(
            effect,
            Effect::Notify {
                level: NotificationLevel::Error,
                ..
            }
        )));
        assert!(effects.iter().any(|effect| matches!(effect, Effect::PersistFailed(_))));
    }

    #[test]
    fn test_failed_write_keeps_booking_form_open() {
        let mut engine = Engine::new(DemoConfig::default(), FailingStorage, Some(42));
        engine.dispatch_at(Action::LoadStations { origin: None }, now());
        engine.dispatch_at(Action::OpenBooking(1), now());
        engine.dispatch_at(
            Action::UpdateBookingDraft {
                date_time: Some("2026-10-19T15:00".into()),
                duration_minutes: Some(30),
                vehicle: Some(VehicleType::Audi),
            },
            now(),
        );
        let draft = engine.state().draft.clone();
        assert!(draft.is_some());

        let effects = engine.dispatch_at(Action::ConfirmBooking, now());
        assert!(!effects.contains(&Effect::CloseBookingForm));
        assert_eq!(engine.state().draft, draft);
    }

    #[test]
    fn test_booking_window_follows_draft() {
        let mut engine = loaded_engine();
        let effects = engine.dispatch_at(Action::OpenBooking(1), now());
        let window = effects.iter().find_map(|effect| match effect {
            Effect::ShowBookingWindow(window) => Some(*window),
            _ => None,
        });
        let window = window.flatten().unwrap();
        assert_eq!(window.start.format("%H:%M").to_string(), "14:30");
        assert_eq!(window.end, window.start);

        let effects = fill_draft(&mut engine);
        let Effect::ShowBookingWindow(Some(window)) = &effects[1] else {
            panic!("Expected ShowBookingWindow");
        };
        assert_eq!(window.start.format("%H:%M").to_string(), "15:00");
        assert_eq!(window.end.format("%H:%M").to_string(), "16:00");

        let effects = engine.dispatch_at(
            Action::UpdateBookingDraft {
                date_time: Some("soon".into()),
                duration_minutes: Some(60),
                vehicle: None,
            },
            now(),
        );
        assert_eq!(effects[1], Effect::ShowBookingWindow(None));
    }
}
