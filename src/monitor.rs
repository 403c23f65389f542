//! Client-side geofence watch: a state machine fed by a continuous
//! location subscription. Each reading is classified against the same
//! persisted geofence configuration the server validates against, and an
//! outside->inside transition raises at most one "arrived" notification
//! per workplace-local calendar day.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::warn;

use crate::models::geofence::GeofenceConfig;
use crate::utils::{geo, time};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Monitoring,
}

#[derive(Debug, Clone, Copy)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct LocationReadError {
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationPermission {
    Granted,
    Denied,
}

/// Handle owning the platform location watch; cancelled on stop or drop so
/// no watch outlives the monitor.
pub trait LocationSubscription {
    fn cancel(&mut self);
}

/// Persisted "already notified today" flag, injected so tests can observe
/// and preload it.
pub trait NotifiedStore {
    fn was_notified(&self, date: NaiveDate) -> bool;
    fn mark_notified(&mut self, date: NaiveDate);
}

/// Platform notification surface. `ensure_permission` may prompt the user
/// the first time it is called; afterwards it reports the settled state.
pub trait NotificationSink {
    fn ensure_permission(&mut self) -> NotificationPermission;
    fn notify(&mut self, title: &str, body: &str);
}

/// What a single location update amounted to; returned for observability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpdateOutcome {
    /// Monitor is idle; the reading was discarded.
    Ignored,
    /// The location read failed; this cycle is skipped, monitoring continues.
    ReadFailed,
    Outside {
        distance_meters: f64,
    },
    Inside {
        distance_meters: f64,
        /// True only on the outside->inside edge, never on repeats.
        arrival: bool,
        notified: bool,
    },
}

pub struct GeofenceMonitor<S: NotifiedStore, N: NotificationSink> {
    config: GeofenceConfig,
    timezone: Tz,
    store: S,
    sink: N,
    state: MonitorState,
    was_inside: bool,
    subscription: Option<Box<dyn LocationSubscription + Send>>,
}

impl<S: NotifiedStore, N: NotificationSink> GeofenceMonitor<S, N> {
    pub fn new(config: GeofenceConfig, timezone: Tz, store: S, sink: N) -> Self {
        Self {
            config,
            timezone,
            store,
            sink,
            state: MonitorState::Idle,
            was_inside: false,
            subscription: None,
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Starts monitoring. Calling start while already monitoring is a no-op;
    /// the existing subscription is kept and `subscribe` is not invoked.
    pub fn start<F>(&mut self, subscribe: F)
    where
        F: FnOnce() -> Box<dyn LocationSubscription + Send>,
    {
        if self.state == MonitorState::Monitoring {
            return;
        }
        self.subscription = Some(subscribe());
        self.was_inside = false;
        self.state = MonitorState::Monitoring;
    }

    /// Stops monitoring and cancels the location watch. Safe to call from
    /// any state, including never-started.
    pub fn stop(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.cancel();
        }
        self.state = MonitorState::Idle;
        self.was_inside = false;
    }

    /// Processes one location update, in arrival order.
    pub fn handle_update(
        &mut self,
        reading: Result<Position, LocationReadError>,
        now: DateTime<Utc>,
    ) -> UpdateOutcome {
        if self.state != MonitorState::Monitoring {
            return UpdateOutcome::Ignored;
        }

        let position = match reading {
            Ok(position) => position,
            Err(err) => {
                warn!(error = %err.message, "location read failed; skipping update");
                return UpdateOutcome::ReadFailed;
            }
        };

        let distance_meters = geo::distance_meters(
            position.latitude,
            position.longitude,
            self.config.workplace_latitude,
            self.config.workplace_longitude,
        );
        // Boundary inclusive: exactly on the radius counts as inside.
        let inside = distance_meters <= self.config.allowed_radius_meters;
        let arrival = inside && !self.was_inside;
        self.was_inside = inside;

        if !inside {
            return UpdateOutcome::Outside { distance_meters };
        }
        if !arrival {
            return UpdateOutcome::Inside {
                distance_meters,
                arrival: false,
                notified: false,
            };
        }

        let today = time::local_date(now, self.timezone);
        let mut notified = false;
        if !self.store.was_notified(today) {
            if self.sink.ensure_permission() == NotificationPermission::Granted {
                self.sink
                    .notify("Ponto", "You have arrived at the workplace");
                notified = true;
            }
            // Marked even when permission was denied, so the prompt is never
            // raised again today.
            self.store.mark_notified(today);
        }

        UpdateOutcome::Inside {
            distance_meters,
            arrival: true,
            notified,
        }
    }
}

impl<S: NotifiedStore, N: NotificationSink> Drop for GeofenceMonitor<S, N> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    struct MemoryStore {
        notified: HashSet<NaiveDate>,
    }

    impl MemoryStore {
        fn new() -> Self {
            Self {
                notified: HashSet::new(),
            }
        }
    }

    impl NotifiedStore for MemoryStore {
        fn was_notified(&self, date: NaiveDate) -> bool {
            self.notified.contains(&date)
        }

        fn mark_notified(&mut self, date: NaiveDate) {
            self.notified.insert(date);
        }
    }

    struct FakeSink {
        permission: NotificationPermission,
        prompts: usize,
        delivered: Vec<String>,
    }

    impl FakeSink {
        fn granted() -> Self {
            Self {
                permission: NotificationPermission::Granted,
                prompts: 0,
                delivered: Vec::new(),
            }
        }

        fn denied() -> Self {
            Self {
                permission: NotificationPermission::Denied,
                prompts: 0,
                delivered: Vec::new(),
            }
        }
    }

    impl NotificationSink for FakeSink {
        fn ensure_permission(&mut self) -> NotificationPermission {
            self.prompts += 1;
            self.permission
        }

        fn notify(&mut self, _title: &str, body: &str) {
            self.delivered.push(body.to_string());
        }
    }

    struct FakeSubscription {
        cancelled: Arc<AtomicBool>,
    }

    impl LocationSubscription for FakeSubscription {
        fn cancel(&mut self) {
            self.cancelled.store(true, Ordering::SeqCst);
        }
    }

    fn config(radius: f64) -> GeofenceConfig {
        GeofenceConfig {
            enabled: true,
            workplace_latitude: -15.7942,
            workplace_longitude: -47.8822,
            allowed_radius_meters: radius,
            updated_at: Utc::now(),
            updated_by: None,
        }
    }

    fn monitor(radius: f64) -> GeofenceMonitor<MemoryStore, FakeSink> {
        let mut m = GeofenceMonitor::new(
            config(radius),
            chrono_tz::America::Sao_Paulo,
            MemoryStore::new(),
            FakeSink::granted(),
        );
        m.start(|| {
            Box::new(FakeSubscription {
                cancelled: Arc::new(AtomicBool::new(false)),
            })
        });
        m
    }

    fn at(lat: f64, lon: f64) -> Result<Position, LocationReadError> {
        Ok(Position {
            latitude: lat,
            longitude: lon,
            accuracy: Some(5.0),
        })
    }

    // ~1.5km away from the configured workplace.
    const FAR: (f64, f64) = (-15.8080, -47.8822);
    const AT_WORK: (f64, f64) = (-15.7942, -47.8822);

    fn noon(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, 15, 0, 0).unwrap()
    }

    #[test]
    fn arrival_is_edge_triggered_not_level_triggered() {
        let mut m = monitor(100.0);
        let sequence = [FAR, FAR, AT_WORK, AT_WORK, FAR, AT_WORK];
        let mut arrivals = 0;
        for (lat, lon) in sequence {
            if let UpdateOutcome::Inside { arrival: true, .. } =
                m.handle_update(at(lat, lon), noon(10))
            {
                arrivals += 1;
            }
        }
        assert_eq!(arrivals, 2);
    }

    #[test]
    fn two_same_day_transitions_notify_at_most_once() {
        let mut m = monitor(100.0);
        m.handle_update(at(FAR.0, FAR.1), noon(10));
        m.handle_update(at(AT_WORK.0, AT_WORK.1), noon(10));
        m.handle_update(at(FAR.0, FAR.1), noon(10));
        m.handle_update(at(AT_WORK.0, AT_WORK.1), noon(10));
        assert_eq!(m.sink.delivered.len(), 1);
    }

    #[test]
    fn notification_fires_again_on_a_new_day() {
        let mut m = monitor(100.0);
        m.handle_update(at(AT_WORK.0, AT_WORK.1), noon(10));
        m.handle_update(at(FAR.0, FAR.1), noon(11));
        m.handle_update(at(AT_WORK.0, AT_WORK.1), noon(11));
        assert_eq!(m.sink.delivered.len(), 2);
    }

    #[test]
    fn denied_permission_still_marks_today() {
        let mut m = GeofenceMonitor::new(
            config(100.0),
            chrono_tz::America::Sao_Paulo,
            MemoryStore::new(),
            FakeSink::denied(),
        );
        m.start(|| {
            Box::new(FakeSubscription {
                cancelled: Arc::new(AtomicBool::new(false)),
            })
        });
        m.handle_update(at(AT_WORK.0, AT_WORK.1), noon(10));
        // Leaving and coming back the same day must not prompt again.
        m.handle_update(at(FAR.0, FAR.1), noon(10));
        m.handle_update(at(AT_WORK.0, AT_WORK.1), noon(10));
        assert_eq!(m.sink.prompts, 1);
        assert!(m.sink.delivered.is_empty());
    }

    #[test]
    fn boundary_distance_counts_as_inside() {
        let mut m = monitor(160.0);
        // ~155m north of the workplace, within the 160m radius.
        let outcome = m.handle_update(at(-15.7956, -47.8822), noon(10));
        assert!(matches!(outcome, UpdateOutcome::Inside { .. }));
    }

    #[test]
    fn read_failure_skips_cycle_and_keeps_monitoring() {
        let mut m = monitor(100.0);
        let outcome = m.handle_update(
            Err(LocationReadError {
                message: "timeout".into(),
            }),
            noon(10),
        );
        assert_eq!(outcome, UpdateOutcome::ReadFailed);
        assert_eq!(m.state(), MonitorState::Monitoring);
        // The next good reading still detects the arrival.
        let outcome = m.handle_update(at(AT_WORK.0, AT_WORK.1), noon(10));
        assert!(matches!(outcome, UpdateOutcome::Inside { arrival: true, .. }));
    }

    #[test]
    fn start_is_idempotent() {
        let mut m = monitor(100.0);
        let mut second_subscribe_ran = false;
        m.start(|| {
            second_subscribe_ran = true;
            Box::new(FakeSubscription {
                cancelled: Arc::new(AtomicBool::new(false)),
            })
        });
        assert!(!second_subscribe_ran);
        assert_eq!(m.state(), MonitorState::Monitoring);
    }

    #[test]
    fn stop_is_safe_when_never_started() {
        let mut m = GeofenceMonitor::new(
            config(100.0),
            chrono_tz::America::Sao_Paulo,
            MemoryStore::new(),
            FakeSink::granted(),
        );
        m.stop();
        assert_eq!(m.state(), MonitorState::Idle);
        assert_eq!(m.handle_update(at(0.1, 0.1), noon(10)), UpdateOutcome::Ignored);
    }

    #[test]
    fn stop_cancels_the_subscription() {
        let cancelled = Arc::new(AtomicBool::new(false));
        let mut m = GeofenceMonitor::new(
            config(100.0),
            chrono_tz::America::Sao_Paulo,
            MemoryStore::new(),
            FakeSink::granted(),
        );
        let flag = cancelled.clone();
        m.start(move || Box::new(FakeSubscription { cancelled: flag }));
        m.stop();
        assert!(cancelled.load(Ordering::SeqCst));
    }

    #[test]
    fn drop_releases_the_subscription() {
        let cancelled = Arc::new(AtomicBool::new(false));
        {
            let mut m = GeofenceMonitor::new(
                config(100.0),
                chrono_tz::America::Sao_Paulo,
                MemoryStore::new(),
                FakeSink::granted(),
            );
            let flag = cancelled.clone();
            m.start(move || Box::new(FakeSubscription { cancelled: flag }));
        }
        assert!(cancelled.load(Ordering::SeqCst));
    }
}
