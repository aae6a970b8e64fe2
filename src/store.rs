//! Appointment storage with conflict detection.
//!
//! All appointments live in one document guarded by an `RwLock`. Every
//! mutation builds the next document under the write guard, persists it (when
//! a path is configured) and only then swaps it in, so concurrent bookings
//! cannot collide on an id and a failed write leaves nothing half-applied.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

use crate::congestion::classify;
use crate::error::{Result, SchedulingError, StoreError};
use crate::models::{
    check_duration, interval_end, round_to, Appointment, AppointmentFilter, AppointmentStats,
    AppointmentStatus, NewAppointment, DEFAULT_DURATION_MINUTES,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreDocument {
    appointments: Vec<Appointment>,
}

impl StoreDocument {
    /// First active appointment overlapping `[start, end)`.
    fn find_conflict(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        exclude_id: Option<&str>,
    ) -> Option<&Appointment> {
        self.appointments.iter().find(|apt| {
            apt.is_active()
                && exclude_id.map_or(true, |id| apt.id != id)
                && apt.overlaps(start, end)
        })
    }
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn checked_end(start: NaiveDateTime, duration_minutes: i64) -> Result<NaiveDateTime> {
    interval_end(start, duration_minutes).ok_or_else(|| SchedulingError::Validation {
        field: "start",
        message: format!(
            "{} plus {} minutes is outside the supported calendar range",
            start, duration_minutes
        ),
    })
}

#[derive(Debug)]
pub struct AppointmentStore {
    state: RwLock<StoreDocument>,
    path: Option<PathBuf>,
    clock: fn() -> NaiveDateTime,
}

impl AppointmentStore {
    pub fn in_memory() -> Self {
        AppointmentStore {
            state: RwLock::new(StoreDocument::default()),
            path: None,
            clock: local_now,
        }
    }

    /// Open a JSON-backed store. A missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let document = Self::load(&path)?;
        info!(
            "Opened appointment store at {} ({} appointments)",
            path.display(),
            document.appointments.len()
        );
        Ok(AppointmentStore {
            state: RwLock::new(document),
            path: Some(path),
            clock: local_now,
        })
    }

    /// Replace the wall clock used for audit timestamps and "upcoming".
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Store a new appointment.
    ///
    /// The id is `APT_` plus the 1-based position in the collection. An
    /// overlap with an active appointment is recorded as `conflict_warning`
    /// and does not block the booking.
    pub fn add(&self, record: NewAppointment) -> Result<Appointment> {
        if record.patient_name.trim().is_empty() {
            return Err(SchedulingError::missing("patient_name"));
        }
        if record.appointment_type.trim().is_empty() {
            return Err(SchedulingError::missing("appointment_type"));
        }
        let duration_minutes = record.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES);
        check_duration(duration_minutes)?;
        let end = checked_end(record.start, duration_minutes)?;

        let mut guard = self.write()?;
        let mut next = guard.clone();

        let conflict_warning = next.find_conflict(record.start, end, None).map(|existing| {
            warn!(
                "New booking for {} at {} overlaps {} ({})",
                record.patient_name, record.start, existing.id, existing.patient_name
            );
            format!("Overlaps with {}", existing.patient_name)
        });

        let appointment = Appointment {
            id: format!("APT_{:04}", next.appointments.len() + 1),
            patient_name: record.patient_name,
            patient_id: record.patient_id,
            phone: record.phone,
            email: record.email,
            appointment_type: record.appointment_type,
            start: record.start,
            duration_minutes,
            predicted_wait_minutes: record.predicted_wait_minutes,
            confidence: record.confidence,
            congestion_level: record.predicted_wait_minutes.map(classify),
            status: AppointmentStatus::Confirmed,
            notes: record.notes,
            created_at: (self.clock)(),
            cancelled_at: None,
            cancellation_reason: None,
            previous_start: None,
            rescheduled_at: None,
            reschedule_reason: None,
            conflict_warning,
        };
        next.appointments.push(appointment.clone());

        self.commit(&mut guard, next)?;
        info!(
            "Added appointment: {} for {}",
            appointment.id, appointment.patient_name
        );
        Ok(appointment)
    }

    /// First active appointment overlapping `[start, start + duration)`.
    pub fn check_conflict(
        &self,
        start: NaiveDateTime,
        duration_minutes: i64,
        exclude_id: Option<&str>,
    ) -> Result<Option<Appointment>, StoreError> {
        let end = interval_end(start, duration_minutes).unwrap_or(NaiveDateTime::MAX);
        let guard = self.read()?;
        Ok(guard.find_conflict(start, end, exclude_id).cloned())
    }

    /// Matching appointments sorted by start time.
    pub fn list(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, StoreError> {
        let guard = self.read()?;
        let mut appointments: Vec<Appointment> = guard
            .appointments
            .iter()
            .filter(|apt| filter.matches(apt))
            .cloned()
            .collect();
        appointments.sort_by_key(|apt| apt.start);
        Ok(appointments)
    }

    pub fn get(&self, id: &str) -> Result<Option<Appointment>, StoreError> {
        let guard = self.read()?;
        Ok(guard.appointments.iter().find(|apt| apt.id == id).cloned())
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.appointments.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Cancel an appointment. Returns `false` for an unknown id.
    ///
    /// Cancelling twice is a no-op that keeps the first timestamp and reason.
    pub fn cancel(&self, id: &str, reason: &str) -> Result<bool, StoreError> {
        let mut guard = self.write()?;

        let Some(index) = guard.appointments.iter().position(|apt| apt.id == id) else {
            warn!("Appointment not found: {}", id);
            return Ok(false);
        };
        if !guard.appointments[index].is_active() {
            debug!("Appointment {} already cancelled", id);
            return Ok(true);
        }

        let mut next = guard.clone();
        let appointment = &mut next.appointments[index];
        appointment.status = AppointmentStatus::Cancelled;
        appointment.cancelled_at = Some((self.clock)());
        appointment.cancellation_reason = Some(reason.to_string());

        self.commit(&mut guard, next)?;
        info!("Cancelled appointment: {}", id);
        Ok(true)
    }

    /// Move an active appointment to `new_start`.
    ///
    /// Unlike `add`, an overlap with another active appointment rejects the
    /// move. Returns `None` when the id is unknown or cancelled.
    pub fn reschedule(
        &self,
        id: &str,
        new_start: NaiveDateTime,
        reason: &str,
    ) -> Result<Option<Appointment>> {
        let mut guard = self.write()?;

        let Some(index) = guard
            .appointments
            .iter()
            .position(|apt| apt.id == id && apt.is_active())
        else {
            warn!("Appointment not found: {}", id);
            return Ok(None);
        };

        let duration = guard.appointments[index].duration_minutes;
        let new_end = checked_end(new_start, duration)?;
        if let Some(conflict) = guard.find_conflict(new_start, new_end, Some(id)) {
            warn!(
                "Reschedule of {} to {} conflicts with {}",
                id, new_start, conflict.id
            );
            return Err(SchedulingError::Conflict {
                appointment_id: conflict.id.clone(),
                patient_name: conflict.patient_name.clone(),
            });
        }

        let mut next = guard.clone();
        let appointment = &mut next.appointments[index];
        appointment.previous_start = Some(appointment.start);
        appointment.start = new_start;
        appointment.rescheduled_at = Some((self.clock)());
        appointment.reschedule_reason = Some(reason.to_string());
        let updated = appointment.clone();

        self.commit(&mut guard, next)?;
        info!("Rescheduled appointment: {} to {}", id, new_start);
        Ok(Some(updated))
    }

    /// Totals over confirmed appointments.
    pub fn stats(&self) -> Result<AppointmentStats, StoreError> {
        let guard = self.read()?;
        let now = (self.clock)();
        let mut stats = AppointmentStats::default();
        let mut total_wait = 0.0;
        let mut waits = 0usize;

        for apt in guard.appointments.iter().filter(|apt| apt.is_active()) {
            stats.total += 1;
            *stats.by_type.entry(apt.appointment_type.clone()).or_insert(0) += 1;
            if let Some(wait) = apt.predicted_wait_minutes {
                total_wait += wait;
                waits += 1;
            }
            if apt.start > now {
                stats.upcoming_count += 1;
            }
        }

        if waits > 0 {
            stats.average_wait = round_to(total_wait / waits as f64, 1);
        }
        Ok(stats)
    }

    /// The soonest confirmed appointment still in the future.
    pub fn next_upcoming(&self) -> Result<Option<Appointment>, StoreError> {
        let guard = self.read()?;
        let now = (self.clock)();
        Ok(guard
            .appointments
            .iter()
            .filter(|apt| apt.is_active() && apt.start > now)
            .min_by_key(|apt| apt.start)
            .cloned())
    }

    /// Remove every appointment. Ids restart at `APT_0001` afterwards.
    pub fn clear(&self) -> Result<usize, StoreError> {
        let mut guard = self.write()?;
        let removed = guard.appointments.len();
        self.commit(&mut guard, StoreDocument::default())?;
        info!("Deleted all appointments ({})", removed);
        Ok(removed)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreDocument>, StoreError> {
        self.state.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreDocument>, StoreError> {
        self.state.write().map_err(|_| StoreError::Poisoned)
    }

    fn commit(
        &self,
        guard: &mut RwLockWriteGuard<'_, StoreDocument>,
        next: StoreDocument,
    ) -> Result<(), StoreError> {
        if let Some(path) = &self.path {
            Self::save(path, &next)?;
        }
        **guard = next;
        Ok(())
    }

    fn load(path: &Path) -> Result<StoreDocument, StoreError> {
        if !path.exists() {
            return Ok(StoreDocument::default());
        }
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Write atomically via a temp file next to the target.
    fn save(path: &Path, document: &StoreDocument) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = path.with_extension("json.tmp");
        let mut writer = BufWriter::new(File::create(&temp_path)?);
        serde_json::to_writer_pretty(&mut writer, document)?;
        writer.flush()?;
        drop(writer);
        fs::rename(&temp_path, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use crate::models::MAX_DURATION_MINUTES;
    use chrono::NaiveDate;
    use std::sync::Arc;
    use std::thread;

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn record(name: &str, kind: &str, start: NaiveDateTime, wait: Option<f64>) -> NewAppointment {
        NewAppointment {
            patient_name: name.to_string(),
            patient_id: "1".to_string(),
            phone: "555".to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            appointment_type: kind.to_string(),
            start,
            duration_minutes: None,
            predicted_wait_minutes: wait,
            confidence: wait.map(|_| 0.85),
            notes: None,
        }
    }

    fn store() -> AppointmentStore {
        AppointmentStore::in_memory().with_clock(fixed_now)
    }

    #[test]
    fn assigns_sequential_ids_and_defaults() {
        let store = store();
        let first = store.add(record("Alice", "checkup", at(20, 9, 0), Some(12.0))).unwrap();
        let second = store.add(record("Bob", "checkup", at(20, 11, 0), Some(40.0))).unwrap();

        assert_eq!(first.id, "APT_0001");
        assert_eq!(second.id, "APT_0002");
        assert_eq!(first.duration_minutes, 30);
        assert_eq!(first.status, AppointmentStatus::Confirmed);
        assert_eq!(first.created_at, fixed_now());
        assert_eq!(first.congestion_level, Some(crate::models::CongestionLevel::Low));
        assert_eq!(second.congestion_level, Some(crate::models::CongestionLevel::High));
        assert!(first.conflict_warning.is_none());
    }

    #[test]
    fn rejects_missing_name_or_type() {
        let store = store();
        assert_matches!(
            store.add(record("  ", "checkup", at(20, 9, 0), None)),
            Err(SchedulingError::Validation { field: "patient_name", .. })
        );
        assert_matches!(
            store.add(record("Alice", "", at(20, 9, 0), None)),
            Err(SchedulingError::Validation { field: "appointment_type", .. })
        );
        assert_eq!(store.len().unwrap(), 0);
    }

    #[test]
    fn rejects_out_of_range_duration_and_stays_usable() {
        let store = store();
        store.add(record("Alice", "checkup", at(20, 9, 0), None)).unwrap();

        for bad in [0, -45, MAX_DURATION_MINUTES + 1, 1_000_000_000_000] {
            let mut rec = record("Bob", "checkup", at(20, 9, 0), None);
            rec.duration_minutes = Some(bad);
            assert_matches!(
                store.add(rec),
                Err(SchedulingError::Validation { field: "duration_minutes", .. })
            );
        }

        // Nothing was stored and the lock is still healthy.
        assert_eq!(store.len().unwrap(), 1);
        let next = store.add(record("Carol", "checkup", at(20, 9, 15), None)).unwrap();
        assert_eq!(next.id, "APT_0002");
        assert_eq!(next.conflict_warning.as_deref(), Some("Overlaps with Alice"));
    }

    #[test]
    fn start_near_calendar_end_is_rejected_without_panic() {
        let store = store();
        assert_matches!(
            store.add(record("Alice", "checkup", NaiveDateTime::MAX, None)),
            Err(SchedulingError::Validation { field: "start", .. })
        );

        let apt = store.add(record("Bob", "checkup", at(20, 9, 0), None)).unwrap();
        assert_matches!(
            store.reschedule(&apt.id, NaiveDateTime::MAX, "far future"),
            Err(SchedulingError::Validation { field: "start", .. })
        );
        assert_eq!(store.get(&apt.id).unwrap().unwrap().start, at(20, 9, 0));
        assert!(store
            .check_conflict(NaiveDateTime::MAX, 30, None)
            .unwrap()
            .is_none());
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn overlapping_add_is_flagged_not_rejected() {
        let store = store();
        store.add(record("Alice", "checkup", at(20, 9, 0), None)).unwrap();
        let second = store.add(record("Bob", "checkup", at(20, 9, 15), None)).unwrap();
        assert_eq!(second.conflict_warning.as_deref(), Some("Overlaps with Alice"));

        // Back-to-back is not an overlap.
        let third = store.add(record("Carol", "checkup", at(20, 9, 45), None)).unwrap();
        assert!(third.conflict_warning.is_none());
        assert_eq!(store.len().unwrap(), 3);
    }

    #[test]
    fn cancelled_appointments_do_not_conflict() {
        let store = store();
        let first = store.add(record("Alice", "checkup", at(20, 9, 0), None)).unwrap();
        assert!(store.cancel(&first.id, "sick").unwrap());
        let second = store.add(record("Bob", "checkup", at(20, 9, 0), None)).unwrap();
        assert!(second.conflict_warning.is_none());
        assert!(store.check_conflict(at(20, 9, 0), 30, None).unwrap().is_some());
        assert!(store
            .check_conflict(at(20, 9, 0), 30, Some(&second.id))
            .unwrap()
            .is_none());
    }

    #[test]
    fn cancel_unknown_returns_false() {
        let store = store();
        store.add(record("Alice", "checkup", at(20, 9, 0), None)).unwrap();
        assert!(!store.cancel("APT_9999", "no reason").unwrap());
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn repeated_cancel_keeps_first_reason() {
        let store = store();
        let apt = store.add(record("Alice", "checkup", at(20, 9, 0), None)).unwrap();
        assert!(store.cancel(&apt.id, "first").unwrap());
        assert!(store.cancel(&apt.id, "second").unwrap());

        let stored = store.get(&apt.id).unwrap().unwrap();
        assert_eq!(stored.status, AppointmentStatus::Cancelled);
        assert_eq!(stored.cancellation_reason.as_deref(), Some("first"));
        assert_eq!(stored.cancelled_at, Some(fixed_now()));
    }

    #[test]
    fn reschedule_moves_and_records_previous_start() {
        let store = store();
        let apt = store.add(record("Alice", "checkup", at(20, 9, 0), Some(20.0))).unwrap();

        // Overlapping its own old interval is fine.
        let moved = store
            .reschedule(&apt.id, at(20, 9, 15), "running late")
            .unwrap()
            .unwrap();
        assert_eq!(moved.start, at(20, 9, 15));
        assert_eq!(moved.previous_start, Some(at(20, 9, 0)));
        assert_eq!(moved.reschedule_reason.as_deref(), Some("running late"));
        assert_eq!(moved.rescheduled_at, Some(fixed_now()));
        assert_eq!(moved.predicted_wait_minutes, Some(20.0));
    }

    #[test]
    fn reschedule_into_conflict_fails_without_mutation() {
        let store = store();
        let alice = store.add(record("Alice", "checkup", at(20, 9, 0), None)).unwrap();
        let bob = store.add(record("Bob", "checkup", at(20, 11, 0), None)).unwrap();

        let err = store.reschedule(&bob.id, at(20, 9, 10), "earlier").unwrap_err();
        assert_matches!(
            err,
            SchedulingError::Conflict { ref appointment_id, .. } if appointment_id == "APT_0001"
        );

        assert_eq!(store.get(&alice.id).unwrap().unwrap().start, at(20, 9, 0));
        let bob_after = store.get(&bob.id).unwrap().unwrap();
        assert_eq!(bob_after.start, at(20, 11, 0));
        assert!(bob_after.previous_start.is_none());
    }

    #[test]
    fn reschedule_unknown_or_cancelled_is_none() {
        let store = store();
        let apt = store.add(record("Alice", "checkup", at(20, 9, 0), None)).unwrap();
        assert!(store.reschedule("APT_0042", at(21, 9, 0), "").unwrap().is_none());
        store.cancel(&apt.id, "").unwrap();
        assert!(store.reschedule(&apt.id, at(21, 9, 0), "").unwrap().is_none());
    }

    #[test]
    fn list_filters_and_sorts_by_start() {
        let store = store();
        store.add(record("Late", "checkup", at(21, 15, 0), None)).unwrap();
        store.add(record("Early", "Surgery", at(20, 8, 0), None)).unwrap();
        store.add(record("Other", "checkup", at(2, 10, 0), None)).unwrap();
        let cancelled = store.add(record("Gone", "checkup", at(22, 10, 0), None)).unwrap();
        store.cancel(&cancelled.id, "").unwrap();

        let all = store.list(&AppointmentFilter::new()).unwrap();
        let names: Vec<&str> = all.iter().map(|a| a.patient_name.as_str()).collect();
        assert_eq!(names, vec!["Other", "Early", "Late", "Gone"]);

        let day = store.list(&AppointmentFilter::new().date("2026-01-20")).unwrap();
        assert_eq!(day.len(), 1);
        assert_eq!(day[0].patient_name, "Early");

        // Literal prefix: "2026-01-2" covers the 20th-29th but not the 2nd.
        let prefix = store.list(&AppointmentFilter::new().date("2026-01-2")).unwrap();
        assert_eq!(prefix.len(), 3);

        let surgery = store
            .list(&AppointmentFilter::new().appointment_type("surgery"))
            .unwrap();
        assert_eq!(surgery.len(), 1);

        let confirmed_checkups = store
            .list(
                &AppointmentFilter::new()
                    .appointment_type("checkup")
                    .status(AppointmentStatus::Confirmed),
            )
            .unwrap();
        assert_eq!(confirmed_checkups.len(), 2);
    }

    #[test]
    fn stats_cover_confirmed_appointments() {
        let store = store();
        store.add(record("Past", "checkup", at(10, 9, 0), Some(10.0))).unwrap();
        store.add(record("Future", "checkup", at(20, 9, 0), Some(25.0))).unwrap();
        store.add(record("NoWait", "surgery", at(21, 9, 0), None)).unwrap();
        let gone = store.add(record("Gone", "surgery", at(22, 9, 0), Some(100.0))).unwrap();
        store.cancel(&gone.id, "").unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_type.get("checkup"), Some(&2));
        assert_eq!(stats.by_type.get("surgery"), Some(&1));
        assert_eq!(stats.average_wait, 17.5);
        assert_eq!(stats.upcoming_count, 2);
    }

    #[test]
    fn next_upcoming_skips_past_and_cancelled() {
        let store = store();
        assert!(store.next_upcoming().unwrap().is_none());
        store.add(record("Past", "checkup", at(10, 9, 0), None)).unwrap();
        let soon = store.add(record("Soon", "checkup", at(16, 9, 0), None)).unwrap();
        store.add(record("Later", "checkup", at(25, 9, 0), None)).unwrap();
        assert_eq!(store.next_upcoming().unwrap().unwrap().patient_name, "Soon");

        store.cancel(&soon.id, "").unwrap();
        assert_eq!(store.next_upcoming().unwrap().unwrap().patient_name, "Later");
    }

    #[test]
    fn clear_resets_id_sequence() {
        let store = store();
        store.add(record("Alice", "checkup", at(20, 9, 0), None)).unwrap();
        store.add(record("Bob", "checkup", at(20, 10, 0), None)).unwrap();
        assert_eq!(store.clear().unwrap(), 2);
        assert!(store.is_empty().unwrap());
        let again = store.add(record("Carol", "checkup", at(20, 9, 0), None)).unwrap();
        assert_eq!(again.id, "APT_0001");
    }

    #[test]
    fn concurrent_adds_get_unique_ids() {
        let store = Arc::new(store());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    (0..25)
                        .map(|i| {
                            store
                                .add(record(
                                    &format!("P{}_{}", t, i),
                                    "checkup",
                                    at(20, 9, 0),
                                    None,
                                ))
                                .unwrap()
                                .id
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut ids: Vec<String> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 200);
        assert_eq!(store.len().unwrap(), 200);
        assert_eq!(ids.last().map(String::as_str), Some("APT_0200"));
    }

    #[test]
    fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("appointments.json");

        {
            let store = AppointmentStore::open(&path).unwrap().with_clock(fixed_now);
            store.add(record("Alice", "checkup", at(20, 9, 0), Some(12.0))).unwrap();
            let bob = store.add(record("Bob", "surgery", at(20, 10, 0), None)).unwrap();
            store.cancel(&bob.id, "moved away").unwrap();
        }
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());

        let reopened = AppointmentStore::open(&path).unwrap().with_clock(fixed_now);
        assert_eq!(reopened.len().unwrap(), 2);
        let bob = reopened.get("APT_0002").unwrap().unwrap();
        assert_eq!(bob.status, AppointmentStatus::Cancelled);
        assert_eq!(bob.cancellation_reason.as_deref(), Some("moved away"));
        let next = reopened.add(record("Carol", "checkup", at(21, 9, 0), None)).unwrap();
        assert_eq!(next.id, "APT_0003");
    }

    #[test]
    fn open_rejects_corrupt_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("appointments.json");
        fs::write(&path, "{not json").unwrap();
        assert_matches!(AppointmentStore::open(&path), Err(StoreError::Json(_)));
    }
}
