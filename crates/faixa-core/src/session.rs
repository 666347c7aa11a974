//! # Session Module
//!
//! High-level entry point combining a storage backend with the rules.
//!
//! ## Storage Backends
//!
//! Session supports two storage backends:
//! - `InMemory`: Uses the in-memory `Registry` (fast, volatile)
//! - `Persistent`: Uses `RedbRegistry` for disk-backed ACID storage

use crate::eligibility::{Evaluator, months_earlier};
use crate::promotion::PromotionRequest;
use crate::registry::{GraduationStore, Registry};
use crate::storage::RedbRegistry;
use crate::types::{
    AttendanceRecord, EligibilitySnapshot, FaixaError, GraduationHistoryEntry, Program,
    StudentGraduationState, StudentId,
};
use chrono::NaiveDate;
use std::path::Path;

/// Storage backend for a Session.
#[derive(Debug)]
pub enum StorageBackend {
    /// In-memory registry (fast, volatile).
    InMemory(Registry),
    /// Disk-backed registry using redb (ACID, persistent).
    Persistent(RedbRegistry),
}

impl Default for StorageBackend {
    fn default() -> Self {
        Self::InMemory(Registry::new())
    }
}

// NOTE: StorageBackend does NOT implement Clone.
// RedbRegistry (database handle) cannot be safely cloned.

/// A Session binds a graduation store to the rules layer: curriculum-aware
/// registration, eligibility evaluation over the stored attendance, and
/// atomic promotion recording.
#[derive(Debug, Default)]
pub struct Session {
    backend: StorageBackend,
}

impl Session {
    /// Create a new session with in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session with an existing in-memory registry.
    #[must_use]
    pub fn with_registry(registry: Registry) -> Self {
        Self {
            backend: StorageBackend::InMemory(registry),
        }
    }

    /// Create a session with persistent redb storage.
    ///
    /// Opens or creates a redb database at the given path.
    /// All changes are automatically persisted to disk.
    pub fn with_redb(path: impl AsRef<Path>) -> Result<Self, FaixaError> {
        let redb = RedbRegistry::open(path)?;
        Ok(Self {
            backend: StorageBackend::Persistent(redb),
        })
    }

    /// Check if using persistent storage.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(self.backend, StorageBackend::Persistent(_))
    }

    /// Get a reference to the storage backend.
    #[must_use]
    pub fn backend(&self) -> &StorageBackend {
        &self.backend
    }

    fn store(&self) -> &dyn GraduationStore {
        match &self.backend {
            StorageBackend::InMemory(registry) => registry,
            StorageBackend::Persistent(redb) => redb,
        }
    }

    fn store_mut(&mut self) -> &mut dyn GraduationStore {
        match &mut self.backend {
            StorageBackend::InMemory(registry) => registry,
            StorageBackend::Persistent(redb) => redb,
        }
    }

    // =========================================================================
    // REGISTRATION AND LOOKUP
    // =========================================================================

    /// Register a student into a program at the program's starting rank.
    pub fn register(
        &mut self,
        student: StudentId,
        program: Program,
        enrolled: NaiveDate,
    ) -> Result<StudentGraduationState, FaixaError> {
        self.store_mut().register(student, program, enrolled)
    }

    /// A student's current graduation state.
    pub fn state(&self, student: StudentId) -> Result<StudentGraduationState, FaixaError> {
        self.store().state(student)
    }

    /// All graduation states, ordered by student id.
    pub fn students(&self) -> Result<Vec<StudentGraduationState>, FaixaError> {
        self.store().students()
    }

    /// A student's promotion log, oldest first.
    pub fn history(&self, student: StudentId) -> Result<Vec<GraduationHistoryEntry>, FaixaError> {
        self.store().history(student)
    }

    // =========================================================================
    // ATTENDANCE
    // =========================================================================

    /// Record one scheduled class for a student (last write per date wins).
    pub fn record_attendance(
        &mut self,
        student: StudentId,
        date: NaiveDate,
        present: bool,
    ) -> Result<(), FaixaError> {
        self.store_mut().record_attendance(student, date, present)
    }

    /// Attendance records in `from..=to`, date order.
    pub fn attendance_between(
        &self,
        student: StudentId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, FaixaError> {
        self.store().attendance_between(student, from, to)
    }

    // =========================================================================
    // ELIGIBILITY
    // =========================================================================

    /// Evaluate a student's promotion readiness as of `today`.
    ///
    /// Pulls the attendance records for the evaluator's trailing window from
    /// the store and runs the pure evaluation over them.
    pub fn evaluate(
        &self,
        student: StudentId,
        evaluator: &Evaluator,
        today: NaiveDate,
    ) -> Result<EligibilitySnapshot, FaixaError> {
        let state = self.store().state(student)?;
        let window_start = months_earlier(today, evaluator.window_months());
        let attendance = self
            .store()
            .attendance_between(student, window_start, today)?;
        evaluator.evaluate(&state, &attendance, today)
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Record an approved promotion atomically.
    ///
    /// `expected_version`, when given, must match the stored state's version
    /// or the call fails with `Conflict` and nothing is written.
    pub fn promote(
        &mut self,
        student: StudentId,
        request: &PromotionRequest,
        expected_version: Option<u64>,
    ) -> Result<GraduationHistoryEntry, FaixaError> {
        self.store_mut().promote(student, request, expected_version)
    }

    /// Overwrite a student's degree count within the current rank.
    pub fn set_degree(
        &mut self,
        student: StudentId,
        new_count: u8,
        expected_version: Option<u64>,
    ) -> Result<StudentGraduationState, FaixaError> {
        self.store_mut()
            .set_degree(student, new_count, expected_version)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn register_then_state_round_trips() {
        let mut session = Session::new();
        session
            .register(StudentId(1), Program::Adult, date(2025, 1, 15))
            .expect("register");

        let state = session.state(StudentId(1)).expect("state");
        assert_eq!(state.rank, "White");
        assert!(!session.is_persistent());
    }

    #[test]
    fn evaluate_uses_stored_attendance() {
        let mut session = Session::new();
        session
            .register(StudentId(1), Program::Adult, date(2025, 1, 15))
            .expect("register");

        let today = date(2026, 8, 15);
        // 50 attended out of 60 scheduled, all inside the window.
        for i in 0..60u64 {
            session
                .record_attendance(
                    StudentId(1),
                    today - chrono::Days::new(i),
                    i < 50,
                )
                .expect("record");
        }

        let snapshot = session
            .evaluate(StudentId(1), &Evaluator::new(), today)
            .expect("evaluate");
        assert_eq!(snapshot.scheduled_classes, 60);
        assert_eq!(snapshot.classes_attended, 50);
        assert!(snapshot.eligible);
    }

    #[test]
    fn evaluate_ignores_attendance_outside_window() {
        let mut session = Session::new();
        session
            .register(StudentId(1), Program::Adult, date(2024, 1, 15))
            .expect("register");

        let today = date(2026, 8, 15);
        session
            .record_attendance(StudentId(1), date(2025, 8, 15), true)
            .expect("record");

        let snapshot = session
            .evaluate(StudentId(1), &Evaluator::new(), today)
            .expect("evaluate");
        assert_eq!(snapshot.scheduled_classes, 0);
    }

    #[test]
    fn promote_through_session_updates_state() {
        let mut session = Session::new();
        session
            .register(StudentId(1), Program::Adult, date(2025, 1, 15))
            .expect("register");

        let request = PromotionRequest {
            target_rank: "Blue".to_string(),
            promoted_on: date(2026, 2, 1),
            attendance_bps: 8000,
            classes_attended: 50,
            evaluator: "prof.souza".to_string(),
            notes: String::new(),
        };
        session
            .promote(StudentId(1), &request, Some(1))
            .expect("promote");

        let state = session.state(StudentId(1)).expect("state");
        assert_eq!(state.rank, "Blue");
        assert_eq!(session.history(StudentId(1)).expect("history").len(), 1);
    }

    #[test]
    fn persistent_session_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("faixa.db");

        {
            let mut session = Session::with_redb(&path).expect("open");
            assert!(session.is_persistent());
            session
                .register(StudentId(3), Program::Children, date(2026, 1, 5))
                .expect("register");
        }

        let session = Session::with_redb(&path).expect("reopen");
        let state = session.state(StudentId(3)).expect("state");
        assert_eq!(state.program, Program::Children);
        assert_eq!(state.rank, "White");
    }
}
