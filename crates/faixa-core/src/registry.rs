//! # Graduation Store
//!
//! The persistence seam of the engine: [`GraduationStore`] is the contract
//! the rules operate against, and [`Registry`] is the in-memory
//! implementation (BTreeMap-backed for deterministic ordering, volatile).
//!
//! `promote` is the only operation with a transactional obligation: the
//! history append and the state update must land together. Every mutation
//! accepts an optional expected version; a mismatch fails with
//! `FaixaError::Conflict` instead of silently overwriting another writer.

use crate::curriculum;
use crate::degree;
use crate::promotion::{PromotionRequest, Recorder};
use crate::types::{
    AttendanceRecord, FaixaError, GraduationHistoryEntry, Program, StudentGraduationState,
    StudentId,
};
use chrono::NaiveDate;
use std::collections::BTreeMap;

// =============================================================================
// STORE CONTRACT
// =============================================================================

/// Read/write access to graduation state, history, and attendance.
///
/// Implementations must make `promote` atomic: a failure between the history
/// append and the state update may not leave the two inconsistent.
pub trait GraduationStore {
    /// Create graduation state for a new student: the program's first rank,
    /// zero degrees, no promotions.
    fn register(
        &mut self,
        student: StudentId,
        program: Program,
        enrolled: NaiveDate,
    ) -> Result<StudentGraduationState, FaixaError>;

    /// Fetch a student's current graduation state.
    fn state(&self, student: StudentId) -> Result<StudentGraduationState, FaixaError>;

    /// All graduation states, ordered by student id.
    fn students(&self) -> Result<Vec<StudentGraduationState>, FaixaError>;

    /// Apply an approved promotion: append the history entry and update the
    /// state atomically. `expected_version`, when given, must match the
    /// stored state's version or the call fails with `Conflict`.
    fn promote(
        &mut self,
        student: StudentId,
        request: &PromotionRequest,
        expected_version: Option<u64>,
    ) -> Result<GraduationHistoryEntry, FaixaError>;

    /// Overwrite the degree count within the current rank.
    fn set_degree(
        &mut self,
        student: StudentId,
        new_count: u8,
        expected_version: Option<u64>,
    ) -> Result<StudentGraduationState, FaixaError>;

    /// The student's promotion log, ordered by promotion date ascending.
    fn history(&self, student: StudentId) -> Result<Vec<GraduationHistoryEntry>, FaixaError>;

    /// Record one scheduled class. Re-recording the same date overwrites
    /// the presence flag (last write wins).
    fn record_attendance(
        &mut self,
        student: StudentId,
        date: NaiveDate,
        present: bool,
    ) -> Result<(), FaixaError>;

    /// Attendance records in `from..=to`, date order.
    fn attendance_between(
        &self,
        student: StudentId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, FaixaError>;
}

/// Check an optional expected version against the stored one.
pub(crate) fn check_version(expected: Option<u64>, found: u64) -> Result<(), FaixaError> {
    match expected {
        Some(version) if version != found => Err(FaixaError::Conflict {
            expected: version,
            found,
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// IN-MEMORY REGISTRY
// =============================================================================

/// In-memory graduation registry (fast, volatile).
#[derive(Debug, Clone, Default)]
pub struct Registry {
    states: BTreeMap<StudentId, StudentGraduationState>,
    history: BTreeMap<StudentId, Vec<GraduationHistoryEntry>>,
    attendance: BTreeMap<StudentId, BTreeMap<NaiveDate, bool>>,
}

impl Registry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered students.
    #[must_use]
    pub fn student_count(&self) -> usize {
        self.states.len()
    }
}

impl GraduationStore for Registry {
    fn register(
        &mut self,
        student: StudentId,
        program: Program,
        enrolled: NaiveDate,
    ) -> Result<StudentGraduationState, FaixaError> {
        if self.states.contains_key(&student) {
            return Err(FaixaError::DuplicateStudent(student));
        }

        let state = StudentGraduationState {
            student,
            program,
            rank: curriculum::default_rank(program).name.to_string(),
            degrees: 0,
            enrolled,
            last_promotion: None,
            version: 1,
        };
        self.states.insert(student, state.clone());
        Ok(state)
    }

    fn state(&self, student: StudentId) -> Result<StudentGraduationState, FaixaError> {
        self.states
            .get(&student)
            .cloned()
            .ok_or(FaixaError::StudentNotFound(student))
    }

    fn students(&self) -> Result<Vec<StudentGraduationState>, FaixaError> {
        Ok(self.states.values().cloned().collect())
    }

    fn promote(
        &mut self,
        student: StudentId,
        request: &PromotionRequest,
        expected_version: Option<u64>,
    ) -> Result<GraduationHistoryEntry, FaixaError> {
        let current = self
            .states
            .get(&student)
            .ok_or(FaixaError::StudentNotFound(student))?;
        check_version(expected_version, current.version)?;

        // Validate and build before mutating anything, so a failure leaves
        // both maps untouched.
        let (updated, entry) = Recorder::record(current, request)?;

        self.history.entry(student).or_default().push(entry.clone());
        self.states.insert(student, updated);
        Ok(entry)
    }

    fn set_degree(
        &mut self,
        student: StudentId,
        new_count: u8,
        expected_version: Option<u64>,
    ) -> Result<StudentGraduationState, FaixaError> {
        let current = self
            .states
            .get(&student)
            .ok_or(FaixaError::StudentNotFound(student))?;
        check_version(expected_version, current.version)?;

        let updated = degree::set_degree(current, new_count)?;
        self.states.insert(student, updated.clone());
        Ok(updated)
    }

    fn history(&self, student: StudentId) -> Result<Vec<GraduationHistoryEntry>, FaixaError> {
        // Registered student with no promotions yet has an empty log.
        self.state(student)?;
        Ok(self.history.get(&student).cloned().unwrap_or_default())
    }

    fn record_attendance(
        &mut self,
        student: StudentId,
        date: NaiveDate,
        present: bool,
    ) -> Result<(), FaixaError> {
        if !self.states.contains_key(&student) {
            return Err(FaixaError::StudentNotFound(student));
        }
        self.attendance
            .entry(student)
            .or_default()
            .insert(date, present);
        Ok(())
    }

    fn attendance_between(
        &self,
        student: StudentId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, FaixaError> {
        self.state(student)?;
        Ok(self
            .attendance
            .get(&student)
            .map(|days| {
                days.range(from..=to)
                    .map(|(&date, &present)| AttendanceRecord { date, present })
                    .collect()
            })
            .unwrap_or_default())
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

    fn request(target: &str, on: NaiveDate) -> PromotionRequest {
        PromotionRequest {
            target_rank: target.to_string(),
            promoted_on: on,
            attendance_bps: 8000,
            classes_attended: 52,
            evaluator: "prof.santos".to_string(),
            notes: String::new(),
        }
    }

    #[test]
    fn register_uses_program_defaults() {
        let mut registry = Registry::new();
        let state = registry
            .register(StudentId(1), Program::Children, date(2026, 2, 1))
            .expect("register");

        assert_eq!(state.rank, "White");
        assert_eq!(state.degrees, 0);
        assert_eq!(state.last_promotion, None);
        assert_eq!(state.version, 1);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = Registry::new();
        registry
            .register(StudentId(1), Program::Adult, date(2026, 2, 1))
            .expect("register");
        let result = registry.register(StudentId(1), Program::Adult, date(2026, 2, 1));
        assert!(matches!(result, Err(FaixaError::DuplicateStudent(_))));
    }

    #[test]
    fn promote_updates_state_and_appends_history() {
        let mut registry = Registry::new();
        registry
            .register(StudentId(1), Program::Adult, date(2025, 1, 1))
            .expect("register");

        let entry = registry
            .promote(StudentId(1), &request("Blue", date(2026, 2, 1)), None)
            .expect("promote");
        assert_eq!(entry.prior_rank.as_deref(), Some("White"));

        let state = registry.state(StudentId(1)).expect("state");
        assert_eq!(state.rank, "Blue");
        assert_eq!(state.degrees, 0);
        assert_eq!(state.version, 2);

        let log = registry.history(StudentId(1)).expect("history");
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn failed_promotion_leaves_no_trace() {
        let mut registry = Registry::new();
        registry
            .register(StudentId(1), Program::Adult, date(2025, 1, 1))
            .expect("register");

        let result = registry.promote(StudentId(1), &request("Purple", date(2026, 2, 1)), None);
        assert!(matches!(
            result,
            Err(FaixaError::InvalidPromotionTarget { .. })
        ));

        let state = registry.state(StudentId(1)).expect("state");
        assert_eq!(state.rank, "White");
        assert!(registry.history(StudentId(1)).expect("history").is_empty());
    }

    #[test]
    fn stale_version_conflicts() {
        let mut registry = Registry::new();
        registry
            .register(StudentId(1), Program::Adult, date(2025, 1, 1))
            .expect("register");
        registry
            .set_degree(StudentId(1), 1, Some(1))
            .expect("first writer");

        // A second writer still holding version 1 must fail, not overwrite.
        let result = registry.set_degree(StudentId(1), 2, Some(1));
        assert!(matches!(
            result,
            Err(FaixaError::Conflict {
                expected: 1,
                found: 2
            })
        ));
    }

    #[test]
    fn attendance_is_date_ordered_and_overwrites() {
        let mut registry = Registry::new();
        registry
            .register(StudentId(1), Program::Adult, date(2025, 1, 1))
            .expect("register");

        registry
            .record_attendance(StudentId(1), date(2026, 2, 3), true)
            .expect("record");
        registry
            .record_attendance(StudentId(1), date(2026, 2, 1), false)
            .expect("record");
        registry
            .record_attendance(StudentId(1), date(2026, 2, 1), true)
            .expect("re-record");

        let records = registry
            .attendance_between(StudentId(1), date(2026, 2, 1), date(2026, 2, 28))
            .expect("range");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, date(2026, 2, 1));
        assert!(records[0].present, "last write wins");
    }

    #[test]
    fn unknown_student_is_reported() {
        let registry = Registry::new();
        assert!(matches!(
            registry.state(StudentId(404)),
            Err(FaixaError::StudentNotFound(_))
        ));
    }
}
