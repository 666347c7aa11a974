//! # Core Type Definitions
//!
//! This module contains all core types for the Faixa graduation engine:
//! - Student identity (`StudentId`)
//! - Program enumeration (`Program`)
//! - Persistent graduation state (`StudentGraduationState`)
//! - The append-only promotion log (`GraduationHistoryEntry`)
//! - Attendance input (`AttendanceRecord`)
//! - Computed eligibility output (`EligibilitySnapshot`)
//! - Error types (`FaixaError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use integer arithmetic only (percentages are basis points, no floats)
//! - Implement `Ord` where used as `BTreeMap` keys
//! - Carry an explicit `version` counter for optimistic concurrency

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// STUDENT IDENTITY
// =============================================================================

/// Unique identifier for a student in the academy.
/// Assigned by the enclosing student-management system, opaque to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StudentId(pub u64);

// =============================================================================
// PROGRAM
// =============================================================================

/// Age/category track. Each program owns its own belt sequence; the same
/// rank name may have different successors and degree maximums in different
/// programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Program {
    Adult,
    Children,
    Juvenile,
    Master,
}

impl Program {
    /// All programs, in a fixed order.
    pub const ALL: [Program; 4] = [
        Program::Adult,
        Program::Children,
        Program::Juvenile,
        Program::Master,
    ];

    /// Get the program name as a lowercase string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Program::Adult => "adult",
            Program::Children => "children",
            Program::Juvenile => "juvenile",
            Program::Master => "master",
        }
    }

    /// Parse a program from its lowercase name.
    pub fn parse(s: &str) -> Result<Self, FaixaError> {
        match s {
            "adult" => Ok(Program::Adult),
            "children" => Ok(Program::Children),
            "juvenile" => Ok(Program::Juvenile),
            "master" => Ok(Program::Master),
            other => Err(FaixaError::UnknownProgramOrRank(other.to_string())),
        }
    }
}

impl std::fmt::Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Program {
    type Err = FaixaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Program::parse(s)
    }
}

// =============================================================================
// STUDENT GRADUATION STATE
// =============================================================================

/// Per-student graduation state.
///
/// Created when a student is registered, destroyed only with the student
/// record, and mutated exclusively by the promotion recorder (belt change)
/// or the degree updater (degree-only change).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentGraduationState {
    /// The student this state belongs to.
    pub student: StudentId,
    /// Current program track.
    pub program: Program,
    /// Current belt rank. Always a member of the program's curriculum.
    pub rank: String,
    /// Current degree (stripe) count, 0..=max_degrees for the current rank.
    pub degrees: u8,
    /// Enrollment date. Stands in for the last promotion date until the
    /// first promotion is recorded.
    pub enrolled: NaiveDate,
    /// Date of the most recent promotion, if any.
    pub last_promotion: Option<NaiveDate>,
    /// Optimistic-concurrency token. Bumped on every mutation; stale writers
    /// fail with `FaixaError::Conflict` instead of silently overwriting.
    pub version: u64,
}

impl StudentGraduationState {
    /// The date the current time-in-rank clock started.
    #[must_use]
    pub fn rank_since(&self) -> NaiveDate {
        self.last_promotion.unwrap_or(self.enrolled)
    }
}

// =============================================================================
// GRADUATION HISTORY
// =============================================================================

/// A single entry in the append-only promotion log.
///
/// Immutable once created. The attendance metrics are caller-supplied
/// snapshots of what was reviewed at approval time, not re-derived values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraduationHistoryEntry {
    /// The promoted student.
    pub student: StudentId,
    /// Rank held before the promotion. None only for an initial-assignment
    /// record; entries written by the recorder always carry the prior rank.
    pub prior_rank: Option<String>,
    /// Rank awarded by the promotion.
    pub new_rank: String,
    /// Date the promotion took effect.
    pub promoted_on: NaiveDate,
    /// Attendance percentage at approval time, in basis points (7500 = 75%).
    pub attendance_bps: u32,
    /// Classes attended in the evaluation window at approval time.
    pub classes_attended: u32,
    /// Identity of the approving evaluator.
    pub evaluator: String,
    /// Free-text notes from the approval.
    pub notes: String,
}

// =============================================================================
// ATTENDANCE
// =============================================================================

/// One scheduled class for a student: the date and whether they were present.
/// Supplied by the external attendance-tracking subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub date: NaiveDate,
    pub present: bool,
}

// =============================================================================
// ELIGIBILITY SNAPSHOT
// =============================================================================

/// Computed promotion-readiness for a student at a point in time.
///
/// Never persisted; recomputed on demand. `eligible` with a `None`
/// `next_candidate` means "eligible for a degree award, not a belt change"
/// (the student holds the program's terminal rank).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilitySnapshot {
    /// All three requirements met.
    pub eligible: bool,
    /// Minimum whole months in the current rank reached.
    pub time_met: bool,
    /// Minimum classes attended in the window reached.
    pub classes_met: bool,
    /// Minimum attendance percentage in the window reached.
    pub attendance_met: bool,
    /// Whole months since the last promotion (or enrollment).
    pub months_since_promotion: u32,
    /// Classes attended (present) in the evaluation window.
    pub classes_attended: u32,
    /// Classes scheduled in the evaluation window.
    pub scheduled_classes: u32,
    /// Attendance percentage in basis points (8333 = 83.33%).
    /// Zero when no classes were scheduled.
    pub attendance_bps: u32,
    /// The next belt in the program's sequence, None at the terminal rank.
    pub next_candidate: Option<String>,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Faixa engine.
///
/// All variants are local business-rule violations surfaced to the immediate
/// caller as typed results; none represent crash conditions. `Conflict` is
/// the only transient kind — callers should re-fetch state and may retry.
#[derive(Debug, Error)]
pub enum FaixaError {
    /// A program/rank pair is not in the curriculum table. Caller bug, not
    /// retried.
    #[error("Unknown program or rank: {0}")]
    UnknownProgramOrRank(String),

    /// The promotion target is not a direct successor of the current rank
    /// (guards against skipping belts or regressing).
    #[error("Invalid promotion target: {target} is not the next rank after {current} in the {program} program")]
    InvalidPromotionTarget {
        program: Program,
        current: String,
        target: String,
    },

    /// The promotion date precedes the student's last promotion.
    #[error("Invalid promotion date: {attempted} precedes the last promotion on {last}")]
    InvalidPromotionDate {
        attempted: NaiveDate,
        last: NaiveDate,
    },

    /// The requested degree count exceeds the current rank's maximum.
    #[error("Degree {requested} out of range: {rank} allows 0..={max}")]
    DegreeOutOfRange {
        rank: String,
        requested: u8,
        max: u8,
    },

    /// No graduation state exists for the student.
    #[error("Student not found: {0:?}")]
    StudentNotFound(StudentId),

    /// A graduation state already exists for the student.
    #[error("Student already registered: {0:?}")]
    DuplicateStudent(StudentId),

    /// Another writer mutated the state since it was read. Transient:
    /// re-read the current state and retry once.
    #[error("Concurrent modification: expected version {expected}, found {found}")]
    Conflict { expected: u64, found: u64 },

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
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
    fn program_name_round_trip() {
        for program in Program::ALL {
            assert_eq!(Program::parse(program.as_str()).expect("parse"), program);
        }
    }

    #[test]
    fn program_parse_rejects_unknown() {
        let result = Program::parse("toddler");
        assert!(matches!(result, Err(FaixaError::UnknownProgramOrRank(_))));
    }

    #[test]
    fn rank_since_prefers_last_promotion() {
        let mut state = StudentGraduationState {
            student: StudentId(1),
            program: Program::Adult,
            rank: "White".to_string(),
            degrees: 0,
            enrolled: date(2024, 1, 10),
            last_promotion: None,
            version: 1,
        };
        assert_eq!(state.rank_since(), date(2024, 1, 10));

        state.last_promotion = Some(date(2025, 3, 2));
        assert_eq!(state.rank_since(), date(2025, 3, 2));
    }

    #[test]
    fn student_id_ordering_is_numeric() {
        let mut ids = vec![StudentId(30), StudentId(2), StudentId(11)];
        ids.sort();
        assert_eq!(ids, vec![StudentId(2), StudentId(11), StudentId(30)]);
    }
}
