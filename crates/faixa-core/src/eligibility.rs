//! # Promotion Eligibility Evaluator
//!
//! Computes an [`EligibilitySnapshot`] from a student's graduation state and
//! their attendance records in a trailing window.
//!
//! ## Advisory, not a gate
//!
//! Eligibility informs the approving human; the promotion recorder does not
//! re-check these thresholds. The engine records approvals, it does not
//! replace judgment.
//!
//! ## Determinism
//!
//! The evaluation is a pure function of its inputs: identical state,
//! attendance, and evaluation date always produce an identical snapshot.
//! "Now" is supplied through the [`Clock`] trait, never read ambiently.
//! Percentages use integer basis points (no floats); zero scheduled classes
//! degrades to `attendance_met = false` rather than a division error.

use crate::curriculum;
use crate::types::{AttendanceRecord, EligibilitySnapshot, FaixaError, StudentGraduationState};
use chrono::{Datelike, NaiveDate};

// =============================================================================
// PROMOTION THRESHOLDS (Configurable Reference Values)
// =============================================================================

/// Minimum whole months in the current rank before a belt promotion.
pub const MIN_MONTHS_IN_RANK: u32 = 6;

/// Minimum classes attended in the evaluation window.
pub const MIN_CLASSES_IN_WINDOW: u32 = 48;

/// Minimum attendance percentage in basis points (7500 = 75%).
pub const MIN_ATTENDANCE_BPS: u32 = 7500;

/// Default trailing attendance window, in whole months.
pub const DEFAULT_WINDOW_MONTHS: u32 = 6;

// =============================================================================
// CLOCK
// =============================================================================

/// Source of "today" for eligibility evaluation.
///
/// Injected so that evaluation is testable and reproducible; the evaluator
/// itself never reads system time.
pub trait Clock: Send + Sync {
    /// The current calendar date.
    fn today(&self) -> NaiveDate;
}

/// Clock backed by the system's UTC date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Utc::now().date_naive()
    }
}

/// Clock pinned to a fixed date, for tests and reproducible evaluations.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

// =============================================================================
// DATE ARITHMETIC
// =============================================================================

/// Whole months elapsed from `from` to `to` (0 if `to` precedes `from`).
///
/// A month is complete only once the day-of-month has been reached again:
/// Jan 31 → Feb 28 is 0 whole months, Jan 15 → Jul 15 is 6.
#[must_use]
pub fn whole_months_between(from: NaiveDate, to: NaiveDate) -> u32 {
    if to < from {
        return 0;
    }
    let mut months =
        (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32);
    if to.day() < from.day() {
        months -= 1;
    }
    months.max(0) as u32
}

/// The date `months` whole months before `date`, clamping the day to the
/// end of shorter months (Mar 31 minus one month is Feb 28/29).
#[must_use]
pub fn months_earlier(date: NaiveDate, months: u32) -> NaiveDate {
    let total = date.year() * 12 + date.month() as i32 - 1 - months as i32;
    let year = total.div_euclid(12);
    let month = (total.rem_euclid(12) + 1) as u32;

    let mut day = date.day();
    while day > 28 {
        if let Some(clamped) = NaiveDate::from_ymd_opt(year, month, day) {
            return clamped;
        }
        day -= 1;
    }
    // Day 1..=28 exists in every month.
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(date)
}

// =============================================================================
// EVALUATOR
// =============================================================================

/// Eligibility Evaluator - pure function over state and attendance.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator {
    min_months: u32,
    min_classes: u32,
    min_attendance_bps: u32,
    window_months: u32,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    /// Create an evaluator with the default thresholds.
    #[must_use]
    pub fn new() -> Self {
        Self {
            min_months: MIN_MONTHS_IN_RANK,
            min_classes: MIN_CLASSES_IN_WINDOW,
            min_attendance_bps: MIN_ATTENDANCE_BPS,
            window_months: DEFAULT_WINDOW_MONTHS,
        }
    }

    /// Create an evaluator with custom thresholds.
    #[must_use]
    pub fn with_thresholds(
        min_months: u32,
        min_classes: u32,
        min_attendance_bps: u32,
        window_months: u32,
    ) -> Self {
        Self {
            min_months,
            min_classes,
            min_attendance_bps,
            window_months,
        }
    }

    /// The trailing attendance window, in whole months.
    #[must_use]
    pub fn window_months(&self) -> u32 {
        self.window_months
    }

    /// Evaluate promotion readiness as of `today`.
    ///
    /// `attendance` is the student's scheduled classes; records outside the
    /// trailing window are ignored, so callers may pass a superset.
    ///
    /// # Errors
    ///
    /// Returns `UnknownProgramOrRank` if the state's rank is not in the
    /// curriculum table. Missing attendance data never fails: it degrades to
    /// `attendance_met = false`.
    pub fn evaluate(
        &self,
        state: &StudentGraduationState,
        attendance: &[AttendanceRecord],
        today: NaiveDate,
    ) -> Result<EligibilitySnapshot, FaixaError> {
        let next = curriculum::successors(state.program, &state.rank)?;
        let next_candidate = next.first().map(|spec| spec.name.to_string());

        let months_since_promotion = whole_months_between(state.rank_since(), today);

        let window_start = months_earlier(today, self.window_months);
        let mut scheduled_classes: u32 = 0;
        let mut classes_attended: u32 = 0;
        for record in attendance {
            if record.date < window_start || record.date > today {
                continue;
            }
            scheduled_classes = scheduled_classes.saturating_add(1);
            if record.present {
                classes_attended = classes_attended.saturating_add(1);
            }
        }

        // Basis points, integer math only. Zero scheduled classes is not an
        // error: it simply cannot satisfy the attendance requirement.
        let attendance_bps = if scheduled_classes > 0 {
            (u64::from(classes_attended) * 10_000 / u64::from(scheduled_classes)) as u32
        } else {
            0
        };

        let time_met = months_since_promotion >= self.min_months;
        let classes_met = classes_attended >= self.min_classes;
        let attendance_met = scheduled_classes > 0 && attendance_bps >= self.min_attendance_bps;

        Ok(EligibilitySnapshot {
            eligible: time_met && classes_met && attendance_met,
            time_met,
            classes_met,
            attendance_met,
            months_since_promotion,
            classes_attended,
            scheduled_classes,
            attendance_bps,
            next_candidate,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
