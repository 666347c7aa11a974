//! # Promotion Recorder
//!
//! Validates and applies approved belt promotions. The recorder itself is
//! pure: it turns a current state plus an approval request into the updated
//! state and the immutable history entry. Stores are responsible for
//! committing the pair atomically — both mutations or neither.
//!
//! The recorder does not re-check eligibility thresholds. Eligibility is
//! advisory; a human approver may override it, and the history entry keeps
//! the metrics that were actually reviewed at approval time.

use crate::curriculum;
use crate::types::{FaixaError, GraduationHistoryEntry, StudentGraduationState};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// =============================================================================
// PROMOTION REQUEST
// =============================================================================

/// An approved promotion, as reviewed by the evaluator.
///
/// The attendance metrics are snapshots supplied by the approving caller,
/// recorded verbatim rather than re-derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionRequest {
    /// The rank to award. Must be the direct successor of the current rank.
    pub target_rank: String,
    /// Effective date of the promotion.
    pub promoted_on: NaiveDate,
    /// Attendance percentage reviewed at approval, in basis points.
    pub attendance_bps: u32,
    /// Classes attended in the window reviewed at approval.
    pub classes_attended: u32,
    /// Identity of the approving evaluator.
    pub evaluator: String,
    /// Free-text approval notes.
    pub notes: String,
}

// =============================================================================
// RECORDER
// =============================================================================

/// Stateless promotion recorder.
pub struct Recorder;

impl Recorder {
    /// Check a promotion request against the current state.
    ///
    /// # Errors
    ///
    /// - `InvalidPromotionTarget` if the target is not a member of
    ///   `successors(program, current_rank)` — skipping belts and regressing
    ///   are both rejected.
    /// - `InvalidPromotionDate` if the date precedes the last promotion.
    /// - `UnknownProgramOrRank` if the current rank is not in the curriculum.
    pub fn validate(
        state: &StudentGraduationState,
        request: &PromotionRequest,
    ) -> Result<(), FaixaError> {
        let next = curriculum::successors(state.program, &state.rank)?;
        if !next.iter().any(|spec| spec.name == request.target_rank) {
            return Err(FaixaError::InvalidPromotionTarget {
                program: state.program,
                current: state.rank.clone(),
                target: request.target_rank.clone(),
            });
        }

        if let Some(last) = state.last_promotion
            && request.promoted_on < last
        {
            return Err(FaixaError::InvalidPromotionDate {
                attempted: request.promoted_on,
                last,
            });
        }

        Ok(())
    }

    /// Validate and apply a promotion, producing the updated state and the
    /// history entry to append.
    ///
    /// Pure: no store is touched here. The new state advances the rank,
    /// resets the degree count to 0, restarts the time-in-rank clock, and
    /// bumps the version.
    pub fn record(
        state: &StudentGraduationState,
        request: &PromotionRequest,
    ) -> Result<(StudentGraduationState, GraduationHistoryEntry), FaixaError> {
        Self::validate(state, request)?;

        let entry = GraduationHistoryEntry {
            student: state.student,
            prior_rank: Some(state.rank.clone()),
            new_rank: request.target_rank.clone(),
            promoted_on: request.promoted_on,
            attendance_bps: request.attendance_bps,
            classes_attended: request.classes_attended,
            evaluator: request.evaluator.clone(),
            notes: request.notes.clone(),
        };

        let mut updated = state.clone();
        updated.rank = request.target_rank.clone();
        updated.degrees = 0;
        updated.last_promotion = Some(request.promoted_on);
        updated.version = updated.version.saturating_add(1);

        Ok((updated, entry))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Program, StudentId};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn adult(rank: &str, degrees: u8) -> StudentGraduationState {
        StudentGraduationState {
            student: StudentId(7),
            program: Program::Adult,
            rank: rank.to_string(),
            degrees,
            enrolled: date(2024, 1, 15),
            last_promotion: Some(date(2026, 1, 10)),
            version: 3,
        }
    }

    fn request(target: &str, on: NaiveDate) -> PromotionRequest {
        PromotionRequest {
            target_rank: target.to_string(),
            promoted_on: on,
            attendance_bps: 8333,
            classes_attended: 50,
            evaluator: "prof.silva".to_string(),
            notes: String::new(),
        }
    }

    #[test]
    fn promotion_to_direct_successor_succeeds() {
        let state = adult("White", 4);
        let (updated, entry) =
            Recorder::record(&state, &request("Blue", date(2026, 8, 1))).expect("record");

        assert_eq!(updated.rank, "Blue");
        assert_eq!(updated.degrees, 0, "degree count resets on promotion");
        assert_eq!(updated.last_promotion, Some(date(2026, 8, 1)));
        assert_eq!(updated.version, 4);

        assert_eq!(entry.prior_rank.as_deref(), Some("White"));
        assert_eq!(entry.new_rank, "Blue");
        assert_eq!(entry.attendance_bps, 8333);
    }

    #[test]
    fn skipping_a_belt_is_rejected() {
        let state = adult("White", 0);
        let result = Recorder::validate(&state, &request("Purple", date(2026, 8, 1)));
        assert!(matches!(
            result,
            Err(FaixaError::InvalidPromotionTarget { .. })
        ));
    }

    #[test]
    fn regressing_is_rejected() {
        let state = adult("Purple", 2);
        let result = Recorder::validate(&state, &request("Blue", date(2026, 8, 1)));
        assert!(matches!(
            result,
            Err(FaixaError::InvalidPromotionTarget { .. })
        ));
    }

    #[test]
    fn terminal_rank_has_no_valid_target() {
        let state = adult("Black", 1);
        let result = Recorder::validate(&state, &request("Black", date(2026, 8, 1)));
        assert!(matches!(
            result,
            Err(FaixaError::InvalidPromotionTarget { .. })
        ));
    }

    #[test]
    fn date_before_last_promotion_is_rejected() {
        let state = adult("White", 0); // last promoted 2026-01-10
        let result = Recorder::validate(&state, &request("Blue", date(2025, 12, 31)));
        assert!(matches!(
            result,
            Err(FaixaError::InvalidPromotionDate { .. })
        ));
    }

    #[test]
    fn same_day_repromotion_date_is_allowed() {
        let state = adult("White", 0);
        assert!(Recorder::validate(&state, &request("Blue", date(2026, 1, 10))).is_ok());
    }

    #[test]
    fn never_promoted_student_accepts_any_date() {
        let mut state = adult("White", 0);
        state.last_promotion = None;
        assert!(Recorder::validate(&state, &request("Blue", date(2020, 1, 1))).is_ok());
    }
}
