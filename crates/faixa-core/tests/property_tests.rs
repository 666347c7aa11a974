//! # Property-Based Tests
//!
//! Verification tests using proptest.
//!
//! These tests ensure determinism and correctness invariants of the
//! curriculum, evaluator, and promotion paths.

use chrono::NaiveDate;
use faixa_core::{
    AttendanceRecord, Evaluator, GraduationStore, Program, PromotionRequest, Registry, StudentId,
    months_earlier, ranks, successors, whole_months_between,
};
use proptest::collection::vec;
use proptest::prelude::*;

fn program_strategy() -> impl Strategy<Value = Program> {
    prop_oneof![
        Just(Program::Adult),
        Just(Program::Children),
        Just(Program::Juvenile),
        Just(Program::Master),
    ]
}

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2100, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| {
        NaiveDate::from_ymd_opt(y, m, d).expect("day 1..=28 exists in every month")
    })
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Every non-terminal rank has exactly one successor; the terminal rank
    /// has none. No rank ever has two.
    #[test]
    fn successor_chain_is_linear(program in program_strategy()) {
        let curriculum = ranks(program);
        for (i, spec) in curriculum.iter().enumerate() {
            let next = successors(program, spec.name).expect("known rank");
            if i + 1 < curriculum.len() {
                prop_assert_eq!(next.len(), 1);
                prop_assert_eq!(next[0].name, curriculum[i + 1].name);
            } else {
                prop_assert!(next.is_empty());
            }
        }
    }

    /// Evaluation is a pure function: same inputs, same snapshot.
    #[test]
    fn evaluation_is_deterministic(
        program in program_strategy(),
        enrolled in date_strategy(),
        presences in vec(any::<bool>(), 0..80),
    ) {
        let mut registry = Registry::new();
        let state = registry
            .register(StudentId(1), program, enrolled)
            .expect("register");

        let today = NaiveDate::from_ymd_opt(2126, 6, 15).expect("valid date");
        let records: Vec<AttendanceRecord> = presences
            .iter()
            .enumerate()
            .map(|(i, &present)| AttendanceRecord {
                date: today - chrono::Days::new(i as u64),
                present,
            })
            .collect();

        let evaluator = Evaluator::new();
        let first = evaluator.evaluate(&state, &records, today).expect("first");
        let second = evaluator.evaluate(&state, &records, today).expect("second");
        prop_assert_eq!(first, second);
    }

    /// Attendance basis points never exceed 10000 and attended never
    /// exceeds scheduled.
    #[test]
    fn attendance_metrics_are_bounded(
        presences in vec(any::<bool>(), 0..200),
    ) {
        let mut registry = Registry::new();
        let enrolled = NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid date");
        let state = registry
            .register(StudentId(1), Program::Adult, enrolled)
            .expect("register");

        let today = NaiveDate::from_ymd_opt(2026, 6, 15).expect("valid date");
        let records: Vec<AttendanceRecord> = presences
            .iter()
            .enumerate()
            .map(|(i, &present)| AttendanceRecord {
                date: today - chrono::Days::new(i as u64),
                present,
            })
            .collect();

        let snapshot = Evaluator::new()
            .evaluate(&state, &records, today)
            .expect("evaluate");
        prop_assert!(snapshot.attendance_bps <= 10_000);
        prop_assert!(snapshot.classes_attended <= snapshot.scheduled_classes);
    }

    /// Month arithmetic round-trips: stepping back N months never lands
    /// after the original date, and re-measuring gives at least N.
    #[test]
    fn months_earlier_agrees_with_whole_months(
        date in date_strategy(),
        months in 0u32..60,
    ) {
        let earlier = months_earlier(date, months);
        prop_assert!(earlier <= date);
        prop_assert!(whole_months_between(earlier, date) >= months);
    }

    /// Walking the full curriculum start-to-end through the store always
    /// succeeds and leaves a history entry per belt.
    #[test]
    fn full_promotion_walk_reaches_terminal_rank(program in program_strategy()) {
        let mut registry = Registry::new();
        let enrolled = NaiveDate::from_ymd_opt(2010, 1, 1).expect("valid date");
        registry
            .register(StudentId(1), program, enrolled)
            .expect("register");

        let curriculum = ranks(program);
        for (i, spec) in curriculum.iter().enumerate().skip(1) {
            let on = enrolled + chrono::Days::new(i as u64 * 400);
            let request = PromotionRequest {
                target_rank: spec.name.to_string(),
                promoted_on: on,
                attendance_bps: 8000,
                classes_attended: 50,
                evaluator: "prof".to_string(),
                notes: String::new(),
            };
            registry.promote(StudentId(1), &request, None).expect("promote");
        }

        let state = registry.state(StudentId(1)).expect("state");
        prop_assert_eq!(state.rank.as_str(), curriculum[curriculum.len() - 1].name);
        prop_assert_eq!(
            registry.history(StudentId(1)).expect("history").len(),
            curriculum.len() - 1
        );
    }

    /// set_degree bumps the version but never the rank, and applying the
    /// same count twice yields the same degrees.
    #[test]
    fn set_degree_preserves_rank(count in 0u8..=4) {
        let mut registry = Registry::new();
        let enrolled = NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid date");
        registry
            .register(StudentId(1), Program::Adult, enrolled)
            .expect("register");

        let updated = registry
            .set_degree(StudentId(1), count, None)
            .expect("set");
        prop_assert_eq!(updated.rank.as_str(), "White");
        prop_assert_eq!(updated.degrees, count);

        let again = registry
            .set_degree(StudentId(1), count, None)
            .expect("set again");
        prop_assert_eq!(again.degrees, count);
    }
}
