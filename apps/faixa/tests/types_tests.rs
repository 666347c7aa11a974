//! Wire-format tests for the API JSON types.
//!
//! These pin the request/response shapes front-ends depend on.

#![allow(clippy::unwrap_used, clippy::panic)]

use chrono::NaiveDate;
use faixa::api::{AttendanceRequest, PromoteRequest, RegisterRequest, StudentJson};
use serde_json::json;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// =============================================================================
// REGISTER REQUEST
// =============================================================================

#[test]
fn register_request_parses_iso_dates() {
    let request: RegisterRequest = serde_json::from_value(json!({
        "student_id": 17,
        "program": "adult",
        "enrolled": "2026-02-01"
    }))
    .unwrap();

    assert_eq!(request.student_id, 17);
    assert_eq!(request.program, "adult");
    assert_eq!(request.enrolled, date(2026, 2, 1));
}

#[test]
fn register_request_program_defaults_to_adult() {
    let request: RegisterRequest = serde_json::from_value(json!({
        "student_id": 17,
        "enrolled": "2026-02-01"
    }))
    .unwrap();

    assert_eq!(request.program, "adult");
}

#[test]
fn register_request_rejects_malformed_date() {
    let result: Result<RegisterRequest, _> = serde_json::from_value(json!({
        "student_id": 17,
        "program": "adult",
        "enrolled": "02/01/2026"
    }));
    assert!(result.is_err());
}

// =============================================================================
// ATTENDANCE REQUEST
// =============================================================================

#[test]
fn attendance_request_defaults_to_present() {
    let request: AttendanceRequest =
        serde_json::from_value(json!({ "date": "2026-03-04" })).unwrap();
    assert!(request.present);

    let absent: AttendanceRequest =
        serde_json::from_value(json!({ "date": "2026-03-04", "present": false })).unwrap();
    assert!(!absent.present);
}

// =============================================================================
// PROMOTE REQUEST
// =============================================================================

#[test]
fn promote_request_optional_fields_default() {
    let request: PromoteRequest = serde_json::from_value(json!({
        "target_rank": "Blue",
        "promoted_on": "2026-08-15",
        "evaluator": "prof.lima"
    }))
    .unwrap();

    assert_eq!(request.attendance_bps, 0);
    assert_eq!(request.classes_attended, 0);
    assert!(request.notes.is_empty());
    assert!(request.expected_version.is_none());

    let core = request.to_core().unwrap();
    assert_eq!(core.target_rank, "Blue");
    assert_eq!(core.promoted_on, date(2026, 8, 15));
}

#[test]
fn promote_request_rejects_empty_evaluator() {
    let request: PromoteRequest = serde_json::from_value(json!({
        "target_rank": "Blue",
        "promoted_on": "2026-08-15",
        "evaluator": ""
    }))
    .unwrap();
    assert!(request.to_core().is_err());
}

#[test]
fn promote_request_rejects_impossible_attendance() {
    let request: PromoteRequest = serde_json::from_value(json!({
        "target_rank": "Blue",
        "promoted_on": "2026-08-15",
        "evaluator": "prof.lima",
        "attendance_bps": 10_001
    }))
    .unwrap();
    assert!(request.to_core().is_err());
}

#[test]
fn promote_request_rejects_oversized_notes() {
    let request: PromoteRequest = serde_json::from_value(json!({
        "target_rank": "Blue",
        "promoted_on": "2026-08-15",
        "evaluator": "prof.lima",
        "notes": "x".repeat(2000)
    }))
    .unwrap();
    assert!(request.to_core().is_err());
}

// =============================================================================
// STUDENT JSON
// =============================================================================

#[test]
fn student_json_shape_is_stable() {
    let student = StudentJson {
        student_id: 17,
        program: "adult".to_string(),
        rank: "Blue".to_string(),
        degrees: 2,
        enrolled: date(2025, 11, 10),
        last_promotion: Some(date(2026, 8, 15)),
        version: 3,
    };

    let value = serde_json::to_value(&student).unwrap();
    assert_eq!(
        value,
        json!({
            "student_id": 17,
            "program": "adult",
            "rank": "Blue",
            "degrees": 2,
            "enrolled": "2025-11-10",
            "last_promotion": "2026-08-15",
            "version": 3
        })
    );
}

#[test]
fn student_json_null_last_promotion() {
    let student = StudentJson {
        student_id: 1,
        program: "children".to_string(),
        rank: "White".to_string(),
        degrees: 0,
        enrolled: date(2026, 2, 1),
        last_promotion: None,
        version: 1,
    };

    let value = serde_json::to_value(&student).unwrap();
    assert!(value["last_promotion"].is_null());
}
