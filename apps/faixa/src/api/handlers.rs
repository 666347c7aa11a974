//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.

use super::{
    AppState,
    types::{
        AttendanceRequest, AttendanceResponse, DegreeRequest, EligibilityParams,
        EligibilityResponse, HealthResponse, HistoryResponse, PromoteRequest, PromoteResponse,
        RegisterRequest, StudentResponse, StudentsResponse,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use faixa_core::{Clock, Evaluator, FaixaError, Program, StudentId, SystemClock};
use std::str::FromStr;

/// Map an engine error to the HTTP status code of the failed request.
fn error_status(error: &FaixaError) -> StatusCode {
    match error {
        FaixaError::StudentNotFound(_) => StatusCode::NOT_FOUND,
        FaixaError::DuplicateStudent(_) | FaixaError::Conflict { .. } => StatusCode::CONFLICT,
        FaixaError::UnknownProgramOrRank(_)
        | FaixaError::InvalidPromotionTarget { .. }
        | FaixaError::InvalidPromotionDate { .. }
        | FaixaError::DegreeOutOfRange { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        FaixaError::SerializationError(_) | FaixaError::IoError(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// STUDENT HANDLERS
// =============================================================================

/// List all registered students.
pub async fn list_students_handler(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.read().await;
    match session.students() {
        Ok(states) => (StatusCode::OK, Json(StudentsResponse::success(&states))),
        Err(e) => (
            error_status(&e),
            Json(StudentsResponse::error(e.to_string())),
        ),
    }
}

/// Register a new student.
pub async fn register_handler(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> impl IntoResponse {
    let program = match Program::from_str(&request.program) {
        Ok(p) => p,
        Err(e) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(StudentResponse::error(e.to_string())),
            );
        }
    };

    let mut session = state.session.write().await;
    match session.register(StudentId(request.student_id), program, request.enrolled) {
        Ok(registered) => (StatusCode::CREATED, Json(StudentResponse::success(&registered))),
        Err(e) => (
            error_status(&e),
            Json(StudentResponse::error(e.to_string())),
        ),
    }
}

/// Get a student's graduation state.
pub async fn student_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    let session = state.session.read().await;
    match session.state(StudentId(id)) {
        Ok(found) => (StatusCode::OK, Json(StudentResponse::success(&found))),
        Err(e) => (
            error_status(&e),
            Json(StudentResponse::error(e.to_string())),
        ),
    }
}

// =============================================================================
// ELIGIBILITY HANDLER
// =============================================================================

/// Evaluate a student's promotion eligibility.
///
/// `?on=YYYY-MM-DD` pins the evaluation date for reproducible results;
/// without it the server's UTC date is used.
pub async fn eligibility_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(params): Query<EligibilityParams>,
) -> impl IntoResponse {
    let today = params.on.unwrap_or_else(|| SystemClock.today());

    let session = state.session.read().await;
    match session.evaluate(StudentId(id), &Evaluator::new(), today) {
        Ok(snapshot) => (
            StatusCode::OK,
            Json(EligibilityResponse::success(today, snapshot)),
        ),
        Err(e) => (
            error_status(&e),
            Json(EligibilityResponse::error(e.to_string())),
        ),
    }
}

// =============================================================================
// ATTENDANCE HANDLER
// =============================================================================

/// Record a scheduled class for a student.
pub async fn attendance_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<AttendanceRequest>,
) -> impl IntoResponse {
    let mut session = state.session.write().await;
    match session.record_attendance(StudentId(id), request.date, request.present) {
        Ok(()) => (StatusCode::OK, Json(AttendanceResponse::success())),
        Err(e) => (
            error_status(&e),
            Json(AttendanceResponse::error(e.to_string())),
        ),
    }
}

// =============================================================================
// PROMOTION HANDLERS
// =============================================================================

/// Get a student's promotion history.
pub async fn history_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    let session = state.session.read().await;
    match session.history(StudentId(id)) {
        Ok(entries) => (StatusCode::OK, Json(HistoryResponse::success(&entries))),
        Err(e) => (
            error_status(&e),
            Json(HistoryResponse::error(e.to_string())),
        ),
    }
}

/// Record an approved promotion.
pub async fn promote_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<PromoteRequest>,
) -> impl IntoResponse {
    let core_request = match request.to_core() {
        Ok(r) => r,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(PromoteResponse::error(e.to_string())),
            );
        }
    };

    let mut session = state.session.write().await;
    match session.promote(StudentId(id), &core_request, request.expected_version) {
        Ok(entry) => {
            tracing::info!(
                student = id,
                new_rank = %entry.new_rank,
                evaluator = %entry.evaluator,
                "Promotion recorded"
            );
            (StatusCode::CREATED, Json(PromoteResponse::success(&entry)))
        }
        Err(e) => (
            error_status(&e),
            Json(PromoteResponse::error(e.to_string())),
        ),
    }
}

// =============================================================================
// DEGREE HANDLER
// =============================================================================

/// Set a student's degree count within the current belt.
pub async fn degree_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<DegreeRequest>,
) -> impl IntoResponse {
    let mut session = state.session.write().await;
    match session.set_degree(StudentId(id), request.degrees, request.expected_version) {
        Ok(updated) => (StatusCode::OK, Json(StudentResponse::success(&updated))),
        Err(e) => (
            error_status(&e),
            Json(StudentResponse::error(e.to_string())),
        ),
    }
}
