//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.

use chrono::NaiveDate;
use faixa_core::{
    EligibilitySnapshot, FaixaError, GraduationHistoryEntry, PromotionRequest,
    StudentGraduationState,
};
use serde::{Deserialize, Serialize};

/// Maximum length for free-text fields (evaluator, notes).
///
/// Prevents oversized payloads from reaching the store.
pub const MAX_TEXT_LENGTH: usize = 1024;

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// STUDENT JSON
// =============================================================================

/// JSON projection of a student's graduation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentJson {
    pub student_id: u64,
    pub program: String,
    pub rank: String,
    pub degrees: u8,
    pub enrolled: NaiveDate,
    pub last_promotion: Option<NaiveDate>,
    pub version: u64,
}

impl From<&StudentGraduationState> for StudentJson {
    fn from(state: &StudentGraduationState) -> Self {
        Self {
            student_id: state.student.0,
            program: state.program.as_str().to_string(),
            rank: state.rank.clone(),
            degrees: state.degrees,
            enrolled: state.enrolled,
            last_promotion: state.last_promotion,
            version: state.version,
        }
    }
}

// =============================================================================
// REGISTER REQUEST/RESPONSE
// =============================================================================

fn default_program() -> String {
    "adult".to_string()
}

/// Student registration request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub student_id: u64,
    /// Program name: adult, children, juvenile, master. Defaults to adult.
    #[serde(default = "default_program")]
    pub program: String,
    pub enrolled: NaiveDate,
}

/// Mutation response carrying the resulting state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentResponse {
    pub success: bool,
    pub student: Option<StudentJson>,
    pub error: Option<String>,
}

impl StudentResponse {
    pub fn success(state: &StudentGraduationState) -> Self {
        Self {
            success: true,
            student: Some(StudentJson::from(state)),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            student: None,
            error: Some(msg.into()),
        }
    }
}

/// Roster listing response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentsResponse {
    pub success: bool,
    pub students: Vec<StudentJson>,
    pub error: Option<String>,
}

impl StudentsResponse {
    pub fn success(states: &[StudentGraduationState]) -> Self {
        Self {
            success: true,
            students: states.iter().map(StudentJson::from).collect(),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            students: vec![],
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// ELIGIBILITY RESPONSE
// =============================================================================

/// Query parameters for the eligibility endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct EligibilityParams {
    /// Evaluation date (default: today, server UTC).
    pub on: Option<NaiveDate>,
}

/// Eligibility evaluation response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityResponse {
    pub success: bool,
    pub evaluated_on: Option<NaiveDate>,
    pub snapshot: Option<EligibilitySnapshot>,
    pub error: Option<String>,
}

impl EligibilityResponse {
    pub fn success(evaluated_on: NaiveDate, snapshot: EligibilitySnapshot) -> Self {
        Self {
            success: true,
            evaluated_on: Some(evaluated_on),
            snapshot: Some(snapshot),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            evaluated_on: None,
            snapshot: None,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// ATTENDANCE REQUEST/RESPONSE
// =============================================================================

fn default_present() -> bool {
    true
}

/// Attendance recording request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRequest {
    pub date: NaiveDate,
    #[serde(default = "default_present")]
    pub present: bool,
}

/// Attendance recording response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceResponse {
    pub success: bool,
    pub error: Option<String>,
}

impl AttendanceResponse {
    pub fn success() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// PROMOTION REQUEST/RESPONSE
// =============================================================================

/// Promotion recording request.
///
/// The attendance metrics are what the approver reviewed; they are stored in
/// the history entry verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoteRequest {
    pub target_rank: String,
    pub promoted_on: NaiveDate,
    #[serde(default)]
    pub attendance_bps: u32,
    #[serde(default)]
    pub classes_attended: u32,
    pub evaluator: String,
    #[serde(default)]
    pub notes: String,
    /// When set, the promotion fails with 409 if the stored state has moved.
    pub expected_version: Option<u64>,
}

impl PromoteRequest {
    /// Validate field lengths and convert to a core promotion request.
    pub fn to_core(&self) -> Result<PromotionRequest, FaixaError> {
        if self.target_rank.is_empty() || self.evaluator.is_empty() {
            return Err(FaixaError::SerializationError(
                "target_rank and evaluator must be non-empty".to_string(),
            ));
        }
        if self.evaluator.len() > MAX_TEXT_LENGTH || self.notes.len() > MAX_TEXT_LENGTH {
            return Err(FaixaError::SerializationError(format!(
                "Text field exceeds maximum {} bytes",
                MAX_TEXT_LENGTH
            )));
        }
        if self.attendance_bps > 10_000 {
            return Err(FaixaError::SerializationError(format!(
                "attendance_bps {} exceeds 10000",
                self.attendance_bps
            )));
        }

        Ok(PromotionRequest {
            target_rank: self.target_rank.clone(),
            promoted_on: self.promoted_on,
            attendance_bps: self.attendance_bps,
            classes_attended: self.classes_attended,
            evaluator: self.evaluator.clone(),
            notes: self.notes.clone(),
        })
    }
}

/// JSON projection of a promotion log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionJson {
    pub prior_rank: Option<String>,
    pub new_rank: String,
    pub promoted_on: NaiveDate,
    pub attendance_bps: u32,
    pub classes_attended: u32,
    pub evaluator: String,
    pub notes: String,
}

impl From<&GraduationHistoryEntry> for PromotionJson {
    fn from(entry: &GraduationHistoryEntry) -> Self {
        Self {
            prior_rank: entry.prior_rank.clone(),
            new_rank: entry.new_rank.clone(),
            promoted_on: entry.promoted_on,
            attendance_bps: entry.attendance_bps,
            classes_attended: entry.classes_attended,
            evaluator: entry.evaluator.clone(),
            notes: entry.notes.clone(),
        }
    }
}

/// Promotion recording response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoteResponse {
    pub success: bool,
    pub promotion: Option<PromotionJson>,
    pub error: Option<String>,
}

impl PromoteResponse {
    pub fn success(entry: &GraduationHistoryEntry) -> Self {
        Self {
            success: true,
            promotion: Some(PromotionJson::from(entry)),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            promotion: None,
            error: Some(msg.into()),
        }
    }
}

/// Promotion history response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub promotions: Vec<PromotionJson>,
    pub error: Option<String>,
}

impl HistoryResponse {
    pub fn success(entries: &[GraduationHistoryEntry]) -> Self {
        Self {
            success: true,
            promotions: entries.iter().map(PromotionJson::from).collect(),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            promotions: vec![],
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// DEGREE REQUEST
// =============================================================================

/// Degree update request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DegreeRequest {
    pub degrees: u8,
    /// When set, the update fails with 409 if the stored state has moved.
    pub expected_version: Option<u64>,
}
