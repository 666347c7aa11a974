//! # faixa-core
//!
//! The deterministic graduation rules engine for Faixa - THE RULES.
//!
//! This crate implements the academy's belt-progression semantics as a
//! minimal, deterministic rules layer: the curriculum table, the promotion
//! eligibility evaluator, the promotion recorder, and the degree updater,
//! over pluggable in-memory or disk-backed storage.
//!
//! ## Architectural Constraints
//!
//! The CORE:
//! - Is the ONLY place where graduation rules live (callers never re-derive them)
//! - Is deterministic: identical inputs always produce identical outputs
//! - Never reads ambient time; "today" is always an explicit input
//! - Has NO async, NO network dependencies (pure Rust)

// =============================================================================
// MODULES
// =============================================================================

pub mod curriculum;
pub mod degree;
pub mod eligibility;
pub mod promotion;
pub mod registry;
pub mod session;
pub mod storage;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    AttendanceRecord, EligibilitySnapshot, FaixaError, GraduationHistoryEntry, Program,
    StudentGraduationState, StudentId,
};

// =============================================================================
// RE-EXPORTS: Rules Engine
// =============================================================================

pub use curriculum::{RankSpec, default_rank, max_degrees, ordinal, rank_spec, ranks, successors};
pub use degree::set_degree;
pub use eligibility::{
    Clock, DEFAULT_WINDOW_MONTHS, Evaluator, FixedClock, MIN_ATTENDANCE_BPS,
    MIN_CLASSES_IN_WINDOW, MIN_MONTHS_IN_RANK, SystemClock, months_earlier, whole_months_between,
};
pub use promotion::{PromotionRequest, Recorder};
pub use registry::{GraduationStore, Registry};
pub use session::{Session, StorageBackend};
pub use storage::RedbRegistry;
