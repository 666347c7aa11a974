//! # Degree Updater
//!
//! Day-to-day stripe awards: adjusts the degree count within the current
//! belt without touching rank, promotion dates, or history. This is the
//! simpler mutation path next to the promotion recorder, and it is
//! independent of belt eligibility — degree and belt promotion are separate
//! tracks.

use crate::curriculum;
use crate::types::{FaixaError, StudentGraduationState};

/// Overwrite the degree count, producing the updated state.
///
/// Pure; stores persist the result. The new count must satisfy
/// `0 <= new_count <= max_degrees(program, rank)`. Setting the current value
/// again succeeds and is a no-op apart from the version bump.
///
/// # Errors
///
/// - `DegreeOutOfRange` if the count exceeds the rank's maximum.
/// - `UnknownProgramOrRank` if the state's rank is not in the curriculum.
pub fn set_degree(
    state: &StudentGraduationState,
    new_count: u8,
) -> Result<StudentGraduationState, FaixaError> {
    let max = curriculum::max_degrees(state.program, &state.rank)?;
    if new_count > max {
        return Err(FaixaError::DegreeOutOfRange {
            rank: state.rank.clone(),
            requested: new_count,
            max,
        });
    }

    let mut updated = state.clone();
    updated.degrees = new_count;
    updated.version = updated.version.saturating_add(1);
    Ok(updated)
}

// =============================================================================
// TESTS
// =============================================================================
