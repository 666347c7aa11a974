//! # Belt Curriculum Table
//!
//! Static mapping of program → ordered belt sequence, with the degree
//! maximum and display color for each rank. This is configuration data,
//! not runtime state: every function here is side-effect-free and total
//! over the table, failing with `UnknownProgramOrRank` for pairs outside it.
//!
//! Only the rank order and degree maximums are behavioral; colors are
//! presentation metadata carried for display layers.

use crate::types::{FaixaError, Program};

// =============================================================================
// RANK SPECIFICATION
// =============================================================================

/// One entry in a program's belt sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankSpec {
    /// Rank name, unique within the owning program.
    pub name: &'static str,
    /// Display color (hex), not behavioral.
    pub color: &'static str,
    /// Maximum degree (stripe) count while holding this rank.
    pub max_degrees: u8,
}

const fn rank(name: &'static str, color: &'static str, max_degrees: u8) -> RankSpec {
    RankSpec {
        name,
        color,
        max_degrees,
    }
}

// =============================================================================
// PROGRAM CURRICULA
// =============================================================================

/// Adult progression. Four degrees per colored belt, six on Black.
const ADULT: &[RankSpec] = &[
    rank("White", "#F5F5F5", 4),
    rank("Blue", "#1E6FBA", 4),
    rank("Purple", "#6A0DAD", 4),
    rank("Brown", "#6B4226", 4),
    rank("Black", "#1A1A1A", 6),
];

/// Children progression. Longer sequence, up to twelve degrees per belt.
const CHILDREN: &[RankSpec] = &[
    rank("White", "#F5F5F5", 12),
    rank("Grey", "#9E9E9E", 12),
    rank("Grey-White", "#C9CDD1", 12),
    rank("Yellow", "#F3D43B", 12),
    rank("Yellow-White", "#F7E38A", 12),
    rank("Orange", "#EE8233", 12),
    rank("Orange-White", "#F3A869", 12),
    rank("Green", "#2F9E44", 12),
    rank("Green-White", "#7CC990", 12),
];

/// Juvenile progression. Up to ten degrees per belt.
const JUVENILE: &[RankSpec] = &[
    rank("White", "#F5F5F5", 10),
    rank("Blue", "#1E6FBA", 10),
    rank("Purple", "#6A0DAD", 10),
];

/// Master progression. Four degrees throughout.
const MASTER: &[RankSpec] = &[
    rank("White", "#F5F5F5", 4),
    rank("Blue", "#1E6FBA", 4),
    rank("Purple", "#6A0DAD", 4),
    rank("Brown", "#6B4226", 4),
    rank("Black", "#1A1A1A", 4),
];

// =============================================================================
// LOOKUPS
// =============================================================================

/// Get the ordered belt sequence for a program.
#[must_use]
pub fn ranks(program: Program) -> &'static [RankSpec] {
    match program {
        Program::Adult => ADULT,
        Program::Children => CHILDREN,
        Program::Juvenile => JUVENILE,
        Program::Master => MASTER,
    }
}

/// Get the first rank of a program's sequence (the registration default).
#[must_use]
pub fn default_rank(program: Program) -> &'static RankSpec {
    // Every curriculum above is non-empty.
    &ranks(program)[0]
}

/// Get a rank's ordinal position within its program's sequence.
pub fn ordinal(program: Program, name: &str) -> Result<usize, FaixaError> {
    ranks(program)
        .iter()
        .position(|r| r.name == name)
        .ok_or_else(|| FaixaError::UnknownProgramOrRank(format!("{}/{}", program, name)))
}

/// Look up a rank by name within a program.
pub fn rank_spec(program: Program, name: &str) -> Result<&'static RankSpec, FaixaError> {
    let position = ordinal(program, name)?;
    Ok(&ranks(program)[position])
}

/// Get the ordered candidate next ranks after `name` in `program`.
///
/// Exactly one element for every non-terminal rank (the immediate next rank
/// in the sequence), empty for the program's terminal rank.
pub fn successors(program: Program, name: &str) -> Result<Vec<&'static RankSpec>, FaixaError> {
    let position = ordinal(program, name)?;
    Ok(ranks(program)
        .get(position + 1)
        .map(|next| vec![next])
        .unwrap_or_default())
}

/// Get the maximum degree count for a rank.
pub fn max_degrees(program: Program, name: &str) -> Result<u8, FaixaError> {
    Ok(rank_spec(program, name)?.max_degrees)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_non_terminal_rank_has_exactly_one_successor() {
        for program in Program::ALL {
            let sequence = ranks(program);
            for (position, spec) in sequence.iter().enumerate() {
                let next = successors(program, spec.name).expect("known rank");
                if position + 1 < sequence.len() {
                    assert_eq!(next.len(), 1, "{}/{}", program, spec.name);
                    assert_eq!(next[0].name, sequence[position + 1].name);
                } else {
                    assert!(next.is_empty(), "{}/{} is terminal", program, spec.name);
                }
            }
        }
    }

    #[test]
    fn same_rank_name_differs_across_programs() {
        let adult = successors(Program::Adult, "White").expect("adult white");
        let children = successors(Program::Children, "White").expect("children white");
        assert_eq!(adult[0].name, "Blue");
        assert_eq!(children[0].name, "Grey");

        assert_eq!(max_degrees(Program::Adult, "White").expect("adult"), 4);
        assert_eq!(max_degrees(Program::Children, "White").expect("children"), 12);
    }

    #[test]
    fn default_rank_is_first_in_sequence() {
        for program in Program::ALL {
            assert_eq!(default_rank(program).name, ranks(program)[0].name);
        }
    }

    #[test]
    fn unknown_rank_is_rejected() {
        let result = successors(Program::Adult, "Crimson");
        assert!(matches!(result, Err(FaixaError::UnknownProgramOrRank(_))));

        let result = max_degrees(Program::Juvenile, "Black");
        assert!(matches!(result, Err(FaixaError::UnknownProgramOrRank(_))));
    }

    #[test]
    fn rank_names_unique_within_program() {
        for program in Program::ALL {
            let sequence = ranks(program);
            for (i, a) in sequence.iter().enumerate() {
                for b in &sequence[i + 1..] {
                    assert_ne!(a.name, b.name, "duplicate in {}", program);
                }
            }
        }
    }
}
