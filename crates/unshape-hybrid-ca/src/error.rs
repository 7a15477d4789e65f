//! Error types.

use thiserror::Error;

use crate::classify::WolframClass;

/// Errors that can occur while evolving, analyzing or classifying automata.
#[derive(Debug, Error)]
pub enum CaError {
    /// Cell count outside the range an operation supports.
    #[error("invalid length {len}: expected between {min} and {max} cells")]
    InvalidLength {
        /// Requested number of cells.
        len: usize,
        /// Smallest supported number of cells.
        min: usize,
        /// Largest supported number of cells.
        max: usize,
    },

    /// Position past the last cell of a rule vector.
    #[error("position {position} is out of range for {width} cells")]
    PositionOutOfRange {
        /// Requested position.
        position: usize,
        /// Number of cells.
        width: usize,
    },

    /// Rule number outside 0..=255.
    #[error("rule {0} is out of range 0..=255")]
    InvalidRule(i64),

    /// Packed state with bits beyond the automaton width.
    #[error("state {state} does not fit in {width} cells")]
    StateOutOfRange {
        /// Offending packed state.
        state: u32,
        /// Automaton width.
        width: usize,
    },

    /// The low nibble of the first rule has no entry in the seed table.
    #[error("unrecognized seed: rule {rule} has low nibble {key}")]
    UnrecognizedSeed {
        /// First rule of the vector.
        rule: u8,
        /// Its low four bits.
        key: u8,
    },

    /// The transition table of `class` has no entry for `rule`.
    #[error("unknown transition: class {class} has no entry for rule {rule} at position {position}")]
    UnknownTransition {
        /// Class context at the failing position.
        class: WolframClass,
        /// Rule found at that position.
        rule: u8,
        /// Position in the rule vector.
        position: usize,
    },

    /// The step budget ran out before any state repeated.
    #[error("no cycle found from state {start} within {max_steps} steps")]
    CycleNotFound {
        /// Start state of the trace.
        start: u32,
        /// Budget that was exhausted.
        max_steps: usize,
    },

    /// Replacement search space larger than the configured limit.
    #[error("search space of {candidates} candidates exceeds limit of {limit}")]
    SearchTooLarge {
        /// Number of candidate vectors.
        candidates: u128,
        /// Configured limit.
        limit: u128,
    },

    /// Configuration (de)serialization failed.
    #[cfg(feature = "serde")]
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}
