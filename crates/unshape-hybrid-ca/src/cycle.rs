//! Trajectory tracing and cycle detection from a single start state.
//!
//! The state space is finite and the transition deterministic, so every
//! trajectory ends in a cycle. A trajectory of length `preperiod + period`
//! visits `preperiod` transient states and then loops over `period` states.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::CaError;
use crate::rule::{Boundary, RuleVector, evolve};

/// Shape of the cycle a trajectory falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cycle {
    /// Steps taken before the first cycle state is reached.
    pub preperiod: usize,
    /// Number of distinct states on the cycle.
    pub period: usize,
}

impl Cycle {
    /// Total number of distinct states on the trajectory.
    pub fn path_len(&self) -> usize {
        self.preperiod + self.period
    }

    /// True if the start state lies on the cycle.
    pub fn is_pure(&self) -> bool {
        self.preperiod == 0
    }
}

/// States visited from a start state, up to the first repeat.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Trajectory {
    /// Distinct states in visiting order, the start state first.
    pub states: Vec<u32>,
    /// Where the trajectory closes on itself.
    pub cycle: Cycle,
}

impl Trajectory {
    /// The transient prefix that never recurs.
    pub fn transient_states(&self) -> &[u32] {
        &self.states[..self.cycle.preperiod]
    }

    /// The recurring states, in visiting order.
    pub fn cycle_states(&self) -> &[u32] {
        &self.states[self.cycle.preperiod..]
    }
}

/// Smallest budget for which [`find_cycle`] cannot miss a cycle: 2^width.
pub fn minimum_step_budget(width: usize) -> usize {
    1usize << width.min(usize::BITS as usize - 1)
}

/// Follows the trajectory from `start` for at most `max_steps` evolutions.
///
/// Each visited state is appended to an ordered list after scanning the
/// earlier entries for a match. A repeat of entry `k` at step `s` closes a
/// cycle with `preperiod = k` and `period = s - k`. Budgets below
/// [`minimum_step_budget`] may report [`CaError::CycleNotFound`] for
/// trajectories that do cycle.
pub fn trace(
    start: u32,
    rules: &RuleVector,
    boundary: Boundary,
    max_steps: usize,
) -> Result<Trajectory, CaError> {
    let width = rules.len();
    if start >> width != 0 {
        return Err(CaError::StateOutOfRange {
            state: start,
            width,
        });
    }
    if max_steps < minimum_step_budget(width) {
        warn!(
            max_steps,
            width, "step budget below 2^width, cycles may go undetected"
        );
    }

    let mut states: Vec<u32> = Vec::new();
    let mut current = start;

    for step in 0..=max_steps {
        if let Some(k) = states.iter().position(|&seen| seen == current) {
            return Ok(Trajectory {
                states,
                cycle: Cycle {
                    preperiod: k,
                    period: step - k,
                },
            });
        }
        states.push(current);
        current = evolve(current, rules, boundary);
    }

    Err(CaError::CycleNotFound { start, max_steps })
}

/// Returns the cycle reached from `start` within `max_steps` evolutions.
///
/// Never reports a zero-length cycle: an exhausted budget is an error.
pub fn find_cycle(
    start: u32,
    rules: &RuleVector,
    boundary: Boundary,
    max_steps: usize,
) -> Result<Cycle, CaError> {
    trace(start, rules, boundary, max_steps).map(|t| t.cycle)
}
