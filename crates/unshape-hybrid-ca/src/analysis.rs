//! Exhaustive cycle analysis over the full state space.
//!
//! Every state in `[0, 2^n)` is swept in ascending order. Unvisited states
//! are traced with the cycle detector and the traced path is marked visited
//! until it runs into an already-marked state, so each state is marked
//! exactly once. A traced cycle whose entry state was already marked drains
//! into a known cycle and is not counted again.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cycle::{Cycle, minimum_step_budget, trace};
use crate::error::CaError;
use crate::rule::{Boundary, RuleVector};
use crate::state::state_count;

/// Which cycle length counts as maximal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Maximality {
    /// One cycle through all 2^n states.
    #[default]
    Full,
    /// One cycle through the 2^n - 1 nonzero states.
    ///
    /// Linear rules under a null boundary always fix the zero state, so
    /// this is the best they can do.
    ExcludingZero,
}

impl Maximality {
    /// Cycle length this criterion requires for `width` cells.
    pub fn target(&self, width: usize) -> usize {
        let states = minimum_step_budget(width);
        match self {
            Maximality::Full => states,
            Maximality::ExcludingZero => states - 1,
        }
    }
}

/// One sweep step: a start state that was still unvisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SweepTrace {
    /// State the trace started from.
    pub start: u32,
    /// Cycle reached from `start`.
    pub cycle: Cycle,
    /// States this trace marked for the first time.
    pub newly_marked: usize,
    /// Whether the cycle had not been seen by an earlier trace.
    pub new_cycle: bool,
}

/// Cycle structure of one rule vector over its whole state space.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StateSpaceSummary {
    /// Number of cells.
    pub width: usize,
    /// Number of distinct cycles.
    pub total_cycles: usize,
    /// Longest cycle period.
    pub max_cycle_length: usize,
    /// Period -> number of distinct cycles with that period.
    pub histogram: BTreeMap<usize, usize>,
    /// One entry per traced start state, in sweep order.
    pub traces: Vec<SweepTrace>,
    /// Total states marked; always 2^width after a completed sweep.
    pub states_marked: usize,
}

impl StateSpaceSummary {
    /// Size of the state space, 2^width.
    pub fn state_count(&self) -> usize {
        minimum_step_budget(self.width)
    }

    /// True if one cycle visits every state.
    pub fn is_maximal_length(&self) -> bool {
        self.satisfies(Maximality::Full)
    }

    /// True if the longest cycle meets `criterion`.
    pub fn satisfies(&self, criterion: Maximality) -> bool {
        self.max_cycle_length == criterion.target(self.width)
    }

    /// Number of states lying on some cycle.
    pub fn cyclic_states(&self) -> usize {
        self.histogram
            .iter()
            .map(|(period, count)| period * count)
            .sum()
    }
}

/// Analyzes every state of `rules` with the default budget of 2^n steps.
pub fn analyze_all(rules: &RuleVector, boundary: Boundary) -> Result<StateSpaceSummary, CaError> {
    analyze_all_with_budget(rules, boundary, minimum_step_budget(rules.len()))
}

/// Analyzes every state of `rules`, tracing each start for at most `max_steps`.
///
/// Fails with [`CaError::InvalidLength`] beyond
/// [`MAX_EXHAUSTIVE_WIDTH`](crate::state::MAX_EXHAUSTIVE_WIDTH) cells and with
/// [`CaError::CycleNotFound`] if the budget is too small for some trace.
pub fn analyze_all_with_budget(
    rules: &RuleVector,
    boundary: Boundary,
    max_steps: usize,
) -> Result<StateSpaceSummary, CaError> {
    let width = rules.len();
    let count = state_count(width)?;
    let mut visited = vec![false; count];

    let mut summary = StateSpaceSummary {
        width,
        total_cycles: 0,
        max_cycle_length: 0,
        histogram: BTreeMap::new(),
        traces: Vec::new(),
        states_marked: 0,
    };

    for start in 0..count as u32 {
        if visited[start as usize] {
            continue;
        }

        let trajectory = trace(start, rules, boundary, max_steps)?;
        let cycle = trajectory.cycle;
        let entry = trajectory.states[cycle.preperiod];
        let new_cycle = !visited[entry as usize];

        if new_cycle {
            summary.total_cycles += 1;
            summary.max_cycle_length = summary.max_cycle_length.max(cycle.period);
            *summary.histogram.entry(cycle.period).or_insert(0) += 1;
        }

        // Successors of a marked state are marked, so stop at the first one.
        let mut newly_marked = 0;
        for &state in &trajectory.states {
            let slot = &mut visited[state as usize];
            if *slot {
                break;
            }
            *slot = true;
            newly_marked += 1;
        }

        summary.states_marked += newly_marked;
        summary.traces.push(SweepTrace {
            start,
            cycle,
            newly_marked,
            new_cycle,
        });
    }

    debug!(
        rules = %rules,
        %boundary,
        total_cycles = summary.total_cycles,
        max_cycle_length = summary.max_cycle_length,
        "analyzed state space"
    );

    Ok(summary)
}

/// Convenience predicate: does `rules` have a cycle through all 2^n states?
pub fn is_maximal_length(rules: &RuleVector, boundary: Boundary) -> Result<bool, CaError> {
    Ok(analyze_all(rules, boundary)?.is_maximal_length())
}
