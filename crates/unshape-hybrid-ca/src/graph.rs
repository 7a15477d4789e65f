//! The full state-transition graph of an automaton.
//!
//! Every state has exactly one successor, so the graph decomposes into
//! attractor cycles, each fed by a basin of transient trees.

use tracing::debug;

use crate::error::CaError;
use crate::rule::{Boundary, RuleVector, evolve};
use crate::state::state_count;

/// Successor table over all 2^n states plus its attractor decomposition.
#[derive(Debug, Clone)]
pub struct StateGraph {
    width: usize,
    successors: Vec<u32>,
    in_degree: Vec<u32>,
    /// Cycles, each rotated to start at its smallest state, sorted by that state.
    attractors: Vec<Vec<u32>>,
    /// Index into `attractors` for every state.
    basin_of: Vec<usize>,
    /// Steps until the state reaches its attractor.
    transient: Vec<usize>,
}

impl StateGraph {
    /// Builds the graph of `rules` under `boundary`.
    pub fn build(rules: &RuleVector, boundary: Boundary) -> Result<Self, CaError> {
        let width = rules.len();
        let count = state_count(width)?;

        let successors: Vec<u32> = (0..count as u32)
            .map(|state| evolve(state, rules, boundary))
            .collect();

        let mut in_degree = vec![0u32; count];
        for &next in &successors {
            in_degree[next as usize] += 1;
        }

        let attractors = find_attractors(&successors);

        let mut basin_of = vec![usize::MAX; count];
        let mut transient = vec![usize::MAX; count];
        for (id, cycle) in attractors.iter().enumerate() {
            for &state in cycle {
                basin_of[state as usize] = id;
                transient[state as usize] = 0;
            }
        }

        let mut path = Vec::new();
        for start in 0..count {
            let mut state = start;
            while transient[state] == usize::MAX {
                path.push(state);
                state = successors[state] as usize;
            }
            let (id, mut depth) = (basin_of[state], transient[state]);
            while let Some(s) = path.pop() {
                depth += 1;
                basin_of[s] = id;
                transient[s] = depth;
            }
        }

        debug!(
            rules = %rules,
            %boundary,
            attractors = attractors.len(),
            "built state graph"
        );

        Ok(Self {
            width,
            successors,
            in_degree,
            attractors,
            basin_of,
            transient,
        })
    }

    /// Number of cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of states, 2^width.
    pub fn state_count(&self) -> usize {
        self.successors.len()
    }

    /// Next state of `state`, or `None` if out of range.
    pub fn successor(&self, state: u32) -> Option<u32> {
        self.successors.get(state as usize).copied()
    }

    /// Number of predecessors of `state`.
    pub fn in_degree(&self, state: u32) -> Option<u32> {
        self.in_degree.get(state as usize).copied()
    }

    /// All cycles, each starting at its smallest state, ordered by that state.
    pub fn attractors(&self) -> &[Vec<u32>] {
        &self.attractors
    }

    /// Index into [`attractors`](Self::attractors) that `state` ends in.
    pub fn attractor_of(&self, state: u32) -> Option<usize> {
        self.basin_of.get(state as usize).copied()
    }

    /// Number of states draining into each attractor, cycle states included.
    pub fn basin_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.attractors.len()];
        for &id in &self.basin_of {
            sizes[id] += 1;
        }
        sizes
    }

    /// Steps from `state` to the first state on its attractor.
    pub fn transient_length(&self, state: u32) -> Option<usize> {
        self.transient.get(state as usize).copied()
    }

    /// Longest transient over all states.
    pub fn max_transient_length(&self) -> usize {
        self.transient.iter().copied().max().unwrap_or(0)
    }

    /// States with no predecessor.
    pub fn garden_of_eden_count(&self) -> usize {
        self.in_degree.iter().filter(|&&d| d == 0).count()
    }

    /// True if the transition is a bijection, i.e. every state lies on a cycle.
    pub fn is_reversible(&self) -> bool {
        self.in_degree.iter().all(|&d| d == 1)
    }
}

fn find_attractors(successors: &[u32]) -> Vec<Vec<u32>> {
    const NEW: u8 = 0;
    const ON_PATH: u8 = 1;
    const DONE: u8 = 2;

    let mut status = vec![NEW; successors.len()];
    let mut attractors = Vec::new();
    let mut path = Vec::new();

    for start in 0..successors.len() {
        if status[start] != NEW {
            continue;
        }

        let mut state = start;
        while status[state] == NEW {
            status[state] = ON_PATH;
            path.push(state);
            state = successors[state] as usize;
        }

        if status[state] == ON_PATH {
            if let Some(pos) = path.iter().position(|&s| s == state) {
                let mut cycle: Vec<u32> = path[pos..].iter().map(|&s| s as u32).collect();
                if let Some(min_at) = (0..cycle.len()).min_by_key(|&i| cycle[i]) {
                    cycle.rotate_left(min_at);
                }
                attractors.push(cycle);
            }
        }

        for s in path.drain(..) {
            status[s] = DONE;
        }
    }

    attractors.sort_by_key(|cycle| cycle[0]);
    attractors
}
