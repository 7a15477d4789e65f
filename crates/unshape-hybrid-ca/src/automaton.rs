//! A stateful hybrid automaton, plus operation structs for building and running it.
//!
//! The configuration is held packed, the same way the analysis code sees
//! it, so a [`HybridCA`] steps with [`evolve`] and its states can be fed
//! straight to the cycle detector.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::cycle::{Cycle, Trajectory, find_cycle, minimum_step_budget, trace};
use crate::error::CaError;
use crate::rule::{Boundary, RuleVector, evolve};
use crate::state::{cell, pack};

/// 1D automaton with one rule per cell.
///
/// The width is fixed by the rule vector and the packed state never has
/// bits set beyond it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "HybridCARepr", into = "HybridCARepr")
)]
pub struct HybridCA {
    state: u32,
    rules: RuleVector,
    boundary: Boundary,
}

impl HybridCA {
    /// Creates an automaton with every cell dead.
    pub fn new(rules: RuleVector, boundary: Boundary) -> Self {
        Self {
            state: 0,
            rules,
            boundary,
        }
    }

    /// Creates an automaton from explicit cells, one per rule.
    pub fn from_cells(
        cells: &[bool],
        rules: RuleVector,
        boundary: Boundary,
    ) -> Result<Self, CaError> {
        if cells.len() != rules.len() {
            return Err(CaError::InvalidLength {
                len: cells.len(),
                min: rules.len(),
                max: rules.len(),
            });
        }
        Ok(Self {
            state: pack(cells)?,
            rules,
            boundary,
        })
    }

    /// Returns the width of the automaton.
    pub fn width(&self) -> usize {
        self.rules.len()
    }

    /// Returns the rule vector.
    pub fn rules(&self) -> &RuleVector {
        &self.rules
    }

    /// Returns the boundary policy.
    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    /// Sets the boundary policy.
    pub fn set_boundary(&mut self, boundary: Boundary) {
        self.boundary = boundary;
    }

    /// Returns the packed state, cell 0 most significant.
    pub fn state(&self) -> u32 {
        self.state
    }

    /// Replaces the packed state.
    pub fn set_state(&mut self, state: u32) -> Result<(), CaError> {
        let width = self.width();
        if state >> width != 0 {
            return Err(CaError::StateOutOfRange { state, width });
        }
        self.state = state;
        Ok(())
    }

    /// Returns the cells, cell 0 first.
    pub fn cells(&self) -> Vec<bool> {
        let width = self.width();
        (0..width)
            .map(|i| cell(self.state, width, i) == 1)
            .collect()
    }

    /// Sets a single live cell in the center.
    pub fn set_center(&mut self) {
        let width = self.width();
        self.state = 1 << (width - 1 - width / 2);
    }

    /// Randomizes the state. The same seed always gives the same state.
    pub fn randomize(&mut self, seed: u64) {
        let mask = (1u64 << self.width()) - 1;
        let mut rng = SimpleRng::new(seed);
        self.state = ((rng.next_u64() >> 32) & mask) as u32;
    }

    /// Advances the automaton by one step.
    pub fn step(&mut self) {
        self.state = evolve(self.state, &self.rules, self.boundary);
    }

    /// Advances multiple steps.
    pub fn steps(&mut self, n: usize) {
        for _ in 0..n {
            self.step();
        }
    }

    /// Records `generations` packed states, the current one first, and
    /// leaves the automaton after the last of them.
    pub fn run(&mut self, generations: usize) -> Vec<u32> {
        let mut states = Vec::with_capacity(generations);
        for _ in 0..generations {
            states.push(self.state);
            self.step();
        }
        states
    }

    /// Trajectory from the current state to its first repeat.
    pub fn trajectory(&self) -> Result<Trajectory, CaError> {
        trace(
            self.state,
            &self.rules,
            self.boundary,
            minimum_step_budget(self.width()),
        )
    }

    /// Cycle the current state falls into.
    pub fn cycle(&self) -> Result<Cycle, CaError> {
        find_cycle(
            self.state,
            &self.rules,
            self.boundary,
            minimum_step_budget(self.width()),
        )
    }
}

/// Serialized form of [`HybridCA`], with the state spelled out as cells.
#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct HybridCARepr {
    cells: Vec<bool>,
    rules: RuleVector,
    boundary: Boundary,
}

#[cfg(feature = "serde")]
impl TryFrom<HybridCARepr> for HybridCA {
    type Error = CaError;

    fn try_from(repr: HybridCARepr) -> Result<Self, CaError> {
        HybridCA::from_cells(&repr.cells, repr.rules, repr.boundary)
    }
}

#[cfg(feature = "serde")]
impl From<HybridCA> for HybridCARepr {
    fn from(ca: HybridCA) -> Self {
        Self {
            cells: ca.cells(),
            rules: ca.rules,
            boundary: ca.boundary,
        }
    }
}

/// 64-bit LCG for seeding initial states.
#[derive(Debug, Clone)]
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(1),
        }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state
    }
}

// ============================================================================
// Operation Structs
// ============================================================================

/// Configuration operation for creating a [`HybridCA`].
///
/// Use a seed for a reproducible random start, or None for a single live
/// center cell.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HybridCAConfig {
    /// Rule for each cell.
    pub rules: RuleVector,
    /// Edge handling.
    pub boundary: Boundary,
    /// Seed for random initialization (None = start with center cell only).
    pub seed: Option<u64>,
}

impl HybridCAConfig {
    /// Creates a new configuration with default settings.
    pub fn new(rules: RuleVector) -> Self {
        Self {
            rules,
            boundary: Boundary::default(),
            seed: None,
        }
    }

    /// Creates the configured automaton.
    pub fn apply(&self) -> HybridCA {
        let mut ca = HybridCA::new(self.rules.clone(), self.boundary);
        match self.seed {
            Some(seed) => ca.randomize(seed),
            None => ca.set_center(),
        }
        ca
    }
}

/// Operation to step a hybrid CA forward.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepHybridCA {
    /// Number of steps to advance.
    pub steps: usize,
}

impl StepHybridCA {
    /// Creates a new step operation.
    pub fn new(steps: usize) -> Self {
        Self { steps }
    }

    /// Returns a copy of `ca` advanced by the configured number of steps.
    pub fn apply(&self, ca: &HybridCA) -> HybridCA {
        let mut result = ca.clone();
        result.steps(self.steps);
        result
    }
}

impl Default for StepHybridCA {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rv(rules: &[u8]) -> RuleVector {
        RuleVector::new(rules.to_vec()).unwrap()
    }

    #[test]
    fn test_rule_90_from_center() {
        let mut ca = HybridCA::new(rv(&[90, 90, 90]), Boundary::Periodic);
        ca.set_center();
        assert_eq!(ca.state(), 0b010);
        assert_eq!(ca.cells(), vec![false, true, false]);
        assert_eq!(ca.run(3), vec![0b010, 0b101, 0b101]);
        assert_eq!(ca.state(), 0b101);
    }

    #[test]
    fn test_center_of_even_width() {
        let mut ca = HybridCA::new(rv(&[90, 150, 90, 150]), Boundary::Null);
        ca.set_center();
        assert_eq!(ca.cells(), vec![false, false, true, false]);
    }

    #[test]
    fn test_step_follows_packed_trace() {
        let mut ca = HybridCA::new(rv(&[90, 150, 90, 150]), Boundary::Null);
        ca.set_state(1).unwrap();
        let trajectory = ca.trajectory().unwrap();
        assert_eq!(ca.run(15), trajectory.states);
        assert_eq!(ca.state(), 1);
        assert_eq!(ca.cycle().unwrap().period, 15);
    }

    #[test]
    fn test_set_state_out_of_range() {
        let mut ca = HybridCA::new(rv(&[90, 150, 90]), Boundary::Null);
        assert!(matches!(
            ca.set_state(8),
            Err(CaError::StateOutOfRange { state: 8, width: 3 })
        ));
        assert_eq!(ca.state(), 0);
    }

    #[test]
    fn test_from_cells_length_mismatch() {
        assert!(matches!(
            HybridCA::from_cells(&[true, false, true], rv(&[90]), Boundary::Null),
            Err(CaError::InvalidLength { len: 3, .. })
        ));
        let ca = HybridCA::from_cells(&[true, false, true], rv(&[90, 90, 90]), Boundary::Null)
            .unwrap();
        assert_eq!(ca.state(), 0b101);
    }

    #[test]
    fn test_randomize_deterministic() {
        let rules = RuleVector::uniform(30, 24).unwrap();
        let mut a = HybridCA::new(rules.clone(), Boundary::Periodic);
        let mut b = HybridCA::new(rules, Boundary::Periodic);
        a.randomize(42);
        b.randomize(42);
        assert_eq!(a.state(), b.state());
        assert!(a.state() < 1 << 24);
    }

    #[test]
    fn test_ops() {
        let config = HybridCAConfig {
            boundary: Boundary::Periodic,
            ..HybridCAConfig::new(rv(&[90, 90, 90]))
        };
        let ca = config.apply();
        assert_eq!(ca.state(), 0b010);

        let stepped = StepHybridCA::new(2).apply(&ca);
        assert_eq!(stepped.state(), 0b101);
        assert_eq!(ca.state(), 0b010);
    }

    #[test]
    fn test_config_seeded() {
        let config = HybridCAConfig {
            seed: Some(7),
            ..HybridCAConfig::new(RuleVector::uniform(150, 16).unwrap())
        };
        assert_eq!(config.apply(), config.apply());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_rejects_mismatched_cells() {
        let json = r#"{"cells":[true,false,true],"rules":[90],"boundary":"Null"}"#;
        assert!(serde_json::from_str::<HybridCA>(json).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_rejects_too_wide() {
        let json = format!(
            r#"{{"cells":{:?},"rules":{:?},"boundary":"Null"}}"#,
            vec![true; 40],
            vec![90u8; 40]
        );
        assert!(serde_json::from_str::<HybridCA>(&json).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_roundtrip_steps() {
        let json = r#"{"cells":[false,true,false],"rules":[90,90,90],"boundary":"Periodic"}"#;
        let mut ca: HybridCA = serde_json::from_str(json).unwrap();
        ca.step();
        assert_eq!(ca.state(), 0b101);

        let encoded = serde_json::to_string(&ca).unwrap();
        assert!(encoded.contains(r#""cells":[true,false,true]"#));
        assert_eq!(serde_json::from_str::<HybridCA>(&encoded).unwrap(), ca);
    }
}
