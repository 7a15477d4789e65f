//! Analysis settings shared by the exhaustive sweep and the replacement search.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::analysis::{Maximality, StateSpaceSummary, analyze_all_with_budget};
use crate::cycle::minimum_step_budget;
use crate::error::CaError;
use crate::rule::{Boundary, RuleVector};

/// Default cap on the number of candidates a replacement search may test.
pub const DEFAULT_CANDIDATE_LIMIT: u128 = 1 << 20;

/// How rule vectors are analyzed and what counts as a hit.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnalysisConfig {
    /// Boundary policy for every evolution.
    pub boundary: Boundary,
    /// Per-trace step budget (None = 2^width).
    pub step_budget: Option<usize>,
    /// Which cycle length counts as maximal.
    pub criterion: Maximality,
    /// Largest search space a replacement search will enumerate (None = unbounded).
    pub candidate_limit: Option<u128>,
}

impl AnalysisConfig {
    /// Creates a configuration with default settings for `boundary`.
    pub fn new(boundary: Boundary) -> Self {
        Self {
            boundary,
            step_budget: None,
            criterion: Maximality::Full,
            candidate_limit: Some(DEFAULT_CANDIDATE_LIMIT),
        }
    }

    /// Sets the maximality criterion.
    pub fn with_criterion(mut self, criterion: Maximality) -> Self {
        self.criterion = criterion;
        self
    }

    /// Sets an explicit step budget.
    pub fn with_step_budget(mut self, max_steps: usize) -> Self {
        self.step_budget = Some(max_steps);
        self
    }

    /// Sets the candidate limit.
    pub fn with_candidate_limit(mut self, limit: Option<u128>) -> Self {
        self.candidate_limit = limit;
        self
    }

    /// Step budget used for an automaton of `width` cells.
    pub fn step_budget_for(&self, width: usize) -> usize {
        self.step_budget
            .unwrap_or_else(|| minimum_step_budget(width))
    }

    /// Analyzes the full state space of `rules` with these settings.
    pub fn analyze(&self, rules: &RuleVector) -> Result<StateSpaceSummary, CaError> {
        analyze_all_with_budget(rules, self.boundary, self.step_budget_for(rules.len()))
    }

    /// Analyzes `rules` and checks the result against [`criterion`](Self::criterion).
    pub fn is_hit(&self, rules: &RuleVector) -> Result<bool, CaError> {
        Ok(self.analyze(rules)?.satisfies(self.criterion))
    }

    /// Parses a configuration from JSON; missing fields take their defaults.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, CaError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the configuration as pretty-printed JSON.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, CaError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::new(Boundary::Null)
    }
}
