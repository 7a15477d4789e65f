//! Cycle structure of elementary and non-uniform 1D cellular automata.
//!
//! Each cell's next value is looked up in its own 8-bit rule, indexed by the
//! cell and its two neighbors. For small widths the whole state space can be
//! swept: every state is traced to the cycle it falls into, giving cycle
//! counts, a length histogram and whether one cycle visits every state.
//! Rule vectors can also be classified into six Wolfram-style classes and
//! searched for nonlinear substitutions that reach a maximal-length cycle.
//!
//! # Example
//!
//! ```
//! use unshape_hybrid_ca::{AnalysisConfig, Boundary, RuleVector, analyze_all, search_maximal};
//!
//! let rules = RuleVector::new(vec![90, 30, 51]).unwrap();
//! let summary = analyze_all(&rules, Boundary::Periodic).unwrap();
//! assert_eq!(summary.max_cycle_length, 8);
//! assert!(summary.is_maximal_length());
//!
//! // Replace the class II rule 150 with each nonlinear candidate.
//! let base = RuleVector::new(vec![90, 150, 51]).unwrap();
//! let outcome = search_maximal(&base, &AnalysisConfig::new(Boundary::Periodic)).unwrap();
//! assert_eq!(outcome.maximal.len(), 4);
//! ```

pub mod analysis;
pub mod automaton;
pub mod classify;
pub mod config;
pub mod cycle;
mod error;
pub mod graph;
pub mod rule;
pub mod search;
pub mod state;
pub mod sweep;

pub use analysis::{
    Maximality, StateSpaceSummary, SweepTrace, analyze_all, analyze_all_with_budget,
    is_maximal_length,
};
pub use automaton::{HybridCA, HybridCAConfig, StepHybridCA};
pub use classify::{
    ClassLabel, ClassSequence, ClassWalk, RuleInfo, WolframClass, class_sequence, classify,
    classify_batch, filter_notable,
};
pub use config::AnalysisConfig;
pub use cycle::{Cycle, Trajectory, find_cycle, minimum_step_budget, trace};
pub use error::CaError;
pub use graph::StateGraph;
pub use rule::{Boundary, RuleVector, apply_rule, elementary_rules, evolve, evolve_cells, is_linear};
pub use search::{
    CandidateProduct, SearchOutcome, search_batch, search_generated, search_maximal,
};
pub use state::{MAX_EXHAUSTIVE_WIDTH, MAX_WIDTH, format_state, pack, state_count, unpack};
pub use sweep::{analyze_batch, hybrid_sweep};
