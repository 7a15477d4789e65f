//! Batch drivers over many rule vectors.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::info;

use crate::analysis::{StateSpaceSummary, analyze_all};
use crate::error::CaError;
use crate::rule::{Boundary, RuleVector};
use crate::state::{MAX_EXHAUSTIVE_WIDTH, check_width};

/// One analyzed vector of a batch.
pub type BatchEntry = (RuleVector, Result<StateSpaceSummary, CaError>);

/// The hybrid {90, 150} vector for `combo`: bit `i` selects rule 150 at position `i`.
pub fn hybrid_vector(combo: u32, width: usize) -> Result<RuleVector, CaError> {
    let rules = (0..width)
        .map(|i| if (combo >> i) & 1 == 1 { 150 } else { 90 })
        .collect();
    RuleVector::new(rules)
}

/// Analyzes each vector independently, preserving input order.
pub fn analyze_batch(vectors: &[RuleVector], boundary: Boundary) -> Vec<BatchEntry> {
    #[cfg(feature = "parallel")]
    let entries: Vec<BatchEntry> = vectors
        .par_iter()
        .map(|rules| (rules.clone(), analyze_all(rules, boundary)))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let entries: Vec<BatchEntry> = vectors
        .iter()
        .map(|rules| (rules.clone(), analyze_all(rules, boundary)))
        .collect();

    let maximal = entries
        .iter()
        .filter(|(_, summary)| summary.as_ref().is_ok_and(|s| s.is_maximal_length()))
        .count();
    let failed = entries.iter().filter(|(_, s)| s.is_err()).count();
    info!(
        vectors = vectors.len(),
        %boundary,
        maximal,
        failed,
        "analyzed batch"
    );

    entries
}

/// Analyzes all 2^width hybrid {90, 150} vectors, in combination-index order.
pub fn hybrid_sweep(width: usize, boundary: Boundary) -> Result<Vec<BatchEntry>, CaError> {
    check_width(width, MAX_EXHAUSTIVE_WIDTH)?;

    let vectors = (0..1u32 << width)
        .map(|combo| hybrid_vector(combo, width))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(analyze_batch(&vectors, boundary))
}
