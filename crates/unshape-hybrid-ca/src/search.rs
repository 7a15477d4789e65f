//! Exhaustive nonlinear-rule substitution at class II and class V positions.
//!
//! A classified rule vector flags the positions read in class II or class V.
//! Each flagged position is replaced by every member of its class's
//! candidate list, and every combination is analyzed. There is no pruning:
//! the search tests the full cartesian product.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
#[cfg(feature = "serde")]
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::classify::{ClassSequence, ClassWalk, WolframClass, class_sequence, filter_notable};
use crate::config::AnalysisConfig;
use crate::error::CaError;
use crate::rule::RuleVector;
use crate::state::state_count;

/// Nonlinear replacements for a class II position.
pub const NONLINEAR_CLASS_II: [u8; 8] = [30, 45, 75, 120, 135, 180, 210, 225];

/// Replacements for a class V position.
pub const NONLINEAR_CLASS_V: [u8; 14] = [
    51, 204, 85, 170, 102, 153, 86, 89, 101, 106, 149, 154, 166, 169,
];

/// Replacement list for a position read in `class`; empty for non-replaceable classes.
pub fn candidates_for(class: WolframClass) -> &'static [u8] {
    match class {
        WolframClass::II => &NONLINEAR_CLASS_II,
        WolframClass::V => &NONLINEAR_CLASS_V,
        _ => &[],
    }
}

/// Mixed-radix enumeration of substituted rule vectors.
///
/// The first slot is the most significant digit, so candidates come out in
/// lexicographic order of list indices. With no slots the product holds a
/// single candidate, the base vector itself.
#[derive(Debug, Clone)]
pub struct CandidateProduct {
    base: RuleVector,
    slots: Vec<(usize, &'static [u8])>,
    digits: Vec<usize>,
    remaining: u128,
}

impl CandidateProduct {
    /// Creates the product over `(position, replacement list)` slots.
    ///
    /// Fails with [`CaError::PositionOutOfRange`] if a slot lies past the
    /// last cell of `base`.
    pub fn new(base: RuleVector, slots: Vec<(usize, &'static [u8])>) -> Result<Self, CaError> {
        let width = base.len();
        if let Some(&(position, _)) = slots.iter().find(|(position, _)| *position >= width) {
            return Err(CaError::PositionOutOfRange { position, width });
        }

        let remaining = slots
            .iter()
            .map(|(_, list)| list.len() as u128)
            .try_fold(1u128, |acc, len| acc.checked_mul(len))
            .unwrap_or(u128::MAX);
        let digits = vec![0; slots.len()];
        Ok(Self {
            base,
            slots,
            digits,
            remaining,
        })
    }

    /// Creates the product over the replaceable positions of `sequence`.
    pub fn from_sequence(base: RuleVector, sequence: &ClassSequence) -> Result<Self, CaError> {
        let slots = sequence
            .replaceable_positions()
            .into_iter()
            .map(|(position, class)| (position, candidates_for(class)))
            .collect();
        Self::new(base, slots)
    }

    /// Number of candidates not yet produced.
    ///
    /// Saturates at `u128::MAX`.
    pub fn len(&self) -> u128 {
        self.remaining
    }

    /// True once every candidate has been produced.
    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }

    fn advance(&mut self) {
        for (digit, (_, list)) in self.digits.iter_mut().zip(&self.slots).rev() {
            *digit += 1;
            if *digit < list.len() {
                return;
            }
            *digit = 0;
        }
    }
}

impl Iterator for CandidateProduct {
    type Item = RuleVector;

    fn next(&mut self) -> Option<RuleVector> {
        if self.remaining == 0 {
            return None;
        }

        let mut candidate = self.base.clone();
        for (&digit, &(position, list)) in self.digits.iter().zip(&self.slots) {
            candidate = candidate.with_rule(position, list[digit])?;
        }

        self.remaining -= 1;
        self.advance();
        Some(candidate)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

/// Result of a replacement search for one base vector.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SearchOutcome {
    /// The vector the substitutions were applied to.
    pub base: RuleVector,
    /// Its class sequence.
    pub sequence: ClassSequence,
    /// Substituted positions and the class each was read in.
    pub positions: Vec<(usize, WolframClass)>,
    /// Number of candidate vectors analyzed.
    pub candidates_tested: u128,
    /// Candidates meeting the configured maximality criterion, in enumeration order.
    pub maximal: Vec<RuleVector>,
}

impl SearchOutcome {
    /// True if at least one candidate was maximal.
    pub fn found(&self) -> bool {
        !self.maximal.is_empty()
    }
}

fn check_candidate(candidate: &RuleVector, config: &AnalysisConfig) -> bool {
    match config.is_hit(candidate) {
        Ok(hit) => hit,
        Err(error) => {
            warn!(rules = %candidate, %error, "candidate analysis failed");
            false
        }
    }
}

/// Searches the substitutions of `base` for vectors with a maximal-length cycle.
///
/// Fails if `base` cannot be classified, is too wide to analyze, or its
/// product exceeds [`AnalysisConfig::candidate_limit`]. Individual candidates
/// that fail analysis are logged and counted as misses.
pub fn search_maximal(
    base: &RuleVector,
    config: &AnalysisConfig,
) -> Result<SearchOutcome, CaError> {
    state_count(base.len())?;

    let sequence = class_sequence(base)?;
    let positions = sequence.replaceable_positions();
    let product = CandidateProduct::from_sequence(base.clone(), &sequence)?;
    let candidates_tested = product.len();

    if let Some(limit) = config.candidate_limit {
        if candidates_tested > limit {
            return Err(CaError::SearchTooLarge {
                candidates: candidates_tested,
                limit,
            });
        }
    }

    debug!(
        rules = %base,
        flagged = positions.len(),
        terminal_valid = sequence.terminal_valid,
        candidates = candidates_tested,
        "starting replacement search"
    );

    #[cfg(feature = "parallel")]
    let maximal: Vec<RuleVector> = {
        let candidates: Vec<RuleVector> = product.collect();
        candidates
            .into_par_iter()
            .filter(|candidate| check_candidate(candidate, config))
            .collect()
    };

    #[cfg(not(feature = "parallel"))]
    let maximal: Vec<RuleVector> = product
        .filter(|candidate| check_candidate(candidate, config))
        .collect();

    info!(
        rules = %base,
        candidates = candidates_tested,
        hits = maximal.len(),
        "replacement search finished"
    );

    Ok(SearchOutcome {
        base: base.clone(),
        sequence,
        positions,
        candidates_tested,
        maximal,
    })
}

/// Runs [`search_maximal`] on each vector; one failure does not stop the rest.
pub fn search_batch(
    vectors: &[RuleVector],
    config: &AnalysisConfig,
) -> Vec<Result<SearchOutcome, CaError>> {
    let results: Vec<Result<SearchOutcome, CaError>> = vectors
        .iter()
        .map(|base| search_maximal(base, config))
        .collect();

    let failed = results.iter().filter(|r| r.is_err()).count();
    let hits: usize = results
        .iter()
        .filter_map(|r| r.as_ref().ok())
        .map(|outcome| outcome.maximal.len())
        .sum();
    info!(vectors = vectors.len(), failed, hits, "search batch finished");

    results
}

/// Walks the class tables for every vector of `width` rules over `alphabet`
/// and searches the notable ones.
///
/// Only vectors with a valid terminal rule are walked (see [`ClassWalk`]).
/// The walk counts against [`AnalysisConfig::candidate_limit`] and fails
/// with [`CaError::SearchTooLarge`] once it yields more vectors than that.
pub fn search_generated(
    width: usize,
    alphabet: &[u8],
    config: &AnalysisConfig,
) -> Result<Vec<Result<SearchOutcome, CaError>>, CaError> {
    state_count(width)?;

    let mut walked = Vec::new();
    for rules in ClassWalk::new(width, alphabet)? {
        walked.push(rules);
        if let Some(limit) = config.candidate_limit {
            if walked.len() as u128 > limit {
                return Err(CaError::SearchTooLarge {
                    candidates: walked.len() as u128,
                    limit,
                });
            }
        }
    }

    let notable: Vec<RuleVector> = filter_notable(&walked)
        .into_iter()
        .map(|(rules, _)| rules)
        .collect();
    debug!(
        width,
        walked = walked.len(),
        notable = notable.len(),
        "walked class tables"
    );

    Ok(search_batch(&notable, config))
}
