//! Rule vectors, boundary policies and the single-step transition function.
//!
//! Each cell's next value is looked up in its own 8-bit rule number, indexed
//! by the 3-bit neighborhood `left·4 + center·2 + right`. A uniform
//! (elementary) automaton uses one rule for every cell; a hybrid one may use
//! a different rule per position.

use std::fmt;
use std::ops::Index;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::CaError;
use crate::state::{MAX_WIDTH, cell, check_width};

/// How out-of-range neighbors of the edge cells are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Boundary {
    /// Missing neighbors read as 0.
    #[default]
    Null,
    /// Indices wrap modulo the width.
    Periodic,
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Boundary::Null => write!(f, "null"),
            Boundary::Periodic => write!(f, "periodic"),
        }
    }
}

/// Per-position rule numbers of a (possibly non-uniform) automaton.
///
/// Always holds between 1 and [`MAX_WIDTH`] rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<u8>", into = "Vec<u8>"))]
pub struct RuleVector(Vec<u8>);

impl RuleVector {
    /// Creates a rule vector, one rule per cell.
    pub fn new(rules: Vec<u8>) -> Result<Self, CaError> {
        check_width(rules.len(), MAX_WIDTH)?;
        Ok(Self(rules))
    }

    /// Creates a uniform (elementary) rule vector.
    pub fn uniform(rule: u8, width: usize) -> Result<Self, CaError> {
        Self::new(vec![rule; width])
    }

    /// Creates a rule vector from plain integers, rejecting values outside 0..=255.
    pub fn from_ints(rules: &[i64]) -> Result<Self, CaError> {
        let rules = rules
            .iter()
            .map(|&r| u8::try_from(r).map_err(|_| CaError::InvalidRule(r)))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(rules)
    }

    /// Returns a copy with `position` replaced by `rule`, or `None` if
    /// `position` is past the last cell.
    pub fn with_rule(&self, position: usize, rule: u8) -> Option<Self> {
        let mut rules = self.0.clone();
        *rules.get_mut(position)? = rule;
        Some(Self(rules))
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no cells.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Rule numbers, position 0 first.
    pub fn rules(&self) -> &[u8] {
        &self.0
    }

    /// True if every position uses the same rule.
    pub fn is_uniform(&self) -> bool {
        self.0.windows(2).all(|w| w[0] == w[1])
    }
}

impl Index<usize> for RuleVector {
    type Output = u8;

    fn index(&self, index: usize) -> &u8 {
        &self.0[index]
    }
}

impl TryFrom<Vec<u8>> for RuleVector {
    type Error = CaError;

    fn try_from(rules: Vec<u8>) -> Result<Self, CaError> {
        Self::new(rules)
    }
}

impl From<RuleVector> for Vec<u8> {
    fn from(rules: RuleVector) -> Self {
        rules.0
    }
}

impl fmt::Display for RuleVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, rule) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{rule}")?;
        }
        write!(f, "]")
    }
}

/// Looks up the next value of a cell in `rule` given its neighborhood.
#[inline]
pub fn apply_rule(rule: u8, left: bool, center: bool, right: bool) -> bool {
    let index = (left as u8) << 2 | (center as u8) << 1 | (right as u8);
    (rule >> index) & 1 == 1
}

/// Returns true if `rule` is affine over GF(2).
///
/// Affine rules compute `c ^ (a·left) ^ (b·center) ^ (d·right)` for fixed
/// bits; there are sixteen of them (90, 150, 60, 102, their complements,
/// and the trivial rules).
pub fn is_linear(rule: u8) -> bool {
    let bit = |index: u8| (rule >> index) & 1;
    let constant = bit(0);
    let right = bit(1) ^ constant;
    let center = bit(2) ^ constant;
    let left = bit(4) ^ constant;
    (0..8u8).all(|index| {
        let l = (index >> 2) & 1;
        let c = (index >> 1) & 1;
        let r = index & 1;
        bit(index) == constant ^ (left & l) ^ (center & c) ^ (right & r)
    })
}

/// Advances a packed state by one step.
///
/// `state` must fit in `rules.len()` bits; higher bits are ignored.
pub fn evolve(state: u32, rules: &RuleVector, boundary: Boundary) -> u32 {
    let width = rules.len();
    let mut next = 0u32;

    for i in 0..width {
        let (left, right) = match boundary {
            Boundary::Null => {
                let left = if i == 0 { 0 } else { cell(state, width, i - 1) };
                let right = if i + 1 == width {
                    0
                } else {
                    cell(state, width, i + 1)
                };
                (left, right)
            }
            Boundary::Periodic => (
                cell(state, width, (i + width - 1) % width),
                cell(state, width, (i + 1) % width),
            ),
        };

        let index = (left << 2) | (cell(state, width, i) << 1) | right;
        next = (next << 1) | ((u32::from(rules[i]) >> index) & 1);
    }

    next
}

/// Advances a cell array by one step.
///
/// Same transition as [`evolve`], on unpacked cells.
pub fn evolve_cells(
    cells: &[bool],
    rules: &RuleVector,
    boundary: Boundary,
) -> Result<Vec<bool>, CaError> {
    if cells.len() != rules.len() {
        return Err(CaError::InvalidLength {
            len: cells.len(),
            min: rules.len(),
            max: rules.len(),
        });
    }
    Ok(step_cells(cells, rules.rules(), boundary))
}

/// One step over cells of the same length as `rules`.
#[allow(clippy::needless_range_loop)]
pub(crate) fn step_cells(cells: &[bool], rules: &[u8], boundary: Boundary) -> Vec<bool> {
    let width = cells.len();
    let wrap = boundary == Boundary::Periodic;
    let mut next = vec![false; width];

    for i in 0..width {
        let left = if i == 0 {
            if wrap { cells[width - 1] } else { false }
        } else {
            cells[i - 1]
        };

        let center = cells[i];

        let right = if i == width - 1 {
            if wrap { cells[0] } else { false }
        } else {
            cells[i + 1]
        };

        next[i] = apply_rule(rules[i], left, center, right);
    }

    next
}

/// Well-known elementary rules.
pub mod elementary_rules {
    /// Rule 0 - every cell dies.
    pub const RULE_0: u8 = 0;

    /// Rule 30 - chaotic.
    pub const RULE_30: u8 = 30;

    /// Rule 90 - left XOR right, Sierpinski triangle.
    pub const RULE_90: u8 = 90;

    /// Rule 150 - left XOR center XOR right.
    pub const RULE_150: u8 = 150;

    /// Rule 204 - identity.
    pub const RULE_204: u8 = 204;
}
