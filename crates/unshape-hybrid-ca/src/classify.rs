//! Wolfram-style class assignment for rules and rule vectors.
//!
//! A rule vector is read left to right as a walk through six classes. The
//! low nibble of the first rule picks the starting class; each interior
//! rule is looked up in the current class's transition table, which names
//! the class the next position is read in. The first and last positions
//! carry no class ("don't care").
//!
//! All tables are immutable constants, grouped the way the reference tables
//! list them: one slice of `(rules, next class)` groups per class.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CaError;
use crate::rule::{RuleVector, is_linear};
use crate::state::MAX_WIDTH;

/// One of the six rule classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WolframClass {
    I,
    II,
    III,
    IV,
    V,
    VI,
}

impl WolframClass {
    /// All classes in order.
    pub const ALL: [WolframClass; 6] = [
        WolframClass::I,
        WolframClass::II,
        WolframClass::III,
        WolframClass::IV,
        WolframClass::V,
        WolframClass::VI,
    ];

    /// Roman numeral of the class.
    pub fn as_str(&self) -> &'static str {
        match self {
            WolframClass::I => "I",
            WolframClass::II => "II",
            WolframClass::III => "III",
            WolframClass::IV => "IV",
            WolframClass::V => "V",
            WolframClass::VI => "VI",
        }
    }
}

impl fmt::Display for WolframClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Class assigned to one position of a rule vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ClassLabel {
    /// Edge positions, which carry no class.
    DontCare,
    /// Class context the position's rule is read in.
    Class(WolframClass),
}

impl ClassLabel {
    /// The class, unless this is a don't-care position.
    pub fn class(&self) -> Option<WolframClass> {
        match self {
            ClassLabel::DontCare => None,
            ClassLabel::Class(class) => Some(*class),
        }
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassLabel::DontCare => f.write_str("DC"),
            ClassLabel::Class(class) => class.fmt(f),
        }
    }
}

mod tables {
    use super::WolframClass::{self, I, II, III, IV, V, VI};

    pub(super) type Group = (&'static [u8], WolframClass);

    pub(super) const CLASS_I: &[Group] = &[
        (&[51, 204, 60, 195], I),
        (&[85, 90, 165, 170], II),
        (&[102, 105, 150, 153], III),
        (&[53, 58, 83, 92, 163, 172, 197, 202], IV),
        (&[54, 57, 99, 108, 147, 156, 198, 201], V),
        (&[86, 89, 101, 106, 149, 154, 166, 169], VI),
    ];

    pub(super) const CLASS_II: &[Group] = &[(
        &[
            15, 30, 45, 60, 75, 90, 105, 120, 135, 150, 165, 180, 195, 210, 225, 240,
        ],
        I,
    )];

    pub(super) const CLASS_III: &[Group] = &[
        (&[51, 204, 15, 240], I),
        (&[85, 105, 150, 170], II),
        (&[90, 102, 153, 165], III),
        (&[23, 43, 77, 113, 142, 178, 212, 232], IV),
        (&[27, 39, 78, 114, 141, 177, 216, 228], V),
        (&[86, 89, 101, 106, 149, 154, 166, 169], VI),
    ];

    pub(super) const CLASS_IV: &[Group] = &[
        (&[60, 195], I),
        (&[90, 165], IV),
        (&[105, 150], V),
    ];

    pub(super) const CLASS_V: &[Group] = &[
        (&[51, 204], I),
        (&[85, 170], II),
        (&[102, 153], III),
        (
            &[86, 89, 90, 101, 105, 106, 149, 150, 154, 165, 166, 169],
            V,
        ),
    ];

    pub(super) const CLASS_VI: &[Group] = &[
        (&[15, 240], I),
        (&[105, 150], IV),
        (&[90, 165], V),
    ];

    /// Low nibble of the first rule -> starting class.
    pub(super) const SEED: [(u8, WolframClass); 6] =
        [(3, I), (12, I), (5, II), (10, II), (6, III), (9, III)];

    /// Rules with a fixed class and a short description.
    pub(super) const RULES: &[(u8, WolframClass, &str)] = &[
        (0, I, "null: every cell becomes 0"),
        (51, I, "complement of center"),
        (204, I, "identity"),
        (60, I, "left XOR center"),
        (195, I, "complement of left XOR center"),
        (15, II, "complement of left"),
        (30, II, "left XOR (center OR right)"),
        (45, II, "left XOR (center OR NOT right)"),
        (75, II, "left XOR (NOT center OR right)"),
        (90, II, "left XOR right"),
        (5, III, "NOR of left and right"),
        (17, III, "NOR of center and right"),
        (68, III, "center AND NOT right"),
        (80, III, "left AND NOT right"),
    ];
}

/// Class given to rules missing from the rule table.
pub const DEFAULT_CLASS: WolframClass = WolframClass::III;

/// Static facts about a single rule number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct RuleInfo {
    /// The rule number.
    pub rule: u8,
    /// Class from the rule table, or [`DEFAULT_CLASS`].
    pub class: WolframClass,
    /// Whether the rule is affine over GF(2).
    pub is_linear: bool,
    /// Short description of what the rule computes.
    pub description: &'static str,
}

/// Looks up a single rule. Unknown rules fall back to [`DEFAULT_CLASS`].
pub fn classify(rule: u8) -> RuleInfo {
    let (class, description) = tables::RULES
        .iter()
        .find(|(r, _, _)| *r == rule)
        .map(|&(_, class, description)| (class, description))
        .unwrap_or((DEFAULT_CLASS, "unclassified rule"));

    RuleInfo {
        rule,
        class,
        is_linear: is_linear(rule),
        description,
    }
}

fn transition_table(class: WolframClass) -> &'static [tables::Group] {
    match class {
        WolframClass::I => tables::CLASS_I,
        WolframClass::II => tables::CLASS_II,
        WolframClass::III => tables::CLASS_III,
        WolframClass::IV => tables::CLASS_IV,
        WolframClass::V => tables::CLASS_V,
        WolframClass::VI => tables::CLASS_VI,
    }
}

/// Class the next position is read in, after reading `rule` in `class`.
pub fn transition(class: WolframClass, rule: u8) -> Option<WolframClass> {
    transition_table(class)
        .iter()
        .find(|(rules, _)| rules.contains(&rule))
        .map(|&(_, next)| next)
}

/// Rules with an entry in the transition table of `class`.
pub fn transition_rules(class: WolframClass) -> impl Iterator<Item = u8> {
    transition_table(class)
        .iter()
        .flat_map(|(rules, _)| rules.iter().copied())
}

/// Starting class for a first rule, keyed by its low four bits.
pub fn seed_class(rule: u8) -> Option<WolframClass> {
    let key = rule & 0x0F;
    tables::SEED
        .iter()
        .find(|(k, _)| *k == key)
        .map(|&(_, class)| class)
}

/// Rules accepted as the last real rule when it is read in `class`.
pub fn terminal_rules(class: WolframClass) -> &'static [u8] {
    match class {
        WolframClass::I | WolframClass::IV => &[150],
        WolframClass::II | WolframClass::V => &[90, 150],
        WolframClass::III | WolframClass::VI => &[90],
    }
}

/// Whether `rule` may close a sequence whose terminal class is `class`.
pub fn is_valid_terminal(class: WolframClass, rule: u8) -> bool {
    terminal_rules(class).contains(&rule)
}

/// Per-position classes of a rule vector.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClassSequence {
    /// One label per position; the first and last are always don't-care.
    pub labels: Vec<ClassLabel>,
    /// Rule 90 or 150 occurs in a class II or class V context.
    pub notable: bool,
    /// Class the last real rule (position n-2) is read in.
    pub terminal_class: WolframClass,
    /// Whether that rule passes the terminal check for its class.
    pub terminal_valid: bool,
}

impl ClassSequence {
    /// Number of positions.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns true if there are no positions.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Positions labelled class II or class V, with their class.
    pub fn replaceable_positions(&self) -> Vec<(usize, WolframClass)> {
        self.labels
            .iter()
            .enumerate()
            .filter_map(|(i, label)| match label.class() {
                Some(class @ (WolframClass::II | WolframClass::V)) => Some((i, class)),
                _ => None,
            })
            .collect()
    }
}

impl fmt::Display for ClassSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, label) in self.labels.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            label.fmt(f)?;
        }
        Ok(())
    }
}

/// Derives the class sequence of `rules`.
///
/// Requires at least two positions. Fails with
/// [`CaError::UnrecognizedSeed`] if the first rule's low nibble has no seed
/// class and with [`CaError::UnknownTransition`] at the first interior rule
/// missing from its class table.
pub fn class_sequence(rules: &RuleVector) -> Result<ClassSequence, CaError> {
    let n = rules.len();
    if n < 2 {
        return Err(CaError::InvalidLength {
            len: n,
            min: 2,
            max: MAX_WIDTH,
        });
    }

    let first = rules[0];
    let mut context = seed_class(first).ok_or(CaError::UnrecognizedSeed {
        rule: first,
        key: first & 0x0F,
    })?;

    let mut labels = vec![ClassLabel::DontCare; n];
    let mut notable = false;
    let mut terminal_class = context;

    for (position, label) in labels.iter_mut().enumerate().take(n - 1).skip(1) {
        let rule = rules[position];
        let next = transition(context, rule).ok_or(CaError::UnknownTransition {
            class: context,
            rule,
            position,
        })?;

        *label = ClassLabel::Class(context);
        if matches!(rule, 90 | 150) && matches!(context, WolframClass::II | WolframClass::V) {
            notable = true;
        }
        terminal_class = context;
        context = next;
    }

    Ok(ClassSequence {
        labels,
        notable,
        terminal_class,
        terminal_valid: is_valid_terminal(terminal_class, rules[n - 2]),
    })
}

/// Depth-first walk of the class tables that yields rule vectors.
///
/// Produces every vector of a fixed width, over a caller-chosen rule
/// alphabet, for which [`class_sequence`] succeeds with a valid terminal
/// rule. Vectors come out in lexicographic order of alphabet positions.
/// Branches that miss the seed table, a transition or the terminal check
/// are pruned as soon as they are entered.
#[derive(Debug, Clone)]
pub struct ClassWalk {
    width: usize,
    alphabet: Vec<u8>,
    /// Rules chosen so far.
    rules: Vec<u8>,
    /// `contexts[k]` is the class position `k + 1` is read in.
    contexts: Vec<WolframClass>,
    /// Next alphabet index to try at each depth.
    cursor: Vec<usize>,
    exhausted: bool,
}

impl ClassWalk {
    /// Walks vectors of `width` rules drawn from `alphabet`.
    ///
    /// Duplicate rules in `alphabet` are ignored after their first occurrence.
    pub fn new(width: usize, alphabet: &[u8]) -> Result<Self, CaError> {
        if !(2..=MAX_WIDTH).contains(&width) {
            return Err(CaError::InvalidLength {
                len: width,
                min: 2,
                max: MAX_WIDTH,
            });
        }

        let mut unique = Vec::with_capacity(alphabet.len());
        for &rule in alphabet {
            if !unique.contains(&rule) {
                unique.push(rule);
            }
        }

        Ok(Self {
            width,
            exhausted: unique.is_empty(),
            alphabet: unique,
            rules: Vec::with_capacity(width),
            contexts: Vec::with_capacity(width),
            cursor: vec![0; width],
        })
    }

    /// Walks vectors of `width` rules drawn from all 256 rules.
    pub fn all_rules(width: usize) -> Result<Self, CaError> {
        let alphabet: Vec<u8> = (0..=255).collect();
        Self::new(width, &alphabet)
    }

    /// Class the next position is read in if `rule` is placed at `depth`,
    /// or `None` if the tables reject it there.
    fn accept(&self, depth: usize, rule: u8) -> Option<WolframClass> {
        let last_real = self.width - 2;
        if depth == 0 {
            let seed = seed_class(rule)?;
            if depth == last_real && !is_valid_terminal(seed, rule) {
                return None;
            }
            return Some(seed);
        }

        let context = self.contexts[depth - 1];
        if depth == self.width - 1 {
            return Some(context);
        }
        let next = transition(context, rule)?;
        if depth == last_real && !is_valid_terminal(context, rule) {
            return None;
        }
        Some(next)
    }
}

impl Iterator for ClassWalk {
    type Item = RuleVector;

    fn next(&mut self) -> Option<RuleVector> {
        while !self.exhausted {
            let depth = self.rules.len();

            if depth == self.width {
                let found = RuleVector::new(self.rules.clone());
                self.rules.pop();
                self.contexts.pop();
                match found {
                    Ok(rules) => return Some(rules),
                    Err(_) => continue,
                }
            }

            let start = self.cursor[depth];
            let step = self.alphabet[start..]
                .iter()
                .enumerate()
                .find_map(|(offset, &rule)| {
                    self.accept(depth, rule)
                        .map(|context| (start + offset, rule, context))
                });

            match step {
                Some((index, rule, context)) => {
                    self.cursor[depth] = index + 1;
                    self.rules.push(rule);
                    self.contexts.push(context);
                }
                None if depth == 0 => self.exhausted = true,
                None => {
                    self.cursor[depth] = 0;
                    self.rules.pop();
                    self.contexts.pop();
                }
            }
        }
        None
    }
}

/// Classifies each vector independently; one failure does not stop the rest.
pub fn classify_batch(vectors: &[RuleVector]) -> Vec<Result<ClassSequence, CaError>> {
    vectors.iter().map(class_sequence).collect()
}

/// Keeps the vectors that classify successfully and are notable.
pub fn filter_notable(vectors: &[RuleVector]) -> Vec<(RuleVector, ClassSequence)> {
    vectors
        .iter()
        .filter_map(|rules| match class_sequence(rules) {
            Ok(sequence) if sequence.notable => Some((rules.clone(), sequence)),
            Ok(_) => None,
            Err(error) => {
                debug!(rules = %rules, %error, "skipping unclassifiable vector");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ClassLabel::DontCare;
    use WolframClass::*;

    fn rv(rules: &[u8]) -> RuleVector {
        RuleVector::new(rules.to_vec()).unwrap()
    }

    #[test]
    fn test_seed_table() {
        assert_eq!(seed_class(51), Some(I)); // 0x3
        assert_eq!(seed_class(204), Some(I)); // 0xC
        assert_eq!(seed_class(165), Some(II)); // 0x5
        assert_eq!(seed_class(90), Some(II)); // 0xA
        assert_eq!(seed_class(150), Some(III)); // 0x6
        assert_eq!(seed_class(105), Some(III)); // 0x9
        assert_eq!(seed_class(30), None); // 0xE
        assert_eq!(seed_class(0), None);
    }

    #[test]
    fn test_transition_lookup() {
        assert_eq!(transition(I, 150), Some(III));
        assert_eq!(transition(I, 90), Some(II));
        assert_eq!(transition(II, 150), Some(I));
        assert_eq!(transition(IV, 105), Some(V));
        assert_eq!(transition(V, 90), Some(V));
        assert_eq!(transition(VI, 90), Some(V));
        assert_eq!(transition(I, 30), None);
        assert_eq!(transition(IV, 51), None);
    }

    #[test]
    fn test_class_ii_always_returns_to_i() {
        let rules: Vec<u8> = transition_rules(II).collect();
        assert_eq!(rules.len(), 16);
        assert!(rules.iter().all(|&r| transition(II, r) == Some(I)));
    }

    #[test]
    fn test_terminal_rules() {
        assert!(is_valid_terminal(I, 150));
        assert!(!is_valid_terminal(I, 90));
        assert!(is_valid_terminal(IV, 150));
        assert!(is_valid_terminal(II, 90));
        assert!(is_valid_terminal(V, 150));
        assert!(is_valid_terminal(III, 90));
        assert!(!is_valid_terminal(VI, 150));
    }

    #[test]
    fn test_classify_known_and_default() {
        let info = classify(90);
        assert_eq!(info.class, II);
        assert!(info.is_linear);
        assert_eq!(info.description, "left XOR right");

        let info = classify(30);
        assert_eq!(info.class, II);
        assert!(!info.is_linear);

        let info = classify(110);
        assert_eq!(info.class, DEFAULT_CLASS);
        assert!(!info.is_linear);
        assert_eq!(info.description, "unclassified rule");

        // Not in the rule table, but still linear.
        let info = classify(150);
        assert_eq!(info.class, DEFAULT_CLASS);
        assert!(info.is_linear);
    }

    #[test]
    fn test_sequence_seeded_from_low_nibble() {
        let sequence = class_sequence(&rv(&[51, 150, 90])).unwrap();
        assert_eq!(sequence.labels, vec![DontCare, ClassLabel::Class(I), DontCare]);
        assert_eq!(sequence.terminal_class, I);
        assert!(sequence.terminal_valid);
        assert!(!sequence.notable);
        assert_eq!(sequence.to_string(), "DC, I, DC");
    }

    #[test]
    fn test_sequence_unknown_transition() {
        let result = class_sequence(&rv(&[51, 30, 90]));
        assert!(matches!(
            result,
            Err(CaError::UnknownTransition {
                class: I,
                rule: 30,
                position: 1
            })
        ));
    }

    #[test]
    fn test_sequence_unrecognized_seed() {
        let result = class_sequence(&rv(&[30, 150, 90]));
        assert!(matches!(
            result,
            Err(CaError::UnrecognizedSeed { rule: 30, key: 14 })
        ));
    }

    #[test]
    fn test_sequence_notable_and_replaceable() {
        let sequence = class_sequence(&rv(&[90, 150, 105, 195])).unwrap();
        assert_eq!(sequence.to_string(), "DC, II, I, DC");
        assert!(sequence.notable);
        assert_eq!(sequence.replaceable_positions(), vec![(1, II)]);
        // 105 read in class I would need to be 150.
        assert_eq!(sequence.terminal_class, I);
        assert!(!sequence.terminal_valid);
    }

    #[test]
    fn test_sequence_two_flagged_positions() {
        let sequence = class_sequence(&rv(&[90, 90, 90, 90, 90])).unwrap();
        assert_eq!(sequence.to_string(), "DC, II, I, II, DC");
        assert_eq!(sequence.replaceable_positions(), vec![(1, II), (3, II)]);
    }

    #[test]
    fn test_sequence_width_two() {
        let sequence = class_sequence(&rv(&[90, 150])).unwrap();
        assert_eq!(sequence.labels, vec![DontCare, DontCare]);
        assert_eq!(sequence.terminal_class, II);
        assert!(sequence.terminal_valid);
        assert!(sequence.replaceable_positions().is_empty());
    }

    #[test]
    fn test_sequence_rejects_width_one() {
        assert!(matches!(
            class_sequence(&rv(&[90])),
            Err(CaError::InvalidLength { len: 1, min: 2, .. })
        ));
    }

    #[test]
    fn test_walk_hybrid_width_three() {
        let walked: Vec<Vec<u8>> = ClassWalk::new(3, &[90, 150])
            .unwrap()
            .map(Vec::from)
            .collect();
        assert_eq!(
            walked,
            vec![
                vec![90, 90, 90],
                vec![90, 90, 150],
                vec![90, 150, 90],
                vec![90, 150, 150],
                vec![150, 90, 90],
                vec![150, 90, 150],
            ]
        );
    }

    #[test]
    fn test_walk_width_two_checks_seed_terminal() {
        // 150 seeds class III, whose terminal rule is 90 only.
        let walked: Vec<RuleVector> = ClassWalk::new(2, &[90, 150]).unwrap().collect();
        assert_eq!(walked, vec![rv(&[90, 90]), rv(&[90, 150])]);
    }

    #[test]
    fn test_walk_output_classifies_cleanly() {
        let alphabet = [90, 150, 105, 195, 30, 51];
        let walked: Vec<RuleVector> = ClassWalk::new(4, &alphabet).unwrap().collect();
        assert_eq!(walked.len(), 174);
        for rules in &walked {
            let sequence = class_sequence(rules).unwrap();
            assert!(sequence.terminal_valid, "{rules}");
            assert_eq!(sequence.labels[0], DontCare);
            assert_eq!(sequence.labels[3], DontCare);
        }
        assert_eq!(filter_notable(&walked).len(), 84);
    }

    #[test]
    fn test_walk_matches_brute_force() {
        let alphabet = [90, 150, 105, 51, 30];
        let mut expected = Vec::new();
        for &a in &alphabet {
            for &b in &alphabet {
                for &c in &alphabet {
                    let rules = rv(&[a, b, c]);
                    if class_sequence(&rules).is_ok_and(|s| s.terminal_valid) {
                        expected.push(rules);
                    }
                }
            }
        }
        let walked: Vec<RuleVector> = ClassWalk::new(3, &alphabet).unwrap().collect();
        assert_eq!(walked, expected);
    }

    #[test]
    fn test_walk_all_rules_count() {
        assert_eq!(ClassWalk::all_rules(2).unwrap().count(), 256);
    }

    #[test]
    fn test_walk_degenerate_inputs() {
        assert!(matches!(
            ClassWalk::new(1, &[90]),
            Err(CaError::InvalidLength { len: 1, min: 2, .. })
        ));
        assert_eq!(ClassWalk::new(3, &[]).unwrap().count(), 0);
        // No seed entry for rule 30.
        assert_eq!(ClassWalk::new(3, &[30]).unwrap().count(), 0);
        // Duplicates are walked once.
        assert_eq!(ClassWalk::new(3, &[90, 150, 90]).unwrap().count(), 6);
    }

    #[test]
    fn test_batch_isolates_failures() {
        let vectors = vec![rv(&[90, 150, 90]), rv(&[30, 1, 2]), rv(&[51, 150, 90])];
        let results = classify_batch(&vectors);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());

        let notable = filter_notable(&vectors);
        assert_eq!(notable.len(), 1);
        assert_eq!(notable[0].0, vectors[0]);
    }
}
