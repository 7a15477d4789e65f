#![no_main]

use libfuzzer_sys::fuzz_target;
use unshape_hybrid_ca::{ClassLabel, RuleVector, class_sequence};

fuzz_target!(|data: &[u8]| {
    let Ok(rules) = RuleVector::new(data.to_vec()) else {
        return;
    };

    // class_sequence should never panic, and edges are always don't-care.
    if let Ok(sequence) = class_sequence(&rules) {
        assert_eq!(sequence.len(), rules.len());
        assert_eq!(sequence.labels[0], ClassLabel::DontCare);
        assert_eq!(sequence.labels[rules.len() - 1], ClassLabel::DontCare);
    }
});
