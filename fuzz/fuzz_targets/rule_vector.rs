#![no_main]

use libfuzzer_sys::fuzz_target;
use unshape_hybrid_ca::{Boundary, RuleVector, evolve, evolve_cells, find_cycle, pack, unpack};

fuzz_target!(|data: &[u8]| {
    // First byte picks the start state, the rest are rules.
    let Some((&start, rules)) = data.split_first() else {
        return;
    };
    let Ok(rules) = RuleVector::new(rules.iter().copied().take(12).collect()) else {
        return;
    };
    let width = rules.len();
    let state = u32::from(start) & ((1 << width) - 1);

    for boundary in [Boundary::Null, Boundary::Periodic] {
        let next = evolve(state, &rules, boundary);
        assert!(next >> width == 0);

        let cells = unpack(state, width).unwrap();
        let stepped = evolve_cells(&cells, &rules, boundary).unwrap();
        assert_eq!(pack(&stepped).unwrap(), next);

        let cycle = find_cycle(state, &rules, boundary, 1 << width).unwrap();
        assert!(cycle.period >= 1);
        assert!(cycle.path_len() <= 1 << width);
    }
});
