#![no_main]

use dragsort_core::{OrderArray, desired_slot};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // First byte picks the list length (1..=64); the rest are move pairs.
    let Some((&len, moves)) = data.split_first() else {
        return;
    };
    let n = usize::from(len % 64) + 1;
    let mut order = OrderArray::initialize(n);

    for pair in moves.chunks_exact(2) {
        let from = usize::from(pair[0]) % n;
        let delta = f64::from(pair[1] as i8) * 7.5;
        let to = desired_slot(from, delta, 40.0, n);
        assert!(to < n, "desired slot out of range");

        let moved = order.original_at(from).expect("slot in range");
        order = order.compute_swap(from, to).expect("in-range move");
        assert_eq!(order.original_at(to), Some(moved));
        order.validate().expect("move broke the permutation");
    }

    // Out-of-range moves never succeed.
    assert!(order.compute_swap(n, 0).is_err());
    assert!(order.compute_swap(0, n).is_err());
});
