//! Property-based invariant tests for the order model.
//!
//! 1. Any sequence of in-range moves keeps the array a permutation
//! 2. A move lands the element at the destination and keeps the others in
//!    relative order
//! 3. Moving back undoes a move
//! 4. `clamp_slot` and `desired_slot` never leave `[0, n-1]`

use dragsort_core::order::{OrderArray, clamp_slot, desired_slot};
use proptest::prelude::*;

fn moves_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1usize..40).prop_flat_map(|n| (Just(n), prop::collection::vec((0..n, 0..n), 0..64)))
}

proptest! {
    #[test]
    fn moves_preserve_permutation((n, moves) in moves_strategy()) {
        let mut order = OrderArray::initialize(n);
        for (from, to) in moves {
            order = order.compute_swap(from, to).unwrap();
            prop_assert!(order.validate().is_ok());
            prop_assert_eq!(order.len(), n);
        }
        let mut sorted = order.into_vec();
        sorted.sort_unstable();
        prop_assert_eq!(sorted, (0..n).collect::<Vec<_>>());
    }

    #[test]
    fn move_lands_at_destination((n, moves) in moves_strategy()) {
        let mut order = OrderArray::initialize(n);
        for (from, to) in moves {
            let moved = order.original_at(from).unwrap();
            let next = order.compute_swap(from, to).unwrap();
            prop_assert_eq!(next.original_at(to), Some(moved));

            let before: Vec<usize> = order.as_slice().iter().copied().filter(|&i| i != moved).collect();
            let after: Vec<usize> = next.as_slice().iter().copied().filter(|&i| i != moved).collect();
            prop_assert_eq!(before, after);
            order = next;
        }
    }

    #[test]
    fn move_back_restores((n, moves) in moves_strategy()) {
        let start = OrderArray::initialize(n);
        for (from, to) in moves {
            let there = start.compute_swap(from, to).unwrap();
            let back = there.compute_swap(to, from).unwrap();
            prop_assert_eq!(&back, &start);
        }
    }

    #[test]
    fn clamp_slot_stays_in_range(raw in any::<f64>(), n in 0usize..100) {
        let slot = clamp_slot(raw, n);
        if n == 0 {
            prop_assert_eq!(slot, 0);
        } else {
            prop_assert!(slot < n);
        }
    }

    #[test]
    fn desired_slot_stays_in_range(
        start in 0usize..50,
        delta in -1.0e6f64..1.0e6,
        height in prop_oneof![Just(0.0f64), Just(-4.0), Just(f64::NAN), 1.0f64..200.0],
        n in 1usize..50,
    ) {
        prop_assert!(desired_slot(start.min(n - 1), delta, height, n) < n);
    }
}

#[test]
fn out_of_range_move_is_rejected() {
    let order = OrderArray::initialize(3);
    assert!(order.compute_swap(3, 0).is_err());
    assert!(order.compute_swap(0, 7).is_err());
    assert!(OrderArray::initialize(0).compute_swap(0, 0).is_err());
}
