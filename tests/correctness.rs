use nanorand::{Rng, WyRand};
use par_radix::primitives::{build_histogram, exclusive_scan, prefix_offsets, reduce, ReduceOp};
use par_radix::{BufferId, DigitGroup, GroupBackend, LsdSort, RadixSorter, SortConfig};
use proptest::prelude::*;

fn sorter(backend: GroupBackend, workgroup_size: usize, subgroup_size: usize) -> RadixSorter {
    RadixSorter::new(
        SortConfig::new()
            .with_backend(backend)
            .with_workgroup_size(workgroup_size)
            .with_subgroup_size(subgroup_size),
    )
    .unwrap()
}

/// Sorts `keys` with an index payload and returns the `(key, original index)` pairs.
fn sort_indexed<K>(sorter: &RadixSorter, keys: &[K]) -> Vec<(K, u32)>
where
    K: par_radix::SortKey,
{
    let mut a = keys.to_vec();
    let mut b = keys.to_vec();
    let mut pa: Vec<u32> = (0..keys.len() as u32).collect();
    let mut pb = pa.clone();

    let outcome = sorter.sort_pairs(&mut a, &mut b, &mut pa, &mut pb).unwrap();
    assert_eq!(outcome.len, keys.len());

    outcome
        .result(&a, &b)
        .iter()
        .copied()
        .zip(outcome.result(&pa, &pb).iter().copied())
        .collect()
}

fn verify_pairs_preserved<K: Copy + Ord + std::fmt::Debug>(input: &[K], sorted: &[(K, u32)]) {
    assert_eq!(sorted.len(), input.len());

    for (key, index) in sorted {
        assert_eq!(input[*index as usize], *key, "payload separated from its key");
    }

    for w in sorted.windows(2) {
        assert!(w[0].0 <= w[1].0, "out of order: {:?} before {:?}", w[0], w[1]);
        if w[0].0 == w[1].0 {
            assert!(w[0].1 < w[1].1, "equal keys reordered: {:?} before {:?}", w[0], w[1]);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_sorted_permutation(
        keys in prop::collection::vec(any::<u32>(), 0..1_500),
        digit_bits in 1u32..=16,
    ) {
        let sorter = RadixSorter::new(SortConfig::new().with_digit_bits(digit_bits)).unwrap();
        let mut a = keys.clone();
        let mut b = vec![0u32; keys.len()];
        let outcome = sorter.sort_keys(&mut a, &mut b).unwrap();

        let expected_buffer = if outcome.plan.passes % 2 == 1 { BufferId::B } else { BufferId::A };
        prop_assert_eq!(outcome.buffer, expected_buffer);

        let mut expected = keys;
        expected.sort_unstable();
        prop_assert_eq!(outcome.result(&a, &b), expected.as_slice());
    }

    #[test]
    fn prop_pairs_are_stable(
        keys in prop::collection::vec(0u16..64, 0..1_500),
        workgroup_exp in 1u32..=8,
    ) {
        let workgroup_size = 1usize << workgroup_exp;
        let subgroup_size = workgroup_size.min(16);

        for backend in [GroupBackend::SharedMemory, GroupBackend::Subgroup] {
            let sorted = sort_indexed(&sorter(backend, workgroup_size, subgroup_size), &keys);
            verify_pairs_preserved(&keys, &sorted);
        }
    }

    #[test]
    fn prop_histogram_invariants(
        keys in prop::collection::vec(any::<u64>(), 0..2_000),
        shift in 0u32..60,
        bits in 1u32..=4,
    ) {
        let sorter = RadixSorter::new(SortConfig::new()).unwrap();
        let device = sorter.device();
        let digit = DigitGroup::new(shift, bits);

        let (histogram, per_group) = build_histogram(device, &keys, digit);
        let offsets = prefix_offsets(device, &histogram);

        prop_assert_eq!(histogram.total(), keys.len() as u64);
        prop_assert_eq!(offsets[0], 0);

        let mut running_total = 0u32;
        for d in 0..histogram.radix() {
            prop_assert_eq!(offsets[d], running_total);
            running_total += histogram[d];
            prop_assert_eq!(per_group.digit_row(d).iter().sum::<u32>(), histogram[d]);
        }
    }

    #[test]
    fn prop_scan_matches_serial(values in prop::collection::vec(0u32..1_000_000, 0..5_000)) {
        for sorter in [
            sorter(GroupBackend::SharedMemory, 16, 1),
            sorter(GroupBackend::Subgroup, 64, 8),
        ] {
            let (sums, total) = exclusive_scan(sorter.device(), &values);

            let mut running_total = 0u32;
            for (s, v) in sums.iter().zip(values.iter()) {
                prop_assert_eq!(*s, running_total);
                running_total = running_total.wrapping_add(*v);
            }
            prop_assert_eq!(total, running_total);
        }
    }

    #[test]
    fn prop_reduce_matches_serial(values in prop::collection::vec(any::<u32>(), 0..3_000)) {
        let sorter = sorter(GroupBackend::Auto, 32, 8);
        let device = sorter.device();

        prop_assert_eq!(
            reduce(device, &values, ReduceOp::Add),
            values.iter().fold(0u32, |a, v| a.wrapping_add(*v))
        );
        prop_assert_eq!(
            reduce(device, &values, ReduceOp::Min),
            values.iter().copied().min().unwrap_or(u32::MAX)
        );
        prop_assert_eq!(
            reduce(device, &values, ReduceOp::Max),
            values.iter().copied().max().unwrap_or(0)
        );
    }

    #[test]
    fn prop_idempotent(keys in prop::collection::vec(any::<u16>(), 0..1_000)) {
        let mut once = keys.clone();
        once.lsd_sort().unwrap();

        let mut twice = once.clone();
        twice.lsd_sort().unwrap();

        prop_assert_eq!(once, twice);
    }
}

#[test]
fn test_backends_agree_on_large_input() {
    let mut rng = WyRand::new_seed(0xC0FFEE);
    let keys: Vec<u32> = (0..300_000).map(|_| rng.generate::<u32>()).collect();

    let reference = sort_indexed(&sorter(GroupBackend::SharedMemory, 256, 1), &keys);
    verify_pairs_preserved(&keys, &reference);

    for (workgroup_size, subgroup_size) in [(256, 32), (1024, 64), (64, 4)] {
        let sorted = sort_indexed(
            &sorter(GroupBackend::Subgroup, workgroup_size, subgroup_size),
            &keys,
        );
        assert_eq!(sorted, reference);
    }
}

#[test]
fn test_wide_digits_on_large_input() {
    let mut rng = WyRand::new_seed(42);
    let keys: Vec<u64> = (0..(1 << 20) + 17).map(|_| rng.generate::<u64>()).collect();

    // At this size the standard tuner switches to 8-bit digits.
    let sorter = RadixSorter::new(SortConfig::new()).unwrap();
    let mut a = keys.clone();
    let mut b = vec![0u64; keys.len()];
    let outcome = sorter.sort_keys(&mut a, &mut b).unwrap();

    assert_eq!(outcome.plan.digit_bits, 8);
    assert_eq!(outcome.plan.passes, 8);

    let mut expected = keys;
    expected.sort_unstable();
    assert_eq!(outcome.result(&a, &b), expected.as_slice());
}

#[test]
fn test_many_duplicates_single_threaded() {
    let mut rng = WyRand::new_seed(7);
    let keys: Vec<u8> = (0..100_000).map(|_| rng.generate_range(0u8..3)).collect();

    let sorter = RadixSorter::new(
        SortConfig::new()
            .with_single_threading()
            .with_digit_bits(2),
    )
    .unwrap();

    let sorted = sort_indexed(&sorter, &keys);
    verify_pairs_preserved(&keys, &sorted);
}
