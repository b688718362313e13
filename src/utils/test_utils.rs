use crate::{RadixSorter, SortKey};
use block_pseudorand::block_rand;
use std::fmt::Debug;

pub trait TestKey: SortKey + Ord + Debug {}

impl<T> TestKey for T where T: SortKey + Ord + Debug {}

/// The input shapes every sort is checked against: `n` uniformly random keys, keys drawn from
/// a 17-value palette, the sorted and reverse-sorted sequence, a constant sequence, plus one
/// element and nothing at all.
pub fn key_sets<T, F>(n: usize, to_key: F) -> Vec<Vec<T>>
where
    T: TestKey,
    F: Fn(u64) -> T,
{
    assert!(n > 0);

    let raw: Vec<u64> = block_rand(n);
    let random: Vec<T> = raw.iter().map(|v| to_key(*v)).collect();

    let palette = &random[..random.len().min(17)];
    let repeated: Vec<T> = raw
        .iter()
        .map(|v| palette[*v as usize % palette.len()])
        .collect();

    let mut ascending = random.clone();
    ascending.sort_unstable();
    let descending: Vec<T> = ascending.iter().rev().copied().collect();
    let constant = vec![random[0]; n];
    let single = random[..1].to_vec();

    vec![
        random,
        repeated,
        ascending,
        descending,
        constant,
        single,
        vec![],
    ]
}

/// u32 keys with whole bytes (or all but a few bits) held constant, so some passes see only
/// one occupied bucket.
pub fn masked_u32_sets(n: usize) -> Vec<Vec<u32>> {
    let raw: Vec<u32> = block_rand(n);

    let masks = (0..4)
        .flat_map(|byte| {
            let m = 0xFFu32 << (byte * 8);
            [m, !m]
        })
        .chain([1, 1 << 31, 0x5555_5555, 0xAAAA_AAAA, 0]);

    masks
        .map(|mask| raw.iter().map(|v| v & mask).collect())
        .collect()
}

/// Sorts `keys` in place with `sort_fn` and compares against the standard library.
pub fn validate_sort<T, F>(keys: Vec<T>, sort_fn: F)
where
    T: TestKey,
    F: Fn(&mut [T]),
{
    let mut sorted = keys.clone();
    sort_fn(&mut sorted);

    let mut expected = keys;
    expected.sort_unstable();
    assert_eq!(sorted, expected);
}

/// Sorts `keys` with the original index as payload and checks that the payload travelled with
/// its key and that equal keys kept their input order.
pub fn validate_stable_pairs<T, F>(keys: Vec<T>, sort_fn: F)
where
    T: TestKey,
    F: Fn(&mut Vec<T>, &mut Vec<u32>),
{
    let mut sorted_keys = keys.clone();
    let mut index: Vec<u32> = (0..keys.len() as u32).collect();

    sort_fn(&mut sorted_keys, &mut index);

    let mut expected: Vec<(T, u32)> = keys.iter().copied().zip(0u32..).collect();
    expected.sort_by_key(|(k, _)| *k);

    let actual: Vec<(T, u32)> = sorted_keys.into_iter().zip(index).collect();
    assert_eq!(actual, expected);
}

/// Runs [`validate_stable_pairs`] with `sorter` over every one of `sets`.
pub fn stable_pairs_suite<T>(sorter: &RadixSorter, sets: Vec<Vec<T>>)
where
    T: TestKey,
{
    for keys in sets {
        validate_stable_pairs(keys, |k, p| {
            let (sorted_keys, sorted_payload) = sort_pairs_with(sorter, k, p);
            *k = sorted_keys;
            *p = sorted_payload;
        });
    }
}

/// Runs `sorter` on `keys` with a fresh scratch buffer and returns the sorted keys.
pub fn sort_with<T>(sorter: &RadixSorter, keys: &[T]) -> Vec<T>
where
    T: SortKey,
{
    let mut a = keys.to_vec();
    let mut b = keys.to_vec();
    let outcome = sorter.sort_keys(&mut a, &mut b).unwrap();

    outcome.result(&a, &b).to_vec()
}

/// Pair-sorting counterpart of [`sort_with`].
pub fn sort_pairs_with<T, V>(sorter: &RadixSorter, keys: &[T], payload: &[V]) -> (Vec<T>, Vec<V>)
where
    T: SortKey,
    V: Copy + Send + Sync,
{
    let mut a = keys.to_vec();
    let mut b = keys.to_vec();
    let mut pa = payload.to_vec();
    let mut pb = payload.to_vec();
    let outcome = sorter.sort_pairs(&mut a, &mut b, &mut pa, &mut pb).unwrap();

    (
        outcome.result(&a, &b).to_vec(),
        outcome.result(&pa, &pb).to_vec(),
    )
}
