//! Work-efficient exclusive prefix sums over sequences of any length.
//!
//! One group scans at most `workgroup_size` values. Longer sequences use the two-level scheme:
//!
//!  1. every group scans its own tile and reports the tile total,
//!  2. the (much shorter) sequence of tile totals is scanned the same way, recursively,
//!  3. every group adds its tile's base offset back onto its local exclusive sums.
//!
//! Each level is its own dispatch, so the levels are ordered without any cross-group
//! synchronization inside a dispatch.

use crate::device::Device;
use log::trace;

/// Replaces `values` with their exclusive prefix sums and returns the total. Additions wrap.
pub fn exclusive_scan_in_place(device: &Device, values: &mut [u32]) -> u32 {
    if values.is_empty() {
        return 0;
    }

    let group = device.group();
    let mut totals = device.dispatch_mut(values, |_, tile| group.exclusive_scan(tile));

    if totals.len() == 1 {
        return totals[0];
    }

    trace!("scan: {} tile totals", totals.len());
    let total = exclusive_scan_in_place(device, &mut totals);

    device.dispatch_mut(values, |g, tile| {
        let base = totals[g];
        for v in tile.iter_mut() {
            *v = v.wrapping_add(base);
        }
    });

    total
}

/// Exclusive prefix sums of `values` plus their total.
pub fn exclusive_scan(device: &Device, values: &[u32]) -> (Vec<u32>, u32) {
    let mut out = values.to_vec();
    let total = exclusive_scan_in_place(device, &mut out);

    (out, total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::GroupBackend;
    use block_pseudorand::block_rand;

    fn serial(values: &[u32]) -> (Vec<u32>, u32) {
        let mut sums = Vec::with_capacity(values.len());
        let mut running_total = 0u32;
        for v in values {
            sums.push(running_total);
            running_total = running_total.wrapping_add(*v);
        }

        (sums, running_total)
    }

    fn devices() -> Vec<Device> {
        vec![
            Device::new(GroupBackend::SharedMemory, 8, 1, true),
            Device::new(GroupBackend::Subgroup, 8, 4, false),
            Device::new(GroupBackend::Auto, 256, 32, true),
        ]
    }

    #[test]
    pub fn test_scan_small() {
        let device = Device::new(GroupBackend::SharedMemory, 4, 1, false);
        let (sums, total) = exclusive_scan(&device, &[3, 1, 7, 0, 4, 1, 6, 3]);

        assert_eq!(sums, vec![0, 3, 4, 11, 11, 15, 16, 22]);
        assert_eq!(total, 25);
    }

    #[test]
    pub fn test_scan_empty() {
        for device in devices() {
            let (sums, total) = exclusive_scan(&device, &[]);
            assert!(sums.is_empty());
            assert_eq!(total, 0);
        }
    }

    #[test]
    pub fn test_scan_lengths() {
        // With 8-lane groups, 600 values need three levels.
        for device in devices() {
            for len in [1usize, 2, 5, 8, 9, 63, 64, 65, 600, 4_097] {
                let values: Vec<u32> = block_rand::<u32>(len)
                    .into_iter()
                    .map(|v| v % 1_000)
                    .collect();

                assert_eq!(exclusive_scan(&device, &values), serial(&values), "len {}", len);
            }
        }
    }

    #[test]
    pub fn test_scan_wraps() {
        let device = Device::new(GroupBackend::SharedMemory, 2, 1, true);
        let values = vec![u32::MAX, 2, u32::MAX];
        let (sums, total) = exclusive_scan(&device, &values);

        assert_eq!(sums, vec![0, u32::MAX, 1]);
        assert_eq!(total, 0);
    }
}
