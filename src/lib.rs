//! # par_radix
//!
//! par_radix is a data-parallel, stable, least-significant-digit radix sort for unsigned
//! fixed-width keys, optionally carrying a payload that is moved along with every key.
//!
//! It is assembled from three primitives that each run as dispatches of many fixed-size
//! cooperating groups:
//!
//!  * `reduce`: local combination inside a group, then one atomic merge per group
//!  * `exclusive_scan`: a work-efficient (Blelloch) prefix sum, two-level across groups
//!  * `scatter`: a stable bucket write to `offset[digit] + rank`
//!
//! A sort runs one histogram / scan / scatter pass per digit group, alternating between two
//! buffers, and reports which of the two holds the result.
//!
//! ## Usage
//!
//! In the simplest case, call `my_vec.lsd_sort()`. For control over the buffers, the digit
//! width or the cooperative-group backend, build a [`RadixSorter`]:
//!
//! ```
//! use par_radix::{BufferId, RadixSorter, SortConfig};
//!
//! let sorter = RadixSorter::new(SortConfig::new().with_digit_bits(4)).unwrap();
//!
//! let mut keys = vec![5u32, 3, 5, 1];
//! let mut payload = vec![0u32, 1, 2, 3];
//! let mut scratch_keys = vec![0u32; 4];
//! let mut scratch_payload = vec![0u32; 4];
//!
//! let outcome = sorter
//!     .sort_pairs(&mut keys, &mut scratch_keys, &mut payload, &mut scratch_payload)
//!     .unwrap();
//!
//! // 8 passes over a 32-bit key: the result ends up back in the first buffer.
//! assert_eq!(outcome.buffer, BufferId::A);
//! assert_eq!(keys, [1, 3, 5, 5]);
//! assert_eq!(payload, [3, 1, 0, 2]);
//! ```
//!
//! ## Keys
//!
//! `SortKey` is implemented for `u8`, `u16`, `u32`, `u64` and `usize`. Signed or floating-point
//! values must first be mapped to unsigned keys with the same order (for example by flipping
//! the sign bit of an `i32`); the sort does not detect this.
//!
//! ## Logging
//!
//! The crate logs through the `log` facade: sorter construction at `info`, plans and passes at
//! `debug`, dispatches at `trace`. Install any `log` implementation to see them.
//!
//! ## License
//!
//! Licensed under either of
//!
//! * Apache License, Version 2.0, (<http://www.apache.org/licenses/LICENSE-2.0>)
//! * MIT license (<http://opensource.org/licenses/MIT>)
//!
//! at your option.


pub mod device;
mod error;
pub mod group;
mod lsd_sort;
mod lsd_sort_builder;
pub mod primitives;
mod sort_config;
mod sort_key;
mod sorter;
pub mod tuner;
pub mod tuners;
pub mod utils;

pub use device::Device;
pub use error::{Result, SortError};
pub use group::{CooperativeGroup, GroupBackend};
pub use lsd_sort::LsdSort;
pub use lsd_sort_builder::LsdSortBuilder;
pub use sort_config::{SortConfig, DEFAULT_SUBGROUP_SIZE, DEFAULT_WORKGROUP_SIZE};
pub use sort_key::{DigitGroup, SortKey};
pub use sorter::{
    BufferId, PassReport, RadixSorter, SortOutcome, SortPlan, MAX_DIGIT_BITS,
    MIN_GROUP_TABLE_LIMIT,
};
