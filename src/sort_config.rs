use crate::error::{Result, SortError};
use crate::group::intrinsics::MAX_SUBGROUP_SIZE;
use crate::group::GroupBackend;
use crate::tuner::Tuner;
use crate::tuners::{FixedTuner, StandardTuner};

pub const DEFAULT_WORKGROUP_SIZE: usize = 256;
pub const DEFAULT_SUBGROUP_SIZE: usize = 32;
pub const MAX_WORKGROUP_SIZE: usize = 4096;

/// Everything a [`RadixSorter`](crate::RadixSorter) is built from.
///
/// ```
/// use par_radix::{GroupBackend, RadixSorter, SortConfig};
///
/// let sorter = RadixSorter::new(
///     SortConfig::new()
///         .with_digit_bits(8)
///         .with_workgroup_size(128)
///         .with_backend(GroupBackend::SharedMemory),
/// )
/// .unwrap();
///
/// let mut keys = vec![3u32, 1, 2];
/// let mut scratch = vec![0u32; 3];
/// let outcome = sorter.sort_keys(&mut keys, &mut scratch).unwrap();
///
/// assert_eq!(outcome.result(&keys, &scratch), &[1, 2, 3]);
/// ```
pub struct SortConfig {
    pub(crate) tuner: Box<dyn Tuner + Send + Sync>,
    pub(crate) key_bits: Option<u32>,
    pub(crate) workgroup_size: usize,
    pub(crate) subgroup_size: usize,
    pub(crate) backend: GroupBackend,
    pub(crate) multi_threaded: bool,
    pub(crate) pass_reports: bool,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            tuner: Box::new(StandardTuner),
            key_bits: None,
            workgroup_size: DEFAULT_WORKGROUP_SIZE,
            subgroup_size: DEFAULT_SUBGROUP_SIZE,
            backend: GroupBackend::Auto,
            multi_threaded: true,
            pass_reports: false,
        }
    }
}

impl SortConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixes the digit width for every sort, replacing the tuner.
    pub fn with_digit_bits(mut self, digit_bits: u32) -> Self {
        self.tuner = Box::new(FixedTuner(digit_bits));

        self
    }

    pub fn with_tuner<T>(mut self, tuner: T) -> Self
    where
        T: Tuner + Send + Sync + 'static,
    {
        self.tuner = Box::new(tuner);

        self
    }

    /// Only the low `key_bits` bits of every key are sorted on. Defaults to the full key.
    pub fn with_key_bits(mut self, key_bits: u32) -> Self {
        self.key_bits = Some(key_bits);

        self
    }

    pub fn with_workgroup_size(mut self, workgroup_size: usize) -> Self {
        self.workgroup_size = workgroup_size;

        self
    }

    pub fn with_subgroup_size(mut self, subgroup_size: usize) -> Self {
        self.subgroup_size = subgroup_size;

        self
    }

    pub fn with_backend(mut self, backend: GroupBackend) -> Self {
        self.backend = backend;

        self
    }

    pub fn with_multi_threading(mut self) -> Self {
        self.multi_threaded = true;

        self
    }

    pub fn with_single_threading(mut self) -> Self {
        self.multi_threaded = false;

        self
    }

    /// Keep the histogram and prefix offsets of every pass in the sort outcome.
    pub fn with_pass_reports(mut self) -> Self {
        self.pass_reports = true;

        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let wg = self.workgroup_size;
        if !wg.is_power_of_two() || !(2..=MAX_WORKGROUP_SIZE).contains(&wg) {
            return Err(SortError::InvalidWorkgroupSize(wg));
        }

        let sg = self.subgroup_size;
        if !sg.is_power_of_two() || sg > MAX_SUBGROUP_SIZE || wg % sg != 0 {
            return Err(SortError::InvalidSubgroupSize {
                subgroup_size: sg,
                workgroup_size: wg,
            });
        }

        Ok(())
    }
}
