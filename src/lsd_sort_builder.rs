use crate::error::Result;
use crate::group::GroupBackend;
use crate::sort_config::SortConfig;
use crate::sorter::{BufferId, RadixSorter};
use crate::tuner::Tuner;
use crate::SortKey;

pub struct LsdSortBuilder<'a, K> {
    data: &'a mut [K],
    config: SortConfig,
}

impl<'a, K> LsdSortBuilder<'a, K>
where
    K: SortKey,
{
    pub(crate) fn new(data: &'a mut [K]) -> Self {
        Self {
            data,
            config: SortConfig::default(),
        }
    }

    pub fn with_multi_threading(mut self) -> Self {
        self.config = self.config.with_multi_threading();

        self
    }

    pub fn with_single_threading(mut self) -> Self {
        self.config = self.config.with_single_threading();

        self
    }

    pub fn with_digit_bits(mut self, digit_bits: u32) -> Self {
        self.config = self.config.with_digit_bits(digit_bits);

        self
    }

    pub fn with_tuner<T>(mut self, tuner: T) -> Self
    where
        T: Tuner + Send + Sync + 'static,
    {
        self.config = self.config.with_tuner(tuner);

        self
    }

    pub fn with_key_bits(mut self, key_bits: u32) -> Self {
        self.config = self.config.with_key_bits(key_bits);

        self
    }

    pub fn with_workgroup_size(mut self, workgroup_size: usize) -> Self {
        self.config = self.config.with_workgroup_size(workgroup_size);

        self
    }

    pub fn with_subgroup_size(mut self, subgroup_size: usize) -> Self {
        self.config = self.config.with_subgroup_size(subgroup_size);

        self
    }

    pub fn with_backend(mut self, backend: GroupBackend) -> Self {
        self.config = self.config.with_backend(backend);

        self
    }

    /// Sorts the data in place. A scratch buffer of the same length is allocated for the
    /// ping-pong passes and the result is copied back when it ends up there.
    pub fn sort(self) -> Result<()> {
        let sorter = RadixSorter::new(self.config)?;

        // By definition, this is already sorted
        if self.data.len() <= 1 {
            return Ok(());
        }

        let mut scratch = self.data.to_vec();
        let outcome = sorter.sort_keys(self.data, &mut scratch)?;

        if outcome.buffer == BufferId::B {
            self.data.copy_from_slice(&scratch);
        }

        Ok(())
    }
}
