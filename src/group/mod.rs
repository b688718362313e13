//! Cooperative groups: the fixed-size sets of workers that share fast memory and a barrier.
//!
//! Every primitive that needs intra-group cooperation (reduce, scan, digit counting and
//! ranking) goes through [`CooperativeGroup`]. Two backends exist:
//!
//!  * [`SharedMemoryGroup`] uses nothing but group-local scratch memory and barrier-separated
//!    rounds (a Blelloch tree for scans, a pairwise tree for reductions).
//!  * [`SubgroupGroup`] splits the group into lock-step subgroups and leans on native
//!    subgroup intrinsics (inclusive/exclusive add, ballot), only falling back to shared
//!    memory to combine the per-subgroup results.
//!
//! The backend is chosen once when a sorter is built. Both produce identical results.
//!
//! Lanes of one group are executed lock-step by the thread that owns the group, so a
//! "round" below is a loop over lanes that ends at an implied barrier.

mod shared_memory;
mod subgroup;

pub use shared_memory::SharedMemoryGroup;
pub use subgroup::SubgroupGroup;

pub(crate) use subgroup::intrinsics;

use crate::primitives::ReduceOp;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum GroupBackend {
    /// Subgroup intrinsics when the configured subgroup has more than one lane.
    Auto,
    SharedMemory,
    Subgroup,
}

pub trait CooperativeGroup: Send + Sync {
    fn backend(&self) -> GroupBackend;

    /// Number of workers in one group; also the tile length each group consumes.
    fn size(&self) -> usize;

    /// Combines `lanes` with `op`. Missing lanes hold the identity of `op`.
    fn reduce(&self, lanes: &[u32], op: ReduceOp) -> u32;

    /// Replaces `lanes` by their exclusive prefix sums and returns the group total.
    /// Additions wrap.
    fn exclusive_scan(&self, lanes: &mut [u32]) -> u32;

    /// Adds the number of lanes holding each digit into `local`.
    fn count_digits(&self, digits: &[u32], local: &mut [u32]);

    /// For every lane, writes the number of earlier lanes that hold the same digit.
    fn rank_digits(&self, digits: &[u32], ranks: &mut [u32]);
}

/// Builds the group implementation for a backend choice.
pub(crate) fn create_group(
    backend: GroupBackend,
    workgroup_size: usize,
    subgroup_size: usize,
) -> Box<dyn CooperativeGroup> {
    match backend {
        GroupBackend::SharedMemory => Box::new(SharedMemoryGroup::new(workgroup_size)),
        GroupBackend::Subgroup => Box::new(SubgroupGroup::new(workgroup_size, subgroup_size)),
        GroupBackend::Auto if subgroup_size > 1 => {
            Box::new(SubgroupGroup::new(workgroup_size, subgroup_size))
        }
        GroupBackend::Auto => Box::new(SharedMemoryGroup::new(workgroup_size)),
    }
}
