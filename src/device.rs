//! The compute device: a cooperative-group backend plus the dispatch loop that runs one group
//! per tile. Ending a dispatch (the join of the parallel iterator) is the only point at which
//! the results of different groups become visible to each other.

use crate::group::{create_group, CooperativeGroup, GroupBackend};
use crate::utils::cdiv;
use log::trace;
use rayon::prelude::*;

pub struct Device {
    group: Box<dyn CooperativeGroup>,
    multi_threaded: bool,
}

impl Device {
    pub(crate) fn new(
        backend: GroupBackend,
        workgroup_size: usize,
        subgroup_size: usize,
        multi_threaded: bool,
    ) -> Self {
        Self {
            group: create_group(backend, workgroup_size, subgroup_size),
            multi_threaded,
        }
    }

    #[inline]
    pub fn group(&self) -> &dyn CooperativeGroup {
        &*self.group
    }

    #[inline]
    pub fn workgroup_size(&self) -> usize {
        self.group.size()
    }

    #[inline]
    pub fn group_count(&self, len: usize) -> usize {
        cdiv(len, self.workgroup_size())
    }

    /// One dispatch over read-only tiles. Results are returned in group order.
    pub fn dispatch_map<T, R, F>(&self, data: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(usize, &[T]) -> R + Sync + Send,
    {
        let size = self.workgroup_size();
        trace!("dispatch_map: {} groups", self.group_count(data.len()));

        if self.multi_threaded {
            data.par_chunks(size)
                .enumerate()
                .map(|(g, tile)| f(g, tile))
                .collect()
        } else {
            data.chunks(size)
                .enumerate()
                .map(|(g, tile)| f(g, tile))
                .collect()
        }
    }

    /// One dispatch over mutable tiles. Results are returned in group order.
    pub fn dispatch_mut<T, R, F>(&self, data: &mut [T], f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(usize, &mut [T]) -> R + Sync + Send,
    {
        let size = self.workgroup_size();
        trace!("dispatch_mut: {} groups", self.group_count(data.len()));

        if self.multi_threaded {
            data.par_chunks_mut(size)
                .enumerate()
                .map(|(g, tile)| f(g, tile))
                .collect()
        } else {
            data.chunks_mut(size)
                .enumerate()
                .map(|(g, tile)| f(g, tile))
                .collect()
        }
    }

    /// One dispatch where every group takes ownership of its own pre-split state, such as the
    /// destination slices it alone may write.
    pub fn dispatch_owned<S, F>(&self, states: Vec<S>, f: F)
    where
        S: Send,
        F: Fn(usize, S) + Sync + Send,
    {
        trace!("dispatch_owned: {} groups", states.len());

        if self.multi_threaded {
            states
                .into_par_iter()
                .enumerate()
                .for_each(|(g, state)| f(g, state));
        } else {
            states
                .into_iter()
                .enumerate()
                .for_each(|(g, state)| f(g, state));
        }
    }
}
