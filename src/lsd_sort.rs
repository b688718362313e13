use crate::error::Result;
use crate::lsd_sort_builder::LsdSortBuilder;
use crate::SortKey;

pub trait LsdSort<K> {
    /// lsd_sort runs a stable LSD radix sort over the `par_radix::SortKey` keys in your
    /// `Vec<K>` or `[K]`, with the default configuration.
    ///
    /// ```
    /// use par_radix::LsdSort;
    ///
    /// let mut values = [3u32, 1, 2];
    /// values.lsd_sort().unwrap();
    ///
    /// assert_eq!(values, [1, 2, 3]);
    /// ```
    fn lsd_sort(&mut self) -> Result<()>;

    fn lsd_sort_builder(&'_ mut self) -> LsdSortBuilder<'_, K>;
}

impl<K> LsdSort<K> for Vec<K>
where
    K: SortKey,
{
    fn lsd_sort(&mut self) -> Result<()> {
        self.lsd_sort_builder().sort()
    }

    fn lsd_sort_builder(&'_ mut self) -> LsdSortBuilder<'_, K> {
        LsdSortBuilder::new(self)
    }
}

impl<K> LsdSort<K> for [K]
where
    K: SortKey,
{
    fn lsd_sort(&mut self) -> Result<()> {
        self.lsd_sort_builder().sort()
    }

    fn lsd_sort_builder(&'_ mut self) -> LsdSortBuilder<'_, K> {
        LsdSortBuilder::new(self)
    }
}
