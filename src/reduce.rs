use std::panic;
use std::thread::{self, ScopedJoinHandle};

use log::debug;

use crate::collector::{Characteristics, Collector, ConcurrentCollector};
use crate::error::{CollectError, CollectResult};

/// Run `collector` over `items` on the calling thread.
pub fn collect<T, I, C>(items: I, collector: &C) -> CollectResult<C::Output>
where
    I: IntoIterator<Item = T>,
    C: Collector<T>,
{
    let acc = fold_partition(items, collector)?;
    Ok(collector.finish(acc))
}

/// `collect_with` for every iterator, mirroring `Iterator::collect`
pub trait CollectExt: Iterator + Sized {
    fn collect_with<C>(self, collector: C) -> CollectResult<C::Output>
    where
        C: Collector<Self::Item>,
    {
        collect(self, &collector)
    }
}

impl<I: Iterator> CollectExt for I {}

fn fold_partition<T, I, C>(items: I, collector: &C) -> CollectResult<C::Acc>
where
    I: IntoIterator<Item = T>,
    C: Collector<T>,
{
    items.into_iter().try_fold(collector.supply(), |mut acc, item| {
        collector.accumulate(&mut acc, item).map(|_| acc)
    })
}

fn partition<T>(items: Vec<T>, partitions: usize) -> Vec<Vec<T>> {
    let chunk_size = items.len().div_ceil(partitions.max(1)).max(1);
    let mut items = items.into_iter();
    std::iter::from_fn(|| {
        let chunk: Vec<T> = items.by_ref().take(chunk_size).collect();
        (!chunk.is_empty()).then_some(chunk)
    })
    .collect()
}

fn join<R>(handle: ScopedJoinHandle<'_, R>) -> R {
    handle.join().unwrap_or_else(|payload| panic::resume_unwind(payload))
}

/// Splits input into contiguous partitions, folds each on its own scoped thread and merges the
/// partial results in input order.
#[derive(Debug, Clone)]
pub struct ParallelReducer {
    partitions: usize,
}

pub struct ParallelReducerBuilder {
    partitions: Option<usize>,
}

impl ParallelReducerBuilder {
    pub fn new() -> ParallelReducerBuilder {
        Self { partitions: None }
    }

    pub fn with_partitions(self, partitions: usize) -> Self {
        Self {
            partitions: Some(partitions),
        }
    }

    pub fn build(self) -> ParallelReducer {
        let partitions = self.partitions.unwrap_or_else(num_cpus::get).max(1);
        ParallelReducer { partitions }
    }
}

impl Default for ParallelReducerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for ParallelReducer {
    fn default() -> Self {
        ParallelReducerBuilder::new().build()
    }
}

impl ParallelReducer {
    pub fn builder() -> ParallelReducerBuilder {
        ParallelReducerBuilder::new()
    }

    pub fn partitions(&self) -> usize {
        self.partitions
    }

    /// Fold every partition privately, then combine the partials left to right.
    ///
    /// The first error, from a partition or from a merge, is returned.
    pub fn reduce<T, C>(&self, items: Vec<T>, collector: &C) -> CollectResult<C::Output>
    where
        T: Send,
        C: Collector<T> + Sync,
        C::Acc: Send,
    {
        let chunks = partition(items, self.partitions);
        debug!("Reducing {} partition(s) in parallel", chunks.len());

        let partials: Vec<CollectResult<C::Acc>> = thread::scope(|scope| {
            let handles: Vec<_> = chunks
                .into_iter()
                .map(|chunk| scope.spawn(move || fold_partition(chunk, collector)))
                .collect();
            handles.into_iter().map(join).collect()
        });

        let merged = partials.into_iter().try_fold(None, |merged: Option<C::Acc>, partial| -> CollectResult<Option<C::Acc>> {
            let partial = partial?;
            match merged {
                None => Ok(Some(partial)),
                Some(left) => collector.combine(left, partial).map(Some),
            }
        })?;

        Ok(collector.finish(merged.unwrap_or_else(|| collector.supply())))
    }

    /// Let every thread accumulate into one shared accumulator; no merge step runs.
    pub fn reduce_concurrent<T, C>(&self, items: Vec<T>, collector: &C) -> CollectResult<C::Output>
    where
        T: Send,
        C: ConcurrentCollector<T> + Sync,
        C::Acc: Sync,
    {
        if !collector.characteristics().contains(Characteristics::CONCURRENT) {
            return log_and_err!(CollectError::invalid_argument(
                "collector does not declare the CONCURRENT characteristic"
            ));
        }

        let shared = collector.supply();
        let chunks = partition(items, self.partitions);
        debug!("Accumulating {} partition(s) into a shared accumulator", chunks.len());

        thread::scope(|scope| {
            let shared = &shared;
            let handles: Vec<_> = chunks
                .into_iter()
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk
                            .into_iter()
                            .try_for_each(|item| collector.accumulate_shared(shared, item))
                    })
                })
                .collect();
            handles.into_iter().map(join).collect::<CollectResult<Vec<()>>>()
        })?;

        Ok(collector.finish(shared))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::{self, to_concurrent_set, to_map_with_null_values, to_multimap};

    fn odd_or_none(x: i32) -> Option<i32> {
        (x % 2 == 1).then_some(x)
    }

    #[test]
    fn partition_splits_into_contiguous_chunks() {
        assert_eq!(partition((1..=7).collect(), 3), vec![vec![1, 2, 3], vec![4, 5, 6], vec![7]]);
        assert_eq!(partition(vec![1, 2], 8), vec![vec![1], vec![2]]);
        assert!(partition(Vec::<u8>::new(), 4).is_empty());
        assert_eq!(partition(vec![1, 2, 3], 0), vec![vec![1, 2, 3]]);
    }

    #[test]
    fn builder_defaults_to_cpu_count() {
        assert_eq!(ParallelReducer::builder().build().partitions(), num_cpus::get().max(1));
        assert_eq!(ParallelReducer::builder().with_partitions(0).build().partitions(), 1);
        assert_eq!(ParallelReducer::builder().with_partitions(3).build().partitions(), 3);
    }

    #[test]
    fn sequential_collect_runs_finisher() {
        let counting = collector::of(
            || 0usize,
            |acc: &mut usize, _: char| {
                *acc += 1;
                Ok(())
            },
            |l, r| Ok(l + r),
            |n| n * 10,
            Characteristics::NONE,
        );
        assert_eq!(collect("abc".chars(), &counting).unwrap(), 30);
    }

    #[test]
    fn parallel_map_matches_sequential() {
        let reducer = ParallelReducer::builder().with_partitions(3).build();
        let collector = to_map_with_null_values(|x: &i32| *x, odd_or_none);

        let parallel = reducer.reduce(vec![1, 2, 3], &collector).unwrap();
        let sequential = collect(vec![1, 2, 3], &collector).unwrap();

        assert_eq!(parallel, sequential);
        assert_eq!(parallel.get(&2), Some(&None));
    }

    #[test]
    fn parallel_map_detects_duplicates_across_partitions() {
        let reducer = ParallelReducer::builder().with_partitions(2).build();
        let collector = to_map_with_null_values(|x: &i32| *x, odd_or_none);

        let err = reducer.reduce(vec![1, 2, 3, 1], &collector).unwrap_err();
        assert_eq!(err.to_string(), "Duplicate key 1");
    }

    #[test]
    fn parallel_multimap_keeps_input_order_per_key() {
        let reducer = ParallelReducer::builder().with_partitions(4).build();
        let collector = to_multimap(|x: &u32| x % 3, |x: u32| x);

        let map = reducer.reduce((0..12).collect(), &collector).unwrap();
        assert_eq!(map.get(&0), &[0, 3, 6, 9]);
        assert_eq!(map.get(&1), &[1, 4, 7, 10]);
        assert_eq!(map.get(&2), &[2, 5, 8, 11]);
    }

    #[test]
    fn parallel_reduce_of_nothing_finishes_an_empty_accumulator() {
        let reducer = ParallelReducer::builder().with_partitions(4).build();
        let map = reducer.reduce(Vec::new(), &to_multimap(|x: &u8| *x, |x: u8| x)).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn concurrent_reduce_fills_one_shared_set() {
        let reducer = ParallelReducer::builder().with_partitions(4).build();
        let set = reducer
            .reduce_concurrent((0..1000).map(|i| i % 250).collect(), &to_concurrent_set::<u32>())
            .unwrap();

        assert_eq!(set.len(), 250);
        assert!(set.contains(&0u32));
        assert!(set.contains(&249u32));
    }

    struct MislabelledSet;

    impl Collector<u8> for MislabelledSet {
        type Acc = dashmap::DashSet<u8>;
        type Output = dashmap::DashSet<u8>;

        fn supply(&self) -> Self::Acc {
            dashmap::DashSet::new()
        }

        fn accumulate(&self, acc: &mut Self::Acc, item: u8) -> CollectResult<()> {
            self.accumulate_shared(acc, item)
        }

        fn combine(&self, left: Self::Acc, right: Self::Acc) -> CollectResult<Self::Acc> {
            right.into_iter().for_each(|item| {
                left.insert(item);
            });
            Ok(left)
        }

        fn finish(&self, acc: Self::Acc) -> Self::Output {
            acc
        }
    }

    impl ConcurrentCollector<u8> for MislabelledSet {
        fn accumulate_shared(&self, acc: &Self::Acc, item: u8) -> CollectResult<()> {
            acc.insert(item);
            Ok(())
        }
    }

    #[test]
    fn concurrent_reduce_requires_the_concurrent_flag() {
        let err = ParallelReducer::default().reduce_concurrent(vec![1u8], &MislabelledSet).unwrap_err();
        assert!(matches!(err, CollectError::InvalidArgument { .. }));
    }
}
