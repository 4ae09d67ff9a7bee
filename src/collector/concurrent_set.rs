use std::hash::Hash;
use std::marker::PhantomData;

use dashmap::DashSet;
use log::debug;

use crate::error::CollectResult;

use super::{Characteristics, Collector, ConcurrentCollector};

/// Collects into a [`DashSet`], which tolerates insertion from many threads without extra locking
pub struct ConcurrentSetCollector<T> {
    _element: PhantomData<fn(T)>,
}

pub fn to_concurrent_set<T: Eq + Hash>() -> ConcurrentSetCollector<T> {
    ConcurrentSetCollector { _element: PhantomData }
}

impl<T: Eq + Hash> Default for ConcurrentSetCollector<T> {
    fn default() -> Self {
        to_concurrent_set()
    }
}

impl<T: Eq + Hash> Collector<T> for ConcurrentSetCollector<T> {
    type Acc = DashSet<T>;
    type Output = DashSet<T>;

    fn supply(&self) -> DashSet<T> {
        DashSet::new()
    }

    fn accumulate(&self, set: &mut DashSet<T>, item: T) -> CollectResult<()> {
        self.accumulate_shared(set, item)
    }

    fn combine(&self, left: DashSet<T>, right: DashSet<T>) -> CollectResult<DashSet<T>> {
        debug!("Merging concurrent sets ({} + {} elements)", left.len(), right.len());
        right.into_iter().for_each(|item| {
            left.insert(item);
        });
        Ok(left)
    }

    fn finish(&self, set: DashSet<T>) -> DashSet<T> {
        set
    }

    fn characteristics(&self) -> Characteristics {
        Characteristics::CONCURRENT | Characteristics::UNORDERED
    }
}

impl<T: Eq + Hash> ConcurrentCollector<T> for ConcurrentSetCollector<T> {
    fn accumulate_shared(&self, set: &DashSet<T>, item: T) -> CollectResult<()> {
        set.insert(item);
        Ok(())
    }
}
