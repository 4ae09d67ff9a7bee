use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;

use indexmap::IndexMap;
use log::debug;

use crate::error::{CollectError, CollectResult};

use super::{Characteristics, Collector};

/// Map types a [`NullableMapCollector`] can build.
///
/// Draining by value (`IntoIterator`) is what lets two partial maps be merged.
pub trait KeyedMap<K, V>: IntoIterator<Item = (K, V)> {
    fn contains_key(&self, key: &K) -> bool;

    fn insert(&mut self, key: K, value: V);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Eq + Hash, V, S: BuildHasher> KeyedMap<K, V> for HashMap<K, V, S> {
    fn contains_key(&self, key: &K) -> bool {
        HashMap::contains_key(self, key)
    }

    fn insert(&mut self, key: K, value: V) {
        HashMap::insert(self, key, value);
    }

    fn len(&self) -> usize {
        HashMap::len(self)
    }
}

impl<K: Ord, V> KeyedMap<K, V> for BTreeMap<K, V> {
    fn contains_key(&self, key: &K) -> bool {
        BTreeMap::contains_key(self, key)
    }

    fn insert(&mut self, key: K, value: V) {
        BTreeMap::insert(self, key, value);
    }

    fn len(&self) -> usize {
        BTreeMap::len(self)
    }
}

impl<K: Eq + Hash, V, S: BuildHasher> KeyedMap<K, V> for IndexMap<K, V, S> {
    fn contains_key(&self, key: &K) -> bool {
        IndexMap::contains_key(self, key)
    }

    fn insert(&mut self, key: K, value: V) {
        IndexMap::insert(self, key, value);
    }

    fn len(&self) -> usize {
        IndexMap::len(self)
    }
}

/// Builds a map whose values may be absent, failing on the first repeated key.
///
/// Unlike `Iterator::collect` into a map, a repeated key is an error rather than an overwrite,
/// and `None` values are kept as entries.
pub struct NullableMapCollector<T, K, V, M, KF, VF, MF> {
    key_fn: KF,
    value_fn: VF,
    map_factory: MF,
    _types: PhantomData<fn(T) -> (K, V, M)>,
}

/// Collect into a `HashMap<K, Option<V>>`.
pub fn to_map_with_null_values<T, K, V, KF, VF>(
    key_fn: KF,
    value_fn: VF,
) -> NullableMapCollector<T, K, V, HashMap<K, Option<V>>, KF, VF, fn() -> HashMap<K, Option<V>>>
where
    K: Eq + Hash + Debug,
    KF: Fn(&T) -> K,
    VF: Fn(T) -> Option<V>,
{
    to_map_with_null_values_in(key_fn, value_fn, HashMap::new as fn() -> HashMap<K, Option<V>>)
}

/// Collect into whatever map `map_factory` creates, e.g. `IndexMap::new` to keep insertion order.
pub fn to_map_with_null_values_in<T, K, V, M, KF, VF, MF>(
    key_fn: KF,
    value_fn: VF,
    map_factory: MF,
) -> NullableMapCollector<T, K, V, M, KF, VF, MF>
where
    K: Debug,
    KF: Fn(&T) -> K,
    VF: Fn(T) -> Option<V>,
    MF: Fn() -> M,
    M: KeyedMap<K, Option<V>>,
{
    NullableMapCollector {
        key_fn,
        value_fn,
        map_factory,
        _types: PhantomData,
    }
}

impl<T, K, V, M, KF, VF, MF> Collector<T> for NullableMapCollector<T, K, V, M, KF, VF, MF>
where
    K: Debug,
    KF: Fn(&T) -> K,
    VF: Fn(T) -> Option<V>,
    MF: Fn() -> M,
    M: KeyedMap<K, Option<V>>,
{
    type Acc = M;
    type Output = M;

    fn supply(&self) -> M {
        (self.map_factory)()
    }

    fn accumulate(&self, map: &mut M, item: T) -> CollectResult<()> {
        let key = (self.key_fn)(&item);
        if map.contains_key(&key) {
            return log_and_err!(CollectError::duplicate_key(&key));
        }
        map.insert(key, (self.value_fn)(item));
        Ok(())
    }

    // Partitions are only unique internally, so every key of `right` is checked again.
    fn combine(&self, mut left: M, right: M) -> CollectResult<M> {
        debug!("Merging partial maps ({} + {} entries)", left.len(), right.len());
        right.into_iter().try_for_each(|(key, value)| {
            if left.contains_key(&key) {
                return log_and_err!(CollectError::duplicate_key(&key));
            }
            left.insert(key, value);
            Ok(())
        })?;
        Ok(left)
    }

    fn finish(&self, map: M) -> M {
        map
    }

    fn characteristics(&self) -> Characteristics {
        Characteristics::IDENTITY_FINISH
    }
}
