use std::collections::hash_map::{self, HashMap};
use std::hash::Hash;
use std::marker::PhantomData;

use log::debug;
use smallvec::SmallVec;

use crate::error::CollectResult;

use super::{Characteristics, Collector};

type Values<V> = SmallVec<[V; 2]>;

/// Map from a key to every value put under it, in insertion order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Multimap<K: Eq + Hash, V> {
    inner: HashMap<K, Values<V>>,
    len: usize,
}

impl<K: Eq + Hash, V> Multimap<K, V> {
    pub fn new() -> Self {
        Multimap {
            inner: HashMap::new(),
            len: 0,
        }
    }

    /// Append `value` to the values of `key`
    pub fn put(&mut self, key: K, value: V) {
        self.inner.entry(key).or_default().push(value);
        self.len += 1;
    }

    /// Move every association of `other` in, after the values already present
    pub fn put_all(&mut self, other: Multimap<K, V>) {
        self.len += other.len;
        other.inner.into_iter().for_each(|(key, values)| match self.inner.entry(key) {
            hash_map::Entry::Occupied(mut existing) => existing.get_mut().extend(values),
            hash_map::Entry::Vacant(slot) => {
                slot.insert(values);
            }
        });
    }

    /// Values under `key`, empty when the key was never put
    pub fn get(&self, key: &K) -> &[V] {
        self.inner.get(key).map(|values| values.as_slice()).unwrap_or(&[])
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.contains_key(key)
    }

    /// Number of key-value associations
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn key_count(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.inner.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &[V])> {
        self.inner.iter().map(|(key, values)| (key, values.as_slice()))
    }

    pub fn into_map(self) -> HashMap<K, Vec<V>> {
        self.inner
            .into_iter()
            .map(|(key, values)| (key, values.into_vec()))
            .collect()
    }
}

impl<K: Eq + Hash, V> Default for Multimap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, V> FromIterator<(K, V)> for Multimap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter().fold(Multimap::new(), |mut map, (key, value)| {
            map.put(key, value);
            map
        })
    }
}

/// Groups elements into a [`Multimap`] using a key and a value extractor
pub struct MultimapCollector<T, K, V, KF, VF> {
    key_fn: KF,
    value_fn: VF,
    _types: PhantomData<fn(T) -> (K, V)>,
}

pub fn to_multimap<T, K, V, KF, VF>(key_fn: KF, value_fn: VF) -> MultimapCollector<T, K, V, KF, VF>
where
    K: Eq + Hash,
    KF: Fn(&T) -> K,
    VF: Fn(T) -> V,
{
    MultimapCollector {
        key_fn,
        value_fn,
        _types: PhantomData,
    }
}

impl<T, K, V, KF, VF> Collector<T> for MultimapCollector<T, K, V, KF, VF>
where
    K: Eq + Hash,
    KF: Fn(&T) -> K,
    VF: Fn(T) -> V,
{
    type Acc = Multimap<K, V>;
    type Output = Multimap<K, V>;

    fn supply(&self) -> Multimap<K, V> {
        Multimap::new()
    }

    fn accumulate(&self, map: &mut Multimap<K, V>, item: T) -> CollectResult<()> {
        let key = (self.key_fn)(&item);
        map.put(key, (self.value_fn)(item));
        Ok(())
    }

    fn combine(&self, mut left: Multimap<K, V>, right: Multimap<K, V>) -> CollectResult<Multimap<K, V>> {
        debug!("Merging partial multimaps ({} + {} values)", left.len(), right.len());
        left.put_all(right);
        Ok(left)
    }

    fn finish(&self, map: Multimap<K, V>) -> Multimap<K, V> {
        map
    }
}
