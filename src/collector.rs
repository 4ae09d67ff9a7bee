use std::fmt;
use std::ops::BitOr;

use crate::error::CollectResult;

pub mod concurrent_set;
pub mod multimap;
pub mod nullable_map;

pub use concurrent_set::{to_concurrent_set, ConcurrentSetCollector};
pub use multimap::{to_multimap, Multimap, MultimapCollector};
pub use nullable_map::{to_map_with_null_values, to_map_with_null_values_in, KeyedMap, NullableMapCollector};

/// Hints a collector gives to the driver running it
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Characteristics(u8);

impl Characteristics {
    pub const NONE: Characteristics = Characteristics(0);
    /// `finish` returns the accumulator unchanged
    pub const IDENTITY_FINISH: Characteristics = Characteristics(1);
    /// The accumulator can be shared by several threads accumulating at once
    pub const CONCURRENT: Characteristics = Characteristics(1 << 1);
    /// Encounter order of the input does not matter for the result
    pub const UNORDERED: Characteristics = Characteristics(1 << 2);

    pub const fn union(self, other: Characteristics) -> Characteristics {
        Characteristics(self.0 | other.0)
    }

    pub const fn contains(self, other: Characteristics) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Characteristics {
    type Output = Characteristics;

    fn bitor(self, rhs: Characteristics) -> Characteristics {
        self.union(rhs)
    }
}

impl fmt::Debug for Characteristics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = [
            (Characteristics::IDENTITY_FINISH, "IDENTITY_FINISH"),
            (Characteristics::CONCURRENT, "CONCURRENT"),
            (Characteristics::UNORDERED, "UNORDERED"),
        ]
        .into_iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, name)| name)
        .collect();
        write!(f, "Characteristics{:?}", names)
    }
}

/// One way of folding a sequence of `T` into an `Output`.
///
/// A driver calls `supply` once per partition, `accumulate` for every element of that partition,
/// `combine` to merge partitions and `finish` on the merged accumulator. `accumulate` and
/// `combine` must agree, otherwise sequential and partitioned reduction give different results.
pub trait Collector<T> {
    type Acc;
    type Output;

    /// Create a fresh, empty accumulator
    fn supply(&self) -> Self::Acc;

    /// Fold one element into an accumulator
    fn accumulate(&self, acc: &mut Self::Acc, item: T) -> CollectResult<()>;

    /// Merge two partial accumulators, `left` holding the earlier elements
    fn combine(&self, left: Self::Acc, right: Self::Acc) -> CollectResult<Self::Acc>;

    /// Turn the final accumulator into the result
    fn finish(&self, acc: Self::Acc) -> Self::Output;

    fn characteristics(&self) -> Characteristics {
        Characteristics::NONE
    }
}

/// A collector whose accumulator accepts elements from many threads at once.
///
/// Implementors must declare [`Characteristics::CONCURRENT`].
pub trait ConcurrentCollector<T>: Collector<T> {
    fn accumulate_shared(&self, acc: &Self::Acc, item: T) -> CollectResult<()>;
}

/// Collector assembled from four closures, see [`of`]
pub struct FnCollector<S, A, C, F> {
    supplier: S,
    accumulator: A,
    combiner: C,
    finisher: F,
    characteristics: Characteristics,
}

/// Build a collector from a supplier, an accumulator, a combiner and a finisher.
pub fn of<T, Acc, Out, S, A, C, F>(
    supplier: S,
    accumulator: A,
    combiner: C,
    finisher: F,
    characteristics: Characteristics,
) -> FnCollector<S, A, C, F>
where
    S: Fn() -> Acc,
    A: Fn(&mut Acc, T) -> CollectResult<()>,
    C: Fn(Acc, Acc) -> CollectResult<Acc>,
    F: Fn(Acc) -> Out,
{
    FnCollector {
        supplier,
        accumulator,
        combiner,
        finisher,
        characteristics,
    }
}

impl<T, Acc, Out, S, A, C, F> Collector<T> for FnCollector<S, A, C, F>
where
    S: Fn() -> Acc,
    A: Fn(&mut Acc, T) -> CollectResult<()>,
    C: Fn(Acc, Acc) -> CollectResult<Acc>,
    F: Fn(Acc) -> Out,
{
    type Acc = Acc;
    type Output = Out;

    fn supply(&self) -> Acc {
        (self.supplier)()
    }

    fn accumulate(&self, acc: &mut Acc, item: T) -> CollectResult<()> {
        (self.accumulator)(acc, item)
    }

    fn combine(&self, left: Acc, right: Acc) -> CollectResult<Acc> {
        (self.combiner)(left, right)
    }

    fn finish(&self, acc: Acc) -> Out {
        (self.finisher)(acc)
    }

    fn characteristics(&self) -> Characteristics {
        self.characteristics
    }
}
