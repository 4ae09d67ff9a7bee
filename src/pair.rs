use std::error::Error;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CollectError, CollectResult};

#[derive(PartialEq, Eq, Hash)]
struct Slots<L, R> {
    left: L,
    right: R,
}

/// Immutable pair that is either populated or the shared empty sentinel.
///
/// Clones share the same allocation, so identity survives chaining: `filter` hands back the very
/// pair it was called on, and every empty pair is the same sentinel. [`ImmutablePair::ptr_eq`]
/// observes that identity, `==` compares contents.
///
/// ```
/// use fn_collectors::ImmutablePair;
///
/// let joined = ImmutablePair::of("1", "2").map(|l, r| format!("{}_{}", l, r));
/// assert_eq!(joined.as_deref(), Some("1_2"));
///
/// let dropped = ImmutablePair::of(1, 2).filter(|_, _| false);
/// assert!(dropped.ptr_eq(&ImmutablePair::empty()));
/// ```
pub struct ImmutablePair<L, R> {
    slots: Option<Arc<Slots<L, R>>>,
}

impl<L, R> ImmutablePair<L, R> {
    pub const EMPTY: ImmutablePair<L, R> = ImmutablePair { slots: None };

    pub const fn empty() -> Self {
        Self::EMPTY
    }

    /// Always populated, even when both values are themselves "nothing" (e.g. `of(None, None)`)
    pub fn of(left: L, right: R) -> Self {
        ImmutablePair {
            slots: Some(Arc::new(Slots { left, right })),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_none()
    }

    /// Whether both are the empty sentinel or share one populated allocation
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.slots, &other.slots) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn get_left(&self) -> CollectResult<&L> {
        self.slots
            .as_deref()
            .map(|slots| &slots.left)
            .ok_or_else(|| CollectError::no_such_element("No left present"))
    }

    pub fn get_right(&self) -> CollectResult<&R> {
        self.slots
            .as_deref()
            .map(|slots| &slots.right)
            .ok_or_else(|| CollectError::no_such_element("No right present"))
    }

    pub fn get_left_else(&self, default: L) -> L
    where
        L: Clone,
    {
        self.slots.as_deref().map_or(default, |slots| slots.left.clone())
    }

    pub fn get_right_else(&self, default: R) -> R
    where
        R: Clone,
    {
        self.slots.as_deref().map_or(default, |slots| slots.right.clone())
    }

    /// The left value, or the error built by `error` when empty.
    ///
    /// A `CollectError` from `error` is returned as is; any other error is wrapped and stays
    /// reachable through `source()`.
    pub fn get_left_else_throw<E, F>(&self, error: F) -> CollectResult<&L>
    where
        F: FnOnce() -> E,
        E: Error + Send + Sync + 'static,
    {
        match self.slots.as_deref() {
            Some(slots) => Ok(&slots.left),
            None => Err(CollectError::from_caller(error())),
        }
    }

    /// Right-hand counterpart of [`ImmutablePair::get_left_else_throw`]
    pub fn get_right_else_throw<E, F>(&self, error: F) -> CollectResult<&R>
    where
        F: FnOnce() -> E,
        E: Error + Send + Sync + 'static,
    {
        match self.slots.as_deref() {
            Some(slots) => Ok(&slots.right),
            None => Err(CollectError::from_caller(error())),
        }
    }

    /// Both values, `None` when empty
    pub fn as_tuple(&self) -> Option<(&L, &R)> {
        self.slots.as_deref().map(|slots| (&slots.left, &slots.right))
    }

    /// `mapper` applied to both values; `None` without calling it when empty
    pub fn map<N, F>(&self, mapper: F) -> Option<N>
    where
        F: FnOnce(&L, &R) -> N,
    {
        self.as_tuple().map(|(left, right)| mapper(left, right))
    }

    pub fn map_or_else<N, F, D>(&self, mapper: F, default: D) -> N
    where
        F: FnOnce(&L, &R) -> N,
        D: FnOnce() -> N,
    {
        match self.as_tuple() {
            Some((left, right)) => mapper(left, right),
            None => default(),
        }
    }

    /// Empty stays empty and `mapper` is not called
    pub fn flat_map<L1, R1, F>(&self, mapper: F) -> ImmutablePair<L1, R1>
    where
        F: FnOnce(&L, &R) -> ImmutablePair<L1, R1>,
    {
        match self.as_tuple() {
            Some((left, right)) => mapper(left, right),
            None => ImmutablePair::EMPTY,
        }
    }

    /// `self` when populated and `predicate` holds, the empty sentinel otherwise
    pub fn filter<P>(self, predicate: P) -> Self
    where
        P: FnOnce(&L, &R) -> bool,
    {
        if self.as_tuple().is_some_and(|(left, right)| predicate(left, right)) {
            self
        } else {
            Self::EMPTY
        }
    }
}

impl<L, R> Clone for ImmutablePair<L, R> {
    fn clone(&self) -> Self {
        ImmutablePair {
            slots: self.slots.clone(),
        }
    }
}

impl<L, R> Default for ImmutablePair<L, R> {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl<L, R> From<(L, R)> for ImmutablePair<L, R> {
    fn from((left, right): (L, R)) -> Self {
        Self::of(left, right)
    }
}

impl<L: PartialEq, R: PartialEq> PartialEq for ImmutablePair<L, R> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.slots.as_deref() == other.slots.as_deref()
    }
}

impl<L: Eq, R: Eq> Eq for ImmutablePair<L, R> {}

impl<L: Hash, R: Hash> Hash for ImmutablePair<L, R> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.slots.as_deref().hash(state)
    }
}

impl<L: fmt::Debug, R: fmt::Debug> fmt::Debug for ImmutablePair<L, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_tuple() {
            Some((left, right)) => f
                .debug_struct("ImmutablePair")
                .field("left", left)
                .field("right", right)
                .finish(),
            None => write!(f, "ImmutablePair::EMPTY"),
        }
    }
}

// Serialized as `[left, right]`, the empty sentinel as `null`.
impl<L: Serialize, R: Serialize> Serialize for ImmutablePair<L, R> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_tuple().serialize(serializer)
    }
}

impl<'de, L: Deserialize<'de>, R: Deserialize<'de>> Deserialize<'de> for ImmutablePair<L, R> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<(L, R)>::deserialize(deserializer).map(|slots| slots.map_or(Self::EMPTY, Self::from))
    }
}
