use std::iter::{FusedIterator, Fuse};

use crate::error::{CollectError, CollectResult};

/// Lazy, single-pass view over an iterator.
///
/// Nothing is pulled from the wrapped iterator until the sequence is consumed, and once it has
/// reported exhaustion it keeps returning `None`.
#[derive(Debug, Clone)]
pub struct Sequence<I> {
    inner: Fuse<I>,
}

pub fn of<I: IntoIterator>(iter: I) -> Sequence<I::IntoIter> {
    Sequence {
        inner: iter.into_iter().fuse(),
    }
}

/// Like [`of`], but fails up front when no iterator is given
pub fn try_of<I: IntoIterator>(iter: Option<I>) -> CollectResult<Sequence<I::IntoIter>> {
    match iter {
        Some(iter) => Ok(of(iter)),
        None => log_and_err!(CollectError::invalid_argument("iterator must not be absent")),
    }
}

impl<I: Iterator> Iterator for Sequence<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<I: Iterator> FusedIterator for Sequence<I> {}
