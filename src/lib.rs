//! Functional helpers for bulk data reduction.
//!
//! * [`collector`]: collectors building null-tolerant maps, concurrent sets and multimaps
//! * [`reduce`]: sequential, parallel and concurrent drivers running a collector
//! * [`pair`]: an immutable, optional-like pair with map/filter/flat_map chaining
//! * [`sequence`]: a lazy single-pass adapter over any iterator

#[macro_use]
mod macros;

pub mod collector;
pub mod error;
pub mod pair;
pub mod reduce;
pub mod sequence;

pub use collector::{Characteristics, Collector, ConcurrentCollector};
pub use error::{CollectError, CollectResult};
pub use pair::ImmutablePair;
pub use reduce::{CollectExt, ParallelReducer};
pub use sequence::Sequence;
