//! Structural memoization of tree snapshots.
//!
//! Given a freshly observed snapshot of a tree (nested mappings and sequences
//! ending in primitives) and the previously returned one, [`memoize`] computes
//! a snapshot that is deeply equal to the new one but reuses every unchanged
//! subtree of the previous one by reference. Consumers can thus detect changes
//! by comparing handles with [`Value::same`] instead of comparing content.
//!
//! Mappings designated by [`Pins`] keep their identity even when their
//! content changes: they are overwritten in place, together with every
//! container they hold. The root of the returned snapshot still changes
//! whenever anything changed.
//!
//! ```
//! use memotree::{memoize, Pins, Seq, Value};
//!
//! let previous = Value::from(vec![Value::from(vec![1, 2]), Value::from(vec![3])]);
//! let current = Value::from(vec![Value::from(vec![1, 2]), Value::from(vec![4])]);
//!
//! let next = memoize(current, previous.clone(), &Pins::new());
//! assert!(!Value::same(&next, &previous));
//! assert!(Value::same(&next.at(0).unwrap(), &previous.at(0).unwrap()));
//! let (new, old) = (next.at(1).unwrap(), previous.at(1).unwrap());
//! assert!(!Seq::ptr_eq(new.as_seq().unwrap(), old.as_seq().unwrap()));
//! ```

mod alias;
mod convert;
mod cycle;
mod error;
mod memo;
mod memoize;
mod merge;
mod overwrite;
mod path;
mod pins;
#[cfg(feature = "testing")]
mod testing;
mod value;

pub use crate::alias::find as find_alias;
pub use crate::convert::IntoValue;
pub use crate::cycle::find as find_cycle;
pub use crate::error::{Error, Result, Tree};
pub use crate::memo::Memo;
pub use crate::memoize::{Root, memoize, try_memoize};
pub use crate::path::{Path, Segment};
pub use crate::pins::Pins;
pub use crate::value::{Key, Kind, Map, Seq, Value};

#[cfg(feature = "macros")]
pub use memotree_macros::IntoValue;

/// These are implementation details. Do not rely on them!
#[doc(hidden)]
pub mod internal {
    pub use crate::merge::{Merger, Outcome};

    #[cfg(feature = "testing")]
    pub use crate::testing::last_root;
}
