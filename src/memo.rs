use std::fmt::{self, Debug, Formatter};

use parking_lot::Mutex;

use crate::error::{Result, Tree};
use crate::memoize::{Root, check, memoize, register, try_memoize};
use crate::pins::Pins;
use crate::value::Value;

/// Holds the last memoized snapshot and its pin configuration.
///
/// Feed each freshly observed snapshot to [`Memo::update`] and use the returned
/// value downstream. Updates are serialized, so a `Memo` can be shared between
/// threads.
///
/// ```
/// use memotree::{Memo, Pins, Value};
///
/// let memo = Memo::new(Pins::new());
/// let first = memo.update(Value::from(vec![1, 2, 3]));
/// let second = memo.update(Value::from(vec![1, 2, 3]));
/// assert!(Value::same(&first, &second));
/// ```
pub struct Memo {
    pins: Pins,
    /// The last returned snapshot.
    slot: Mutex<Option<Value>>,
}

impl Memo {
    /// Create an empty memo with the given pins.
    pub fn new(pins: Pins) -> Self {
        Self { pins, slot: Mutex::new(None) }
    }

    /// The pin configuration.
    pub fn pins(&self) -> &Pins {
        &self.pins
    }

    /// Memoize a new snapshot against the stored one and store the result.
    ///
    /// The first snapshot is stored and returned as is.
    pub fn update(&self, current: Value) -> Value {
        let mut slot = self.slot.lock();
        let next = match slot.take() {
            Some(previous) => memoize(current, previous, &self.pins),
            None => {
                register(Root::Replaced);
                current
            }
        };
        *slot = Some(next.clone());
        next
    }

    /// Like [`update`](Self::update), but rejects cyclic snapshots.
    ///
    /// On error, the stored snapshot is left untouched.
    pub fn try_update(&self, current: Value) -> Result<Value> {
        let mut slot = self.slot.lock();
        let next = match slot.as_ref() {
            Some(previous) => try_memoize(current, previous.clone(), &self.pins)?,
            None => {
                check(&current, Tree::Current)?;
                register(Root::Replaced);
                current
            }
        };
        *slot = Some(next.clone());
        Ok(next)
    }

    /// The last returned snapshot.
    pub fn get(&self) -> Option<Value> {
        self.slot.lock().clone()
    }

    /// Forget the stored snapshot. The next update starts from scratch.
    pub fn reset(&self) {
        self.slot.lock().take();
    }
}

impl Default for Memo {
    fn default() -> Self {
        Self::new(Pins::new())
    }
}

impl Debug for Memo {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Memo").field("pins", &self.pins).finish_non_exhaustive()
    }
}
