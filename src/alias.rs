use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::Tree;
use crate::path::{Path, Segment};
use crate::pins::Pins;
use crate::value::Value;

/// Find a container that [`memoize`](crate::memoize) may overwrite in place
/// while it is also reachable from somewhere else.
///
/// The containers `memoize` may overwrite are the pinned mappings of
/// `previous`, every mapping below them, and the sequences those mappings
/// hold directly. Overwriting such a container would also change every other
/// place it appears in, so each of them must be reachable through exactly one
/// path of `previous`. `current` may hold one of them only at that same path.
///
/// Returns which snapshot holds the offending handle and the path it was
/// reached at. Both snapshots must be acyclic.
pub fn find(current: &Value, previous: &Value, pins: &Pins) -> Option<(Tree, String)> {
    let mut walker = Previous {
        pins,
        path: Path::new(),
        seen: FxHashMap::default(),
        region: FxHashMap::default(),
    };
    if walker.visit(previous, false).is_err() {
        return Some((Tree::Previous, walker.path.as_str().to_owned()));
    }

    let mut walker = Current {
        region: walker.region,
        done: FxHashSet::default(),
        path: Path::new(),
    };
    walker
        .visit(current)
        .is_err()
        .then(|| (Tree::Current, walker.path.as_str().to_owned()))
}

/// Raised when an aliased container was found. The walker's path points at it.
struct Aliased;

struct Previous<'a> {
    pins: &'a Pins,
    path: Path,
    /// For every visited container, whether its subtree reached into a region
    /// that may be overwritten.
    seen: FxHashMap<usize, bool>,
    /// Containers that may be overwritten, with their paths.
    region: FxHashMap<usize, String>,
}

impl Previous<'_> {
    /// Returns whether the subtree reaches into an overwritable region.
    fn visit(&mut self, value: &Value, inherited: bool) -> Result<bool, Aliased> {
        let Some(addr) = value.addr() else { return Ok(false) };
        let overwritable = match value {
            Value::Map(_) => inherited || self.pins.is_pinned(self.path.as_str()),
            _ => inherited,
        };

        if let Some(&reached) = self.seen.get(&addr) {
            return if reached || overwritable || self.pins_below() {
                Err(Aliased)
            } else {
                Ok(false)
            };
        }

        if overwritable {
            self.region.insert(addr, self.path.as_str().to_owned());
        }

        let mut reached = overwritable;
        match value {
            Value::Seq(seq) => {
                for (i, item) in seq.to_vec().iter().enumerate() {
                    self.path.push(Segment::Index(i));
                    reached |= self.visit(item, false)?;
                    self.path.pop();
                }
            }
            Value::Map(map) => {
                for (key, item) in map.entries() {
                    self.path.push(Segment::Key(&key));
                    reached |= self.visit(&item, overwritable)?;
                    self.path.pop();
                }
            }
            _ => {}
        }

        self.seen.insert(addr, reached);
        Ok(reached)
    }

    /// Whether a pin names a strict descendant of the current path.
    fn pins_below(&self) -> bool {
        let path = self.path.as_str();
        self.pins.iter().any(|(pin, pinned)| {
            pinned && pin.strip_prefix(path).is_some_and(|rest| rest.starts_with('.'))
        })
    }
}

struct Current {
    region: FxHashMap<usize, String>,
    done: FxHashSet<usize>,
    path: Path,
}

impl Current {
    fn visit(&mut self, value: &Value) -> Result<(), Aliased> {
        let Some(addr) = value.addr() else { return Ok(()) };
        if !self.done.insert(addr) {
            return Ok(());
        }

        // At its own path, the handle is the same on both sides and nothing
        // below it is touched.
        if let Some(home) = self.region.get(&addr) {
            return if home == self.path.as_str() { Ok(()) } else { Err(Aliased) };
        }

        match value {
            Value::Seq(seq) => {
                for (i, item) in seq.to_vec().iter().enumerate() {
                    self.path.push(Segment::Index(i));
                    self.visit(item)?;
                    self.path.pop();
                }
            }
            Value::Map(map) => {
                for (key, item) in map.entries() {
                    self.path.push(Segment::Key(&key));
                    self.visit(&item)?;
                    self.path.pop();
                }
            }
            _ => {}
        }

        Ok(())
    }
}
