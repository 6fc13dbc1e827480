use crate::overwrite;
use crate::path::{Path, Segment};
use crate::pins::Pins;
use crate::value::{Key, Map, Seq, Value};

/// How a node relates to its previous counterpart after merging.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Nothing changed. The previous node is reused.
    Unchanged,
    /// The node changed and is represented by the contained value.
    Replaced(Value),
    /// The previous node kept its identity, but its content was overwritten in
    /// place. Its ancestors must not treat it as unchanged.
    Mutated,
}

impl Outcome {
    /// Whether anything below this node changed, in place or not.
    pub fn is_changed(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }

    /// The node to use in the merged tree.
    pub fn resolve(self, previous: &Value) -> Value {
        match self {
            Self::Replaced(value) => value,
            Self::Unchanged | Self::Mutated => previous.clone(),
        }
    }
}

/// Walks a current and a previous tree in lockstep and decides per node
/// whether to reuse, replace, or mutate in place.
pub struct Merger<'a> {
    pins: &'a Pins,
    path: Path,
}

impl<'a> Merger<'a> {
    /// Create a merger at the root path.
    pub fn new(pins: &'a Pins) -> Self {
        Self { pins, path: Path::new() }
    }

    /// Merge `current` into `previous`.
    ///
    /// `inherited` is set when an ancestor mapping is pinned. In that case
    /// containers changed below it are overwritten in place instead of
    /// being reallocated.
    pub fn merge(&mut self, current: &Value, previous: &Value, inherited: bool) -> Outcome {
        if Value::same(current, previous) {
            return Outcome::Unchanged;
        }

        match (current, previous) {
            (Value::Seq(cur), Value::Seq(prev)) => self.merge_seq(cur, prev, inherited),
            (Value::Map(cur), Value::Map(prev)) => self.merge_map(cur, prev, inherited),
            _ => Outcome::Replaced(current.clone()),
        }
    }

    /// Merge two sequences.
    ///
    /// Sequences are never pinned and never pass a pin on to their elements.
    /// Only a sequence held directly by a pinned mapping keeps its container.
    fn merge_seq(&mut self, current: &Seq, previous: &Seq, inherited: bool) -> Outcome {
        let items = current.to_vec();
        let old = previous.to_vec();

        if items.len() != old.len() {
            if inherited {
                overwrite::refill(previous, items);
                return Outcome::Mutated;
            }
            return Outcome::Replaced(Value::Seq(current.clone()));
        }

        let mut changed = false;
        let mut merged = Vec::with_capacity(items.len());
        for (i, (cur, prev)) in items.iter().zip(&old).enumerate() {
            self.path.push(Segment::Index(i));
            let outcome = self.merge(cur, prev, false);
            self.path.pop();
            changed |= outcome.is_changed();
            merged.push(outcome.resolve(prev));
        }

        if !changed {
            Outcome::Unchanged
        } else if inherited {
            overwrite::refill(previous, merged);
            Outcome::Mutated
        } else {
            Outcome::Replaced(Value::Seq(Seq::from_vec(merged)))
        }
    }

    /// Merge two mappings.
    fn merge_map(&mut self, current: &Map, previous: &Map, inherited: bool) -> Outcome {
        let Some(pairs) = pair_up(current, previous) else {
            // The key set changed, so there is no key-by-key merge. Only a pin
            // inherited from an ancestor keeps the container.
            if inherited {
                overwrite::deep_map(previous, current);
                self.trace_mutation(inherited);
                return Outcome::Mutated;
            }
            return Outcome::Replaced(Value::Map(current.clone()));
        };

        let pinned = inherited || self.pins.is_pinned(self.path.as_str());

        let mut changed = false;
        let mut merged = Vec::with_capacity(pairs.len());
        for (key, cur, prev) in pairs {
            self.path.push(Segment::Key(&key));
            let outcome = self.merge(&cur, &prev, pinned);
            self.path.pop();
            changed |= outcome.is_changed();
            merged.push((key, prev, outcome));
        }

        if !changed {
            return Outcome::Unchanged;
        }

        if pinned {
            // Children reporting `Mutated` already live in `previous`. Below a
            // pin, containers absorb their own changes, so only primitives and
            // kind changes remain to be assigned.
            overwrite::assign(
                previous,
                merged.into_iter().filter_map(|(key, _, outcome)| match outcome {
                    Outcome::Replaced(value) => Some((key, value)),
                    Outcome::Unchanged | Outcome::Mutated => None,
                }),
            );
            self.trace_mutation(inherited);
            return Outcome::Mutated;
        }

        Outcome::Replaced(Value::Map(
            merged
                .into_iter()
                .map(|(key, prev, outcome)| (key, outcome.resolve(&prev)))
                .collect(),
        ))
    }

    fn trace_mutation(&self, inherited: bool) {
        tracing::trace!(path = self.path.as_str(), inherited, "mapping mutated in place");
    }
}

/// Pairs every entry of `current` with the value under the same key in
/// `previous`, in the order of `current`.
///
/// Returns `None` if the key sets differ.
fn pair_up(current: &Map, previous: &Map) -> Option<Vec<(Key, Value, Value)>> {
    let entries = current.entries();
    if entries.len() != previous.len() {
        return None;
    }

    entries
        .into_iter()
        .map(|(key, cur)| {
            let prev = previous.get(&key)?;
            Some((key, cur, prev))
        })
        .collect()
}
