use crate::{alias, cycle};
use crate::error::{Error, Result, Tree};
use crate::merge::{Merger, Outcome};
use crate::pins::Pins;
use crate::value::Value;

/// Computes the next snapshot, sharing as much as possible with `previous`.
///
/// The result is deeply equal to `current`. Subtrees that did not change are
/// taken from `previous`, so comparing a subtree of the result with the same
/// subtree of `previous` by [`Value::same`] tells whether it changed.
///
/// Mappings designated by `pins` keep their identity even if their content
/// changed: they, and every container held by them, are overwritten in place.
/// **This mutates `previous`.** Any handle into a pinned region observes the
/// new content, so never assume that content under a pin stays constant
/// across calls, only its identity. The returned root is always a new value
/// when anything changed, even if all changes were absorbed in place.
///
/// Cyclic trees are not supported and recurse without bound. Neither are
/// containers in a pinned region that are also reachable from elsewhere in
/// `previous` or `current`: overwriting them would change the other places
/// as well. Use [`try_memoize`] if the input may be cyclic or shared.
///
/// ```
/// use memotree::{memoize, Map, Pins, Value};
///
/// let tree = |n: i64| -> Value {
///     let counter: Map = [("n", n)].into_iter().collect();
///     let labels: Map = [("title", "counter")].into_iter().collect();
///     [("counter", Value::Map(counter)), ("labels", Value::Map(labels))]
///         .into_iter()
///         .collect::<Map>()
///         .into()
/// };
///
/// let previous = tree(1);
/// let next = memoize(tree(2), previous.clone(), &Pins::new());
/// assert_eq!(next, tree(2));
/// assert!(Value::same(&next.get("labels").unwrap(), &previous.get("labels").unwrap()));
/// assert!(!Value::same(&next.get("counter").unwrap(), &previous.get("counter").unwrap()));
/// ```
pub fn memoize(current: Value, previous: Value, pins: &Pins) -> Value {
    let outcome = Merger::new(pins).merge(&current, &previous, false);
    let (value, root) = match outcome {
        Outcome::Unchanged => (previous, Root::Unchanged),
        Outcome::Replaced(value) => (value, Root::Replaced),
        // Everything was absorbed in place, but the root must still reveal
        // that something changed.
        Outcome::Mutated => (previous.shallow_copy(), Root::Forced),
    };

    register(root);
    value
}

/// Like [`memoize`], but rejects cyclic snapshots and pinned containers that
/// are shared with other places before touching anything.
pub fn try_memoize(current: Value, previous: Value, pins: &Pins) -> Result<Value> {
    check(&current, Tree::Current)?;
    check(&previous, Tree::Previous)?;
    if let Some((tree, path)) = alias::find(&current, &previous, pins) {
        tracing::debug!(%tree, %path, "rejected shared pinned container");
        return Err(Error::Aliased { tree, path });
    }
    Ok(memoize(current, previous, pins))
}

/// Fail if a snapshot is cyclic.
pub(crate) fn check(value: &Value, tree: Tree) -> Result<()> {
    match cycle::find(value) {
        Some(path) => {
            tracing::debug!(%tree, %path, "rejected cyclic snapshot");
            Err(Error::Cycle { tree, path })
        }
        None => Ok(()),
    }
}

/// What happened to the root of a snapshot.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Root {
    /// Nothing changed. The previous root was returned.
    Unchanged,
    /// The root was replaced by a new value.
    Replaced,
    /// All changes were made in place below the root, so a shallow copy of the
    /// previous root was returned.
    Forced,
}

/// Record the root outcome of a call.
pub(crate) fn register(root: Root) {
    tracing::trace!(?root, "memoized snapshot");

    #[cfg(feature = "testing")]
    crate::testing::register(root);
}

#[cfg(test)]
mod tests {
    use quickcheck::{Arbitrary, Gen};

    use super::*;
    use crate::path::{Path, Segment};
    use crate::value::{Map, Seq};

    fn map<const N: usize>(entries: [(&str, Value); N]) -> Value {
        Value::Map(entries.into_iter().collect())
    }

    #[test]
    fn test_forced_root() {
        let pins = Pins::from_paths([""]);
        let prev = map([("a", map([("b", Value::Int(1))]))]);
        let inner = prev.get("a").unwrap();
        let next = memoize(map([("a", map([("b", Value::Int(2))]))]), prev.clone(), &pins);
        assert!(!Value::same(&next, &prev));
        assert!(Value::same(&next.get("a").unwrap(), &inner));
        assert_eq!(next.lookup("a.b"), Some(Value::Int(2)));
    }

    #[test]
    fn test_try_memoize_rejects_cycles() {
        let looped = Map::new();
        looped.insert("next", looped.clone());
        let prev = map([("a", Value::Int(1))]);

        let err = try_memoize(Value::Map(looped.clone()), prev.clone(), &Pins::from_paths([""]))
            .unwrap_err();
        assert_eq!(err, Error::Cycle { tree: Tree::Current, path: "next".into() });
        assert_eq!(err.to_string(), "memotree: current snapshot contains a cycle at `next`");
        // Nothing was mutated.
        assert_eq!(prev, map([("a", Value::Int(1))]));

        let err = try_memoize(prev.clone(), Value::Map(looped.clone()), &Pins::new())
            .unwrap_err();
        assert!(matches!(err, Error::Cycle { tree: Tree::Previous, .. }));
        looped.remove("next");
    }

    #[test]
    fn test_try_memoize_rejects_shared_pinned_containers() {
        let shared = Value::Seq(Seq::from_vec(vec![Value::Int(1)]));
        let prev = map([("b", shared.clone()), ("a", map([("x", shared.clone())]))]);
        let cur = map([
            ("b", Value::Seq(Seq::from_vec(vec![Value::Int(1)]))),
            ("a", map([("x", Value::Seq(Seq::from_vec(vec![Value::Int(2)])))])),
        ]);
        let pins = Pins::from_paths(["a"]);

        let err = try_memoize(cur.clone(), prev.clone(), &pins).unwrap_err();
        assert_eq!(err, Error::Aliased { tree: Tree::Previous, path: "a.x".into() });
        assert_eq!(shared, Value::Seq(Seq::from_vec(vec![Value::Int(1)])));

        // Without the pin, nothing is overwritten and sharing is harmless.
        let next = try_memoize(cur.clone(), prev, &Pins::new()).unwrap();
        assert_eq!(next, cur);
    }

    /// A tree shape without identity, for property tests.
    #[derive(Debug, Clone)]
    enum Shape {
        Absent,
        Null,
        Bool(bool),
        Int(i8),
        Seq(Vec<Shape>),
        Map(Vec<(u8, Shape)>),
    }

    impl Shape {
        fn generate(g: &mut Gen, depth: usize) -> Self {
            let choices: &[u8] = if depth == 0 { &[0, 1, 2, 3] } else { &[0, 1, 2, 3, 4, 5, 5] };
            match g.choose(choices) {
                Some(0) => Self::Absent,
                Some(1) => Self::Null,
                Some(2) => Self::Bool(bool::arbitrary(g)),
                Some(3) => Self::Int(i8::arbitrary(g) % 3),
                Some(4) => Self::Seq(
                    (0..usize::arbitrary(g) % 4)
                        .map(|_| Self::generate(g, depth - 1))
                        .collect(),
                ),
                _ => Self::Map(
                    (0..usize::arbitrary(g) % 4)
                        .map(|_| (u8::arbitrary(g) % 4, Self::generate(g, depth - 1)))
                        .collect(),
                ),
            }
        }

        fn build(&self) -> Value {
            match self {
                Self::Absent => Value::Absent,
                Self::Null => Value::Null,
                Self::Bool(v) => Value::Bool(*v),
                Self::Int(v) => Value::Int(i64::from(*v)),
                Self::Seq(items) => Value::Seq(items.iter().map(Self::build).collect()),
                Self::Map(entries) => Value::Map(
                    entries.iter().map(|(k, v)| (format!("k{k}"), v.build())).collect(),
                ),
            }
        }
    }

    impl Arbitrary for Shape {
        fn arbitrary(g: &mut Gen) -> Self {
            Self::generate(g, 3)
        }
    }

    /// Collect the paths of all mappings in a tree.
    fn mapping_paths(value: &Value, path: &mut Path, out: &mut Vec<String>) {
        match value {
            Value::Seq(seq) => {
                for (i, item) in seq.to_vec().iter().enumerate() {
                    path.push(Segment::Index(i));
                    mapping_paths(item, path, out);
                    path.pop();
                }
            }
            Value::Map(map) => {
                out.push(path.as_str().to_owned());
                for (key, item) in map.entries() {
                    path.push(Segment::Key(&key));
                    mapping_paths(&item, path, out);
                    path.pop();
                }
            }
            _ => {}
        }
    }

    fn pins_for(previous: &Value, picks: &[u8]) -> Pins {
        let mut paths = vec![];
        mapping_paths(previous, &mut Path::new(), &mut paths);
        if paths.is_empty() {
            return Pins::new();
        }
        Pins::from_paths(picks.iter().map(|&i| paths[usize::from(i) % paths.len()].clone()))
    }

    #[quickcheck_macros::quickcheck]
    fn test_result_equals_current(current: Shape, previous: Shape, picks: Vec<u8>) -> bool {
        let previous = previous.build();
        let pins = pins_for(&previous, &picks);
        memoize(current.build(), previous, &pins) == current.build()
    }

    #[quickcheck_macros::quickcheck]
    fn test_no_mutation_without_pins(current: Shape, previous: Shape) -> bool {
        let prev = previous.build();
        memoize(current.build(), prev.clone(), &Pins::new());
        prev == previous.build()
    }

    /// Whether every node of `next` that is the same as its counterpart in
    /// `previous` still has the content recorded in `copy`.
    fn reused_nodes_unchanged(next: &Value, previous: &Value, copy: &Value) -> bool {
        if Value::same(next, previous) {
            return next == copy;
        }

        match (next, previous, copy) {
            (Value::Seq(next), Value::Seq(prev), Value::Seq(copy)) => {
                let (next, prev, copy) = (next.to_vec(), prev.to_vec(), copy.to_vec());
                next.iter()
                    .zip(&prev)
                    .zip(&copy)
                    .all(|((n, p), c)| reused_nodes_unchanged(n, p, c))
            }
            (Value::Map(next), Value::Map(prev), Value::Map(copy)) => {
                next.entries().iter().all(|(key, n)| match (prev.get(key), copy.get(key)) {
                    (Some(p), Some(c)) => reused_nodes_unchanged(n, &p, &c),
                    _ => true,
                })
            }
            _ => true,
        }
    }

    #[quickcheck_macros::quickcheck]
    fn test_reused_nodes_keep_content(current: Shape, previous: Shape) -> bool {
        let prev = previous.build();
        let next = memoize(current.build(), prev.clone(), &Pins::new());
        reused_nodes_unchanged(&next, &prev, &previous.build())
    }

    #[quickcheck_macros::quickcheck]
    fn test_equal_snapshot_keeps_identity(shape: Shape, picks: Vec<u8>) -> bool {
        let previous = shape.build();
        let pins = pins_for(&previous, &picks);
        Value::same(&memoize(shape.build(), previous.clone(), &pins), &previous)
    }

    #[quickcheck_macros::quickcheck]
    fn test_repeated_updates_converge(steps: Vec<Shape>, picks: Vec<u8>) -> bool {
        let mut previous = Value::Seq(Seq::new());
        for shape in &steps {
            let pins = pins_for(&previous, &picks);
            previous = memoize(shape.build(), previous, &pins);
            if previous != shape.build() {
                return false;
            }
        }
        true
    }
}
