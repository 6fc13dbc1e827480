//! In-place overwrites of containers.
//!
//! Every function here changes the content of an existing container and never
//! its identity. This is how pinned regions absorb changes.

use crate::value::{Key, Map, Seq, Value};

/// Overwrite `target` with the content of `source`.
///
/// Does nothing unless both are containers of the same kind. Afterwards
/// `target` is deeply equal to `source`. Mappings below `target` that have a
/// mapping counterpart in `source` are overwritten recursively and keep their
/// identity, as do sequences. Elements of overwritten sequences are taken from
/// `source` as is.
pub fn deep(target: &Value, source: &Value) {
    match (target, source) {
        (Value::Seq(target), Value::Seq(source)) => deep_seq(target, source),
        (Value::Map(target), Value::Map(source)) => deep_map(target, source),
        _ => {}
    }
}

/// Overwrite a sequence with the elements of another one.
pub fn deep_seq(target: &Seq, source: &Seq) {
    if Seq::ptr_eq(target, source) {
        return;
    }

    refill(target, source.to_vec());
}

/// Overwrite a mapping with the entries of another one.
///
/// Keys of `target` that are missing in `source` are removed.
pub fn deep_map(target: &Map, source: &Map) {
    if Map::ptr_eq(target, source) {
        return;
    }

    let mut assignments = vec![];
    for (key, new) in source.entries() {
        match target.get(&key) {
            Some(old) if old.is_container() && old.kind() == new.kind() => deep(&old, &new),
            _ => assignments.push((key, new)),
        }
    }

    let stale: Vec<Key> =
        target.keys().into_iter().filter(|key| !source.contains_key(key)).collect();

    let mut entries = target.write();
    for key in stale {
        entries.remove(&key);
    }
    for (key, value) in assignments {
        entries.insert(key, value);
    }
}

/// Assign values onto existing keys or new keys of a mapping.
pub fn assign(target: &Map, changes: impl IntoIterator<Item = (Key, Value)>) {
    let mut entries = target.write();
    for (key, value) in changes {
        entries.insert(key, value);
    }
}

/// Replace all elements of a sequence, keeping the container.
pub fn refill(target: &Seq, items: Vec<Value>) {
    let mut vec = target.write();
    vec.clear();
    vec.extend(items);
}
