use std::collections::hash_map::Entry;
use std::fmt::{self, Debug, Formatter};
use std::mem;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use rustc_hash::FxHashMap;

use crate::path::Segment;

/// A key in a mapping.
pub type Key = Arc<str>;

/// A node in a snapshot tree.
///
/// Primitives are plain values. Sequences and mappings are shared handles:
/// cloning a [`Seq`] or [`Map`] clones the handle, not the content, and two
/// handles to the same container are the same node. This identity is what
/// [`memoize`](crate::memoize) preserves and what consumers compare with
/// [`Value::same`] to cheaply detect whether a subtree changed.
#[derive(Clone)]
pub enum Value {
    /// The absence of a value.
    Absent,
    /// An explicit null.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Arc<str>),
    /// An ordered, index-addressed container.
    Seq(Seq),
    /// A key-addressed container.
    Map(Map),
}

/// The structural kind of a [`Value`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Kind {
    Primitive,
    Sequence,
    Mapping,
}

impl Value {
    /// The structural kind of this value.
    pub fn kind(&self) -> Kind {
        match self {
            Self::Seq(_) => Kind::Sequence,
            Self::Map(_) => Kind::Mapping,
            _ => Kind::Primitive,
        }
    }

    /// Whether this value is a sequence or a mapping.
    pub fn is_container(&self) -> bool {
        self.kind() != Kind::Primitive
    }

    /// Whether two values are the same node.
    ///
    /// Containers are the same if they are the same handle. Primitives have no
    /// identity beyond their value and are compared by equality, so `NaN` is
    /// never the same as itself.
    pub fn same(a: &Self, b: &Self) -> bool {
        match (a, b) {
            (Self::Seq(a), Self::Seq(b)) => Seq::ptr_eq(a, b),
            (Self::Map(a), Self::Map(b)) => Map::ptr_eq(a, b),
            (Self::Seq(_) | Self::Map(_), _) | (_, Self::Seq(_) | Self::Map(_)) => false,
            _ => a == b,
        }
    }

    /// Copies one level of a container into a new container.
    ///
    /// The children are shared with `self`. Primitives are returned as is.
    pub fn shallow_copy(&self) -> Self {
        match self {
            Self::Seq(seq) => Self::Seq(Seq::from_vec(seq.to_vec())),
            Self::Map(map) => Self::Map(map.entries().into_iter().collect()),
            _ => self.clone(),
        }
    }

    /// Whether this is [`Value::Absent`].
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Whether this is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Self::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::Int(v) => Some(v),
            _ => None,
        }
    }

    /// The value as a float. Integers are converted.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Int(v) => Some(v as f64),
            Self::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&Seq> {
        match self {
            Self::Seq(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// The value under `key` if this is a mapping.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.as_map()?.get(key)
    }

    /// The element at `index` if this is a sequence.
    pub fn at(&self, index: usize) -> Option<Value> {
        self.as_seq()?.get(index)
    }

    /// Resolves a canonical dot-joined path like `server.channels.0`.
    ///
    /// Segments address keys in mappings and indices in sequences. The empty
    /// path resolves to `self`.
    pub fn lookup(&self, path: &str) -> Option<Value> {
        if path.is_empty() {
            return Some(self.clone());
        }

        path.split('.').try_fold(self.clone(), |node, segment| match &node {
            Self::Map(map) => map.get(segment),
            Self::Seq(seq) => seq.get(segment.parse().ok()?),
            _ => None,
        })
    }

    /// Resolves a path given as segments.
    ///
    /// Unlike [`lookup`](Self::lookup), keys may contain dots.
    pub fn pointer(&self, segments: &[Segment]) -> Option<Value> {
        segments.iter().try_fold(self.clone(), |node, segment| match (segment, &node) {
            (Segment::Key(key), Self::Map(map)) => map.get(key),
            (Segment::Index(i), Self::Seq(seq)) => seq.get(*i),
            _ => None,
        })
    }

    /// The address of a container's storage, used for identity bookkeeping.
    pub(crate) fn addr(&self) -> Option<usize> {
        match self {
            Self::Seq(seq) => Some(Arc::as_ptr(&seq.0) as *const () as usize),
            Self::Map(map) => Some(Arc::as_ptr(&map.0) as *const () as usize),
            _ => None,
        }
    }
}

/// Deep structural equality. Key order in mappings is ignored.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Absent, Self::Absent) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Seq(a), Self::Seq(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Absent => f.pad("absent"),
            Self::Null => f.pad("null"),
            Self::Bool(v) => v.fmt(f),
            Self::Int(v) => v.fmt(f),
            Self::Float(v) => v.fmt(f),
            Self::Str(v) => v.fmt(f),
            Self::Seq(v) => v.fmt(f),
            Self::Map(v) => v.fmt(f),
        }
    }
}

/// A shared, interiorly mutable sequence.
///
/// Holding a `Seq` across calls to [`memoize`](crate::memoize) observes
/// in-place mutation if the sequence lies inside a pinned region: its identity
/// stays, its content does not.
#[derive(Clone, Default)]
pub struct Seq(Arc<RwLock<Vec<Value>>>);

impl Seq {
    /// Create an empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sequence from its elements.
    pub fn from_vec(items: Vec<Value>) -> Self {
        Self(Arc::new(RwLock::new(items)))
    }

    /// Whether two handles point to the same sequence.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// The element at `index`.
    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.read().get(index).cloned()
    }

    /// Append an element.
    pub fn push(&self, value: impl Into<Value>) {
        self.0.write().push(value.into());
    }

    /// Replace the element at `index`.
    ///
    /// Returns the previous element, or `None` without modifying the sequence
    /// if `index` is out of bounds.
    pub fn set(&self, index: usize, value: impl Into<Value>) -> Option<Value> {
        let mut items = self.0.write();
        let slot = items.get_mut(index)?;
        Some(mem::replace(slot, value.into()))
    }

    /// Copy out the element handles.
    pub fn to_vec(&self) -> Vec<Value> {
        self.0.read().clone()
    }

    /// Lock the sequence for reading.
    ///
    /// Do not call [`memoize`](crate::memoize) while holding the guard.
    pub fn read(&self) -> RwLockReadGuard<'_, Vec<Value>> {
        self.0.read()
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Vec<Value>> {
        self.0.write()
    }
}

impl PartialEq for Seq {
    fn eq(&self, other: &Self) -> bool {
        if Self::ptr_eq(self, other) {
            return true;
        }

        let (a, b) = (self.0.read_recursive(), other.0.read_recursive());
        *a == *b
    }
}

impl Debug for Seq {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_list().entries(self.0.read_recursive().iter()).finish()
    }
}

impl<V: Into<Value>> FromIterator<V> for Seq {
    fn from_iter<T: IntoIterator<Item = V>>(iter: T) -> Self {
        Self::from_vec(iter.into_iter().map(Into::into).collect())
    }
}

/// A shared, interiorly mutable mapping with unique keys.
///
/// Entries keep their insertion order. Like [`Seq`], a `Map` inside a pinned
/// region is mutated in place by [`memoize`](crate::memoize).
#[derive(Clone, Default)]
pub struct Map(Arc<RwLock<Entries>>);

impl Map {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether two handles point to the same mapping.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    pub fn len(&self) -> usize {
        self.0.read().vec.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().vec.is_empty()
    }

    /// The value under `key`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.read().get(key).cloned()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.read().index.contains_key(key)
    }

    /// Insert a value, returning the one it replaced.
    ///
    /// Replacing keeps the key's position.
    pub fn insert(&self, key: impl Into<Key>, value: impl Into<Value>) -> Option<Value> {
        self.0.write().insert(key.into(), value.into())
    }

    /// Remove a key, returning its value.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.0.write().remove(key)
    }

    /// The keys in insertion order.
    pub fn keys(&self) -> Vec<Key> {
        self.0.read().vec.iter().map(|(key, _)| key.clone()).collect()
    }

    /// Copy out the entries in insertion order.
    pub fn entries(&self) -> Vec<(Key, Value)> {
        self.0.read().vec.clone()
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        self.0.write()
    }
}

impl PartialEq for Map {
    fn eq(&self, other: &Self) -> bool {
        if Self::ptr_eq(self, other) {
            return true;
        }

        let (a, b) = (self.0.read_recursive(), other.0.read_recursive());
        a.vec.len() == b.vec.len()
            && a.vec.iter().all(|(key, value)| b.get(key) == Some(value))
    }
}

impl Debug for Map {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let entries = self.0.read_recursive();
        f.debug_map()
            .entries(entries.vec.iter().map(|(key, value)| (key, value)))
            .finish()
    }
}

impl<K: Into<Key>, V: Into<Value>> FromIterator<(K, V)> for Map {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut entries = Entries::default();
        for (key, value) in iter {
            entries.insert(key.into(), value.into());
        }
        Self(Arc::new(RwLock::new(entries)))
    }
}

/// The storage of a [`Map`].
///
/// The entries live in order in `vec`, `index` maps each key to its position.
#[derive(Clone, Default)]
pub(crate) struct Entries {
    vec: Vec<(Key, Value)>,
    index: FxHashMap<Key, usize>,
}

impl Entries {
    fn get(&self, key: &str) -> Option<&Value> {
        self.index.get(key).map(|&i| &self.vec[i].1)
    }

    pub(crate) fn insert(&mut self, key: Key, value: Value) -> Option<Value> {
        match self.index.entry(key) {
            Entry::Occupied(entry) => {
                Some(mem::replace(&mut self.vec[*entry.get()].1, value))
            }
            Entry::Vacant(entry) => {
                let i = self.vec.len();
                self.vec.push((entry.key().clone(), value));
                entry.insert(i);
                None
            }
        }
    }

    pub(crate) fn remove(&mut self, key: &str) -> Option<Value> {
        let i = self.index.remove(key)?;
        let (_, value) = self.vec.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Some(value)
    }
}
