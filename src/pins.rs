use rustc_hash::FxHashMap;

/// Designates the mappings whose identity must survive content changes.
///
/// Maps canonical paths (see [`Path`](crate::Path)) to whether they are pinned.
/// A mapping is pinned only if its path matches a `true` entry exactly; there
/// is no prefix or glob matching. Sequences are never looked up. Entries for
/// paths that do not exist in a tree are inert.
///
/// ```
/// use memotree::Pins;
///
/// let pins = Pins::from_paths(["server.channels.0"]);
/// assert!(pins.is_pinned("server.channels.0"));
/// assert!(!pins.is_pinned("server.channels"));
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Pins(FxHashMap<String, bool>);

impl Pins {
    /// Create a configuration without pins.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration pinning each of the given paths.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        paths.into_iter().map(|path| (path, true)).collect()
    }

    /// Pin a path.
    pub fn pin(&mut self, path: impl Into<String>) -> &mut Self {
        self.set(path, true)
    }

    /// Set whether a path is pinned.
    pub fn set(&mut self, path: impl Into<String>, pinned: bool) -> &mut Self {
        self.0.insert(path.into(), pinned);
        self
    }

    /// Whether the mapping at exactly this path is pinned.
    #[inline]
    pub fn is_pinned(&self, path: &str) -> bool {
        self.0.get(path).copied().unwrap_or(false)
    }

    /// Whether no path is pinned.
    pub fn is_empty(&self) -> bool {
        !self.0.values().any(|&pinned| pinned)
    }

    /// The configured entries, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(path, &pinned)| (path.as_str(), pinned))
    }
}

impl<S: Into<String>> FromIterator<(S, bool)> for Pins {
    fn from_iter<T: IntoIterator<Item = (S, bool)>>(iter: T) -> Self {
        let mut pins = Self::new();
        pins.extend(iter);
        pins
    }
}

impl<S: Into<String>> Extend<(S, bool)> for Pins {
    fn extend<T: IntoIterator<Item = (S, bool)>>(&mut self, iter: T) {
        for (path, pinned) in iter {
            self.set(path, pinned);
        }
    }
}
