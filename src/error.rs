use std::fmt::{self, Display, Formatter};

/// A result with a memotree [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors reported by the checked entry points.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A container contains itself. The path points at the handle that closes
    /// the cycle.
    #[error("memotree: {tree} snapshot contains a cycle at `{path}`")]
    Cycle { tree: Tree, path: String },
    /// A container that would be overwritten in place is also reachable from
    /// elsewhere. The path points at the second place it was reached at.
    #[error("memotree: {tree} snapshot shares a pinned container at `{path}`")]
    Aliased { tree: Tree, path: String },
}

/// Which of the two snapshots an error refers to.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Tree {
    Current,
    Previous,
}

impl Display for Tree {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.pad(match self {
            Self::Current => "current",
            Self::Previous => "previous",
        })
    }
}
