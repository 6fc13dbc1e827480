use std::cell::Cell;

use crate::memoize::Root;

thread_local! {
    /// What happened to the root during the last call on this thread.
    static LAST_ROOT: Cell<Option<Root>> = const { Cell::new(None) };
}

/// What happened to the root during the last call on this thread.
pub fn last_root() -> Option<Root> {
    LAST_ROOT.with(|cell| cell.get())
}

/// Records the root outcome of a call.
pub(crate) fn register(root: Root) {
    LAST_ROOT.with(|cell| cell.set(Some(root)))
}
