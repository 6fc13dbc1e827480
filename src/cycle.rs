use rustc_hash::FxHashSet;

use crate::path::{Path, Segment};
use crate::value::Value;

/// Find a container that contains itself.
///
/// Returns the canonical path of the first handle found that points back at
/// one of its ancestors. Subtrees shared between several parents are not
/// cycles.
pub fn find(value: &Value) -> Option<String> {
    let mut walker = Walker::default();
    walker.visit(value).then(|| walker.path.as_str().to_owned())
}

#[derive(Default)]
struct Walker {
    /// Containers on the way from the root to the current node.
    ancestors: FxHashSet<usize>,
    /// Containers whose subtrees are known to be acyclic.
    done: FxHashSet<usize>,
    path: Path,
}

impl Walker {
    /// Returns true if a cycle was found. The path then points at it.
    fn visit(&mut self, value: &Value) -> bool {
        let Some(addr) = value.addr() else { return false };
        if self.done.contains(&addr) {
            return false;
        }
        if !self.ancestors.insert(addr) {
            return true;
        }

        let found = match value {
            Value::Seq(seq) => seq
                .to_vec()
                .iter()
                .enumerate()
                .any(|(i, item)| self.descend(Segment::Index(i), item)),
            Value::Map(map) => {
                map.entries().iter().any(|(key, item)| self.descend(Segment::Key(key), item))
            }
            _ => false,
        };

        if !found {
            self.ancestors.remove(&addr);
            self.done.insert(addr);
        }

        found
    }

    fn descend(&mut self, segment: Segment, value: &Value) -> bool {
        self.path.push(segment);
        let found = self.visit(value);
        if !found {
            self.path.pop();
        }
        found
    }
}
