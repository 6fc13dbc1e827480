use std::fmt::{self, Display, Formatter, Write};

/// A step from a container to one of its children.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Segment<'a> {
    /// A key in a mapping.
    Key(&'a str),
    /// An index in a sequence.
    Index(usize),
}

impl Display for Segment<'_> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Key(key) => f.pad(key),
            Self::Index(index) => index.fmt(f),
        }
    }
}

impl<'a> From<&'a str> for Segment<'a> {
    fn from(key: &'a str) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for Segment<'_> {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// The canonical path of a node, maintained while walking a tree.
///
/// Segments are joined with dots, so the path to the first channel of a
/// server renders as `server.channels.0`. The root renders as the empty
/// string.
#[derive(Debug, Default, Clone)]
pub struct Path {
    /// The rendered path.
    buf: String,
    /// The length of `buf` before each pushed segment and its separator.
    marks: Vec<usize>,
}

impl Path {
    /// Create the root path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Render a sequence of segments canonically.
    pub fn render<'a>(segments: impl IntoIterator<Item = Segment<'a>>) -> String {
        let mut path = Self::new();
        for segment in segments {
            path.push(segment);
        }
        path.buf
    }

    /// Descend into a child.
    pub fn push(&mut self, segment: Segment) {
        self.marks.push(self.buf.len());
        if self.marks.len() > 1 {
            self.buf.push('.');
        }
        // Writing into a `String` cannot fail.
        let _ = write!(self.buf, "{segment}");
    }

    /// Return to the parent. Does nothing at the root.
    pub fn pop(&mut self) {
        if let Some(mark) = self.marks.pop() {
            self.buf.truncate(mark);
        }
    }

    /// The rendered path.
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// The number of segments.
    pub fn depth(&self) -> usize {
        self.marks.len()
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.pad(&self.buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        assert_eq!(Path::render([]), "");
        let segments: [Segment; 3] = ["server".into(), "channels".into(), 0.into()];
        assert_eq!(Path::render(segments), "server.channels.0");
        assert_eq!(Path::render(["".into(), "a".into()]), ".a");
    }

    #[test]
    fn test_push_pop() {
        let mut path = Path::new();
        path.push(Segment::Key("server"));
        path.push(Segment::Key("channels"));
        path.push(Segment::Index(12));
        assert_eq!(path.as_str(), "server.channels.12");
        assert_eq!(path.depth(), 3);
        path.pop();
        assert_eq!(path.as_str(), "server.channels");
        path.pop();
        path.pop();
        assert_eq!(path.as_str(), "");
        path.pop();
        assert_eq!(path.depth(), 0);
        path.push(Segment::Key("x"));
        assert_eq!(path.to_string(), "x");
    }
}
