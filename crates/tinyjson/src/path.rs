//! Locations inside a document, rendered as RFC 6901 JSON Pointers.
//!
//! Paths are only materialized on the error path: each level of the encoder
//! and the binder prepends its own step while an error propagates outwards,
//! so successful calls never pay for path bookkeeping.

use std::fmt;

/// One step into a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    Key(String),
    Index(usize),
}

/// A location inside a document, outermost step first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path {
    // Stored innermost first, the order steps are discovered in while an
    // error bubbles up.
    rev: Vec<PathStep>,
}

impl Path {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.rev.is_empty()
    }

    /// Steps from the document root inwards.
    pub fn steps(&self) -> impl Iterator<Item = &PathStep> {
        self.rev.iter().rev()
    }

    /// Adds `step` in front of the existing steps.
    pub fn prepend(&mut self, step: PathStep) {
        self.rev.push(step);
    }

    /// Renders the path as a JSON Pointer; the root is the empty string.
    ///
    /// # Example
    ///
    /// ```
    /// use tinyjson::{Path, PathStep};
    ///
    /// let mut path = Path::root();
    /// path.prepend(PathStep::Index(0));
    /// path.prepend(PathStep::Key("packets".into()));
    /// assert_eq!(path.to_pointer(), "/packets/0");
    /// ```
    pub fn to_pointer(&self) -> String {
        let mut out = String::new();
        for step in self.steps() {
            out.push('/');
            match step {
                PathStep::Key(key) => out.push_str(&escape_component(key)),
                PathStep::Index(index) => out.push_str(&index.to_string()),
            }
        }
        out
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_pointer())
    }
}

/// Escapes a JSON Pointer path component.
///
/// `~` becomes `~0` and `/` becomes `~1`.
pub fn escape_component(component: &str) -> String {
    if !component.contains('/') && !component.contains('~') {
        return component.to_string();
    }
    // ~ first, otherwise the ~ introduced by ~1 would be escaped again
    component.replace('~', "~0").replace('/', "~1")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_renders_empty() {
        assert_eq!(Path::root().to_pointer(), "");
        assert!(Path::root().is_root());
    }

    #[test]
    fn steps_are_outermost_first() {
        let mut path = Path::root();
        path.prepend(PathStep::Key("data".into()));
        path.prepend(PathStep::Index(3));
        path.prepend(PathStep::Key("packets".into()));
        assert_eq!(path.to_pointer(), "/packets/3/data");
        assert_eq!(
            path.steps().next(),
            Some(&PathStep::Key("packets".into()))
        );
    }

    #[test]
    fn keys_are_escaped() {
        let mut path = Path::root();
        path.prepend(PathStep::Key("a/b~c".into()));
        assert_eq!(path.to_string(), "/a~1b~0c");
    }
}
