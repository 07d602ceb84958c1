use thiserror::Error;

use crate::kind::Kind;
use crate::path::{Path, PathStep};
use crate::value::JsonType;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// The input is not well-formed JSON.
    #[error("syntax error at byte {offset}: {reason}")]
    Syntax { offset: usize, reason: &'static str },

    /// A well-formed value does not fit the destination.
    #[error("type mismatch at '{path}': expected {expected}, found {found} (byte {offset})")]
    TypeMismatch {
        path: Path,
        expected: Kind,
        found: JsonType,
        offset: usize,
    },

    #[error("unsupported type {type_name} at '{path}'")]
    UnsupportedType { path: Path, type_name: &'static str },

    /// A value of a supported type that JSON cannot express, such as NaN.
    #[error("unsupported value at '{path}': {reason}")]
    UnsupportedValue { path: Path, reason: &'static str },

    #[error("decode destination is missing")]
    InvalidDestination,

    #[error("duplicate key '{key}' in {type_name}")]
    DuplicateKey { type_name: &'static str, key: String },

    #[error("{type_name} contains itself by value")]
    CyclicType { type_name: &'static str },

    #[error("nesting exceeds {limit} levels at '{path}'")]
    DepthLimitExceeded { path: Path, limit: usize },
}

impl Error {
    pub(crate) fn syntax(offset: usize, reason: &'static str) -> Self {
        Error::Syntax { offset, reason }
    }

    pub(crate) fn unsupported(type_name: &'static str) -> Self {
        Error::UnsupportedType {
            path: Path::root(),
            type_name,
        }
    }

    pub(crate) fn depth_limit(limit: usize) -> Self {
        Error::DepthLimitExceeded {
            path: Path::root(),
            limit,
        }
    }

    /// Records that the error happened one step below the current level.
    pub(crate) fn under(mut self, step: PathStep) -> Self {
        if let Some(path) = self.path_mut() {
            path.prepend(step);
        }
        self
    }

    pub(crate) fn under_key(self, key: &str) -> Self {
        self.under(PathStep::Key(key.to_string()))
    }

    pub(crate) fn under_index(self, index: usize) -> Self {
        self.under(PathStep::Index(index))
    }

    /// Where in the document the error happened, for errors tied to a value.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Error::TypeMismatch { path, .. }
            | Error::UnsupportedType { path, .. }
            | Error::UnsupportedValue { path, .. }
            | Error::DepthLimitExceeded { path, .. } => Some(path),
            _ => None,
        }
    }

    fn path_mut(&mut self) -> Option<&mut Path> {
        match self {
            Error::TypeMismatch { path, .. }
            | Error::UnsupportedType { path, .. }
            | Error::UnsupportedValue { path, .. }
            | Error::DepthLimitExceeded { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Byte offset into the input, for errors raised while decoding.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::Syntax { offset, .. } | Error::TypeMismatch { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_is_built_outwards() {
        let err = Error::UnsupportedValue {
            path: Path::root(),
            reason: "NaN",
        }
        .under_key("score")
        .under_index(2)
        .under_key("rows");
        assert_eq!(err.path().map(Path::to_pointer), Some("/rows/2/score".into()));
        assert_eq!(
            err.to_string(),
            "unsupported value at '/rows/2/score': NaN"
        );
    }

    #[test]
    fn syntax_errors_carry_offset_but_no_path() {
        let err = Error::syntax(7, "unexpected end of input").under_key("ignored");
        assert_eq!(err.offset(), Some(7));
        assert_eq!(err.path(), None);
    }
}
