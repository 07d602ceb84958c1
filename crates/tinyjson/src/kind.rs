//! Closed classification of destination shapes.

use std::fmt;

/// The shape of a type as far as JSON is concerned.
///
/// Every encode and decode step dispatches on exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    SignedInt,
    UnsignedInt,
    Float,
    String,
    /// A sequence of single unsigned bytes, written as an array of 0..=255.
    ByteSequence,
    Sequence,
    Record,
    Optional,
    Unsupported,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Bool => "bool",
            Kind::SignedInt => "signed integer",
            Kind::UnsignedInt => "unsigned integer",
            Kind::Float => "float",
            Kind::String => "string",
            Kind::ByteSequence => "byte sequence",
            Kind::Sequence => "sequence",
            Kind::Record => "record",
            Kind::Optional => "optional",
            Kind::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
