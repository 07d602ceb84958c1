//! Type-directed JSON encoding and decoding.
//!
//! A [`TinyJson`] engine renders any [`Reflect`] value as compact JSON and
//! binds JSON text back into a destination of a known type. The first time
//! the engine meets a type it reads the type's static description once and
//! caches a [`TypeDescriptor`]; every later call against that type reuses it.
//! The cache belongs to the engine, so independently configured engines can
//! coexist, and one engine can be shared between threads.
//!
//! Structs take part through the [`record!`] macro:
//!
//! ```
//! use tinyjson::{record, TinyJson};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Packet {
//!     action: u8,
//!     req_id: String,
//!     data: Vec<Vec<u8>>,
//! }
//!
//! record!(Packet {
//!     action,
//!     req_id => "reqID",
//!     data => "data,omitempty",
//! });
//!
//! let json = TinyJson::new();
//! let packet = Packet { action: b'c', req_id: "test-1".into(), data: vec![b"{}".to_vec()] };
//!
//! let bytes = json.encode(&packet).unwrap();
//! assert_eq!(bytes, br#"{"action":99,"reqID":"test-1","data":[[123,125]]}"#);
//!
//! let back: Packet = json.decode_as(&bytes).unwrap();
//! assert_eq!(back, packet);
//! ```
//!
//! Byte sequences (`Vec<u8>`) are written as arrays of integers rather than
//! base64 text. Other JSON consumers expecting base64 will not read them.

mod macros;

pub mod descriptor;
mod decoder;
mod encoder;
pub mod error;
pub mod format;
mod impls;
pub mod kind;
pub mod options;
pub mod path;
pub mod reflect;
pub mod registry;
pub mod tag;
pub mod tokenizer;
pub mod value;

use std::sync::Arc;

pub use descriptor::{FieldDescriptor, Layout, TypeDescriptor, TypeRef};
pub use error::{Error, Result};
pub use format::{NumberCodec, StdNumberCodec};
pub use kind::Kind;
pub use options::{DuplicateKeyPolicy, Options, DEFAULT_MAX_DEPTH};
pub use path::{Path, PathStep};
pub use reflect::{
    DynTyped, FieldInfo, OptionalSlot, Record, Reflect, ReflectMut, ReflectRef, Rejected, Scalar,
    ScalarSlot, Sequence, Shape, TypeInfo, TypeInfoFn, Typed,
};
pub use registry::Registry;
pub use value::{JsonType, Number, Value};

use decoder::Decoder;
use encoder::Encoder;

/// A JSON engine with its own descriptor cache.
///
/// `C` is the number formatting backend; the default one is built on the
/// standard library.
pub struct TinyJson<C: NumberCodec = StdNumberCodec> {
    registry: Registry,
    codec: C,
    options: Options,
}

impl TinyJson {
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    pub fn with_options(options: Options) -> Self {
        Self::with_codec(StdNumberCodec, options)
    }
}

impl<C: NumberCodec + Default> Default for TinyJson<C> {
    fn default() -> Self {
        Self::with_codec(C::default(), Options::default())
    }
}

impl<C: NumberCodec> TinyJson<C> {
    pub fn with_codec(codec: C, options: Options) -> Self {
        Self {
            registry: Registry::new(),
            codec,
            options,
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Returns the descriptor for `T`, building it on first use.
    pub fn resolve<T: Typed>(&self) -> Result<Arc<TypeDescriptor>> {
        self.registry.resolve(&T::type_info())
    }

    /// Number of descriptors this engine has built so far.
    ///
    /// Each type is built exactly once, however many callers race on it.
    pub fn descriptors_built(&self) -> usize {
        self.registry.builds()
    }

    pub fn encode<T: Reflect>(&self, value: &T) -> Result<Vec<u8>> {
        self.encode_dyn(value)
    }

    pub fn encode_dyn(&self, value: &dyn Reflect) -> Result<Vec<u8>> {
        let descriptor = self.registry.resolve(&value.dyn_type_info())?;
        Encoder::new(&self.registry, &self.codec, self.options.max_depth)
            .encode(value, descriptor.type_ref())
    }

    pub fn encode_to_string<T: Reflect>(&self, value: &T) -> Result<String> {
        let bytes = self.encode(value)?;
        String::from_utf8(bytes).map_err(|_| Error::UnsupportedValue {
            path: Path::root(),
            reason: "encoded output is not UTF-8",
        })
    }

    /// Decodes `input` into `dest`.
    ///
    /// On error `dest` may be partially written and should be discarded.
    pub fn decode<T: Reflect>(&self, input: &[u8], dest: &mut T) -> Result<()> {
        self.decode_dyn(input, Some(dest))
    }

    /// Decodes into a destination known only at runtime.
    ///
    /// A missing destination fails before any input is read.
    pub fn decode_dyn(&self, input: &[u8], dest: Option<&mut dyn Reflect>) -> Result<()> {
        let Some(dest) = dest else {
            return Err(Error::InvalidDestination);
        };
        let descriptor = self.registry.resolve(&dest.dyn_type_info())?;
        Decoder::new(input, &self.registry, &self.codec, &self.options)
            .decode_into(dest, descriptor.type_ref())
    }

    /// Decodes into a fresh `T::default()`.
    pub fn decode_as<T: Reflect + Default>(&self, input: &[u8]) -> Result<T> {
        let mut value = T::default();
        self.decode(input, &mut value)?;
        Ok(value)
    }

    /// Parses `input` into a [`Value`] tree without a destination type.
    pub fn parse(&self, input: &[u8]) -> Result<Value> {
        Decoder::new(input, &self.registry, &self.codec, &self.options).parse_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_destination_fails_before_parsing() {
        let json = TinyJson::new();
        assert_eq!(json.decode_dyn(b"{not json", None), Err(Error::InvalidDestination));
        assert_eq!(json.descriptors_built(), 0);
    }

    #[test]
    fn engines_do_not_share_descriptors() {
        let a = TinyJson::new();
        let b = TinyJson::new();
        a.encode(&vec![1u32]).unwrap();
        assert_eq!(a.descriptors_built(), 2);
        assert_eq!(b.descriptors_built(), 0);
    }

    #[test]
    fn dynamic_destination() {
        let json = TinyJson::new();
        let mut items: Vec<String> = Vec::new();
        json.decode_dyn(br#"["a","b"]"#, Some(&mut items)).unwrap();
        assert_eq!(items, ["a", "b"]);
    }

    #[test]
    fn engine_is_shareable() {
        fn assert_sync<T: Send + Sync>() {}
        assert_sync::<TinyJson>();
    }
}
