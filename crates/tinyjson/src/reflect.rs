//! Static type descriptions and dynamic value access.
//!
//! A type takes part in encoding and decoding by implementing two traits:
//!
//! - [`Typed`] describes the type once, statically: its identity and its
//!   [`Shape`]. The registry reads this description the first time the type
//!   is seen and turns it into a cached descriptor.
//! - [`Reflect`] exposes a value of the type through a small closed set of
//!   views ([`ReflectRef`] / [`ReflectMut`]), which is all the encoder and the
//!   binder ever touch.
//!
//! Implementations are provided for the primitive types, `String`, `Vec<T>`,
//! `Option<T>` and `Box<T>`. Structs are wired up with the
//! [`record!`](crate::record) macro.

use std::any::{type_name, Any, TypeId};

/// Lazily produces the description of a nested type.
///
/// Nested types are referenced through a function pointer rather than a
/// value, which keeps self-referential shapes finite.
pub type TypeInfoFn = fn() -> TypeInfo;

/// Static description of one type.
#[derive(Debug, Clone)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
    shape: Shape,
}

impl TypeInfo {
    pub fn new<T: ?Sized + 'static>(shape: Shape) -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            shape,
        }
    }

    /// Describes a record whose fields are listed in declaration order.
    pub fn record<T: 'static>(fields: Vec<FieldInfo>) -> Self {
        Self::new::<T>(Shape::Record { fields })
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }
}

/// Structural shape of a type.
#[derive(Debug, Clone)]
pub enum Shape {
    Bool,
    SignedInt { bits: u8 },
    UnsignedInt { bits: u8 },
    Float { bits: u8 },
    String,
    Sequence { element: TypeInfoFn },
    Record { fields: Vec<FieldInfo> },
    Optional { inner: TypeInfoFn },
    /// Callables, raw handles and anything else JSON cannot carry.
    Unsupported,
}

/// One declared field of a record.
#[derive(Debug, Clone)]
pub struct FieldInfo {
    /// Name as declared in source.
    pub name: &'static str,
    /// Raw tag annotation, e.g. `"req_id,omitempty"`.
    pub tag: Option<&'static str>,
    pub ty: TypeInfoFn,
}

impl FieldInfo {
    /// Describes a field, inferring its type from an accessor.
    ///
    /// The accessor is never called; it only pins down the field type so
    /// callers do not have to spell it out.
    pub fn new<R, T, F>(name: &'static str, tag: Option<&'static str>, _get: F) -> Self
    where
        T: Typed,
        F: Fn(&R) -> &T,
    {
        Self::of::<T>(name, tag)
    }

    pub fn of<T: Typed>(name: &'static str, tag: Option<&'static str>) -> Self {
        Self {
            name,
            tag,
            ty: T::type_info,
        }
    }
}

/// Types with a static description.
pub trait Typed: 'static {
    fn type_info() -> TypeInfo;
}

/// Object-safe access to [`Typed::type_info`].
pub trait DynTyped {
    fn dyn_type_info(&self) -> TypeInfo;
}

impl<T: Typed> DynTyped for T {
    fn dyn_type_info(&self) -> TypeInfo {
        T::type_info()
    }
}

/// Dynamic access to a value for the encoder and the binder.
pub trait Reflect: DynTyped + Any {
    fn reflect_ref(&self) -> ReflectRef<'_>;

    fn reflect_mut(&mut self) -> ReflectMut<'_>;

    /// Returns the value to its zero value.
    fn reset(&mut self);
}

/// A scalar read out of a value, widened to the largest type of its class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar<'a> {
    Bool(bool),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Str(&'a str),
}

impl Scalar<'_> {
    /// Zero values are what `omitempty` leaves out.
    pub fn is_zero(&self) -> bool {
        match *self {
            Scalar::Bool(b) => !b,
            Scalar::I64(v) => v == 0,
            Scalar::U64(v) => v == 0,
            Scalar::F32(v) => v == 0.0,
            Scalar::F64(v) => v == 0.0,
            Scalar::Str(s) => s.is_empty(),
        }
    }
}

/// Read-only view of a value.
pub enum ReflectRef<'a> {
    Scalar(Scalar<'a>),
    Sequence(&'a dyn Sequence),
    Record(&'a dyn Record),
    Optional(Option<&'a dyn Reflect>),
    Opaque { empty: bool },
}

/// Mutable view of a value.
pub enum ReflectMut<'a> {
    Scalar(&'a mut dyn ScalarSlot),
    Sequence(&'a mut dyn Sequence),
    Record(&'a mut dyn Record),
    Optional(&'a mut dyn OptionalSlot),
    Opaque,
}

/// Returned when a scalar does not fit its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rejected;

/// A scalar destination.
pub trait ScalarSlot {
    /// Stores `value`, narrowing it to the slot's own width.
    fn assign(&mut self, value: Scalar<'_>) -> Result<(), Rejected>;
}

/// An ordered, growable collection.
pub trait Sequence {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect>;

    fn clear(&mut self);

    /// Appends a zero value and hands it out for binding.
    fn push_default(&mut self) -> &mut dyn Reflect;

    /// Contiguous bytes, when the collection is a plain byte buffer.
    fn as_bytes(&self) -> Option<&[u8]> {
        None
    }

    fn as_bytes_mut(&mut self) -> Option<&mut Vec<u8>> {
        None
    }
}

/// A struct with fields addressed by declaration index.
pub trait Record {
    fn field(&self, index: usize) -> Option<&dyn Reflect>;

    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;
}

/// A value that may be absent.
pub trait OptionalSlot {
    fn set_none(&mut self);

    fn get_or_insert_default(&mut self) -> &mut dyn Reflect;
}
