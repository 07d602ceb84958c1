//! Cached per-type metadata.
//!
//! A [`TypeDescriptor`] is what the encoder and the binder consult instead of
//! looking at a type's shape again. Descriptors are built by the
//! [`Registry`](crate::registry::Registry), never mutated afterwards, and
//! refer to each other by [`TypeId`] so recursive types need no reference
//! cycles.

use std::any::TypeId;

use crate::kind::Kind;

/// Identifies a nested type together with what dispatch needs up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeRef {
    pub id: TypeId,
    pub name: &'static str,
    pub kind: Kind,
    /// Width of numeric kinds, 0 otherwise.
    pub bits: u8,
}

/// One bound field of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Name as declared in source.
    pub name: &'static str,
    /// Key used in JSON objects.
    pub key: String,
    pub ty: TypeRef,
    pub omit_empty: bool,
    /// Position among the declared fields, including skipped ones.
    pub index: usize,
}

impl FieldDescriptor {
    pub fn kind(&self) -> Kind {
        self.ty.kind
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    Scalar,
    Sequence { element: TypeRef },
    /// Fields in declaration order, which is also the output order.
    Record { fields: Vec<FieldDescriptor> },
    Optional { inner: TypeRef },
    Opaque,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub id: TypeId,
    pub name: &'static str,
    pub kind: Kind,
    pub bits: u8,
    pub layout: Layout,
}

impl TypeDescriptor {
    pub fn type_ref(&self) -> TypeRef {
        TypeRef {
            id: self.id,
            name: self.name,
            kind: self.kind,
            bits: self.bits,
        }
    }

    /// Record fields, empty for every other kind.
    pub fn fields(&self) -> &[FieldDescriptor] {
        match &self.layout {
            Layout::Record { fields } => fields,
            _ => &[],
        }
    }

    pub fn field_by_key(&self, key: &str) -> Option<(usize, &FieldDescriptor)> {
        self.fields()
            .iter()
            .enumerate()
            .find(|(_, field)| field.key == key)
    }

    /// Element of a sequence or byte sequence.
    pub fn element(&self) -> Option<TypeRef> {
        match self.layout {
            Layout::Sequence { element } => Some(element),
            _ => None,
        }
    }

    pub fn inner(&self) -> Option<TypeRef> {
        match self.layout {
            Layout::Optional { inner } => Some(inner),
            _ => None,
        }
    }
}
