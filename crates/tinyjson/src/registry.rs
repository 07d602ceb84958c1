//! Instance-scoped descriptor cache.
//!
//! Built descriptors live in a map behind a read-write lock and are only
//! ever read under the shared lock, so lookups never wait on each other.
//! Building is serialized by a separate mutex: a caller that misses takes
//! the mutex, checks the map again, builds the missing type together with
//! every nested type not cached yet, and publishes the whole batch with one
//! short write. A failed build publishes nothing.

use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::descriptor::{FieldDescriptor, Layout, TypeDescriptor, TypeRef};
use crate::error::{Error, Result};
use crate::kind::Kind;
use crate::reflect::{FieldInfo, Shape, TypeInfo};
use crate::tag::Tag;

#[derive(Default)]
pub struct Registry {
    built: RwLock<HashMap<TypeId, Arc<TypeDescriptor>>>,
    build_lock: Mutex<()>,
    builds: AtomicUsize,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: TypeId) -> Option<Arc<TypeDescriptor>> {
        self.built.read().get(&id).cloned()
    }

    /// Number of cached descriptors.
    pub fn len(&self) -> usize {
        self.built.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total descriptors built over the registry's lifetime.
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::Acquire)
    }

    /// Returns the descriptor for `info`, building and caching it on first use.
    pub fn resolve(&self, info: &TypeInfo) -> Result<Arc<TypeDescriptor>> {
        if let Some(found) = self.get(info.id()) {
            return Ok(found);
        }

        let _guard = self.build_lock.lock();
        if let Some(found) = self.get(info.id()) {
            return Ok(found);
        }

        let mut builder = Builder {
            registry: self,
            pending: HashMap::new(),
            stack: Vec::new(),
        };
        let root = match builder.describe(info, Edge::Direct) {
            Ok(root) => Arc::new(root),
            Err(err) => {
                tracing::warn!(type_name = info.name(), error = %err, "type descriptor build failed");
                return Err(err);
            }
        };

        let count = builder.pending.len() + 1;
        {
            let mut built = self.built.write();
            built.insert(root.id, Arc::clone(&root));
            for (id, descriptor) in builder.pending {
                built.insert(id, Arc::new(descriptor));
            }
        }
        self.builds.fetch_add(count, Ordering::AcqRel);
        Ok(root)
    }
}

/// How a type was reached from the one that refers to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    /// Stored inline, as a record field is.
    Direct,
    /// Behind an optional or inside a sequence, which may be empty.
    Indirect,
}

struct Frame {
    ty: TypeRef,
    via: Edge,
}

struct Builder<'r> {
    registry: &'r Registry,
    pending: HashMap<TypeId, TypeDescriptor>,
    // Types being described right now, outermost first. These are the
    // placeholders a recursive reference resolves to.
    stack: Vec<Frame>,
}

impl Builder<'_> {
    fn visit(&mut self, info: &TypeInfo, via: Edge) -> Result<TypeRef> {
        if let Some(found) = self.registry.get(info.id()) {
            return Ok(found.type_ref());
        }
        if let Some(found) = self.pending.get(&info.id()) {
            return Ok(found.type_ref());
        }
        if let Some(pos) = self.stack.iter().position(|frame| frame.ty.id == info.id()) {
            let guarded =
                via == Edge::Indirect || self.stack[pos + 1..].iter().any(|f| f.via == Edge::Indirect);
            if !guarded {
                return Err(Error::CyclicType {
                    type_name: info.name(),
                });
            }
            return Ok(self.stack[pos].ty);
        }

        let descriptor = self.describe(info, via)?;
        let ty = descriptor.type_ref();
        self.pending.insert(ty.id, descriptor);
        Ok(ty)
    }

    fn describe(&mut self, info: &TypeInfo, via: Edge) -> Result<TypeDescriptor> {
        let (kind, bits) = classify(info);
        self.stack.push(Frame {
            ty: TypeRef {
                id: info.id(),
                name: info.name(),
                kind,
                bits,
            },
            via,
        });
        let layout = self.layout(info);
        self.stack.pop();

        let descriptor = TypeDescriptor {
            id: info.id(),
            name: info.name(),
            kind,
            bits,
            layout: layout?,
        };
        tracing::debug!(
            type_name = descriptor.name,
            kind = %descriptor.kind,
            fields = descriptor.fields().len(),
            "built type descriptor"
        );
        Ok(descriptor)
    }

    fn layout(&mut self, info: &TypeInfo) -> Result<Layout> {
        match info.shape() {
            Shape::Bool
            | Shape::SignedInt { .. }
            | Shape::UnsignedInt { .. }
            | Shape::Float { .. }
            | Shape::String => Ok(Layout::Scalar),
            Shape::Sequence { element } => {
                let element = self.visit(&element(), Edge::Indirect)?;
                Ok(Layout::Sequence { element })
            }
            Shape::Optional { inner } => {
                let inner = self.visit(&inner(), Edge::Indirect)?;
                Ok(Layout::Optional { inner })
            }
            Shape::Record { fields } => self.record_layout(info, fields),
            Shape::Unsupported => Ok(Layout::Opaque),
        }
    }

    fn record_layout(&mut self, info: &TypeInfo, fields: &[FieldInfo]) -> Result<Layout> {
        let mut bound = Vec::with_capacity(fields.len());
        let mut keys = HashSet::with_capacity(fields.len());
        for (index, field) in fields.iter().enumerate() {
            let tag = Tag::parse(field.tag);
            if tag.skip {
                continue;
            }
            let key = tag.key_or(field.name);
            if !keys.insert(key) {
                return Err(Error::DuplicateKey {
                    type_name: info.name(),
                    key: key.to_string(),
                });
            }
            let ty = self.visit(&(field.ty)(), Edge::Direct)?;
            // Without omitempty such a field could never be encoded.
            if ty.kind == Kind::Unsupported && !tag.omit_empty {
                return Err(Error::unsupported(ty.name).under_key(key));
            }
            bound.push(FieldDescriptor {
                name: field.name,
                key: key.to_string(),
                ty,
                omit_empty: tag.omit_empty,
                index,
            });
        }
        Ok(Layout::Record { fields: bound })
    }
}

fn classify(info: &TypeInfo) -> (Kind, u8) {
    match info.shape() {
        Shape::Bool => (Kind::Bool, 0),
        Shape::SignedInt { bits } => (Kind::SignedInt, *bits),
        Shape::UnsignedInt { bits } => (Kind::UnsignedInt, *bits),
        Shape::Float { bits } => (Kind::Float, *bits),
        Shape::String => (Kind::String, 0),
        Shape::Sequence { element } => {
            // Only the element width matters, not which type carries it.
            if matches!(element().shape(), Shape::UnsignedInt { bits: 8 }) {
                (Kind::ByteSequence, 0)
            } else {
                (Kind::Sequence, 0)
            }
        }
        Shape::Record { .. } => (Kind::Record, 0),
        Shape::Optional { .. } => (Kind::Optional, 0),
        Shape::Unsupported => (Kind::Unsupported, 0),
    }
}

/// Per-call view of a [`Registry`] that remembers what it has looked up,
/// so walking a long sequence touches the shared lock once per type.
pub(crate) struct Lookup<'r> {
    registry: &'r Registry,
    seen: HashMap<TypeId, Arc<TypeDescriptor>>,
}

impl<'r> Lookup<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            seen: HashMap::new(),
        }
    }

    pub fn get(&mut self, id: TypeId) -> Option<Arc<TypeDescriptor>> {
        if let Some(found) = self.seen.get(&id) {
            return Some(Arc::clone(found));
        }
        let found = self.registry.get(id)?;
        self.seen.insert(id, Arc::clone(&found));
        Some(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::{FieldInfo, Typed};

    struct Selfish;

    impl Typed for Selfish {
        fn type_info() -> TypeInfo {
            TypeInfo::record::<Selfish>(vec![FieldInfo::of::<Selfish>("me", None)])
        }
    }

    struct Twice;

    impl Typed for Twice {
        fn type_info() -> TypeInfo {
            TypeInfo::record::<Twice>(vec![
                FieldInfo::of::<u8>("a", Some("same")),
                FieldInfo::of::<u8>("b", Some("same,omitempty")),
            ])
        }
    }

    #[derive(Default)]
    struct Chain {
        value: u32,
        next: Option<Box<Chain>>,
    }

    crate::record!(Chain { value, next });

    #[test]
    fn byte_sequence_is_detected_by_element_width() {
        let registry = Registry::new();
        let bytes = registry.resolve(&<Vec<u8>>::type_info()).unwrap();
        assert_eq!(bytes.kind, Kind::ByteSequence);
        let signed = registry.resolve(&<Vec<i8>>::type_info()).unwrap();
        assert_eq!(signed.kind, Kind::Sequence);
        let nested = registry.resolve(&<Vec<Vec<u8>>>::type_info()).unwrap();
        assert_eq!(nested.kind, Kind::Sequence);
        assert_eq!(nested.element().map(|e| e.kind), Some(Kind::ByteSequence));
        // A lone byte stays a number.
        assert_eq!(registry.resolve(&u8::type_info()).unwrap().kind, Kind::UnsignedInt);
    }

    #[test]
    fn by_value_cycle_is_rejected() {
        let registry = Registry::new();
        let err = registry.resolve(&Selfish::type_info()).unwrap_err();
        assert!(matches!(err, Error::CyclicType { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn optional_indirection_closes_recursion() {
        let registry = Registry::new();
        let chain = registry.resolve(&Chain::type_info()).unwrap();
        assert_eq!(chain.kind, Kind::Record);
        let next = &chain.fields()[1];
        assert_eq!(next.kind(), Kind::Optional);
        let optional = registry.get(next.ty.id).unwrap();
        assert_eq!(optional.inner().map(|t| t.id), Some(chain.id));
    }

    #[test]
    fn duplicate_external_keys_fail_the_build() {
        let registry = Registry::new();
        let err = registry.resolve(&Twice::type_info()).unwrap_err();
        assert_eq!(
            err,
            Error::DuplicateKey {
                type_name: std::any::type_name::<Twice>(),
                key: "same".into(),
            }
        );
        assert_eq!(registry.builds(), 0);
    }

    #[test]
    fn descriptors_are_built_once() {
        let registry = Registry::new();
        let first = registry.resolve(&Chain::type_info()).unwrap();
        let built = registry.builds();
        let second = registry.resolve(&Chain::type_info()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.builds(), built);
        // Chain, u32, Option<Box<Chain>>
        assert_eq!(built, 3);
    }

    #[test]
    fn lookup_remembers_descriptors() {
        let registry = Registry::new();
        let chain = registry.resolve(&Chain::type_info()).unwrap();
        let mut lookup = Lookup::new(&registry);
        let first = lookup.get(chain.id).unwrap();
        let again = lookup.get(chain.id).unwrap();
        assert!(Arc::ptr_eq(&first, &chain));
        assert!(Arc::ptr_eq(&again, &chain));
        assert_eq!(lookup.seen.len(), 1);
        assert!(lookup.get(TypeId::of::<String>()).is_none());
        assert_eq!(lookup.seen.len(), 1);
    }
}
