//! [`Typed`] and [`Reflect`] for standard types.

use std::any::Any;

use crate::reflect::{
    OptionalSlot, Reflect, ReflectMut, ReflectRef, Rejected, Scalar, ScalarSlot, Sequence, Shape,
    TypeInfo, Typed,
};

macro_rules! impl_int {
    ($($ty:ty => $shape:ident, $variant:ident, $wide:ty;)*) => {$(
        impl Typed for $ty {
            fn type_info() -> TypeInfo {
                TypeInfo::new::<$ty>(Shape::$shape { bits: <$ty>::BITS as u8 })
            }
        }

        impl Reflect for $ty {
            fn reflect_ref(&self) -> ReflectRef<'_> {
                ReflectRef::Scalar(Scalar::$variant(*self as $wide))
            }

            fn reflect_mut(&mut self) -> ReflectMut<'_> {
                ReflectMut::Scalar(self)
            }

            fn reset(&mut self) {
                *self = 0;
            }
        }

        impl ScalarSlot for $ty {
            fn assign(&mut self, value: Scalar<'_>) -> Result<(), Rejected> {
                let narrowed = match value {
                    Scalar::I64(v) => <$ty>::try_from(v).ok(),
                    Scalar::U64(v) => <$ty>::try_from(v).ok(),
                    _ => None,
                };
                *self = narrowed.ok_or(Rejected)?;
                Ok(())
            }
        }
    )*};
}

impl_int! {
    i8 => SignedInt, I64, i64;
    i16 => SignedInt, I64, i64;
    i32 => SignedInt, I64, i64;
    i64 => SignedInt, I64, i64;
    isize => SignedInt, I64, i64;
    u8 => UnsignedInt, U64, u64;
    u16 => UnsignedInt, U64, u64;
    u32 => UnsignedInt, U64, u64;
    u64 => UnsignedInt, U64, u64;
    usize => UnsignedInt, U64, u64;
}

impl Typed for f32 {
    fn type_info() -> TypeInfo {
        TypeInfo::new::<f32>(Shape::Float { bits: 32 })
    }
}

impl Reflect for f32 {
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Scalar(Scalar::F32(*self))
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Scalar(self)
    }

    fn reset(&mut self) {
        *self = 0.0;
    }
}

impl ScalarSlot for f32 {
    fn assign(&mut self, value: Scalar<'_>) -> Result<(), Rejected> {
        let v = match value {
            Scalar::F32(v) => v,
            Scalar::F64(v) => v as f32,
            Scalar::I64(v) => v as f32,
            Scalar::U64(v) => v as f32,
            _ => return Err(Rejected),
        };
        if !v.is_finite() {
            return Err(Rejected);
        }
        *self = v;
        Ok(())
    }
}

impl Typed for f64 {
    fn type_info() -> TypeInfo {
        TypeInfo::new::<f64>(Shape::Float { bits: 64 })
    }
}

impl Reflect for f64 {
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Scalar(Scalar::F64(*self))
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Scalar(self)
    }

    fn reset(&mut self) {
        *self = 0.0;
    }
}

impl ScalarSlot for f64 {
    fn assign(&mut self, value: Scalar<'_>) -> Result<(), Rejected> {
        let v = match value {
            Scalar::F64(v) => v,
            Scalar::F32(v) => f64::from(v),
            Scalar::I64(v) => v as f64,
            Scalar::U64(v) => v as f64,
            _ => return Err(Rejected),
        };
        if !v.is_finite() {
            return Err(Rejected);
        }
        *self = v;
        Ok(())
    }
}

impl Typed for bool {
    fn type_info() -> TypeInfo {
        TypeInfo::new::<bool>(Shape::Bool)
    }
}

impl Reflect for bool {
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Scalar(Scalar::Bool(*self))
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Scalar(self)
    }

    fn reset(&mut self) {
        *self = false;
    }
}

impl ScalarSlot for bool {
    fn assign(&mut self, value: Scalar<'_>) -> Result<(), Rejected> {
        match value {
            Scalar::Bool(b) => {
                *self = b;
                Ok(())
            }
            _ => Err(Rejected),
        }
    }
}

impl Typed for String {
    fn type_info() -> TypeInfo {
        TypeInfo::new::<String>(Shape::String)
    }
}

impl Reflect for String {
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Scalar(Scalar::Str(self))
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Scalar(self)
    }

    fn reset(&mut self) {
        self.clear();
    }
}

impl ScalarSlot for String {
    fn assign(&mut self, value: Scalar<'_>) -> Result<(), Rejected> {
        match value {
            Scalar::Str(s) => {
                self.clear();
                self.push_str(s);
                Ok(())
            }
            _ => Err(Rejected),
        }
    }
}

impl<T: Reflect + Typed + Default> Typed for Vec<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::new::<Vec<T>>(Shape::Sequence {
            element: T::type_info,
        })
    }
}

impl<T: Reflect + Typed + Default> Reflect for Vec<T> {
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Sequence(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Sequence(self)
    }

    fn reset(&mut self) {
        Vec::clear(self);
    }
}

impl<T: Reflect + Typed + Default> Sequence for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        self.as_slice().get(index).map(|item| item as &dyn Reflect)
    }

    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn push_default(&mut self) -> &mut dyn Reflect {
        self.push(T::default());
        let last = Vec::len(self) - 1;
        &mut self[last]
    }

    fn as_bytes(&self) -> Option<&[u8]> {
        (self as &dyn Any)
            .downcast_ref::<Vec<u8>>()
            .map(Vec::as_slice)
    }

    fn as_bytes_mut(&mut self) -> Option<&mut Vec<u8>> {
        (self as &mut dyn Any).downcast_mut::<Vec<u8>>()
    }
}

impl<T: Reflect + Typed + Default> Typed for Option<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::new::<Option<T>>(Shape::Optional {
            inner: T::type_info,
        })
    }
}

impl<T: Reflect + Typed + Default> Reflect for Option<T> {
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Optional(self.as_ref().map(|inner| inner as &dyn Reflect))
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Optional(self)
    }

    fn reset(&mut self) {
        *self = None;
    }
}

impl<T: Reflect + Typed + Default> OptionalSlot for Option<T> {
    fn set_none(&mut self) {
        *self = None;
    }

    fn get_or_insert_default(&mut self) -> &mut dyn Reflect {
        self.get_or_insert_with(T::default)
    }
}

// A box is always present, so it reads and writes as its contents. The
// description is the inner type's, which lets `Option<Box<Self>>` close a
// recursive shape.
impl<T: Reflect + Typed> Typed for Box<T> {
    fn type_info() -> TypeInfo {
        T::type_info()
    }
}

impl<T: Reflect + Typed> Reflect for Box<T> {
    fn reflect_ref(&self) -> ReflectRef<'_> {
        (**self).reflect_ref()
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        (**self).reflect_mut()
    }

    fn reset(&mut self) {
        (**self).reset();
    }
}

macro_rules! impl_raw_pointer {
    ($($ptr:tt => $null:path;)*) => {$(
        impl<T: 'static> Typed for *$ptr T {
            fn type_info() -> TypeInfo {
                TypeInfo::new::<*$ptr T>(Shape::Unsupported)
            }
        }

        impl<T: 'static> Reflect for *$ptr T {
            fn reflect_ref(&self) -> ReflectRef<'_> {
                ReflectRef::Opaque { empty: self.is_null() }
            }

            fn reflect_mut(&mut self) -> ReflectMut<'_> {
                ReflectMut::Opaque
            }

            fn reset(&mut self) {
                *self = $null();
            }
        }
    )*};
}

impl_raw_pointer! {
    const => std::ptr::null;
    mut => std::ptr::null_mut;
}

macro_rules! impl_fn_pointer {
    ($(($($arg:ident),*);)*) => {$(
        impl<R: 'static, $($arg: 'static),*> Typed for fn($($arg),*) -> R {
            fn type_info() -> TypeInfo {
                TypeInfo::new::<fn($($arg),*) -> R>(Shape::Unsupported)
            }
        }

        impl<R: 'static, $($arg: 'static),*> Reflect for fn($($arg),*) -> R {
            fn reflect_ref(&self) -> ReflectRef<'_> {
                ReflectRef::Opaque { empty: false }
            }

            fn reflect_mut(&mut self) -> ReflectMut<'_> {
                ReflectMut::Opaque
            }

            // Function pointers have no zero value.
            fn reset(&mut self) {}
        }
    )*};
}

impl_fn_pointer! {
    ();
    (A);
    (A, B);
    (A, B, C);
}
