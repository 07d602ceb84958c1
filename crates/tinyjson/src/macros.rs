/// Implements [`Typed`](crate::Typed), [`Reflect`](crate::Reflect) and
/// [`Record`](crate::Record) for a struct.
///
/// Fields are listed in declaration order, each optionally followed by a
/// tag (see [`Tag`](crate::tag::Tag)). Field types are taken from the
/// struct itself. The struct must implement `Default`, which is the value a
/// JSON `null` resets it to.
///
/// # Example
///
/// ```
/// use tinyjson::{record, TinyJson};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct User {
///     name: String,
///     age: u32,
///     nickname: Option<String>,
/// }
///
/// record!(User {
///     name,
///     age,
///     nickname => "nick,omitempty",
/// });
///
/// let json = TinyJson::new();
/// let user = User { name: "Alice".into(), age: 30, nickname: None };
/// assert_eq!(json.encode_to_string(&user).unwrap(), r#"{"name":"Alice","age":30}"#);
/// ```
#[macro_export]
macro_rules! record {
    ($ty:ty { $($field:ident $(=> $tag:literal)?),* $(,)? }) => {
        impl $crate::Typed for $ty {
            fn type_info() -> $crate::TypeInfo {
                $crate::TypeInfo::record::<Self>(::std::vec![
                    $(
                        $crate::FieldInfo::new(
                            ::core::stringify!($field),
                            ::core::option::Option::None $(.or(::core::option::Option::Some($tag)))?,
                            |record: &$ty| &record.$field,
                        ),
                    )*
                ])
            }
        }

        impl $crate::Reflect for $ty {
            fn reflect_ref(&self) -> $crate::ReflectRef<'_> {
                $crate::ReflectRef::Record(self)
            }

            fn reflect_mut(&mut self) -> $crate::ReflectMut<'_> {
                $crate::ReflectMut::Record(self)
            }

            fn reset(&mut self) {
                *self = <$ty as ::core::default::Default>::default();
            }
        }

        impl $crate::Record for $ty {
            #[allow(unused_assignments, unused_mut, unused_variables)]
            fn field(&self, index: usize) -> ::core::option::Option<&dyn $crate::Reflect> {
                let mut position = 0usize;
                $(
                    if index == position {
                        return ::core::option::Option::Some(&self.$field as &dyn $crate::Reflect);
                    }
                    position += 1;
                )*
                ::core::option::Option::None
            }

            #[allow(unused_assignments, unused_mut, unused_variables)]
            fn field_mut(&mut self, index: usize) -> ::core::option::Option<&mut dyn $crate::Reflect> {
                let mut position = 0usize;
                $(
                    if index == position {
                        return ::core::option::Option::Some(&mut self.$field as &mut dyn $crate::Reflect);
                    }
                    position += 1;
                )*
                ::core::option::Option::None
            }
        }
    };
}
