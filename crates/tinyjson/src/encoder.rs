//! Descriptor-driven JSON encoder.
//!
//! Writes compact UTF-8 JSON into a [`Writer`]:
//! - records become objects with keys in declaration order;
//! - byte sequences become arrays of integers `0..=255`;
//! - absent optionals become `null`;
//! - strings escape only `"`, `\` and control characters, everything else
//!   passes through as UTF-8.

use std::sync::Arc;

use tinyjson_buffers::Writer;

use crate::descriptor::{TypeDescriptor, TypeRef};
use crate::error::{Error, Result};
use crate::format::NumberCodec;
use crate::kind::Kind;
use crate::path::Path;
use crate::reflect::{Reflect, ReflectRef, Scalar, Sequence};
use crate::registry::{Lookup, Registry};

pub(crate) struct Encoder<'e, C: NumberCodec> {
    descriptors: Lookup<'e>,
    codec: &'e C,
    max_depth: usize,
    writer: Writer,
}

impl<'e, C: NumberCodec> Encoder<'e, C> {
    pub fn new(registry: &'e Registry, codec: &'e C, max_depth: usize) -> Self {
        Self {
            descriptors: Lookup::new(registry),
            codec,
            max_depth,
            writer: Writer::with_alloc_size(256),
        }
    }

    pub fn encode(&mut self, value: &dyn Reflect, ty: TypeRef) -> Result<Vec<u8>> {
        self.writer.reset();
        self.write_any(value, ty, 0)?;
        Ok(self.writer.flush())
    }

    fn write_any(&mut self, value: &dyn Reflect, ty: TypeRef, depth: usize) -> Result<()> {
        if depth > self.max_depth {
            return Err(Error::depth_limit(self.max_depth));
        }
        match (ty.kind, value.reflect_ref()) {
            (Kind::Bool, ReflectRef::Scalar(Scalar::Bool(b))) => {
                self.write_boolean(b);
                Ok(())
            }
            (Kind::SignedInt | Kind::UnsignedInt | Kind::Float, ReflectRef::Scalar(s)) => {
                self.write_number(s)
            }
            (Kind::String, ReflectRef::Scalar(Scalar::Str(s))) => {
                write_str(&mut self.writer, s);
                Ok(())
            }
            (Kind::ByteSequence, ReflectRef::Sequence(seq)) => self.write_bytes(seq, ty),
            (Kind::Sequence, ReflectRef::Sequence(seq)) => self.write_arr(seq, ty, depth),
            (Kind::Record, ReflectRef::Record(_)) => self.write_obj(value, ty, depth),
            (Kind::Optional, ReflectRef::Optional(None)) => {
                self.write_null();
                Ok(())
            }
            (Kind::Optional, ReflectRef::Optional(Some(inner))) => {
                let inner_ty = self.descriptor(ty)?.inner().ok_or_else(|| unsupported(ty))?;
                self.write_any(inner, inner_ty, depth + 1)
            }
            // Unsupported kinds, and values whose view disagrees with their
            // own description.
            _ => Err(unsupported(ty)),
        }
    }

    pub fn write_null(&mut self) {
        self.writer.ascii("null");
    }

    pub fn write_boolean(&mut self, b: bool) {
        self.writer.ascii(if b { "true" } else { "false" });
    }

    fn write_number(&mut self, scalar: Scalar<'_>) -> Result<()> {
        match scalar {
            Scalar::I64(v) => self.codec.write_i64(&mut self.writer, v),
            Scalar::U64(v) => self.codec.write_u64(&mut self.writer, v),
            Scalar::F64(v) => {
                check_finite(v.is_finite())?;
                self.codec.write_f64(&mut self.writer, v);
            }
            Scalar::F32(v) => {
                check_finite(v.is_finite())?;
                self.codec.write_f32(&mut self.writer, v);
            }
            Scalar::Bool(_) | Scalar::Str(_) => {
                return Err(Error::UnsupportedValue {
                    path: Path::root(),
                    reason: "number expected",
                })
            }
        }
        Ok(())
    }

    /// Writes bytes as an array of small integers.
    fn write_bytes(&mut self, seq: &dyn Sequence, ty: TypeRef) -> Result<()> {
        self.writer.u8(b'[');
        if let Some(bytes) = seq.as_bytes() {
            for (i, &byte) in bytes.iter().enumerate() {
                if i > 0 {
                    self.writer.u8(b',');
                }
                self.codec.write_u64(&mut self.writer, u64::from(byte));
            }
        } else {
            for i in 0..seq.len() {
                if i > 0 {
                    self.writer.u8(b',');
                }
                let byte = match seq.get(i).map(|item| item.reflect_ref()) {
                    Some(ReflectRef::Scalar(Scalar::U64(v))) if v <= 255 => v,
                    _ => return Err(unsupported(ty).under_index(i)),
                };
                self.codec.write_u64(&mut self.writer, byte);
            }
        }
        self.writer.u8(b']');
        Ok(())
    }

    fn write_arr(&mut self, seq: &dyn Sequence, ty: TypeRef, depth: usize) -> Result<()> {
        let element = self.descriptor(ty)?.element().ok_or_else(|| unsupported(ty))?;
        self.writer.u8(b'[');
        for i in 0..seq.len() {
            if i > 0 {
                self.writer.u8(b',');
            }
            let item = seq.get(i).ok_or_else(|| unsupported(element).under_index(i))?;
            self.write_any(item, element, depth + 1)
                .map_err(|err| err.under_index(i))?;
        }
        self.writer.u8(b']');
        Ok(())
    }

    fn write_obj(&mut self, value: &dyn Reflect, ty: TypeRef, depth: usize) -> Result<()> {
        let ReflectRef::Record(record) = value.reflect_ref() else {
            return Err(unsupported(ty));
        };
        let descriptor = self.descriptor(ty)?;
        self.writer.u8(b'{');
        let mut wrote_any = false;
        for field in descriptor.fields() {
            let item = record
                .field(field.index)
                .ok_or_else(|| unsupported(field.ty).under_key(&field.key))?;
            if field.omit_empty && is_empty(item) {
                continue;
            }
            if wrote_any {
                self.writer.u8(b',');
            }
            write_str(&mut self.writer, &field.key);
            self.writer.u8(b':');
            self.write_any(item, field.ty, depth + 1)
                .map_err(|err| err.under_key(&field.key))?;
            wrote_any = true;
        }
        self.writer.u8(b'}');
        Ok(())
    }

    fn descriptor(&mut self, ty: TypeRef) -> Result<Arc<TypeDescriptor>> {
        self.descriptors.get(ty.id).ok_or_else(|| unsupported(ty))
    }
}

fn unsupported(ty: TypeRef) -> Error {
    Error::unsupported(ty.name)
}

fn check_finite(finite: bool) -> Result<()> {
    if finite {
        Ok(())
    } else {
        Err(Error::UnsupportedValue {
            path: Path::root(),
            reason: "NaN and infinite floats have no JSON form",
        })
    }
}

/// Zero values, as far as `omitempty` is concerned. Records never are.
fn is_empty(value: &dyn Reflect) -> bool {
    match value.reflect_ref() {
        ReflectRef::Scalar(scalar) => scalar.is_zero(),
        ReflectRef::Sequence(seq) => seq.is_empty(),
        ReflectRef::Record(_) => false,
        ReflectRef::Optional(inner) => inner.is_none(),
        ReflectRef::Opaque { empty } => empty,
    }
}

/// Writes `s` as a JSON string literal.
pub(crate) fn write_str(writer: &mut Writer, s: &str) {
    let bytes = s.as_bytes();
    writer.ensure_capacity(bytes.len() + 2);
    writer.u8(b'"');
    let mut start = 0;
    for (i, &b) in bytes.iter().enumerate() {
        let escape: &[u8] = match b {
            b'"' => b"\\\"",
            b'\\' => b"\\\\",
            b'\n' => b"\\n",
            b'\r' => b"\\r",
            b'\t' => b"\\t",
            0x08 => b"\\b",
            0x0c => b"\\f",
            0x00..=0x1f => b"",
            _ => continue,
        };
        writer.buf(&bytes[start..i]);
        if escape.is_empty() {
            write_control_escape(writer, b);
        } else {
            writer.buf(escape);
        }
        start = i + 1;
    }
    writer.buf(&bytes[start..]);
    writer.u8(b'"');
}

fn write_control_escape(writer: &mut Writer, b: u8) {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    writer.buf(b"\\u00");
    writer.u8u8(HEX[usize::from(b >> 4)], HEX[usize::from(b & 0x0f)]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quoted(s: &str) -> String {
        let mut writer = Writer::with_alloc_size(16);
        write_str(&mut writer, s);
        String::from_utf8(writer.flush()).unwrap()
    }

    #[test]
    fn plain_strings_are_copied() {
        assert_eq!(quoted("hello"), r#""hello""#);
        assert_eq!(quoted(""), r#""""#);
    }

    #[test]
    fn specials_and_controls_are_escaped() {
        assert_eq!(quoted("say \"hi\""), r#""say \"hi\"""#);
        assert_eq!(quoted("a\\b"), r#""a\\b""#);
        assert_eq!(quoted("l1\nl2\tx\r"), r#""l1\nl2\tx\r""#);
        assert_eq!(quoted("\u{8}\u{c}"), r#""\b\f""#);
        assert_eq!(quoted("\u{1}\u{1f}"), r#""\u0001\u001f""#);
    }

    #[test]
    fn non_ascii_passes_through() {
        assert_eq!(quoted("café ☕ 😀"), "\"café ☕ 😀\"");
        // Slash needs no escaping.
        assert_eq!(quoted("a/b"), r#""a/b""#);
    }

    #[test]
    fn zero_values_are_empty() {
        assert!(is_empty(&0u8));
        assert!(is_empty(&String::new()));
        assert!(is_empty(&Vec::<u8>::new()));
        assert!(is_empty(&None::<u32>));
        assert!(is_empty(&std::ptr::null::<u8>()));
        assert!(!is_empty(&Some(0u32)));
        assert!(!is_empty(&1.5f64));
    }
}
