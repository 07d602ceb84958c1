//! Recursive-descent binder.
//!
//! Pulls tokens one at a time and writes them straight into the destination,
//! steered by the destination's descriptor. No intermediate tree is built
//! unless the caller asks for one with [`Decoder::parse_value`].

use std::borrow::Cow;
use std::sync::Arc;

use crate::descriptor::{TypeDescriptor, TypeRef};
use crate::error::{Error, Result};
use crate::format::NumberCodec;
use crate::kind::Kind;
use crate::options::{DuplicateKeyPolicy, Options};
use crate::path::Path;
use crate::reflect::{Reflect, ReflectMut, Rejected, Scalar};
use crate::registry::{Lookup, Registry};
use crate::tokenizer::{Token, Tokenizer};
use crate::value::{JsonType, Number, Value};

/// A token and the offset it starts at.
type Spanned<'a> = (Token<'a>, usize);

pub(crate) struct Decoder<'a, 'e, C: NumberCodec> {
    tokens: Tokenizer<'a>,
    descriptors: Lookup<'e>,
    codec: &'e C,
    options: &'e Options,
}

impl<'a, 'e, C: NumberCodec> Decoder<'a, 'e, C> {
    pub fn new(input: &'a [u8], registry: &'e Registry, codec: &'e C, options: &'e Options) -> Self {
        Self {
            tokens: Tokenizer::new(input),
            descriptors: Lookup::new(registry),
            codec,
            options,
        }
    }

    /// Binds the single value in the input into `dest`.
    pub fn decode_into(&mut self, dest: &mut dyn Reflect, ty: TypeRef) -> Result<()> {
        let first = self.tokens.next_token()?;
        self.bind(first, dest, ty, 0)?;
        self.expect_end()
    }

    /// Reads the single value in the input as a [`Value`] tree.
    pub fn parse_value(&mut self) -> Result<Value> {
        let first = self.tokens.next_token()?;
        let value = self.read_value(first, 0)?;
        self.expect_end()?;
        Ok(value)
    }

    fn expect_end(&mut self) -> Result<()> {
        match self.tokens.next_token()? {
            (Token::EndOfInput, _) => Ok(()),
            (_, at) => Err(Error::syntax(at, "trailing characters after value")),
        }
    }

    fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.options.max_depth {
            return Err(Error::depth_limit(self.options.max_depth));
        }
        Ok(())
    }

    fn bind(&mut self, (token, at): Spanned<'a>, dest: &mut dyn Reflect, ty: TypeRef, depth: usize) -> Result<()> {
        self.check_depth(depth)?;
        let found = match token.json_type() {
            Some(JsonType::Null) => {
                dest.reset();
                return Ok(());
            }
            Some(found) => found,
            None => return Err(unexpected(&token, at)),
        };
        let mismatch = || Error::TypeMismatch {
            path: Path::root(),
            expected: ty.kind,
            found,
            offset: at,
        };

        match (ty.kind, token) {
            (Kind::Bool, Token::True) => assign(dest, Scalar::Bool(true)).map_err(|_| mismatch()),
            (Kind::Bool, Token::False) => assign(dest, Scalar::Bool(false)).map_err(|_| mismatch()),
            (Kind::SignedInt, Token::Number(text)) => {
                let v = integer_literal(text)
                    .and_then(|text| self.codec.parse_i64(text))
                    .ok_or_else(mismatch)?;
                assign(dest, Scalar::I64(v)).map_err(|_| mismatch())
            }
            (Kind::UnsignedInt, Token::Number(text)) => {
                let v = unsigned_literal(text)
                    .and_then(|text| self.codec.parse_u64(text))
                    .ok_or_else(mismatch)?;
                assign(dest, Scalar::U64(v)).map_err(|_| mismatch())
            }
            (Kind::Float, Token::Number(text)) => {
                let v = if ty.bits == 32 {
                    self.codec.parse_f32(text).map(Scalar::F32)
                } else {
                    self.codec.parse_f64(text).map(Scalar::F64)
                };
                assign(dest, v.ok_or_else(mismatch)?).map_err(|_| mismatch())
            }
            (Kind::String, Token::String(s)) => assign(dest, Scalar::Str(&s)).map_err(|_| mismatch()),
            (Kind::ByteSequence, Token::BeginArray) => self.bind_bytes(dest, ty),
            (Kind::Sequence, Token::BeginArray) => self.bind_seq(dest, ty, depth),
            (Kind::Record, Token::BeginObject) => self.bind_record(dest, ty, depth),
            (Kind::Optional, token) => {
                let inner = self.descriptor(ty)?.inner().ok_or_else(|| Error::unsupported(ty.name))?;
                let ReflectMut::Optional(slot) = dest.reflect_mut() else {
                    return Err(Error::unsupported(ty.name));
                };
                self.bind((token, at), slot.get_or_insert_default(), inner, depth + 1)
            }
            (Kind::Unsupported, _) => Err(Error::unsupported(ty.name)),
            _ => Err(mismatch()),
        }
    }

    fn bind_bytes(&mut self, dest: &mut dyn Reflect, ty: TypeRef) -> Result<()> {
        let ReflectMut::Sequence(seq) = dest.reflect_mut() else {
            return Err(Error::unsupported(ty.name));
        };
        let mut bytes = Vec::new();
        self.array(|this, (token, at), index| {
            let byte = this.read_byte(token, at).map_err(|err| err.under_index(index))?;
            bytes.push(byte);
            Ok(())
        })?;

        if let Some(buf) = seq.as_bytes_mut() {
            *buf = bytes;
            return Ok(());
        }
        seq.clear();
        for (index, byte) in bytes.into_iter().enumerate() {
            assign(seq.push_default(), Scalar::U64(u64::from(byte)))
                .map_err(|_| Error::unsupported(ty.name).under_index(index))?;
        }
        Ok(())
    }

    fn read_byte(&self, token: Token<'a>, at: usize) -> Result<u8> {
        let found = token.json_type().ok_or_else(|| unexpected(&token, at))?;
        let byte = match token {
            Token::Number(text) => unsigned_literal(text)
                .and_then(|text| self.codec.parse_u64(text))
                .and_then(|v| u8::try_from(v).ok()),
            _ => None,
        };
        byte.ok_or(Error::TypeMismatch {
            path: Path::root(),
            expected: Kind::UnsignedInt,
            found,
            offset: at,
        })
    }

    fn bind_seq(&mut self, dest: &mut dyn Reflect, ty: TypeRef, depth: usize) -> Result<()> {
        let element = self.descriptor(ty)?.element().ok_or_else(|| Error::unsupported(ty.name))?;
        let ReflectMut::Sequence(seq) = dest.reflect_mut() else {
            return Err(Error::unsupported(ty.name));
        };
        seq.clear();
        self.array(|this, item, index| {
            this.bind(item, seq.push_default(), element, depth + 1)
                .map_err(|err| err.under_index(index))
        })
    }

    fn bind_record(&mut self, dest: &mut dyn Reflect, ty: TypeRef, depth: usize) -> Result<()> {
        let descriptor = self.descriptor(ty)?;
        let ReflectMut::Record(record) = dest.reflect_mut() else {
            return Err(Error::unsupported(ty.name));
        };
        let first_wins = self.options.duplicate_keys == DuplicateKeyPolicy::FirstWins;
        let mut seen = vec![false; descriptor.fields().len()];

        self.object(|this, key, value| {
            let field = match descriptor.field_by_key(&key) {
                Some((pos, _)) if first_wins && seen[pos] => None,
                Some((pos, field)) => {
                    seen[pos] = true;
                    Some(field)
                }
                None => None,
            };
            let Some(field) = field else {
                return this.skip_value(value, depth + 1).map_err(|err| err.under_key(&key));
            };
            let slot = record
                .field_mut(field.index)
                .ok_or_else(|| Error::unsupported(field.ty.name).under_key(&field.key))?;
            this.bind(value, slot, field.ty, depth + 1)
                .map_err(|err| err.under_key(&field.key))
        })
    }

    fn skip_value(&mut self, (token, at): Spanned<'a>, depth: usize) -> Result<()> {
        self.check_depth(depth)?;
        match token {
            Token::BeginArray => self.array(|this, item, _| this.skip_value(item, depth + 1)),
            Token::BeginObject => self.object(|this, _, value| this.skip_value(value, depth + 1)),
            token if token.json_type().is_some() => Ok(()),
            token => Err(unexpected(&token, at)),
        }
    }

    fn read_value(&mut self, (token, at): Spanned<'a>, depth: usize) -> Result<Value> {
        self.check_depth(depth)?;
        let value = match token {
            Token::Null => Value::Null,
            Token::True => Value::Bool(true),
            Token::False => Value::Bool(false),
            Token::Number(text) => Value::Number(Number::from_literal(text)),
            Token::String(s) => Value::String(s.into_owned()),
            Token::BeginArray => {
                let mut items = Vec::new();
                self.array(|this, item, index| {
                    let value = this.read_value(item, depth + 1).map_err(|err| err.under_index(index))?;
                    items.push(value);
                    Ok(())
                })?;
                Value::Array(items)
            }
            Token::BeginObject => {
                let mut members = Vec::new();
                self.object(|this, key, value| {
                    let value = this.read_value(value, depth + 1).map_err(|err| err.under_key(&key))?;
                    members.push((key.into_owned(), value));
                    Ok(())
                })?;
                Value::Object(members)
            }
            token => return Err(unexpected(&token, at)),
        };
        Ok(value)
    }

    /// Walks the elements of an array whose `[` was just read.
    fn array<F>(&mut self, mut each: F) -> Result<()>
    where
        F: FnMut(&mut Self, Spanned<'a>, usize) -> Result<()>,
    {
        let mut next = self.tokens.next_token()?;
        if matches!(next.0, Token::EndArray) {
            return Ok(());
        }
        let mut index = 0;
        loop {
            each(self, next, index)?;
            index += 1;
            match self.tokens.next_token()? {
                (Token::Comma, _) => {
                    next = self.tokens.next_token()?;
                    if matches!(next.0, Token::EndArray) {
                        return Err(Error::syntax(next.1, "trailing comma"));
                    }
                }
                (Token::EndArray, _) => return Ok(()),
                (token, at) => return Err(expected(&token, at, "expected ',' or ']'")),
            }
        }
    }

    /// Walks the members of an object whose `{` was just read.
    fn object<F>(&mut self, mut each: F) -> Result<()>
    where
        F: FnMut(&mut Self, Cow<'a, str>, Spanned<'a>) -> Result<()>,
    {
        let mut next = self.tokens.next_token()?;
        if matches!(next.0, Token::EndObject) {
            return Ok(());
        }
        loop {
            let key = match next {
                (Token::String(key), _) => key,
                (token, at) => return Err(expected(&token, at, "expected object key")),
            };
            match self.tokens.next_token()? {
                (Token::Colon, _) => {}
                (token, at) => return Err(expected(&token, at, "expected ':'")),
            }
            let value = self.tokens.next_token()?;
            each(self, key, value)?;
            match self.tokens.next_token()? {
                (Token::Comma, _) => {
                    next = self.tokens.next_token()?;
                    if matches!(next.0, Token::EndObject) {
                        return Err(Error::syntax(next.1, "trailing comma"));
                    }
                }
                (Token::EndObject, _) => return Ok(()),
                (token, at) => return Err(expected(&token, at, "expected ',' or '}'")),
            }
        }
    }

    fn descriptor(&mut self, ty: TypeRef) -> Result<Arc<TypeDescriptor>> {
        self.descriptors.get(ty.id).ok_or_else(|| Error::unsupported(ty.name))
    }
}

fn assign(dest: &mut dyn Reflect, value: Scalar<'_>) -> std::result::Result<(), Rejected> {
    match dest.reflect_mut() {
        ReflectMut::Scalar(slot) => slot.assign(value),
        _ => Err(Rejected),
    }
}

/// Integer destinations take plain integer literals only.
fn integer_literal(text: &str) -> Option<&str> {
    (!text.bytes().any(|b| matches!(b, b'.' | b'e' | b'E'))).then_some(text)
}

/// `-0` is zero, but unsigned parsers refuse the sign.
fn unsigned_literal(text: &str) -> Option<&str> {
    integer_literal(text).map(|text| if text == "-0" { "0" } else { text })
}

fn unexpected(token: &Token<'_>, at: usize) -> Error {
    expected(token, at, "unexpected token")
}

fn expected(token: &Token<'_>, at: usize, reason: &'static str) -> Error {
    if matches!(token, Token::EndOfInput) {
        Error::syntax(at, "unexpected end of input")
    } else {
        Error::syntax(at, reason)
    }
}
