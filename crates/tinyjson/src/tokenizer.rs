//! JSON tokenizer.
//!
//! Produces tokens lazily, one per call, each tagged with the byte offset it
//! starts at. Strings come back unescaped; they borrow from the input when
//! they contain no escapes. Numbers come back as their source text, checked
//! against the RFC 8259 grammar but not converted.

use std::borrow::Cow;

use tinyjson_buffers::Reader;

use crate::error::{Error, Result};
use crate::value::JsonType;

#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    Colon,
    Comma,
    String(Cow<'a, str>),
    Number(&'a str),
    True,
    False,
    Null,
    EndOfInput,
}

impl Token<'_> {
    /// The kind of value this token starts, `None` for punctuation.
    pub fn json_type(&self) -> Option<JsonType> {
        match self {
            Token::BeginObject => Some(JsonType::Object),
            Token::BeginArray => Some(JsonType::Array),
            Token::String(_) => Some(JsonType::String),
            Token::Number(_) => Some(JsonType::Number),
            Token::True | Token::False => Some(JsonType::Bool),
            Token::Null => Some(JsonType::Null),
            Token::EndObject
            | Token::EndArray
            | Token::Colon
            | Token::Comma
            | Token::EndOfInput => None,
        }
    }
}

/// Starts tokenizing `input`.
///
/// # Example
///
/// ```
/// use tinyjson::tokenizer::{tokenize, Token};
///
/// let tokens: Vec<_> = tokenize(br#"{"a": [1, true]}"#)
///     .map(|t| t.map(|(token, _)| token))
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(tokens[0], Token::BeginObject);
/// assert_eq!(tokens[4], Token::Number("1"));
/// assert_eq!(tokens.len(), 9);
/// ```
pub fn tokenize(input: &[u8]) -> Tokenizer<'_> {
    Tokenizer::new(input)
}

pub struct Tokenizer<'a> {
    reader: Reader<'a>,
    finished: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            reader: Reader::new(input),
            finished: false,
        }
    }

    /// Reads the next token and the offset it starts at.
    ///
    /// Once the input is exhausted every call returns [`Token::EndOfInput`].
    pub fn next_token(&mut self) -> Result<(Token<'a>, usize)> {
        self.reader.skip_while(is_whitespace);
        let at = self.reader.x;
        let Some(b) = self.reader.peek() else {
            return Ok((Token::EndOfInput, at));
        };
        let token = match b {
            b'{' => self.punct(Token::BeginObject),
            b'}' => self.punct(Token::EndObject),
            b'[' => self.punct(Token::BeginArray),
            b']' => self.punct(Token::EndArray),
            b':' => self.punct(Token::Colon),
            b',' => self.punct(Token::Comma),
            b'"' => Token::String(self.read_str()?),
            b'-' | b'0'..=b'9' => Token::Number(self.read_num()?),
            b't' => self.literal(b"true", Token::True)?,
            b'f' => self.literal(b"false", Token::False)?,
            b'n' => self.literal(b"null", Token::Null)?,
            _ => return Err(Error::syntax(at, "unexpected character")),
        };
        Ok((token, at))
    }

    fn punct(&mut self, token: Token<'a>) -> Token<'a> {
        self.reader.skip(1);
        token
    }

    fn literal(&mut self, text: &[u8], token: Token<'a>) -> Result<Token<'a>> {
        let at = self.reader.x;
        if !self.reader.eat(text) {
            return Err(Error::syntax(at, "invalid literal"));
        }
        // Reject `truex`, `nullnull` and the like at the literal itself.
        if self.reader.peek().is_some_and(|b| b.is_ascii_alphanumeric()) {
            return Err(Error::syntax(at, "invalid literal"));
        }
        Ok(token)
    }

    fn read_num(&mut self) -> Result<&'a str> {
        let start = self.reader.x;
        self.reader.eat(b"-");
        match self.reader.peek() {
            Some(b'0') => self.reader.skip(1),
            Some(b'1'..=b'9') => self.reader.skip_while(|b| b.is_ascii_digit()),
            _ => return Err(Error::syntax(start, "invalid number")),
        }
        if self.reader.eat(b".") {
            self.require_digits(start)?;
        }
        if matches!(self.reader.peek(), Some(b'e' | b'E')) {
            self.reader.skip(1);
            if matches!(self.reader.peek(), Some(b'+' | b'-')) {
                self.reader.skip(1);
            }
            self.require_digits(start)?;
        }
        if self.reader.peek().is_some_and(|b| b.is_ascii_digit()) {
            // A leading zero followed by more digits.
            return Err(Error::syntax(start, "invalid number"));
        }
        std::str::from_utf8(self.reader.since(start))
            .map_err(|_| Error::syntax(start, "invalid number"))
    }

    fn require_digits(&mut self, start: usize) -> Result<()> {
        if !self.reader.peek().is_some_and(|b| b.is_ascii_digit()) {
            return Err(Error::syntax(start, "invalid number"));
        }
        self.reader.skip_while(|b| b.is_ascii_digit());
        Ok(())
    }

    fn read_str(&mut self) -> Result<Cow<'a, str>> {
        let start = self.reader.x;
        self.reader.skip(1);
        let body = self.reader.x;

        // Fast path: no escapes, borrow straight from the input.
        loop {
            match self.reader.peek() {
                None => return Err(Error::syntax(start, "unterminated string")),
                Some(b'"') => {
                    let raw = self.reader.since(body);
                    self.reader.skip(1);
                    return std::str::from_utf8(raw)
                        .map(Cow::Borrowed)
                        .map_err(|e| Error::syntax(body + e.valid_up_to(), "invalid UTF-8"));
                }
                Some(b'\\') => break,
                Some(b) if b < 0x20 => {
                    return Err(Error::syntax(self.reader.x, "control character in string"))
                }
                Some(_) => self.reader.skip(1),
            }
        }

        let mut buf = self.reader.since(body).to_vec();
        loop {
            let at = self.reader.x;
            match self.reader.u8() {
                None => return Err(Error::syntax(start, "unterminated string")),
                Some(b'"') => break,
                Some(b'\\') => self.read_escape(at, &mut buf)?,
                Some(b) if b < 0x20 => {
                    return Err(Error::syntax(at, "control character in string"))
                }
                Some(b) => buf.push(b),
            }
        }
        String::from_utf8(buf)
            .map(Cow::Owned)
            .map_err(|_| Error::syntax(start, "invalid UTF-8"))
    }

    fn read_escape(&mut self, at: usize, buf: &mut Vec<u8>) -> Result<()> {
        let byte = match self.reader.u8() {
            Some(b'"') => b'"',
            Some(b'\\') => b'\\',
            Some(b'/') => b'/',
            Some(b'b') => 0x08,
            Some(b'f') => 0x0c,
            Some(b'n') => b'\n',
            Some(b'r') => b'\r',
            Some(b't') => b'\t',
            Some(b'u') => {
                let ch = self.read_unicode_escape(at)?;
                let mut utf8 = [0u8; 4];
                buf.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
                return Ok(());
            }
            _ => return Err(Error::syntax(at, "invalid escape")),
        };
        buf.push(byte);
        Ok(())
    }

    /// Reads the `XXXX` of `\uXXXX`, plus the low half of a surrogate pair.
    fn read_unicode_escape(&mut self, at: usize) -> Result<char> {
        let high = self.read_hex4(at)?;
        let code = match high {
            0xD800..=0xDBFF => {
                if !self.reader.eat(b"\\u") {
                    return Err(Error::syntax(at, "unpaired surrogate"));
                }
                let low = self.read_hex4(at)?;
                if !(0xDC00..=0xDFFF).contains(&low) {
                    return Err(Error::syntax(at, "unpaired surrogate"));
                }
                0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
            }
            0xDC00..=0xDFFF => return Err(Error::syntax(at, "unpaired surrogate")),
            _ => high,
        };
        char::from_u32(code).ok_or_else(|| Error::syntax(at, "invalid unicode escape"))
    }

    fn read_hex4(&mut self, at: usize) -> Result<u32> {
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = self
                .reader
                .u8()
                .and_then(|b| char::from(b).to_digit(16))
                .ok_or_else(|| Error::syntax(at, "invalid unicode escape"))?;
            code = code * 16 + digit;
        }
        Ok(code)
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Result<(Token<'a>, usize)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_token() {
            Ok((Token::EndOfInput, _)) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
            ok => Some(ok),
        }
    }
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Result<Vec<Token<'_>>> {
        tokenize(input.as_bytes())
            .map(|t| t.map(|(token, _)| token))
            .collect()
    }

    fn syntax_offset(input: &str) -> usize {
        match tokens(input) {
            Err(Error::Syntax { offset, .. }) => offset,
            other => panic!("expected syntax error for {input:?}, got {other:?}"),
        }
    }

    #[test]
    fn punctuation_and_literals() {
        assert_eq!(
            tokens(" { } [ ] : , true false null ").unwrap(),
            vec![
                Token::BeginObject,
                Token::EndObject,
                Token::BeginArray,
                Token::EndArray,
                Token::Colon,
                Token::Comma,
                Token::True,
                Token::False,
                Token::Null,
            ]
        );
    }

    #[test]
    fn offsets_point_at_token_start() {
        let mut tokenizer = tokenize(b"  [ 12,\n\"x\"]");
        assert_eq!(tokenizer.next_token().unwrap(), (Token::BeginArray, 2));
        assert_eq!(tokenizer.next_token().unwrap(), (Token::Number("12"), 4));
        assert_eq!(tokenizer.next_token().unwrap(), (Token::Comma, 6));
        assert_eq!(
            tokenizer.next_token().unwrap(),
            (Token::String(Cow::Borrowed("x")), 8)
        );
        assert_eq!(tokenizer.next_token().unwrap(), (Token::EndArray, 11));
        assert_eq!(tokenizer.next_token().unwrap(), (Token::EndOfInput, 12));
        assert_eq!(tokenizer.next_token().unwrap(), (Token::EndOfInput, 12));
    }

    #[test]
    fn number_grammar() {
        for ok in ["0", "-0", "12", "-3.25", "1e5", "1E+5", "2.5e-3"] {
            assert_eq!(tokens(ok).unwrap(), vec![Token::Number(ok)], "{ok}");
        }
        for bad in ["-", "01", "1.", ".5", "1e", "1e+", "+1", "-a"] {
            assert!(tokens(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn string_escapes() {
        let decoded = tokens(r#""a\"b\\c\/d\n\r\t\b\f""#).unwrap();
        assert_eq!(
            decoded,
            vec![Token::String(Cow::Owned("a\"b\\c/d\n\r\t\u{8}\u{c}".into()))]
        );
        assert_eq!(
            tokens(r#""\u00e9\u2603""#).unwrap(),
            vec![Token::String(Cow::Owned("é☃".into()))]
        );
        assert_eq!(
            tokens(r#""\ud83d\ude00""#).unwrap(),
            vec![Token::String(Cow::Owned("😀".into()))]
        );
    }

    #[test]
    fn unescaped_strings_borrow() {
        match &tokens(r#""plain café""#).unwrap()[0] {
            Token::String(Cow::Borrowed(s)) => assert_eq!(*s, "plain café"),
            other => panic!("expected borrowed string, got {other:?}"),
        }
    }

    #[test]
    fn malformed_input_reports_offsets() {
        assert_eq!(syntax_offset("  @"), 2);
        assert_eq!(syntax_offset(r#"["abc"#), 1);
        assert_eq!(syntax_offset(r#""\x""#), 1);
        assert_eq!(syntax_offset(r#""\ud83d""#), 1);
        assert_eq!(syntax_offset(r#""\ude00""#), 1);
        assert_eq!(syntax_offset("\"a\u{1}\""), 2);
        assert_eq!(syntax_offset("[tru]"), 1);
        assert_eq!(syntax_offset("nullx"), 0);
    }

    #[test]
    fn invalid_utf8_is_a_syntax_error() {
        let err = tokenize(b"\"ab\xff\"").next().unwrap().unwrap_err();
        assert_eq!(err, Error::syntax(3, "invalid UTF-8"));
    }
}
