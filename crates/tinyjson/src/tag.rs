//! Field tag annotations.
//!
//! A tag has the form `key,option,option...`:
//!
//! - an empty key keeps the declared field name;
//! - the tag `-` removes the field from both encoding and decoding;
//! - the `omitempty` option skips the field on output while it holds its
//!   zero value.
//!
//! Unknown options are ignored so tags written for other encoders still
//! parse.

/// Parsed form of a field tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tag<'a> {
    /// External key override, if the tag names one.
    pub key: Option<&'a str>,
    pub omit_empty: bool,
    pub skip: bool,
}

impl<'a> Tag<'a> {
    pub fn parse(raw: Option<&'a str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        if raw == "-" {
            return Self {
                skip: true,
                ..Self::default()
            };
        }
        let mut parts = raw.split(',');
        let key = parts.next().filter(|key| !key.is_empty());
        let omit_empty = parts.any(|option| option.trim() == "omitempty");
        Self {
            key,
            omit_empty,
            skip: false,
        }
    }

    /// External key for a field declared as `name`.
    pub fn key_or(&self, name: &'a str) -> &'a str {
        self.key.unwrap_or(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_tag_keeps_declared_name() {
        let tag = Tag::parse(None);
        assert_eq!(tag.key_or("req_id"), "req_id");
        assert!(!tag.omit_empty);
        assert!(!tag.skip);
    }

    #[test]
    fn key_and_options() {
        let tag = Tag::parse(Some("handler_id,omitempty"));
        assert_eq!(tag.key, Some("handler_id"));
        assert!(tag.omit_empty);

        let tag = Tag::parse(Some(",omitempty"));
        assert_eq!(tag.key_or("data"), "data");
        assert!(tag.omit_empty);
    }

    #[test]
    fn dash_skips_field() {
        assert!(Tag::parse(Some("-")).skip);
        // "-," names a field literally called "-".
        let tag = Tag::parse(Some("-,"));
        assert!(!tag.skip);
        assert_eq!(tag.key, Some("-"));
    }

    #[test]
    fn unknown_options_are_ignored() {
        let tag = Tag::parse(Some("age,string,omitempty"));
        assert_eq!(tag.key, Some("age"));
        assert!(tag.omit_empty);
    }
}
