//! Malformed input: every failure is a syntax error with a byte offset.

use proptest::prelude::*;
use tinyjson::{record, Error, Options, TinyJson};

#[derive(Debug, Default, PartialEq)]
struct Entry {
    key: String,
    values: Vec<i32>,
    bytes: Vec<u8>,
}

record!(Entry { key, values, bytes });

fn syntax_offset(input: &str) -> usize {
    let json = TinyJson::new();
    match json.decode_as::<Entry>(input.as_bytes()) {
        Err(Error::Syntax { offset, .. }) => offset,
        other => panic!("expected a syntax error for {input:?}, got {other:?}"),
    }
}

#[test]
fn trailing_commas_are_rejected() {
    assert_eq!(syntax_offset(r#"{"values":[1,2,]}"#), 15);
    assert_eq!(syntax_offset(r#"{"key":"a",}"#), 11);
    assert_eq!(syntax_offset(r#"{"bytes":[1,]}"#), 12);
}

#[test]
fn trailing_content_is_rejected() {
    assert_eq!(syntax_offset(r#"{"key":"a"} x"#), 12);
    assert_eq!(syntax_offset(r#"{"key":"a"}{}"#), 11);
    // Surrounding whitespace alone is fine.
    let json = TinyJson::new();
    let entry: Entry = json.decode_as(b" \n\t{\"key\":\"a\"}\r\n ").unwrap();
    assert_eq!(entry.key, "a");
}

#[test]
fn broken_structure() {
    assert_eq!(syntax_offset(""), 0);
    assert_eq!(syntax_offset("   "), 3);
    assert_eq!(syntax_offset(r#"{"key" "a"}"#), 7);
    assert_eq!(syntax_offset(r#"{key:"a"}"#), 1);
    assert_eq!(syntax_offset(r#"{"key":"a""#), 10);
    assert_eq!(syntax_offset(r#"{"values":[1 2]}"#), 13);
    assert_eq!(syntax_offset(r#"{"values":[1,2}"#), 14);
    assert_eq!(syntax_offset(r#"{,}"#), 1);
}

#[test]
fn broken_tokens() {
    assert_eq!(syntax_offset(r#"{"key":"a\qb"}"#), 9);
    assert_eq!(syntax_offset(r#"{"key":"unterminated}"#), 7);
    assert_eq!(syntax_offset(r#"{"values":[01]}"#), 11);
    assert_eq!(syntax_offset(r#"{"values":[-]}"#), 11);
    assert_eq!(syntax_offset(r#"{"values":[tru]}"#), 11);
    assert_eq!(syntax_offset(r#"{"unknown":NaN}"#), 11);
}

#[test]
fn unknown_values_are_still_checked() {
    assert_eq!(syntax_offset(r#"{"other":{"a":[1,}]},"key":"a"}"#), 17);
    assert_eq!(syntax_offset(r#"{"other":"\u12"}"#), 10);
}

#[test]
fn deep_nesting_is_an_error_not_a_crash() {
    let json = TinyJson::with_options(Options::default().max_depth(64));
    let deep = format!("{}{}", "[".repeat(100_000), "]".repeat(100_000));
    assert!(matches!(
        json.parse(deep.as_bytes()),
        Err(Error::DepthLimitExceeded { limit: 64, .. })
    ));
    let mut nested: Vec<Vec<Vec<u8>>> = Vec::new();
    assert!(matches!(
        json.decode(deep.as_bytes(), &mut nested),
        Err(Error::TypeMismatch { .. })
    ));
}

fn check_failure(err: Error, len: usize) -> Result<(), TestCaseError> {
    match err {
        Error::Syntax { offset, .. } => prop_assert!(offset <= len),
        Error::DepthLimitExceeded { .. } | Error::TypeMismatch { .. } => {}
        other => prop_assert!(false, "unexpected error {other:?}"),
    }
    Ok(())
}

proptest! {
    #[test]
    fn arbitrary_bytes_never_panic(input in prop::collection::vec(any::<u8>(), 0..512)) {
        let json = TinyJson::new();
        if let Err(err) = json.parse(&input) {
            check_failure(err, input.len())?;
        }
        if let Err(err) = json.decode_as::<Entry>(&input) {
            check_failure(err, input.len())?;
        }
    }

    #[test]
    fn truncated_documents_fail_cleanly(cut in 0usize..48) {
        let doc = r#"{"key":"kéy","values":[1,-2,3],"bytes":[0,255]}"#.as_bytes();
        let json = TinyJson::new();
        prop_assume!(cut < doc.len());
        match json.decode_as::<Entry>(&doc[..cut]) {
            Err(Error::Syntax { offset, .. }) => prop_assert!(offset <= cut),
            other => prop_assert!(false, "expected a syntax error, got {other:?}"),
        }
    }

    #[test]
    fn json_like_text_never_panics(input in r#"[\[\]{}:,"0-9a-z\\ .eE+-]{0,64}"#) {
        let json = TinyJson::new();
        if let Err(err) = json.parse(input.as_bytes()) {
            check_failure(err, input.len())?;
        }
    }
}
