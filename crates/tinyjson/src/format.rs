//! Number rendering and parsing.
//!
//! This is the only piece of the engine that may differ between targets.
//! Everything else is shared; an engine picks its [`NumberCodec`] through a
//! type parameter, so the choice is fixed at build time.

use std::fmt::Write as _;

use tinyjson_buffers::Writer;

/// Renders and parses number literals.
///
/// Writers are only handed finite floats. Parsers receive text the tokenizer
/// already validated against the JSON number grammar and return `None` when
/// the value does not fit the requested type.
pub trait NumberCodec: Send + Sync + 'static {
    fn write_i64(&self, out: &mut Writer, v: i64);
    fn write_u64(&self, out: &mut Writer, v: u64);
    fn write_f64(&self, out: &mut Writer, v: f64);
    fn write_f32(&self, out: &mut Writer, v: f32);

    fn parse_i64(&self, text: &str) -> Option<i64>;
    fn parse_u64(&self, text: &str) -> Option<u64>;
    fn parse_f64(&self, text: &str) -> Option<f64>;
    fn parse_f32(&self, text: &str) -> Option<f32>;
}

/// Codec built on `core::fmt` and `str::parse`.
///
/// Floats use the shortest text that parses back to the same value.
/// Integral floats print without a fraction; magnitudes from `1e21` up and
/// below `1e-6` switch to exponent form.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdNumberCodec;

impl NumberCodec for StdNumberCodec {
    fn write_i64(&self, out: &mut Writer, v: i64) {
        let negative = v < 0;
        write_digits(out, v.unsigned_abs(), negative);
    }

    fn write_u64(&self, out: &mut Writer, v: u64) {
        write_digits(out, v, false);
    }

    fn write_f64(&self, out: &mut Writer, v: f64) {
        let abs = v.abs();
        let mut text = String::with_capacity(24);
        if abs != 0.0 && !(1e-6..1e21).contains(&abs) {
            let _ = write!(text, "{v:e}");
        } else {
            let _ = write!(text, "{v}");
        }
        out.ascii(&text);
    }

    fn write_f32(&self, out: &mut Writer, v: f32) {
        let abs = v.abs();
        let mut text = String::with_capacity(16);
        if abs != 0.0 && !(1e-6..1e21).contains(&abs) {
            let _ = write!(text, "{v:e}");
        } else {
            let _ = write!(text, "{v}");
        }
        out.ascii(&text);
    }

    fn parse_i64(&self, text: &str) -> Option<i64> {
        text.parse().ok()
    }

    fn parse_u64(&self, text: &str) -> Option<u64> {
        text.parse().ok()
    }

    fn parse_f64(&self, text: &str) -> Option<f64> {
        text.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    fn parse_f32(&self, text: &str) -> Option<f32> {
        text.parse::<f32>().ok().filter(|v| v.is_finite())
    }
}

fn write_digits(out: &mut Writer, mut v: u64, negative: bool) {
    let mut buf = [0u8; 21];
    let mut i = buf.len();
    loop {
        i -= 1;
        buf[i] = b'0' + (v % 10) as u8;
        v /= 10;
        if v == 0 {
            break;
        }
    }
    if negative {
        i -= 1;
        buf[i] = b'-';
    }
    out.buf(&buf[i..]);
}
