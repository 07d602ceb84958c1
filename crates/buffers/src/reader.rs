//! Byte reader with cursor tracking.

/// A reader over a byte slice.
///
/// Unlike a plain iterator the reader exposes its cursor, so a parser can
/// report exactly where it failed. Reads past the end return `None` instead
/// of panicking.
///
/// # Example
///
/// ```
/// use tinyjson_buffers::Reader;
///
/// let mut reader = Reader::new(b"  true");
/// reader.skip_while(|b| b == b' ');
/// assert_eq!(reader.x, 2);
/// assert!(reader.eat(b"true"));
/// assert!(reader.is_at_end());
/// ```
pub struct Reader<'a> {
    /// The underlying byte slice.
    pub uint8: &'a [u8],
    /// Current cursor position.
    pub x: usize,
    /// End position (exclusive).
    pub end: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader for the given byte slice.
    pub fn new(uint8: &'a [u8]) -> Self {
        let end = uint8.len();
        Self { uint8, x: 0, end }
    }

    /// Returns `true` once every byte has been consumed.
    pub fn is_at_end(&self) -> bool {
        self.x >= self.end
    }

    /// Peeks at the current byte without advancing the cursor.
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        if self.x < self.end {
            Some(self.uint8[self.x])
        } else {
            None
        }
    }

    /// Reads one byte and advances the cursor.
    #[inline]
    pub fn u8(&mut self) -> Option<u8> {
        let val = self.peek()?;
        self.x += 1;
        Some(val)
    }

    /// Advances the cursor by the given number of bytes, clamped to the end.
    pub fn skip(&mut self, length: usize) {
        self.x = (self.x + length).min(self.end);
    }

    /// Advances the cursor while `pred` holds for the current byte.
    pub fn skip_while(&mut self, pred: impl Fn(u8) -> bool) {
        while self.x < self.end && pred(self.uint8[self.x]) {
            self.x += 1;
        }
    }

    /// Returns `true` if the unread input starts with `prefix`.
    pub fn starts_with(&self, prefix: &[u8]) -> bool {
        self.uint8[self.x..self.end].starts_with(prefix)
    }

    /// Consumes `prefix` if the unread input starts with it.
    pub fn eat(&mut self, prefix: &[u8]) -> bool {
        if self.starts_with(prefix) {
            self.x += prefix.len();
            true
        } else {
            false
        }
    }

    /// Returns the bytes between `start` and the cursor.
    pub fn since(&self, start: usize) -> &'a [u8] {
        &self.uint8[start..self.x]
    }
}
