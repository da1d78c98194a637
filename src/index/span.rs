//! Offset - half-open byte range into the original input
//!
//! Zero-copy reference to a portion of the input document.
//! Used for tag bodies; the source text is never copied.

/// A half-open range `[start, end)` into the input document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Offset {
    /// Byte offset of the first byte
    pub start: usize,
    /// Byte offset one past the last byte
    pub end: usize,
}

impl Offset {
    /// Create a new offset; `end` is clamped so that `start <= end` holds
    #[inline]
    pub const fn new(start: usize, end: usize) -> Self {
        let end = if end < start { start } else { end };
        Self { start, end }
    }

    /// Zero-length offset at `pos`
    #[inline]
    pub const fn empty_at(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if `pos` lies inside the range
    #[inline]
    pub const fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos < self.end
    }

    /// Check if `other` lies entirely inside this range
    #[inline]
    pub const fn encloses(&self, other: &Offset) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Extract the byte slice from input
    #[inline]
    pub fn slice<'a>(&self, input: &'a [u8]) -> &'a [u8] {
        input.get(self.start..self.end).unwrap_or(&[])
    }

    /// Extract the text from input
    #[inline]
    pub fn as_str<'a>(&self, input: &'a str) -> Option<&'a str> {
        input.get(self.start..self.end)
    }
}

impl From<Offset> for std::ops::Range<usize> {
    #[inline]
    fn from(offset: Offset) -> Self {
        offset.start..offset.end
    }
}
