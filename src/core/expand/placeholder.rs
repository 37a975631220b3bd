//! Placeholder tokens
//!
//! Expression blocks are replaced by `TOKEN_<n>` markers between
//! extraction and substitution. Generated indices start above every index
//! already written in the document, so author text that happens to look
//! like a marker is never mistaken for a generated one.

use lazy_static::lazy_static;
use regex::Regex;

/// Literal prefix of every placeholder token.
pub const PLACEHOLDER_PREFIX: &str = "TOKEN_";

lazy_static! {
    static ref PLACEHOLDER_RE: Regex = Regex::new(r"TOKEN_([0-9]+)").unwrap();
}

/// Render the placeholder for `index`.
pub fn placeholder(index: usize) -> String {
    format!("{}{}", PLACEHOLDER_PREFIX, index)
}

/// Lowest index that does not collide with any marker in `text`:
/// `1 + max(existing, -1)`.
pub fn min_index(text: &str) -> usize {
    PLACEHOLDER_RE
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse::<usize>().ok())
        .max()
        .map_or(0, |max| max.saturating_add(1))
}

/// Hands out consecutive placeholder indices starting at [`min_index`].
#[derive(Debug, Clone)]
pub struct PlaceholderAllocator {
    min_index: usize,
    next: usize,
}

impl PlaceholderAllocator {
    /// Scan the raw document text. Must run before any marker is inserted.
    pub fn scan(raw: &str) -> Self {
        let min_index = min_index(raw);
        Self {
            min_index,
            next: min_index,
        }
    }

    pub fn min_index(&self) -> usize {
        self.min_index
    }

    /// Number of indices handed out so far.
    pub fn allocated(&self) -> usize {
        self.next - self.min_index
    }

    /// Allocate the next index.
    pub fn allocate(&mut self) -> usize {
        let index = self.next;
        self.next += 1;
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_index_without_markers() {
        assert_eq!(min_index(""), 0);
        assert_eq!(min_index("plain text with TOKEN_ but no digits"), 0);
    }

    #[test]
    fn test_min_index_above_existing() {
        assert_eq!(min_index("TOKEN_0"), 1);
        assert_eq!(min_index("a TOKEN_7 b TOKEN_3 c"), 8);
        assert_eq!(min_index("XTOKEN_12Y"), 13);
    }

    #[test]
    fn test_min_index_ignores_overflowing_digits() {
        assert_eq!(min_index("TOKEN_99999999999999999999999999 TOKEN_4"), 5);
    }

    #[test]
    fn test_allocator_sequence() {
        let mut alloc = PlaceholderAllocator::scan("see TOKEN_2");
        assert_eq!(alloc.min_index(), 3);
        assert_eq!(alloc.allocate(), 3);
        assert_eq!(alloc.allocate(), 4);
        assert_eq!(alloc.allocated(), 2);
        assert_eq!(placeholder(4), "TOKEN_4");
    }
}
