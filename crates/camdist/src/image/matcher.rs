//! Wildcard-aware byte pattern search.

use memchr::memmem::Finder;

/// Finds occurrences of a pattern where `None` matches any byte.
///
/// The longest literal run of the pattern is located with `memmem`, and each
/// candidate is then checked against the whole pattern.
pub struct WildcardMatcher<'p> {
    pattern: &'p [Option<u8>],
    needle_offset: usize,
    finder: Finder<'static>,
}

impl<'p> WildcardMatcher<'p> {
    pub fn new(pattern: &'p [Option<u8>]) -> Self {
        let (needle_offset, needle) = longest_literal_run(pattern);
        Self {
            pattern,
            needle_offset,
            finder: Finder::new(&needle).into_owned(),
        }
    }

    /// Check whether the pattern matches `haystack` at `pos`.
    pub fn matches_at(&self, haystack: &[u8], pos: usize) -> bool {
        let end = pos + self.pattern.len();
        if end > haystack.len() {
            return false;
        }
        self.pattern
            .iter()
            .zip(&haystack[pos..end])
            .all(|(expected, actual)| match expected {
                Some(value) => value == actual,
                None => true,
            })
    }

    /// Start offsets of all non-overlapping matches, scanning left to right.
    pub fn find_all(&self, haystack: &[u8]) -> Vec<usize> {
        let len = self.pattern.len();
        let mut matches = Vec::new();
        if len == 0 || haystack.len() < len {
            return matches;
        }

        let mut search_from = self.needle_offset;
        while search_from < haystack.len() {
            let Some(rel) = self.finder.find(&haystack[search_from..]) else {
                break;
            };
            let needle_pos = search_from + rel;
            let candidate = needle_pos - self.needle_offset;
            if candidate + len > haystack.len() {
                break;
            }

            if self.matches_at(haystack, candidate) {
                matches.push(candidate);
                search_from = candidate + len + self.needle_offset;
            } else {
                search_from = needle_pos + 1;
            }
        }

        matches
    }
}

/// Offset and bytes of the longest run of literal bytes in the pattern.
fn longest_literal_run(pattern: &[Option<u8>]) -> (usize, Vec<u8>) {
    let mut best = (0, 0);
    let mut start = 0;
    for (i, byte) in pattern.iter().enumerate() {
        if byte.is_none() {
            start = i + 1;
        } else if i + 1 - start > best.1 {
            best = (start, i + 1 - start);
        }
    }

    let needle = pattern[best.0..best.0 + best.1]
        .iter()
        .flatten()
        .copied()
        .collect();
    (best.0, needle)
}
