//! # Normalized String
//!
//! Text under normalization, with alignment back to the original.

use core::ops::Range;

use unicode_normalization::{UnicodeNormalization, char::canonical_combining_class};

use crate::types::Offsets;

/// A string under normalization.
///
/// Every byte of the normalized text carries the original byte span it was
/// produced from; spans of adjacent bytes are non-decreasing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedString {
    original: String,
    normalized: String,
    alignments: Vec<Offsets>,
}

impl From<&str> for NormalizedString {
    fn from(original: &str) -> Self {
        Self::new(original)
    }
}

impl NormalizedString {
    /// Start normalizing `original`; the normalized text begins as a copy.
    pub fn new(original: &str) -> Self {
        let mut alignments = Vec::with_capacity(original.len());
        for (idx, c) in original.char_indices() {
            let span = (idx, idx + c.len_utf8());
            alignments.extend(std::iter::repeat_n(span, c.len_utf8()));
        }
        Self {
            original: original.to_string(),
            normalized: original.to_string(),
            alignments,
        }
    }

    /// The original text.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// The normalized text.
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// The normalized length, in bytes.
    pub fn len(&self) -> usize {
        self.normalized.len()
    }

    /// Is the normalized text empty?
    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }

    /// Map a normalized byte range onto the original text.
    ///
    /// Empty ranges map to an empty span at the matching original position.
    pub fn offsets_to_original(
        &self,
        range: Range<usize>,
    ) -> Offsets {
        if range.start >= range.end {
            let pos = self
                .alignments
                .get(range.start)
                .map_or(self.original.len(), |&(start, _)| start);
            return (pos, pos);
        }
        span_of(&self.alignments[range])
    }

    /// Lowercase every char.
    pub fn lowercase(&mut self) {
        self.rewrite_groups(|_| true, |group, out| {
            out.extend(group.chars().flat_map(char::to_lowercase))
        });
    }

    /// Remove combining marks; most useful after [`nfd`](Self::nfd).
    pub fn strip_accents(&mut self) {
        self.rewrite_groups(|_| true, |group, out| {
            out.extend(
                group
                    .chars()
                    .filter(|&c| !unicode_normalization::char::is_combining_mark(c)),
            )
        });
    }

    /// Canonical decomposition.
    pub fn nfd(&mut self) {
        self.rewrite_groups(is_starter, |group, out| out.extend(group.nfd()));
    }

    /// Canonical decomposition followed by canonical composition.
    pub fn nfc(&mut self) {
        self.rewrite_groups(is_starter, |group, out| out.extend(group.nfc()));
    }

    /// Compatibility decomposition.
    pub fn nfkd(&mut self) {
        self.rewrite_groups(is_starter, |group, out| out.extend(group.nfkd()));
    }

    /// Compatibility decomposition followed by canonical composition.
    pub fn nfkc(&mut self) {
        self.rewrite_groups(is_starter, |group, out| out.extend(group.nfkc()));
    }

    /// Trim whitespace from either end.
    pub fn strip(
        &mut self,
        left: bool,
        right: bool,
    ) {
        let mut start = 0;
        let mut end = self.normalized.len();
        if left {
            start = end - self.normalized.trim_start().len();
        }
        if right {
            end = start + self.normalized[start..].trim_end().len();
        }
        if start == 0 && end == self.normalized.len() {
            return;
        }
        self.normalized = self.normalized[start..end].to_string();
        self.alignments = self.alignments[start..end].to_vec();
    }

    /// Replace every occurrence of the literal `pattern` with `content`.
    ///
    /// Replacement bytes align to the span of the text they replaced.
    pub fn replace(
        &mut self,
        pattern: &str,
        content: &str,
    ) {
        if pattern.is_empty() || !self.normalized.contains(pattern) {
            return;
        }

        let mut normalized = String::with_capacity(self.normalized.len());
        let mut alignments = Vec::with_capacity(self.alignments.len());
        let mut last = 0;
        for (start, matched) in self.normalized.match_indices(pattern) {
            normalized.push_str(&self.normalized[last..start]);
            alignments.extend_from_slice(&self.alignments[last..start]);

            let end = start + matched.len();
            let span = span_of(&self.alignments[start..end]);
            normalized.push_str(content);
            alignments.extend(std::iter::repeat_n(span, content.len()));
            last = end;
        }
        normalized.push_str(&self.normalized[last..]);
        alignments.extend_from_slice(&self.alignments[last..]);

        self.normalized = normalized;
        self.alignments = alignments;
    }

    /// Rewrite the normalized text group by group.
    ///
    /// A group starts at every char for which `starts_group` is true
    /// (and at the first char). Every byte the rewrite emits for a group
    /// aligns to the group's whole original span.
    fn rewrite_groups<S, F>(
        &mut self,
        starts_group: S,
        mut rewrite: F,
    ) where
        S: Fn(char) -> bool,
        F: FnMut(&str, &mut String),
    {
        let mut normalized = String::with_capacity(self.normalized.len());
        let mut alignments = Vec::with_capacity(self.alignments.len());

        let mut emit = |range: Range<usize>| {
            let span = span_of(&self.alignments[range.clone()]);
            let before = normalized.len();
            rewrite(&self.normalized[range], &mut normalized);
            alignments.extend(std::iter::repeat_n(span, normalized.len() - before));
        };

        let mut group_start = 0;
        for (idx, c) in self.normalized.char_indices() {
            if idx > group_start && starts_group(c) {
                emit(group_start..idx);
                group_start = idx;
            }
        }
        if group_start < self.normalized.len() {
            emit(group_start..self.normalized.len());
        }

        self.normalized = normalized;
        self.alignments = alignments;
    }
}

fn is_starter(c: char) -> bool {
    canonical_combining_class(c) == 0
}

fn span_of(alignments: &[Offsets]) -> Offsets {
    alignments
        .iter()
        .fold((usize::MAX, 0), |(start, end), &(s, e)| {
            (start.min(s), end.max(e))
        })
}
