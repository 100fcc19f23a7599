//! # Chunk Splitters
//!
//! Each splitter returns ordered, non-overlapping, non-empty byte ranges.

use core::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use unicode_general_category::{GeneralCategory, get_general_category};

static WORD_OR_PUNCT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+|[^\w\s]+").expect("static pattern"));

/// Runs of word chars, and runs of non-word non-space chars.
pub fn split_words_and_punct(text: &str) -> Vec<Range<usize>> {
    WORD_OR_PUNCT_RE
        .find_iter(text)
        .map(|m| m.range())
        .collect()
}

/// Split on any char matching `is_delimiter`, dropping the delimiters.
pub fn split_on<F>(
    text: &str,
    is_delimiter: F,
) -> Vec<Range<usize>>
where
    F: Fn(char) -> bool,
{
    let mut ranges = Vec::new();
    let mut start = 0;
    for (idx, c) in text.char_indices() {
        if is_delimiter(c) {
            if start < idx {
                ranges.push(start..idx);
            }
            start = idx + c.len_utf8();
        }
    }
    if start < text.len() {
        ranges.push(start..text.len());
    }
    ranges
}

/// Split on whitespace, dropping it.
pub fn split_whitespace(text: &str) -> Vec<Range<usize>> {
    split_on(text, char::is_whitespace)
}

/// Split on whitespace, then isolate every punctuation char.
pub fn split_bert(text: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    for word in split_whitespace(text) {
        let mut start = word.start;
        for (idx, c) in text[word.clone()].char_indices() {
            let idx = word.start + idx;
            if is_punctuation(c) {
                if start < idx {
                    ranges.push(start..idx);
                }
                ranges.push(idx..idx + c.len_utf8());
                start = idx + c.len_utf8();
            }
        }
        if start < word.end {
            ranges.push(start..word.end);
        }
    }
    ranges
}

/// ASCII punctuation, plus every unicode punctuation category.
pub fn is_punctuation(c: char) -> bool {
    if c.is_ascii() {
        return c.is_ascii_punctuation();
    }
    matches!(
        get_general_category(c),
        GeneralCategory::ConnectorPunctuation
            | GeneralCategory::DashPunctuation
            | GeneralCategory::OpenPunctuation
            | GeneralCategory::ClosePunctuation
            | GeneralCategory::InitialPunctuation
            | GeneralCategory::FinalPunctuation
            | GeneralCategory::OtherPunctuation
    )
}
