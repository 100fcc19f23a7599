//! # Pre-Tokenizers
//!
//! A [`PreTokenizer`] splits normalized text into coarse chunks
//! (words, punctuation), each carrying its span in the original input.

pub mod splitters;

use core::ops::Range;

use serde::{Deserialize, Serialize};

use crate::{normalizers::NormalizedString, types::Offsets};

/// A chunk of normalized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    /// The normalized chunk text.
    pub text: String,

    /// The chunk's span in the original input.
    pub offsets: Offsets,
}

/// Pre-tokenizer capability.
pub trait PreTokenizer: Send + Sync {
    /// Split `text` into ordered, non-overlapping byte ranges.
    fn split(
        &self,
        text: &str,
    ) -> Vec<Range<usize>>;

    /// Split normalized text into chunks with original offsets.
    fn pre_tokenize(
        &self,
        normalized: &NormalizedString,
    ) -> Vec<Split> {
        let text = normalized.normalized();
        self.split(text)
            .into_iter()
            .filter(|range| !range.is_empty())
            .map(|range| Split {
                text: text[range.clone()].to_string(),
                offsets: normalized.offsets_to_original(range),
            })
            .collect()
    }
}

/// The built-in pre-tokenizers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PreTokenizerWrapper {
    /// Runs of word chars, and runs of other non-space chars: ``\w+|[^\w\s]+``.
    Whitespace,

    /// Split on whitespace only.
    WhitespaceSplit,

    /// Split on whitespace, and isolate every punctuation char.
    BertPreTokenizer,

    /// Split on a delimiter char, dropping it.
    CharDelimiterSplit {
        /// The delimiter.
        delimiter: char,
    },

    /// Apply pre-tokenizers in order; each re-splits the previous chunks.
    Sequence {
        /// The pre-tokenizers.
        pre_tokenizers: Vec<PreTokenizerWrapper>,
    },
}

impl PreTokenizer for PreTokenizerWrapper {
    fn split(
        &self,
        text: &str,
    ) -> Vec<Range<usize>> {
        match self {
            PreTokenizerWrapper::Whitespace => splitters::split_words_and_punct(text),
            PreTokenizerWrapper::WhitespaceSplit => splitters::split_whitespace(text),
            PreTokenizerWrapper::BertPreTokenizer => splitters::split_bert(text),
            PreTokenizerWrapper::CharDelimiterSplit { delimiter } => {
                splitters::split_on(text, |c| c == *delimiter)
            }
            PreTokenizerWrapper::Sequence { pre_tokenizers } => {
                let mut ranges = vec![0..text.len()];
                for stage in pre_tokenizers {
                    ranges = ranges
                        .into_iter()
                        .flat_map(|outer| {
                            stage
                                .split(&text[outer.clone()])
                                .into_iter()
                                .map(move |inner| outer.start + inner.start..outer.start + inner.end)
                        })
                        .collect();
                }
                ranges
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizers::{Normalizer, NormalizerWrapper};

    #[test]
    fn test_pre_tokenize_offsets_follow_normalization() {
        let mut normalized = NormalizedString::new("  Héllo, WORLD");
        NormalizerWrapper::bert_uncased().normalize(&mut normalized);

        let splits = PreTokenizerWrapper::BertPreTokenizer.pre_tokenize(&normalized);
        assert_eq!(
            splits,
            vec![
                Split {
                    text: "hello".to_string(),
                    offsets: (2, 8),
                },
                Split {
                    text: ",".to_string(),
                    offsets: (8, 9),
                },
                Split {
                    text: "world".to_string(),
                    offsets: (10, 15),
                },
            ]
        );
    }

    #[test]
    fn test_sequence() {
        let pre = PreTokenizerWrapper::Sequence {
            pre_tokenizers: vec![
                PreTokenizerWrapper::WhitespaceSplit,
                PreTokenizerWrapper::CharDelimiterSplit { delimiter: '-' },
            ],
        };
        let text = "state-of the-art";
        let pieces: Vec<&str> = pre.split(text).into_iter().map(|r| &text[r]).collect();
        assert_eq!(pieces, vec!["state", "of", "the", "art"]);

        let json = serde_json::to_string(&pre).unwrap();
        let restored: PreTokenizerWrapper = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, pre);
    }

    #[test]
    fn test_whitespace() {
        let normalized = NormalizedString::new("hello , world .");
        let splits = PreTokenizerWrapper::Whitespace.pre_tokenize(&normalized);
        let texts: Vec<&str> = splits.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["hello", ",", "world", "."]);
        assert_eq!(splits[2].offsets, (8, 13));
    }
}
