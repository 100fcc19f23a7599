//! # Encoding Results
//!
//! An [`Encoding`] is the full result of encoding one input (single or pair):
//! the ids plus the per-token metadata models need (masks, type ids, offsets).
//!
//! All per-token vectors always have equal length.

use core::ops::Range;

use crate::{
    errors::{WPResult, WordpipeError},
    types::{Offsets, TokenId, WPHashMap, hash_map_new},
    utils::{padding::PaddingDirection, truncation::TruncationDirection},
};

#[cfg(test)]
use crate::models::Token;

/// The result of encoding one input.
///
/// Encodings are produced by [`Tokenizer`](crate::Tokenizer) and handed out
/// by value; only the pipeline mutates them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Encoding {
    ids: Vec<TokenId>,
    type_ids: Vec<u32>,
    tokens: Vec<String>,
    words: Vec<Option<u32>>,
    offsets: Vec<Offsets>,
    special_tokens_mask: Vec<u32>,
    attention_mask: Vec<u32>,
    overflowing: Vec<Encoding>,
    sequence_ranges: WPHashMap<usize, Range<usize>>,
}

impl Encoding {
    /// Build a single-sequence encoding from model tokens.
    ///
    /// ## Arguments
    /// * `tokens` - ``(token, word index)`` pairs.
    /// * `type_id` - the type id of every token.
    #[cfg(test)]
    pub(crate) fn from_tokens<I>(
        tokens: I,
        type_id: u32,
    ) -> Self
    where
        I: IntoIterator<Item = (Token, Option<u32>)>,
    {
        let mut encoding = Self::default();
        for (token, word) in tokens {
            encoding.push(token.id, token.value, word, token.offsets, type_id, 0, 1);
        }
        encoding
    }

    /// Build a one-token encoding for a special token.
    pub(crate) fn special<S: Into<String>>(
        id: TokenId,
        token: S,
        type_id: u32,
    ) -> Self {
        let mut encoding = Self::default();
        encoding.push(id, token.into(), None, (0, 0), type_id, 1, 1);
        encoding
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn push(
        &mut self,
        id: TokenId,
        token: String,
        word: Option<u32>,
        offsets: Offsets,
        type_id: u32,
        special: u32,
        attention: u32,
    ) {
        self.ids.push(id);
        self.tokens.push(token);
        self.words.push(word);
        self.offsets.push(offsets);
        self.type_ids.push(type_id);
        self.special_tokens_mask.push(special);
        self.attention_mask.push(attention);
    }

    /// The number of tokens.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Is the encoding empty?
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The token ids.
    pub fn ids(&self) -> &[TokenId] {
        &self.ids
    }

    /// The type (segment) ids; ``0`` for the first sequence, ``1`` for the second.
    pub fn type_ids(&self) -> &[u32] {
        &self.type_ids
    }

    /// The token strings.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// The word (chunk) index of each token; `None` for special and pad tokens.
    pub fn word_ids(&self) -> &[Option<u32>] {
        &self.words
    }

    /// The byte span of each token in its source text.
    pub fn offsets(&self) -> &[Offsets] {
        &self.offsets
    }

    /// ``1`` for special tokens (and padding), ``0`` otherwise.
    pub fn special_tokens_mask(&self) -> &[u32] {
        &self.special_tokens_mask
    }

    /// ``1`` for real tokens, ``0`` for padding.
    pub fn attention_mask(&self) -> &[u32] {
        &self.attention_mask
    }

    /// The overflow windows produced by truncation.
    pub fn overflowing(&self) -> &[Encoding] {
        &self.overflowing
    }

    /// The number of input sequences merged into this encoding.
    pub fn n_sequences(&self) -> usize {
        self.sequence_ranges.len().max(1)
    }

    /// The token range of a sequence, if it is present.
    pub fn sequence_range(
        &self,
        sequence: usize,
    ) -> Option<Range<usize>> {
        if self.sequence_ranges.is_empty() {
            return (sequence == 0).then_some(0..self.len());
        }
        self.sequence_ranges.get(&sequence).cloned()
    }

    /// The sequence a token belongs to; `None` for boundary and pad tokens.
    pub fn token_to_sequence(
        &self,
        token_index: usize,
    ) -> Option<usize> {
        if token_index >= self.len() {
            return None;
        }
        if self.sequence_ranges.is_empty() {
            return Some(0);
        }
        self.sequence_ranges
            .iter()
            .find(|(_, range)| range.contains(&token_index))
            .map(|(&sequence, _)| sequence)
    }

    pub(crate) fn set_type_id(
        &mut self,
        type_id: u32,
    ) {
        self.type_ids.iter_mut().for_each(|t| *t = type_id);
    }

    pub(crate) fn take_overflowing(&mut self) -> Vec<Encoding> {
        core::mem::take(&mut self.overflowing)
    }

    pub(crate) fn set_overflowing(
        &mut self,
        overflowing: Vec<Encoding>,
    ) {
        self.overflowing = overflowing;
    }

    /// Append `other`; if `sequence` is given, record its token range.
    ///
    /// `other`'s own overflow windows are discarded.
    pub(crate) fn merge(
        &mut self,
        other: Encoding,
        sequence: Option<usize>,
    ) {
        let start = self.len();
        if let Some(sequence) = sequence {
            self.sequence_ranges
                .insert(sequence, start..start + other.len());
        }
        self.ids.extend(other.ids);
        self.type_ids.extend(other.type_ids);
        self.tokens.extend(other.tokens);
        self.words.extend(other.words);
        self.offsets.extend(other.offsets);
        self.special_tokens_mask.extend(other.special_tokens_mask);
        self.attention_mask.extend(other.attention_mask);
    }

    fn slice(
        &self,
        range: Range<usize>,
    ) -> Encoding {
        Encoding {
            ids: self.ids[range.clone()].to_vec(),
            type_ids: self.type_ids[range.clone()].to_vec(),
            tokens: self.tokens[range.clone()].to_vec(),
            words: self.words[range.clone()].to_vec(),
            offsets: self.offsets[range.clone()].to_vec(),
            special_tokens_mask: self.special_tokens_mask[range.clone()].to_vec(),
            attention_mask: self.attention_mask[range].to_vec(),
            overflowing: Vec::new(),
            sequence_ranges: hash_map_new(),
        }
    }

    /// Truncate to `max_len` tokens, moving the removed tokens into
    /// overflow windows.
    ///
    /// Windows hold at most `max_len` tokens, and each repeats the last
    /// `stride` tokens of its predecessor. With `Right`, the kept part is
    /// the head and windows walk forward; with `Left`, the kept part is the
    /// tail and windows walk backward.
    ///
    /// Applies to single-sequence encodings, before post-processing.
    ///
    /// ## Returns
    /// `InvalidInput` if `stride >= max_len` and truncation is needed.
    pub(crate) fn truncate(
        &mut self,
        max_len: usize,
        stride: usize,
        direction: TruncationDirection,
    ) -> WPResult<()> {
        let len = self.len();
        if len <= max_len {
            return Ok(());
        }
        if max_len == 0 {
            let whole = core::mem::take(self);
            self.overflowing = vec![whole];
            return Ok(());
        }
        if stride >= max_len {
            return Err(WordpipeError::InvalidInput(format!(
                "stride ({stride}) must be less than the truncated length ({max_len})"
            )));
        }

        let step = max_len - stride;
        let mut windows = Vec::new();
        match direction {
            TruncationDirection::Right => {
                let mut start = 0;
                loop {
                    let end = (start + max_len).min(len);
                    windows.push(start..end);
                    if end == len {
                        break;
                    }
                    start += step;
                }
            }
            TruncationDirection::Left => {
                let mut end = len;
                loop {
                    let start = end.saturating_sub(max_len);
                    windows.push(start..end);
                    if start == 0 {
                        break;
                    }
                    end -= step;
                }
            }
        }

        let mut windows = windows.into_iter().map(|range| self.slice(range));
        // The first window is never empty here.
        let kept = windows.next().unwrap_or_default();
        let overflowing = windows.collect();
        *self = kept;
        self.overflowing = overflowing;
        Ok(())
    }

    /// Pad to `target` tokens; overflow windows are padded too.
    pub(crate) fn pad(
        &mut self,
        target: usize,
        pad_id: TokenId,
        pad_type_id: u32,
        pad_token: &str,
        direction: PaddingDirection,
    ) {
        for overflow in &mut self.overflowing {
            overflow.pad(target, pad_id, pad_type_id, pad_token, direction);
        }

        let len = self.len();
        if len >= target {
            return;
        }
        let pad_len = target - len;

        let mut padding = Encoding::default();
        for _ in 0..pad_len {
            padding.push(pad_id, pad_token.to_string(), None, (0, 0), pad_type_id, 1, 0);
        }

        match direction {
            PaddingDirection::Right => self.merge(padding, None),
            PaddingDirection::Left => {
                let overflowing = self.take_overflowing();
                let ranges = core::mem::take(&mut self.sequence_ranges);
                let body = core::mem::replace(self, padding);
                self.merge(body, None);
                self.sequence_ranges = ranges
                    .into_iter()
                    .map(|(seq, range)| (seq, range.start + pad_len..range.end + pad_len))
                    .collect();
                self.overflowing = overflowing;
            }
        }
    }
}
