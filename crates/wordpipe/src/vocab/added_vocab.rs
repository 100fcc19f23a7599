//! # Added Token Vocabulary
//!
//! Tokens added to a tokenizer after its model was trained.
//!
//! Added tokens are matched verbatim in raw input text, ahead of
//! normalization, and bypass the rest of the encode pipeline.
//!
//! Per-token flags refine matching:
//! * `single_word` - only match when not inside a word.
//! * `lstrip` / `rstrip` - the match absorbs adjacent whitespace.

use core::ops::Range;

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, Input, MatchKind};
use serde::{Deserialize, Serialize};

use crate::{
    errors::{WPResult, WordpipeError},
    types::{TokenId, WPHashMap, WPHashSet},
    vocab::TokenVocab,
};

/// A token to add to a tokenizer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddedToken {
    /// The literal token text.
    pub content: String,

    /// Special tokens are structural (padding, boundaries, unknown);
    /// they can be skipped on decode.
    #[serde(default)]
    pub special: bool,

    /// Only match when the neighbouring chars are not word chars.
    #[serde(default)]
    pub single_word: bool,

    /// Absorb whitespace to the left of a match.
    #[serde(default)]
    pub lstrip: bool,

    /// Absorb whitespace to the right of a match.
    #[serde(default)]
    pub rstrip: bool,
}

impl AddedToken {
    /// Build a new added token.
    pub fn new<S: Into<String>>(
        content: S,
        special: bool,
    ) -> Self {
        Self {
            content: content.into(),
            special,
            single_word: false,
            lstrip: false,
            rstrip: false,
        }
    }

    /// Build a new special token.
    pub fn special<S: Into<String>>(content: S) -> Self {
        Self::new(content, true)
    }

    /// Set `single_word`.
    pub fn with_single_word(
        mut self,
        single_word: bool,
    ) -> Self {
        self.single_word = single_word;
        self
    }

    /// Set `lstrip`.
    pub fn with_lstrip(
        mut self,
        lstrip: bool,
    ) -> Self {
        self.lstrip = lstrip;
        self
    }

    /// Set `rstrip`.
    pub fn with_rstrip(
        mut self,
        rstrip: bool,
    ) -> Self {
        self.rstrip = rstrip;
        self
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl From<&str> for AddedToken {
    fn from(content: &str) -> Self {
        Self::new(content, false)
    }
}

impl From<String> for AddedToken {
    fn from(content: String) -> Self {
        Self::new(content, false)
    }
}

/// An [`AddedToken`] with its assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddedTokenEntry {
    /// The assigned id.
    pub id: TokenId,

    /// The token.
    #[serde(flatten)]
    pub token: AddedToken,
}

/// A piece of input text, as split by [`AddedVocab::split`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddedSplit {
    /// A verbatim added-token match.
    Added {
        /// The added token's id.
        id: TokenId,

        /// The byte range of the match.
        range: Range<usize>,
    },

    /// Text between matches, for the normal pipeline.
    Text(Range<usize>),
}

/// The overlay vocabulary of added tokens.
///
/// New tokens are assigned ids past the base vocabulary, in insertion order.
/// Tokens already in the base vocabulary keep their base id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<AddedTokenEntry>", into = "Vec<AddedTokenEntry>")]
pub struct AddedVocab {
    entries: Vec<AddedTokenEntry>,
    content_to_id: WPHashMap<String, TokenId>,
    id_to_content: WPHashMap<TokenId, String>,
    special_ids: WPHashSet<TokenId>,
    max_id: Option<TokenId>,
    matcher: Option<AhoCorasick>,
}

impl PartialEq for AddedVocab {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.entries == other.entries
    }
}

impl TryFrom<Vec<AddedTokenEntry>> for AddedVocab {
    type Error = WordpipeError;

    fn try_from(entries: Vec<AddedTokenEntry>) -> WPResult<Self> {
        let mut vocab = AddedVocab::default();
        for entry in entries {
            if entry.token.content.is_empty() {
                return Err(WordpipeError::Serialization(format!(
                    "added token {} has empty content",
                    entry.id
                )));
            }
            if vocab.content_to_id.contains_key(&entry.token.content)
                || vocab.id_to_content.contains_key(&entry.id)
            {
                return Err(WordpipeError::Serialization(format!(
                    "duplicate added token: {:?} ({})",
                    entry.token.content, entry.id
                )));
            }
            vocab.insert_entry(entry);
        }
        vocab.rebuild_matcher()?;
        Ok(vocab)
    }
}

impl From<AddedVocab> for Vec<AddedTokenEntry> {
    fn from(vocab: AddedVocab) -> Self {
        vocab.entries
    }
}

impl AddedVocab {
    /// The number of added tokens, including those sharing a base id.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Is the overlay empty?
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entries, in insertion order.
    pub fn entries(&self) -> &[AddedTokenEntry] {
        &self.entries
    }

    /// The number of added tokens which do not share a base id.
    pub fn new_token_count(
        &self,
        base: &TokenVocab,
    ) -> usize {
        self.entries
            .iter()
            .filter(|e| base.id_to_token(e.id).is_none())
            .count()
    }

    /// Look up the id of an added token.
    pub fn token_to_id(
        &self,
        content: &str,
    ) -> Option<TokenId> {
        self.content_to_id.get(content).copied()
    }

    /// Look up the content of an added token.
    pub fn id_to_token(
        &self,
        id: TokenId,
    ) -> Option<&str> {
        self.id_to_content.get(&id).map(String::as_str)
    }

    /// Is the id a special token?
    pub fn is_special(
        &self,
        id: TokenId,
    ) -> bool {
        self.special_ids.contains(&id)
    }

    /// Add tokens to the overlay.
    ///
    /// Adding is idempotent: a token which is already present returns its
    /// existing id. Re-adding a token as special marks it special.
    ///
    /// ## Arguments
    /// * `tokens` - the tokens to add.
    /// * `base` - the model's vocabulary, used to reuse ids and assign new ones.
    ///
    /// ## Returns
    /// The ids of `tokens`, in order; or an `InvalidInput` error, with no
    /// change made, if any token is empty.
    pub fn add_tokens(
        &mut self,
        tokens: &[AddedToken],
        base: &TokenVocab,
    ) -> WPResult<Vec<TokenId>> {
        if let Some(empty) = tokens.iter().position(|t| t.content.is_empty()) {
            return Err(WordpipeError::InvalidInput(format!(
                "added token {empty} has empty content"
            )));
        }

        let mut ids = Vec::with_capacity(tokens.len());
        let mut next_id = self.next_id(base);
        let mut changed = false;
        for token in tokens {
            if let Some(id) = self.token_to_id(&token.content) {
                if token.special
                    && self.special_ids.insert(id)
                    && let Some(entry) = self.entries.iter_mut().find(|e| e.id == id)
                {
                    entry.token.special = true;
                }
                ids.push(id);
                continue;
            }

            let id = match base.token_to_id(&token.content) {
                Some(id) => id,
                None => {
                    next_id += 1;
                    next_id - 1
                }
            };
            self.insert_entry(AddedTokenEntry {
                id,
                token: token.clone(),
            });
            changed = true;
            ids.push(id);
        }

        if changed {
            self.rebuild_matcher()?;
        }
        Ok(ids)
    }

    /// Split text around verbatim added-token matches.
    ///
    /// Matching is leftmost-longest, so ``"[SEP]x"`` prefers ``"[SEP]x"``
    /// over ``"[SEP]"`` when both are added. A `single_word` match inside
    /// a word is skipped; the search resumes one char later.
    ///
    /// ## Returns
    /// Splits covering `text` in order; an `lstrip` / `rstrip` match range
    /// includes the whitespace it absorbed.
    pub fn split(
        &self,
        text: &str,
    ) -> Vec<AddedSplit> {
        let Some(matcher) = &self.matcher else {
            return vec![AddedSplit::Text(0..text.len())];
        };

        let mut splits = Vec::new();
        let mut last = 0;
        let mut pos = 0;
        while pos < text.len()
            && let Some(m) = matcher.find(Input::new(text).range(pos..))
        {
            let entry = &self.entries[m.pattern().as_usize()];
            let token = &entry.token;

            if token.single_word {
                let before = text[..m.start()].chars().next_back();
                let after = text[m.end()..].chars().next();
                if before.is_some_and(is_word_char) || after.is_some_and(is_word_char) {
                    pos = m.start() + text[m.start()..].chars().next().map_or(1, char::len_utf8);
                    continue;
                }
            }

            let mut start = m.start();
            if token.lstrip {
                let stripped = text[last..start].trim_end_matches(char::is_whitespace);
                start = last + stripped.len();
            }
            let mut end = m.end();
            if token.rstrip {
                let rest = &text[end..];
                end += rest.len() - rest.trim_start_matches(char::is_whitespace).len();
            }

            if start > last {
                splits.push(AddedSplit::Text(last..start));
            }
            splits.push(AddedSplit::Added {
                id: entry.id,
                range: start..end,
            });
            last = end;
            pos = end;
        }
        if last < text.len() {
            splits.push(AddedSplit::Text(last..text.len()));
        }
        splits
    }

    fn next_id(
        &self,
        base: &TokenVocab,
    ) -> TokenId {
        let overlay_next = self.max_id.map_or(0, |id| id + 1);
        base.next_id().max(overlay_next)
    }

    fn insert_entry(
        &mut self,
        entry: AddedTokenEntry,
    ) {
        self.content_to_id
            .insert(entry.token.content.clone(), entry.id);
        self.id_to_content
            .insert(entry.id, entry.token.content.clone());
        if entry.token.special {
            self.special_ids.insert(entry.id);
        }
        self.max_id = self.max_id.max(Some(entry.id));
        self.entries.push(entry);
    }

    fn rebuild_matcher(&mut self) -> WPResult<()> {
        if self.entries.is_empty() {
            self.matcher = None;
            return Ok(());
        }
        let matcher = AhoCorasickBuilder::new()
            .match_kind(MatchKind::LeftmostLongest)
            .build(self.entries.iter().map(|e| e.token.content.as_str()))
            .map_err(|e| WordpipeError::Configuration(e.to_string()))?;
        self.matcher = Some(matcher);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> TokenVocab {
        TokenVocab::from_tokens(["hello", "world", "[UNK]"])
    }

    #[test]
    fn test_add_tokens_assigns_past_base() {
        let base = base();
        let mut added = AddedVocab::default();

        let ids = added
            .add_tokens(&[AddedToken::special("[CLS]"), "foo".into()], &base)
            .unwrap();
        assert_eq!(ids, vec![3, 4]);
        assert!(added.is_special(3));
        assert!(!added.is_special(4));
        assert_eq!(added.new_token_count(&base), 2);
    }

    #[test]
    fn test_add_tokens_is_idempotent() {
        let base = base();
        let mut added = AddedVocab::default();

        let first = added.add_tokens(&["foo".into()], &base).unwrap();
        let second = added.add_tokens(&["foo".into()], &base).unwrap();
        assert_eq!(first, second);
        assert_eq!(added.len(), 1);

        // Re-adding as special only changes the marker.
        added
            .add_tokens(&[AddedToken::special("foo")], &base)
            .unwrap();
        assert_eq!(added.len(), 1);
        assert!(added.is_special(first[0]));
        assert!(added.entries()[0].token.special);
    }

    #[test]
    fn test_add_tokens_reuses_base_ids() {
        let base = base();
        let mut added = AddedVocab::default();

        let ids = added
            .add_tokens(&[AddedToken::special("[UNK]")], &base)
            .unwrap();
        assert_eq!(ids, vec![2]);
        assert!(added.is_special(2));
        assert_eq!(added.new_token_count(&base), 0);
    }

    #[test]
    fn test_add_tokens_rejects_empty_without_change() {
        let base = base();
        let mut added = AddedVocab::default();

        let err = added
            .add_tokens(&["ok".into(), "".into()], &base)
            .unwrap_err();
        assert!(matches!(err, WordpipeError::InvalidInput(_)));
        assert!(added.is_empty());
    }

    #[test]
    fn test_split() {
        let base = base();
        let mut added = AddedVocab::default();
        added
            .add_tokens(
                &[AddedToken::special("[SEP]"), AddedToken::special("[SEP]x")],
                &base,
            )
            .unwrap();

        let text = "a[SEP]b[SEP]x";
        assert_eq!(
            added.split(text),
            vec![
                AddedSplit::Text(0..1),
                AddedSplit::Added { id: 3, range: 1..6 },
                AddedSplit::Text(6..7),
                AddedSplit::Added {
                    id: 4,
                    range: 7..13
                },
            ]
        );

        assert_eq!(
            AddedVocab::default().split("abc"),
            vec![AddedSplit::Text(0..3)]
        );
    }

    #[test]
    fn test_next_id_skips_sparse_ids() {
        let base = TokenVocab::from_map([("a", 0), ("b", 100)]).unwrap();
        let mut added = AddedVocab::default();

        let tokens: Vec<AddedToken> = (0..50).map(|i| format!("tok{i}").into()).collect();
        let ids = added.add_tokens(&tokens, &base).unwrap();
        assert_eq!(ids, (101..151).collect::<Vec<_>>());

        let more = added.add_tokens(&["x".into(), "tok3".into()], &base).unwrap();
        assert_eq!(more, vec![151, 104]);
    }

    #[test]
    fn test_split_single_word() {
        let base = base();
        let mut added = AddedVocab::default();
        added
            .add_tokens(&[AddedToken::new("ab", false).with_single_word(true)], &base)
            .unwrap();

        assert_eq!(
            added.split("ab cab ab"),
            vec![
                AddedSplit::Added { id: 3, range: 0..2 },
                AddedSplit::Text(2..7),
                AddedSplit::Added { id: 3, range: 7..9 },
            ]
        );
        assert_eq!(added.split("abc"), vec![AddedSplit::Text(0..3)]);
    }

    #[test]
    fn test_split_strips_whitespace() {
        let base = base();
        let mut added = AddedVocab::default();
        added
            .add_tokens(
                &[AddedToken::special("<mask>")
                    .with_lstrip(true)
                    .with_rstrip(true)],
                &base,
            )
            .unwrap();

        assert_eq!(
            added.split("a  <mask> b"),
            vec![
                AddedSplit::Text(0..1),
                AddedSplit::Added {
                    id: 3,
                    range: 1..10
                },
                AddedSplit::Text(10..11),
            ]
        );
        assert_eq!(
            added.split("<mask>"),
            vec![AddedSplit::Added { id: 3, range: 0..6 }]
        );
    }

    #[test]
    fn test_serde() {
        let base = base();
        let mut added = AddedVocab::default();
        added
            .add_tokens(&[AddedToken::special("[CLS]"), "foo".into()], &base)
            .unwrap();

        let json = serde_json::to_string(&added).unwrap();
        assert_eq!(
            json,
            concat!(
                r#"[{"id":3,"content":"[CLS]","special":true,"single_word":false,"lstrip":false,"rstrip":false},"#,
                r#"{"id":4,"content":"foo","special":false,"single_word":false,"lstrip":false,"rstrip":false}]"#
            )
        );

        let restored: AddedVocab = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, added);
        assert_eq!(restored.split("[CLS]").len(), 1);

        let dup = r#"[{"id":3,"content":"a"},{"id":3,"content":"b"}]"#;
        assert!(serde_json::from_str::<AddedVocab>(dup).is_err());
    }
}
