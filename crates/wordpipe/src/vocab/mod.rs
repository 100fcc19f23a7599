//! # Vocabulary
//!
//! This module provides the token vocabularies.
//!
//! * [`TokenVocab`] - the base ``{ token <-> id }`` map owned by a subword model.
//! * [`AddedVocab`] - the overlay of [`AddedToken`]s added after training.
//! * [`Vocabulary`] - a read view combining both, as seen by the tokenizer.
//!
//! [`io`] reads the plain ``vocab.json`` / ``vocab.txt`` / ``merges.txt`` files.

pub mod added_vocab;
pub mod io;
pub mod token_vocab;

#[doc(inline)]
pub use added_vocab::{AddedSplit, AddedToken, AddedTokenEntry, AddedVocab};
#[doc(inline)]
pub use token_vocab::TokenVocab;

use crate::types::{TokenId, WPHashMap};

/// Combined read view of a base vocab and its added-token overlay.
///
/// Lookups consult the overlay first.
#[derive(Debug, Clone, Copy)]
pub struct Vocabulary<'v> {
    base: &'v TokenVocab,
    added: &'v AddedVocab,
}

impl<'v> Vocabulary<'v> {
    /// Build a new view.
    pub fn new(
        base: &'v TokenVocab,
        added: &'v AddedVocab,
    ) -> Self {
        Self { base, added }
    }

    /// The base vocabulary.
    pub fn base(&self) -> &'v TokenVocab {
        self.base
    }

    /// The added-token overlay.
    pub fn added(&self) -> &'v AddedVocab {
        self.added
    }

    /// Look up the id of a token.
    pub fn token_to_id(
        &self,
        token: &str,
    ) -> Option<TokenId> {
        self.added
            .token_to_id(token)
            .or_else(|| self.base.token_to_id(token))
    }

    /// Look up the token of an id.
    ///
    /// Out-of-range ids yield `None`.
    pub fn id_to_token(
        &self,
        id: TokenId,
    ) -> Option<&'v str> {
        self.added
            .id_to_token(id)
            .or_else(|| self.base.id_to_token(id))
    }

    /// Is the id a special token?
    pub fn is_special(
        &self,
        id: TokenId,
    ) -> bool {
        self.added.is_special(id)
    }

    /// The vocabulary size.
    ///
    /// ## Arguments
    /// * `with_added_tokens` - count added tokens which do not share a base id.
    pub fn size(
        &self,
        with_added_tokens: bool,
    ) -> usize {
        if with_added_tokens {
            self.base.len() + self.added.new_token_count(self.base)
        } else {
            self.base.len()
        }
    }

    /// Clone the ``{ token -> id }`` map.
    ///
    /// ## Arguments
    /// * `with_added_tokens` - include the overlay.
    pub fn to_map(
        &self,
        with_added_tokens: bool,
    ) -> WPHashMap<String, TokenId> {
        let mut map = self.base.to_map();
        if with_added_tokens {
            for entry in self.added.entries() {
                map.insert(entry.token.content.clone(), entry.id);
            }
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_view() {
        let base = TokenVocab::from_tokens(["hello", "world", ",", ".", "[UNK]"]);
        let mut added = AddedVocab::default();
        added
            .add_tokens(&[AddedToken::special("[PAD]"), "[UNK]".into()], &base)
            .unwrap();

        let vocab = Vocabulary::new(&base, &added);
        assert_eq!(vocab.size(false), 5);
        assert_eq!(vocab.size(true), 6);
        assert_eq!(vocab.token_to_id("[PAD]"), Some(5));
        assert_eq!(vocab.id_to_token(5), Some("[PAD]"));
        assert_eq!(vocab.id_to_token(99), None);
        assert!(vocab.is_special(5));
        assert!(!vocab.is_special(0));

        assert_eq!(vocab.to_map(false).len(), 5);
        assert_eq!(vocab.to_map(true).len(), 6);
    }

    #[test]
    fn test_vocabulary_consistency() {
        let base = TokenVocab::from_tokens(["a", "b", "c"]);
        let mut added = AddedVocab::default();
        added
            .add_tokens(&["x".into(), AddedToken::special("<s>")], &base)
            .unwrap();
        let vocab = Vocabulary::new(&base, &added);

        for id in 0..vocab.size(true) as TokenId {
            let token = vocab.id_to_token(id).unwrap();
            let round = vocab.id_to_token(vocab.token_to_id(token).unwrap());
            assert_eq!(round, Some(token));
        }
    }
}
