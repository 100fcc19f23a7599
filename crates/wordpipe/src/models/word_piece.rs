//! # `WordPiece` Model
//!
//! Greedy longest-match-first segmentation; pieces after the first
//! carry a continuation prefix (``"##"`` by default).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    errors::WPResult,
    models::{SubwordModel, Token, check_unk_token, unknown_token},
    vocab::{TokenVocab, io::load_vocab_txt_path},
};

/// The default continuation prefix.
pub const DEFAULT_CONTINUING_SUBWORD_PREFIX: &str = "##";

/// The default per-word char limit.
pub const DEFAULT_MAX_INPUT_CHARS_PER_WORD: usize = 100;

fn default_prefix() -> String {
    DEFAULT_CONTINUING_SUBWORD_PREFIX.to_string()
}

fn default_max_chars() -> usize {
    DEFAULT_MAX_INPUT_CHARS_PER_WORD
}

/// `WordPiece` subword model.
///
/// A word which cannot be fully covered by vocabulary pieces, or which is
/// longer than `max_input_chars_per_word`, becomes a single unknown token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordPiece {
    vocab: TokenVocab,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    unk_token: Option<String>,

    #[serde(default = "default_prefix")]
    continuing_subword_prefix: String,

    #[serde(default = "default_max_chars")]
    max_input_chars_per_word: usize,
}

impl WordPiece {
    /// Start building a [`WordPiece`] model.
    pub fn builder() -> WordPieceBuilder {
        WordPieceBuilder::default()
    }

    /// Read a ``vocab.txt`` file; ids are line numbers.
    pub fn read_file<P: AsRef<Path>>(vocab: P) -> WPResult<TokenVocab> {
        load_vocab_txt_path(vocab)
    }

    /// Start building a [`WordPiece`] model from a ``vocab.txt`` file.
    pub fn from_file<P: AsRef<Path>>(vocab: P) -> WPResult<WordPieceBuilder> {
        Ok(Self::builder().with_vocab(Self::read_file(vocab)?))
    }

    /// The continuation prefix.
    pub fn continuing_subword_prefix(&self) -> &str {
        &self.continuing_subword_prefix
    }

    fn unknown(
        &self,
        chunk: &str,
    ) -> WPResult<Vec<Token>> {
        Ok(vec![unknown_token(
            &self.vocab,
            self.unk_token(),
            chunk,
            (0, chunk.len()),
        )?])
    }
}

impl SubwordModel for WordPiece {
    fn tokenize(
        &self,
        chunk: &str,
    ) -> WPResult<Vec<Token>> {
        if chunk.chars().count() > self.max_input_chars_per_word {
            return self.unknown(chunk);
        }

        let mut tokens = Vec::new();
        let mut start = 0;
        let mut candidate = String::with_capacity(chunk.len() + self.continuing_subword_prefix.len());
        while start < chunk.len() {
            let mut end = chunk.len();
            let mut found = None;
            while start < end {
                candidate.clear();
                if start > 0 {
                    candidate.push_str(&self.continuing_subword_prefix);
                }
                candidate.push_str(&chunk[start..end]);

                if let Some(id) = self.vocab.token_to_id(&candidate) {
                    found = Some(Token::new(id, candidate.as_str(), (start, end)));
                    break;
                }

                // Step back one char.
                end -= chunk[..end].chars().next_back().map_or(1, char::len_utf8);
            }

            match found {
                Some(token) => {
                    tokens.push(token);
                    start = end;
                }
                None => return self.unknown(chunk),
            }
        }
        Ok(tokens)
    }

    fn vocab(&self) -> &TokenVocab {
        &self.vocab
    }

    fn unk_token(&self) -> Option<&str> {
        self.unk_token.as_deref()
    }
}

/// Builder for [`WordPiece`].
#[derive(Debug, Clone)]
pub struct WordPieceBuilder {
    vocab: TokenVocab,
    unk_token: Option<String>,
    continuing_subword_prefix: String,
    max_input_chars_per_word: usize,
}

impl Default for WordPieceBuilder {
    fn default() -> Self {
        Self {
            vocab: TokenVocab::default(),
            unk_token: None,
            continuing_subword_prefix: default_prefix(),
            max_input_chars_per_word: default_max_chars(),
        }
    }
}

impl WordPieceBuilder {
    /// Set the vocabulary.
    pub fn with_vocab(
        mut self,
        vocab: TokenVocab,
    ) -> Self {
        self.vocab = vocab;
        self
    }

    /// Set the unknown token; it must be in the vocabulary.
    pub fn with_unk_token<S: Into<String>>(
        mut self,
        unk_token: S,
    ) -> Self {
        self.unk_token = Some(unk_token.into());
        self
    }

    /// Set the continuation prefix.
    pub fn with_continuing_subword_prefix<S: Into<String>>(
        mut self,
        prefix: S,
    ) -> Self {
        self.continuing_subword_prefix = prefix.into();
        self
    }

    /// Set the per-word char limit.
    pub fn with_max_input_chars_per_word(
        mut self,
        max_chars: usize,
    ) -> Self {
        self.max_input_chars_per_word = max_chars;
        self
    }

    /// Build the model.
    pub fn build(self) -> WPResult<WordPiece> {
        check_unk_token(&self.vocab, self.unk_token.as_deref())?;
        Ok(WordPiece {
            vocab: self.vocab,
            unk_token: self.unk_token,
            continuing_subword_prefix: self.continuing_subword_prefix,
            max_input_chars_per_word: self.max_input_chars_per_word,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::WordpipeError;

    fn model() -> WordPiece {
        WordPiece::builder()
            .with_vocab(TokenVocab::from_tokens([
                "[UNK]", "un", "##aff", "##able", "aff", "##a", "é", "##é",
            ]))
            .with_unk_token("[UNK]")
            .with_max_input_chars_per_word(10)
            .build()
            .unwrap()
    }

    #[test]
    fn test_longest_match_first() {
        let tokens = model().tokenize("unaffable").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::new(1, "un", (0, 2)),
                Token::new(2, "##aff", (2, 5)),
                Token::new(3, "##able", (5, 9)),
            ]
        );
    }

    #[test]
    fn test_multibyte() {
        let tokens = model().tokenize("éé").unwrap();
        assert_eq!(
            tokens,
            vec![Token::new(6, "é", (0, 2)), Token::new(7, "##é", (2, 4))]
        );
    }

    #[test]
    fn test_unmatched_word_is_single_unk() {
        let tokens = model().tokenize("unx").unwrap();
        assert_eq!(tokens, vec![Token::new(0, "[UNK]", (0, 3))]);

        let tokens = model().tokenize("unaffableaff").unwrap();
        assert_eq!(tokens, vec![Token::new(0, "[UNK]", (0, 12))]);
    }

    #[test]
    fn test_unmatched_without_unk_fails() {
        let model = WordPiece::builder()
            .with_vocab(TokenVocab::from_tokens(["a"]))
            .build()
            .unwrap();
        assert!(matches!(
            model.tokenize("b"),
            Err(WordpipeError::UnknownToken { .. })
        ));
    }

    #[test]
    fn test_from_file() {
        tempdir::TempDir::new("word_piece")
            .and_then(|dir| {
                let path = dir.path().join("vocab.txt");
                std::fs::write(&path, "[UNK]\nun\n##aff\n##able\n")?;

                let model = WordPiece::from_file(&path)
                    .unwrap()
                    .with_unk_token("[UNK]")
                    .build()
                    .unwrap();
                let ids: Vec<_> = model
                    .tokenize("unaffable")
                    .unwrap()
                    .iter()
                    .map(|t| t.id)
                    .collect();
                assert_eq!(ids, vec![1, 2, 3]);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_serde_defaults() {
        let model: WordPiece =
            serde_json::from_value(serde_json::json!({"vocab": {"a": 0, "##b": 1}})).unwrap();
        assert_eq!(model.continuing_subword_prefix(), "##");
        assert_eq!(model.tokenize("ab").unwrap().len(), 2);
    }
}
