//! # Word-Level Model

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    errors::WPResult,
    models::{SubwordModel, Token, check_unk_token, unknown_token},
    vocab::{TokenVocab, io::load_vocab_json_path},
};

/// Maps each chunk, whole, to one vocabulary entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WordLevel {
    vocab: TokenVocab,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    unk_token: Option<String>,
}

impl WordLevel {
    /// Start building a [`WordLevel`] model.
    pub fn builder() -> WordLevelBuilder {
        WordLevelBuilder::default()
    }

    /// Read a ``vocab.json`` file.
    pub fn read_file<P: AsRef<Path>>(vocab: P) -> WPResult<TokenVocab> {
        load_vocab_json_path(vocab)
    }

    /// Start building a [`WordLevel`] model from a ``vocab.json`` file.
    pub fn from_file<P: AsRef<Path>>(vocab: P) -> WPResult<WordLevelBuilder> {
        Ok(Self::builder().with_vocab(Self::read_file(vocab)?))
    }
}

impl SubwordModel for WordLevel {
    fn tokenize(
        &self,
        chunk: &str,
    ) -> WPResult<Vec<Token>> {
        let offsets = (0, chunk.len());
        let token = match self.vocab.token_to_id(chunk) {
            Some(id) => Token::new(id, chunk, offsets),
            None => unknown_token(&self.vocab, self.unk_token(), chunk, offsets)?,
        };
        Ok(vec![token])
    }

    fn vocab(&self) -> &TokenVocab {
        &self.vocab
    }

    fn unk_token(&self) -> Option<&str> {
        self.unk_token.as_deref()
    }
}

/// Builder for [`WordLevel`].
#[derive(Debug, Clone, Default)]
pub struct WordLevelBuilder {
    vocab: TokenVocab,
    unk_token: Option<String>,
}

impl WordLevelBuilder {
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

    /// Build the model.
    pub fn build(self) -> WPResult<WordLevel> {
        check_unk_token(&self.vocab, self.unk_token.as_deref())?;
        Ok(WordLevel {
            vocab: self.vocab,
            unk_token: self.unk_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::WordpipeError;

    fn model(unk: bool) -> WordLevel {
        let mut builder =
            WordLevel::builder().with_vocab(TokenVocab::from_tokens(["hello", "world", "[UNK]"]));
        if unk {
            builder = builder.with_unk_token("[UNK]");
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_tokenize() {
        let model = model(true);
        assert_eq!(
            model.tokenize("world").unwrap(),
            vec![Token::new(1, "world", (0, 5))]
        );
        assert_eq!(
            model.tokenize("mars").unwrap(),
            vec![Token::new(2, "[UNK]", (0, 4))]
        );
    }

    #[test]
    fn test_tokenize_without_unk_fails() {
        let err = model(false).tokenize("mars").unwrap_err();
        assert!(matches!(err, WordpipeError::UnknownToken { .. }));
    }

    #[test]
    fn test_from_file() {
        tempdir::TempDir::new("word_level")
            .and_then(|dir| {
                let path = dir.path().join("vocab.json");
                std::fs::write(&path, r#"{"hello":0,"[UNK]":1}"#)?;

                let model = WordLevel::from_file(&path)
                    .unwrap()
                    .with_unk_token("[UNK]")
                    .build()
                    .unwrap();
                assert_eq!(model.tokenize("hello").unwrap()[0].id, 0);
                assert_eq!(model.tokenize("bye").unwrap()[0].id, 1);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_build_rejects_missing_unk() {
        let err = WordLevel::builder()
            .with_vocab(TokenVocab::from_tokens(["a"]))
            .with_unk_token("[UNK]")
            .build()
            .unwrap_err();
        assert!(matches!(err, WordpipeError::Configuration(_)));
    }
}
