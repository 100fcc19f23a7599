//! # Subword Models
//!
//! A [`SubwordModel`] turns one pre-tokenized chunk into subword [`Token`]s.
//!
//! Built-in models, via [`ModelWrapper`]:
//! * [`WordLevel`] - whole-chunk lookup.
//! * [`WordPiece`] - greedy longest-match-first with a continuation prefix.
//! * [`Bpe`] - byte-pair-encoding merges over chars.
//! * [`Unigram`] - highest-scoring segmentation over scored pieces.

pub mod bpe;
pub mod unigram;
pub mod word_level;
pub mod word_piece;

#[doc(inline)]
pub use bpe::{Bpe, BpeBuilder};
use serde::{Deserialize, Serialize};
#[doc(inline)]
pub use unigram::Unigram;
#[doc(inline)]
pub use word_level::{WordLevel, WordLevelBuilder};
#[doc(inline)]
pub use word_piece::{WordPiece, WordPieceBuilder};

use crate::{
    errors::{WPResult, WordpipeError},
    types::{Offsets, TokenId},
    vocab::TokenVocab,
};

/// A subword token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The token id.
    pub id: TokenId,

    /// The token text, as found in the vocabulary.
    pub value: String,

    /// The token's byte span within the chunk it came from.
    pub offsets: Offsets,
}

impl Token {
    /// Build a new token.
    pub fn new<S: Into<String>>(
        id: TokenId,
        value: S,
        offsets: Offsets,
    ) -> Self {
        Self {
            id,
            value: value.into(),
            offsets,
        }
    }
}

/// Subword model capability.
pub trait SubwordModel: Send + Sync {
    /// Segment one chunk into tokens.
    ///
    /// Subwords missing from the vocabulary become the unknown token,
    /// if one is configured; otherwise this fails with `UnknownToken`.
    fn tokenize(
        &self,
        chunk: &str,
    ) -> WPResult<Vec<Token>>;

    /// The model's base vocabulary.
    fn vocab(&self) -> &TokenVocab;

    /// The unknown token, if configured.
    fn unk_token(&self) -> Option<&str>;

    /// Look up the id of a token.
    fn token_to_id(
        &self,
        token: &str,
    ) -> Option<TokenId> {
        self.vocab().token_to_id(token)
    }

    /// Look up the token of an id.
    fn id_to_token(
        &self,
        id: TokenId,
    ) -> Option<&str> {
        self.vocab().id_to_token(id)
    }
}

/// Build the unknown token for an unmatched span.
pub(crate) fn unknown_token(
    vocab: &TokenVocab,
    unk_token: Option<&str>,
    text: &str,
    offsets: Offsets,
) -> WPResult<Token> {
    let unknown = || WordpipeError::UnknownToken {
        token: text.to_string(),
    };
    let unk = unk_token.ok_or_else(unknown)?;
    let id = vocab.token_to_id(unk).ok_or_else(unknown)?;
    Ok(Token::new(id, unk, offsets))
}

/// Check that a configured unknown token is in the vocab.
pub(crate) fn check_unk_token(
    vocab: &TokenVocab,
    unk_token: Option<&str>,
) -> WPResult<()> {
    match unk_token {
        Some(unk) if !vocab.contains(unk) => Err(WordpipeError::Configuration(format!(
            "unknown token {unk:?} is not in the vocabulary"
        ))),
        _ => Ok(()),
    }
}

/// The built-in subword models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ModelWrapper {
    /// See [`WordLevel`].
    WordLevel(WordLevel),

    /// See [`WordPiece`].
    WordPiece(WordPiece),

    /// See [`Bpe`].
    #[serde(rename = "BPE")]
    Bpe(Bpe),

    /// See [`Unigram`].
    Unigram(Unigram),
}

impl From<WordLevel> for ModelWrapper {
    fn from(model: WordLevel) -> Self {
        ModelWrapper::WordLevel(model)
    }
}

impl From<WordPiece> for ModelWrapper {
    fn from(model: WordPiece) -> Self {
        ModelWrapper::WordPiece(model)
    }
}

impl From<Bpe> for ModelWrapper {
    fn from(model: Bpe) -> Self {
        ModelWrapper::Bpe(model)
    }
}

impl From<Unigram> for ModelWrapper {
    fn from(model: Unigram) -> Self {
        ModelWrapper::Unigram(model)
    }
}

impl ModelWrapper {
    fn inner(&self) -> &dyn SubwordModel {
        match self {
            ModelWrapper::WordLevel(model) => model,
            ModelWrapper::WordPiece(model) => model,
            ModelWrapper::Bpe(model) => model,
            ModelWrapper::Unigram(model) => model,
        }
    }
}

impl SubwordModel for ModelWrapper {
    fn tokenize(
        &self,
        chunk: &str,
    ) -> WPResult<Vec<Token>> {
        self.inner().tokenize(chunk)
    }

    fn vocab(&self) -> &TokenVocab {
        self.inner().vocab()
    }

    fn unk_token(&self) -> Option<&str> {
        self.inner().unk_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_token() {
        let vocab = TokenVocab::from_tokens(["a", "[UNK]"]);

        let token = unknown_token(&vocab, Some("[UNK]"), "zz", (0, 2)).unwrap();
        assert_eq!(token, Token::new(1, "[UNK]", (0, 2)));

        let err = unknown_token(&vocab, None, "zz", (0, 2)).unwrap_err();
        assert!(matches!(err, WordpipeError::UnknownToken { token } if token == "zz"));

        assert!(check_unk_token(&vocab, Some("[UNK]")).is_ok());
        assert!(check_unk_token(&vocab, Some("<unk>")).is_err());
        assert!(check_unk_token(&vocab, None).is_ok());
    }

    #[test]
    fn test_model_wrapper_serde() {
        let model: ModelWrapper = WordLevel::builder()
            .with_vocab(TokenVocab::from_tokens(["a", "[UNK]"]))
            .with_unk_token("[UNK]")
            .build()
            .unwrap()
            .into();

        let json = serde_json::to_string(&model).unwrap();
        assert_eq!(
            json,
            r#"{"type":"WordLevel","vocab":{"a":0,"[UNK]":1},"unk_token":"[UNK]"}"#
        );
        let restored: ModelWrapper = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, model);
        assert_eq!(restored.token_to_id("a"), Some(0));
        assert_eq!(restored.unk_token(), Some("[UNK]"));

        let unigram: ModelWrapper = serde_json::from_str(
            r#"{"type":"Unigram","unk_id":0,"vocab":[["<unk>",0.0],["hi",-1.0]]}"#,
        )
        .unwrap();
        assert_eq!(unigram.tokenize("hi!").unwrap().len(), 2);
        assert_eq!(unigram.unk_token(), Some("<unk>"));
    }
}
