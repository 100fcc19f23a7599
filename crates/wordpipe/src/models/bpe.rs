//! # Byte-Pair Encoding Model
//!
//! Chunks start as one symbol per char; the lowest-ranked adjacent
//! merge is applied until no ranked pair remains.
//!
//! Non-initial chars carry the `continuing_subword_prefix` (if any);
//! the final char carries the `end_of_word_suffix` (if any).
//! With `fuse_unk`, runs of unknown chars become one unknown token.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    errors::{WPResult, WordpipeError},
    models::{SubwordModel, Token, check_unk_token, unknown_token},
    types::{Offsets, TokenId, WPHashMap, hash_map_with_capacity},
    vocab::{
        TokenVocab,
        io::{load_merges_txt_path, load_vocab_json_path},
    },
};

/// A ranked merge: ``(rank, merged id)``.
type MergeTarget = (u32, TokenId);

/// Byte-pair encoding subword model.
#[derive(Debug, Clone, PartialEq)]
pub struct Bpe {
    vocab: TokenVocab,
    merges: Vec<(String, String)>,
    merge_map: WPHashMap<(TokenId, TokenId), MergeTarget>,
    unk_token: Option<String>,
    continuing_subword_prefix: Option<String>,
    end_of_word_suffix: Option<String>,
    fuse_unk: bool,
}

impl Bpe {
    /// Start building a [`Bpe`] model.
    pub fn builder() -> BpeBuilder {
        BpeBuilder::default()
    }

    /// Read ``vocab.json`` and ``merges.txt`` files.
    pub fn read_file<V, M>(
        vocab: V,
        merges: M,
    ) -> WPResult<(TokenVocab, Vec<(String, String)>)>
    where
        V: AsRef<Path>,
        M: AsRef<Path>,
    {
        Ok((load_vocab_json_path(vocab)?, load_merges_txt_path(merges)?))
    }

    /// Start building a [`Bpe`] model from ``vocab.json`` and ``merges.txt`` files.
    pub fn from_file<V, M>(
        vocab: V,
        merges: M,
    ) -> WPResult<BpeBuilder>
    where
        V: AsRef<Path>,
        M: AsRef<Path>,
    {
        let (vocab, merges) = Self::read_file(vocab, merges)?;
        Ok(Self::builder().with_vocab(vocab).with_merges(merges))
    }

    /// The merge list, in rank order.
    pub fn merges(&self) -> &[(String, String)] {
        &self.merges
    }

    /// The continuation prefix, if any.
    pub fn continuing_subword_prefix(&self) -> Option<&str> {
        self.continuing_subword_prefix.as_deref()
    }

    /// The end-of-word suffix, if any.
    pub fn end_of_word_suffix(&self) -> Option<&str> {
        self.end_of_word_suffix.as_deref()
    }

    /// Are runs of unknown chars fused?
    pub fn fuse_unk(&self) -> bool {
        self.fuse_unk
    }

    /// The initial symbol text for the char at `span` in `chunk`.
    fn initial_symbol(
        &self,
        chunk: &str,
        span: Offsets,
    ) -> String {
        let mut symbol = String::new();
        if span.0 > 0
            && let Some(prefix) = &self.continuing_subword_prefix
        {
            symbol.push_str(prefix);
        }
        symbol.push_str(&chunk[span.0..span.1]);
        if span.1 == chunk.len()
            && let Some(suffix) = &self.end_of_word_suffix
        {
            symbol.push_str(suffix);
        }
        symbol
    }

    fn lookup_merge(
        &self,
        a: Option<TokenId>,
        b: Option<TokenId>,
    ) -> Option<MergeTarget> {
        self.merge_map.get(&(a?, b?)).copied()
    }
}

impl SubwordModel for Bpe {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    fn tokenize(
        &self,
        chunk: &str,
    ) -> WPResult<Vec<Token>> {
        if chunk.is_empty() {
            return Ok(Vec::new());
        }

        // ``ids[i] == None`` marks an unknown char; those never merge.
        let mut ids: Vec<Option<TokenId>> = Vec::with_capacity(chunk.len());
        let mut spans: Vec<Offsets> = Vec::with_capacity(chunk.len());
        for (idx, c) in chunk.char_indices() {
            let span = (idx, idx + c.len_utf8());
            ids.push(self.vocab.token_to_id(&self.initial_symbol(chunk, span)));
            spans.push(span);
        }

        // pair_ranks[i] = merge of (ids[i], ids[i + 1])
        let mut pair_ranks: Vec<Option<MergeTarget>> = ids
            .windows(2)
            .map(|w| self.lookup_merge(w[0], w[1]))
            .collect();

        while let Some((_, i, new_id)) = pair_ranks
            .iter()
            .enumerate()
            .filter_map(|(i, m)| m.map(|(rank, new_id)| (rank, i, new_id)))
            .min()
        {
            ids[i] = Some(new_id);
            spans[i].1 = spans[i + 1].1;

            if i > 0 {
                pair_ranks[i - 1] = self.lookup_merge(ids[i - 1], ids[i]);
            }
            if i + 2 < ids.len() {
                pair_ranks[i + 1] = self.lookup_merge(ids[i], ids[i + 2]);
            }

            pair_ranks.remove(i);
            ids.remove(i + 1);
            spans.remove(i + 1);
        }

        let mut tokens: Vec<Token> = Vec::with_capacity(ids.len());
        let mut after_unknown = false;
        for (id, span) in ids.into_iter().zip(spans) {
            match id {
                Some(id) => {
                    let value = self.vocab.id_to_token(id).unwrap_or_default();
                    tokens.push(Token::new(id, value, span));
                    after_unknown = false;
                }
                None if self.fuse_unk && after_unknown => {
                    if let Some(prev) = tokens.last_mut() {
                        prev.offsets.1 = span.1;
                    }
                }
                None => {
                    tokens.push(unknown_token(
                        &self.vocab,
                        self.unk_token(),
                        &chunk[span.0..span.1],
                        span,
                    )?);
                    after_unknown = true;
                }
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

/// Builder for [`Bpe`].
#[derive(Debug, Clone, Default)]
pub struct BpeBuilder {
    vocab: TokenVocab,
    merges: Vec<(String, String)>,
    unk_token: Option<String>,
    continuing_subword_prefix: Option<String>,
    end_of_word_suffix: Option<String>,
    fuse_unk: bool,
}

impl BpeBuilder {
    /// Set the vocabulary.
    pub fn with_vocab(
        mut self,
        vocab: TokenVocab,
    ) -> Self {
        self.vocab = vocab;
        self
    }

    /// Set the merges, in rank order (first is applied first).
    pub fn with_merges<I, A, B>(
        mut self,
        merges: I,
    ) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        self.merges = merges
            .into_iter()
            .map(|(a, b)| (a.into(), b.into()))
            .collect();
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
        self.continuing_subword_prefix = Some(prefix.into());
        self
    }

    /// Set the end-of-word suffix.
    pub fn with_end_of_word_suffix<S: Into<String>>(
        mut self,
        suffix: S,
    ) -> Self {
        self.end_of_word_suffix = Some(suffix.into());
        self
    }

    /// Fuse runs of unknown chars into one unknown token.
    pub fn with_fuse_unk(
        mut self,
        fuse_unk: bool,
    ) -> Self {
        self.fuse_unk = fuse_unk;
        self
    }

    /// Build the model.
    ///
    /// ## Returns
    /// A `Configuration` error if a merge names a token missing from the
    /// vocabulary, or if the merged token is missing.
    pub fn build(self) -> WPResult<Bpe> {
        check_unk_token(&self.vocab, self.unk_token.as_deref())?;

        let lookup = |token: &str| {
            self.vocab.token_to_id(token).ok_or_else(|| {
                WordpipeError::Configuration(format!(
                    "merge token {token:?} is not in the vocabulary"
                ))
            })
        };

        let mut merge_map = hash_map_with_capacity(self.merges.len());
        for (rank, (a, b)) in self.merges.iter().enumerate() {
            let b_tail = match &self.continuing_subword_prefix {
                Some(prefix) => b.strip_prefix(prefix.as_str()).unwrap_or(b),
                None => b,
            };
            let merged = format!("{a}{b_tail}");
            let target = (rank as u32, lookup(&merged)?);
            // Earlier merges keep their rank.
            merge_map.entry((lookup(a)?, lookup(b)?)).or_insert(target);
        }

        Ok(Bpe {
            vocab: self.vocab,
            merges: self.merges,
            merge_map,
            unk_token: self.unk_token,
            continuing_subword_prefix: self.continuing_subword_prefix,
            end_of_word_suffix: self.end_of_word_suffix,
            fuse_unk: self.fuse_unk,
        })
    }
}

/// A serialized merge; either ``"a b"`` or ``["a", "b"]``.
///
/// Merges are written as pairs; tokens may contain spaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum MergeEntry {
    Joined(String),
    Pair(String, String),
}

impl MergeEntry {
    fn into_pair(self) -> Result<(String, String), String> {
        match self {
            MergeEntry::Pair(a, b) => Ok((a, b)),
            MergeEntry::Joined(joined) => joined
                .split_once(' ')
                .map(|(a, b)| (a.to_string(), b.to_string()))
                .ok_or_else(|| format!("malformed merge {joined:?}")),
        }
    }
}

/// The serialized form of [`Bpe`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BpeConfig {
    vocab: TokenVocab,

    #[serde(default)]
    merges: Vec<MergeEntry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    unk_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    continuing_subword_prefix: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    end_of_word_suffix: Option<String>,

    #[serde(default)]
    fuse_unk: bool,
}

impl Serialize for Bpe {
    fn serialize<S>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        BpeConfig {
            vocab: self.vocab.clone(),
            merges: self
                .merges
                .iter()
                .map(|(a, b)| MergeEntry::Pair(a.clone(), b.clone()))
                .collect(),
            unk_token: self.unk_token.clone(),
            continuing_subword_prefix: self.continuing_subword_prefix.clone(),
            end_of_word_suffix: self.end_of_word_suffix.clone(),
            fuse_unk: self.fuse_unk,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Bpe {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        let config = BpeConfig::deserialize(deserializer)?;
        let merges = config
            .merges
            .into_iter()
            .map(MergeEntry::into_pair)
            .collect::<Result<Vec<_>, _>>()
            .map_err(D::Error::custom)?;

        let mut builder = Bpe::builder()
            .with_vocab(config.vocab)
            .with_merges(merges)
            .with_fuse_unk(config.fuse_unk);
        if let Some(unk) = config.unk_token {
            builder = builder.with_unk_token(unk);
        }
        if let Some(prefix) = config.continuing_subword_prefix {
            builder = builder.with_continuing_subword_prefix(prefix);
        }
        if let Some(suffix) = config.end_of_word_suffix {
            builder = builder.with_end_of_word_suffix(suffix);
        }
        builder.build().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> Bpe {
        Bpe::builder()
            .with_vocab(TokenVocab::from_tokens([
                "<unk>", "l", "o", "w", "e", "r", "lo", "low", "er", "lower",
            ]))
            .with_merges([("l", "o"), ("lo", "w"), ("e", "r"), ("low", "er")])
            .with_unk_token("<unk>")
            .build()
            .unwrap()
    }

    #[test]
    fn test_merges_by_rank() {
        let tokens = model().tokenize("lower").unwrap();
        assert_eq!(tokens, vec![Token::new(9, "lower", (0, 5))]);

        let tokens = model().tokenize("lowe").unwrap();
        assert_eq!(
            tokens,
            vec![Token::new(7, "low", (0, 3)), Token::new(4, "e", (3, 4))]
        );
    }

    #[test]
    fn test_unknown_chars() {
        let tokens = model().tokenize("lxo").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::new(1, "l", (0, 1)),
                Token::new(0, "<unk>", (1, 2)),
                Token::new(2, "o", (2, 3)),
            ]
        );

        let strict = Bpe::builder()
            .with_vocab(TokenVocab::from_tokens(["a"]))
            .build()
            .unwrap();
        assert!(matches!(
            strict.tokenize("ab"),
            Err(WordpipeError::UnknownToken { token }) if token == "b"
        ));
    }

    #[test]
    fn test_prefix_and_suffix() {
        let model = Bpe::builder()
            .with_vocab(TokenVocab::from_tokens(["a", "##b", "ab", "c</w>", "##c</w>"]))
            .with_merges([("a", "##b")])
            .with_continuing_subword_prefix("##")
            .with_end_of_word_suffix("</w>")
            .build()
            .unwrap();

        let tokens = model.tokenize("abc").unwrap();
        assert_eq!(
            tokens,
            vec![Token::new(2, "ab", (0, 2)), Token::new(4, "##c</w>", (2, 3))]
        );
        assert_eq!(
            model.tokenize("c").unwrap(),
            vec![Token::new(3, "c</w>", (0, 1))]
        );
    }

    #[test]
    fn test_build_rejects_bad_merges() {
        let err = Bpe::builder()
            .with_vocab(TokenVocab::from_tokens(["a", "b"]))
            .with_merges([("a", "b")])
            .build()
            .unwrap_err();
        assert!(matches!(err, WordpipeError::Configuration(_)));
    }

    #[test]
    fn test_serde() {
        let model = model();
        let json = serde_json::to_string(&model).unwrap();
        assert!(json.contains(r#""merges":[["l","o"],["lo","w"],["e","r"],["low","er"]]"#));

        let restored: Bpe = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, model);

        let joined: Bpe = serde_json::from_str(
            r#"{"vocab":{"a":0,"b":1,"ab":2},"merges":["a b"]}"#,
        )
        .unwrap();
        assert_eq!(joined.tokenize("ab").unwrap(), vec![Token::new(2, "ab", (0, 2))]);
    }

    #[test]
    fn test_serde_keeps_merges_with_spaces() {
        let model = Bpe::builder()
            .with_vocab(TokenVocab::from_tokens(["a b", "c", "a bc"]))
            .with_merges([("a b", "c")])
            .with_fuse_unk(true)
            .build()
            .unwrap();

        let json = serde_json::to_string(&model).unwrap();
        let restored: Bpe = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, model);
        assert_eq!(restored.merges(), &[("a b".to_string(), "c".to_string())]);
        assert!(restored.fuse_unk());
    }

    #[test]
    fn test_fuse_unk() {
        let fused = Bpe::builder()
            .with_vocab(TokenVocab::from_tokens(["<unk>", "a"]))
            .with_unk_token("<unk>")
            .with_fuse_unk(true)
            .build()
            .unwrap();
        assert_eq!(
            fused.tokenize("axyza").unwrap(),
            vec![
                Token::new(1, "a", (0, 1)),
                Token::new(0, "<unk>", (1, 4)),
                Token::new(1, "a", (4, 5)),
            ]
        );

        let unfused = model();
        assert_eq!(unfused.tokenize("xy").unwrap().len(), 2);
    }

    #[test]
    fn test_from_file() {
        tempdir::TempDir::new("bpe")
            .and_then(|dir| {
                let vocab = dir.path().join("vocab.json");
                let merges = dir.path().join("merges.txt");
                std::fs::write(&vocab, r#"{"<unk>":0,"l":1,"o":2,"w":3,"lo":4,"low":5}"#)?;
                std::fs::write(&merges, "#version: 0.2\nl o\nlo w\n")?;

                let model = Bpe::from_file(&vocab, &merges)
                    .unwrap()
                    .with_unk_token("<unk>")
                    .build()
                    .unwrap();
                assert_eq!(model.merges().len(), 2);
                assert_eq!(
                    model.tokenize("low").unwrap(),
                    vec![Token::new(5, "low", (0, 3))]
                );
                Ok(())
            })
            .unwrap();
    }
}
