//! # Unigram Model
//!
//! Each vocabulary piece carries a log-probability score; a chunk is
//! segmented into the piece sequence with the highest total score
//! (Viterbi over char positions).
//!
//! A char no piece can cover scores ``min_score - 10`` and maps to the
//! unknown token; adjacent unknown chars fuse into one token.

use serde::{Deserialize, Serialize};

use crate::{
    errors::{WPResult, WordpipeError},
    models::{SubwordModel, Token, unknown_token},
    types::TokenId,
    vocab::TokenVocab,
};

/// The score penalty of an unknown char, below the lowest piece score.
const UNK_PENALTY: f64 = 10.0;

/// Unigram language-model subword model.
#[derive(Debug, Clone, PartialEq)]
pub struct Unigram {
    vocab: TokenVocab,
    scores: Vec<f64>,
    unk_id: Option<usize>,
    max_piece_chars: usize,
    unk_score: f64,
}

/// A Viterbi lattice cell: ``(score, start, id)`` of the best path ending here.
///
/// `id == None` marks an unknown char.
type Cell = Option<(f64, usize, Option<TokenId>)>;

impl Unigram {
    /// Build a model from scored pieces; ids are list positions.
    ///
    /// ## Arguments
    /// * `pieces` - ``(piece, score)`` pairs.
    /// * `unk_id` - the id of the unknown piece, if any.
    ///
    /// ## Returns
    /// A `Configuration` error for an empty or duplicated vocabulary,
    /// or an `unk_id` out of range.
    pub fn from_scores<I, S>(
        pieces: I,
        unk_id: Option<usize>,
    ) -> WPResult<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let (tokens, scores): (Vec<String>, Vec<f64>) =
            pieces.into_iter().map(|(t, s)| (t.into(), s)).unzip();
        if tokens.is_empty() {
            return Err(WordpipeError::Configuration(
                "unigram vocabulary is empty".to_string(),
            ));
        }
        if let Some(unk_id) = unk_id
            && unk_id >= tokens.len()
        {
            return Err(WordpipeError::Configuration(format!(
                "unk_id {unk_id} is out of range for {} pieces",
                tokens.len()
            )));
        }

        let max_piece_chars = tokens
            .iter()
            .map(|t| t.chars().count())
            .max()
            .unwrap_or(1);
        let min_score = scores.iter().copied().fold(f64::INFINITY, f64::min);

        let vocab = TokenVocab::from_tokens(tokens.iter().cloned());
        if vocab.len() != tokens.len() {
            return Err(WordpipeError::Configuration(
                "unigram vocabulary has duplicate pieces".to_string(),
            ));
        }

        Ok(Self {
            vocab,
            scores,
            unk_id,
            max_piece_chars,
            unk_score: min_score - UNK_PENALTY,
        })
    }

    /// The id of the unknown piece, if any.
    pub fn unk_id(&self) -> Option<usize> {
        self.unk_id
    }

    /// The score of a piece.
    pub fn score(
        &self,
        id: TokenId,
    ) -> Option<f64> {
        self.scores.get(id as usize).copied()
    }

    fn relax(
        cell: &mut Cell,
        score: f64,
        start: usize,
        id: Option<TokenId>,
    ) {
        if cell.is_none_or(|(best, _, _)| score > best) {
            *cell = Some((score, start, id));
        }
    }
}

impl SubwordModel for Unigram {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    fn tokenize(
        &self,
        chunk: &str,
    ) -> WPResult<Vec<Token>> {
        if chunk.is_empty() {
            return Ok(Vec::new());
        }

        let bounds: Vec<usize> = chunk
            .char_indices()
            .map(|(idx, _)| idx)
            .chain([chunk.len()])
            .collect();
        let n = bounds.len() - 1;

        let mut lattice: Vec<Cell> = vec![None; n + 1];
        lattice[0] = Some((0.0, 0, None));
        for start in 0..n {
            let Some((base, _, _)) = lattice[start] else {
                continue;
            };

            let mut has_single = false;
            for end in start + 1..=n.min(start + self.max_piece_chars) {
                let Some(id) = self.vocab.token_to_id(&chunk[bounds[start]..bounds[end]]) else {
                    continue;
                };
                has_single |= end == start + 1;
                Self::relax(
                    &mut lattice[end],
                    base + self.scores[id as usize],
                    start,
                    Some(id),
                );
            }
            if !has_single {
                Self::relax(&mut lattice[start + 1], base + self.unk_score, start, None);
            }
        }

        let mut pieces = Vec::new();
        let mut end = n;
        while end > 0
            && let Some((_, start, id)) = lattice[end]
        {
            pieces.push((bounds[start], bounds[end], id));
            end = start;
        }
        pieces.reverse();

        let mut tokens: Vec<Token> = Vec::with_capacity(pieces.len());
        let mut after_unknown = false;
        for (start, end, id) in pieces {
            match id {
                Some(id) => {
                    tokens.push(Token::new(id, &chunk[start..end], (start, end)));
                    after_unknown = false;
                }
                None if after_unknown => {
                    if let Some(prev) = tokens.last_mut() {
                        prev.offsets.1 = end;
                    }
                }
                None => {
                    tokens.push(unknown_token(
                        &self.vocab,
                        self.unk_token(),
                        &chunk[start..end],
                        (start, end),
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
        self.unk_id
            .and_then(|id| self.vocab.id_to_token(id as TokenId))
    }
}

/// The serialized form of [`Unigram`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct UnigramConfig {
    #[serde(default)]
    unk_id: Option<usize>,

    vocab: Vec<(String, f64)>,
}

impl Serialize for Unigram {
    fn serialize<S>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        UnigramConfig {
            unk_id: self.unk_id,
            vocab: self
                .vocab
                .iter_by_id()
                .map(|(token, id)| (token.to_string(), self.scores[id as usize]))
                .collect(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Unigram {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let config = UnigramConfig::deserialize(deserializer)?;
        Unigram::from_scores(config.vocab, config.unk_id).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> Unigram {
        Unigram::from_scores(
            [
                ("<unk>", 0.0),
                ("a", -1.0),
                ("b", -2.0),
                ("ab", -1.5),
                ("abc", -5.0),
                ("c", -2.0),
            ],
            Some(0),
        )
        .unwrap()
    }

    fn ids(tokens: &[Token]) -> Vec<TokenId> {
        tokens.iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_best_segmentation() {
        let model = model();
        assert_eq!(
            model.tokenize("ab").unwrap(),
            vec![Token::new(3, "ab", (0, 2))]
        );
        // ab + c (-3.5) beats abc (-5.0) and a + b + c (-5.0).
        assert_eq!(ids(&model.tokenize("abc").unwrap()), vec![3, 5]);
        assert_eq!(ids(&model.tokenize("ba").unwrap()), vec![2, 1]);
    }

    #[test]
    fn test_unknown_chars_fuse() {
        let model = model();
        assert_eq!(
            model.tokenize("xéab").unwrap(),
            vec![Token::new(0, "<unk>", (0, 3)), Token::new(3, "ab", (3, 5))]
        );
        assert_eq!(model.unk_token(), Some("<unk>"));

        let strict = Unigram::from_scores([("a", -1.0)], None).unwrap();
        assert!(matches!(
            strict.tokenize("ax"),
            Err(WordpipeError::UnknownToken { token }) if token == "x"
        ));
    }

    #[test]
    fn test_from_scores_validates() {
        let empty: [(&str, f64); 0] = [];
        assert!(Unigram::from_scores(empty, None).is_err());
        assert!(Unigram::from_scores([("a", -1.0)], Some(1)).is_err());
        assert!(Unigram::from_scores([("a", -1.0), ("a", -2.0)], None).is_err());
    }

    #[test]
    fn test_serde() {
        let model = model();
        let json = serde_json::to_string(&model).unwrap();
        assert!(json.starts_with(r#"{"unk_id":0,"vocab":[["<unk>",0.0],["a",-1.0]"#));

        let restored: Unigram = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, model);
        assert_eq!(restored.score(3), Some(-1.5));
    }
}
