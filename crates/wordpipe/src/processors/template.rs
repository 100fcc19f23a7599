//! # Template Post-Processor
//!
//! Templates are whitespace-separated pieces:
//! * ``$A`` (or ``$``) - the first sequence; ``$B`` - the second.
//! * anything else - a special token, which must be registered.
//!
//! Every piece takes an optional ``:type_id`` suffix (default 0), e.g.
//! ``"[CLS] $A [SEP] $B:1 [SEP]:1"``.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    encoding::Encoding,
    errors::{WPResult, WordpipeError},
    processors::{PostProcessor, concat_sequences},
    types::TokenId,
};

/// Which input sequence a template piece stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sequence {
    /// The first sequence.
    A,

    /// The second sequence.
    B,
}

impl Sequence {
    fn index(self) -> usize {
        match self {
            Sequence::A => 0,
            Sequence::B => 1,
        }
    }
}

/// One template piece.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Piece {
    /// An input sequence.
    Sequence {
        /// The sequence.
        id: Sequence,

        /// The type id given to its tokens.
        type_id: u32,
    },

    /// A registered special token.
    SpecialToken {
        /// The special token name.
        id: String,

        /// The type id given to its tokens.
        type_id: u32,
    },
}

impl Piece {
    /// Parse one piece, e.g. ``"$B:1"`` or ``"[SEP]"``.
    pub fn parse(piece: &str) -> WPResult<Self> {
        let (body, type_id) = match piece.rsplit_once(':') {
            Some((body, suffix)) if !body.is_empty() => match suffix.parse::<u32>() {
                Ok(type_id) => (body, type_id),
                Err(_) if body.starts_with('$') => {
                    return Err(WordpipeError::Configuration(format!(
                        "bad type id in template piece {piece:?}"
                    )));
                }
                Err(_) => (piece, 0),
            },
            _ => (piece, 0),
        };

        match body.strip_prefix('$') {
            Some("" | "A" | "a") => Ok(Piece::Sequence {
                id: Sequence::A,
                type_id,
            }),
            Some("B" | "b") => Ok(Piece::Sequence {
                id: Sequence::B,
                type_id,
            }),
            Some(_) => Err(WordpipeError::Configuration(format!(
                "unknown sequence in template piece {piece:?}"
            ))),
            None => Ok(Piece::SpecialToken {
                id: body.to_string(),
                type_id,
            }),
        }
    }
}

/// Parse a whitespace-separated template.
pub fn parse_template(template: &str) -> WPResult<Vec<Piece>> {
    template.split_whitespace().map(Piece::parse).collect()
}

/// A special token, which may expand to several ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialToken {
    /// The name used in templates.
    pub id: String,

    /// The ids emitted.
    pub ids: Vec<TokenId>,

    /// The tokens emitted; parallel to `ids`.
    pub tokens: Vec<String>,
}

impl SpecialToken {
    /// A special token emitting a single id.
    pub fn new<S: Into<String>>(
        token: S,
        id: TokenId,
    ) -> Self {
        let token = token.into();
        Self {
            id: token.clone(),
            ids: vec![id],
            tokens: vec![token],
        }
    }
}

impl<S: Into<String>> From<(S, TokenId)> for SpecialToken {
    fn from((token, id): (S, TokenId)) -> Self {
        SpecialToken::new(token, id)
    }
}

/// A template as given by the user: a string or a piece list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplateSpec {
    /// Parsed piece list.
    Pieces(Vec<Piece>),

    /// Unparsed template text.
    Text(String),
}

impl TemplateSpec {
    fn into_pieces(self) -> WPResult<Vec<Piece>> {
        match self {
            TemplateSpec::Pieces(pieces) => Ok(pieces),
            TemplateSpec::Text(text) => parse_template(&text),
        }
    }
}

impl From<&str> for TemplateSpec {
    fn from(text: &str) -> Self {
        TemplateSpec::Text(text.to_string())
    }
}

impl From<Vec<Piece>> for TemplateSpec {
    fn from(pieces: Vec<Piece>) -> Self {
        TemplateSpec::Pieces(pieces)
    }
}

/// Template-driven post-processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TemplateProcessingBuilder")]
pub struct TemplateProcessing {
    single: Vec<Piece>,
    pair: Vec<Piece>,
    special_tokens: BTreeMap<String, SpecialToken>,
}

impl TemplateProcessing {
    /// Start building a [`TemplateProcessing`].
    pub fn builder() -> TemplateProcessingBuilder {
        TemplateProcessingBuilder::default()
    }

    /// The single-sequence template.
    pub fn single(&self) -> &[Piece] {
        &self.single
    }

    /// The pair template.
    pub fn pair(&self) -> &[Piece] {
        &self.pair
    }

    fn count_added(
        &self,
        template: &[Piece],
    ) -> usize {
        template
            .iter()
            .map(|piece| match piece {
                Piece::SpecialToken { id, .. } => {
                    self.special_tokens.get(id).map_or(0, |t| t.ids.len())
                }
                Piece::Sequence { .. } => 0,
            })
            .sum()
    }
}

impl PostProcessor for TemplateProcessing {
    fn added_tokens(
        &self,
        is_pair: bool,
    ) -> usize {
        self.count_added(if is_pair { &self.pair } else { &self.single })
    }

    fn process(
        &self,
        encoding: Encoding,
        pair: Option<Encoding>,
        add_special_tokens: bool,
    ) -> WPResult<Encoding> {
        if !add_special_tokens {
            return Ok(concat_sequences(encoding, pair));
        }

        let template = if pair.is_some() {
            &self.pair
        } else {
            &self.single
        };
        let mut sequences = [Some(encoding), pair];

        let mut result = Encoding::default();
        for piece in template {
            match piece {
                Piece::Sequence { id, type_id } => {
                    // Build-time validation ensures each sequence appears once.
                    if let Some(mut sequence) = sequences[id.index()].take() {
                        sequence.set_type_id(*type_id);
                        result.merge(sequence, Some(id.index()));
                    }
                }
                Piece::SpecialToken { id, type_id } => {
                    if let Some(special) = self.special_tokens.get(id) {
                        for (token_id, token) in special.ids.iter().zip(&special.tokens) {
                            result.merge(
                                Encoding::special(*token_id, token.as_str(), *type_id),
                                None,
                            );
                        }
                    }
                }
            }
        }
        Ok(result)
    }
}

/// Builder for [`TemplateProcessing`].
///
/// Without a pair template, the pair template is the single template
/// followed by ``$B:1``.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateProcessingBuilder {
    #[serde(default)]
    single: Option<TemplateSpec>,

    #[serde(default)]
    pair: Option<TemplateSpec>,

    #[serde(default)]
    special_tokens: BTreeMap<String, SpecialToken>,
}

impl TemplateProcessingBuilder {
    /// Set the single-sequence template.
    pub fn with_single<T: Into<TemplateSpec>>(
        mut self,
        template: T,
    ) -> Self {
        self.single = Some(template.into());
        self
    }

    /// Set the pair template.
    pub fn with_pair<T: Into<TemplateSpec>>(
        mut self,
        template: T,
    ) -> Self {
        self.pair = Some(template.into());
        self
    }

    /// Register a special token.
    pub fn with_special_token<T: Into<SpecialToken>>(
        mut self,
        token: T,
    ) -> Self {
        let token = token.into();
        self.special_tokens.insert(token.id.clone(), token);
        self
    }

    /// Register several special tokens.
    pub fn with_special_tokens<I, T>(
        mut self,
        tokens: I,
    ) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<SpecialToken>,
    {
        for token in tokens {
            self = self.with_special_token(token);
        }
        self
    }

    /// Parse and validate the templates.
    ///
    /// ## Returns
    /// A `Configuration` error if a template is malformed, references an
    /// unregistered special token, or has the wrong sequence pieces.
    pub fn build(self) -> WPResult<TemplateProcessing> {
        let single = self
            .single
            .unwrap_or_else(|| "$A".into())
            .into_pieces()?;
        let pair = match self.pair {
            Some(pair) => pair.into_pieces()?,
            None => {
                let mut pair = single.clone();
                pair.push(Piece::Sequence {
                    id: Sequence::B,
                    type_id: 1,
                });
                pair
            }
        };

        for special in self.special_tokens.values() {
            if special.ids.len() != special.tokens.len() {
                return Err(WordpipeError::Configuration(format!(
                    "special token {:?} has {} ids but {} tokens",
                    special.id,
                    special.ids.len(),
                    special.tokens.len()
                )));
            }
        }

        check_template(&single, &[Sequence::A], &self.special_tokens, "single")?;
        check_template(
            &pair,
            &[Sequence::A, Sequence::B],
            &self.special_tokens,
            "pair",
        )?;

        Ok(TemplateProcessing {
            single,
            pair,
            special_tokens: self.special_tokens,
        })
    }
}

impl TryFrom<TemplateProcessingBuilder> for TemplateProcessing {
    type Error = WordpipeError;

    fn try_from(builder: TemplateProcessingBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}

fn check_template(
    template: &[Piece],
    expected: &[Sequence],
    special_tokens: &BTreeMap<String, SpecialToken>,
    name: &str,
) -> WPResult<()> {
    let mut found = Vec::new();
    for piece in template {
        match piece {
            Piece::Sequence { id, .. } => found.push(*id),
            Piece::SpecialToken { id, .. } if !special_tokens.contains_key(id) => {
                return Err(WordpipeError::Configuration(format!(
                    "special token {id:?} in the {name} template has no registered id"
                )));
            }
            Piece::SpecialToken { .. } => {}
        }
    }
    found.sort_by_key(|s| s.index());
    if found != expected {
        return Err(WordpipeError::Configuration(format!(
            "the {name} template must contain each of {expected:?} exactly once; found {found:?}"
        )));
    }
    Ok(())
}
