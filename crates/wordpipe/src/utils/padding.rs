//! # Padding
//!
//! Padding runs once per batch, after every item is truncated and
//! post-processed, so the target length is known.

use serde::{Deserialize, Serialize};

use crate::{
    encoding::Encoding,
    errors::{WPResult, WordpipeError},
    types::TokenId,
    utils::parallel::batch_for_each_mut,
};

/// The default pad token.
pub const DEFAULT_PAD_TOKEN: &str = "[PAD]";

/// Which end of an encoding receives padding.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::Display
)]
#[strum(serialize_all = "snake_case")]
pub enum PaddingDirection {
    /// Pad before the tokens.
    Left,

    /// Pad after the tokens.
    #[default]
    Right,
}

/// The target length policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaddingStrategy {
    /// Pad to the longest encoding in the batch.
    #[default]
    BatchLongest,

    /// Pad to a fixed length.
    Fixed(usize),
}

/// Validated padding configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaddingParams {
    /// The target length policy.
    #[serde(default)]
    pub strategy: PaddingStrategy,

    /// The side to pad.
    #[serde(default)]
    pub direction: PaddingDirection,

    /// Round the target up to a multiple of this.
    #[serde(default)]
    pub pad_to_multiple_of: Option<usize>,

    /// The pad token id.
    #[serde(default)]
    pub pad_id: TokenId,

    /// The pad type id.
    #[serde(default)]
    pub pad_type_id: u32,

    /// The pad token.
    #[serde(default = "default_pad_token")]
    pub pad_token: String,
}

fn default_pad_token() -> String {
    DEFAULT_PAD_TOKEN.to_string()
}

impl Default for PaddingParams {
    fn default() -> Self {
        Self {
            strategy: PaddingStrategy::default(),
            direction: PaddingDirection::default(),
            pad_to_multiple_of: None,
            pad_id: 0,
            pad_type_id: 0,
            pad_token: default_pad_token(),
        }
    }
}

impl PaddingParams {
    /// Check the params.
    ///
    /// ## Returns
    /// A `Configuration` error for a zero fixed length,
    /// or a zero `pad_to_multiple_of`.
    pub fn validate(&self) -> WPResult<()> {
        if self.strategy == PaddingStrategy::Fixed(0) {
            return Err(WordpipeError::Configuration(
                "padding length must be positive".to_string(),
            ));
        }
        if self.pad_to_multiple_of == Some(0) {
            return Err(WordpipeError::Configuration(
                "pad_to_multiple_of must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// The padded length for a batch whose longest member is `longest`.
    pub fn target_length(
        &self,
        longest: usize,
    ) -> usize {
        let target = match self.strategy {
            PaddingStrategy::BatchLongest => longest,
            PaddingStrategy::Fixed(length) if length < longest => {
                log::warn!(
                    "padding length {length} is shorter than a batch member ({longest}); padding to {longest}"
                );
                longest
            }
            PaddingStrategy::Fixed(length) => length,
        };
        match self.pad_to_multiple_of {
            Some(multiple) if multiple > 0 => target.div_ceil(multiple) * multiple,
            _ => target,
        }
    }
}

/// User-facing padding options, for
/// [`Tokenizer::enable_padding`](crate::Tokenizer::enable_padding).
///
/// A `length` selects [`PaddingStrategy::Fixed`];
/// otherwise [`PaddingStrategy::BatchLongest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaddingOptions {
    /// The fixed target length, if any.
    pub length: Option<usize>,

    /// The side to pad.
    pub direction: PaddingDirection,

    /// Round the target up to a multiple of this.
    pub pad_to_multiple_of: Option<usize>,

    /// The pad token id.
    pub pad_id: TokenId,

    /// The pad type id.
    pub pad_type_id: u32,

    /// The pad token.
    pub pad_token: String,
}

impl Default for PaddingOptions {
    fn default() -> Self {
        Self {
            length: None,
            direction: PaddingDirection::default(),
            pad_to_multiple_of: None,
            pad_id: 0,
            pad_type_id: 0,
            pad_token: default_pad_token(),
        }
    }
}

impl PaddingOptions {
    /// Set a fixed length.
    pub fn with_length(
        mut self,
        length: usize,
    ) -> Self {
        self.length = Some(length);
        self
    }

    /// Set the direction.
    pub fn with_direction(
        mut self,
        direction: PaddingDirection,
    ) -> Self {
        self.direction = direction;
        self
    }

    /// Set the multiple to round up to.
    pub fn with_pad_to_multiple_of(
        mut self,
        multiple: usize,
    ) -> Self {
        self.pad_to_multiple_of = Some(multiple);
        self
    }

    /// Set the pad id.
    pub fn with_pad_id(
        mut self,
        pad_id: TokenId,
    ) -> Self {
        self.pad_id = pad_id;
        self
    }

    /// Set the pad type id.
    pub fn with_pad_type_id(
        mut self,
        pad_type_id: u32,
    ) -> Self {
        self.pad_type_id = pad_type_id;
        self
    }

    /// Set the pad token.
    pub fn with_pad_token<S: Into<String>>(
        mut self,
        pad_token: S,
    ) -> Self {
        self.pad_token = pad_token.into();
        self
    }

    /// Build validated [`PaddingParams`].
    pub fn to_params(&self) -> WPResult<PaddingParams> {
        let params = PaddingParams {
            strategy: self
                .length
                .map_or(PaddingStrategy::BatchLongest, PaddingStrategy::Fixed),
            direction: self.direction,
            pad_to_multiple_of: self.pad_to_multiple_of,
            pad_id: self.pad_id,
            pad_type_id: self.pad_type_id,
            pad_token: self.pad_token.clone(),
        };
        params.validate()?;
        Ok(params)
    }
}

/// Pad every encoding in a batch to the same length.
///
/// Overflow windows are padded to the same target.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(encodings)))]
pub fn pad_encodings(
    encodings: &mut [Encoding],
    params: &PaddingParams,
) {
    let Some(longest) = encodings.iter().map(Encoding::len).max() else {
        return;
    };
    let target = params.target_length(longest);

    batch_for_each_mut(encodings, |encoding| {
        encoding.pad(
            target,
            params.pad_id,
            params.pad_type_id,
            &params.pad_token,
            params.direction,
        )
    });
}
