//! # Truncation
//!
//! Truncation runs per input, before post-processing, against a budget of
//! ``max_length`` minus the special tokens the post-processor will add.
//! Removed tokens become overflow windows.

use serde::{Deserialize, Serialize};

use crate::{
    encoding::Encoding,
    errors::{WPResult, WordpipeError},
};

/// Which end of a sequence loses tokens.
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
pub enum TruncationDirection {
    /// Remove from the start; keep the tail.
    Left,

    /// Remove from the end; keep the head.
    #[default]
    Right,
}

/// How the removal is split across a pair.
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
pub enum TruncationStrategy {
    /// Remove one token at a time from the longer sequence;
    /// the first sequence yields on ties.
    #[default]
    LongestFirst,

    /// Only truncate the first sequence.
    OnlyFirst,

    /// Only truncate the second sequence; requires a pair.
    OnlySecond,
}

/// Validated truncation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruncationParams {
    /// The direction to truncate from.
    #[serde(default)]
    pub direction: TruncationDirection,

    /// The maximum encoding length, special tokens included.
    pub max_length: usize,

    /// The pair strategy.
    #[serde(default)]
    pub strategy: TruncationStrategy,

    /// Tokens repeated between consecutive overflow windows.
    #[serde(default)]
    pub stride: usize,
}

impl TruncationParams {
    /// Check the params.
    ///
    /// ## Returns
    /// A `Configuration` error if `max_length` is zero,
    /// or if `stride >= max_length`.
    pub fn validate(&self) -> WPResult<()> {
        if self.max_length == 0 {
            return Err(WordpipeError::Configuration(
                "truncation max_length must be positive".to_string(),
            ));
        }
        if self.stride >= self.max_length {
            return Err(WordpipeError::Configuration(format!(
                "truncation stride ({}) must be less than max_length ({})",
                self.stride, self.max_length
            )));
        }
        Ok(())
    }
}

/// User-facing truncation options; combined with a length by
/// [`Tokenizer::enable_truncation`](crate::Tokenizer::enable_truncation).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TruncationOptions {
    /// The pair strategy.
    pub strategy: TruncationStrategy,

    /// Tokens repeated between consecutive overflow windows.
    pub stride: usize,

    /// The direction to truncate from.
    pub direction: TruncationDirection,
}

impl TruncationOptions {
    /// Set the strategy.
    pub fn with_strategy(
        mut self,
        strategy: TruncationStrategy,
    ) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the stride.
    pub fn with_stride(
        mut self,
        stride: usize,
    ) -> Self {
        self.stride = stride;
        self
    }

    /// Set the direction.
    pub fn with_direction(
        mut self,
        direction: TruncationDirection,
    ) -> Self {
        self.direction = direction;
        self
    }

    /// Build validated [`TruncationParams`].
    pub fn to_params(
        &self,
        max_length: usize,
    ) -> WPResult<TruncationParams> {
        let params = TruncationParams {
            direction: self.direction,
            max_length,
            strategy: self.strategy,
            stride: self.stride,
        };
        params.validate()?;
        Ok(params)
    }
}

/// Truncate an input (single or pair) to fit its budget.
///
/// ## Arguments
/// * `encoding` - the first sequence.
/// * `pair` - the optional second sequence.
/// * `params` - the truncation params.
/// * `added_tokens` - the number of special tokens post-processing will add.
///
/// ## Returns
/// The truncated sequences, with overflow windows attached to each.
pub fn truncate_encodings(
    mut encoding: Encoding,
    mut pair: Option<Encoding>,
    params: &TruncationParams,
    added_tokens: usize,
) -> WPResult<(Encoding, Option<Encoding>)> {
    let budget = params.max_length.saturating_sub(added_tokens);
    let total = encoding.len() + pair.as_ref().map_or(0, Encoding::len);
    if total <= budget {
        return Ok((encoding, pair));
    }
    let to_remove = total - budget;
    let (stride, direction) = (params.stride, params.direction);

    match (params.strategy, pair.as_mut()) {
        (TruncationStrategy::LongestFirst, Some(second)) => {
            let (mut n1, mut n2) = (encoding.len(), second.len());
            for _ in 0..to_remove {
                if n1 >= n2 {
                    n1 -= 1;
                } else {
                    n2 -= 1;
                }
            }
            encoding.truncate(n1, stride, direction)?;
            second.truncate(n2, stride, direction)?;
        }
        (TruncationStrategy::LongestFirst | TruncationStrategy::OnlyFirst, None) => {
            encoding.truncate(budget, stride, direction)?;
        }
        (TruncationStrategy::OnlyFirst, Some(_)) => {
            truncate_one(&mut encoding, to_remove, stride, direction, "first")?;
        }
        (TruncationStrategy::OnlySecond, Some(second)) => {
            truncate_one(second, to_remove, stride, direction, "second")?;
        }
        (TruncationStrategy::OnlySecond, None) => {
            return Err(WordpipeError::InvalidInput(
                "truncation strategy only_second requires a pair input".to_string(),
            ));
        }
    }

    Ok((encoding, pair))
}

fn truncate_one(
    encoding: &mut Encoding,
    to_remove: usize,
    stride: usize,
    direction: TruncationDirection,
    which: &str,
) -> WPResult<()> {
    if encoding.len() <= to_remove {
        return Err(WordpipeError::InvalidInput(format!(
            "the {which} sequence ({} tokens) is too short to remove {to_remove} tokens",
            encoding.len()
        )));
    }
    encoding.truncate(encoding.len() - to_remove, stride, direction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Token;

    fn sample(n: u32) -> Encoding {
        Encoding::from_tokens(
            (0..n).map(|i| (Token::new(i, format!("t{i}"), (0, 1)), Some(i))),
            0,
        )
    }

    fn params(
        max_length: usize,
        strategy: TruncationStrategy,
    ) -> TruncationParams {
        TruncationOptions::default()
            .with_strategy(strategy)
            .to_params(max_length)
            .unwrap()
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(
            "longest_first".parse::<TruncationStrategy>().unwrap(),
            TruncationStrategy::LongestFirst
        );
        assert_eq!(
            "only_second".parse::<TruncationStrategy>().unwrap(),
            TruncationStrategy::OnlySecond
        );
        assert_eq!(
            "left".parse::<TruncationDirection>().unwrap(),
            TruncationDirection::Left
        );
        let err: WordpipeError = "sideways"
            .parse::<TruncationDirection>()
            .unwrap_err()
            .into();
        assert!(matches!(err, WordpipeError::Configuration(_)));
    }

    #[test]
    fn test_validate() {
        assert!(TruncationOptions::default().to_params(0).is_err());
        assert!(
            TruncationOptions::default()
                .with_stride(4)
                .to_params(4)
                .is_err()
        );
        assert!(
            TruncationOptions::default()
                .with_stride(3)
                .to_params(4)
                .is_ok()
        );
    }

    #[test]
    fn test_single_budget_accounts_for_added_tokens() {
        let (a, _) = truncate_encodings(
            sample(10),
            None,
            &params(6, TruncationStrategy::LongestFirst),
            2,
        )
        .unwrap();
        assert_eq!(a.len(), 4);
        assert_eq!(a.overflowing().len(), 2);
    }

    #[test]
    fn test_longest_first_tie_break() {
        // Equal lengths: the first sequence yields first.
        let (a, b) = truncate_encodings(
            sample(3),
            Some(sample(3)),
            &params(5, TruncationStrategy::LongestFirst),
            0,
        )
        .unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(b.map(|b| b.len()), Some(3));

        let (a, b) = truncate_encodings(
            sample(2),
            Some(sample(6)),
            &params(5, TruncationStrategy::LongestFirst),
            0,
        )
        .unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(b.map(|b| b.len()), Some(3));
    }

    #[test]
    fn test_only_strategies() {
        let (a, b) = truncate_encodings(
            sample(4),
            Some(sample(4)),
            &params(6, TruncationStrategy::OnlySecond),
            0,
        )
        .unwrap();
        assert_eq!((a.len(), b.map(|b| b.len())), (4, Some(2)));

        let err = truncate_encodings(
            sample(2),
            Some(sample(4)),
            &params(3, TruncationStrategy::OnlyFirst),
            0,
        )
        .unwrap_err();
        assert!(matches!(err, WordpipeError::InvalidInput(_)));

        let err = truncate_encodings(
            sample(8),
            None,
            &params(3, TruncationStrategy::OnlySecond),
            0,
        )
        .unwrap_err();
        assert!(matches!(err, WordpipeError::InvalidInput(_)));
    }

    #[test]
    fn test_stride_too_large_for_pair_share() {
        let params = TruncationOptions::default()
            .with_stride(3)
            .to_params(6)
            .unwrap();
        let err = truncate_encodings(sample(4), Some(sample(4)), &params, 0).unwrap_err();
        assert!(matches!(err, WordpipeError::InvalidInput(_)));
    }
}
