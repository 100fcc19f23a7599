//! # Post-Processors
//!
//! A [`PostProcessor`] merges the encodings of an input's sequences
//! (one, or a pair) and inserts boundary special tokens.
//!
//! Without a processor, sequences are concatenated with type ids 0 / 1.

pub mod bert;
pub mod template;

#[doc(inline)]
pub use bert::BertProcessing;
use serde::{Deserialize, Serialize};
#[doc(inline)]
pub use template::{Piece, Sequence, SpecialToken, TemplateProcessing, TemplateProcessingBuilder};

use crate::{encoding::Encoding, errors::WPResult};

/// Post-processor capability.
pub trait PostProcessor: Send + Sync {
    /// The number of special tokens [`process`](Self::process) adds.
    fn added_tokens(
        &self,
        is_pair: bool,
    ) -> usize;

    /// Merge the sequences of one input.
    ///
    /// When `add_special_tokens` is false, no boundary tokens are added
    /// and type ids mark sequence membership.
    fn process(
        &self,
        encoding: Encoding,
        pair: Option<Encoding>,
        add_special_tokens: bool,
    ) -> WPResult<Encoding>;
}

/// Plain concatenation: the first sequence with type id 0, the second with 1.
pub fn concat_sequences(
    mut encoding: Encoding,
    pair: Option<Encoding>,
) -> Encoding {
    encoding.set_type_id(0);
    let mut result = Encoding::default();
    result.merge(encoding, Some(0));
    if let Some(mut pair) = pair {
        pair.set_type_id(1);
        result.merge(pair, Some(1));
    }
    result
}

/// Post-process an input, pairing overflow windows too.
///
/// Each overflow window of the first sequence is processed with the
/// (truncated) second sequence, and vice versa; the results become the
/// overflow windows of the returned encoding.
pub(crate) fn post_process(
    processor: Option<&dyn PostProcessor>,
    mut encoding: Encoding,
    mut pair: Option<Encoding>,
    add_special_tokens: bool,
) -> WPResult<Encoding> {
    let process = |a: Encoding, b: Option<Encoding>| match processor {
        Some(processor) => processor.process(a, b, add_special_tokens),
        None => Ok(concat_sequences(a, b)),
    };

    let first_overflow = encoding.take_overflowing();
    let second_overflow = pair
        .as_mut()
        .map(Encoding::take_overflowing)
        .unwrap_or_default();

    let mut overflowing = Vec::with_capacity(first_overflow.len() + second_overflow.len());
    for window in first_overflow {
        overflowing.push(process(window, pair.clone())?);
    }
    for window in second_overflow {
        overflowing.push(process(encoding.clone(), Some(window))?);
    }

    let mut result = process(encoding, pair)?;
    result.set_overflowing(overflowing);
    Ok(result)
}

/// The built-in post-processors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProcessorWrapper {
    /// See [`TemplateProcessing`].
    TemplateProcessing(TemplateProcessing),

    /// See [`BertProcessing`].
    BertProcessing(BertProcessing),
}

impl From<TemplateProcessing> for ProcessorWrapper {
    fn from(processor: TemplateProcessing) -> Self {
        ProcessorWrapper::TemplateProcessing(processor)
    }
}

impl From<BertProcessing> for ProcessorWrapper {
    fn from(processor: BertProcessing) -> Self {
        ProcessorWrapper::BertProcessing(processor)
    }
}

impl PostProcessor for ProcessorWrapper {
    fn added_tokens(
        &self,
        is_pair: bool,
    ) -> usize {
        match self {
            ProcessorWrapper::TemplateProcessing(p) => p.added_tokens(is_pair),
            ProcessorWrapper::BertProcessing(p) => p.added_tokens(is_pair),
        }
    }

    fn process(
        &self,
        encoding: Encoding,
        pair: Option<Encoding>,
        add_special_tokens: bool,
    ) -> WPResult<Encoding> {
        match self {
            ProcessorWrapper::TemplateProcessing(p) => {
                p.process(encoding, pair, add_special_tokens)
            }
            ProcessorWrapper::BertProcessing(p) => p.process(encoding, pair, add_special_tokens),
        }
    }
}
