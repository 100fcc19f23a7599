//! # BERT Post-Processor
//!
//! ``[CLS] A [SEP]`` for single inputs; ``[CLS] A [SEP] B [SEP]`` for pairs.
//! The separator closing `B` takes type id 1.

use serde::{Deserialize, Serialize};

use crate::{
    encoding::Encoding,
    errors::WPResult,
    processors::{PostProcessor, concat_sequences},
    types::TokenId,
};

/// BERT-style boundary tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BertProcessing {
    sep: (String, TokenId),
    cls: (String, TokenId),
}

impl BertProcessing {
    /// Build a new processor from ``(token, id)`` pairs.
    pub fn new<S: Into<String>, C: Into<String>>(
        sep: (S, TokenId),
        cls: (C, TokenId),
    ) -> Self {
        Self {
            sep: (sep.0.into(), sep.1),
            cls: (cls.0.into(), cls.1),
        }
    }

    fn sep(
        &self,
        type_id: u32,
    ) -> Encoding {
        Encoding::special(self.sep.1, self.sep.0.as_str(), type_id)
    }
}

impl PostProcessor for BertProcessing {
    fn added_tokens(
        &self,
        is_pair: bool,
    ) -> usize {
        if is_pair { 3 } else { 2 }
    }

    fn process(
        &self,
        mut encoding: Encoding,
        pair: Option<Encoding>,
        add_special_tokens: bool,
    ) -> WPResult<Encoding> {
        if !add_special_tokens {
            return Ok(concat_sequences(encoding, pair));
        }

        let mut result = Encoding::special(self.cls.1, self.cls.0.as_str(), 0);
        encoding.set_type_id(0);
        result.merge(encoding, Some(0));
        result.merge(self.sep(0), None);

        if let Some(mut pair) = pair {
            pair.set_type_id(1);
            result.merge(pair, Some(1));
            result.merge(self.sep(1), None);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Token;

    fn sample(
        base: u32,
        n: u32,
    ) -> Encoding {
        Encoding::from_tokens(
            (base..base + n).map(|i| (Token::new(i, format!("t{i}"), (0, 1)), Some(i - base))),
            0,
        )
    }

    #[test]
    fn test_single() {
        let bert = BertProcessing::new(("[SEP]", 2), ("[CLS]", 1));
        let encoding = bert.process(sample(10, 2), None, true).unwrap();
        assert_eq!(encoding.ids(), &[1, 10, 11, 2]);
        assert_eq!(encoding.tokens()[0], "[CLS]");
        assert_eq!(encoding.special_tokens_mask(), &[1, 0, 0, 1]);
        assert_eq!(encoding.word_ids(), &[None, Some(0), Some(1), None]);
        assert_eq!(encoding.len(), 2 + bert.added_tokens(false));
    }

    #[test]
    fn test_pair() {
        let bert = BertProcessing::new(("[SEP]", 2), ("[CLS]", 1));
        let encoding = bert
            .process(sample(10, 1), Some(sample(20, 2)), true)
            .unwrap();
        assert_eq!(encoding.ids(), &[1, 10, 2, 20, 21, 2]);
        assert_eq!(encoding.type_ids(), &[0, 0, 0, 1, 1, 1]);
        assert_eq!(encoding.sequence_range(1), Some(3..5));
        assert_eq!(encoding.len(), 3 + bert.added_tokens(true));
    }

    #[test]
    fn test_without_special_tokens() {
        let bert = BertProcessing::new(("[SEP]", 2), ("[CLS]", 1));
        let encoding = bert
            .process(sample(10, 1), Some(sample(20, 1)), false)
            .unwrap();
        assert_eq!(encoding.ids(), &[10, 20]);
        assert_eq!(encoding.type_ids(), &[0, 1]);
    }
}
