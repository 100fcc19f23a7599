use serde::{Deserialize, Serialize};

/// What decoding does with ids missing from the vocabulary.
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
pub enum UnknownIdPolicy {
    /// Render the model's unknown token; drop the id if there is none.
    #[default]
    Placeholder,

    /// Drop the id.
    Drop,
}

fn default_true() -> bool {
    true
}

/// Options for [`Tokenizer::decode_with_options`](crate::Tokenizer::decode_with_options).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeOptions {
    /// Drop special tokens.
    #[serde(default = "default_true")]
    pub skip_special_tokens: bool,

    /// Apply the [`clean_up_tokenization`](crate::decoders::clean_up_tokenization) pass.
    #[serde(default = "default_true")]
    pub clean_up_tokenization_spaces: bool,

    /// The unknown id policy.
    #[serde(default)]
    pub unknown_ids: UnknownIdPolicy,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            skip_special_tokens: true,
            clean_up_tokenization_spaces: true,
            unknown_ids: UnknownIdPolicy::default(),
        }
    }
}

impl DecodeOptions {
    /// Set `skip_special_tokens`.
    pub fn with_skip_special_tokens(
        mut self,
        skip: bool,
    ) -> Self {
        self.skip_special_tokens = skip;
        self
    }

    /// Set `clean_up_tokenization_spaces`.
    pub fn with_clean_up_tokenization_spaces(
        mut self,
        clean_up: bool,
    ) -> Self {
        self.clean_up_tokenization_spaces = clean_up;
        self
    }

    /// Set the unknown id policy.
    pub fn with_unknown_ids(
        mut self,
        policy: UnknownIdPolicy,
    ) -> Self {
        self.unknown_ids = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = DecodeOptions::default();
        assert!(options.skip_special_tokens);
        assert!(options.clean_up_tokenization_spaces);
        assert_eq!(options.unknown_ids, UnknownIdPolicy::Placeholder);

        let restored: DecodeOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(restored, options);

        assert_eq!("drop".parse::<UnknownIdPolicy>().unwrap(), UnknownIdPolicy::Drop);
    }
}
