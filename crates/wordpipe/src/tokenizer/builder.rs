use crate::{
    decoders::DecoderWrapper,
    errors::WPResult,
    models::ModelWrapper,
    normalizers::NormalizerWrapper,
    pre_tokenizers::PreTokenizerWrapper,
    processors::ProcessorWrapper,
    tokenizer::{DecodeOptions, Tokenizer},
    utils::{PaddingParams, TruncationParams},
    vocab::AddedToken,
};

/// Builder for [`Tokenizer`].
#[derive(Debug, Clone)]
pub struct TokenizerBuilder {
    tokenizer: Tokenizer,
    added_tokens: Vec<AddedToken>,
}

impl TokenizerBuilder {
    /// Start building a tokenizer around `model`.
    pub fn new<M: Into<ModelWrapper>>(model: M) -> Self {
        Self {
            tokenizer: Tokenizer::new(model),
            added_tokens: Vec::new(),
        }
    }

    /// Set the normalizer.
    pub fn with_normalizer(
        mut self,
        normalizer: NormalizerWrapper,
    ) -> Self {
        self.tokenizer.normalizer = Some(normalizer);
        self
    }

    /// Set the pre-tokenizer.
    pub fn with_pre_tokenizer(
        mut self,
        pre_tokenizer: PreTokenizerWrapper,
    ) -> Self {
        self.tokenizer.pre_tokenizer = Some(pre_tokenizer);
        self
    }

    /// Set the post-processor.
    pub fn with_post_processor<P: Into<ProcessorWrapper>>(
        mut self,
        post_processor: P,
    ) -> Self {
        self.tokenizer.post_processor = Some(post_processor.into());
        self
    }

    /// Set the decoder.
    pub fn with_decoder(
        mut self,
        decoder: DecoderWrapper,
    ) -> Self {
        self.tokenizer.decoder = Some(decoder);
        self
    }

    /// Set the truncation params.
    pub fn with_truncation(
        mut self,
        truncation: Option<TruncationParams>,
    ) -> Self {
        self.tokenizer.truncation = truncation;
        self
    }

    /// Set the padding params.
    pub fn with_padding(
        mut self,
        padding: Option<PaddingParams>,
    ) -> Self {
        self.tokenizer.padding = padding;
        self
    }

    /// Set the default decode options.
    pub fn with_decode_options(
        mut self,
        options: DecodeOptions,
    ) -> Self {
        self.tokenizer.decode_options = options;
        self
    }

    /// Queue tokens to add; they are added, in order, at build time.
    pub fn with_added_tokens<I, T>(
        mut self,
        tokens: I,
    ) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<AddedToken>,
    {
        self.added_tokens
            .extend(tokens.into_iter().map(Into::into));
        self
    }

    /// Validate and build the tokenizer.
    ///
    /// ## Returns
    /// A `Configuration` error for invalid padding or truncation params;
    /// an `InvalidInput` error for an empty added token.
    pub fn build(self) -> WPResult<Tokenizer> {
        let mut tokenizer = self.tokenizer;
        if let Some(truncation) = &tokenizer.truncation {
            truncation.validate()?;
        }
        if let Some(padding) = &tokenizer.padding {
            padding.validate()?;
        }
        if !self.added_tokens.is_empty() {
            tokenizer.add_tokens(self.added_tokens)?;
        }
        Ok(tokenizer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::WordpipeError,
        models::WordLevel,
        utils::PaddingStrategy,
        vocab::TokenVocab,
    };

    fn model() -> WordLevel {
        WordLevel::builder()
            .with_vocab(TokenVocab::from_tokens(["a", "b"]))
            .build()
            .unwrap()
    }

    #[test]
    fn test_build() {
        let tokenizer = TokenizerBuilder::new(model())
            .with_normalizer(NormalizerWrapper::Lowercase)
            .with_decoder(DecoderWrapper::word_piece())
            .with_added_tokens([AddedToken::special("[PAD]"), "b".into()])
            .build()
            .unwrap();

        assert!(tokenizer.normalizer().is_some());
        assert_eq!(tokenizer.token_to_id("[PAD]"), Some(2));
        assert_eq!(tokenizer.token_to_id("b"), Some(1));
        assert!(tokenizer.vocabulary().is_special(2));
    }

    #[test]
    fn test_build_validates() {
        let err = TokenizerBuilder::new(model())
            .with_padding(Some(PaddingParams {
                strategy: PaddingStrategy::Fixed(0),
                ..Default::default()
            }))
            .build()
            .unwrap_err();
        assert!(matches!(err, WordpipeError::Configuration(_)));

        let err = TokenizerBuilder::new(model())
            .with_truncation(Some(TruncationParams {
                max_length: 2,
                stride: 2,
                direction: Default::default(),
                strategy: Default::default(),
            }))
            .build()
            .unwrap_err();
        assert!(matches!(err, WordpipeError::Configuration(_)));

        let err = TokenizerBuilder::new(model())
            .with_added_tokens([""])
            .build()
            .unwrap_err();
        assert!(matches!(err, WordpipeError::InvalidInput(_)));
    }
}
