use crate::{
    decoders::{Decoder, DecoderWrapper, clean_up_tokenization, join_tokens},
    encoding::Encoding,
    errors::WPResult,
    models::{ModelWrapper, SubwordModel},
    normalizers::{NormalizedString, Normalizer, NormalizerWrapper},
    pre_tokenizers::{PreTokenizer, PreTokenizerWrapper},
    processors::{PostProcessor, ProcessorWrapper, post_process},
    tokenizer::{DecodeOptions, EncodeInput, InputSequence, TokenizerBuilder, UnknownIdPolicy},
    types::{Offsets, TokenId, WPHashMap},
    utils::{
        PaddingOptions,
        PaddingParams,
        TruncationOptions,
        TruncationParams,
        padding::pad_encodings,
        parallel::batch_map,
        truncation::truncate_encodings,
    },
    vocab::{AddedSplit, AddedToken, AddedVocab, Vocabulary},
};

/// A text <-> token-id tokenizer.
///
/// Owns the model and every pipeline stage. All encode and decode
/// operations take `&self`; configuration changes take `&mut self`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tokenizer {
    pub(crate) model: ModelWrapper,
    pub(crate) added_vocab: AddedVocab,
    pub(crate) normalizer: Option<NormalizerWrapper>,
    pub(crate) pre_tokenizer: Option<PreTokenizerWrapper>,
    pub(crate) post_processor: Option<ProcessorWrapper>,
    pub(crate) decoder: Option<DecoderWrapper>,
    pub(crate) truncation: Option<TruncationParams>,
    pub(crate) padding: Option<PaddingParams>,
    pub(crate) decode_options: DecodeOptions,
}

impl Tokenizer {
    /// A tokenizer with only a model; every other stage is unset.
    pub fn new<M: Into<ModelWrapper>>(model: M) -> Self {
        Self {
            model: model.into(),
            added_vocab: AddedVocab::default(),
            normalizer: None,
            pre_tokenizer: None,
            post_processor: None,
            decoder: None,
            truncation: None,
            padding: None,
            decode_options: DecodeOptions::default(),
        }
    }

    /// Start building a tokenizer around `model`.
    pub fn builder<M: Into<ModelWrapper>>(model: M) -> TokenizerBuilder {
        TokenizerBuilder::new(model)
    }

    /// The subword model.
    pub fn model(&self) -> &ModelWrapper {
        &self.model
    }

    /// The normalizer, if any.
    pub fn normalizer(&self) -> Option<&NormalizerWrapper> {
        self.normalizer.as_ref()
    }

    /// The pre-tokenizer, if any.
    pub fn pre_tokenizer(&self) -> Option<&PreTokenizerWrapper> {
        self.pre_tokenizer.as_ref()
    }

    /// The post-processor, if any.
    pub fn post_processor(&self) -> Option<&ProcessorWrapper> {
        self.post_processor.as_ref()
    }

    /// The decoder, if any.
    pub fn decoder(&self) -> Option<&DecoderWrapper> {
        self.decoder.as_ref()
    }

    /// The added-token overlay.
    pub fn added_vocab(&self) -> &AddedVocab {
        &self.added_vocab
    }

    /// The combined vocabulary view.
    pub fn vocabulary(&self) -> Vocabulary<'_> {
        Vocabulary::new(self.model.vocab(), &self.added_vocab)
    }

    /// Clone the ``{ token -> id }`` map.
    pub fn vocab(
        &self,
        with_added_tokens: bool,
    ) -> WPHashMap<String, TokenId> {
        self.vocabulary().to_map(with_added_tokens)
    }

    /// The vocabulary size.
    ///
    /// ## Arguments
    /// * `with_added_tokens` - count added tokens which do not share a base id.
    pub fn vocab_size(
        &self,
        with_added_tokens: bool,
    ) -> usize {
        self.vocabulary().size(with_added_tokens)
    }

    /// Look up the id of a token; added tokens first.
    pub fn token_to_id(
        &self,
        token: &str,
    ) -> Option<TokenId> {
        self.vocabulary().token_to_id(token)
    }

    /// Look up the token of an id; added tokens first.
    pub fn id_to_token(
        &self,
        id: TokenId,
    ) -> Option<&str> {
        self.vocabulary().id_to_token(id)
    }

    /// Add tokens; see [`AddedVocab::add_tokens`].
    ///
    /// ## Returns
    /// The ids of the tokens, in input order.
    pub fn add_tokens<I, T>(
        &mut self,
        tokens: I,
    ) -> WPResult<Vec<TokenId>>
    where
        I: IntoIterator<Item = T>,
        T: Into<AddedToken>,
    {
        let tokens: Vec<AddedToken> = tokens.into_iter().map(Into::into).collect();
        let ids = self.added_vocab.add_tokens(&tokens, self.model.vocab())?;
        log::debug!("added {} tokens", tokens.len());
        Ok(ids)
    }

    /// Add tokens, marking every one special.
    pub fn add_special_tokens<I, T>(
        &mut self,
        tokens: I,
    ) -> WPResult<Vec<TokenId>>
    where
        I: IntoIterator<Item = T>,
        T: Into<AddedToken>,
    {
        self.add_tokens(tokens.into_iter().map(|t| {
            let mut token: AddedToken = t.into();
            token.special = true;
            token
        }))
    }

    /// The padding params, if enabled.
    pub fn padding(&self) -> Option<&PaddingParams> {
        self.padding.as_ref()
    }

    /// The truncation params, if enabled.
    pub fn truncation(&self) -> Option<&TruncationParams> {
        self.truncation.as_ref()
    }

    /// Enable batch padding.
    ///
    /// Options are validated before anything changes.
    pub fn enable_padding(
        &mut self,
        options: PaddingOptions,
    ) -> WPResult<()> {
        let params = options.to_params()?;
        log::debug!("padding enabled: {params:?}");
        self.padding = Some(params);
        Ok(())
    }

    /// Disable padding.
    pub fn no_padding(&mut self) {
        self.padding = None;
    }

    /// Enable truncation to `max_length` tokens, special tokens included.
    ///
    /// Options are validated before anything changes.
    pub fn enable_truncation(
        &mut self,
        max_length: usize,
        options: TruncationOptions,
    ) -> WPResult<()> {
        let params = options.to_params(max_length)?;
        log::debug!("truncation enabled: {params:?}");
        self.truncation = Some(params);
        Ok(())
    }

    /// Disable truncation.
    pub fn no_truncation(&mut self) {
        self.truncation = None;
    }

    /// The default decode options.
    pub fn decode_options(&self) -> &DecodeOptions {
        &self.decode_options
    }

    /// Replace the default decode options.
    pub fn set_decode_options(
        &mut self,
        options: DecodeOptions,
    ) {
        self.decode_options = options;
    }

    fn processor(&self) -> Option<&dyn PostProcessor> {
        self.post_processor
            .as_ref()
            .map(|p| p as &dyn PostProcessor)
    }

    /// Encode one input (single or pair).
    ///
    /// Truncation applies; padding does not (see [`encode_batch`](Self::encode_batch)).
    ///
    /// ## Arguments
    /// * `input` - text, pre-tokenized chunks, or a pair of either.
    /// * `add_special_tokens` - let the post-processor add boundary tokens.
    pub fn encode<'s, E>(
        &self,
        input: E,
        add_special_tokens: bool,
    ) -> WPResult<Encoding>
    where
        E: Into<EncodeInput<'s>>,
    {
        self.encode_input(&input.into(), add_special_tokens)
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, input)))]
    fn encode_input(
        &self,
        input: &EncodeInput<'_>,
        add_special_tokens: bool,
    ) -> WPResult<Encoding> {
        let (first, second) = match input {
            EncodeInput::Single(first) => (first, None),
            EncodeInput::Pair(first, second) => (first, Some(second)),
        };

        let encoding = self.encode_sequence(first, 0)?;
        let pair = second
            .map(|second| self.encode_sequence(second, 1))
            .transpose()?;

        let (encoding, pair) = match &self.truncation {
            Some(params) => {
                let added = match self.processor() {
                    Some(processor) if add_special_tokens => {
                        processor.added_tokens(pair.is_some())
                    }
                    _ => 0,
                };
                truncate_encodings(encoding, pair, params, added)?
            }
            None => (encoding, pair),
        };

        post_process(self.processor(), encoding, pair, add_special_tokens)
    }

    /// Encode one sequence, before truncation and post-processing.
    fn encode_sequence(
        &self,
        sequence: &InputSequence<'_>,
        type_id: u32,
    ) -> WPResult<Encoding> {
        let mut encoding = Encoding::default();
        match sequence {
            InputSequence::Raw(text) => {
                let mut word = 0;
                for split in self.added_vocab.split(text) {
                    match split {
                        AddedSplit::Added { id, range } => {
                            self.push_added(
                                &mut encoding,
                                id,
                                word,
                                (range.start, range.end),
                                type_id,
                            );
                            word += 1;
                        }
                        AddedSplit::Text(range) => {
                            word = self.encode_text(
                                &mut encoding,
                                &text[range.clone()],
                                range.start,
                                word,
                                type_id,
                            )?;
                        }
                    }
                }
            }
            InputSequence::PreTokenized(chunks) => {
                for (word, chunk) in chunks.iter().enumerate() {
                    let word = word as u32;
                    if let Some(id) = self.added_vocab.token_to_id(chunk) {
                        self.push_added(&mut encoding, id, word, (0, chunk.len()), type_id);
                        continue;
                    }
                    for token in self.model.tokenize(chunk)? {
                        encoding.push(
                            token.id,
                            token.value,
                            Some(word),
                            token.offsets,
                            type_id,
                            0,
                            1,
                        );
                    }
                }
            }
        }
        Ok(encoding)
    }

    fn push_added(
        &self,
        encoding: &mut Encoding,
        id: TokenId,
        word: u32,
        offsets: Offsets,
        type_id: u32,
    ) {
        let token = self.added_vocab.id_to_token(id).unwrap_or_default();
        let special = u32::from(self.added_vocab.is_special(id));
        encoding.push(
            id,
            token.to_string(),
            Some(word),
            offsets,
            type_id,
            special,
            1,
        );
    }

    /// Normalize, pre-tokenize and model-encode a stretch of raw text.
    ///
    /// ## Arguments
    /// * `base` - the byte offset of `text` in the full input.
    /// * `word` - the next word index.
    ///
    /// ## Returns
    /// The next word index.
    fn encode_text(
        &self,
        encoding: &mut Encoding,
        text: &str,
        base: usize,
        mut word: u32,
        type_id: u32,
    ) -> WPResult<u32> {
        let mut normalized = NormalizedString::new(text);
        if let Some(normalizer) = &self.normalizer {
            normalizer.normalize(&mut normalized);
        }

        let chunks = match &self.pre_tokenizer {
            Some(pre_tokenizer) => pre_tokenizer.split(normalized.normalized()),
            None => vec![0..normalized.len()],
        };

        for chunk in chunks.into_iter().filter(|c| !c.is_empty()) {
            for token in self.model.tokenize(&normalized.normalized()[chunk.clone()])? {
                let (start, end) = normalized.offsets_to_original(
                    chunk.start + token.offsets.0..chunk.start + token.offsets.1,
                );
                encoding.push(
                    token.id,
                    token.value,
                    Some(word),
                    (base + start, base + end),
                    type_id,
                    0,
                    1,
                );
            }
            word += 1;
        }
        Ok(word)
    }

    /// Encode a batch; items run in parallel, then the batch is padded.
    ///
    /// ## Returns
    /// The encodings in input order; or the first error, in input order.
    pub fn encode_batch<'s, E>(
        &self,
        inputs: Vec<E>,
        add_special_tokens: bool,
    ) -> WPResult<Vec<Encoding>>
    where
        E: Into<EncodeInput<'s>>,
    {
        let inputs: Vec<EncodeInput<'s>> = inputs.into_iter().map(Into::into).collect();
        let mut encodings = batch_map(&inputs, |input| {
            self.encode_input(input, add_special_tokens)
        })
        .into_iter()
        .collect::<WPResult<Vec<_>>>()?;

        if let Some(params) = &self.padding {
            pad_encodings(&mut encodings, params);
        }
        Ok(encodings)
    }

    /// Encode a batch, keeping per-item results.
    ///
    /// The successful items are padded together.
    pub fn encode_batch_partial<'s, E>(
        &self,
        inputs: Vec<E>,
        add_special_tokens: bool,
    ) -> Vec<WPResult<Encoding>>
    where
        E: Into<EncodeInput<'s>>,
    {
        let inputs: Vec<EncodeInput<'s>> = inputs.into_iter().map(Into::into).collect();
        let mut results = batch_map(&inputs, |input| {
            self.encode_input(input, add_special_tokens)
        });

        if let Some(params) = &self.padding {
            let mut encodings: Vec<Encoding> = results
                .iter_mut()
                .filter_map(|r| r.as_mut().ok().map(core::mem::take))
                .collect();
            pad_encodings(&mut encodings, params);

            let mut padded = encodings.into_iter();
            for encoding in results.iter_mut().filter_map(|r| r.as_mut().ok()) {
                if let Some(p) = padded.next() {
                    *encoding = p;
                }
            }
        }
        results
    }

    /// Decode ids to text, with the default decode options.
    ///
    /// ## Arguments
    /// * `skip_special_tokens` - drop special tokens.
    pub fn decode(
        &self,
        ids: &[TokenId],
        skip_special_tokens: bool,
    ) -> String {
        let options = self
            .decode_options
            .with_skip_special_tokens(skip_special_tokens);
        self.decode_with_options(ids, &options)
    }

    /// Decode ids to text.
    ///
    /// Decoding never fails: unknown ids follow `options.unknown_ids`.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, ids)))]
    pub fn decode_with_options(
        &self,
        ids: &[TokenId],
        options: &DecodeOptions,
    ) -> String {
        let vocab = self.vocabulary();
        let mut tokens = Vec::with_capacity(ids.len());
        for &id in ids {
            match vocab.id_to_token(id) {
                Some(_) if options.skip_special_tokens && vocab.is_special(id) => {}
                Some(token) => tokens.push(token.to_string()),
                None => match (options.unknown_ids, self.model.unk_token()) {
                    (UnknownIdPolicy::Placeholder, Some(unk)) => tokens.push(unk.to_string()),
                    _ => log::debug!("dropping unknown id {id}"),
                },
            }
        }

        let text = match &self.decoder {
            Some(decoder) => decoder.decode(tokens),
            None => join_tokens(&tokens),
        };
        if options.clean_up_tokenization_spaces {
            clean_up_tokenization(&text)
        } else {
            text
        }
    }

    /// Decode a batch of id sequences, in parallel.
    pub fn decode_batch<S>(
        &self,
        sequences: &[S],
        skip_special_tokens: bool,
    ) -> Vec<String>
    where
        S: AsRef<[TokenId]> + Sync,
    {
        batch_map(sequences, |ids| {
            self.decode(ids.as_ref(), skip_special_tokens)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::WordpipeError,
        models::{WordLevel, WordPiece},
        processors::BertProcessing,
        types::{check_is_send, check_is_sync},
        utils::PaddingDirection,
        vocab::TokenVocab,
    };

    fn word_level() -> Tokenizer {
        let model = WordLevel::builder()
            .with_vocab(TokenVocab::from_tokens([
                "hello", "world", ",", ".", "[UNK]", "[CLS]", "[SEP]",
            ]))
            .with_unk_token("[UNK]")
            .build()
            .unwrap();
        Tokenizer::builder(model)
            .with_pre_tokenizer(PreTokenizerWrapper::Whitespace)
            .build()
            .unwrap()
    }

    #[test]
    fn test_send_sync() {
        let tokenizer = word_level();
        check_is_send(&tokenizer);
        check_is_sync(&tokenizer);
    }

    #[test]
    fn test_encode_raw() {
        let encoding = word_level().encode("hello, world.", false).unwrap();
        assert_eq!(encoding.ids(), &[0, 2, 1, 3]);
        assert_eq!(encoding.offsets(), &[(0, 5), (5, 6), (7, 12), (12, 13)]);
        assert_eq!(
            encoding.word_ids(),
            &[Some(0), Some(1), Some(2), Some(3)]
        );

        let encoding = word_level().encode("hello mars", false).unwrap();
        assert_eq!(encoding.ids(), &[0, 4]);
        assert_eq!(encoding.tokens()[1], "[UNK]");
    }

    #[test]
    fn test_encode_pretokenized() {
        let tokenizer = word_level();
        let encoding = tokenizer
            .encode(vec!["hello", ",", "world", "."], false)
            .unwrap();
        assert_eq!(encoding.ids(), &[0, 2, 1, 3]);
        assert_eq!(encoding.offsets()[2], (0, 5));
        assert_eq!(encoding.word_ids()[2], Some(2));

        assert_eq!(tokenizer.decode(encoding.ids(), false), "hello, world.");
    }

    #[test]
    fn test_added_tokens_bypass_pipeline() {
        let mut tokenizer = word_level();
        let ids = tokenizer.add_special_tokens(["<eos>"]).unwrap();
        assert_eq!(ids, vec![7]);

        let encoding = tokenizer.encode("hello<eos>world", false).unwrap();
        assert_eq!(encoding.ids(), &[0, 7, 1]);
        assert_eq!(encoding.offsets()[1], (5, 10));
        assert_eq!(encoding.offsets()[2], (10, 15));
        assert_eq!(encoding.special_tokens_mask(), &[0, 1, 0]);

        assert_eq!(tokenizer.decode(encoding.ids(), true), "hello world");
        assert_eq!(tokenizer.decode(encoding.ids(), false), "hello <eos> world");
    }

    #[test]
    fn test_vocab_sizes() {
        let mut tokenizer = word_level();
        assert_eq!(tokenizer.vocab_size(true), 7);

        tokenizer.add_tokens(["mars", "hello"]).unwrap();
        assert_eq!(tokenizer.vocab_size(false), 7);
        assert_eq!(tokenizer.vocab_size(true), 8);
        assert_eq!(tokenizer.vocab(true).len(), 8);
        assert_eq!(tokenizer.token_to_id("mars"), Some(7));
        assert_eq!(tokenizer.id_to_token(7), Some("mars"));
        assert_eq!(tokenizer.id_to_token(100), None);
    }

    #[test]
    fn test_post_processing_and_truncation() {
        let mut tokenizer = word_level();
        tokenizer.post_processor = Some(BertProcessing::new(("[SEP]", 6), ("[CLS]", 5)).into());
        tokenizer
            .enable_truncation(4, TruncationOptions::default())
            .unwrap();

        let encoding = tokenizer.encode("hello world hello", true).unwrap();
        assert_eq!(encoding.ids(), &[5, 0, 1, 6]);
        assert_eq!(encoding.overflowing()[0].ids(), &[5, 0, 6]);

        let encoding = tokenizer.encode("hello world hello", false).unwrap();
        assert_eq!(encoding.ids(), &[0, 1, 0]);
    }

    #[test]
    fn test_encode_batch() {
        let mut tokenizer = word_level();
        tokenizer
            .enable_padding(
                PaddingOptions::default()
                    .with_pad_id(4)
                    .with_direction(PaddingDirection::Left),
            )
            .unwrap();

        let encodings = tokenizer
            .encode_batch(vec!["hello", "hello world ."], false)
            .unwrap();
        assert_eq!(encodings[0].ids(), &[4, 4, 0]);
        assert_eq!(encodings[1].ids(), &[0, 1, 3]);

        // A single encode is never padded.
        assert_eq!(tokenizer.encode("hello", false).unwrap().len(), 1);
    }

    #[test]
    fn test_encode_batch_fail_fast_and_partial() {
        let model = WordPiece::builder()
            .with_vocab(TokenVocab::from_tokens(["a", "##b"]))
            .build()
            .unwrap();
        let tokenizer = Tokenizer::new(model);

        let err = tokenizer
            .encode_batch(vec!["ab", "zz", "qq"], false)
            .unwrap_err();
        assert!(matches!(err, WordpipeError::UnknownToken { token } if token == "zz"));

        let results = tokenizer.encode_batch_partial(vec!["ab", "zz"], false);
        assert_eq!(results[0].as_ref().unwrap().ids(), &[0, 1]);
        assert!(results[1].is_err());
    }

    #[test]
    fn test_decode_unknown_ids() {
        let tokenizer = word_level();
        assert_eq!(tokenizer.decode(&[0, 99, 1], false), "hello [UNK] world");

        let options = DecodeOptions::default().with_unknown_ids(UnknownIdPolicy::Drop);
        assert_eq!(
            tokenizer.decode_with_options(&[0, 99, 1], &options),
            "hello world"
        );

        let bare = Tokenizer::new(
            WordLevel::builder()
                .with_vocab(TokenVocab::from_tokens(["a"]))
                .build()
                .unwrap(),
        );
        assert_eq!(bare.decode(&[0, 5, 0], false), "a a");
    }

    #[test]
    fn test_decode_batch() {
        let tokenizer = word_level();
        let texts = tokenizer.decode_batch(&[vec![0, 2, 1], vec![1, 3]], false);
        assert_eq!(texts, vec!["hello, world".to_string(), "world.".to_string()]);

        let raw = tokenizer.decode_with_options(
            &[1, 3],
            &DecodeOptions::default().with_clean_up_tokenization_spaces(false),
        );
        assert_eq!(raw, "world .");
    }
}
