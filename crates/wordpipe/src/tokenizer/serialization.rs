use std::{fs, path::Path, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    decoders::DecoderWrapper,
    errors::{WPResult, WordpipeError},
    models::ModelWrapper,
    normalizers::NormalizerWrapper,
    pre_tokenizers::PreTokenizerWrapper,
    processors::ProcessorWrapper,
    tokenizer::{DecodeOptions, Tokenizer},
    utils::{PaddingParams, TruncationParams},
    vocab::AddedVocab,
};

/// The serialization format version.
pub const SERIALIZATION_VERSION: &str = "1.0";

#[derive(Serialize)]
struct TokenizerRef<'t> {
    version: &'static str,
    truncation: &'t Option<TruncationParams>,
    padding: &'t Option<PaddingParams>,
    added_tokens: &'t AddedVocab,
    normalizer: &'t Option<NormalizerWrapper>,
    pre_tokenizer: &'t Option<PreTokenizerWrapper>,
    post_processor: &'t Option<ProcessorWrapper>,
    decoder: &'t Option<DecoderWrapper>,
    decode_options: &'t DecodeOptions,
    model: &'t ModelWrapper,
}

#[derive(Deserialize)]
struct TokenizerOwned {
    version: String,
    #[serde(default)]
    truncation: Option<TruncationParams>,
    #[serde(default)]
    padding: Option<PaddingParams>,
    #[serde(default)]
    added_tokens: AddedVocab,
    #[serde(default)]
    normalizer: Option<NormalizerWrapper>,
    #[serde(default)]
    pre_tokenizer: Option<PreTokenizerWrapper>,
    #[serde(default)]
    post_processor: Option<ProcessorWrapper>,
    #[serde(default)]
    decoder: Option<DecoderWrapper>,
    #[serde(default)]
    decode_options: DecodeOptions,
    model: ModelWrapper,
}

impl Serialize for Tokenizer {
    fn serialize<S>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        TokenizerRef {
            version: SERIALIZATION_VERSION,
            truncation: &self.truncation,
            padding: &self.padding,
            added_tokens: &self.added_vocab,
            normalizer: &self.normalizer,
            pre_tokenizer: &self.pre_tokenizer,
            post_processor: &self.post_processor,
            decoder: &self.decoder,
            decode_options: &self.decode_options,
            model: &self.model,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Tokenizer {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        let owned = TokenizerOwned::deserialize(deserializer)?;
        if owned.version != SERIALIZATION_VERSION {
            return Err(D::Error::custom(format!(
                "unsupported tokenizer version {:?}; expected {SERIALIZATION_VERSION:?}",
                owned.version
            )));
        }

        Tokenizer::builder(owned.model)
            .with_truncation(owned.truncation)
            .with_padding(owned.padding)
            .with_decode_options(owned.decode_options)
            .build()
            .map(|mut tokenizer| {
                tokenizer.added_vocab = owned.added_tokens;
                tokenizer.normalizer = owned.normalizer;
                tokenizer.pre_tokenizer = owned.pre_tokenizer;
                tokenizer.post_processor = owned.post_processor;
                tokenizer.decoder = owned.decoder;
                tokenizer
            })
            .map_err(D::Error::custom)
    }
}

impl Tokenizer {
    /// Serialize to a JSON document.
    ///
    /// ## Arguments
    /// * `pretty` - indent the output; this only changes layout.
    pub fn to_string(
        &self,
        pretty: bool,
    ) -> WPResult<String> {
        Ok(if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        })
    }

    /// Save as a JSON file.
    pub fn save<P: AsRef<Path>>(
        &self,
        path: P,
        pretty: bool,
    ) -> WPResult<()> {
        let path = path.as_ref();
        fs::write(path, self.to_string(pretty)?)?;
        log::debug!("saved tokenizer to {}", path.display());
        Ok(())
    }

    /// Load from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> WPResult<Self> {
        let path = path.as_ref();
        let tokenizer = Self::from_bytes(fs::read(path)?)?;
        log::debug!("loaded tokenizer from {}", path.display());
        Ok(tokenizer)
    }

    /// Load from JSON bytes.
    pub fn from_bytes<B: AsRef<[u8]>>(bytes: B) -> WPResult<Self> {
        Ok(serde_json::from_slice(bytes.as_ref())?)
    }
}

impl FromStr for Tokenizer {
    type Err = WordpipeError;

    fn from_str(s: &str) -> WPResult<Self> {
        Ok(serde_json::from_str(s)?)
    }
}
