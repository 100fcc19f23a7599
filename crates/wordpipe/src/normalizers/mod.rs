//! # Normalizers
//!
//! A [`Normalizer`] maps raw text to canonical text (casing, unicode forms,
//! accents) while keeping alignment to the original, via [`NormalizedString`].
//!
//! [`NormalizerWrapper`] is the serializable set of built-in normalizers.

mod normalized_string;

#[doc(inline)]
pub use normalized_string::NormalizedString;
use serde::{Deserialize, Serialize};

/// Normalizer capability.
pub trait Normalizer: Send + Sync {
    /// Normalize the text in place.
    fn normalize(
        &self,
        normalized: &mut NormalizedString,
    );
}

fn default_true() -> bool {
    true
}

/// The built-in normalizers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NormalizerWrapper {
    /// Lowercase every char.
    Lowercase,

    /// Trim whitespace.
    Strip {
        /// Trim the start.
        #[serde(default = "default_true")]
        left: bool,

        /// Trim the end.
        #[serde(default = "default_true")]
        right: bool,
    },

    /// Remove combining marks.
    StripAccents,

    /// Unicode NFD.
    Nfd,

    /// Unicode NFC.
    Nfc,

    /// Unicode NFKD.
    Nfkd,

    /// Unicode NFKC.
    Nfkc,

    /// Replace a literal pattern.
    Replace {
        /// The literal text to find.
        pattern: String,

        /// The replacement text.
        content: String,
    },

    /// Apply normalizers in order.
    Sequence {
        /// The normalizers.
        normalizers: Vec<NormalizerWrapper>,
    },
}

impl NormalizerWrapper {
    /// The ``BERT``-style uncased normalizer: NFD, strip accents, lowercase.
    pub fn bert_uncased() -> Self {
        NormalizerWrapper::Sequence {
            normalizers: vec![
                NormalizerWrapper::Nfd,
                NormalizerWrapper::StripAccents,
                NormalizerWrapper::Lowercase,
            ],
        }
    }
}

impl Normalizer for NormalizerWrapper {
    fn normalize(
        &self,
        normalized: &mut NormalizedString,
    ) {
        match self {
            NormalizerWrapper::Lowercase => normalized.lowercase(),
            NormalizerWrapper::Strip { left, right } => normalized.strip(*left, *right),
            NormalizerWrapper::StripAccents => normalized.strip_accents(),
            NormalizerWrapper::Nfd => normalized.nfd(),
            NormalizerWrapper::Nfc => normalized.nfc(),
            NormalizerWrapper::Nfkd => normalized.nfkd(),
            NormalizerWrapper::Nfkc => normalized.nfkc(),
            NormalizerWrapper::Replace { pattern, content } => {
                normalized.replace(pattern, content)
            }
            NormalizerWrapper::Sequence { normalizers } => {
                for normalizer in normalizers {
                    normalizer.normalize(normalized);
                }
            }
        }
    }
}
