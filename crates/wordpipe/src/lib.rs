//! # `wordpipe` Tokenization Pipeline
//!
//! `wordpipe` converts text to token ids, and token ids back to text,
//! through a configurable pipeline:
//!
//! ```text
//! added-token split -> normalize -> pre-tokenize -> model -> truncate -> post-process -> pad
//! ```
//!
//! See:
//! * [`Tokenizer`] for the pipeline itself, and [`TokenizerBuilder`] to assemble one.
//! * [`normalizers`], [`pre_tokenizers`], [`models`], [`processors`], and [`decoders`]
//!   for the built-in pipeline stages.
//! * [`Encoding`] for the aligned encode output.
//! * [`vocab`] for base and added vocabularies.
//! * [`pretrained`] to load serialized tokenizers by path or hub identifier.
//!
//! ## Crate Features
//!
//! #### feature: ``default``
//!
//! * ``ahash``
//! * ``client``
//! * ``rayon``
//!
//! #### feature: ``client``
//!
//! * ``download``
//!
//! The base set of features needed to load and run pre-trained tokenizers.
//!
//! #### feature: ``download``
//!
//! * ``wordpipe-disk-cache``
//!
//! The download feature enables downloading tokenizer files from a model hub,
//! through [`disk_cache::WordpipeDiskCache`].
//!
//! #### feature: ``ahash`` / ``foldhash``
//!
//! These swap all HashMap/HashSet implementations for ``ahash`` or ``foldhash``.
//! If both are enabled, ``ahash`` wins.
//!
//! This is done by the ``types::WPHash{*}`` type alias machinery.
//!
//! #### feature: ``rayon``
//!
//! This enables batch parallelism using the ``rayon`` crate.
//!
//! #### feature: ``tracing``
//!
//! This enables a number of ``tracing`` instrumentation points.
//! This is only useful for timing tracing of the library itself.
//!
//! ## Building a Tokenizer
//!
//! ```rust
//! use wordpipe::{
//!     Tokenizer,
//!     decoders::DecoderWrapper,
//!     models::WordPiece,
//!     normalizers::NormalizerWrapper,
//!     pre_tokenizers::PreTokenizerWrapper,
//!     processors::BertProcessing,
//!     vocab::{AddedToken, TokenVocab},
//! };
//!
//! let model = WordPiece::builder()
//!     .with_vocab(TokenVocab::from_tokens([
//!         "[PAD]", "[UNK]", "[CLS]", "[SEP]", "un", "##aff", "##able",
//!     ]))
//!     .with_unk_token("[UNK]")
//!     .build()?;
//!
//! let tokenizer = Tokenizer::builder(model)
//!     .with_normalizer(NormalizerWrapper::bert_uncased())
//!     .with_pre_tokenizer(PreTokenizerWrapper::BertPreTokenizer)
//!     .with_post_processor(BertProcessing::new(("[SEP]", 3), ("[CLS]", 2)))
//!     .with_decoder(DecoderWrapper::word_piece())
//!     .with_added_tokens([AddedToken::special("[CLS]"), AddedToken::special("[SEP]")])
//!     .build()?;
//!
//! let encoding = tokenizer.encode("Unaffable", true)?;
//! assert_eq!(encoding.tokens(), &["[CLS]", "un", "##aff", "##able", "[SEP]"]);
//! assert_eq!(tokenizer.decode(encoding.ids(), true), "unaffable");
//! # Ok::<(), wordpipe::WordpipeError>(())
//! ```
//!
//! ## Loading Pretrained Tokenizers
//!
//! ```rust,ignore
//! use wordpipe::Tokenizer;
//! use wordpipe::disk_cache::{WordpipeDiskCache, WordpipeDiskCacheOptions};
//!
//! let mut disk_cache = WordpipeDiskCache::new(WordpipeDiskCacheOptions::default())?;
//! let tokenizer = Tokenizer::from_pretrained("bert-base-uncased", &mut disk_cache)?;
//! ```
#![warn(missing_docs, unused)]

pub mod decoders;
pub mod encoding;
pub mod errors;
pub mod models;
pub mod normalizers;
pub mod pre_tokenizers;
pub mod pretrained;
pub mod processors;
pub mod tokenizer;
pub mod types;
pub mod utils;
pub mod vocab;

#[cfg(feature = "download")]
#[doc(inline)]
pub use wordpipe_disk_cache as disk_cache;

#[doc(inline)]
pub use encoding::Encoding;
#[doc(inline)]
pub use errors::{WPResult, WordpipeError};
#[doc(inline)]
pub use pretrained::ResourceLoader;
#[doc(inline)]
pub use tokenizer::{
    DecodeOptions,
    EncodeInput,
    InputSequence,
    Tokenizer,
    TokenizerBuilder,
    UnknownIdPolicy,
};
#[doc(inline)]
pub use types::TokenId;

#[doc = document_features::document_features!()]
#[cfg(doc)]
pub mod features {}
