//! # Tokenizer Pipeline
//!
//! [`Tokenizer`] runs the full pipeline:
//!
//! ```text
//! added-token split -> normalize -> pre-tokenize -> model -> truncate -> post-process -> pad (batch)
//! ```
//!
//! and its inverse for decoding.

mod builder;
mod decode_options;
mod encode_input;
mod serialization;
mod tokenizer_impl;

#[doc(inline)]
pub use builder::*;
#[doc(inline)]
pub use decode_options::*;
#[doc(inline)]
pub use encode_input::*;
#[doc(inline)]
pub use serialization::*;
#[doc(inline)]
pub use tokenizer_impl::*;
