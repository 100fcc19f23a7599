//! # Utilities
//!
//! Padding and truncation of [`Encoding`](crate::Encoding)s,
//! and the batch parallelism helpers.

pub mod padding;
pub mod parallel;
pub mod truncation;

#[doc(inline)]
pub use padding::{PaddingDirection, PaddingOptions, PaddingParams, PaddingStrategy};
#[doc(inline)]
pub use truncation::{
    TruncationDirection,
    TruncationOptions,
    TruncationParams,
    TruncationStrategy,
};
