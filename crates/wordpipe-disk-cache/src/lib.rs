//! # wordpipe-disk-cache
//!
//! On-disk cache for pretrained tokenizer files fetched from a model hub.
#![warn(missing_docs)]

use crate::path_resolver::PathResolver;

pub mod disk_cache;
pub mod path_resolver;
pub mod path_utils;

pub use disk_cache::{WordpipeDiskCache, WordpipeDiskCacheOptions};

/// Environment variable key to override the default cache directory.
pub const WORDPIPE_CACHE_DIR: &str = "WORDPIPE_CACHE_DIR";
/// Environment variable key to override the default data directory.
pub const WORDPIPE_DATA_DIR: &str = "WORDPIPE_DATA_DIR";

/// The default model hub.
pub const DEFAULT_HUB_ENDPOINT: &str = "https://huggingface.co";
/// The default hub revision.
pub const DEFAULT_REVISION: &str = "main";

/// Default [`PathResolver`] for wordpipe.
pub const WORDPIPE_CACHE_CONFIG: PathResolver = PathResolver {
    qualifier: "io.crates.wordpipe",
    organization: "",
    application: "wordpipe",
    cache_env_vars: &[WORDPIPE_CACHE_DIR],
    data_env_vars: &[WORDPIPE_DATA_DIR],
};
