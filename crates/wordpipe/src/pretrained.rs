//! # Pretrained Tokenizers
//!
//! [`Tokenizer::from_pretrained`] resolves an identifier to a serialized
//! tokenizer file, and loads it:
//!
//! 1. an existing file path is loaded directly;
//! 2. an existing directory is searched for [`TOKENIZER_FILE`];
//! 3. anything else is handed to a [`ResourceLoader`].
//!
//! With the ``download`` feature, [`crate::disk_cache::WordpipeDiskCache`]
//! is a [`ResourceLoader`] which fetches files from a model hub.

use std::path::{Path, PathBuf};

use crate::{
    errors::{WPResult, WordpipeError},
    tokenizer::Tokenizer,
};

/// The file name of a serialized tokenizer inside a model repository.
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// A trait for loading resources.
pub trait ResourceLoader {
    /// Resolve `file` from the repository `identifier` to a local path.
    fn load_resource_path(
        &mut self,
        identifier: &str,
        file: &str,
    ) -> WPResult<PathBuf>;
}

#[cfg(feature = "download")]
impl ResourceLoader for crate::disk_cache::WordpipeDiskCache {
    fn load_resource_path(
        &mut self,
        identifier: &str,
        file: &str,
    ) -> WPResult<PathBuf> {
        self.load_hub_file(identifier, file, true)
            .map_err(|e| WordpipeError::External(e.to_string()))
    }
}

impl Tokenizer {
    /// Load a pretrained tokenizer.
    ///
    /// ## Arguments
    /// * `identifier` - a file path, a directory, or a repository id.
    /// * `loader` - resolves repository ids which are not local paths.
    ///
    /// ## Returns
    /// The loaded tokenizer; `Io` if the resolved file can't be read,
    /// `Serialization` if it is not a valid tokenizer document.
    pub fn from_pretrained<L>(
        identifier: &str,
        loader: &mut L,
    ) -> WPResult<Self>
    where
        L: ResourceLoader + ?Sized,
    {
        let path = resolve_pretrained(identifier, loader)?;
        log::info!("loading tokenizer {identifier:?} from {}", path.display());
        Self::from_file(path)
    }
}

fn resolve_pretrained<L>(
    identifier: &str,
    loader: &mut L,
) -> WPResult<PathBuf>
where
    L: ResourceLoader + ?Sized,
{
    if identifier.is_empty() {
        return Err(WordpipeError::InvalidInput(
            "empty pretrained identifier".to_string(),
        ));
    }

    let local = Path::new(identifier);
    if local.is_file() {
        return Ok(local.to_path_buf());
    }
    if local.is_dir() {
        let path = local.join(TOKENIZER_FILE);
        if path.is_file() {
            return Ok(path);
        }
        return Err(WordpipeError::InvalidInput(format!(
            "directory {identifier:?} has no {TOKENIZER_FILE}"
        )));
    }

    loader.load_resource_path(identifier, TOKENIZER_FILE)
}
