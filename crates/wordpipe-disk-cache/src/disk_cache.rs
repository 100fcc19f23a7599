//! # Wordpipe Disk Cache

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use downloader::{Download, Downloader};

use crate::{DEFAULT_HUB_ENDPOINT, DEFAULT_REVISION, WORDPIPE_CACHE_CONFIG, path_utils};

/// Options for [`WordpipeDiskCache`].
#[derive(Clone, Default, Debug)]
pub struct WordpipeDiskCacheOptions {
    /// Optional path to the cache directory.
    pub cache_dir: Option<PathBuf>,

    /// Optional path to the data directory.
    pub data_dir: Option<PathBuf>,

    /// Optional hub endpoint; defaults to [`DEFAULT_HUB_ENDPOINT`].
    pub endpoint: Option<String>,

    /// Optional hub revision; defaults to [`DEFAULT_REVISION`].
    pub revision: Option<String>,

    /// Optional [`Downloader`] builder.
    pub downloader: Option<fn() -> Downloader>,
}

impl WordpipeDiskCacheOptions {
    /// Set the cache directory.
    pub fn with_cache_dir<P: AsRef<Path>>(
        mut self,
        cache_dir: Option<P>,
    ) -> Self {
        self.cache_dir = cache_dir.map(|p| p.as_ref().to_path_buf());
        self
    }

    /// Set the data directory.
    pub fn with_data_dir<P: AsRef<Path>>(
        mut self,
        data_dir: Option<P>,
    ) -> Self {
        self.data_dir = data_dir.map(|p| p.as_ref().to_path_buf());
        self
    }

    /// Set the hub endpoint.
    pub fn with_endpoint<S: Into<String>>(
        mut self,
        endpoint: Option<S>,
    ) -> Self {
        self.endpoint = endpoint.map(Into::into);
        self
    }

    /// Set the hub revision.
    pub fn with_revision<S: Into<String>>(
        mut self,
        revision: Option<S>,
    ) -> Self {
        self.revision = revision.map(Into::into);
        self
    }

    /// Set the downloader builder.
    pub fn with_downloader(
        mut self,
        downloader: Option<fn() -> Downloader>,
    ) -> Self {
        self.downloader = downloader;
        self
    }
}

/// Disk cache for downloaded tokenizer files.
///
/// Files live under ``<cache_dir>/<org>/<name>/<revision>/<file>``.
pub struct WordpipeDiskCache {
    cache_dir: PathBuf,
    data_dir: PathBuf,
    endpoint: String,
    revision: String,
    downloader: Downloader,
}

impl WordpipeDiskCache {
    /// Construct a new [`WordpipeDiskCache`].
    pub fn new(options: WordpipeDiskCacheOptions) -> anyhow::Result<Self> {
        let cache_dir = WORDPIPE_CACHE_CONFIG
            .resolve_cache_dir(options.cache_dir)
            .context("failed to resolve cache directory")?;

        let data_dir = WORDPIPE_CACHE_CONFIG
            .resolve_data_dir(options.data_dir)
            .context("failed to resolve data directory")?;

        let downloader = match options.downloader {
            Some(builder) => builder(),
            None => Downloader::builder().build()?,
        };

        Ok(Self {
            cache_dir,
            data_dir,
            endpoint: options
                .endpoint
                .unwrap_or_else(|| DEFAULT_HUB_ENDPOINT.to_string()),
            revision: options
                .revision
                .unwrap_or_else(|| DEFAULT_REVISION.to_string()),
            downloader,
        })
    }

    /// Get the cache directory.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Get the data directory.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Get the hub revision.
    pub fn revision(&self) -> &str {
        &self.revision
    }

    /// Get the cache path for the given key.
    ///
    /// Does not check that the path exists, or create directories.
    pub fn cache_path<C, F>(
        &self,
        context: &[C],
        file: F,
    ) -> PathBuf
    where
        C: AsRef<Path>,
        F: AsRef<Path>,
    {
        path_utils::extend_path(&self.cache_dir, context, file)
    }

    /// Get the data path for the given key.
    ///
    /// Does not check that the path exists, or create directories.
    pub fn data_path<C, F>(
        &self,
        context: &[C],
        file: F,
    ) -> PathBuf
    where
        C: AsRef<Path>,
        F: AsRef<Path>,
    {
        path_utils::extend_path(&self.data_dir, context, file)
    }

    /// The hub URL of `file` in the repository `identifier`.
    pub fn hub_url(
        &self,
        identifier: &str,
        file: &str,
    ) -> String {
        format!(
            "{}/{identifier}/resolve/{}/{file}",
            self.endpoint.trim_end_matches('/'),
            self.revision
        )
    }

    /// Load a cached file, downloading it first if needed.
    ///
    /// ## Arguments
    /// * `context` - prefix dirs, inserted between the cache dir and the file.
    /// * `urls` - mirrors to download from; the file name is taken from the first.
    /// * `download` - whether a cache miss may download.
    ///
    /// ## Returns
    /// The path of the cached file; or an error on a miss with `download` unset,
    /// or on a failed download.
    pub fn load_cached_path<C, S>(
        &mut self,
        context: &[C],
        urls: &[S],
        download: bool,
    ) -> anyhow::Result<PathBuf>
    where
        C: AsRef<Path>,
        S: AsRef<str>,
    {
        let urls: Vec<_> = urls.iter().map(|s| s.as_ref()).collect();
        let mut dl = Download::new_mirrored(&urls);
        let path = self.cache_path(context, &dl.file_name);
        dl.file_name = path.clone();

        if path.exists() {
            log::debug!("cache hit: {}", path.display());
            return Ok(path);
        }

        if !download {
            anyhow::bail!("cached file not found: {}", path.display());
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        log::info!("downloading {}", urls.join(", "));
        for summary in self.downloader.download(&[dl])? {
            summary.with_context(|| format!("failed to download {}", urls.join(", ")))?;
        }

        Ok(path)
    }

    /// Load a file from a hub repository, via the cache.
    ///
    /// ## Arguments
    /// * `identifier` - the repository, ``"name"`` or ``"org/name"``.
    /// * `file` - the file within the repository.
    /// * `download` - whether a cache miss may download.
    pub fn load_hub_file(
        &mut self,
        identifier: &str,
        file: &str,
        download: bool,
    ) -> anyhow::Result<PathBuf> {
        let mut context = path_utils::identifier_context(identifier)?;
        context.push(self.revision.clone());
        let url = self.hub_url(identifier, file);
        self.load_cached_path(&context, &[url], download)
    }
}
