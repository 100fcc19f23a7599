use wordpipe::disk_cache::{WordpipeDiskCache, WordpipeDiskCacheOptions};

/// Disk cache argument group.
#[derive(clap::Args, Debug)]
pub struct DiskCacheArgs {
    /// Cache directory.
    #[arg(long, default_value = None)]
    cache_dir: Option<String>,

    /// Hub revision to download from.
    #[arg(long, default_value = None)]
    revision: Option<String>,
}

impl DiskCacheArgs {
    /// Initialize the disk cache.
    pub fn init_disk_cache(&self) -> Result<WordpipeDiskCache, Box<dyn std::error::Error>> {
        let options = WordpipeDiskCacheOptions::default()
            .with_cache_dir(self.cache_dir.as_ref())
            .with_revision(self.revision.clone());

        Ok(WordpipeDiskCache::new(options)?)
    }
}
