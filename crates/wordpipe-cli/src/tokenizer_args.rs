use wordpipe::{
    Tokenizer,
    utils::{PaddingOptions, TruncationOptions, TruncationStrategy},
};

use crate::disk_cache::DiskCacheArgs;

/// Tokenizer selection and pipeline overrides.
#[derive(clap::Args, Debug)]
pub struct TokenizerArgs {
    /// Tokenizer file, directory, or hub identifier (``org/name``).
    #[arg(long, short = 't')]
    tokenizer: String,

    /// Truncate encodings to this many tokens.
    #[arg(long)]
    max_length: Option<usize>,

    /// Overlap between truncation overflow windows.
    #[arg(long, default_value_t = 0, requires = "max_length")]
    stride: usize,

    /// Truncation strategy: ``longest_first``, ``only_first``, or ``only_second``.
    #[arg(long, default_value = "longest_first", requires = "max_length")]
    truncation_strategy: String,

    /// Pad every batch to this length; or to its longest member with ``--pad-batch``.
    #[arg(long, conflicts_with = "pad_batch")]
    pad_length: Option<usize>,

    /// Pad every batch to its longest member.
    #[arg(long)]
    pad_batch: bool,

    #[command(flatten)]
    disk_cache: DiskCacheArgs,
}

impl TokenizerArgs {
    /// Load the tokenizer, and apply overrides.
    pub fn load_tokenizer(&self) -> Result<Tokenizer, Box<dyn std::error::Error>> {
        let mut disk_cache = self.disk_cache.init_disk_cache()?;
        let mut tokenizer = Tokenizer::from_pretrained(&self.tokenizer, &mut disk_cache)?;

        if let Some(max_length) = self.max_length {
            let strategy: TruncationStrategy = self
                .truncation_strategy
                .parse()
                .map_err(wordpipe::WordpipeError::from)?;
            tokenizer.enable_truncation(
                max_length,
                TruncationOptions::default()
                    .with_strategy(strategy)
                    .with_stride(self.stride),
            )?;
        }

        if let Some(length) = self.pad_length {
            let mut options = tokenizer
                .padding()
                .map(padding_options)
                .unwrap_or_default();
            options.length = Some(length);
            tokenizer.enable_padding(options)?;
        } else if self.pad_batch {
            let mut options = tokenizer
                .padding()
                .map(padding_options)
                .unwrap_or_default();
            options.length = None;
            tokenizer.enable_padding(options)?;
        }

        log::debug!("loaded tokenizer {:?}", self.tokenizer);
        Ok(tokenizer)
    }
}

/// Carry over the pad token settings of an existing padding config.
fn padding_options(params: &wordpipe::utils::PaddingParams) -> PaddingOptions {
    PaddingOptions::default()
        .with_direction(params.direction)
        .with_pad_id(params.pad_id)
        .with_pad_type_id(params.pad_type_id)
        .with_pad_token(params.pad_token.clone())
}
