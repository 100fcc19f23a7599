use std::io::Write;

use wordpipe::{DecodeOptions, TokenId};

use crate::{
    input_output::{InputArgs, OutputArgs, read_lines},
    tokenizer_args::TokenizerArgs,
};

/// Args for the decode command.
#[derive(clap::Args, Debug)]
pub struct DecodeArgs {
    #[command(flatten)]
    tokenizer: TokenizerArgs,

    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    output: OutputArgs,

    /// Keep special tokens in the output.
    #[arg(long)]
    keep_special_tokens: bool,

    /// Keep the spaces the tokenizer puts before punctuation.
    #[arg(long)]
    no_cleanup: bool,
}

impl DecodeArgs {
    /// Run the decode command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let tokenizer = self.tokenizer.load_tokenizer()?;
        let options = DecodeOptions {
            skip_special_tokens: !self.keep_special_tokens,
            clean_up_tokenization_spaces: !self.no_cleanup
                && tokenizer.decode_options().clean_up_tokenization_spaces,
            ..*tokenizer.decode_options()
        };

        let mut reader = self.input.open_reader()?;
        let mut writer = self.output.open_writer()?;

        let mut sequences = Vec::new();
        for (idx, line) in read_lines(&mut reader)?.iter().enumerate() {
            let ids = line
                .split_whitespace()
                .map(|s| s.parse::<TokenId>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| format!("line {}: {e}", idx + 1))?;
            sequences.push(ids);
        }

        for ids in &sequences {
            writeln!(writer, "{}", tokenizer.decode_with_options(ids, &options))?;
        }
        writer.flush()?;
        Ok(())
    }
}
