use std::io::Write;

use wordpipe::{Encoding, WPResult, WordpipeError};

use crate::{
    input_output::{InputArgs, OutputArgs, read_lines},
    tokenizer_args::TokenizerArgs,
};

/// Output format for encodings.
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default)]
pub enum EncodeFormat {
    /// Space-separated token ids.
    #[default]
    Ids,

    /// Space-separated tokens.
    Tokens,

    /// One JSON object per line, with every encoding field.
    Json,
}

/// Args for the encode command.
#[derive(clap::Args, Debug)]
pub struct EncodeArgs {
    #[command(flatten)]
    tokenizer: TokenizerArgs,

    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    output: OutputArgs,

    /// Output format.
    #[arg(long, value_enum, default_value_t = EncodeFormat::Ids)]
    format: EncodeFormat,

    /// Don't add post-processor special tokens.
    #[arg(long)]
    no_special_tokens: bool,

    /// Treat each line as a pair, split at the first tab.
    #[arg(long)]
    pairs: bool,

    /// Lines per batch; padding applies within a batch.
    #[arg(long, default_value_t = 64)]
    batch_size: usize,
}

impl EncodeArgs {
    /// Run the encode command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let tokenizer = self.tokenizer.load_tokenizer()?;

        let mut reader = self.input.open_reader()?;
        let mut writer = self.output.open_writer()?;
        let lines = read_lines(&mut reader)?;

        let batch_size = self.batch_size.max(1);
        for (batch_idx, batch) in lines.chunks(batch_size).enumerate() {
            let encodings = if self.pairs {
                let inputs = batch
                    .iter()
                    .enumerate()
                    .map(|(idx, line)| split_pair(batch_idx * batch_size + idx + 1, line))
                    .collect::<WPResult<Vec<_>>>()?;
                tokenizer.encode_batch(inputs, !self.no_special_tokens)?
            } else {
                let inputs: Vec<&str> = batch.iter().map(String::as_str).collect();
                tokenizer.encode_batch(inputs, !self.no_special_tokens)?
            };

            for encoding in &encodings {
                write_encoding(&mut writer, encoding, self.format)?;
            }
        }
        writer.flush()?;
        Ok(())
    }
}

/// Split a `--pairs` input line at its first tab.
///
/// ## Arguments
/// * `line_no` - the 1-based line number, for the error message.
fn split_pair(
    line_no: usize,
    line: &str,
) -> WPResult<(&str, &str)> {
    line.split_once('\t').ok_or_else(|| {
        WordpipeError::InvalidInput(format!("line {line_no}: expected a tab-separated pair"))
    })
}

fn write_encoding(
    writer: &mut dyn Write,
    encoding: &Encoding,
    format: EncodeFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        EncodeFormat::Ids => {
            let ids: Vec<String> = encoding.ids().iter().map(|id| id.to_string()).collect();
            writeln!(writer, "{}", ids.join(" "))?;
        }
        EncodeFormat::Tokens => {
            writeln!(writer, "{}", encoding.tokens().join(" "))?;
        }
        EncodeFormat::Json => {
            serde_json::to_writer(&mut *writer, &encoding_json(encoding))?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

fn encoding_json(encoding: &Encoding) -> serde_json::Value {
    serde_json::json!({
        "ids": encoding.ids(),
        "type_ids": encoding.type_ids(),
        "tokens": encoding.tokens(),
        "words": encoding.word_ids(),
        "offsets": encoding.offsets(),
        "special_tokens_mask": encoding.special_tokens_mask(),
        "attention_mask": encoding.attention_mask(),
        "overflowing": encoding
            .overflowing()
            .iter()
            .map(encoding_json)
            .collect::<Vec<_>>(),
    })
}
