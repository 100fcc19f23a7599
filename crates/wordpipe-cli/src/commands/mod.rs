use crate::commands::{decode::DecodeArgs, encode::EncodeArgs, inspect::InspectArgs};

pub mod decode;
pub mod encode;
pub mod inspect;

/// Subcommands for wordpipe.
#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Encode lines of text to token ids.
    Encode(EncodeArgs),

    /// Decode lines of token ids to text.
    Decode(DecodeArgs),

    /// Describe a tokenizer.
    Inspect(InspectArgs),
}

impl Commands {
    /// Run the subcommand.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        match self {
            Commands::Encode(cmd) => cmd.run(),
            Commands::Decode(cmd) => cmd.run(),
            Commands::Inspect(cmd) => cmd.run(),
        }
    }
}
