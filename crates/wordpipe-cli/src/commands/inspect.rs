use wordpipe::Tokenizer;

use crate::tokenizer_args::TokenizerArgs;

/// Args for the inspect command.
#[derive(clap::Args, Debug)]
pub struct InspectArgs {
    #[command(flatten)]
    tokenizer: TokenizerArgs,

    /// Print the full tokenizer document.
    #[arg(long)]
    json: bool,

    /// Save the tokenizer, with any overrides, to this path.
    #[arg(long)]
    save: Option<String>,
}

impl InspectArgs {
    /// Run the inspect command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let tokenizer = self.tokenizer.load_tokenizer()?;

        if self.json {
            println!("{}", tokenizer.to_string(true)?);
        } else {
            describe(&tokenizer)?;
        }

        if let Some(path) = &self.save {
            tokenizer.save(path, true)?;
            log::info!("saved tokenizer to {path}");
        }
        Ok(())
    }
}

fn stage_name<T: serde::Serialize>(stage: Option<&T>) -> Result<String, Box<dyn std::error::Error>> {
    let Some(stage) = stage else {
        return Ok("none".to_string());
    };
    let value = serde_json::to_value(stage)?;
    Ok(value["type"].as_str().unwrap_or("unknown").to_string())
}

fn describe(tokenizer: &Tokenizer) -> Result<(), Box<dyn std::error::Error>> {
    println!("model:          {}", stage_name(Some(tokenizer.model()))?);
    println!("normalizer:     {}", stage_name(tokenizer.normalizer())?);
    println!("pre_tokenizer:  {}", stage_name(tokenizer.pre_tokenizer())?);
    println!("post_processor: {}", stage_name(tokenizer.post_processor())?);
    println!("decoder:        {}", stage_name(tokenizer.decoder())?);
    println!("vocab_size:     {}", tokenizer.vocab_size(false));
    println!("with added:     {}", tokenizer.vocab_size(true));

    for entry in tokenizer.added_vocab().entries() {
        let kind = if entry.token.special { "special" } else { "added" };
        println!("  {kind} {:>8} {:?}", entry.id, entry.token.content);
    }

    match tokenizer.truncation() {
        Some(t) => println!(
            "truncation:     max_length={} stride={} strategy={} direction={}",
            t.max_length, t.stride, t.strategy, t.direction
        ),
        None => println!("truncation:     none"),
    }
    match tokenizer.padding() {
        Some(p) => println!(
            "padding:        {:?} direction={} pad_id={} pad_token={:?}",
            p.strategy, p.direction, p.pad_id, p.pad_token
        ),
        None => println!("padding:        none"),
    }
    Ok(())
}
