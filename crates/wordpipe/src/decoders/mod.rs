//! # Decoders
//!
//! A [`Decoder`] turns the surviving tokens of a decode into text pieces,
//! which are concatenated. Without a decoder, tokens are joined with single
//! spaces.
//!
//! [`clean_up_tokenization`] is the optional final cleanup pass.

use serde::{Deserialize, Serialize};

/// The ordered cleanup rewrites; each is a literal replace-all.
const CLEANUP_REWRITES: [(&str, &str); 10] = [
    (" .", "."),
    (" ?", "?"),
    (" !", "!"),
    (" ,", ","),
    (" ' ", "'"),
    (" n't", "n't"),
    (" 'm", "'m"),
    (" 's", "'s"),
    (" 've", "'ve"),
    (" 're", "'re"),
];

/// Undo the spaces a space-join puts before punctuation and contractions.
///
/// This is a best-effort pass; it does not restore arbitrary whitespace.
pub fn clean_up_tokenization(text: &str) -> String {
    let mut text = text.to_string();
    for (from, to) in CLEANUP_REWRITES {
        if text.contains(from) {
            text = text.replace(from, to);
        }
    }
    text
}

/// Decoder capability.
pub trait Decoder: Send + Sync {
    /// Map each token to its text piece.
    fn decode_chain(
        &self,
        tokens: Vec<String>,
    ) -> Vec<String>;

    /// Decode tokens to text.
    fn decode(
        &self,
        tokens: Vec<String>,
    ) -> String {
        self.decode_chain(tokens).concat()
    }
}

/// The default decode: join with single spaces.
pub fn join_tokens(tokens: &[String]) -> String {
    tokens.join(" ")
}

fn default_prefix() -> String {
    "##".to_string()
}

fn default_suffix() -> String {
    "</w>".to_string()
}

/// The built-in decoders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DecoderWrapper {
    /// Glue continuation pieces (``"##ing"``) onto the previous token;
    /// separate other tokens with a space.
    WordPiece {
        /// The continuation prefix.
        #[serde(default = "default_prefix")]
        prefix: String,
    },

    /// Turn end-of-word suffixes (``"low</w>"``) into word breaks.
    #[serde(rename = "BPEDecoder")]
    BpeSuffix {
        /// The end-of-word suffix.
        #[serde(default = "default_suffix")]
        suffix: String,
    },
}

impl DecoderWrapper {
    /// A `WordPiece` decoder with the ``"##"`` prefix.
    pub fn word_piece() -> Self {
        DecoderWrapper::WordPiece {
            prefix: default_prefix(),
        }
    }

    /// A BPE suffix decoder with the ``"</w>"`` suffix.
    pub fn bpe_suffix() -> Self {
        DecoderWrapper::BpeSuffix {
            suffix: default_suffix(),
        }
    }
}

impl Decoder for DecoderWrapper {
    fn decode_chain(
        &self,
        tokens: Vec<String>,
    ) -> Vec<String> {
        match self {
            DecoderWrapper::WordPiece { prefix } => tokens
                .into_iter()
                .enumerate()
                .map(|(idx, token)| {
                    if idx == 0 {
                        return token;
                    }
                    match token.strip_prefix(prefix.as_str()) {
                        Some(tail) => tail.to_string(),
                        None => format!(" {token}"),
                    }
                })
                .collect(),
            DecoderWrapper::BpeSuffix { suffix } => {
                let last = tokens.len().saturating_sub(1);
                tokens
                    .into_iter()
                    .enumerate()
                    .map(|(idx, token)| {
                        let sep = if idx == last { "" } else { " " };
                        token.replace(suffix.as_str(), sep)
                    })
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_clean_up_tokenization() {
        assert_eq!(
            clean_up_tokenization("hello , world . i do n't know ! it 's ok ?"),
            "hello, world. i don't know! it's ok?"
        );
        assert_eq!(clean_up_tokenization("we 're here , they 've gone"), "we're here, they've gone");
        assert_eq!(clean_up_tokenization("i 'm ' ok"), "i'm'ok");
        assert_eq!(clean_up_tokenization("plain"), "plain");
    }

    #[test]
    fn test_word_piece() {
        let decoder = DecoderWrapper::word_piece();
        assert_eq!(
            decoder.decode(strings(&["un", "##aff", "##able", "day", "##s"])),
            "unaffable days"
        );
        assert_eq!(decoder.decode(strings(&["##x", "y"])), "##x y");
    }

    #[test]
    fn test_bpe_suffix() {
        let decoder = DecoderWrapper::bpe_suffix();
        assert_eq!(
            decoder.decode(strings(&["lo", "w</w>", "er</w>"])),
            "low er"
        );
    }

    #[test]
    fn test_join_and_serde() {
        assert_eq!(join_tokens(&strings(&["a", "b"])), "a b");

        let decoder = DecoderWrapper::bpe_suffix();
        let json = serde_json::to_string(&decoder).unwrap();
        assert_eq!(json, r#"{"type":"BPEDecoder","suffix":"</w>"}"#);
        let restored: DecoderWrapper = serde_json::from_str(r#"{"type":"WordPiece"}"#).unwrap();
        assert_eq!(restored, DecoderWrapper::word_piece());
    }
}
