//! # Vocabulary File IO
//!
//! The plain model files that ship alongside pretrained tokenizers:
//! * ``vocab.json`` - a ``{ token -> id }`` object (`WordLevel`, `BPE`).
//! * ``vocab.txt`` - one token per line; the id is the line number (`WordPiece`).
//! * ``merges.txt`` - one ``"a b"`` merge per line, in rank order (`BPE`).

use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
};

use crate::{
    errors::{WPResult, WordpipeError},
    vocab::TokenVocab,
};

/// Load a [`TokenVocab`] from a ``vocab.json`` file.
pub fn load_vocab_json_path<P: AsRef<Path>>(path: P) -> WPResult<TokenVocab> {
    let file = File::open(path)?;
    read_vocab_json(BufReader::new(file))
}

/// Read a [`TokenVocab`] from a ``vocab.json`` stream.
///
/// ## Returns
/// A `Serialization` error for malformed JSON or shared ids.
pub fn read_vocab_json<R: Read>(reader: R) -> WPResult<TokenVocab> {
    Ok(serde_json::from_reader(reader)?)
}

/// Load a [`TokenVocab`] from a ``vocab.txt`` file.
pub fn load_vocab_txt_path<P: AsRef<Path>>(path: P) -> WPResult<TokenVocab> {
    let file = File::open(path)?;
    read_vocab_txt(BufReader::new(file))
}

/// Read a [`TokenVocab`] from a ``vocab.txt`` stream.
///
/// Trailing whitespace is trimmed from each line.
pub fn read_vocab_txt<R: BufRead>(reader: R) -> WPResult<TokenVocab> {
    let mut tokens = Vec::new();
    for line in reader.lines() {
        tokens.push(line?.trim_end().to_string());
    }
    Ok(TokenVocab::from_tokens(tokens))
}

/// Load merges from a ``merges.txt`` file.
pub fn load_merges_txt_path<P: AsRef<Path>>(path: P) -> WPResult<Vec<(String, String)>> {
    let file = File::open(path)?;
    read_merges_txt(BufReader::new(file))
}

/// Read merges from a ``merges.txt`` stream.
///
/// A leading ``#version`` line and blank lines are skipped.
///
/// ## Returns
/// The merges in rank order; or a `Configuration` error naming the first
/// line which is not exactly two space-separated tokens.
pub fn read_merges_txt<R: BufRead>(reader: R) -> WPResult<Vec<(String, String)>> {
    let mut merges = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() || (idx == 0 && line.starts_with("#version")) {
            continue;
        }

        let mut parts = line.split(' ');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(a), Some(b), None) if !a.is_empty() && !b.is_empty() => {
                merges.push((a.to_string(), b.to_string()));
            }
            _ => {
                return Err(WordpipeError::Configuration(format!(
                    "merges file line {} is not a merge: {line:?}",
                    idx + 1
                )));
            }
        }
    }
    Ok(merges)
}
