use std::borrow::Cow;

/// One input sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSequence<'s> {
    /// Raw text, for the full pipeline.
    Raw(Cow<'s, str>),

    /// Pre-split chunks; normalization and pre-tokenization are skipped.
    PreTokenized(Vec<Cow<'s, str>>),
}

impl<'s> From<&'s str> for InputSequence<'s> {
    fn from(text: &'s str) -> Self {
        InputSequence::Raw(Cow::Borrowed(text))
    }
}

impl<'s> From<&'s String> for InputSequence<'s> {
    fn from(text: &'s String) -> Self {
        InputSequence::Raw(Cow::Borrowed(text.as_str()))
    }
}

impl From<String> for InputSequence<'_> {
    fn from(text: String) -> Self {
        InputSequence::Raw(Cow::Owned(text))
    }
}

impl<'s> From<&'s [&'s str]> for InputSequence<'s> {
    fn from(chunks: &'s [&'s str]) -> Self {
        InputSequence::PreTokenized(chunks.iter().map(|&c| Cow::Borrowed(c)).collect())
    }
}

impl<'s> From<Vec<&'s str>> for InputSequence<'s> {
    fn from(chunks: Vec<&'s str>) -> Self {
        InputSequence::PreTokenized(chunks.into_iter().map(Cow::Borrowed).collect())
    }
}

impl<'s> From<&'s [String]> for InputSequence<'s> {
    fn from(chunks: &'s [String]) -> Self {
        InputSequence::PreTokenized(chunks.iter().map(|c| Cow::Borrowed(c.as_str())).collect())
    }
}

impl From<Vec<String>> for InputSequence<'_> {
    fn from(chunks: Vec<String>) -> Self {
        InputSequence::PreTokenized(chunks.into_iter().map(Cow::Owned).collect())
    }
}

/// An encode input: one sequence, or a pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeInput<'s> {
    /// A single sequence.
    Single(InputSequence<'s>),

    /// A pair of sequences.
    Pair(InputSequence<'s>, InputSequence<'s>),
}

impl EncodeInput<'_> {
    /// Is this a pair input?
    pub fn is_pair(&self) -> bool {
        matches!(self, EncodeInput::Pair(..))
    }
}

impl<'s, I: Into<InputSequence<'s>>> From<I> for EncodeInput<'s> {
    fn from(input: I) -> Self {
        EncodeInput::Single(input.into())
    }
}

impl<'s, A, B> From<(A, B)> for EncodeInput<'s>
where
    A: Into<InputSequence<'s>>,
    B: Into<InputSequence<'s>>,
{
    fn from((first, second): (A, B)) -> Self {
        EncodeInput::Pair(first.into(), second.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        let single: EncodeInput = "hello".into();
        assert!(!single.is_pair());

        let pair: EncodeInput = ("a", "b".to_string()).into();
        assert!(pair.is_pair());

        let chunks = ["hello", ","];
        let pre: EncodeInput = (&chunks[..]).into();
        assert_eq!(
            pre,
            EncodeInput::Single(InputSequence::PreTokenized(vec![
                Cow::Borrowed("hello"),
                Cow::Borrowed(","),
            ]))
        );
    }
}
