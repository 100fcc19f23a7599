//! # Base Token Vocabulary

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer, ser::SerializeMap};

use crate::{
    errors::{WPResult, WordpipeError},
    types::{TokenId, WPHashMap, hash_map_with_capacity},
};

/// A bidirectional ``{ token <-> id }`` vocabulary.
///
/// This is the base vocabulary owned by a subword model;
/// see [`AddedVocab`](crate::vocab::AddedVocab) for the overlay of
/// tokens added after training.
///
/// Both directions are unique: no two tokens share an id,
/// and no two ids share a token.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenVocab {
    token_to_id: WPHashMap<String, TokenId>,
    id_to_token: WPHashMap<TokenId, String>,
    max_id: Option<TokenId>,
}

impl TokenVocab {
    /// Build a vocab from a ``{ token -> id }`` map.
    ///
    /// ## Returns
    /// A `Configuration` error if two tokens share an id.
    pub fn from_map<I, S>(map: I) -> WPResult<Self>
    where
        I: IntoIterator<Item = (S, TokenId)>,
        S: Into<String>,
    {
        let map = map.into_iter();
        let (lower, _) = map.size_hint();
        let mut token_to_id = hash_map_with_capacity(lower);
        let mut id_to_token: WPHashMap<TokenId, String> = hash_map_with_capacity(lower);
        let mut max_id = None;

        for (token, id) in map {
            let token = token.into();
            if let Some(prev) = id_to_token.get(&id) {
                return Err(WordpipeError::Configuration(format!(
                    "id {id} is assigned to both {prev:?} and {token:?}"
                )));
            }
            if token_to_id.contains_key(&token) {
                return Err(WordpipeError::Configuration(format!(
                    "token {token:?} is assigned more than one id"
                )));
            }
            id_to_token.insert(id, token.clone());
            token_to_id.insert(token, id);
            max_id = max_id.max(Some(id));
        }

        Ok(Self {
            token_to_id,
            id_to_token,
            max_id,
        })
    }

    /// Build a vocab from an ordered token list; ids are list positions.
    ///
    /// Repeated tokens keep their first id and do not consume a new one.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vocab = Self::default();
        for token in tokens {
            let token = token.into();
            if vocab.token_to_id.contains_key(&token) {
                continue;
            }
            let id = vocab.len() as TokenId;
            vocab.id_to_token.insert(id, token.clone());
            vocab.token_to_id.insert(token, id);
            vocab.max_id = Some(id);
        }
        vocab
    }

    /// The number of tokens in the vocab.
    pub fn len(&self) -> usize {
        self.token_to_id.len()
    }

    /// Is the vocab empty?
    pub fn is_empty(&self) -> bool {
        self.token_to_id.is_empty()
    }

    /// Look up the id of a token.
    pub fn token_to_id(
        &self,
        token: &str,
    ) -> Option<TokenId> {
        self.token_to_id.get(token).copied()
    }

    /// Look up the token of an id.
    pub fn id_to_token(
        &self,
        id: TokenId,
    ) -> Option<&str> {
        self.id_to_token.get(&id).map(String::as_str)
    }

    /// Does the vocab contain the token?
    pub fn contains(
        &self,
        token: &str,
    ) -> bool {
        self.token_to_id.contains_key(token)
    }

    /// The largest id in the vocab, if any.
    pub fn max_id(&self) -> Option<TokenId> {
        self.max_id
    }

    /// The first id past every id in the vocab.
    pub fn next_id(&self) -> TokenId {
        self.max_id().map_or(0, |id| id + 1)
    }

    /// Iterate over ``(token, id)`` pairs, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, TokenId)> {
        self.token_to_id.iter().map(|(t, &id)| (t.as_str(), id))
    }

    /// Iterate over ``(token, id)`` pairs, ordered by id.
    pub fn iter_by_id(&self) -> impl Iterator<Item = (&str, TokenId)> {
        let mut pairs: Vec<_> = self.iter().collect();
        pairs.sort_unstable_by_key(|&(_, id)| id);
        pairs.into_iter()
    }

    /// Clone the ``{ token -> id }`` map.
    pub fn to_map(&self) -> WPHashMap<String, TokenId> {
        self.token_to_id.clone()
    }
}

impl Serialize for TokenVocab {
    fn serialize<S>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Ordered by id, so saved configs are stable and diffable.
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (token, id) in self.iter_by_id() {
            map.serialize_entry(token, &id)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TokenVocab {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map = HashMap::<String, TokenId>::deserialize(deserializer)?;
        TokenVocab::from_map(map).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tokens() {
        let vocab = TokenVocab::from_tokens(["hello", "world", "hello", ","]);
        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab.token_to_id("hello"), Some(0));
        assert_eq!(vocab.token_to_id(","), Some(2));
        assert_eq!(vocab.id_to_token(1), Some("world"));
        assert_eq!(vocab.id_to_token(3), None);
        assert_eq!(vocab.next_id(), 3);
    }

    #[test]
    fn test_from_map_rejects_shared_ids() {
        let err = TokenVocab::from_map([("a", 0), ("b", 0)]).unwrap_err();
        assert!(matches!(err, WordpipeError::Configuration(_)));
    }

    #[test]
    fn test_consistency() {
        let vocab = TokenVocab::from_map([("x", 2), ("y", 0), ("z", 1)]).unwrap();
        for id in 0..vocab.len() as TokenId {
            let token = vocab.id_to_token(id).unwrap();
            assert_eq!(vocab.token_to_id(token), Some(id));
        }
        assert_eq!(
            vocab.iter_by_id().map(|(t, _)| t).collect::<Vec<_>>(),
            vec!["y", "z", "x"]
        );
    }

    #[test]
    fn test_serde_is_id_ordered() {
        let vocab = TokenVocab::from_map([("b", 1), ("a", 2), ("c", 0)]).unwrap();
        let json = serde_json::to_string(&vocab).unwrap();
        assert_eq!(json, r#"{"c":0,"b":1,"a":2}"#);

        let restored: TokenVocab = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, vocab);

        assert!(serde_json::from_str::<TokenVocab>(r#"{"a":0,"b":0}"#).is_err());
    }
}
