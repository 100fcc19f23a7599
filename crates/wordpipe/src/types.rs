//! # Common Types

/// A token id.
///
/// Ids are dense and unique within a vocabulary.
pub type TokenId = u32;

/// A half-open ``[start, end)`` byte span into an input string.
pub type Offsets = (usize, usize);

cfg_if::cfg_if! {
    if #[cfg(feature = "ahash")] {
        /// Type Alias for hash maps in this crate.
        pub type WPHashMap<K, V> = ahash::AHashMap<K, V>;

        /// Create a new empty hash map.
        pub fn hash_map_new<K, V>() -> WPHashMap<K, V> {
            WPHashMap::new()
        }

        /// Create a new hash map with the given capacity.
        pub fn hash_map_with_capacity<K, V>(capacity: usize) -> WPHashMap<K, V> {
            WPHashMap::with_capacity(capacity)
        }

        /// Type Alias for hash sets in this crate.
        pub type WPHashSet<V> = ahash::AHashSet<V>;

    } else if #[cfg(feature = "foldhash")] {
        /// Type Alias for hash maps in this crate.
        pub type WPHashMap<K, V> = foldhash::HashMap<K, V>;

        /// Create a new empty hash map.
        pub fn hash_map_new<K, V>() -> WPHashMap<K, V> {
            foldhash::HashMapExt::new()
        }

        /// Create a new hash map with the given capacity.
        pub fn hash_map_with_capacity<K, V>(capacity: usize) -> WPHashMap<K, V> {
            foldhash::HashMapExt::with_capacity(capacity)
        }

        /// Type Alias for hash sets in this crate.
        pub type WPHashSet<V> = foldhash::HashSet<V>;

    } else {
        /// Type Alias for hash maps in this crate.
        pub type WPHashMap<K, V> = std::collections::HashMap<K, V>;

        /// Create a new empty hash map.
        pub fn hash_map_new<K, V>() -> WPHashMap<K, V> {
            WPHashMap::new()
        }

        /// Create a new hash map with the given capacity.
        pub fn hash_map_with_capacity<K, V>(capacity: usize) -> WPHashMap<K, V> {
            WPHashMap::with_capacity(capacity)
        }

        /// Type Alias for hash sets in this crate.
        pub type WPHashSet<V> = std::collections::HashSet<V>;
    }
}

/// Compile-time check that a value is [`Send`].
pub fn check_is_send<S: Send>(_: &S) {}

/// Compile-time check that a value is [`Sync`].
pub fn check_is_sync<S: Sync>(_: &S) {}
