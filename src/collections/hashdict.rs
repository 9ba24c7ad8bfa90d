// Copyright 2025 The Matrix.org Foundation C.I.C.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! `Hashdict`: a dictionary keyed by a projection of the stored value
//! rather than by an independently chosen key.
//!
//! `Room`s are keyed by their own `room_id`, `Invite`s likewise, and
//! `IToken`s by their own `name` — in every case the key is redundant with
//! data already inside the value, and duplicating it as a free-standing
//! `HashMap<K, V>` would let the two drift apart. `Hashdict` closes that gap
//! by deriving the key from the value on every insert.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// A type whose instances carry their own dictionary key.
pub trait Keyed {
    /// The key type used to index this value in a [`Hashdict`].
    type Key: Eq + Hash + Clone;

    /// Project this value's key.
    fn key(&self) -> Self::Key;
}

/// A dictionary keyed by `T::key()`.
///
/// Inserting a value always stores it under its own projected key; there is
/// no way to insert a value under a key other than its own, which is what
/// keeps the "every room in `rooms` has a `roomId` matching its hashdict
/// key" family of invariants true by construction rather than by
/// convention.
#[derive(Debug, Clone)]
pub struct Hashdict<T: Keyed> {
    entries: HashMap<T::Key, T>,
}

impl<T: Keyed> Default for Hashdict<T> {
    fn default() -> Self {
        Hashdict { entries: HashMap::new() }
    }
}

impl<T: Keyed> Hashdict<T> {
    /// An empty hashdict.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `value`, replacing and returning any prior entry under the
    /// same projected key.
    pub fn insert(&mut self, value: T) -> Option<T> {
        self.entries.insert(value.key(), value)
    }

    /// Look up a value by key.
    pub fn get(&self, key: &T::Key) -> Option<&T> {
        self.entries.get(key)
    }

    /// Look up a value by key, mutably.
    ///
    /// Mutating the returned value such that `T::key()` would now project
    /// differently violates the hashdict invariant; call [`Self::rehash`]
    /// afterwards if that is a possibility.
    pub fn get_mut(&mut self, key: &T::Key) -> Option<&mut T> {
        self.entries.get_mut(key)
    }

    /// Remove and return the entry under `key`, if present.
    pub fn remove(&mut self, key: &T::Key) -> Option<T> {
        self.entries.remove(key)
    }

    /// Whether an entry exists under `key`.
    pub fn contains_key(&self, key: &T::Key) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the hashdict holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the stored values.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    /// Iterate over `(key, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&T::Key, &T)> {
        self.entries.iter()
    }

    /// Rebuild the dictionary, re-deriving every entry's key from its
    /// current value.
    ///
    /// Used after a bulk mutation (e.g. decoding untrusted input under a
    /// lenient decoder) that may have left stored keys out of sync with
    /// `T::key()`.
    pub fn rehash(self) -> Self {
        let mut rebuilt = Hashdict::new();
        for value in self.entries.into_values() {
            rebuilt.insert(value);
        }
        rebuilt
    }

    /// Validate that every stored entry's key matches its projected key.
    ///
    /// Returns the keys that fail to round-trip; an empty result means the
    /// hashdict invariant holds.
    pub fn find_invalid_keys(&self) -> Vec<T::Key> {
        self.entries
            .iter()
            .filter_map(|(stored_key, value)| {
                let projected = value.key();
                (stored_key != &projected).then_some(stored_key.clone())
            })
            .collect()
    }
}

impl<T: Keyed> FromIterator<T> for Hashdict<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut dict = Hashdict::new();
        for value in iter {
            dict.insert(value);
        }
        dict
    }
}

impl<T: Keyed> IntoIterator for Hashdict<T> {
    type Item = T;
    type IntoIter = std::collections::hash_map::IntoValues<T::Key, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_values()
    }
}

impl<T> Serialize for Hashdict<T>
where
    T: Keyed + Serialize,
    T::Key: fmt::Display,
{
    /// Serializes as a JSON object keyed by the stored hash, per spec §6
    /// ("Hashdicts serialize as JSON objects keyed by the stored hash").
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(&key.to_string(), value)?;
        }
        map.end()
    }
}

impl<'de, T> Deserialize<'de> for Hashdict<T>
where
    T: Keyed + Deserialize<'de>,
{
    /// The lenient ("soft") decoder: every value is re-keyed from its own
    /// projection, silently ignoring the JSON object key it was stored
    /// under. Use [`Hashdict::decode_strict`] when a stored-key/projected-
    /// key mismatch should be reported instead of silently corrected.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: HashMap<String, T> = Deserialize::deserialize(deserializer)?;
        Ok(raw.into_values().collect())
    }
}

impl<T> Hashdict<T>
where
    T: Keyed + serde::de::DeserializeOwned,
    T::Key: fmt::Display,
{
    /// Decode a hashdict from a JSON object, failing if any entry's value
    /// does not hash back to the object key it was stored under.
    ///
    /// This is the "coder" of spec §4.2; [`Hashdict::deserialize`] (used
    /// wherever a hashdict appears as a field of a larger `#[derive(Deserialize)]`
    /// type) is the lenient `softDecoder` instead.
    pub fn decode_strict(value: &serde_json::Value) -> crate::error::Result<Self> {
        let object = value.as_object().ok_or_else(|| crate::error::Error::Decode {
            type_name: "Hashdict",
            message: "expected a JSON object".into(),
        })?;

        let mut dict = Hashdict::new();
        for (stored_key, raw_value) in object {
            let parsed: T = serde_json::from_value(raw_value.clone()).map_err(|e| crate::error::Error::Decode {
                type_name: "Hashdict",
                message: e.to_string(),
            })?;
            let projected = parsed.key().to_string();
            if &projected != stored_key {
                return Err(crate::error::Error::InvariantViolation {
                    message: format!(
                        "invalid hash in hashdict: stored under {stored_key:?}, but value hashes to {projected:?}"
                    ),
                });
            }
            dict.insert(parsed);
        }
        Ok(dict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Item {
        id: String,
        payload: u32,
    }

    impl Keyed for Item {
        type Key = String;

        fn key(&self) -> String {
            self.id.clone()
        }
    }

    #[test]
    fn insert_then_get_roundtrips() {
        let mut dict = Hashdict::new();
        let item = Item { id: "a".into(), payload: 1 };
        dict.insert(item.clone());
        assert_eq!(dict.get(&"a".to_string()), Some(&item));
    }

    #[test]
    fn insert_replaces_prior_entry_under_same_key() {
        let mut dict = Hashdict::new();
        dict.insert(Item { id: "a".into(), payload: 1 });
        let old = dict.insert(Item { id: "a".into(), payload: 2 });
        assert_eq!(old, Some(Item { id: "a".into(), payload: 1 }));
        assert_eq!(dict.get(&"a".to_string()).unwrap().payload, 2);
        assert_eq!(dict.len(), 1);
    }

    #[test]
    fn find_invalid_keys_is_empty_for_well_formed_dict() {
        let mut dict = Hashdict::new();
        dict.insert(Item { id: "a".into(), payload: 1 });
        dict.insert(Item { id: "b".into(), payload: 2 });
        assert!(dict.find_invalid_keys().is_empty());
    }
}
