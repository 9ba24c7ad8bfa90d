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

//! `Iddict`: an arena keyed by monotonically-assigned integer handles.
//!
//! This is the storage backing the timeline's batch arena: batches are
//! append-only and referenced by a stable `u64` handle for the lifetime of
//! the timeline, and handles are never reused even after a batch is
//! removed, so older `BatchPtr`s captured elsewhere in the graph never
//! silently start pointing at a different batch.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// An arena of `T` keyed by monotonically-assigned `u64` ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Iddict<T> {
    items: BTreeMap<u64, T>,
    cursor: u64,
}

impl<T> Default for Iddict<T> {
    fn default() -> Self {
        Iddict { items: BTreeMap::new(), cursor: 0 }
    }
}

impl<T> Iddict<T> {
    /// An empty arena whose cursor starts at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `value`, returning the id it was assigned.
    ///
    /// The assigned id is always `>=` every id ever issued by this arena,
    /// including ids whose entries have since been removed.
    pub fn insert(&mut self, value: T) -> u64 {
        let id = self.cursor;
        self.cursor += 1;
        self.items.insert(id, value);
        id
    }

    /// Look up an entry by id.
    pub fn get(&self, id: u64) -> Option<&T> {
        self.items.get(&id)
    }

    /// Look up an entry by id, mutably.
    pub fn get_mut(&mut self, id: u64) -> Option<&mut T> {
        self.items.get_mut(&id)
    }

    /// Remove and return the entry under `id`. The id itself is never
    /// reissued.
    pub fn remove(&mut self, id: u64) -> Option<T> {
        self.items.remove(&id)
    }

    /// The next id this arena would assign.
    ///
    /// Preserved across (de)serialization so that, after a reload, newly
    /// inserted entries still never collide with ids issued before the
    /// reload.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Force the cursor forward, e.g. when restoring from a persisted
    /// value. Never moves the cursor backwards.
    pub fn advance_cursor_to(&mut self, at_least: u64) {
        self.cursor = self.cursor.max(at_least);
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the arena holds no entries.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over `(id, value)` pairs in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &T)> {
        self.items.iter().map(|(id, value)| (*id, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_yields_fresh_key_and_grows_size() {
        let mut dict: Iddict<&str> = Iddict::new();
        let k1 = dict.insert("a");
        let k2 = dict.insert("b");
        assert_ne!(k1, k2);
        assert_eq!(dict.get(k1), Some(&"a"));
        assert_eq!(dict.get(k2), Some(&"b"));
        assert_eq!(dict.len(), 2);
    }

    #[test]
    fn removed_keys_are_never_reused() {
        let mut dict: Iddict<&str> = Iddict::new();
        let k1 = dict.insert("a");
        dict.remove(k1);
        let k2 = dict.insert("b");
        assert_ne!(k1, k2);
        assert!(k2 > k1);
    }

    #[test]
    fn cursor_is_monotonic_and_advanceable() {
        let mut dict: Iddict<&str> = Iddict::new();
        dict.insert("a");
        dict.insert("b");
        let cursor = dict.cursor();
        assert_eq!(cursor, 2);
        dict.advance_cursor_to(10);
        assert_eq!(dict.cursor(), 10);
        dict.advance_cursor_to(1);
        assert_eq!(dict.cursor(), 10);
    }
}
