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

//! A room's current-state index.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::event::Event;

/// A key identifying one slot of room state: an event type paired with a
/// state key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberKey {
    /// The state event's type, e.g. `"m.room.member"`.
    pub event_type: String,
    /// The state event's state key, e.g. a user id for membership events.
    pub state_key: String,
}

impl MemberKey {
    /// Build a member key from its two parts.
    pub fn new(event_type: impl Into<String>, state_key: impl Into<String>) -> Self {
        MemberKey { event_type: event_type.into(), state_key: state_key.into() }
    }
}

/// Two-level index of a room's current state: event type, then state key.
///
/// Empty inner maps are pruned immediately so that `len()` and iteration
/// never observe a type with zero state keys under it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateManager {
    state: HashMap<String, HashMap<String, Event>>,
}

impl StateManager {
    /// An empty state manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a state event. A no-op if `event` carries no `state_key`.
    pub fn insert(&mut self, event: Event) {
        let Some(state_key) = event.state_key.clone() else { return };
        self.state.entry(event.event_type.clone()).or_default().insert(state_key, event);
    }

    /// Look up the current state event for `(event_type, state_key)`.
    pub fn get(&self, event_type: &str, state_key: &str) -> Option<&Event> {
        self.state.get(event_type)?.get(state_key)
    }

    /// Look up the current state event by [`MemberKey`].
    pub fn get_by_key(&self, key: &MemberKey) -> Option<&Event> {
        self.get(&key.event_type, &key.state_key)
    }

    /// All state keys (and their events) currently stored under
    /// `event_type`.
    pub fn by_type(&self, event_type: &str) -> impl Iterator<Item = (&str, &Event)> {
        self.state
            .get(event_type)
            .into_iter()
            .flat_map(|inner| inner.iter().map(|(k, v)| (k.as_str(), v)))
    }

    /// Remove the state event at `(event_type, state_key)`, pruning the
    /// inner map if it becomes empty.
    pub fn remove(&mut self, event_type: &str, state_key: &str) -> Option<Event> {
        let inner = self.state.get_mut(event_type)?;
        let removed = inner.remove(state_key);
        if inner.is_empty() {
            self.state.remove(event_type);
        }
        removed
    }

    /// Total number of state events across all types.
    pub fn len(&self) -> usize {
        self.state.values().map(|inner| inner.len()).sum()
    }

    /// Whether this state manager holds no state events.
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ruma::{event_id, room_id, user_id};
    use serde_json::json;

    fn member_event(state_key: &str) -> Event {
        Event {
            content: json!({"membership": "join"}),
            event_id: event_id!("$e1:example.org").to_owned(),
            origin_server_ts: crate::timestamp::Timestamp::from_millis(0),
            room_id: room_id!("!r:example.org").to_owned(),
            sender: user_id!("@alice:example.org").to_owned(),
            state_key: Some(state_key.to_string()),
            event_type: "m.room.member".into(),
            unsigned: None,
        }
    }

    fn non_state_event() -> Event {
        let mut e = member_event("unused");
        e.state_key = None;
        e.event_type = "m.room.message".into();
        e
    }

    #[test]
    fn insert_without_state_key_is_noop() {
        let mut state = StateManager::new();
        state.insert(non_state_event());
        assert!(state.is_empty());
    }

    #[test]
    fn member_key_is_o1_lookup() {
        let mut state = StateManager::new();
        state.insert(member_event("@alice:example.org"));
        let key = MemberKey::new("m.room.member", "@alice:example.org");
        assert!(state.get_by_key(&key).is_some());
    }

    #[test]
    fn empty_inner_maps_are_pruned_on_remove() {
        let mut state = StateManager::new();
        state.insert(member_event("@alice:example.org"));
        assert_eq!(state.len(), 1);
        state.remove("m.room.member", "@alice:example.org");
        assert!(state.is_empty());
        assert!(state.by_type("m.room.member").next().is_none());
    }
}
