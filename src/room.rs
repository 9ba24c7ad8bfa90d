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

//! A single room: its account data, ephemeral events, event store, current
//! state, and timeline.

use std::collections::BTreeMap;

use ruma::OwnedRoomId;
use serde::{Deserialize, Serialize};

use crate::collections::{Hashdict, Keyed};
use crate::event::{Event, StrippedEvent};
use crate::filter::TimelineFilter;
use crate::state::StateManager;
use crate::timeline::Timeline;

/// A room the current user is (or was) a member of.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    /// This room's id.
    pub room_id: OwnedRoomId,
    /// Private data this user has attached to the room.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub account_data: BTreeMap<String, serde_json::Value>,
    /// Ephemeral events not recorded in the timeline or state, e.g.
    /// typing notifications.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ephemeral: Vec<StrippedEvent>,
    /// Every event this room has ever seen, keyed by event id.
    #[serde(default)]
    pub events: Hashdict<Event>,
    /// The room's current state.
    #[serde(default)]
    pub state: StateManager,
    /// The room's timeline graph.
    #[serde(default)]
    pub timeline: Timeline,
}

impl Keyed for Room {
    type Key = OwnedRoomId;

    fn key(&self) -> OwnedRoomId {
        self.room_id.clone()
    }
}

impl Room {
    /// A freshly created, empty room.
    pub fn new(room_id: OwnedRoomId) -> Self {
        Room {
            room_id,
            account_data: BTreeMap::new(),
            ephemeral: Vec::new(),
            events: Hashdict::new(),
            state: StateManager::new(),
            timeline: Timeline::new(),
        }
    }

    /// Add an event to the event store, and to current state if it carries
    /// a state key.
    pub fn add_event(&mut self, event: Event) {
        if event.is_state_event() {
            self.state.insert(event.clone());
        }
        self.events.insert(event);
    }

    /// The most recent timeline events under `filter`, with the filter
    /// applied to whatever a batch's own (possibly broader) filter
    /// returned — see spec §4.3's filter-interaction rules: the timeline
    /// only guarantees `subset_of(filter, batch.filter)`, so a batch whose
    /// filter is strictly broader than the one requested here must be
    /// narrowed locally using the event store.
    pub fn most_recent_events(&self, filter: &TimelineFilter) -> Vec<Vec<&Event>> {
        self.timeline
            .most_recent_events(filter)
            .into_iter()
            .map(|candidate| {
                candidate
                    .into_iter()
                    .filter_map(|event_id| self.events.get(&event_id))
                    .filter(|event| filter.pass(&event.event_type))
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::Batch;
    use ruma::{event_id, room_id, user_id};
    use serde_json::json;

    fn event(id: &str, event_type: &str) -> Event {
        Event {
            content: json!({}),
            event_id: ruma::EventId::parse(id).unwrap(),
            origin_server_ts: crate::timestamp::Timestamp::from_millis(0),
            room_id: room_id!("!r:example.org").to_owned(),
            sender: user_id!("@alice:example.org").to_owned(),
            state_key: None,
            event_type: event_type.into(),
            unsigned: None,
        }
    }

    #[test]
    fn most_recent_events_locally_narrows_a_broader_batch_filter() {
        let mut room = Room::new(room_id!("!r:example.org").to_owned());
        let e1 = event("$e1:example.org", "m.room.message");
        let e2 = event("$e2:example.org", "m.room.member");
        room.add_event(e1.clone());
        room.add_event(e2.clone());

        room.timeline.add_sync(Batch {
            events: vec![e1.event_id.clone(), e2.event_id.clone()],
            filter: TimelineFilter::unrestricted(),
            start: None,
            end: "s1".into(),
        });

        let narrow = TimelineFilter::with_types(["m.room.message".to_string()]);
        let results = room.most_recent_events(&narrow);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].len(), 1);
        assert_eq!(results[0][0].event_id, e1.event_id);
    }

    #[test]
    fn room_key_matches_room_id() {
        let room = Room::new(room_id!("!r:example.org").to_owned());
        assert_eq!(room.key(), room.room_id);
    }
}
