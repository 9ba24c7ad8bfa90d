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

//! Wire shapes and translation helpers shared by every `/sync` schema
//! generation.
//!
//! The raw shapes below decode the parts of a `/sync` response every
//! generation from r0.3.0 through v1.11 agrees on; each versioned module
//! builds on top of them rather than redefining its own.

use std::collections::BTreeMap;

use ruma::OwnedRoomId;
use serde::Deserialize;
use serde_json::Value;

use crate::codec::DecodeLog;
use crate::error::{Error, Result};
use crate::event::{Event, StrippedEvent};
use crate::filter::TimelineFilter;
use crate::timeline::Batch;
use crate::update::{RoomUpdate, VaultUpdate};

/// One entry of an `account_data`/`ephemeral` events array: just enough
/// structure to recover a type and a content value.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAccountDataEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub content: Value,
}

/// An `account_data` or `ephemeral` block: `{ "events": [...] }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEventList {
    #[serde(default)]
    pub events: Vec<RawAccountDataEvent>,
}

/// A room's `timeline` block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTimeline {
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub limited: bool,
    #[serde(default)]
    pub prev_batch: Option<String>,
}

/// A room's `state` block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawState {
    #[serde(default)]
    pub events: Vec<Event>,
}

/// A room's `invite_state` block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawInviteState {
    #[serde(default)]
    pub events: Vec<StrippedEvent>,
}

/// One entry of `rooms.join`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawJoinedRoom {
    #[serde(default)]
    pub account_data: RawEventList,
    #[serde(default)]
    pub ephemeral: RawEventList,
    #[serde(default)]
    pub state: RawState,
    #[serde(default)]
    pub timeline: RawTimeline,
}

/// One entry of `rooms.invite`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawInvitedRoom {
    #[serde(default)]
    pub invite_state: RawInviteState,
}

/// One entry of `rooms.leave`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLeftRoom {
    #[serde(default)]
    pub account_data: RawEventList,
    #[serde(default)]
    pub state: RawState,
    #[serde(default)]
    pub timeline: RawTimeline,
}

/// The `rooms` block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRooms {
    #[serde(default)]
    pub join: BTreeMap<OwnedRoomId, RawJoinedRoom>,
    #[serde(default)]
    pub invite: BTreeMap<OwnedRoomId, RawInvitedRoom>,
    #[serde(default)]
    pub leave: BTreeMap<OwnedRoomId, RawLeftRoom>,
}

/// A full `/sync` response, common to every schema generation handled here.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSyncResponse {
    pub next_batch: String,
    #[serde(default)]
    pub rooms: RawRooms,
    #[serde(default)]
    pub account_data: RawEventList,
}

/// Parse the raw JSON body of a `/sync` response.
pub fn parse(body: &Value) -> Result<RawSyncResponse> {
    serde_json::from_value(body.clone())
        .map_err(|e| Error::Decode { type_name: "RawSyncResponse", message: e.to_string() })
}

/// Turn an events-array block into `(type, content)` pairs, later vs
/// account data of a [`crate::vault::Vault`] or [`crate::room::Room`].
pub fn account_data_pairs(list: &RawEventList) -> Vec<(String, Value)> {
    list.events.iter().map(|e| (e.event_type.clone(), e.content.clone())).collect()
}

/// Turn an `ephemeral`/`invite_state` events array into stripped events.
pub fn stripped_events(events: &[RawAccountDataEvent]) -> Vec<StrippedEvent> {
    events.iter().map(|e| StrippedEvent { content: e.content.clone(), event_type: e.event_type.clone() }).collect()
}

/// Build the [`Batch`] for one joined room's `timeline` block.
///
/// The start token is the room's own `prev_batch` whenever the homeserver
/// sent one, regardless of `limited` — a homeserver is free to include
/// `prev_batch` on an unlimited timeline too, and when it does that token is
/// what actually precedes the batch. Only when `prev_batch` is absent does
/// the batch start where the client's own `next_batch` cursor from before
/// this sync left off, meaning the two batches are contiguous.
pub fn timeline_batch(timeline: &RawTimeline, prior_next_batch: Option<&str>, next_batch: &str) -> Batch {
    let start = timeline.prev_batch.clone().or_else(|| prior_next_batch.map(|s| s.to_string()));

    Batch {
        events: timeline.events.iter().map(|e| e.event_id.clone()).collect(),
        filter: TimelineFilter::unrestricted(),
        start,
        end: next_batch.to_string(),
    }
}

/// Build the full [`RoomUpdate::Multiple`] for one joined room: state
/// events recorded first (so the timeline events that follow see current
/// state), then the timeline batch or batches, then account data and
/// ephemeral events.
///
/// `batches` is built by the caller (via [`timeline_batch`] or a
/// generation-specific variant) so that each schema generation can decide
/// its own start-token logic — and, for generations that need to emit a
/// gap-closing bridge batch alongside the real one, how many batches there
/// are — without duplicating the rest of this function.
pub fn joined_room_update(raw: &RawJoinedRoom, batches: Vec<Batch>) -> RoomUpdate {
    let mut updates = Vec::new();

    for event in &raw.state.events {
        updates.push(RoomUpdate::AddEvent(event.clone()));
    }
    for event in &raw.timeline.events {
        updates.push(RoomUpdate::AddEvent(event.clone()));
    }

    for batch in batches {
        updates.push(RoomUpdate::AddSyncBatch(batch));
    }

    for (event_type, content) in account_data_pairs(&raw.account_data) {
        updates.push(RoomUpdate::SetAccountData(event_type, content));
    }
    for event in stripped_events(&raw.ephemeral.events) {
        updates.push(RoomUpdate::AddEphemeral(event));
    }

    RoomUpdate::Multiple(updates)
}

/// Build the `VaultUpdate` for every joined room in a response, using
/// `build_batches` to turn each room's raw timeline into the [`Batch`]es it
/// contributes (ordinarily one, but a generation may contribute more, e.g.
/// a gap-closing bridge ahead of the real batch).
pub fn joined_rooms_update(
    rooms: &BTreeMap<OwnedRoomId, RawJoinedRoom>,
    prior_next_batch: Option<&str>,
    next_batch: &str,
    build_batches: impl Fn(&RawTimeline, Option<&str>, &str) -> Vec<Batch>,
) -> Vec<VaultUpdate> {
    rooms
        .iter()
        .flat_map(|(room_id, raw)| {
            let batches = build_batches(&raw.timeline, prior_next_batch, next_batch);
            [
                VaultUpdate::CreateRoomIfNotExists(room_id.clone()),
                VaultUpdate::UpdateRoom(room_id.clone(), joined_room_update(raw, batches)),
            ]
        })
        .collect()
}

/// Build the `VaultUpdate`s that forget every room in `rooms.leave`.
///
/// Only acted on by schema generations that have decided to garbage
/// collect left rooms (see each `vN` module); generations that don't call
/// this still decode `rooms.leave` via [`RawRooms`], they just never call
/// this function.
pub fn left_rooms_update(rooms: &BTreeMap<OwnedRoomId, RawLeftRoom>) -> Vec<VaultUpdate> {
    rooms.keys().map(|room_id| VaultUpdate::RemoveRoom(room_id.clone())).collect()
}

/// Build the `VaultUpdate` for every pending invite in a response.
pub fn invited_rooms_update(rooms: &BTreeMap<OwnedRoomId, RawInvitedRoom>) -> Vec<VaultUpdate> {
    rooms
        .iter()
        .map(|(room_id, raw)| VaultUpdate::SetInvite(room_id.clone(), raw.invite_state.events.clone()))
        .collect()
}

/// Build the top-level account data `VaultUpdate`s.
pub fn global_account_data_update(list: &RawEventList) -> Vec<VaultUpdate> {
    account_data_pairs(list).into_iter().map(|(event_type, content)| VaultUpdate::SetAccountData(event_type, content)).collect()
}

/// A `DecodeLog`-style note about something elided while translating a
/// `/sync` response; translation itself never fails on an empty section,
/// so this is purely informational.
pub fn note_empty_section_skipped(section: &'static str) -> DecodeLog {
    DecodeLog::DefaultedMissingField { type_name: "RawSyncResponse", field: section }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_decodes_minimal_response() {
        let body = json!({ "next_batch": "s1" });
        let response = parse(&body).unwrap();
        assert_eq!(response.next_batch, "s1");
        assert!(response.rooms.join.is_empty());
    }

    #[test]
    fn timeline_batch_uses_prior_next_batch_when_prev_batch_absent() {
        let timeline = RawTimeline { events: Vec::new(), limited: false, prev_batch: None };
        let batch = timeline_batch(&timeline, Some("s1"), "s2");
        assert_eq!(batch.start.as_deref(), Some("s1"));
        assert_eq!(batch.end, "s2");
    }

    #[test]
    fn timeline_batch_prefers_prev_batch_when_limited() {
        let timeline = RawTimeline { events: Vec::new(), limited: true, prev_batch: Some("gap".to_string()) };
        let batch = timeline_batch(&timeline, Some("s1"), "s2");
        assert_eq!(batch.start.as_deref(), Some("gap"));
    }

    #[test]
    fn timeline_batch_prefers_prev_batch_even_when_not_limited() {
        // A homeserver may send `prev_batch` on an unlimited timeline too;
        // the start token follows whatever token actually precedes the
        // batch, not the `limited` flag.
        let timeline = RawTimeline { events: Vec::new(), limited: false, prev_batch: Some("gap".to_string()) };
        let batch = timeline_batch(&timeline, Some("s1"), "s2");
        assert_eq!(batch.start.as_deref(), Some("gap"));
    }
}
