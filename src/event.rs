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

//! The event store's record type and its `unsigned` metadata.

use ruma::{OwnedEventId, OwnedRoomId, OwnedUserId};
use serde::{Deserialize, Serialize};

use crate::codec::DecodeLog;
use crate::collections::Keyed;
use crate::timestamp::Timestamp;

/// How deep a `redacted_because` chain may be followed before it is cut
/// off, per spec §9 Open Questions ("a target implementation should enforce
/// a depth limit (suggest 32) and drop the chain with a warning").
pub const MAX_REDACTION_CHAIN_DEPTH: usize = 32;

/// A single room event as stored in an [`crate::room::Room`]'s event store.
///
/// Events are immutable once created; the only thing that can appear to
/// change an event after the fact is a redaction, which arrives as a new
/// event referencing this one through `unsigned.redacted_because`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// The event's own content, opaque to this crate.
    pub content: serde_json::Value,
    /// Globally unique id of this event.
    pub event_id: OwnedEventId,
    /// When the homeserver received this event.
    pub origin_server_ts: Timestamp,
    /// The room this event belongs to.
    pub room_id: OwnedRoomId,
    /// The user who sent this event.
    pub sender: OwnedUserId,
    /// Present and non-null iff this is a state event; `Some("")` is the
    /// common "no sub-key" case, distinct from absence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_key: Option<String>,
    /// The event's `type` field, e.g. `"m.room.message"`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Server-added metadata not covered by the room version's event
    /// format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unsigned: Option<UnsignedData>,
}

impl Keyed for Event {
    type Key = OwnedEventId;

    fn key(&self) -> OwnedEventId {
        self.event_id.clone()
    }
}

impl Event {
    /// Whether this event carries a `state_key`, i.e. is a state event.
    pub fn is_state_event(&self) -> bool {
        self.state_key.is_some()
    }

    /// The event this one redacts, if `unsigned.redacted_because` is
    /// present.
    pub fn redacted_because(&self) -> Option<&Event> {
        self.unsigned.as_ref().and_then(|u| u.redacted_because.as_deref())
    }

    /// Walk the `redacted_because` chain iteratively (never recursively, so
    /// an unexpectedly long or cyclic chain cannot blow the stack),
    /// yielding this event first and then each ancestor in order.
    ///
    /// The walk stops after [`MAX_REDACTION_CHAIN_DEPTH`] steps even if the
    /// chain continues; callers that need to know whether truncation
    /// happened should use [`Event::redaction_chain_with_logs`].
    pub fn redaction_chain(&self) -> Vec<&Event> {
        self.redaction_chain_with_logs().0
    }

    /// Like [`Event::redaction_chain`], but also returns a
    /// [`DecodeLog::RedactionChainTruncated`] entry if the chain was cut
    /// off before reaching its natural end.
    pub fn redaction_chain_with_logs(&self) -> (Vec<&Event>, Vec<DecodeLog>) {
        let mut chain = vec![self];
        let mut current = self;
        let mut depth = 0usize;
        while let Some(next) = current.redacted_because() {
            depth += 1;
            if depth >= MAX_REDACTION_CHAIN_DEPTH {
                return (
                    chain,
                    vec![DecodeLog::RedactionChainTruncated { depth }],
                );
            }
            chain.push(next);
            current = next;
        }
        (chain, Vec::new())
    }
}

/// Server-added metadata carried alongside an event's own content.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnsignedData {
    /// Milliseconds since this event was sent, as measured by the
    /// homeserver that served it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<i64>,
    /// The event's content immediately before this event, present for some
    /// state events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_content: Option<serde_json::Value>,
    /// The event that redacted this one, if any. Self-referential:
    /// a redaction event's own `unsigned` may in turn carry its own
    /// `redacted_because`, hence [`Event::redaction_chain`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redacted_because: Option<Box<Event>>,
    /// Client-chosen transaction id, present when this event was sent by
    /// the current device.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    /// The sender's membership at the time of this event (spec ≥ v1.11).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub membership: Option<String>,
}

/// A minimal event used for ephemeral room data and pre-join invite state.
///
/// Named and shaped per spec §9 Open Questions: the source leaves this
/// type's name and description as `Debug.todo`, so it is treated here as a
/// real, documented type rather than a stub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrippedEvent {
    /// The event's own content, opaque to this crate.
    pub content: serde_json::Value,
    /// The event's `type` field.
    #[serde(rename = "type")]
    pub event_type: String,
}
