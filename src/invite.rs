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

//! Minimal pre-join room state, as handed out by `/sync`'s `invite` block.

use ruma::OwnedRoomId;
use serde::{Deserialize, Serialize};

use crate::collections::Keyed;
use crate::event::StrippedEvent;

/// The stripped state set a homeserver sends for a room the user has been
/// invited to but not yet joined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invite {
    /// The room being invited to.
    pub room_id: OwnedRoomId,
    /// Stripped state events describing the room well enough to preview it
    /// (name, topic, who invited you, ...).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invite_state: Vec<StrippedEvent>,
}

impl Keyed for Invite {
    type Key = OwnedRoomId;

    fn key(&self) -> OwnedRoomId {
        self.room_id.clone()
    }
}

impl Invite {
    /// A new invite with no stripped state yet.
    pub fn new(room_id: OwnedRoomId) -> Self {
        Invite { room_id, invite_state: Vec::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ruma::room_id;

    #[test]
    fn invite_key_matches_room_id() {
        let invite = Invite::new(room_id!("!r:example.org").to_owned());
        assert_eq!(invite.key(), invite.room_id);
    }
}
