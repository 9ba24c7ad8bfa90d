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

//! The root aggregate: every room, every pending invite, global account
//! data, and the `/sync` cursor.

use std::collections::BTreeMap;

use ruma::OwnedRoomId;
use serde::{Deserialize, Serialize};

use crate::collections::Hashdict;
use crate::invite::Invite;
use crate::room::Room;

/// The full client-side view of a Matrix account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vault {
    /// Private data this account has stored on the server, outside any
    /// particular room.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub account_data: BTreeMap<String, serde_json::Value>,
    /// Rooms the user has been invited to but not joined, keyed by room id.
    #[serde(default)]
    pub invites: Hashdict<Invite>,
    /// The cursor to resume `/sync` from, if a sync has ever completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_batch: Option<String>,
    /// Rooms the user is a member of (or was, for left/banned rooms that
    /// have not been garbage collected), keyed by room id.
    #[serde(default)]
    pub rooms: Hashdict<Room>,
}

impl Vault {
    /// An empty vault: no rooms, no invites, no sync cursor yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a room by id.
    pub fn room(&self, room_id: &OwnedRoomId) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    /// Look up a room by id, mutably.
    pub fn room_mut(&mut self, room_id: &OwnedRoomId) -> Option<&mut Room> {
        self.rooms.get_mut(room_id)
    }

    /// Ensure a room with `room_id` exists, creating an empty one if not.
    pub fn ensure_room(&mut self, room_id: &OwnedRoomId) -> &mut Room {
        if !self.rooms.contains_key(room_id) {
            self.rooms.insert(Room::new(room_id.clone()));
        }
        self.rooms.get_mut(room_id).expect("just ensured")
    }

    /// Look up a pending invite by room id.
    pub fn invite(&self, room_id: &OwnedRoomId) -> Option<&Invite> {
        self.invites.get(room_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ruma::room_id;

    #[test]
    fn ensure_room_creates_then_reuses() {
        let mut vault = Vault::new();
        let room_id = room_id!("!r:example.org").to_owned();
        vault.ensure_room(&room_id);
        assert_eq!(vault.rooms.len(), 1);
        vault.ensure_room(&room_id);
        assert_eq!(vault.rooms.len(), 1);
    }

    #[test]
    fn fresh_vault_has_no_next_batch() {
        let vault = Vault::new();
        assert_eq!(vault.next_batch, None);
        assert!(vault.rooms.is_empty());
        assert!(vault.invites.is_empty());
    }
}
