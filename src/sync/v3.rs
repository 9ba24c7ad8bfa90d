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

//! Translation for the v1.4 .. v1.10 `/sync` shape.
//!
//! Starting here, `rooms.leave` is acted on: a room present in that block
//! is forgotten outright via [`VaultUpdate::RemoveRoom`]. Earlier
//! generations decode the block but leave the room untouched.

use serde_json::Value;

use crate::codec::DecodeLog;
use crate::error::Result;
use crate::update::{EnvelopeUpdate, VaultUpdate};

use super::common;

/// Translate a v3-generation `/sync` response body.
pub fn translate(body: &Value, prior_next_batch: Option<&str>) -> Result<(EnvelopeUpdate, Vec<DecodeLog>)> {
    let response = common::parse(body)?;

    let mut updates = common::global_account_data_update(&response.account_data);
    updates.extend(common::joined_rooms_update(
        &response.rooms.join,
        prior_next_batch,
        &response.next_batch,
        |timeline, prior_next_batch, next_batch| vec![common::timeline_batch(timeline, prior_next_batch, next_batch)],
    ));
    updates.extend(common::invited_rooms_update(&response.rooms.invite));
    updates.extend(common::left_rooms_update(&response.rooms.leave));

    updates.push(VaultUpdate::SetNextBatch(Some(response.next_batch.clone())));

    let envelope_update = EnvelopeUpdate::Multiple(vec![
        EnvelopeUpdate::Content(VaultUpdate::Multiple(updates)),
        EnvelopeUpdate::Context(crate::update::ContextUpdate::SetNextBatch(Some(response.next_batch))),
    ]);

    Ok((envelope_update, Vec::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ruma::room_id;
    use serde_json::json;

    #[test]
    fn left_room_is_removed() {
        let body = json!({
            "next_batch": "s2",
            "rooms": {
                "leave": {
                    "!r:example.org": { "timeline": { "events": [] } }
                }
            }
        });

        let (update, _) = translate(&body, Some("s1")).unwrap();
        let EnvelopeUpdate::Multiple(updates) = update else { panic!("expected Multiple") };
        let EnvelopeUpdate::Content(VaultUpdate::Multiple(vault_updates)) = &updates[0] else {
            panic!("expected content update")
        };
        let room_id = room_id!("!r:example.org").to_owned();
        assert!(vault_updates.iter().any(|u| matches!(u, VaultUpdate::RemoveRoom(r) if *r == room_id)));
    }
}
