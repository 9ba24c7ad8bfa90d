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

//! Translation for the original `/sync` shape (r0.3.0 .. v1.0).
//!
//! `rooms.leave` is decoded — a homeserver running this old a version
//! still sends it — but nothing here acts on it: a room the user left
//! simply stops receiving timeline updates and is left in the vault as-is.

use serde_json::Value;

use crate::codec::DecodeLog;
use crate::error::Result;
use crate::update::{EnvelopeUpdate, VaultUpdate};

use super::common;

/// Translate a v1-generation `/sync` response body.
pub fn translate(body: &Value, prior_next_batch: Option<&str>) -> Result<(EnvelopeUpdate, Vec<DecodeLog>)> {
    let response = common::parse(body)?;
    let mut logs = Vec::new();

    let mut updates = common::global_account_data_update(&response.account_data);
    updates.extend(common::joined_rooms_update(
        &response.rooms.join,
        prior_next_batch,
        &response.next_batch,
        |timeline, prior_next_batch, next_batch| vec![common::timeline_batch(timeline, prior_next_batch, next_batch)],
    ));
    updates.extend(common::invited_rooms_update(&response.rooms.invite));

    if !response.rooms.leave.is_empty() {
        logs.push(common::note_empty_section_skipped("rooms.leave"));
    }

    updates.push(VaultUpdate::SetNextBatch(Some(response.next_batch.clone())));

    let envelope_update = EnvelopeUpdate::Multiple(vec![
        EnvelopeUpdate::Content(VaultUpdate::Multiple(updates)),
        EnvelopeUpdate::Context(crate::update::ContextUpdate::SetNextBatch(Some(response.next_batch))),
    ]);

    Ok((envelope_update, logs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn left_rooms_are_decoded_but_produce_no_room_removal() {
        let body = json!({
            "next_batch": "s2",
            "rooms": {
                "leave": {
                    "!r:example.org": { "timeline": { "events": [] } }
                }
            }
        });

        let (update, logs) = translate(&body, Some("s1")).unwrap();
        assert!(!logs.is_empty());

        let EnvelopeUpdate::Multiple(updates) = update else { panic!("expected Multiple") };
        let EnvelopeUpdate::Content(VaultUpdate::Multiple(vault_updates)) = &updates[0] else {
            panic!("expected content update")
        };
        assert!(!vault_updates.iter().any(|u| matches!(u, VaultUpdate::RemoveRoom(_))));
    }

    #[test]
    fn empty_response_still_advances_next_batch() {
        let body = json!({ "next_batch": "s1" });
        let (update, _) = translate(&body, None).unwrap();
        let EnvelopeUpdate::Multiple(updates) = update else { panic!("expected Multiple") };
        assert!(matches!(
            &updates[1],
            EnvelopeUpdate::Context(crate::update::ContextUpdate::SetNextBatch(Some(s))) if s == "s1"
        ));
    }
}
