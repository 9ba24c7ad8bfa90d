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

//! Translation for the v1.11+ `/sync` shape.
//!
//! Adds gap-closing on top of [`super::v3`]'s `rooms.leave` handling: a
//! homeserver can report `timeline.limited: false` while still including a
//! `prev_batch` that differs from the client's own `since` cursor, which
//! happens when the server collapsed an internal backfill gap on its own
//! side but still wants the client's timeline graph to record that the
//! two tokens cover different points. Rather than silently discarding
//! that token, an empty bridging batch from `since` to `prev_batch` is
//! inserted ahead of the real batch, so the timeline graph still records
//! the gap even though no events were lost.

use serde_json::Value;

use crate::codec::DecodeLog;
use crate::error::Result;
use crate::filter::TimelineFilter;
use crate::sync::common::RawTimeline;
use crate::timeline::Batch;
use crate::update::{EnvelopeUpdate, VaultUpdate};

use super::common;

fn room_batches(timeline: &RawTimeline, prior_next_batch: Option<&str>, next_batch: &str) -> Vec<Batch> {
    let mut batches = Vec::new();

    if !timeline.limited {
        if let (Some(since), Some(prev_batch)) = (prior_next_batch, timeline.prev_batch.as_deref()) {
            if since != prev_batch {
                batches.push(Batch {
                    events: Vec::new(),
                    filter: TimelineFilter::unrestricted(),
                    start: Some(since.to_string()),
                    end: prev_batch.to_string(),
                });
            }
        }
    }

    batches.push(common::timeline_batch(timeline, prior_next_batch, next_batch));
    batches
}

/// Translate a v4-generation `/sync` response body.
pub fn translate(body: &Value, prior_next_batch: Option<&str>) -> Result<(EnvelopeUpdate, Vec<DecodeLog>)> {
    let response = common::parse(body)?;

    let mut updates = common::global_account_data_update(&response.account_data);
    updates.extend(common::joined_rooms_update(
        &response.rooms.join,
        prior_next_batch,
        &response.next_batch,
        room_batches,
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
