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

//! Translating a `/sync` response body into an [`EnvelopeUpdate`].
//!
//! The wire shape of `/sync` has stayed close to stable since r0.3.0, but
//! four behavioral generations are distinguished here by what the
//! homeserver has advertised it supports:
//!
//! - [`v1`]: the original shape. `rooms.leave` decodes but nothing acts on
//!   it — a left room simply stops being updated.
//! - [`v2`]: identical to `v1` for translation purposes; kept as its own
//!   module because it is the generation boundary homeservers actually
//!   advertise, even though nothing in the translation changes yet.
//! - [`v3`]: starts acting on `rooms.leave` by forgetting the room.
//! - [`v4`]: in addition to `v3`'s behavior, closes spurious gaps — a
//!   `limited: true` timeline with zero events is treated as contiguous
//!   with the previous sync rather than left as a permanent hole in the
//!   token graph.

pub mod common;
pub mod v1;
pub mod v2;
pub mod v3;
pub mod v4;

use serde_json::Value;

use crate::codec::DecodeLog;
use crate::context::{AdvertisedVersions, Context};
use crate::error::Result;
use crate::update::EnvelopeUpdate;
use crate::versioned::SpecVersion;

/// Which behavioral generation of `/sync` translation to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generation {
    /// r0.3.0 .. v1.0
    V1,
    /// v1.1 .. v1.3
    V2,
    /// v1.4 .. v1.10
    V3,
    /// v1.11 and later
    V4,
}

/// Pick the newest generation the homeserver's advertised versions
/// support, defaulting to [`Generation::V1`] if nothing has been
/// advertised yet.
pub fn select_generation(advertised: Option<&AdvertisedVersions>) -> Generation {
    let Some(advertised) = advertised else { return Generation::V1 };

    let highest = advertised.versions.iter().map(|v| SpecVersion::new(v.clone())).max();

    match highest {
        Some(v) if v >= SpecVersion::new("v1.11") => Generation::V4,
        Some(v) if v >= SpecVersion::new("v1.4") => Generation::V3,
        Some(v) if v >= SpecVersion::new("v1.1") => Generation::V2,
        _ => Generation::V1,
    }
}

/// Translate a `/sync` response body, dispatching to the generation the
/// homeserver has advertised via `context.versions`.
///
/// Returns the update to fold into the envelope (via
/// [`crate::update::apply_envelope_update`]) together with any
/// informational decode logs.
pub fn translate(body: &Value, context: &Context) -> Result<(EnvelopeUpdate, Vec<DecodeLog>)> {
    let prior_next_batch = context.next_batch.as_deref();
    match select_generation(context.versions.as_ref()) {
        Generation::V1 => v1::translate(body, prior_next_batch),
        Generation::V2 => v2::translate(body, prior_next_batch),
        Generation::V3 => v3::translate(body, prior_next_batch),
        Generation::V4 => v4::translate(body, prior_next_batch),
    }
}
