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

//! Arena-stored batches: the timeline's append-only edges.

use ruma::OwnedEventId;
use serde::{Deserialize, Serialize};

use crate::filter::TimelineFilter;
use crate::timeline::token::TokenPtr;

/// Arena handle for a stored batch.
pub type BatchId = u64;

/// A batch as stored in the timeline's arena: events plus the two tokens
/// bounding it and the filter it was fetched under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IBatch {
    /// Events in this batch, oldest first.
    pub events: Vec<OwnedEventId>,
    /// The filter this batch was fetched under.
    pub filter: TimelineFilter,
    /// Token immediately before this batch.
    pub start: TokenPtr,
    /// Token immediately after this batch.
    pub end: TokenPtr,
}

impl IBatch {
    /// Whether this batch carries no events (e.g. a gap-closing batch
    /// inserted purely to bridge two tokens).
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
