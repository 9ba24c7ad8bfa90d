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

//! The timeline reconciler: a token-linked graph of event batches that can
//! be queried for "most recent events under filter F" even when those
//! batches were fetched under different filters, in any temporal order,
//! and with gaps between them.
//!
//! Matrix exposes two endpoints (`/sync` and `/messages`) that each return
//! a batch of events bounded by two tokens, possibly under different
//! filters and possibly discovered in an order that does not match their
//! chronological order. A client cannot merge these deterministically
//! without more calls, so a [`Timeline`] stores batches as-is and answers
//! queries by walking the resulting graph — see [`Timeline::most_recent_events`].

mod batch;
mod query;
mod token;

pub use batch::{BatchId, IBatch};
pub use query::QueryOutcome;
pub use token::{IToken, TokenName, TokenPtr};

use ruma::OwnedEventId;
use serde::{Deserialize, Serialize};

use crate::collections::{Hashdict, Iddict};
use crate::filter::TimelineFilter;

/// A logical batch of events as handed to [`Timeline::insert`] /
/// [`Timeline::add_sync`]: a contiguous slice bounded by two tokens (the
/// start may be absent, meaning "the start of the timeline") and tagged
/// with the filter it was fetched under.
#[derive(Debug, Clone)]
pub struct Batch {
    /// Events in this batch, oldest first.
    pub events: Vec<OwnedEventId>,
    /// The filter this batch was fetched under.
    pub filter: TimelineFilter,
    /// The token immediately before this batch's first event, or `None` if
    /// this batch reaches all the way back to the start of the room.
    pub start: Option<TokenName>,
    /// The token immediately after this batch's last event.
    pub end: TokenName,
}

/// The token-linked batch graph for one room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeline {
    batches: Iddict<IBatch>,
    events: std::collections::HashMap<OwnedEventId, Vec<BatchId>>,
    filled_batch_count: usize,
    most_recent_sync: TokenPtr,
    tokens: Hashdict<IToken>,
}

impl Default for Timeline {
    fn default() -> Self {
        Timeline {
            batches: Iddict::new(),
            events: std::collections::HashMap::new(),
            filled_batch_count: 0,
            most_recent_sync: TokenPtr::StartOfTimeline,
            tokens: Hashdict::new(),
        }
    }
}

impl Timeline {
    /// An empty timeline, with `most_recent_sync` at the start of the room.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of batches whose event list is non-empty.
    pub fn filled_batch_count(&self) -> usize {
        self.filled_batch_count
    }

    /// The token a plain [`Timeline::most_recent_events`] query walks
    /// backward from.
    pub fn most_recent_sync(&self) -> &TokenPtr {
        &self.most_recent_sync
    }

    /// Materialize a token node if it does not already exist.
    fn invoke_token(&mut self, ptr: &TokenPtr) {
        if let TokenPtr::Token(name) = ptr {
            if !self.tokens.contains_key(name) {
                self.tokens.insert(IToken::new(name.clone()));
            }
        }
    }

    /// Insert a batch, linking its tokens and indexing its events.
    ///
    /// Returns the arena id assigned to the new batch.
    pub fn insert(&mut self, batch: Batch) -> BatchId {
        let start_ptr = match &batch.start {
            Some(name) => TokenPtr::Token(name.clone()),
            None => TokenPtr::StartOfTimeline,
        };
        let end_ptr = TokenPtr::Token(batch.end.clone());

        self.invoke_token(&start_ptr);
        self.invoke_token(&end_ptr);

        let has_events = !batch.events.is_empty();
        let ibatch = IBatch {
            events: batch.events.clone(),
            filter: batch.filter,
            start: start_ptr.clone(),
            end: end_ptr.clone(),
        };
        let batch_id = self.batches.insert(ibatch);

        if let TokenPtr::Token(name) = &start_ptr {
            self.tokens.get_mut(name).expect("just invoked").starts.insert(batch_id);
        }
        if let TokenPtr::Token(name) = &end_ptr {
            self.tokens.get_mut(name).expect("just invoked").ends.insert(batch_id);
        }

        for event_id in &batch.events {
            self.events.entry(event_id.clone()).or_default().push(batch_id);
        }

        if has_events {
            self.filled_batch_count += 1;
        }

        tracing::trace!(batch_id, start = ?batch.start, end = %batch.end, "inserted timeline batch");
        batch_id
    }

    /// Insert a batch as the result of a `/sync` request.
    ///
    /// Identical to [`Timeline::insert`], but additionally records that
    /// `batch.end` is strictly ahead (in wall time) of whatever token
    /// `most_recent_sync` currently points at, and advances
    /// `most_recent_sync` to `batch.end`.
    pub fn add_sync(&mut self, batch: Batch) -> BatchId {
        let prior = self.most_recent_sync.clone();
        let end_name = batch.end.clone();
        let batch_id = self.insert(batch);

        if let TokenPtr::Token(prior_name) = &prior {
            if prior_name != &end_name {
                self.invoke_token(&TokenPtr::Token(end_name.clone()));
                // `prior` is behind `end`: `end` is in front of `prior`.
                self.tokens.get_mut(prior_name).expect("invoked").behind.insert(end_name.clone());
                self.tokens
                    .get_mut(&end_name)
                    .expect("invoked by insert")
                    .in_front_of
                    .insert(prior_name.clone());
            }
        }

        self.most_recent_sync = TokenPtr::Token(end_name);
        batch_id
    }

    /// All candidate reconstructions of the timeline tail under `filter`,
    /// walking backward from [`Timeline::most_recent_sync`].
    ///
    /// See [`Timeline::most_recent_events_from`] for the full semantics.
    pub fn most_recent_events(&self, filter: &TimelineFilter) -> Vec<Vec<OwnedEventId>> {
        self.most_recent_events_from(filter, &self.most_recent_sync)
    }

    /// All candidate reconstructions of the timeline tail under `filter`,
    /// walking backward from `from`.
    ///
    /// Returns one event sequence per distinct reconstruction the graph
    /// admits; see [`query`] for the traversal rules (qualifying-batch
    /// selection, gap handling via `in_front_of` edges, and loop
    /// detection).
    pub fn most_recent_events_from(
        &self,
        filter: &TimelineFilter,
        from: &TokenPtr,
    ) -> Vec<Vec<OwnedEventId>> {
        query::walk(self, filter, from, &mut std::collections::HashSet::new())
            .into_iter()
            .map(|outcome| outcome.events)
            .collect()
    }

    /// Look up which batches contain `event_id`.
    pub fn batches_for_event(&self, event_id: &OwnedEventId) -> &[BatchId] {
        self.events.get(event_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Look up a batch by its arena id.
    pub fn batch(&self, id: BatchId) -> Option<&IBatch> {
        self.batches.get(id)
    }

    /// Look up a token node by name.
    pub fn token(&self, name: &TokenName) -> Option<&IToken> {
        self.tokens.get(name)
    }
}
