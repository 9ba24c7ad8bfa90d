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

//! Core in-memory model and reconciliation logic for a Matrix client SDK.
//!
//! This crate is deliberately oblivious to network transport: it models the
//! state a client accumulates from a homeserver (rooms, their timelines and
//! state, account data) and the pure, value-transforming logic that keeps
//! that state coherent as batches of events arrive out of order, with gaps,
//! and under different filters.
//!
//! # Layout
//!
//! - [`timeline`]: the token-linked batch graph and its `most_recent_events`
//!   traversal — the hardest part of this crate.
//! - [`vault`], [`room`], [`invite`]: the aggregate data model.
//! - [`envelope`], [`context`], [`settings`]: the wrapper carried around any
//!   model value plus the request-building context.
//! - [`update`]: the recursive diff tree applied to an envelope by a single
//!   fold.
//! - [`versioned`], [`sync`]: the versioned dispatch layer and the `/sync`
//!   response translator built on top of it.
//! - [`codec`], [`collections`]: the JSON codec combinators and the
//!   `Hashdict`/`Iddict` collections every aggregate is built from.

pub mod codec;
pub mod collections;
pub mod context;
pub mod envelope;
pub mod error;
pub mod event;
pub mod filter;
pub mod invite;
pub mod room;
pub mod settings;
pub mod state;
pub mod sync;
pub mod task_chain;
pub mod timeline;
pub mod timestamp;
pub mod update;
pub mod vault;
pub mod versioned;

#[cfg(test)]
mod scenarios;

pub use envelope::Envelope;
pub use error::{Error, Result};
pub use timestamp::Timestamp;
pub use vault::Vault;
