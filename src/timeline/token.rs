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

//! Timeline tokens: opaque server-issued cursors, and the graph edges
//! between them this crate derives from batch insertion order.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::collections::Keyed;
use crate::timeline::batch::BatchId;

/// An opaque, server-issued cursor name.
pub type TokenName = String;

/// A reference to a position in the timeline: either a named token or the
/// room's very start.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenPtr {
    /// The beginning of the room's history; no token needed.
    StartOfTimeline,
    /// A named, server-issued token.
    Token(TokenName),
}

/// A token node in the timeline graph.
///
/// `starts`/`ends` record which batches begin or end at this token.
/// `in_front_of`/`behind` record the wall-time ordering edges recorded by
/// [`crate::timeline::Timeline::add_sync`]: if `self.behind` contains `T`,
/// `T` is strictly ahead of `self` in time, and symmetrically `T.in_front_of`
/// contains `self`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IToken {
    pub(crate) name: TokenName,
    pub(crate) starts: BTreeSet<BatchId>,
    pub(crate) ends: BTreeSet<BatchId>,
    /// Tokens this one is strictly ahead of (earlier tokens, reachable when
    /// walking backward).
    pub(crate) in_front_of: BTreeSet<TokenName>,
    /// Tokens this one is strictly behind (later tokens).
    pub(crate) behind: BTreeSet<TokenName>,
}

impl IToken {
    /// A freshly invoked token with no batches or edges yet.
    pub fn new(name: TokenName) -> Self {
        IToken { name, starts: BTreeSet::new(), ends: BTreeSet::new(), in_front_of: BTreeSet::new(), behind: BTreeSet::new() }
    }

    /// This token's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Batch ids that start at this token.
    pub fn starts(&self) -> &BTreeSet<BatchId> {
        &self.starts
    }

    /// Batch ids that end at this token.
    pub fn ends(&self) -> &BTreeSet<BatchId> {
        &self.ends
    }

    /// Tokens this one is strictly ahead of.
    pub fn in_front_of(&self) -> &BTreeSet<TokenName> {
        &self.in_front_of
    }

    /// Tokens this one is strictly behind.
    pub fn behind(&self) -> &BTreeSet<TokenName> {
        &self.behind
    }
}

impl Keyed for IToken {
    type Key = TokenName;

    fn key(&self) -> TokenName {
        self.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_token_has_no_edges() {
        let t = IToken::new("s1".into());
        assert!(t.in_front_of().is_empty());
        assert!(t.behind().is_empty());
        assert!(t.starts().is_empty());
        assert!(t.ends().is_empty());
    }
}
