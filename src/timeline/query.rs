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

//! The backward graph walk behind [`super::Timeline::most_recent_events`].
//!
//! Implemented iteratively with an explicit work stack per spec §9 ("Cyclic
//! token graphs" / stack-safety): a token may not be revisited within a
//! single candidate walk, which is what makes the traversal terminate even
//! when the server has (legally, if unusually) reused a token name and
//! created a cycle in the adjacency graph. Each node's children must be
//! resolved before the node itself can be resolved (the result is a
//! prefix-then-batch concatenation), so the stack holds two kinds of work:
//! `Expand` a token into its children, and `Finish` a token once its
//! children's results are in hand — the same shape a native call stack
//! would produce, just heap-allocated instead of relying on recursion depth.

use std::collections::{HashMap, HashSet};

use ruma::OwnedEventId;

use crate::filter::TimelineFilter;
use crate::timeline::batch::BatchId;
use crate::timeline::token::{TokenName, TokenPtr};
use crate::timeline::Timeline;

/// One candidate reconstruction of a timeline slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOutcome {
    /// The reconstructed event sequence, oldest first.
    pub events: Vec<OwnedEventId>,
}

/// A unique handle for one in-flight node of the walk, used to stash and
/// later retrieve that node's results from `results`.
type NodeId = usize;

enum Task {
    /// Resolve `from`: look up its qualifying batches (or earlier tokens if
    /// none qualify) and push whatever children that requires.
    Expand { id: NodeId, from: TokenPtr, visited: HashSet<TokenName> },
    /// All of `children`'s results are ready; concatenate them verbatim
    /// (the gap-gives-up-and-forwards case).
    FinishGap { id: NodeId, children: Vec<NodeId> },
    /// All of `parts`' prefix results are ready; prepend each prefix to its
    /// paired batch's events (the qualifying-batch case).
    FinishBatches { id: NodeId, parts: Vec<(NodeId, Vec<OwnedEventId>)> },
}

/// Walk backward from `from`, returning every candidate reconstruction the
/// graph admits under `filter`.
///
/// `visited` is the set of token names already visited on *this* path; it
/// is extended (not shared) as the walk branches, so sibling forks do not
/// see each other's visited tokens.
pub(super) fn walk(
    timeline: &Timeline,
    filter: &TimelineFilter,
    from: &TokenPtr,
    visited: &mut HashSet<TokenName>,
) -> Vec<QueryOutcome> {
    let mut next_id: NodeId = 0;
    let mut results: HashMap<NodeId, Vec<QueryOutcome>> = HashMap::new();

    let root_id = next_id;
    next_id += 1;
    let mut stack = vec![Task::Expand { id: root_id, from: from.clone(), visited: visited.clone() }];

    while let Some(task) = stack.pop() {
        match task {
            Task::Expand { id, from, visited } => {
                let name = match &from {
                    TokenPtr::StartOfTimeline => {
                        results.insert(id, vec![QueryOutcome { events: Vec::new() }]);
                        continue;
                    }
                    TokenPtr::Token(name) => name.clone(),
                };

                if visited.contains(&name) {
                    // Loop: this path has already passed through `name`; a
                    // further visit cannot discover anything new, so the
                    // branch dead-ends here exactly as it would at an
                    // unreachable gap.
                    results.insert(id, vec![QueryOutcome { events: Vec::new() }]);
                    continue;
                }

                let Some(token) = timeline.token(&name) else {
                    results.insert(id, vec![QueryOutcome { events: Vec::new() }]);
                    continue;
                };

                let qualifying: Vec<BatchId> = token
                    .ends()
                    .iter()
                    .copied()
                    .filter(|bid| timeline.batch(*bid).map(|b| filter.subset_of(&b.filter)).unwrap_or(false))
                    .collect();

                if qualifying.is_empty() {
                    let earlier = token.in_front_of().clone();
                    if earlier.is_empty() {
                        // Nothing reaches further back than this token under
                        // this filter: the gap leaves older events behind.
                        results.insert(id, vec![QueryOutcome { events: Vec::new() }]);
                        continue;
                    }

                    let mut children = Vec::new();
                    let mut child_tasks = Vec::new();
                    for earlier_name in earlier {
                        let mut branch_visited = visited.clone();
                        branch_visited.insert(name.clone());
                        let child_id = next_id;
                        next_id += 1;
                        children.push(child_id);
                        child_tasks.push(Task::Expand {
                            id: child_id,
                            from: TokenPtr::Token(earlier_name),
                            visited: branch_visited,
                        });
                    }
                    stack.push(Task::FinishGap { id, children });
                    stack.extend(child_tasks);
                    continue;
                }

                // Batches sharing the same `start` are redundant
                // reconstructions of the same slice (e.g. the same range
                // re-fetched under a compatible filter); among those, keep
                // only the longest, with ties preserved. Batches with
                // distinct `start` tokens are genuinely different forks and
                // are all kept.
                let mut by_start: HashMap<TokenPtr, Vec<BatchId>> = HashMap::new();
                for bid in qualifying {
                    let start = timeline.batch(bid).expect("qualifying id resolves").start.clone();
                    by_start.entry(start).or_default().push(bid);
                }

                let mut parts = Vec::new();
                let mut child_tasks = Vec::new();
                for (start, ids) in by_start {
                    let max_len =
                        ids.iter().filter_map(|bid| timeline.batch(*bid)).map(|b| b.events.len()).max().unwrap_or(0);
                    let longest: Vec<BatchId> = ids
                        .into_iter()
                        .filter(|bid| timeline.batch(*bid).map(|b| b.events.len() == max_len).unwrap_or(false))
                        .collect();

                    for bid in longest {
                        let Some(batch) = timeline.batch(bid) else { continue };
                        let mut branch_visited = visited.clone();
                        branch_visited.insert(name.clone());
                        let child_id = next_id;
                        next_id += 1;
                        parts.push((child_id, batch.events.clone()));
                        child_tasks.push(Task::Expand { id: child_id, from: start.clone(), visited: branch_visited });
                    }
                }

                stack.push(Task::FinishBatches { id, parts });
                stack.extend(child_tasks);
            }
            Task::FinishGap { id, children } => {
                let mut outcomes = Vec::new();
                for child in children {
                    outcomes.extend(results.remove(&child).unwrap_or_default());
                }
                results.insert(id, outcomes);
            }
            Task::FinishBatches { id, parts } => {
                let mut outcomes = Vec::new();
                for (child, batch_events) in parts {
                    for prefix in results.remove(&child).unwrap_or_default() {
                        let mut events = prefix.events;
                        events.extend(batch_events.iter().cloned());
                        outcomes.push(QueryOutcome { events });
                    }
                }
                results.insert(id, outcomes);
            }
        }
    }

    results.remove(&root_id).unwrap_or_default()
}
