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

//! A deliberately small filter type.
//!
//! The timeline reconciler treats filters as opaque, consuming only three
//! operations: [`TimelineFilter::pass`], [`TimelineFilter::and`], and
//! [`TimelineFilter::subset_of`]. The full Matrix filter grammar (rooms,
//! senders, `contains_url`, `lazy_load_members`, ...) is out of scope here;
//! an application is free to translate a richer filter definition into this
//! shape, or to extend it, without touching [`crate::timeline`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// An event-type allow-list filter.
///
/// `None` means "no restriction" (every event type passes); `Some(types)`
/// restricts to exactly those event types.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimelineFilter {
    types: Option<BTreeSet<String>>,
}

impl TimelineFilter {
    /// A filter that passes every event.
    pub fn unrestricted() -> Self {
        TimelineFilter { types: None }
    }

    /// A filter that passes only the given event types.
    pub fn with_types(types: impl IntoIterator<Item = String>) -> Self {
        TimelineFilter { types: Some(types.into_iter().collect()) }
    }

    /// Whether an event of the given type passes this filter.
    pub fn pass(&self, event_type: &str) -> bool {
        match &self.types {
            None => true,
            Some(types) => types.contains(event_type),
        }
    }

    /// The conjunction of two filters: passes only events both would pass.
    ///
    /// `and(f1, f2)` is always at least as restrictive as either operand,
    /// i.e. `subset_of(and(f1, f2), f1)` and `subset_of(and(f1, f2), f2)`
    /// both hold unconditionally — see the quantified invariant in spec §8.
    pub fn and(&self, other: &Self) -> Self {
        let types = match (&self.types, &other.types) {
            (None, None) => None,
            (None, Some(b)) => Some(b.clone()),
            (Some(a), None) => Some(a.clone()),
            (Some(a), Some(b)) => Some(a.intersection(b).cloned().collect()),
        };
        TimelineFilter { types }
    }

    /// Whether `self` is at least as restrictive as `other`: every event
    /// that passes `self` also passes `other`.
    pub fn subset_of(&self, other: &Self) -> bool {
        match (&self.types, &other.types) {
            (_, None) => true,
            (None, Some(_)) => false,
            (Some(a), Some(b)) => a.is_subset(b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(list: &[&str]) -> TimelineFilter {
        TimelineFilter::with_types(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn unrestricted_passes_everything() {
        let f = TimelineFilter::unrestricted();
        assert!(f.pass("m.room.message"));
        assert!(f.pass("m.room.member"));
    }

    #[test]
    fn restricted_passes_only_listed_types() {
        let f = types(&["m.room.message"]);
        assert!(f.pass("m.room.message"));
        assert!(!f.pass("m.room.member"));
    }

    #[test]
    fn and_is_always_subset_of_each_operand() {
        let f1 = types(&["m.room.message", "m.room.member"]);
        let f2 = types(&["m.room.message"]);
        let conj = f1.and(&f2);
        assert!(conj.subset_of(&f1));
        assert!(conj.subset_of(&f2));
    }

    #[test]
    fn and_with_unrestricted_is_identity() {
        let f1 = types(&["m.room.message"]);
        let unrestricted = TimelineFilter::unrestricted();
        assert_eq!(f1.and(&unrestricted), f1);
        assert!(f1.and(&unrestricted).subset_of(&f1));
    }

    #[test]
    fn subset_of_is_reflexive() {
        let f = types(&["m.room.message"]);
        assert!(f.subset_of(&f));
        assert!(TimelineFilter::unrestricted().subset_of(&TimelineFilter::unrestricted()));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn event_type() -> impl Strategy<Value = String> {
            prop_oneof![
                Just("m.room.message"),
                Just("m.room.member"),
                Just("m.room.topic"),
                Just("m.reaction"),
            ]
            .prop_map(|s| s.to_string())
        }

        fn filter() -> impl Strategy<Value = TimelineFilter> {
            prop_oneof![
                Just(TimelineFilter::unrestricted()),
                proptest::collection::vec(event_type(), 0..6).prop_map(TimelineFilter::with_types),
            ]
        }

        proptest! {
            // decode(encode(v)) == v for every filter value — the codec
            // round-trip law of spec §4.1, specialized to this type.
            #[test]
            fn json_round_trip(f in filter()) {
                let encoded = serde_json::to_value(&f).unwrap();
                let decoded: TimelineFilter = serde_json::from_value(encoded).unwrap();
                prop_assert_eq!(decoded, f);
            }

            // `and` is always at least as restrictive as either operand,
            // for arbitrary filter pairs (spec §8's quantified invariant,
            // example-tested above for two fixed filters).
            #[test]
            fn and_is_always_subset_of_each_operand(a in filter(), b in filter()) {
                let conj = a.and(&b);
                prop_assert!(conj.subset_of(&a));
                prop_assert!(conj.subset_of(&b));
            }
        }
    }
}
