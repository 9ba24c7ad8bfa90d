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

//! An opaque millisecond-epoch timestamp.
//!
//! Wraps [`ruma::MilliSecondsSinceUnixEpoch`] rather than re-exporting it so
//! that callers of this crate never need to depend on `ruma` just to read a
//! wall-clock value out of a [`crate::context::Context`].

use ruma::MilliSecondsSinceUnixEpoch;
use serde::{Deserialize, Serialize};

/// Milliseconds since the Unix epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Construct a timestamp from a raw millisecond count.
    pub fn from_millis(millis: u64) -> Self {
        Timestamp(millis)
    }

    /// The underlying millisecond count.
    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// Add a duration, expressed in milliseconds, to this timestamp.
    pub fn add_ms(&self, ms: u64) -> Self {
        Timestamp(self.0.saturating_add(ms))
    }

    /// Milliseconds elapsed between `self` and a later timestamp, or `None`
    /// if `other` is not after `self`.
    pub fn ms_until(&self, other: Timestamp) -> Option<u64> {
        other.0.checked_sub(self.0)
    }
}

impl From<MilliSecondsSinceUnixEpoch> for Timestamp {
    fn from(value: MilliSecondsSinceUnixEpoch) -> Self {
        Timestamp(value.0.into())
    }
}

impl TryFrom<Timestamp> for MilliSecondsSinceUnixEpoch {
    type Error = js_int::TryFromIntError;

    fn try_from(value: Timestamp) -> Result<Self, Self::Error> {
        Ok(MilliSecondsSinceUnixEpoch(value.0.try_into()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_ms_is_commutative_with_order() {
        let t = Timestamp::from_millis(1_000);
        assert_eq!(t.add_ms(500).as_millis(), 1_500);
    }

    #[test]
    fn ms_until_is_none_when_not_after() {
        let earlier = Timestamp::from_millis(1_000);
        let later = Timestamp::from_millis(2_000);
        assert_eq!(earlier.ms_until(later), Some(1_000));
        assert_eq!(later.ms_until(earlier), None);
    }
}
