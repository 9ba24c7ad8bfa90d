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

//! Translation for the v1.1 .. v1.3 `/sync` shape.
//!
//! Wire-identical to [`super::v1`]; kept as its own module so the
//! generation boundary is explicit and so a behavior change scoped to this
//! generation has somewhere to land without touching `v1`.

use serde_json::Value;

use crate::codec::DecodeLog;
use crate::error::Result;
use crate::update::EnvelopeUpdate;

use super::v1;

/// Translate a v2-generation `/sync` response body.
pub fn translate(body: &Value, prior_next_batch: Option<&str>) -> Result<(EnvelopeUpdate, Vec<DecodeLog>)> {
    v1::translate(body, prior_next_batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn matches_v1_translation() {
        let body = json!({ "next_batch": "s1" });
        assert!(translate(&body, None).is_ok());
    }
}
