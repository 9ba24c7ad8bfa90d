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

//! Sending a message event into a room.
//!
//! The transaction id is the caller's idempotency key: retrying the same
//! `txn_id` against the same path must be safe, so it is taken as an
//! explicit parameter rather than generated here — generating it is a
//! transport-level concern ([`crate::context::Context::last_transaction_id`]
//! only remembers the most recent one for retry purposes).

use ruma::OwnedRoomId;
use serde_json::Value;

use crate::context::{Context, RequiredField};
use crate::task_chain::{HttpMethod, RequestDescription, TaskChain};

use super::{select_version, SpecVersion};

/// Parameters for sending a message event.
#[derive(Debug, Clone)]
pub struct SendMessageEventParams {
    /// The room to send into.
    pub room_id: OwnedRoomId,
    /// The event type, e.g. `"m.room.message"`.
    pub event_type: String,
    /// The caller-chosen idempotency key for this send.
    pub txn_id: String,
    /// The event content.
    pub content: Value,
}

fn supported_versions() -> [SpecVersion; 2] {
    [SpecVersion::new("r0.6.1"), SpecVersion::new("v1.1")]
}

/// Build the request to send a message event.
pub fn build_request(context: &Context, params: SendMessageEventParams) -> TaskChain<RequestDescription> {
    TaskChain::requiring(context, &[RequiredField::AccessToken, RequiredField::BaseUrl, RequiredField::Versions])
        .and_then(move |()| {
            let versions = context.versions.as_ref().expect("checked by require");
            let version = select_version(versions, &supported_versions(), "send_message_event")?;
            let base_url = context.base_url.clone().expect("checked by require");

            Ok(RequestDescription {
                method: HttpMethod::Put,
                path: format!(
                    "{base_url}/_matrix/client/{}/rooms/{}/send/{}/{}",
                    version.path_prefix(),
                    params.room_id,
                    params.event_type,
                    params.txn_id
                ),
                query: Vec::new(),
                body: Some(params.content),
            })
        })
}
