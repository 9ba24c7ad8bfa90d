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

//! Banning a user from a room.
//!
//! Unlike [`super::invite`], the ban body's shape has not changed across
//! any advertised version; only the path prefix moves.

use ruma::{OwnedRoomId, OwnedUserId};
use serde_json::json;

use crate::context::{Context, RequiredField};
use crate::task_chain::{HttpMethod, RequestDescription, TaskChain};

use super::{select_version, SpecVersion};

/// Parameters for banning a user from a room.
#[derive(Debug, Clone)]
pub struct BanParams {
    /// The room to ban from.
    pub room_id: OwnedRoomId,
    /// The user being banned.
    pub user_id: OwnedUserId,
    /// An optional human-readable reason.
    pub reason: Option<String>,
}

fn supported_versions() -> [SpecVersion; 2] {
    [SpecVersion::new("r0.6.1"), SpecVersion::new("v1.1")]
}

/// Build the request to ban `params.user_id` from `params.room_id`.
pub fn build_request(context: &Context, params: BanParams) -> TaskChain<RequestDescription> {
    TaskChain::requiring(context, &[RequiredField::AccessToken, RequiredField::BaseUrl, RequiredField::Versions])
        .and_then(move |()| {
            let versions = context.versions.as_ref().expect("checked by require");
            let version = select_version(versions, &supported_versions(), "ban")?;
            let base_url = context.base_url.clone().expect("checked by require");

            let mut body = json!({ "user_id": params.user_id });
            if let Some(reason) = &params.reason {
                body["reason"] = serde_json::Value::String(reason.clone());
            }

            Ok(RequestDescription {
                method: HttpMethod::Post,
                path: format!("{base_url}/_matrix/client/{}/rooms/{}/ban", version.path_prefix(), params.room_id),
                query: Vec::new(),
                body: Some(body),
            })
        })
}
