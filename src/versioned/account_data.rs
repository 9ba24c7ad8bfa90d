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

//! Setting a room's account data.

use ruma::{OwnedRoomId, OwnedUserId};
use serde_json::Value;

use crate::context::{Context, RequiredField};
use crate::task_chain::{HttpMethod, RequestDescription, TaskChain};

use super::{select_version, SpecVersion};

/// Parameters for setting a room account data event.
#[derive(Debug, Clone)]
pub struct SetRoomAccountDataParams {
    /// The user whose account data is being set.
    pub user_id: OwnedUserId,
    /// The room the account data is scoped to.
    pub room_id: OwnedRoomId,
    /// The account data event type, e.g. `"m.fully_read"`.
    pub event_type: String,
    /// The new content to store.
    pub content: Value,
}

fn supported_versions() -> [SpecVersion; 2] {
    [SpecVersion::new("r0.6.1"), SpecVersion::new("v1.1")]
}

/// Build the request to overwrite a room account data event.
pub fn build_request(context: &Context, params: SetRoomAccountDataParams) -> TaskChain<RequestDescription> {
    TaskChain::requiring(context, &[RequiredField::AccessToken, RequiredField::BaseUrl, RequiredField::Versions])
        .and_then(move |()| {
            let versions = context.versions.as_ref().expect("checked by require");
            let version = select_version(versions, &supported_versions(), "set_room_account_data")?;
            let base_url = context.base_url.clone().expect("checked by require");

            Ok(RequestDescription {
                method: HttpMethod::Put,
                path: format!(
                    "{base_url}/_matrix/client/{}/user/{}/rooms/{}/account_data/{}",
                    version.path_prefix(),
                    params.user_id,
                    params.room_id,
                    params.event_type
                ),
                query: Vec::new(),
                body: Some(params.content),
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{AccessToken, AdvertisedVersions};
    use ruma::{room_id, user_id};
    use serde_json::json;

    #[test]
    fn path_includes_user_room_and_type() {
        let mut context = Context::new("example.org");
        context.base_url = Some("https://example.org".to_string());
        context.set_access_token(AccessToken {
            value: "tok".to_string(),
            created_at: crate::timestamp::Timestamp::from_millis(0),
            expires_in_ms: None,
            last_used_at: None,
            refresh_token: None,
        });
        context.versions =
            Some(AdvertisedVersions { versions: vec!["v1.1".to_string()], unstable_features: Default::default() });

        let request = build_request(
            &context,
            SetRoomAccountDataParams {
                user_id: user_id!("@alice:example.org").to_owned(),
                room_id: room_id!("!r:example.org").to_owned(),
                event_type: "m.fully_read".to_string(),
                content: json!({"event_id": "$e1:example.org"}),
            },
        )
        .into_request_description()
        .unwrap();

        assert_eq!(request.method, HttpMethod::Put);
        assert!(request.path.ends_with("/account_data/m.fully_read"));
        assert!(request.path.contains("@alice:example.org"));
    }
}
