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

//! Inviting a user to a room.
//!
//! The `reason` field on the invite body was only added once the spec
//! moved to `v3`-prefixed paths; a legacy `r0` homeserver rejects requests
//! carrying fields it does not recognize in some implementations, so the
//! field is omitted entirely rather than sent empty when dispatching
//! against `r0`.

use ruma::{OwnedRoomId, OwnedUserId};
use serde_json::json;

use crate::context::{Context, RequiredField};
use crate::task_chain::{HttpMethod, RequestDescription, TaskChain};

use super::{select_version, SpecVersion};

/// Parameters for inviting a user to a room.
#[derive(Debug, Clone)]
pub struct InviteParams {
    /// The room to invite into.
    pub room_id: OwnedRoomId,
    /// The user being invited.
    pub user_id: OwnedUserId,
    /// An optional human-readable reason, sent only on spec versions that
    /// support it.
    pub reason: Option<String>,
}

fn supported_versions() -> [SpecVersion; 2] {
    [SpecVersion::new("r0.6.1"), SpecVersion::new("v1.1")]
}

/// Build the request to invite `params.user_id` into `params.room_id`.
pub fn build_request(context: &Context, params: InviteParams) -> TaskChain<RequestDescription> {
    TaskChain::requiring(context, &[RequiredField::AccessToken, RequiredField::BaseUrl, RequiredField::Versions])
        .and_then(move |()| {
            let versions = context.versions.as_ref().expect("checked by require");
            let version = select_version(versions, &supported_versions(), "invite")?;
            let base_url = context.base_url.clone().expect("checked by require");

            let mut body = json!({ "user_id": params.user_id });
            if version.path_prefix() == "v3" {
                if let Some(reason) = &params.reason {
                    body["reason"] = serde_json::Value::String(reason.clone());
                }
            }

            Ok(RequestDescription {
                method: HttpMethod::Post,
                path: format!(
                    "{base_url}/_matrix/client/{}/rooms/{}/invite",
                    version.path_prefix(),
                    params.room_id
                ),
                query: Vec::new(),
                body: Some(body),
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{AccessToken, AdvertisedVersions};
    use ruma::{room_id, user_id};

    fn context_with_versions(versions: &[&str]) -> Context {
        let mut context = Context::new("example.org");
        context.base_url = Some("https://example.org".to_string());
        context.set_access_token(AccessToken {
            value: "tok".to_string(),
            created_at: crate::timestamp::Timestamp::from_millis(0),
            expires_in_ms: None,
            last_used_at: None,
            refresh_token: None,
        });
        context.versions = Some(AdvertisedVersions {
            versions: versions.iter().map(|v| v.to_string()).collect(),
            unstable_features: Default::default(),
        });
        context
    }

    #[test]
    fn reason_is_dropped_against_legacy_server() {
        let context = context_with_versions(&["r0.6.1"]);
        let request = build_request(
            &context,
            InviteParams {
                room_id: room_id!("!r:example.org").to_owned(),
                user_id: user_id!("@bob:example.org").to_owned(),
                reason: Some("come hang out".to_string()),
            },
        )
        .into_request_description()
        .unwrap();

        assert!(request.path.contains("/r0/"));
        assert_eq!(request.body.unwrap().get("reason"), None);
    }

    #[test]
    fn reason_is_included_against_modern_server() {
        let context = context_with_versions(&["v1.1"]);
        let request = build_request(
            &context,
            InviteParams {
                room_id: room_id!("!r:example.org").to_owned(),
                user_id: user_id!("@bob:example.org").to_owned(),
                reason: Some("come hang out".to_string()),
            },
        )
        .into_request_description()
        .unwrap();

        assert!(request.path.contains("/v3/"));
        assert_eq!(request.body.unwrap()["reason"], "come hang out");
    }

    #[test]
    fn unsupported_server_version_is_rejected() {
        let context = context_with_versions(&["r0.0.1"]);
        let err = build_request(
            &context,
            InviteParams {
                room_id: room_id!("!r:example.org").to_owned(),
                user_id: user_id!("@bob:example.org").to_owned(),
                reason: None,
            },
        )
        .into_result()
        .unwrap_err();
        assert_matches::assert_matches!(err, crate::error::Error::UnsupportedVersionForEndpoint { operation: "invite" });
    }
}
