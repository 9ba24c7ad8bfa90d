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

//! Per-account connection state: who we're talking to, what credentials
//! we hold, and what the homeserver has told us about itself.
//!
//! `Context` is the thing a [`crate::task_chain::TaskChain`] reads from to
//! build a request and the thing an [`crate::update::EnvelopeUpdate`]
//! mutates after a response comes back. It never reaches across the
//! network itself.

use serde::{Deserialize, Serialize};

use crate::collections::Keyed;
use crate::error::{Error, Result};
use crate::timestamp::Timestamp;

/// A single access token on file, together with the bookkeeping needed to
/// decide whether it's still usable and which one to prefer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    /// The token value itself, and the key it is stored under.
    pub value: String,
    /// When this token was obtained.
    pub created_at: Timestamp,
    /// How long after `created_at` the homeserver said this token is valid
    /// for, if it said anything at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in_ms: Option<u64>,
    /// The last time a request was sent with this token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<Timestamp>,
    /// The refresh token issued alongside this access token, if the
    /// homeserver supports refreshable sessions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl Keyed for AccessToken {
    type Key = String;

    fn key(&self) -> String {
        self.value.clone()
    }
}

impl AccessToken {
    /// The millisecond epoch at which this token stops being valid, or
    /// `None` if the homeserver never gave it an expiry.
    pub fn expiry_horizon(&self) -> Option<u64> {
        self.expires_in_ms.map(|ms| self.created_at.as_millis().saturating_add(ms))
    }

    /// Whether this token is expired as of `now`. A token with no known
    /// expiry is never expired.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        match self.expiry_horizon() {
            Some(horizon) => now.as_millis() >= horizon,
            None => false,
        }
    }
}

/// Spec versions a homeserver has advertised via `GET /_matrix/client/versions`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvertisedVersions {
    /// Stable version identifiers, e.g. `"v1.11"` or legacy `"r0.6.1"`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub versions: Vec<String>,
    /// Unstable feature flags the homeserver opts into, by name.
    #[serde(default, skip_serializing_if = "std::collections::BTreeMap::is_empty")]
    pub unstable_features: std::collections::BTreeMap<String, bool>,
}

impl AdvertisedVersions {
    /// Whether the homeserver has advertised `version`.
    pub fn supports(&self, version: &str) -> bool {
        self.versions.iter().any(|v| v == version)
    }
}

/// A context field a [`crate::task_chain::TaskChain`] or
/// [`crate::versioned`] dispatcher needs to be present before it can build
/// a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    /// At least one non-expired access token must be on file.
    AccessToken,
    /// `base_url` must be set.
    BaseUrl,
    /// The homeserver's advertised versions must have been fetched.
    Versions,
    /// `device_id` must be set.
    DeviceId,
}

impl RequiredField {
    fn name(self) -> &'static str {
        match self {
            RequiredField::AccessToken => "access_token",
            RequiredField::BaseUrl => "base_url",
            RequiredField::Versions => "versions",
            RequiredField::DeviceId => "device_id",
        }
    }
}

/// What to do in response to a `401` for a token this context holds.
///
/// Actually exchanging a refresh token for a new access token is a
/// transport-level HTTP call outside this crate; `Context` only decides
/// whether that call is worth attempting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthRecoveryAction {
    /// Drop the token outright; no refresh token is available, or the
    /// failure reason says it never will help.
    RemoveToken {
        /// The token to remove.
        value: String,
    },
    /// Attempt a refresh before giving up on this session.
    AttemptRefresh {
        /// The expired access token.
        token: String,
        /// The refresh token to exchange for a new access token.
        refresh_token: String,
    },
}

/// Per-account connection state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Context {
    /// The homeserver's server name, e.g. `"example.org"`. Always present
    /// once a context is constructed for a particular account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    /// The resolved base URL to send client-server API requests to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// This session's device id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    /// The cursor the next `/sync` request should resume from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_batch: Option<String>,
    /// A clock reading recent enough to judge token expiry against. Supplied
    /// by the caller rather than read from the system clock, so that
    /// [`AccessToken::is_expired`] checks stay deterministic and testable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub now: Option<Timestamp>,
    /// The account password, held only until login succeeds (see
    /// [`crate::settings::Settings::remove_password_on_login`]).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// A standalone refresh token not yet associated with any access token
    /// (e.g. supplied at construction time to resume a prior session).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// The Matrix user id's localpart, or full user id, used to log in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    /// A caller-suggested access token to prefer over whatever
    /// [`Context::most_popular_token`] would otherwise pick.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_access_token: Option<String>,
    /// The transaction id most recently used for an idempotent request
    /// (e.g. `send_message_event`), so retries can reuse it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transaction_id: Option<String>,
    /// The homeserver's advertised spec versions, once fetched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versions: Option<AdvertisedVersions>,
    /// Every access token currently on file, keyed by its own value.
    #[serde(default)]
    pub access_tokens: crate::collections::Hashdict<AccessToken>,
}

impl Context {
    /// A fresh context for `server_name`, with nothing else populated yet.
    pub fn new(server_name: impl Into<String>) -> Self {
        Context { server_name: Some(server_name.into()), ..Context::default() }
    }

    /// The access token requests should use: the caller's suggestion if
    /// it's on file and unexpired, otherwise whichever non-expired token has
    /// the furthest-out expiry horizon (a token with no expiry at all
    /// outranks every token that does expire).
    pub fn most_popular_token(&self) -> Option<&AccessToken> {
        let now = self.now.unwrap_or(Timestamp::from_millis(0));

        if let Some(suggested) = &self.suggested_access_token {
            if let Some(token) = self.access_tokens.get(suggested) {
                if !token.is_expired(now) {
                    return Some(token);
                }
            }
        }

        self.access_tokens
            .values()
            .filter(|token| !token.is_expired(now))
            .max_by_key(|token| token.expiry_horizon().unwrap_or(u64::MAX))
    }

    /// Record a newly obtained or refreshed access token.
    pub fn set_access_token(&mut self, token: AccessToken) {
        self.access_tokens.insert(token);
    }

    /// Drop an access token, e.g. after the homeserver reports it invalid.
    pub fn remove_access_token(&mut self, value: &str) {
        self.access_tokens.remove(&value.to_string());
        if self.suggested_access_token.as_deref() == Some(value) {
            self.suggested_access_token = None;
        }
    }

    /// Decide how to react to a `401` reported against `token_value`.
    pub fn handle_auth_failure(
        &self,
        reason: crate::error::AuthFailureReason,
        token_value: &str,
    ) -> AuthRecoveryAction {
        use crate::error::AuthFailureReason;

        let refresh_token = self.access_tokens.get(&token_value.to_string()).and_then(|t| t.refresh_token.clone());

        match (reason, refresh_token) {
            (AuthFailureReason::TokenExpired, Some(refresh_token)) => {
                AuthRecoveryAction::AttemptRefresh { token: token_value.to_string(), refresh_token }
            }
            _ => AuthRecoveryAction::RemoveToken { value: token_value.to_string() },
        }
    }

    /// Check that every field in `fields` is present, returning
    /// [`Error::ConfigurationIncomplete`] naming every field that isn't.
    pub fn require(&self, fields: &[RequiredField]) -> Result<()> {
        let missing: Vec<&'static str> = fields
            .iter()
            .copied()
            .filter(|field| !self.has(*field))
            .map(RequiredField::name)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::ConfigurationIncomplete { missing })
        }
    }

    fn has(&self, field: RequiredField) -> bool {
        match field {
            RequiredField::AccessToken => self.most_popular_token().is_some(),
            RequiredField::BaseUrl => self.base_url.is_some(),
            RequiredField::Versions => self.versions.is_some(),
            RequiredField::DeviceId => self.device_id.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(value: &str, created_at_ms: u64, expires_in_ms: Option<u64>) -> AccessToken {
        AccessToken {
            value: value.to_string(),
            created_at: Timestamp::from_millis(created_at_ms),
            expires_in_ms,
            last_used_at: None,
            refresh_token: None,
        }
    }

    #[test]
    fn most_popular_token_prefers_suggestion_when_unexpired() {
        let mut ctx = Context::new("example.org");
        ctx.now = Some(Timestamp::from_millis(1_000));
        ctx.set_access_token(token("a", 0, None));
        ctx.set_access_token(token("b", 0, None));
        ctx.suggested_access_token = Some("b".to_string());
        assert_eq!(ctx.most_popular_token().unwrap().value, "b");
    }

    #[test]
    fn most_popular_token_falls_back_when_suggestion_expired() {
        let mut ctx = Context::new("example.org");
        ctx.now = Some(Timestamp::from_millis(10_000));
        ctx.set_access_token(token("expired", 0, Some(1_000)));
        ctx.set_access_token(token("fresh", 0, None));
        ctx.suggested_access_token = Some("expired".to_string());
        assert_eq!(ctx.most_popular_token().unwrap().value, "fresh");
    }

    #[test]
    fn most_popular_token_picks_furthest_expiry_horizon() {
        let mut ctx = Context::new("example.org");
        ctx.now = Some(Timestamp::from_millis(0));
        ctx.set_access_token(token("soon", 0, Some(1_000)));
        ctx.set_access_token(token("later", 0, Some(5_000)));
        assert_eq!(ctx.most_popular_token().unwrap().value, "later");
    }

    #[test]
    fn remove_access_token_clears_matching_suggestion() {
        let mut ctx = Context::new("example.org");
        ctx.set_access_token(token("a", 0, None));
        ctx.suggested_access_token = Some("a".to_string());
        ctx.remove_access_token("a");
        assert!(ctx.access_tokens.get(&"a".to_string()).is_none());
        assert_eq!(ctx.suggested_access_token, None);
    }

    #[test]
    fn handle_auth_failure_invalid_always_removes() {
        let mut ctx = Context::new("example.org");
        ctx.set_access_token(AccessToken {
            refresh_token: Some("r".to_string()),
            ..token("a", 0, None)
        });
        let action = ctx.handle_auth_failure(crate::error::AuthFailureReason::TokenInvalid, "a");
        assert_eq!(action, AuthRecoveryAction::RemoveToken { value: "a".to_string() });
    }

    #[test]
    fn handle_auth_failure_expired_with_refresh_attempts_refresh() {
        let mut ctx = Context::new("example.org");
        ctx.set_access_token(AccessToken {
            refresh_token: Some("r".to_string()),
            ..token("a", 0, None)
        });
        let action = ctx.handle_auth_failure(crate::error::AuthFailureReason::TokenExpired, "a");
        assert_eq!(
            action,
            AuthRecoveryAction::AttemptRefresh { token: "a".to_string(), refresh_token: "r".to_string() }
        );
    }

    #[test]
    fn require_reports_every_missing_field() {
        let ctx = Context::new("example.org");
        let err = ctx.require(&[RequiredField::AccessToken, RequiredField::BaseUrl]).unwrap_err();
        match err {
            Error::ConfigurationIncomplete { missing } => {
                assert_eq!(missing, vec!["access_token", "base_url"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn require_succeeds_once_fields_are_set() {
        let mut ctx = Context::new("example.org");
        ctx.base_url = Some("https://example.org".to_string());
        ctx.set_access_token(token("a", 0, None));
        assert!(ctx.require(&[RequiredField::AccessToken, RequiredField::BaseUrl]).is_ok());
    }
}
