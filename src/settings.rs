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

//! Process-wide defaults carried alongside every [`crate::envelope::Envelope`].

use serde::{Deserialize, Serialize};

/// The default value of [`Settings::current_version`].
pub const DEFAULT_CURRENT_VERSION: &str = "v1.11";
/// The default value of [`Settings::device_name`].
pub const DEFAULT_DEVICE_NAME: &str = "matrix-vault-core";
/// The default value of [`Settings::remove_password_on_login`].
pub const DEFAULT_REMOVE_PASSWORD_ON_LOGIN: bool = true;
/// The default value of [`Settings::sync_time_ms`], in milliseconds.
pub const DEFAULT_SYNC_TIME_MS: u64 = 30_000;

/// Settings that do not change per-request, carried alongside the
/// [`crate::context::Context`] in every [`crate::envelope::Envelope`].
///
/// Fields equal to their default are elided on encode, and absent fields
/// decode back to their default — the same
/// `Requiredness::OptionalDefault` rule as any other codec-backed field
/// (spec §4.1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// The Matrix spec version this client targets when no homeserver
    /// version negotiation has happened yet.
    #[serde(default = "default_current_version", skip_serializing_if = "is_default_current_version")]
    pub current_version: String,
    /// Human-readable device name sent on login/registration.
    #[serde(default = "default_device_name", skip_serializing_if = "is_default_device_name")]
    pub device_name: String,
    /// Whether a successful login should clear `Context.password` from
    /// memory.
    #[serde(default = "default_remove_password_on_login", skip_serializing_if = "is_default_remove_password_on_login")]
    pub remove_password_on_login: bool,
    /// Long-poll timeout requested on `/sync`, in milliseconds.
    #[serde(default = "default_sync_time_ms", skip_serializing_if = "is_default_sync_time_ms")]
    pub sync_time_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            current_version: DEFAULT_CURRENT_VERSION.to_string(),
            device_name: DEFAULT_DEVICE_NAME.to_string(),
            remove_password_on_login: DEFAULT_REMOVE_PASSWORD_ON_LOGIN,
            sync_time_ms: DEFAULT_SYNC_TIME_MS,
        }
    }
}

fn default_current_version() -> String {
    DEFAULT_CURRENT_VERSION.to_string()
}

fn is_default_current_version(v: &String) -> bool {
    v == DEFAULT_CURRENT_VERSION
}

fn default_device_name() -> String {
    DEFAULT_DEVICE_NAME.to_string()
}

fn is_default_device_name(v: &String) -> bool {
    v == DEFAULT_DEVICE_NAME
}

fn default_remove_password_on_login() -> bool {
    DEFAULT_REMOVE_PASSWORD_ON_LOGIN
}

fn is_default_remove_password_on_login(v: &bool) -> bool {
    *v == DEFAULT_REMOVE_PASSWORD_ON_LOGIN
}

fn default_sync_time_ms() -> u64 {
    DEFAULT_SYNC_TIME_MS
}

fn is_default_sync_time_ms(v: &u64) -> bool {
    *v == DEFAULT_SYNC_TIME_MS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_encode_to_empty_object() {
        let settings = Settings::default();
        let encoded = serde_json::to_value(&settings).unwrap();
        assert_eq!(encoded, serde_json::json!({}));
    }

    #[test]
    fn empty_object_decodes_to_defaults() {
        let decoded: Settings = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(decoded, Settings::default());
    }

    #[test]
    fn non_default_value_is_preserved_through_roundtrip() {
        let settings = Settings { sync_time_ms: 5_000, ..Settings::default() };
        let encoded = serde_json::to_value(&settings).unwrap();
        assert_eq!(encoded, serde_json::json!({"sync_time_ms": 5000}));
        let decoded: Settings = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, settings);
    }
}
