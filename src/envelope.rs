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

//! The envelope every value produced or consumed by this crate travels in.

use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::settings::Settings;

/// A `content` value paired with the connection state it was built from (or
/// should be applied against) and the process-wide settings in effect.
///
/// Request builders take an `Envelope<()>` (or an envelope around whatever
/// parameters the request needs) and read `context`; response handlers
/// return an `Envelope<VaultUpdate>` (or similar) for the caller to fold
/// into its own `Vault` alongside the updated `context`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// The payload proper.
    pub content: T,
    /// Connection state the payload was produced from, or should be
    /// interpreted against.
    pub context: Context,
    /// Process-wide settings in effect when the payload was produced.
    #[serde(default)]
    pub settings: Settings,
}

impl<T> Envelope<T> {
    /// Wrap `content` together with `context`, using default settings.
    pub fn new(content: T, context: Context) -> Self {
        Envelope { content, context, settings: Settings::default() }
    }

    /// Wrap `content` together with `context` and explicit `settings`.
    pub fn with_settings(content: T, context: Context, settings: Settings) -> Self {
        Envelope { content, context, settings }
    }

    /// Transform the payload, keeping `context` and `settings` untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        Envelope { content: f(self.content), context: self.context, settings: self.settings }
    }

    /// Borrow the payload together with its context, without consuming the
    /// envelope.
    pub fn as_parts(&self) -> (&T, &Context, &Settings) {
        (&self.content, &self.context, &self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_preserves_context_and_settings() {
        let envelope = Envelope::new(1u32, Context::new("example.org"));
        let mapped = envelope.map(|n| n + 1);
        assert_eq!(mapped.content, 2);
        assert_eq!(mapped.context.server_name.as_deref(), Some("example.org"));
    }
}
