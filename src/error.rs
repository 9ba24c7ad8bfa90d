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

//! The crate-wide error type.
//!
//! Transport retries and actual HTTP execution happen outside this crate;
//! what lands here is only what the core itself can observe: a decoded (or
//! undecodable) response, a version it cannot dispatch for, or a context
//! that is missing a field a request builder needs.

use ruma::OwnedRoomId;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced while reconciling or dispatching against the model.
///
/// See spec §7 for the policy governing which of these are recoverable
/// versus fatal to a single operation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// The transport reported a failure after exhausting its own retries.
    ///
    /// The core never retries; by the time this variant is constructed the
    /// transport has already given up.
    #[error("transport error: {message}")]
    Transport {
        /// Human-readable description forwarded from the transport.
        message: String,
    },

    /// A JSON payload failed to decode, or failed a codec's validator.
    #[error("failed to decode {type_name}: {message}")]
    Decode {
        /// The Rust type the decoder was targeting.
        type_name: &'static str,
        /// Description of what went wrong.
        message: String,
    },

    /// A `401`-class response was returned for the given reason.
    #[error("authentication failed: {reason:?}")]
    Auth {
        /// Why the server rejected the access token.
        reason: AuthFailureReason,
    },

    /// The server responded `429` / `M_LIMIT_EXCEEDED`.
    #[error("rate limited, retry after {retry_after_ms:?}ms")]
    RateLimited {
        /// Server-suggested backoff, if provided.
        retry_after_ms: Option<u64>,
    },

    /// The server responded `403` / `M_FORBIDDEN`.
    #[error("forbidden")]
    Forbidden,

    /// No versioned implementation is compatible with the homeserver's
    /// advertised versions for the given logical operation.
    #[error("no implementation of {operation} is compatible with the homeserver's versions")]
    UnsupportedVersionForEndpoint {
        /// Name of the logical operation that could not be dispatched.
        operation: &'static str,
    },

    /// A structural invariant of the model was violated by decoded data,
    /// e.g. a hashdict entry whose value does not hash back to its key.
    #[error("invariant violation: {message}")]
    InvariantViolation {
        /// Description of the violated invariant.
        message: String,
    },

    /// A request builder needed context fields that have not been set yet.
    #[error("context is missing required field(s): {missing:?}")]
    ConfigurationIncomplete {
        /// Names of the context fields that were required but absent.
        missing: Vec<&'static str>,
    },

    /// A room referenced by an update did not exist and was not created
    /// first by a preceding `CreateRoomIfNotExists`.
    #[error("no such room: {room_id}")]
    NoSuchRoom {
        /// The room id that was referenced.
        room_id: OwnedRoomId,
    },
}

/// Why a `401` response was returned, per spec §4.8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailureReason {
    /// `M_UNKNOWN_TOKEN` without `soft_logout`: the token is permanently
    /// invalid.
    TokenInvalid,
    /// `M_UNKNOWN_TOKEN` with an indication the token merely expired and a
    /// refresh token may be used to obtain a new one.
    TokenExpired,
}
