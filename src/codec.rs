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

//! Codec combinators: the per-field rules every hand-written `Serialize`/
//! `Deserialize` impl in this crate is built from.
//!
//! Every piece of model state must be serializable, and every protocol
//! message must be both decodable *and* self-documenting, so the field
//! metadata below is shared between the `Serialize`/`Deserialize` impls
//! (via [`decode_field`]/[`encode_field`]) and the [`Documented`] trait
//! that renders a type's structural shape without needing its value.
//!
//! A decoder never fails on a merely-defaulted or merely-missing optional
//! field; it records a [`DecodeLog`] entry instead. It does fail (via
//! [`serde::de::Error`]) on structurally invalid JSON or on a value that
//! fails a field's own validator, e.g. a hashdict entry that does not hash
//! back to its key.

use std::fmt;

/// Whether a field must be present, may be absent, or falls back to a
/// default when absent.
#[derive(Debug, Clone)]
pub enum Requiredness<T> {
    /// Decoding fails if the field is absent.
    Required,
    /// The field yields `None` if absent; absent values encode to nothing.
    OptionalValue,
    /// The field yields `default` if absent. The default is omitted from
    /// re-encoding iff the current value equals it.
    OptionalDefault {
        /// The value substituted in when the field is absent.
        default: T,
    },
}

/// Structural documentation for one field of a codec-backed type.
#[derive(Debug, Clone)]
pub struct FieldDoc {
    /// The wire field name.
    pub name: &'static str,
    /// A human-readable description of what the field carries.
    pub description: &'static str,
    /// One of `"required"`, `"optional"`, `"optional (defaulted)"`.
    pub requiredness: &'static str,
    /// A short name for the field's value type, e.g. `"string"`, `"list of
    /// event"`.
    pub type_doc: &'static str,
}

/// A warning accumulated while decoding, never a hard failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeLog {
    /// An optional field with a default was absent; the default was used.
    DefaultedMissingField {
        /// The Rust type being decoded.
        type_name: &'static str,
        /// The field that was missing.
        field: &'static str,
    },
    /// A hashdict entry's stored key did not match the key its value
    /// projects to; the entry was silently re-keyed.
    HashMismatchInHashdict {
        /// The key as stored in the JSON object.
        stored: String,
        /// The key the value actually projects to.
        projected: String,
    },
    /// A redaction chain exceeded the maximum supported depth and was
    /// truncated rather than followed further (spec §9 Open Questions).
    RedactionChainTruncated {
        /// The depth at which the chain was cut off.
        depth: usize,
    },
}

impl fmt::Display for DecodeLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeLog::DefaultedMissingField { type_name, field } => {
                write!(f, "{type_name}.{field} was missing, defaulted")
            }
            DecodeLog::HashMismatchInHashdict { stored, projected } => {
                write!(f, "hashdict entry stored under {stored:?} rehashed to {projected:?}")
            }
            DecodeLog::RedactionChainTruncated { depth } => {
                write!(f, "redaction chain truncated at depth {depth}")
            }
        }
    }
}

/// The result of a decode: the value plus any warnings accumulated while
/// producing it.
///
/// `decode(encode(v)) == (v, [])` for every `v` that triggers no warnings
/// on the way in — the round-trip law of spec §4.1.
pub type Decoded<T> = (T, Vec<DecodeLog>);

/// Build a [`Decoded`] value with no warnings.
pub fn clean<T>(value: T) -> Decoded<T> {
    (value, Vec::new())
}

/// Merge the warnings of a nested decode into an outer warning list,
/// returning the inner value.
pub fn absorb<T>(decoded: Decoded<T>, into: &mut Vec<DecodeLog>) -> T {
    let (value, mut logs) = decoded;
    into.append(&mut logs);
    value
}

/// A type that can describe its own wire shape without needing an
/// instance.
pub trait Documented {
    /// The fields this type decodes/encodes, in declaration order.
    fn field_docs() -> &'static [FieldDoc];
}

/// Record a `DefaultedMissingField` log entry for `field` on `type_name`.
///
/// Used by hand-written `Deserialize` impls right after falling back to an
/// `OptionalDefault`'s default value.
pub fn log_defaulted(type_name: &'static str, field: &'static str) -> DecodeLog {
    DecodeLog::DefaultedMissingField { type_name, field }
}
