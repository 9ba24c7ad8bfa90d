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

//! A small builder for assembling a [`RequestDescription`] from a
//! [`Context`] without ever touching the network.
//!
//! The source this crate's model is drawn from expresses the same idea with
//! a phantom-typed chain whose type parameter tracks which context fields
//! have been checked for at compile time. Rust already has a way to check a
//! precondition once and carry the proof forward — a runtime check behind
//! [`Context::require`] that fails fast with
//! [`crate::error::Error::ConfigurationIncomplete`] — so `TaskChain` is
//! plain `Result` combinators instead of a second type parameter; the
//! interesting part of the original design (fail fast, name every missing
//! field at once, never build a request on an incomplete context) survives
//! unchanged.

use serde_json::Value;

use crate::context::{Context, RequiredField};
use crate::error::{Error, Result};

/// The HTTP method a [`RequestDescription`] should be sent with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
}

/// Everything needed to send a request, short of actually sending it.
///
/// Transport is out of scope for this crate (see spec Non-goals); this type
/// is the hand-off point to whatever HTTP client an application wires up.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescription {
    /// The HTTP method to use.
    pub method: HttpMethod,
    /// The request path, including any path-templated segments already
    /// substituted in.
    pub path: String,
    /// Query string parameters, in the order they should be sent.
    pub query: Vec<(String, String)>,
    /// The JSON request body, if this request carries one.
    pub body: Option<Value>,
}

/// A chain of fallible steps that builds a `T`, most commonly a
/// [`RequestDescription`].
///
/// Every constructor and combinator here is a thin wrapper over
/// `Result<T>`; the type exists to give the versioned-dispatch and sync
/// modules a vocabulary (`and_then`, `maybe`, `catch_with`) that reads the
/// way the chain is reasoned about, rather than spelling out `Result`
/// combinators inline at every call site.
#[derive(Debug, Clone)]
pub struct TaskChain<T> {
    result: Result<T>,
}

impl<T> TaskChain<T> {
    /// A chain that has already succeeded with `value`.
    pub fn succeed(value: T) -> Self {
        TaskChain { result: Ok(value) }
    }

    /// A chain that has already failed with `error`.
    pub fn fail(error: Error) -> Self {
        TaskChain { result: Err(error) }
    }

    /// Continue the chain, running `f` only if every prior step succeeded.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> Result<U>) -> TaskChain<U> {
        TaskChain { result: self.result.and_then(f) }
    }

    /// Transform the value of a successful chain, leaving a failed one
    /// untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> TaskChain<U> {
        TaskChain { result: self.result.map(f) }
    }

    /// Transform the error of a failed chain, leaving a successful one
    /// untouched.
    pub fn on_error(self, f: impl FnOnce(Error) -> Error) -> Self {
        TaskChain { result: self.result.map_err(f) }
    }

    /// Recover from a failure by running `f`, which may itself fail.
    pub fn catch_with(self, f: impl FnOnce(Error) -> Result<T>) -> Self {
        TaskChain { result: self.result.or_else(f) }
    }

    /// Continue the chain through a step that may come back empty, turning
    /// `None` into the error built by `on_missing`.
    pub fn maybe<U>(self, f: impl FnOnce(T) -> Option<U>, on_missing: impl FnOnce() -> Error) -> TaskChain<U> {
        TaskChain { result: self.result.and_then(|value| f(value).ok_or_else(on_missing)) }
    }

    /// Unwrap the chain into a plain `Result`.
    pub fn into_result(self) -> Result<T> {
        self.result
    }
}

impl TaskChain<RequestDescription> {
    /// Terminal step: hand the assembled request off to the caller.
    ///
    /// Identical to [`TaskChain::into_result`]; kept as a distinctly named
    /// terminal so call sites in [`crate::versioned`] read as "build a
    /// request", not "unwrap a result".
    pub fn into_request_description(self) -> Result<RequestDescription> {
        self.result
    }
}

impl TaskChain<()> {
    /// Start a chain by checking that every field in `fields` is present on
    /// `context`, failing fast with every missing field named at once if
    /// not.
    pub fn requiring(context: &Context, fields: &[RequiredField]) -> Self {
        TaskChain { result: context.require(fields) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requiring_fails_fast_naming_every_missing_field() {
        let context = Context::new("example.org");
        let chain = TaskChain::requiring(&context, &[RequiredField::AccessToken, RequiredField::BaseUrl]);
        let err = chain.into_result().unwrap_err();
        match err {
            Error::ConfigurationIncomplete { missing } => assert_eq!(missing, vec!["access_token", "base_url"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn and_then_short_circuits_after_failure() {
        let chain = TaskChain::<u32>::fail(Error::Forbidden).and_then(|n| Ok(n + 1));
        assert!(matches!(chain.into_result(), Err(Error::Forbidden)));
    }

    #[test]
    fn full_chain_builds_a_request_description() {
        let mut context = Context::new("example.org");
        context.base_url = Some("https://example.org".to_string());
        context.set_access_token(crate::context::AccessToken {
            value: "tok".to_string(),
            created_at: crate::timestamp::Timestamp::from_millis(0),
            expires_in_ms: None,
            last_used_at: None,
            refresh_token: None,
        });

        let request = TaskChain::requiring(&context, &[RequiredField::AccessToken, RequiredField::BaseUrl])
            .and_then(|()| {
                context
                    .most_popular_token()
                    .map(|token| (context.base_url.clone().unwrap(), token.value.clone()))
                    .ok_or(Error::Forbidden)
            })
            .map(|(base_url, _token)| RequestDescription {
                method: HttpMethod::Get,
                path: format!("{base_url}/_matrix/client/v3/sync"),
                query: Vec::new(),
                body: None,
            })
            .into_request_description()
            .unwrap();

        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.path, "https://example.org/_matrix/client/v3/sync");
    }

    #[test]
    fn maybe_turns_none_into_named_error() {
        let chain = TaskChain::succeed(Option::<u32>::None)
            .maybe(|v| v, || Error::Forbidden);
        assert!(matches!(chain.into_result(), Err(Error::Forbidden)));
    }
}
