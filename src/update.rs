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

//! The diff tree every response handler produces, and the single fold that
//! applies it.
//!
//! A [`sync`](crate::sync) translator or a [`versioned`](crate::versioned)
//! response handler never mutates a [`crate::vault::Vault`] or
//! [`crate::context::Context`] directly: it builds an update value
//! describing the mutation, which the caller applies with
//! [`apply_envelope_update`]. This keeps response translation pure (and
//! therefore trivially testable without a live `Vault`) and gives callers a
//! single place to log, batch, or replay the effects of a response.
//!
//! `Multiple` updates nest arbitrarily deep (a `/sync` response becomes one
//! `VaultUpdate::Multiple` per room, each itself holding a
//! `RoomUpdate::Multiple`), so every fold here walks an explicit stack
//! rather than recursing — a pathologically large sync response can never
//! blow the call stack.

use ruma::OwnedRoomId;
use serde_json::Value;

use crate::context::{AccessToken, AdvertisedVersions, Context};
use crate::envelope::Envelope;
use crate::error::{Error, Result};
use crate::event::{Event, StrippedEvent};
use crate::room::Room;
use crate::state::MemberKey;
use crate::timeline::Batch;
use crate::timestamp::Timestamp;
use crate::vault::Vault;

/// A mutation to apply to a [`Context`].
#[derive(Debug, Clone)]
pub enum ContextUpdate {
    /// Record a newly obtained or refreshed access token.
    SetAccessToken(AccessToken),
    /// Drop an access token, e.g. after a `401`.
    RemoveAccessToken(String),
    /// Record the cursor to resume `/sync` from.
    SetNextBatch(Option<String>),
    /// Record the homeserver's advertised spec versions.
    SetVersions(AdvertisedVersions),
    /// Record the resolved base URL.
    SetBaseUrl(String),
    /// Record this session's device id.
    SetDeviceId(String),
    /// Clear the stored password, e.g. after a successful login with
    /// [`crate::settings::Settings::remove_password_on_login`] set.
    ClearPassword,
    /// Record a clock reading to judge token expiry against, per
    /// [`Context::now`].
    SetNow(Timestamp),
    /// Record a standalone refresh token, per [`Context::refresh_token`].
    SetRefreshToken(String),
    /// Apply every update in order.
    Multiple(Vec<ContextUpdate>),
}

/// A mutation to apply to a single [`Room`].
#[derive(Debug, Clone)]
pub enum RoomUpdate {
    /// Record an event in the event store (and current state, if it has a
    /// state key).
    AddEvent(Event),
    /// Insert a batch into the room's timeline via
    /// [`crate::timeline::Timeline::insert`].
    InsertBatch(Batch),
    /// Insert a batch into the room's timeline via
    /// [`crate::timeline::Timeline::add_sync`].
    AddSyncBatch(Batch),
    /// Merge into the room's account data.
    SetAccountData(String, Value),
    /// Append an ephemeral event (typing, read receipts, ...).
    AddEphemeral(StrippedEvent),
    /// Remove a state event, e.g. a state event redacted down to nothing.
    RemoveState(MemberKey),
    /// Apply every update in order.
    Multiple(Vec<RoomUpdate>),
}

/// A mutation to apply to a [`Vault`].
#[derive(Debug, Clone)]
pub enum VaultUpdate {
    /// Merge into global account data.
    SetAccountData(String, Value),
    /// Create a room if it does not already exist; a no-op otherwise.
    CreateRoomIfNotExists(OwnedRoomId),
    /// Apply a [`RoomUpdate`] to an existing room.
    ///
    /// Fails with [`Error::NoSuchRoom`] if the room was not created first,
    /// by a preceding `CreateRoomIfNotExists` earlier in the same update
    /// tree or by prior history — this is deliberate: a sync translator
    /// that emits `UpdateRoom` without ever having emitted
    /// `CreateRoomIfNotExists` for that room has a bug worth surfacing
    /// rather than papering over with an implicit room creation.
    UpdateRoom(OwnedRoomId, RoomUpdate),
    /// Forget a room entirely, e.g. after the user leaves and the
    /// application does not want to retain history.
    RemoveRoom(OwnedRoomId),
    /// Record or refresh a pending invite's stripped state.
    SetInvite(OwnedRoomId, Vec<StrippedEvent>),
    /// Drop a pending invite, e.g. after it is joined or rejected.
    RemoveInvite(OwnedRoomId),
    /// Record the cursor to resume `/sync` from.
    SetNextBatch(Option<String>),
    /// Apply every update in order.
    Multiple(Vec<VaultUpdate>),
}

/// A mutation spanning both the context and the vault content of an
/// [`Envelope`].
#[derive(Debug, Clone)]
pub enum EnvelopeUpdate {
    /// Apply a [`ContextUpdate`].
    Context(ContextUpdate),
    /// Apply a [`VaultUpdate`] to the envelope's content.
    Content(VaultUpdate),
    /// Apply every update in order.
    Multiple(Vec<EnvelopeUpdate>),
}

/// Apply `update` to `envelope.context` and `envelope.content` in one pass.
///
/// Stack-safe: `Multiple` nodes are expanded onto an explicit work stack
/// rather than recursed into.
pub fn apply_envelope_update(envelope: &mut Envelope<Vault>, update: EnvelopeUpdate) -> Result<()> {
    let mut stack = vec![update];
    while let Some(next) = stack.pop() {
        match next {
            EnvelopeUpdate::Multiple(updates) => {
                stack.extend(updates.into_iter().rev());
            }
            EnvelopeUpdate::Context(context_update) => {
                apply_context_update(&mut envelope.context, context_update);
            }
            EnvelopeUpdate::Content(vault_update) => {
                apply_vault_update(&mut envelope.content, vault_update)?;
            }
        }
    }
    Ok(())
}

/// Apply `update` to `context` in one pass. Stack-safe, as
/// [`apply_envelope_update`].
pub fn apply_context_update(context: &mut Context, update: ContextUpdate) {
    let mut stack = vec![update];
    while let Some(next) = stack.pop() {
        match next {
            ContextUpdate::Multiple(updates) => stack.extend(updates.into_iter().rev()),
            ContextUpdate::SetAccessToken(token) => context.set_access_token(token),
            ContextUpdate::RemoveAccessToken(value) => context.remove_access_token(&value),
            ContextUpdate::SetNextBatch(next_batch) => context.next_batch = next_batch,
            ContextUpdate::SetVersions(versions) => context.versions = Some(versions),
            ContextUpdate::SetBaseUrl(base_url) => context.base_url = Some(base_url),
            ContextUpdate::SetDeviceId(device_id) => context.device_id = Some(device_id),
            ContextUpdate::ClearPassword => context.password = None,
            ContextUpdate::SetNow(now) => context.now = Some(now),
            ContextUpdate::SetRefreshToken(refresh_token) => context.refresh_token = Some(refresh_token),
        }
    }
}

/// Apply `update` to `vault` in one pass. Stack-safe, as
/// [`apply_envelope_update`].
pub fn apply_vault_update(vault: &mut Vault, update: VaultUpdate) -> Result<()> {
    let mut stack = vec![update];
    while let Some(next) = stack.pop() {
        match next {
            VaultUpdate::Multiple(updates) => stack.extend(updates.into_iter().rev()),
            VaultUpdate::SetAccountData(event_type, content) => {
                vault.account_data.insert(event_type, content);
            }
            VaultUpdate::CreateRoomIfNotExists(room_id) => {
                vault.ensure_room(&room_id);
            }
            VaultUpdate::UpdateRoom(room_id, room_update) => {
                let room = vault.room_mut(&room_id).ok_or_else(|| Error::NoSuchRoom { room_id: room_id.clone() })?;
                apply_room_update(room, room_update);
            }
            VaultUpdate::RemoveRoom(room_id) => {
                vault.rooms.remove(&room_id);
            }
            VaultUpdate::SetInvite(room_id, invite_state) => {
                let mut invite = crate::invite::Invite::new(room_id);
                invite.invite_state = invite_state;
                vault.invites.insert(invite);
            }
            VaultUpdate::RemoveInvite(room_id) => {
                vault.invites.remove(&room_id);
            }
            VaultUpdate::SetNextBatch(next_batch) => vault.next_batch = next_batch,
        }
    }
    Ok(())
}

/// Apply `update` to `room` in one pass. Stack-safe, as
/// [`apply_envelope_update`].
pub fn apply_room_update(room: &mut Room, update: RoomUpdate) {
    let mut stack = vec![update];
    while let Some(next) = stack.pop() {
        match next {
            RoomUpdate::Multiple(updates) => stack.extend(updates.into_iter().rev()),
            RoomUpdate::AddEvent(event) => room.add_event(event),
            RoomUpdate::InsertBatch(batch) => {
                room.timeline.insert(batch);
            }
            RoomUpdate::AddSyncBatch(batch) => {
                room.timeline.add_sync(batch);
            }
            RoomUpdate::SetAccountData(event_type, content) => {
                room.account_data.insert(event_type, content);
            }
            RoomUpdate::AddEphemeral(event) => room.ephemeral.push(event),
            RoomUpdate::RemoveState(key) => {
                room.state.remove(&key.event_type, &key.state_key);
            }
        }
    }
}
