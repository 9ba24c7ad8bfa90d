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

//! End-to-end scenarios exercising [`crate::sync::translate`],
//! [`crate::update::apply_envelope_update`], and [`crate::versioned`]
//! together, the way an application built on this crate would actually
//! drive them: decode a response, fold it into an envelope, then query the
//! result.

use ruma::{event_id, room_id, user_id};
use serde_json::json;

use crate::context::{AccessToken, AdvertisedVersions, Context};
use crate::envelope::Envelope;
use crate::filter::TimelineFilter;
use crate::update::apply_envelope_update;
use crate::vault::Vault;
use crate::versioned::invite::{self, InviteParams};

fn fresh_envelope() -> Envelope<Vault> {
    Envelope::new(Vault::new(), Context::new("example.org"))
}

fn sync(envelope: &mut Envelope<Vault>, body: serde_json::Value) {
    let (update, _logs) = crate::sync::translate(&body, &envelope.context).unwrap();
    apply_envelope_update(envelope, update).unwrap();
}

#[test]
fn empty_sync() {
    let mut envelope = fresh_envelope();
    sync(&mut envelope, json!({ "next_batch": "s1", "rooms": {} }));

    assert_eq!(envelope.content.next_batch.as_deref(), Some("s1"));
    assert!(envelope.content.rooms.is_empty());
}

#[test]
fn single_join() {
    let mut envelope = fresh_envelope();
    let room_id = room_id!("!r:example.org").to_owned();

    sync(
        &mut envelope,
        json!({
            "next_batch": "s2",
            "rooms": {
                "join": {
                    "!r:example.org": {
                        "timeline": {
                            "events": [{
                                "type": "m.room.message",
                                "event_id": "$e1:example.org",
                                "sender": "@alice:example.org",
                                "room_id": "!r:example.org",
                                "origin_server_ts": 0,
                                "content": {}
                            }],
                            "prev_batch": "p1"
                        }
                    }
                }
            }
        }),
    );

    let room = envelope.content.room(&room_id).unwrap();
    let e1 = event_id!("$e1:example.org").to_owned();
    assert!(room.events.get(&e1).is_some());

    let candidates = room.most_recent_events(&TimelineFilter::unrestricted());
    assert_eq!(candidates, vec![vec![room.events.get(&e1).unwrap()]]);
}

#[test]
fn bridging() {
    let mut envelope = fresh_envelope();
    let room_id = room_id!("!r:example.org").to_owned();

    sync(
        &mut envelope,
        json!({
            "next_batch": "s2",
            "rooms": {
                "join": {
                    "!r:example.org": {
                        "timeline": {
                            "events": [{
                                "type": "m.room.message",
                                "event_id": "$e1:example.org",
                                "sender": "@alice:example.org",
                                "room_id": "!r:example.org",
                                "origin_server_ts": 0,
                                "content": {}
                            }],
                            "prev_batch": "p1"
                        }
                    }
                }
            }
        }),
    );
    sync(
        &mut envelope,
        json!({
            "next_batch": "s3",
            "rooms": {
                "join": {
                    "!r:example.org": {
                        "timeline": {
                            "events": [{
                                "type": "m.room.message",
                                "event_id": "$e2:example.org",
                                "sender": "@alice:example.org",
                                "room_id": "!r:example.org",
                                "origin_server_ts": 0,
                                "content": {}
                            }]
                        }
                    }
                }
            }
        }),
    );

    let room = envelope.content.room(&room_id).unwrap();
    let candidates = room.most_recent_events(&TimelineFilter::unrestricted());
    let ids: Vec<_> = candidates[0].iter().map(|e| e.event_id.as_str()).collect();
    assert_eq!(candidates.len(), 1);
    assert_eq!(ids, vec!["$e1:example.org", "$e2:example.org"]);
}

#[test]
fn gap() {
    let mut envelope = fresh_envelope();
    let room_id = room_id!("!r:example.org").to_owned();

    sync(
        &mut envelope,
        json!({
            "next_batch": "s2",
            "rooms": {
                "join": {
                    "!r:example.org": {
                        "timeline": {
                            "events": [{
                                "type": "m.room.message",
                                "event_id": "$e1:example.org",
                                "sender": "@alice:example.org",
                                "room_id": "!r:example.org",
                                "origin_server_ts": 0,
                                "content": {}
                            }],
                            "prev_batch": "p1"
                        }
                    }
                }
            }
        }),
    );
    sync(
        &mut envelope,
        json!({
            "next_batch": "s3",
            "rooms": {
                "join": {
                    "!r:example.org": {
                        "timeline": {
                            "events": [{
                                "type": "m.room.message",
                                "event_id": "$e2:example.org",
                                "sender": "@alice:example.org",
                                "room_id": "!r:example.org",
                                "origin_server_ts": 0,
                                "content": {}
                            }],
                            "limited": true,
                            "prev_batch": "sX"
                        }
                    }
                }
            }
        }),
    );

    let room = envelope.content.room(&room_id).unwrap();
    let candidates = room.most_recent_events(&TimelineFilter::unrestricted());
    let ids: Vec<_> = candidates[0].iter().map(|e| e.event_id.as_str()).collect();
    assert_eq!(ids, vec!["$e2:example.org"]);
}

#[test]
fn redaction() {
    let mut envelope = fresh_envelope();
    let room_id = room_id!("!r:example.org").to_owned();

    sync(
        &mut envelope,
        json!({
            "next_batch": "s1",
            "rooms": {
                "join": {
                    "!r:example.org": {
                        "timeline": {
                            "events": [{
                                "type": "m.room.message",
                                "event_id": "$e3:example.org",
                                "sender": "@alice:example.org",
                                "room_id": "!r:example.org",
                                "origin_server_ts": 0,
                                "content": {},
                                "unsigned": {
                                    "redacted_because": {
                                        "type": "m.room.redaction",
                                        "event_id": "$e4:example.org",
                                        "sender": "@alice:example.org",
                                        "room_id": "!r:example.org",
                                        "origin_server_ts": 0,
                                        "content": {}
                                    }
                                }
                            }]
                        }
                    }
                }
            }
        }),
    );

    let room = envelope.content.room(&room_id).unwrap();
    let e3 = event_id!("$e3:example.org").to_owned();
    let e3 = room.events.get(&e3).unwrap();
    let e4 = e3.redacted_because().unwrap();
    assert_eq!(e4.event_id.as_str(), "$e4:example.org");
    assert!(e4.redacted_because().is_none());
}

#[test]
fn version_fallback() {
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
        Some(AdvertisedVersions { versions: vec!["r0.6.1".to_string()], unstable_features: Default::default() });

    let request = invite::build_request(
        &context,
        InviteParams {
            room_id: room_id!("!r:example.org").to_owned(),
            user_id: user_id!("@bob:example.org").to_owned(),
            reason: None,
        },
    )
    .into_request_description()
    .unwrap();

    assert_eq!(request.path, "https://example.org/_matrix/client/r0/rooms/!r:example.org/invite");
    assert_eq!(request.body.unwrap(), json!({ "user_id": "@bob:example.org" }));
}
