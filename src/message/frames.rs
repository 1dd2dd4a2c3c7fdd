// Copyright (C) 2024-2025 Meshline Systems Inc.
// This file is part of the meshline library.

// The meshline library is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// The meshline library is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with the meshline library. If not, see <https://www.gnu.org/licenses/>.

//! Builders for the request envelopes this node originates: fan-out frames
//! forwarded to subscribers and peers, membership announcements, the peer
//! handshake, and the two server-originated specials (`welcome` and the
//! decode-error ack).
//!
//! Forwarded frames reuse the originating `transaction_id` verbatim, so a
//! subscriber can correlate a delivery with the publish that caused it.

use serde_json::{json, Value};
use uuid::Uuid;

use crate::message::timestamp_nanos;

/// The frame delivered to a subscriber, or forwarded to a peer, for `publish`.
///
/// On local delivery `client_id` is the subscriber; on the per-peer copy it is
/// the originating client, which the receiving node excludes from its own
/// delivery pass.
pub fn publish_frame(transaction_id: Uuid, client_id: Uuid, channel: &str, payload: &Value) -> Value {
    json!({
        "transaction_id": transaction_id,
        "action": "publish",
        "params": {
            "client_id": client_id,
            "channel": channel,
            "payload": payload,
        }
    })
}

/// The frame delivered to every other client, and to every peer, for
/// `broadcast`; `client_id` is always the originating client.
pub fn broadcast_frame(transaction_id: Uuid, client_id: Uuid, payload: &Value) -> Value {
    json!({
        "transaction_id": transaction_id,
        "action": "broadcast",
        "params": {
            "client_id": client_id,
            "payload": payload,
        }
    })
}

/// The frame routed toward the target client for a directed `send`.
pub fn send_frame(transaction_id: Uuid, from_client_id: Uuid, to_client_id: Uuid, payload: &Value) -> Value {
    json!({
        "transaction_id": transaction_id,
        "action": "send",
        "params": {
            "from_client_id": from_client_id,
            "to_client_id": to_client_id,
            "payload": payload,
        }
    })
}

/// The subscription announcement forwarded to peers.
pub fn subscribe_frame(transaction_id: Uuid, client_id: Uuid, channel: &str) -> Value {
    json!({
        "transaction_id": transaction_id,
        "action": "subscribe",
        "params": {
            "client_id": client_id,
            "channel": channel,
        }
    })
}

/// The unsubscription announcement forwarded to peers.
pub fn unsubscribe_frame(transaction_id: Uuid, client_id: Uuid, channel: &str) -> Value {
    json!({
        "transaction_id": transaction_id,
        "action": "unsubscribe",
        "params": {
            "client_id": client_id,
            "channel": channel,
        }
    })
}

/// The announcement that wipes a client's subscriptions mesh-wide.
pub fn unsubscribe_all_client_frame(transaction_id: Uuid, client_id: Uuid) -> Value {
    json!({
        "transaction_id": transaction_id,
        "action": "unsubscribe_all_client",
        "params": {
            "client_id": client_id,
        }
    })
}

/// The announcement that a client attached to this node.
pub fn client_join_frame(transaction_id: Uuid, client_id: Uuid) -> Value {
    json!({
        "transaction_id": transaction_id,
        "action": "client_join",
        "params": {
            "client_id": client_id,
        }
    })
}

/// The announcement that a client detached from this node.
pub fn client_leave_frame(transaction_id: Uuid, client_id: Uuid) -> Value {
    json!({
        "transaction_id": transaction_id,
        "action": "client_leave",
        "params": {
            "client_id": client_id,
        }
    })
}

/// The advertisement a dialling node sends right after its peer stream opens.
pub fn register_frame(transaction_id: Uuid, sessions_port: u16, clients_port: u16, registered: bool) -> Value {
    json!({
        "transaction_id": transaction_id,
        "action": "register",
        "params": {
            "sessions_port": sessions_port,
            "clients_port": clients_port,
            "registered": registered,
        }
    })
}

/// The instruction to dial an additional peer, sent during sync.
pub fn peer_frame(transaction_id: Uuid, host: &str, sessions_port: u16, clients_port: u16) -> Value {
    json!({
        "transaction_id": transaction_id,
        "action": "peer",
        "params": {
            "host": host,
            "sessions_port": sessions_port,
            "clients_port": clients_port,
        }
    })
}

/// The first frame on a freshly accepted client stream; the `client_id` in it
/// is how this node remembers the client.
pub fn welcome_frame(client_id: Uuid) -> Value {
    json!({
        "transaction_id": Uuid::new_v4(),
        "action": "welcome",
        "status": "success",
        "data": {
            "client_id": client_id,
        }
    })
}

/// The ack synthesized for a frame that does not decode to a JSON object.
pub fn decode_error_frame(received_at: i64) -> Value {
    let now = timestamp_nanos();
    json!({
        "transaction_id": null,
        "status": "failed",
        "message": "unprocessable entity",
        "data": {
            "body": "body must be json object",
        },
        "timestamp": now,
        "runtime": now.saturating_sub(received_at),
    })
}
