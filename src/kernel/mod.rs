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

pub mod handlers;

pub mod request;
pub use request::*;

pub mod validators;

use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    message::{timestamp_nanos, Response},
    state::State,
};

/// The kind of stream that carried the current request. It governs which
/// params a validator may require and how far a fan-out is allowed to travel:
/// a node never re-forwards to peers what it received from a peer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Context {
    /// The request arrived on a client stream; the subject is that client.
    OnClient,
    /// The request arrived on a peer stream; the subject is that peer.
    OnPeer,
}

impl Context {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnClient => "on_client",
            Self::OnPeer => "on_peer",
        }
    }
}

/// Processes one decoded request and produces its ack envelope.
///
/// The kernel is synchronous and does no I/O: it validates, dispatches to the
/// matching handler, and returns. Any fan-out the handler performs is a pure
/// enqueue onto other streams' outbound queues. `entity_id` is the id of the
/// client or peer that owns the originating stream.
pub fn kernel(state: &State, data: &Value, context: Context, entity_id: Uuid) -> Response {
    let timestamp = timestamp_nanos();
    let mut response = Response::new(timestamp);

    // An ack is never acknowledged back; peers carry forwarded requests
    // without expecting replies, so an inbound ack dies here.
    if data.get("action").and_then(Value::as_str) == Some("ack") {
        response.mark_as_ack();
        response.mark_as_processed();
        return response;
    }

    match validators::base(data) {
        Ok(transaction_id) => {
            let request = Request {
                state,
                context,
                entity_id,
                transaction_id,
                data,
                timestamp,
            };

            // `base` has verified that `action` is a string.
            let action = data["action"].as_str().unwrap_or_default();

            let outcome = match action {
                "ping" => handlers::ping(&request, &mut response),
                "whoami" => handlers::whoami(&request, &mut response),
                "clients" => handlers::clients(&request, &mut response),
                "client" => handlers::client(&request, &mut response),
                "client_join" => handlers::client_join(&request, &mut response),
                "client_leave" => handlers::client_leave(&request, &mut response),
                "clients_of_peer" => handlers::clients_of_peer(&request, &mut response),
                "subscribe" => handlers::subscribe(&request, &mut response),
                "unsubscribe" => handlers::unsubscribe(&request, &mut response),
                "unsubscribe_all_client" => handlers::unsubscribe_all_client(&request, &mut response),
                "unsubscribe_all_peer" => handlers::unsubscribe_all_peer(&request, &mut response),
                "is_subscribed" => handlers::is_subscribed(&request, &mut response),
                "publish" => handlers::publish(&request, &mut response),
                "broadcast" => handlers::broadcast(&request, &mut response),
                "send" => handlers::send(&request, &mut response),
                "register" => handlers::register(&request, &mut response),
                "peer" => handlers::peer(&request, &mut response),
                _ => {
                    response.mark_as_failed(
                        Some(transaction_id),
                        "unprocessable entity",
                        json!({ "action": "action attribute isn't implemented" }),
                    );
                    Ok(())
                }
            };

            if let Err(violation) = outcome {
                response.mark_as_failed(Some(transaction_id), "unprocessable entity", violation.into_bag());
            }

            // Forwarded fan-out arriving on a peer stream expects no reply.
            if context == Context::OnPeer && matches!(action, "publish" | "broadcast" | "send") {
                response.mark_as_ack();
            }
        }
        Err((transaction_id, violation)) => {
            response.mark_as_failed(transaction_id, "unprocessable entity", violation.into_bag());
        }
    }

    response.mark_as_processed();
    response
}
