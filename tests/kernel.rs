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

//! Kernel-level coverage: the request/ack protocol, the validator pipeline,
//! and the table round-trip laws, all without touching a socket.

use std::sync::Arc;

use serde_json::{json, Value};
use uuid::Uuid;

use meshline::{kernel, Client, Config, Context, State, Status};

/// A state with one client attached to it, the way a client stream would
/// register itself.
fn test_state() -> (State, Uuid) {
    let state = State::new(Config::default());
    let client_id = Uuid::new_v4();
    assert!(state.add_client(Arc::new(Client::new_remote(client_id, state.id()))));
    (state, client_id)
}

fn act(action: &str) -> (Uuid, Value) {
    let transaction_id = Uuid::new_v4();
    (transaction_id, json!({ "transaction_id": transaction_id, "action": action }))
}

fn act_with(action: &str, params: Value) -> (Uuid, Value) {
    let transaction_id = Uuid::new_v4();
    (
        transaction_id,
        json!({ "transaction_id": transaction_id, "action": action, "params": params }),
    )
}

#[test]
fn ping_acks_with_pong() {
    let (state, client_id) = test_state();
    let (transaction_id, data) = act("ping");

    for context in [Context::OnClient, Context::OnPeer] {
        let response = kernel(&state, &data, context, client_id);

        assert!(response.is_processed());
        assert_eq!(response.transaction_id(), Some(transaction_id));
        assert_eq!(response.status(), Status::Success);
        assert_eq!(response.message(), "pong");
        assert_eq!(response.data(), &json!({}));

        let frame: Value = serde_json::from_str(&response.to_frame()).unwrap();
        assert_eq!(frame["transaction_id"], transaction_id.to_string().as_str());
        assert_eq!(frame["action"], "ack");
        assert_eq!(frame["status"], "success");
        assert!(frame["timestamp"].as_i64().unwrap() > 0);
        assert!(frame["runtime"].as_i64().unwrap() >= 0);
    }
}

#[test]
fn invalid_transaction_id_is_rejected() {
    let (state, client_id) = test_state();
    let data = json!({ "transaction_id": "not-a-uuid", "action": "ping" });

    let response = kernel(&state, &data, Context::OnClient, client_id);

    assert!(response.is_processed());
    assert_eq!(response.transaction_id(), None);
    assert_eq!(response.status(), Status::Failed);
    assert_eq!(response.message(), "unprocessable entity");
    assert_eq!(
        response.data(),
        &json!({ "transaction_id": "transaction_id attribute must be uuid" })
    );
}

#[test]
fn the_simple_uuid_form_is_accepted() {
    let (state, client_id) = test_state();
    let transaction_id = Uuid::new_v4();
    let data = json!({ "transaction_id": transaction_id.simple().to_string(), "action": "ping" });

    let response = kernel(&state, &data, Context::OnClient, client_id);

    assert_eq!(response.status(), Status::Success);
    assert_eq!(response.transaction_id(), Some(transaction_id));
}

#[test]
fn unknown_actions_are_reported() {
    let (state, client_id) = test_state();
    let (transaction_id, data) = act("warp");

    let response = kernel(&state, &data, Context::OnClient, client_id);

    assert_eq!(response.transaction_id(), Some(transaction_id));
    assert_eq!(response.status(), Status::Failed);
    assert_eq!(response.data(), &json!({ "action": "action attribute isn't implemented" }));
}

#[test]
fn inbound_acks_are_suppressed() {
    let (state, client_id) = test_state();
    let data = json!({ "transaction_id": Uuid::new_v4(), "action": "ack", "status": "success" });

    let response = kernel(&state, &data, Context::OnPeer, client_id);

    assert!(response.is_ack());
    assert!(response.is_processed());
}

#[test]
fn forwarded_fanout_on_a_peer_stream_is_not_acked() {
    let (state, client_id) = test_state();
    let (_, data) = act_with(
        "publish",
        json!({ "client_id": Uuid::new_v4(), "channel": "w", "payload": {} }),
    );

    let on_peer = kernel(&state, &data, Context::OnPeer, Uuid::new_v4());
    assert!(on_peer.is_ack());

    // The same action from a client is a regular request and gets its ack.
    let (_, data) = act_with("publish", json!({ "channel": "w", "payload": {} }));
    let on_client = kernel(&state, &data, Context::OnClient, client_id);
    assert!(!on_client.is_ack());
}

#[test]
fn params_shape_is_validated() {
    let (state, client_id) = test_state();

    let (_, data) = act("subscribe");
    let response = kernel(&state, &data, Context::OnClient, client_id);
    assert_eq!(response.status(), Status::Failed);
    assert_eq!(response.data(), &json!({ "params": "params attribute must be present" }));

    let (_, data) = act_with("subscribe", json!("nope"));
    let response = kernel(&state, &data, Context::OnClient, client_id);
    assert_eq!(response.data(), &json!({ "params": "params attribute must be object" }));

    let (_, data) = act_with("subscribe", json!({}));
    let response = kernel(&state, &data, Context::OnClient, client_id);
    assert_eq!(response.data(), &json!({ "params": "params channel attribute must be present" }));

    let (_, data) = act_with("subscribe", json!({ "channel": 3 }));
    let response = kernel(&state, &data, Context::OnClient, client_id);
    assert_eq!(response.data(), &json!({ "params": "params channel attribute must be string" }));
}

#[test]
fn validators_are_context_aware() {
    let (state, client_id) = test_state();

    // A client-context publish has an implicit subject and omits client_id.
    let (_, data) = act_with("publish", json!({ "channel": "w", "payload": {} }));
    let response = kernel(&state, &data, Context::OnClient, client_id);
    assert_eq!(response.status(), Status::Success);

    // The same params on a peer stream are incomplete.
    let (_, data) = act_with("publish", json!({ "channel": "w", "payload": {} }));
    let response = kernel(&state, &data, Context::OnPeer, Uuid::new_v4());
    assert_eq!(response.status(), Status::Failed);
    assert_eq!(response.data(), &json!({ "params": "params client_id attribute must be present" }));

    // Register requires its full advertisement on a peer stream.
    let (_, data) = act_with("register", json!({ "sessions_port": 9000, "clients_port": "x" }));
    let response = kernel(&state, &data, Context::OnPeer, Uuid::new_v4());
    assert_eq!(response.data(), &json!({ "params": "params clients_port attribute must be number" }));

    let (_, data) = act_with("register", json!({ "sessions_port": 9000, "clients_port": 10000, "registered": 1 }));
    let response = kernel(&state, &data, Context::OnPeer, Uuid::new_v4());
    assert_eq!(response.data(), &json!({ "params": "params registered attribute must be boolean" }));

    let (_, data) = act_with("send", json!({ "to_client_id": Uuid::new_v4(), "payload": [] }));
    let response = kernel(&state, &data, Context::OnClient, client_id);
    assert_eq!(response.data(), &json!({ "params": "params payload attribute must be object" }));
}

#[test]
fn subscribe_then_is_subscribed_says_yes() {
    let (state, client_id) = test_state();

    let (_, data) = act_with("subscribe", json!({ "channel": "w" }));
    let response = kernel(&state, &data, Context::OnClient, client_id);
    assert_eq!(response.message(), "ok");
    assert_eq!(response.data(), &json!({ "count": 1 }));

    let (_, data) = act_with("is_subscribed", json!({ "channel": "w" }));
    let response = kernel(&state, &data, Context::OnClient, client_id);
    assert_eq!(response.message(), "yes");
}

#[test]
fn unsubscribe_reverts_is_subscribed_to_no() {
    let (state, client_id) = test_state();

    let (_, data) = act_with("subscribe", json!({ "channel": "w" }));
    kernel(&state, &data, Context::OnClient, client_id);

    let (_, data) = act_with("unsubscribe", json!({ "channel": "w" }));
    let response = kernel(&state, &data, Context::OnClient, client_id);
    assert_eq!(response.message(), "ok");
    assert_eq!(response.data(), &json!({ "count": 1 }));

    let (_, data) = act_with("is_subscribed", json!({ "channel": "w" }));
    let response = kernel(&state, &data, Context::OnClient, client_id);
    assert_eq!(response.message(), "no");
}

#[test]
fn a_duplicate_subscription_has_no_effect() {
    let (state, client_id) = test_state();

    let (_, data) = act_with("subscribe", json!({ "channel": "w" }));
    kernel(&state, &data, Context::OnClient, client_id);

    let (_, data) = act_with("subscribe", json!({ "channel": "w" }));
    let response = kernel(&state, &data, Context::OnClient, client_id);
    assert_eq!(response.status(), Status::Success);
    assert_eq!(response.message(), "no effect");
    assert_eq!(response.data(), &json!({ "count": 0 }));

    assert_eq!(state.subscriptions().len(), 1);
}

#[test]
fn an_empty_channel_is_never_stored() {
    let (state, client_id) = test_state();

    let (_, data) = act_with("subscribe", json!({ "channel": "" }));
    let response = kernel(&state, &data, Context::OnClient, client_id);
    assert_eq!(response.message(), "no effect");
    assert!(state.subscriptions().is_empty());
}

#[test]
fn client_join_and_leave_only_mutate_in_peer_context() {
    let (state, _) = test_state();
    let forwarded_id = Uuid::new_v4();
    let peer_entity = Uuid::new_v4();

    let (_, data) = act_with("client_join", json!({ "client_id": forwarded_id }));
    let response = kernel(&state, &data, Context::OnClient, forwarded_id);
    assert_eq!(response.message(), "no effect");
    assert!(state.get_client(forwarded_id).is_none());

    let response = kernel(&state, &data, Context::OnPeer, peer_entity);
    assert_eq!(response.message(), "ok");
    let joined = state.get_client(forwarded_id).unwrap();
    assert_eq!(joined.peer_id(), peer_entity);
    assert!(!joined.is_local());

    // A duplicate join is a no-op; ids are unique mesh-wide.
    let response = kernel(&state, &data, Context::OnPeer, peer_entity);
    assert_eq!(response.message(), "no effect");

    let (_, data) = act_with("client_leave", json!({ "client_id": forwarded_id }));
    let response = kernel(&state, &data, Context::OnPeer, peer_entity);
    assert_eq!(response.message(), "ok");
    assert!(state.get_client(forwarded_id).is_none());
}

#[test]
fn removing_a_client_cascades_its_subscriptions() {
    let (state, _) = test_state();
    let peer_entity = Uuid::new_v4();
    let forwarded_id = Uuid::new_v4();

    let (_, data) = act_with("client_join", json!({ "client_id": forwarded_id }));
    kernel(&state, &data, Context::OnPeer, peer_entity);

    let (_, data) = act_with("subscribe", json!({ "client_id": forwarded_id, "channel": "w" }));
    let response = kernel(&state, &data, Context::OnPeer, peer_entity);
    assert_eq!(response.message(), "ok");
    assert_eq!(state.subscriptions().len(), 1);

    let (_, data) = act_with("client_leave", json!({ "client_id": forwarded_id }));
    kernel(&state, &data, Context::OnPeer, peer_entity);
    assert!(state.subscriptions().is_empty());
}

#[test]
fn lookups_describe_the_membership() {
    let (state, client_id) = test_state();

    let (_, data) = act_with("subscribe", json!({ "channel": "w" }));
    kernel(&state, &data, Context::OnClient, client_id);

    let (_, data) = act("clients");
    let response = kernel(&state, &data, Context::OnClient, client_id);
    assert_eq!(response.data()["clients"], json!([client_id.to_string()]));

    let (_, data) = act_with("client", json!({ "client_id": client_id }));
    let response = kernel(&state, &data, Context::OnClient, client_id);
    assert_eq!(response.message(), "ok");
    assert_eq!(response.data()["id"], client_id.to_string().as_str());
    assert_eq!(response.data()["peer_id"], state.id().to_string().as_str());
    assert_eq!(response.data()["subscriptions"], json!(["w"]));

    let (_, data) = act_with("client", json!({ "client_id": Uuid::new_v4() }));
    let response = kernel(&state, &data, Context::OnClient, client_id);
    assert_eq!(response.message(), "no effect");

    let (_, data) = act_with("clients_of_peer", json!({ "peer_id": state.id() }));
    let response = kernel(&state, &data, Context::OnClient, client_id);
    assert_eq!(response.data()["clients"], json!([client_id.to_string()]));
}

#[test]
fn unsubscribe_all_wipes_by_client_and_by_peer() {
    let (state, client_id) = test_state();
    let peer_entity = Uuid::new_v4();
    let forwarded_id = Uuid::new_v4();

    let (_, data) = act_with("subscribe", json!({ "channel": "w" }));
    kernel(&state, &data, Context::OnClient, client_id);
    let (_, data) = act_with("subscribe", json!({ "channel": "x" }));
    kernel(&state, &data, Context::OnClient, client_id);

    let (_, data) = act_with("client_join", json!({ "client_id": forwarded_id }));
    kernel(&state, &data, Context::OnPeer, peer_entity);
    let (_, data) = act_with("subscribe", json!({ "client_id": forwarded_id, "channel": "w" }));
    kernel(&state, &data, Context::OnPeer, peer_entity);

    let (_, data) = act_with("unsubscribe_all_client", json!({ "client_id": client_id }));
    let response = kernel(&state, &data, Context::OnClient, client_id);
    assert_eq!(response.message(), "ok");
    assert_eq!(response.data(), &json!({ "count": 2 }));

    let (_, data) = act_with("unsubscribe_all_peer", json!({ "peer_id": peer_entity }));
    let response = kernel(&state, &data, Context::OnClient, client_id);
    assert_eq!(response.data(), &json!({ "count": 1 }));

    assert!(state.subscriptions().is_empty());

    let (_, data) = act_with("unsubscribe_all_peer", json!({ "peer_id": peer_entity }));
    let response = kernel(&state, &data, Context::OnClient, client_id);
    assert_eq!(response.message(), "no effect");
    assert_eq!(response.data(), &json!({ "count": 0 }));
}

#[test]
fn send_to_an_unknown_client_has_no_effect() {
    let (state, client_id) = test_state();
    let (_, data) = act_with("send", json!({ "to_client_id": Uuid::new_v4(), "payload": { "m": "EHLO" } }));

    let response = kernel(&state, &data, Context::OnClient, client_id);

    assert_eq!(response.status(), Status::Success);
    assert_eq!(response.message(), "no effect");
}

#[test]
fn publish_counts_matching_subscriptions_except_the_originator() {
    let (state, client_id) = test_state();
    let peer_entity = Uuid::new_v4();
    let remote_id = Uuid::new_v4();

    // The publisher's own subscription never counts.
    let (_, data) = act_with("subscribe", json!({ "channel": "w" }));
    kernel(&state, &data, Context::OnClient, client_id);
    let (_, data) = act_with("publish", json!({ "channel": "w", "payload": { "m": "EHLO" } }));
    let response = kernel(&state, &data, Context::OnClient, client_id);
    assert_eq!(response.message(), "no effect");
    assert_eq!(response.data(), &json!({ "count": 0 }));

    // A remote subscription does.
    let (_, data) = act_with("client_join", json!({ "client_id": remote_id }));
    kernel(&state, &data, Context::OnPeer, peer_entity);
    let (_, data) = act_with("subscribe", json!({ "client_id": remote_id, "channel": "w" }));
    kernel(&state, &data, Context::OnPeer, peer_entity);

    let (_, data) = act_with("publish", json!({ "channel": "w", "payload": { "m": "EHLO" } }));
    let response = kernel(&state, &data, Context::OnClient, client_id);
    assert_eq!(response.message(), "ok");
    assert_eq!(response.data(), &json!({ "count": 1 }));
}

#[test]
fn register_and_peer_have_no_effect_on_a_client_stream() {
    let (state, client_id) = test_state();

    let (_, data) = act_with(
        "register",
        json!({ "sessions_port": 9000, "clients_port": 10000, "registered": false }),
    );
    let response = kernel(&state, &data, Context::OnClient, client_id);
    assert_eq!(response.message(), "no effect");

    let (_, data) = act_with("peer", json!({ "host": "127.0.0.1", "sessions_port": 9000, "clients_port": 10000 }));
    let response = kernel(&state, &data, Context::OnClient, client_id);
    assert_eq!(response.message(), "no effect");

    let (_, data) = act_with("is_subscribed", json!({ "channel": "w" }));
    let response = kernel(&state, &data, Context::OnPeer, Uuid::new_v4());
    assert_eq!(response.message(), "no effect");
}
