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

//! The client side of the two-kind stream machine. A welcome frame assigns
//! the client its id, the attachment is announced to every peer, and the
//! stream then loops decoding one request at a time. Disconnecting cascades
//! the client's subscriptions away and announces the departure.

use std::{net::SocketAddr, sync::Arc};

use serde_json::Value;
use tokio::net::TcpStream;
use uuid::Uuid;

use crate::{
    kernel::{kernel, Context},
    message::{frames, timestamp_nanos},
    net::channel,
    state::{Client, State},
};

/// Runs a freshly accepted client stream until it closes.
pub async fn accept(state: State, stream: TcpStream, addr: SocketAddr) {
    let bound = state.config().outbound_queue_bound;
    let (outbound, mut reader, _writer) = channel::split(stream, bound);

    let client = Arc::new(Client::new_local(Uuid::new_v4(), state.id(), addr, outbound));
    if !state.add_client(client.clone()) {
        return;
    }

    // The id in the welcome frame is how this node remembers the client.
    client.send(frames::welcome_frame(client.id()).to_string());
    state.distribute_to_peers(&frames::client_join_frame(Uuid::new_v4(), client.id()).to_string(), None);
    info!("client {} attached from {addr}", client.id());

    loop {
        match channel::read_frame(&mut reader).await {
            Some(Ok(frame)) => {
                let received_at = timestamp_nanos();
                match serde_json::from_str::<Value>(&frame) {
                    Ok(data) if data.is_object() => {
                        let response = kernel(&state, &data, Context::OnClient, client.id());
                        if !response.is_ack() {
                            client.send(response.to_frame());
                        }
                    }
                    _ => client.send(frames::decode_error_frame(received_at).to_string()),
                }
            }
            Some(Err(error)) => {
                debug!("client stream {} errored: {error}", client.id());
                break;
            }
            None => break,
        }
    }

    if state.remove_client(client.id()) {
        state.distribute_to_peers(&frames::client_leave_frame(Uuid::new_v4(), client.id()).to_string(), None);
    }
    info!("client {} detached", client.id());
}
