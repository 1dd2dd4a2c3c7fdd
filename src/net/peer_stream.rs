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

//! The peer side of the two-kind stream machine. An accepted stream waits for
//! the remote node to register; a dialled stream advertises this node right
//! after connecting. Either way, every decoded frame goes through the kernel
//! in peer context, and a dead stream removes its peer record with the full
//! membership cascade.

use std::{net::SocketAddr, sync::atomic::Ordering, sync::Arc, time::Duration};

use serde_json::Value;
use tokio::{net::TcpStream, time::sleep};
use uuid::Uuid;

use crate::{
    errors::NetworkError,
    kernel::{kernel, Context},
    message::{frames, timestamp_nanos},
    net::channel::{self, FramedStream},
    state::{Direction, Peer, State},
    DIAL_RETRY_INTERVAL_SECS,
};

/// Runs a freshly accepted peer stream until it closes.
pub async fn accept(state: State, stream: TcpStream, addr: SocketAddr) {
    let bound = state.config().outbound_queue_bound;
    let (outbound, reader, _writer) = channel::split(stream, bound);

    let peer = Arc::new(Peer::new(addr, addr.ip().to_string(), Direction::Local, outbound));
    if !state.add_peer(peer.clone()) {
        return;
    }

    debug!("accepted a peer stream from {addr}");
    read_loop(state, peer, reader).await;
}

/// Dials a remote node's peer port and runs the resulting stream until it
/// closes. Refused connections are retried on a fixed interval, bounded only
/// by the configured attempt limit; a mesh converging late beats one that
/// never converges.
pub async fn connect(state: State, host: String, peer_port: u16, client_port: u16) -> Result<(), NetworkError> {
    let mut attempts = 0u32;
    let stream = loop {
        match TcpStream::connect((host.as_str(), peer_port)).await {
            Ok(stream) => break stream,
            Err(error) => {
                attempts += 1;
                if let Some(limit) = state.config().max_dial_retries {
                    if attempts >= limit {
                        return Err(NetworkError::DialFailed(format!("{host}:{peer_port}"), attempts));
                    }
                }
                info!("connection to {host}:{peer_port} refused, retrying: {error}");
                sleep(Duration::from_secs(DIAL_RETRY_INTERVAL_SECS)).await;
            }
        }
    };

    let addr = stream.peer_addr()?;
    let bound = state.config().outbound_queue_bound;
    let (outbound, reader, _writer) = channel::split(stream, bound);

    let peer = Arc::new(Peer::new(addr, host.clone(), Direction::Remote, outbound));
    peer.set_peer_port(peer_port);
    peer.set_client_port(client_port);
    // The dialled endpoint told us its ports by answering on them.
    peer.mark_as_registered();

    if !state.add_peer(peer.clone()) {
        return Err(NetworkError::PeerAlreadyConnected(format!("{host}:{peer_port}")));
    }

    // Advertise this node as soon as the stream is up. The first outgoing
    // attachment carries `registered: false`, which asks the remote node for
    // a sync; every later one suppresses it.
    let registered = state.config().registered.swap(true, Ordering::AcqRel);
    peer.send(
        frames::register_frame(
            Uuid::new_v4(),
            state.config().peer_port(),
            state.config().client_port(),
            registered,
        )
        .to_string(),
    );

    info!("connected to peer {host}:{peer_port}");
    read_loop(state, peer, reader).await;
    Ok(())
}

async fn read_loop(state: State, peer: Arc<Peer>, mut reader: FramedStream) {
    loop {
        match channel::read_frame(&mut reader).await {
            Some(Ok(frame)) => {
                let received_at = timestamp_nanos();
                match serde_json::from_str::<Value>(&frame) {
                    Ok(data) if data.is_object() => {
                        let response = kernel(&state, &data, Context::OnPeer, peer.id());
                        if !response.is_ack() {
                            peer.send(response.to_frame());
                        }
                    }
                    _ => peer.send(frames::decode_error_frame(received_at).to_string()),
                }
            }
            Some(Err(error)) => {
                debug!("peer stream {} errored: {error}", peer.id());
                break;
            }
            None => break,
        }
    }

    state.remove_peer(peer.id());
    info!("peer {} disconnected", peer.id());
}
