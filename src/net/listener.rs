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

use std::net::SocketAddr;

use tokio::{net::TcpListener, task::JoinHandle};

use crate::{
    errors::NetworkError,
    net::{client_stream, peer_stream},
    state::State,
};

/// Binds the peer endpoint and spawns its accept loop. Binding to port 0
/// reads the OS-assigned port back into the configuration before anything
/// can advertise it.
pub async fn listen_for_peers(state: State) -> Result<(SocketAddr, JoinHandle<()>), NetworkError> {
    let listener = TcpListener::bind((state.config().address, state.config().peer_port())).await?;
    let addr = listener.local_addr()?;
    state.config().set_peer_port(addr.port());
    info!("listening for peers at {addr}");

    let task = tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, remote)) => {
                    let state = state.clone();
                    tokio::spawn(peer_stream::accept(state, stream, remote));
                }
                Err(error) => error!("failed to accept a peer stream: {error}"),
            }
        }
    });

    Ok((addr, task))
}

/// Binds the client endpoint and spawns its accept loop.
pub async fn listen_for_clients(state: State) -> Result<(SocketAddr, JoinHandle<()>), NetworkError> {
    let listener = TcpListener::bind((state.config().address, state.config().client_port())).await?;
    let addr = listener.local_addr()?;
    state.config().set_client_port(addr.port());
    info!("listening for clients at {addr}");

    let task = tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, remote)) => {
                    let state = state.clone();
                    tokio::spawn(client_stream::accept(state, stream, remote));
                }
                Err(error) => error!("failed to accept a client stream: {error}"),
            }
        }
    });

    Ok((addr, task))
}
