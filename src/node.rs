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

use std::{net::SocketAddr, ops::Deref, sync::Arc};

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::{
    config::Config,
    errors::NetworkError,
    net::{listener, peer_stream},
    state::State,
};

/// The internals of one mesh member.
pub struct InnerNode {
    /// The message kernel and membership catalogue of this node.
    state: State,
    /// The bound address of the peer listener.
    local_peer_addr: OnceCell<SocketAddr>,
    /// The bound address of the client listener.
    local_client_addr: OnceCell<SocketAddr>,
    /// The long-lived tasks spawned by the node.
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

/// One server process; one member of the mesh.
#[derive(Clone)]
pub struct Node(Arc<InnerNode>);

impl Deref for Node {
    type Target = Arc<InnerNode>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Node {
    /// Creates a new instance of `Node`.
    pub fn new(config: Config) -> Self {
        Self(Arc::new(InnerNode {
            state: State::new(config),
            local_peer_addr: Default::default(),
            local_client_addr: Default::default(),
            tasks: Default::default(),
        }))
    }

    #[inline]
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Binds both listeners and, when configured as a joining node, dials the
    /// remote seed. The seed dial advertises this node and thereby triggers
    /// the membership sync of the whole mesh back to it.
    pub async fn start(&self) -> Result<(), NetworkError> {
        let (peer_addr, peer_task) = listener::listen_for_peers(self.state.clone()).await?;
        let (client_addr, client_task) = listener::listen_for_clients(self.state.clone()).await?;

        self.local_peer_addr
            .set(peer_addr)
            .map_err(|_| NetworkError::ListenerAddressTaken)?;
        self.local_client_addr
            .set(client_addr)
            .map_err(|_| NetworkError::ListenerAddressTaken)?;

        self.register_task(peer_task);
        self.register_task(client_task);

        if self.state.config().is_joining {
            let state = self.state.clone();
            let join_task = tokio::spawn(async move {
                let host = state.config().remote_address.clone();
                let peer_port = state.config().remote_peer_port();
                let client_port = state.config().remote_client_port();
                if let Err(error) = peer_stream::connect(state, host, peer_port, client_port).await {
                    error!("failed to join the mesh: {error}");
                }
            });
            self.register_task(join_task);
        }

        Ok(())
    }

    /// Returns the bound address of the peer listener.
    #[inline]
    pub fn local_peer_addr(&self) -> Option<SocketAddr> {
        self.local_peer_addr.get().copied()
    }

    /// Returns the bound address of the client listener.
    #[inline]
    pub fn local_client_addr(&self) -> Option<SocketAddr> {
        self.local_client_addr.get().copied()
    }

    pub fn register_task(&self, handle: JoinHandle<()>) {
        self.tasks.lock().push(handle);
    }

    /// Stops the node's long-lived tasks; pending enqueued frames are dropped
    /// with their streams.
    pub fn shut_down(&self) {
        debug!("shutting down");

        for handle in self.tasks.lock().drain(..).rev() {
            handle.abort();
        }
    }
}
