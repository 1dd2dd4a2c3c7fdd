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

use uuid::Uuid;

use crate::net::channel::OutboundQueue;

/// An external application attached to the mesh. A local client owns a stream
/// on this node; a remote client is reachable through the peer it is attached
/// behind, identified by `peer_id`.
#[derive(Debug)]
pub struct Client {
    id: Uuid,
    /// The id of the peer this client is reachable through; equal to the
    /// owning node's id when the client is attached locally.
    peer_id: Uuid,
    /// The remote endpoint of the client stream, when local.
    addr: Option<SocketAddr>,
    outbound: Option<OutboundQueue>,
}

impl Client {
    /// Creates the record of a client attached to this node.
    pub fn new_local(id: Uuid, peer_id: Uuid, addr: SocketAddr, outbound: OutboundQueue) -> Self {
        Self {
            id,
            peer_id,
            addr: Some(addr),
            outbound: Some(outbound),
        }
    }

    /// Creates the record of a client attached behind a peer.
    pub fn new_remote(id: Uuid, peer_id: Uuid) -> Self {
        Self {
            id,
            peer_id,
            addr: None,
            outbound: None,
        }
    }

    #[inline]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[inline]
    pub fn peer_id(&self) -> Uuid {
        self.peer_id
    }

    #[inline]
    pub fn addr(&self) -> Option<SocketAddr> {
        self.addr
    }

    /// Returns `true` if this client owns a stream on this node.
    #[inline]
    pub fn is_local(&self) -> bool {
        self.outbound.is_some()
    }

    /// Enqueues one frame on this client's stream, if it is local.
    pub fn send(&self, frame: String) {
        if let Some(outbound) = &self.outbound {
            if let Err(error) = outbound.push(frame) {
                warn!("failed to enqueue a frame for client {}: {error}", self.id);
            }
        }
    }
}
