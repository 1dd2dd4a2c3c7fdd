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

use std::{
    net::SocketAddr,
    sync::atomic::{AtomicBool, AtomicU16, Ordering},
};

use uuid::Uuid;

use crate::net::channel::OutboundQueue;

/// The directionality of a peer stream, from this node's point of view.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    /// The remote node dialled us; its advertised ports arrive via `register`.
    Local,
    /// We dialled the remote node; its ports were known at dial time.
    Remote,
}

/// A record of another node this one is attached to, together with the stream
/// that reaches it. The advertised ports are atomic because registration and
/// fan-out run on different strands.
#[derive(Debug)]
pub struct Peer {
    id: Uuid,
    /// The remote endpoint of the underlying stream.
    addr: SocketAddr,
    /// The host this peer is reachable at for dialling purposes.
    host: String,
    /// The remote node's advertised peer port.
    peer_port: AtomicU16,
    /// The remote node's advertised client port.
    client_port: AtomicU16,
    /// Whether the remote node has told us its ports.
    registered: AtomicBool,
    direction: Direction,
    outbound: OutboundQueue,
}

impl Peer {
    pub fn new(addr: SocketAddr, host: String, direction: Direction, outbound: OutboundQueue) -> Self {
        Self {
            id: Uuid::new_v4(),
            addr,
            host,
            peer_port: AtomicU16::new(0),
            client_port: AtomicU16::new(0),
            registered: AtomicBool::new(false),
            direction,
            outbound,
        }
    }

    #[inline]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[inline]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    #[inline]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[inline]
    pub fn peer_port(&self) -> u16 {
        self.peer_port.load(Ordering::Acquire)
    }

    #[inline]
    pub fn set_peer_port(&self, port: u16) {
        self.peer_port.store(port, Ordering::Release);
    }

    #[inline]
    pub fn client_port(&self) -> u16 {
        self.client_port.load(Ordering::Acquire)
    }

    #[inline]
    pub fn set_client_port(&self, port: u16) {
        self.client_port.store(port, Ordering::Release);
    }

    #[inline]
    pub fn is_registered(&self) -> bool {
        self.registered.load(Ordering::Acquire)
    }

    #[inline]
    pub fn mark_as_registered(&self) {
        self.registered.store(true, Ordering::Release);
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns `true` if this peer is reachable at the given advertised
    /// endpoint.
    pub fn has_endpoint(&self, host: &str, peer_port: u16, client_port: u16) -> bool {
        self.host == host && self.peer_port() == peer_port && self.client_port() == client_port
    }

    /// Enqueues one frame on this peer's stream.
    pub fn send(&self, frame: String) {
        if let Err(error) = self.outbound.push(frame) {
            warn!("failed to enqueue a frame for peer {}: {error}", self.id);
        }
    }
}
