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
    net::{IpAddr, Ipv4Addr},
    sync::atomic::{AtomicBool, AtomicU16, Ordering},
};

/// A core data structure containing the pre-configured parameters of this node.
///
/// The port cells are atomic: binding to port 0 writes the OS-assigned port
/// back, and every worker reads them when advertising this node to the mesh.
pub struct Config {
    /// The address both listeners bind to.
    pub address: IpAddr,
    /// The port for incoming peer streams.
    peer_port: AtomicU16,
    /// The port for incoming client streams.
    client_port: AtomicU16,
    /// If `true`, this node dials the remote seed on startup.
    pub is_joining: bool,
    /// The address of the remote seed node.
    pub remote_address: String,
    /// The peer port of the remote seed node.
    remote_peer_port: AtomicU16,
    /// The client port of the remote seed node.
    remote_client_port: AtomicU16,
    /// The number of worker threads driving the reactor.
    pub workers: u16,
    /// Set once this node has advertised itself to the mesh, so that
    /// subsequent outgoing attachments don't request another sync.
    pub registered: AtomicBool,
    /// If `true`, the diagnostic read-eval loop is attached to stdin.
    pub repl_enabled: bool,
    /// The maximum number of dial attempts per peer endpoint; `None` retries
    /// indefinitely.
    pub max_dial_retries: Option<u32>,
    /// The bound on each stream's outbound queue; exceeding it closes the
    /// stream. `None` leaves the queue unbounded.
    pub outbound_queue_bound: Option<usize>,
}

impl Config {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        address: IpAddr,
        peer_port: u16,
        client_port: u16,
        is_joining: bool,
        remote_address: String,
        remote_peer_port: u16,
        remote_client_port: u16,
        workers: u16,
        repl_enabled: bool,
    ) -> Self {
        Self {
            address,
            peer_port: AtomicU16::new(peer_port),
            client_port: AtomicU16::new(client_port),
            is_joining,
            remote_address,
            remote_peer_port: AtomicU16::new(remote_peer_port),
            remote_client_port: AtomicU16::new(remote_client_port),
            workers,
            registered: AtomicBool::new(false),
            repl_enabled,
            max_dial_retries: None,
            outbound_queue_bound: None,
        }
    }

    /// Returns the port for incoming peer streams.
    #[inline]
    pub fn peer_port(&self) -> u16 {
        self.peer_port.load(Ordering::Acquire)
    }

    /// Sets the port for incoming peer streams; used to read back an
    /// OS-assigned port after binding to port 0.
    #[inline]
    pub fn set_peer_port(&self, port: u16) {
        self.peer_port.store(port, Ordering::Release);
    }

    /// Returns the port for incoming client streams.
    #[inline]
    pub fn client_port(&self) -> u16 {
        self.client_port.load(Ordering::Acquire)
    }

    /// Sets the port for incoming client streams.
    #[inline]
    pub fn set_client_port(&self, port: u16) {
        self.client_port.store(port, Ordering::Release);
    }

    /// Returns the peer port of the remote seed node.
    #[inline]
    pub fn remote_peer_port(&self) -> u16 {
        self.remote_peer_port.load(Ordering::Acquire)
    }

    /// Returns the client port of the remote seed node.
    #[inline]
    pub fn remote_client_port(&self) -> u16 {
        self.remote_client_port.load(Ordering::Acquire)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            11000,
            12000,
            false,
            "127.0.0.1".into(),
            9000,
            10000,
            1,
            true,
        )
    }
}
