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

pub mod client;
pub use client::*;

pub mod client_book;
pub use client_book::*;

pub mod peer;
pub use peer::*;

pub mod subscription_book;
pub use subscription_book::*;

use std::{ops::Deref, sync::Arc};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde_json::Value;
use uuid::Uuid;

use crate::{config::Config, message::frames};

/// The membership catalogue and routing fabric of one node.
///
/// Enumerations and lookups take the table locks in shared mode; inserts and
/// removals take them exclusively. Fan-out snapshots its targets under a read
/// lock and enqueues after releasing it, so a slow stream can never hold up a
/// mutation. When more than one table is involved, locks are taken in the
/// order peers, clients, subscriptions.
pub struct InnerState {
    /// The node's unique identifier, generated at start.
    id: Uuid,
    /// The node's start-up timestamp.
    created_at: DateTime<Utc>,
    /// The pre-configured parameters of this node.
    config: Config,
    /// The peer-connection table.
    peers: RwLock<std::collections::BTreeMap<Uuid, Arc<Peer>>>,
    /// The client-connection table.
    clients: RwLock<ClientBook>,
    /// The subscription table.
    subscriptions: RwLock<SubscriptionBook>,
}

/// A cheaply clonable handle on the node state.
#[derive(Clone)]
pub struct State(Arc<InnerState>);

impl Deref for State {
    type Target = Arc<InnerState>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl State {
    /// Creates a new instance of `State`.
    pub fn new(config: Config) -> Self {
        let state = Self(Arc::new(InnerState {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            config,
            peers: Default::default(),
            clients: Default::default(),
            subscriptions: Default::default(),
        }));
        info!("state {} allocated", state.id());
        state
    }

    #[inline]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl State {
    /// Adds a peer to the table. Returns `false` without inserting if another
    /// peer already advertises the same endpoint, the sole guard against two
    /// nodes integrating each other twice.
    pub fn add_peer(&self, peer: Arc<Peer>) -> bool {
        let mut peers = self.peers.write();
        if peer.direction() == Direction::Remote
            && peers
                .values()
                .any(|known| known.has_endpoint(peer.host(), peer.peer_port(), peer.client_port()))
        {
            return false;
        }
        peers.insert(peer.id(), peer);
        true
    }

    /// Removes a peer, cascading the removal of every client attached behind
    /// it and all of their subscriptions.
    pub fn remove_peer(&self, id: Uuid) -> bool {
        let removed = self.peers.write().remove(&id);
        let Some(peer) = removed else {
            return false;
        };

        let orphans = self.clients.write().remove_all_of_peer(id);
        {
            let mut subscriptions = self.subscriptions.write();
            subscriptions.remove_all_of_peer(id);
            for client in &orphans {
                subscriptions.remove_all_of_client(client.id());
            }
        }

        debug!("peer {} removed along with {} client(s)", peer.id(), orphans.len());
        true
    }

    pub fn get_peer(&self, id: Uuid) -> Option<Arc<Peer>> {
        self.peers.read().get(&id).cloned()
    }

    /// Returns a snapshot of every peer.
    pub fn peers(&self) -> Vec<Arc<Peer>> {
        self.peers.read().values().cloned().collect()
    }

    /// Returns `true` if a peer advertising the given endpoint is known.
    pub fn has_peer_endpoint(&self, host: &str, peer_port: u16, client_port: u16) -> bool {
        self.peers
            .read()
            .values()
            .any(|peer| peer.has_endpoint(host, peer_port, client_port))
    }

    /// Adds a client record; returns `false` if the id is already known.
    pub fn add_client(&self, client: Arc<Client>) -> bool {
        self.clients.write().insert(client)
    }

    /// Removes a client, cascading the removal of its subscriptions.
    pub fn remove_client(&self, id: Uuid) -> bool {
        let removed = self.clients.write().remove(id);
        if removed.is_none() {
            return false;
        }
        self.subscriptions.write().remove_all_of_client(id);
        true
    }

    pub fn get_client(&self, id: Uuid) -> Option<Arc<Client>> {
        self.clients.read().get(id).cloned()
    }

    pub fn clients(&self) -> Vec<Arc<Client>> {
        self.clients.read().all()
    }

    pub fn client_ids(&self) -> Vec<Uuid> {
        self.clients.read().ids()
    }

    pub fn clients_of_peer(&self, peer_id: Uuid) -> Vec<Arc<Client>> {
        self.clients.read().of_peer(peer_id)
    }

    /// Adds a subscription. A subscription must reference a known client and
    /// a non-empty channel; anything else is a no-op.
    pub fn subscribe(&self, peer_id: Uuid, client_id: Uuid, channel: &str) -> bool {
        if channel.is_empty() {
            return false;
        }
        if !self.clients.read().contains(client_id) {
            return false;
        }
        self.subscriptions.write().insert(peer_id, client_id, channel)
    }

    pub fn unsubscribe(&self, peer_id: Uuid, client_id: Uuid, channel: &str) -> bool {
        self.subscriptions.write().remove(peer_id, client_id, channel)
    }

    pub fn unsubscribe_all_client(&self, client_id: Uuid) -> usize {
        self.subscriptions.write().remove_all_of_client(client_id)
    }

    pub fn unsubscribe_all_peer(&self, peer_id: Uuid) -> usize {
        self.subscriptions.write().remove_all_of_peer(peer_id)
    }

    pub fn is_subscribed(&self, client_id: Uuid, channel: &str) -> bool {
        self.subscriptions.read().is_subscribed(client_id, channel)
    }

    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.subscriptions.read().all()
    }

    pub fn subscriptions_of_client(&self, client_id: Uuid) -> Vec<Subscription> {
        self.subscriptions.read().of_client(client_id)
    }
}

impl State {
    /// Delivers a publish to the local subscribers of the channel and returns
    /// the number of matching subscriptions in this node's table, local and
    /// remote alike, excluding the originator's own.
    ///
    /// Each local delivery carries the subscriber's id, so a client learns
    /// which of its subscriptions matched.
    pub fn publish_to_clients(&self, transaction_id: Uuid, origin: Uuid, channel: &str, payload: &Value) -> usize {
        let mut count = 0;
        let mut targets = Vec::new();
        {
            let clients = self.clients.read();
            let subscriptions = self.subscriptions.read();
            for row in subscriptions.on_channel(channel) {
                if row.client_id == origin {
                    continue;
                }
                count += 1;
                if row.peer_id == self.id() {
                    if let Some(client) = clients.get(row.client_id) {
                        if client.is_local() {
                            targets.push(client.clone());
                        }
                    }
                }
            }
        }

        for client in targets {
            client.send(frames::publish_frame(transaction_id, client.id(), channel, payload).to_string());
        }
        count
    }

    /// Forwards a publish, exactly once, to every peer that owns at least one
    /// matching subscription. The forwarded copy carries the originator's id.
    /// Returns the number of peers notified.
    pub fn publish_to_peers(&self, transaction_id: Uuid, origin: Uuid, channel: &str, payload: &Value) -> usize {
        let mut notified = std::collections::BTreeSet::new();
        let mut targets = Vec::new();
        {
            let peers = self.peers.read();
            let subscriptions = self.subscriptions.read();
            for row in subscriptions.on_channel(channel) {
                if row.peer_id == self.id() || row.client_id == origin {
                    continue;
                }
                if notified.insert(row.peer_id) {
                    if let Some(peer) = peers.get(&row.peer_id) {
                        targets.push(peer.clone());
                    }
                }
            }
        }

        let frame = frames::publish_frame(transaction_id, origin, channel, payload).to_string();
        let count = targets.len();
        for peer in targets {
            peer.send(frame.clone());
        }
        count
    }

    /// Delivers a broadcast to every local client except the originator and
    /// returns the number of deliveries.
    pub fn broadcast_to_clients(&self, transaction_id: Uuid, origin: Uuid, payload: &Value) -> usize {
        let targets: Vec<Arc<Client>> = self
            .clients
            .read()
            .all()
            .into_iter()
            .filter(|client| client.id() != origin && client.is_local())
            .collect();

        let frame = frames::broadcast_frame(transaction_id, origin, payload).to_string();
        let count = targets.len();
        for client in targets {
            client.send(frame.clone());
        }
        count
    }

    /// Forwards a broadcast to every peer exactly once.
    pub fn broadcast_to_peers(&self, transaction_id: Uuid, origin: Uuid, payload: &Value) -> usize {
        let frame = frames::broadcast_frame(transaction_id, origin, payload).to_string();
        self.distribute_to_peers(&frame, None)
    }

    /// Enqueues one already-serialized frame on every peer stream, except the
    /// given one. Returns the number of peers reached.
    pub fn distribute_to_peers(&self, frame: &str, except: Option<Uuid>) -> usize {
        let targets = self.peers();
        let mut count = 0;
        for peer in targets {
            if Some(peer.id()) == except {
                continue;
            }
            peer.send(frame.to_string());
            count += 1;
        }
        count
    }

    /// Replays this node's view of the mesh to a newly registered peer: every
    /// other dialable peer as a `peer` instruction, then every known client,
    /// then every known subscription. Join announcements precede the
    /// subscriptions that reference them, so the receiver's tables never hold
    /// a dangling row.
    pub fn sync_to(&self, target: &Arc<Peer>) {
        let peers = self.peers();
        let clients = self.clients();
        let subscriptions = self.subscriptions();

        let mut count = 0;
        for peer in &peers {
            if peer.id() == target.id() || peer.peer_port() == 0 {
                continue;
            }
            target.send(
                frames::peer_frame(Uuid::new_v4(), peer.host(), peer.peer_port(), peer.client_port()).to_string(),
            );
            count += 1;
        }

        for client in &clients {
            target.send(frames::client_join_frame(Uuid::new_v4(), client.id()).to_string());
        }

        for row in &subscriptions {
            target.send(frames::subscribe_frame(Uuid::new_v4(), row.client_id, &row.channel).to_string());
        }

        debug!(
            "synced {} peer(s), {} client(s) and {} subscription(s) to peer {}",
            count,
            clients.len(),
            subscriptions.len(),
            target.id()
        );
    }
}
