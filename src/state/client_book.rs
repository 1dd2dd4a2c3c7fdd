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
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use uuid::Uuid;

use crate::state::Client;

/// The client table: a primary map keyed by client id plus a by-peer index
/// kept in lock-step. Client ids are unique across the mesh; this node trusts
/// the ids its peers forward.
#[derive(Debug, Default)]
pub struct ClientBook {
    clients: BTreeMap<Uuid, Arc<Client>>,
    by_peer: BTreeSet<(Uuid, Uuid)>,
}

impl ClientBook {
    /// Inserts a client; returns `false` if the id is already known.
    pub fn insert(&mut self, client: Arc<Client>) -> bool {
        if self.clients.contains_key(&client.id()) {
            return false;
        }
        self.by_peer.insert((client.peer_id(), client.id()));
        self.clients.insert(client.id(), client);
        true
    }

    /// Removes a client by id.
    pub fn remove(&mut self, id: Uuid) -> Option<Arc<Client>> {
        let client = self.clients.remove(&id)?;
        self.by_peer.remove(&(client.peer_id(), id));
        Some(client)
    }

    /// Removes every client attached behind the given peer.
    pub fn remove_all_of_peer(&mut self, peer_id: Uuid) -> Vec<Arc<Client>> {
        let ids: Vec<Uuid> = self
            .by_peer
            .range((peer_id, Uuid::nil())..)
            .take_while(|(peer, _)| *peer == peer_id)
            .map(|(_, client)| *client)
            .collect();

        ids.into_iter().filter_map(|id| self.remove(id)).collect()
    }

    pub fn get(&self, id: Uuid) -> Option<&Arc<Client>> {
        self.clients.get(&id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.clients.contains_key(&id)
    }

    /// Returns every client, in id order.
    pub fn all(&self) -> Vec<Arc<Client>> {
        self.clients.values().cloned().collect()
    }

    pub fn ids(&self) -> Vec<Uuid> {
        self.clients.keys().copied().collect()
    }

    /// Returns the clients attached behind the given peer.
    pub fn of_peer(&self, peer_id: Uuid) -> Vec<Arc<Client>> {
        self.by_peer
            .range((peer_id, Uuid::nil())..)
            .take_while(|(peer, _)| *peer == peer_id)
            .filter_map(|(_, client)| self.clients.get(client).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
