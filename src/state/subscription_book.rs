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

use std::collections::BTreeSet;

use uuid::Uuid;

/// One row of the subscription table: client (attached via peer) wants the
/// messages published on channel. The derive order makes the canonical tree
/// double as the by-peer index.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct Subscription {
    pub peer_id: Uuid,
    pub client_id: Uuid,
    pub channel: String,
}

/// The subscription table: one canonical owner ordered by
/// `(peer_id, client_id, channel)`, which enforces the composite uniqueness
/// invariant, plus two secondary index trees kept in lock-step for the
/// by-channel and by-client scans.
#[derive(Debug, Default)]
pub struct SubscriptionBook {
    canonical: BTreeSet<Subscription>,
    by_channel: BTreeSet<(String, Uuid, Uuid)>,
    by_client: BTreeSet<(Uuid, String, Uuid)>,
}

impl SubscriptionBook {
    /// Inserts a subscription; returns `false` if the triple already exists.
    pub fn insert(&mut self, peer_id: Uuid, client_id: Uuid, channel: &str) -> bool {
        let row = Subscription {
            peer_id,
            client_id,
            channel: channel.into(),
        };
        if !self.canonical.insert(row) {
            return false;
        }
        self.by_channel.insert((channel.into(), peer_id, client_id));
        self.by_client.insert((client_id, channel.into(), peer_id));
        true
    }

    /// Removes a subscription; returns `false` if the triple was absent.
    pub fn remove(&mut self, peer_id: Uuid, client_id: Uuid, channel: &str) -> bool {
        let row = Subscription {
            peer_id,
            client_id,
            channel: channel.into(),
        };
        if !self.canonical.remove(&row) {
            return false;
        }
        self.by_channel.remove(&(channel.into(), peer_id, client_id));
        self.by_client.remove(&(client_id, channel.into(), peer_id));
        true
    }

    /// Removes every subscription of the given client, across all peers.
    pub fn remove_all_of_client(&mut self, client_id: Uuid) -> usize {
        let rows: Vec<(Uuid, String)> = self
            .by_client
            .range((client_id, String::new(), Uuid::nil())..)
            .take_while(|(client, _, _)| *client == client_id)
            .map(|(_, channel, peer)| (*peer, channel.clone()))
            .collect();

        rows.iter()
            .filter(|(peer, channel)| self.remove(*peer, client_id, channel))
            .count()
    }

    /// Removes every subscription owned by the given peer.
    pub fn remove_all_of_peer(&mut self, peer_id: Uuid) -> usize {
        let rows: Vec<Subscription> = self.of_peer(peer_id);
        rows.iter()
            .filter(|row| self.remove(row.peer_id, row.client_id, &row.channel))
            .count()
    }

    /// Returns `true` if the given client is subscribed to the channel via
    /// any peer.
    pub fn is_subscribed(&self, client_id: Uuid, channel: &str) -> bool {
        self.by_client
            .range((client_id, channel.to_string(), Uuid::nil())..)
            .take_while(|(client, chan, _)| *client == client_id && chan == channel)
            .next()
            .is_some()
    }

    /// Returns every subscription on the given channel.
    pub fn on_channel(&self, channel: &str) -> Vec<Subscription> {
        self.by_channel
            .range((channel.to_string(), Uuid::nil(), Uuid::nil())..)
            .take_while(|(chan, _, _)| chan == channel)
            .map(|(chan, peer, client)| Subscription {
                peer_id: *peer,
                client_id: *client,
                channel: chan.clone(),
            })
            .collect()
    }

    /// Returns every subscription of the given client.
    pub fn of_client(&self, client_id: Uuid) -> Vec<Subscription> {
        self.by_client
            .range((client_id, String::new(), Uuid::nil())..)
            .take_while(|(client, _, _)| *client == client_id)
            .map(|(client, channel, peer)| Subscription {
                peer_id: *peer,
                client_id: *client,
                channel: channel.clone(),
            })
            .collect()
    }

    /// Returns every subscription owned by the given peer.
    pub fn of_peer(&self, peer_id: Uuid) -> Vec<Subscription> {
        self.canonical
            .range(
                Subscription {
                    peer_id,
                    client_id: Uuid::nil(),
                    channel: String::new(),
                }..,
            )
            .take_while(|row| row.peer_id == peer_id)
            .cloned()
            .collect()
    }

    /// Returns the whole table, in canonical order.
    pub fn all(&self) -> Vec<Subscription> {
        self.canonical.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_triple_is_unique() {
        let mut book = SubscriptionBook::default();
        let (peer, client) = (Uuid::new_v4(), Uuid::new_v4());

        assert!(book.insert(peer, client, "w"));
        assert!(!book.insert(peer, client, "w"));
        assert_eq!(book.len(), 1);

        assert!(book.remove(peer, client, "w"));
        assert!(!book.remove(peer, client, "w"));
        assert!(book.is_empty());
    }

    #[test]
    fn all_indexes_stay_in_lock_step() {
        let mut book = SubscriptionBook::default();
        let peer_a = Uuid::new_v4();
        let peer_b = Uuid::new_v4();
        let (ca, cb) = (Uuid::new_v4(), Uuid::new_v4());

        book.insert(peer_a, ca, "w");
        book.insert(peer_a, ca, "x");
        book.insert(peer_b, cb, "w");

        assert_eq!(book.on_channel("w").len(), 2);
        assert_eq!(book.of_client(ca).len(), 2);
        assert_eq!(book.of_peer(peer_b).len(), 1);
        assert!(book.is_subscribed(ca, "x"));
        assert!(!book.is_subscribed(cb, "x"));

        assert_eq!(book.remove_all_of_client(ca), 2);
        assert_eq!(book.on_channel("w").len(), 1);
        assert!(book.of_client(ca).is_empty());

        assert_eq!(book.remove_all_of_peer(peer_b), 1);
        assert!(book.is_empty());
        assert!(book.on_channel("w").is_empty());
    }
}
