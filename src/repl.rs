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

//! The diagnostic read-eval loop on standard input. `dump` prints the
//! membership tables, `exit` terminates the loop; anything else is echoed.
//! Not part of the wire protocol.

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::state::State;

pub async fn run(state: State) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match line.trim() {
                "dump" => dump(&state),
                "exit" => break,
                "" => {}
                other => println!("EVALUATED: {other}"),
            },
            Ok(None) => break,
            Err(error) => {
                error!("failed to read from stdin: {error}");
                break;
            }
        }
    }
}

fn dump(state: &State) {
    let peers = state.peers();
    println!("peers {}", peers.len());
    println!("============");
    for peer in peers {
        println!("id #{}", peer.id());
        println!(
            "host={} sessions_port={} clients_port={} registered={}\n",
            peer.host(),
            peer.peer_port(),
            peer.client_port(),
            peer.is_registered()
        );
    }
    println!("============");

    let clients = state.clients();
    println!("clients {}", clients.len());
    println!("============");
    for client in clients {
        println!("id {} peer_id={}\n", client.id(), client.peer_id());
    }
    println!("============");

    let subscriptions = state.subscriptions();
    println!("subscriptions {}", subscriptions.len());
    println!("============");
    for row in subscriptions {
        println!("client_id={} peer_id={} channel={}\n", row.client_id, row.peer_id, row.channel);
    }
    println!("============");
}
