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

use serde_json::json;

use crate::{
    kernel::{
        handlers::{reply, Outcome},
        validators, Context, Request,
    },
    message::Response,
};

/// Records the advertised ports of the peer owning the stream. A first-time
/// registration (`registered: false`) also replays this node's view of the
/// mesh back to the newcomer, which is how a late joiner converges.
pub fn register(request: &Request<'_>, response: &mut Response) -> Outcome {
    match request.context {
        Context::OnClient => reply(request, response, "no effect", json!({})),
        Context::OnPeer => {
            let params = request.params()?;
            let sessions_port = validators::port_param(params, "sessions_port")?;
            let clients_port = validators::port_param(params, "clients_port")?;
            let registered = validators::bool_param(params, "registered")?;

            match request.state.get_peer(request.entity_id) {
                Some(peer) => {
                    peer.set_peer_port(sessions_port);
                    peer.set_client_port(clients_port);
                    peer.mark_as_registered();

                    info!(
                        "peer {} registered from {}:{} (clients at {})",
                        peer.id(),
                        peer.host(),
                        sessions_port,
                        clients_port
                    );

                    if !registered {
                        request.state.sync_to(&peer);
                    }

                    reply(request, response, "ok", json!({}));
                }
                None => reply(request, response, "no effect", json!({})),
            }
        }
    }
    Ok(())
}
