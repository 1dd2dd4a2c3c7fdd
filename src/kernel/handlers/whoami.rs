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
        Context, Request,
    },
    message::Response,
};

/// Reports the identity and remote endpoint of the entity owning the stream.
pub fn whoami(request: &Request<'_>, response: &mut Response) -> Outcome {
    let data = match request.context {
        Context::OnClient => match request.state.get_client(request.entity_id) {
            Some(client) => match client.addr() {
                Some(addr) => json!({
                    "id": client.id(),
                    "ip": addr.ip().to_string(),
                    "port": addr.port(),
                }),
                None => json!({ "id": client.id(), "ip": null, "port": null }),
            },
            None => {
                reply(request, response, "no effect", json!({}));
                return Ok(());
            }
        },
        Context::OnPeer => match request.state.get_peer(request.entity_id) {
            Some(peer) => json!({
                "id": peer.id(),
                "ip": peer.addr().ip().to_string(),
                "port": peer.addr().port(),
            }),
            None => {
                reply(request, response, "no effect", json!({}));
                return Ok(());
            }
        },
    };

    reply(request, response, "ok", data);
    Ok(())
}
