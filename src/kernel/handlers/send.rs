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
    message::{frames::send_frame, Response},
};

/// Routes a directed message toward one client: straight onto its stream when
/// it is attached here, via its owning peer otherwise. A forwarded send in
/// peer context only ever delivers locally.
pub fn send(request: &Request<'_>, response: &mut Response) -> Outcome {
    let params = request.params()?;
    let to_client_id = validators::uuid_param(params, "to_client_id")?;
    let payload = validators::object_param(params, "payload")?;

    let from_client_id = match request.context {
        Context::OnClient => request.entity_id,
        Context::OnPeer => validators::uuid_param(params, "from_client_id")?,
    };

    let Some(target) = request.state.get_client(to_client_id) else {
        reply(request, response, "no effect", json!({}));
        return Ok(());
    };

    let frame = send_frame(request.transaction_id, from_client_id, target.id(), payload).to_string();

    if target.peer_id() == request.state.id() {
        target.send(frame);
        debug!("client {} sent a message to local client {}", from_client_id, target.id());
        reply(request, response, "ok", json!({}));
    } else if request.context == Context::OnClient {
        match request.state.get_peer(target.peer_id()) {
            Some(peer) => {
                peer.send(frame);
                debug!(
                    "client {} sent a message to client {} via peer {}",
                    from_client_id,
                    target.id(),
                    peer.id()
                );
                reply(request, response, "ok", json!({}));
            }
            None => reply(request, response, "no effect", json!({})),
        }
    } else {
        reply(request, response, "no effect", json!({}));
    }
    Ok(())
}
