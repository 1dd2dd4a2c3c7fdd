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
    net::peer_stream,
};

/// Dials an additional peer announced during sync. Idempotent by the
/// advertised (host, sessions_port, clients_port) endpoint; the kernel stays
/// synchronous, so the dial itself is scheduled on the runtime.
pub fn peer(request: &Request<'_>, response: &mut Response) -> Outcome {
    match request.context {
        Context::OnClient => reply(request, response, "no effect", json!({})),
        Context::OnPeer => {
            let params = request.params()?;
            let host = validators::string_param(params, "host")?;
            let sessions_port = validators::port_param(params, "sessions_port")?;
            let clients_port = validators::port_param(params, "clients_port")?;

            if request.state.has_peer_endpoint(host, sessions_port, clients_port) {
                reply(request, response, "no effect", json!({}));
                return Ok(());
            }

            let state = request.state.clone();
            let host = host.to_string();
            tokio::spawn(async move {
                if let Err(error) = peer_stream::connect(state, host, sessions_port, clients_port).await {
                    warn!("failed to attach an announced peer: {error}");
                }
            });

            reply(request, response, "ok", json!({}));
        }
    }
    Ok(())
}
