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
        handlers::{reply, status, Outcome},
        validators, Context, Request,
    },
    message::{frames::subscribe_frame, Response},
};

/// Adds a subscription. In client context the subject is the connection's own
/// client and the new row is announced to every peer; in peer context the row
/// binds the forwarded client to the announcing peer and travels no further.
pub fn subscribe(request: &Request<'_>, response: &mut Response) -> Outcome {
    let params = request.params()?;
    let channel = validators::string_param(params, "channel")?;

    let (peer_id, client_id) = match request.context {
        Context::OnClient => (request.state.id(), request.entity_id),
        Context::OnPeer => (request.entity_id, validators::uuid_param(params, "client_id")?),
    };

    let inserted = request.state.subscribe(peer_id, client_id, channel);
    if inserted {
        debug!("client {} subscribed to channel {}", client_id, channel);
        if request.context == Context::OnClient {
            let frame = subscribe_frame(request.transaction_id, client_id, channel).to_string();
            request.state.distribute_to_peers(&frame, None);
        }
    }

    reply(request, response, status(inserted), json!({ "count": inserted as usize }));
    Ok(())
}
