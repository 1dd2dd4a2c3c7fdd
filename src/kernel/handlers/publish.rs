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
    message::Response,
};

/// Fans a message out to the subscribers of a channel.
///
/// In client context the message is delivered locally and forwarded once to
/// every peer owning a matching subscription; in peer context it is delivered
/// locally only, which is what keeps a forwarded publish from looping.
pub fn publish(request: &Request<'_>, response: &mut Response) -> Outcome {
    let params = request.params()?;
    let channel = validators::string_param(params, "channel")?;
    let payload = validators::object_param(params, "payload")?;

    let count = match request.context {
        Context::OnClient => {
            let count = request
                .state
                .publish_to_clients(request.transaction_id, request.entity_id, channel, payload);
            let peers = request
                .state
                .publish_to_peers(request.transaction_id, request.entity_id, channel, payload);
            debug!(
                "client {} published on channel {}: {} subscription(s), {} peer(s)",
                request.entity_id, channel, count, peers
            );
            count
        }
        Context::OnPeer => {
            let client_id = validators::uuid_param(params, "client_id")?;
            request
                .state
                .publish_to_clients(request.transaction_id, client_id, channel, payload)
        }
    };

    reply(request, response, status(count > 0), json!({ "count": count }));
    Ok(())
}
