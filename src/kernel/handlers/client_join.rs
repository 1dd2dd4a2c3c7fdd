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

use std::sync::Arc;

use serde_json::json;

use crate::{
    kernel::{
        handlers::{reply, status, Outcome},
        validators, Context, Request,
    },
    message::Response,
    state::Client,
};

/// Registers a client attached behind the announcing peer. The forwarded id
/// is trusted; mesh-wide uniqueness is the announcer's responsibility.
pub fn client_join(request: &Request<'_>, response: &mut Response) -> Outcome {
    match request.context {
        Context::OnClient => reply(request, response, "no effect", json!({})),
        Context::OnPeer => {
            let params = request.params()?;
            let client_id = validators::uuid_param(params, "client_id")?;

            let inserted = request
                .state
                .add_client(Arc::new(Client::new_remote(client_id, request.entity_id)));
            if inserted {
                debug!("client {} joined behind peer {}", client_id, request.entity_id);
            }

            reply(request, response, status(inserted), json!({}));
        }
    }
    Ok(())
}
