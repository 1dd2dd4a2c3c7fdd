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
use uuid::Uuid;

use crate::{
    kernel::{
        handlers::{reply, Outcome},
        validators, Request,
    },
    message::Response,
};

/// Lists the clients attached behind one peer.
pub fn clients_of_peer(request: &Request<'_>, response: &mut Response) -> Outcome {
    let params = request.params()?;
    let peer_id = validators::uuid_param(params, "peer_id")?;

    let ids: Vec<Uuid> = request
        .state
        .clients_of_peer(peer_id)
        .iter()
        .map(|client| client.id())
        .collect();

    reply(request, response, "ok", json!({ "id": peer_id, "clients": ids }));
    Ok(())
}
