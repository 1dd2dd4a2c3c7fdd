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
        validators, Request,
    },
    message::Response,
};

/// Describes one client by id, including the channels it subscribes to.
pub fn client(request: &Request<'_>, response: &mut Response) -> Outcome {
    let params = request.params()?;
    let client_id = validators::uuid_param(params, "client_id")?;

    match request.state.get_client(client_id) {
        Some(client) => {
            let channels: Vec<String> = request
                .state
                .subscriptions_of_client(client_id)
                .into_iter()
                .map(|row| row.channel)
                .collect();

            reply(
                request,
                response,
                "ok",
                json!({
                    "id": client.id(),
                    "peer_id": client.peer_id(),
                    "subscriptions": channels,
                }),
            );
        }
        None => reply(request, response, "no effect", json!({})),
    }
    Ok(())
}
