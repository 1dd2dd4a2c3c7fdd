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
    message::{frames::unsubscribe_all_client_frame, Response},
};

/// Removes every subscription of one client.
pub fn unsubscribe_all_client(request: &Request<'_>, response: &mut Response) -> Outcome {
    let params = request.params()?;
    let client_id = validators::uuid_param(params, "client_id")?;

    let count = request.state.unsubscribe_all_client(client_id);
    if count > 0 && request.context == Context::OnClient {
        let frame = unsubscribe_all_client_frame(request.transaction_id, client_id).to_string();
        request.state.distribute_to_peers(&frame, None);
    }

    reply(request, response, status(count > 0), json!({ "count": count }));
    Ok(())
}
