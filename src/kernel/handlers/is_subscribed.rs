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

/// Answers whether the connection's own client subscribes to a channel.
pub fn is_subscribed(request: &Request<'_>, response: &mut Response) -> Outcome {
    match request.context {
        Context::OnClient => {
            let params = request.params()?;
            let channel = validators::string_param(params, "channel")?;

            let subscribed = request.state.is_subscribed(request.entity_id, channel);
            reply(request, response, if subscribed { "yes" } else { "no" }, json!({}));
        }
        Context::OnPeer => reply(request, response, "no effect", json!({})),
    }
    Ok(())
}
