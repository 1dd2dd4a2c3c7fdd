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

//! One handler per recognized action. A handler reads and mutates the state
//! under the table locks, may enqueue fan-out frames on other streams, and
//! completes the response; a validation failure propagates out as a
//! `Violation` that the kernel turns into a failed ack.

pub mod broadcast;
pub use broadcast::*;

pub mod client;
pub use client::*;

pub mod client_join;
pub use client_join::*;

pub mod client_leave;
pub use client_leave::*;

pub mod clients;
pub use clients::*;

pub mod clients_of_peer;
pub use clients_of_peer::*;

pub mod is_subscribed;
pub use is_subscribed::*;

pub mod peer;
pub use peer::*;

pub mod ping;
pub use ping::*;

pub mod publish;
pub use publish::*;

pub mod register;
pub use register::*;

pub mod send;
pub use send::*;

pub mod subscribe;
pub use subscribe::*;

pub mod unsubscribe;
pub use unsubscribe::*;

pub mod unsubscribe_all_client;
pub use unsubscribe_all_client::*;

pub mod unsubscribe_all_peer;
pub use unsubscribe_all_peer::*;

pub mod whoami;
pub use whoami::*;

use serde_json::Value;

use crate::{
    kernel::{validators::Violation, Request},
    message::Response,
};

/// The result of running one handler.
pub type Outcome = Result<(), Violation>;

/// Completes the response successfully with the given message and data.
pub(crate) fn reply(request: &Request<'_>, response: &mut Response, message: &str, data: Value) {
    response.set_data(request.transaction_id, message, data);
}

/// The reply convention for mutators: `ok` when something changed.
pub(crate) fn status(gate: bool) -> &'static str {
    if gate {
        "ok"
    } else {
        "no effect"
    }
}
