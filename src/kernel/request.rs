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

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    kernel::{validators, validators::Violation, Context},
    state::State,
};

/// One decoded inbound request, bound to the stream that carried it.
pub struct Request<'a> {
    pub state: &'a State,
    pub context: Context,
    /// The id of the client or peer owning the originating stream.
    pub entity_id: Uuid,
    pub transaction_id: Uuid,
    pub data: &'a Value,
    /// The server-side receive time, in nanoseconds since the epoch.
    pub timestamp: i64,
}

impl Request<'_> {
    /// Returns the `params` object of the request.
    pub fn params(&self) -> Result<&Map<String, Value>, Violation> {
        validators::params(self.data)
    }
}
