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

#[macro_use]
extern crate tracing;

pub mod config;
pub use config::*;

pub mod errors;
pub use errors::*;

pub mod kernel;
pub use kernel::*;

pub mod message;
pub use message::*;

pub mod net;
pub use net::*;

pub mod node;
pub use node::*;

pub mod repl;

pub mod state;
pub use state::*;

/// The maximum size of a single inbound or outbound frame, in bytes.
pub const MAX_FRAME_SIZE: usize = 8 * 1024 * 1024;

/// The number of seconds between two attempts to dial the same peer endpoint.
pub const DIAL_RETRY_INTERVAL_SECS: u64 = 3;
