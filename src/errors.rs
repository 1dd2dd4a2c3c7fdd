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

use std::io::ErrorKind;

use thiserror::Error;

/// The errors surfaced by the networking stack of this node.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("the inbound frame is not valid utf-8")]
    InvalidFrame,

    #[error("failed to dial {0} after {1} attempt(s)")]
    DialFailed(String, u32),

    #[error("a peer with the endpoint {0} is already connected")]
    PeerAlreadyConnected(String),

    #[error("the outbound queue of the stream is closed")]
    OutboundChannelClosed,

    #[error("the outbound queue of the stream is full")]
    OutboundChannelFull,

    #[error("the listener address was set more than once")]
    ListenerAddressTaken,
}

impl NetworkError {
    /// Returns `true` if the error is terminal for the stream that produced it.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Io(err) => [
                ErrorKind::BrokenPipe,
                ErrorKind::ConnectionReset,
                ErrorKind::UnexpectedEof,
            ]
            .contains(&err.kind()),
            Self::InvalidFrame | Self::OutboundChannelClosed | Self::OutboundChannelFull => true,
            _ => false,
        }
    }
}
