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

use serde_json::{json, Value};
use uuid::Uuid;

use crate::message::timestamp_nanos;

/// The status of an ack envelope.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    Success,
    Failed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

/// The ack envelope the kernel produces for a single inbound frame.
///
/// `timestamp` is the server-side receive time of the originating request;
/// `runtime` is not a field but is computed when the envelope is serialized.
/// The `processed` flag is set once the kernel has populated the envelope, and
/// the `is_ack` flag suppresses the envelope from the wire: an ack is never
/// acknowledged back.
#[derive(Debug)]
pub struct Response {
    transaction_id: Option<Uuid>,
    status: Status,
    message: String,
    data: Value,
    timestamp: i64,
    processed: bool,
    is_ack: bool,
}

impl Response {
    /// Creates an empty envelope for a request received at the given time.
    pub fn new(timestamp: i64) -> Self {
        Self {
            transaction_id: None,
            status: Status::Success,
            message: String::new(),
            data: json!({}),
            timestamp,
            processed: false,
            is_ack: false,
        }
    }

    /// Fails the envelope, attaching a data bag that localizes the violation.
    pub fn mark_as_failed(&mut self, transaction_id: Option<Uuid>, error: &str, bag: Value) {
        self.transaction_id = transaction_id;
        self.status = Status::Failed;
        self.message = error.into();
        self.data = bag;
    }

    /// Completes the envelope successfully with the given message and data.
    pub fn set_data(&mut self, transaction_id: Uuid, message: &str, data: Value) {
        self.transaction_id = Some(transaction_id);
        self.status = Status::Success;
        self.message = message.into();
        self.data = data;
    }

    pub fn mark_as_processed(&mut self) {
        self.processed = true;
    }

    pub fn mark_as_ack(&mut self) {
        self.is_ack = true;
    }

    #[inline]
    pub fn transaction_id(&self) -> Option<Uuid> {
        self.transaction_id
    }

    #[inline]
    pub fn status(&self) -> Status {
        self.status
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[inline]
    pub fn data(&self) -> &Value {
        &self.data
    }

    #[inline]
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    #[inline]
    pub fn is_processed(&self) -> bool {
        self.processed
    }

    #[inline]
    pub fn is_ack(&self) -> bool {
        self.is_ack
    }

    /// Serializes the envelope into one wire frame; `runtime` is measured here.
    pub fn to_frame(&self) -> String {
        let runtime = timestamp_nanos().saturating_sub(self.timestamp);
        json!({
            "transaction_id": self.transaction_id,
            "action": "ack",
            "status": self.status.as_str(),
            "message": self.message,
            "data": self.data,
            "timestamp": self.timestamp,
            "runtime": runtime,
        })
        .to_string()
    }
}
