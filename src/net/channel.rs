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

//! The framed transport under every stream: a length-delimited codec over TCP
//! whose frame payloads are UTF-8 JSON texts, plus the single-writer outbound
//! queue. Enqueueing never blocks and never runs under a table lock; one
//! writer task per stream drains the queue in order.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use bytes::Bytes;
use futures_util::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use tokio::{net::TcpStream, sync::mpsc, task::JoinHandle};
use tokio_util::codec::{Framed, LengthDelimitedCodec};

use crate::{errors::NetworkError, MAX_FRAME_SIZE};

/// The read half of a framed stream.
pub type FramedStream = SplitStream<Framed<TcpStream, LengthDelimitedCodec>>;

type FramedSink = SplitSink<Framed<TcpStream, LengthDelimitedCodec>, Bytes>;

/// Returns the codec used by every stream in the mesh.
pub fn codec() -> LengthDelimitedCodec {
    LengthDelimitedCodec::builder().max_frame_length(MAX_FRAME_SIZE).new_codec()
}

#[derive(Debug)]
enum Outbound {
    Frame(String),
    Shutdown,
}

/// The enqueue side of a stream's write pump. Cloning it is cheap; all clones
/// feed the same writer task.
#[derive(Clone, Debug)]
pub struct OutboundQueue {
    sender: mpsc::UnboundedSender<Outbound>,
    depth: Arc<AtomicUsize>,
    bound: Option<usize>,
}

impl OutboundQueue {
    /// Enqueues one frame for delivery. If the configured bound is exceeded,
    /// the stream is shut down instead and the frame is dropped.
    pub fn push(&self, frame: String) -> Result<(), NetworkError> {
        if let Some(bound) = self.bound {
            if self.depth.load(Ordering::Acquire) >= bound {
                let _ = self.sender.send(Outbound::Shutdown);
                return Err(NetworkError::OutboundChannelFull);
            }
        }
        self.depth.fetch_add(1, Ordering::AcqRel);
        self.sender
            .send(Outbound::Frame(frame))
            .map_err(|_| NetworkError::OutboundChannelClosed)
    }

    /// Returns the number of frames waiting to be written.
    pub fn len(&self) -> usize {
        self.depth.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Splits a fresh connection into its outbound queue and its read half, and
/// spawns the writer task that drains the queue.
pub fn split(stream: TcpStream, bound: Option<usize>) -> (OutboundQueue, FramedStream, JoinHandle<()>) {
    let framed = Framed::new(stream, codec());
    let (sink, reader) = framed.split();
    let (sender, receiver) = mpsc::unbounded_channel();
    let depth = Arc::new(AtomicUsize::new(0));

    let writer = tokio::spawn(write_pump(sink, receiver, depth.clone()));

    (OutboundQueue { sender, depth, bound }, reader, writer)
}

async fn write_pump(mut sink: FramedSink, mut receiver: mpsc::UnboundedReceiver<Outbound>, depth: Arc<AtomicUsize>) {
    while let Some(item) = receiver.recv().await {
        match item {
            Outbound::Frame(frame) => {
                depth.fetch_sub(1, Ordering::AcqRel);
                if let Err(error) = sink.send(Bytes::from(frame)).await {
                    trace!("a stream writer stopped: {error}");
                    break;
                }
            }
            Outbound::Shutdown => {
                let _ = sink.close().await;
                break;
            }
        }
    }
}

/// Reads the next frame off the stream as UTF-8 text. Returns `None` once the
/// remote side has closed the connection.
pub async fn read_frame(stream: &mut FramedStream) -> Option<Result<String, NetworkError>> {
    match stream.next().await {
        Some(Ok(bytes)) => Some(String::from_utf8(bytes.to_vec()).map_err(|_| NetworkError::InvalidFrame)),
        Some(Err(error)) => Some(Err(error.into())),
        None => None,
    }
}
