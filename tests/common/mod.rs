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

#![allow(dead_code)]

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    time::Duration,
};

use anyhow::{anyhow, Result};
use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::{
    net::TcpStream,
    time::{sleep, timeout},
};
use tokio_util::codec::{Framed, LengthDelimitedCodec};
use uuid::Uuid;

use meshline::{codec, Config, Node};

pub const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Starts a standalone node on OS-assigned ports, with the repl disabled.
pub async fn test_node() -> Result<Node> {
    let config = Config::new(LOCALHOST, 0, 0, false, "127.0.0.1".into(), 0, 0, 1, false);
    let node = Node::new(config);
    node.start().await?;
    Ok(node)
}

/// Starts a node that joins the mesh through the given seed node.
pub async fn joining_node(seed: &Node) -> Result<Node> {
    let seed_peer = seed.local_peer_addr().ok_or_else(|| anyhow!("the seed node is not started"))?;
    let seed_client = seed
        .local_client_addr()
        .ok_or_else(|| anyhow!("the seed node is not started"))?;

    let config = Config::new(
        LOCALHOST,
        0,
        0,
        true,
        seed_peer.ip().to_string(),
        seed_peer.port(),
        seed_client.port(),
        1,
        false,
    );
    let node = Node::new(config);
    node.start().await?;
    Ok(node)
}

/// Polls a condition until it holds, for at most `secs` seconds.
pub async fn wait_until<F: Fn() -> bool>(condition: F, secs: u64) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(secs);
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        sleep(Duration::from_millis(25)).await;
    }
    condition()
}

/// A fake client application: a bare framed socket speaking the wire protocol.
pub struct TestClient {
    framed: Framed<TcpStream, LengthDelimitedCodec>,
    pub id: Uuid,
}

impl TestClient {
    /// Connects a bare framed socket to a node's peer endpoint, posing as
    /// another node. Peer streams get no welcome; the id is this fake node's
    /// own identity.
    pub async fn fake_peer(addr: SocketAddr) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self {
            framed: Framed::new(stream, codec()),
            id: Uuid::new_v4(),
        })
    }

    /// Connects to a node's client endpoint and consumes the welcome frame.
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        let mut framed = Framed::new(stream, codec());

        let welcome = next_frame(&mut framed).await?;
        assert_eq!(welcome["action"], "welcome");
        assert_eq!(welcome["status"], "success");
        let id = Uuid::parse_str(
            welcome["data"]["client_id"]
                .as_str()
                .ok_or_else(|| anyhow!("welcome frame without a client id"))?,
        )?;

        Ok(Self { framed, id })
    }

    /// Sends one request and returns the next inbound frame (the ack, as long
    /// as no unsolicited frame is in flight for this client).
    pub async fn request(&mut self, frame: Value) -> Result<Value> {
        self.send(frame).await?;
        self.read().await
    }

    /// Sends one action with the given params, returning the ack and the
    /// transaction id it should echo.
    pub async fn act(&mut self, action: &str, params: Value) -> Result<(Uuid, Value)> {
        let transaction_id = Uuid::new_v4();
        let ack = self
            .request(json!({
                "transaction_id": transaction_id,
                "action": action,
                "params": params,
            }))
            .await?;
        Ok((transaction_id, ack))
    }

    pub async fn send(&mut self, frame: Value) -> Result<()> {
        self.send_text(&frame.to_string()).await
    }

    /// Sends a raw text frame, JSON or not.
    pub async fn send_text(&mut self, text: &str) -> Result<()> {
        self.framed.send(Bytes::from(text.to_string())).await?;
        Ok(())
    }

    /// Reads the next inbound frame, waiting at most five seconds.
    pub async fn read(&mut self) -> Result<Value> {
        next_frame(&mut self.framed).await
    }

    /// Reads the next inbound frame if one arrives within the given wait.
    pub async fn try_read(&mut self, wait: Duration) -> Option<Value> {
        match timeout(wait, self.framed.next()).await {
            Ok(Some(Ok(bytes))) => serde_json::from_slice(&bytes).ok(),
            _ => None,
        }
    }
}

async fn next_frame(framed: &mut Framed<TcpStream, LengthDelimitedCodec>) -> Result<Value> {
    let bytes = timeout(Duration::from_secs(5), framed.next())
        .await
        .map_err(|_| anyhow!("timed out waiting for a frame"))?
        .ok_or_else(|| anyhow!("the stream closed"))??;
    Ok(serde_json::from_slice(&bytes)?)
}
