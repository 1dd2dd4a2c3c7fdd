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

use std::net::IpAddr;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use meshline::{repl, Config, Node};

#[derive(Debug, Parser)]
#[command(name = "meshline", about = "A distributed real-time messaging mesh", version)]
struct Cli {
    /// The address both listeners bind to.
    #[arg(long, default_value = "0.0.0.0")]
    address: IpAddr,
    /// The port for incoming peer streams (0 lets the OS assign one).
    #[arg(long, default_value_t = 11000)]
    peer_port: u16,
    /// The port for incoming client streams (0 lets the OS assign one).
    #[arg(long, default_value_t = 12000)]
    client_port: u16,
    /// Join an existing mesh through the remote seed node.
    #[arg(long)]
    join: bool,
    /// The address of the remote seed node.
    #[arg(long, default_value = "127.0.0.1")]
    remote_address: String,
    /// The peer port of the remote seed node.
    #[arg(long, default_value_t = 9000)]
    remote_peer_port: u16,
    /// The client port of the remote seed node.
    #[arg(long, default_value_t = 10000)]
    remote_client_port: u16,
    /// The number of worker threads driving the reactor.
    #[arg(long, default_value_t = 1)]
    workers: u16,
    /// Disable the diagnostic read-eval loop on stdin.
    #[arg(long)]
    no_repl: bool,
    /// Give up dialling a peer endpoint after this many attempts.
    #[arg(long)]
    max_dial_retries: Option<u32>,
}

impl Cli {
    fn into_config(self) -> Config {
        let mut config = Config::new(
            self.address,
            self.peer_port,
            self.client_port,
            self.join,
            self.remote_address,
            self.remote_peer_port,
            self.remote_client_port,
            self.workers,
            !self.no_repl,
        );
        config.max_dial_retries = self.max_dial_retries;
        config
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = cli.into_config();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.workers.max(1) as usize)
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let node = Node::new(config);
        node.start().await?;

        if node.state().config().repl_enabled {
            tokio::spawn(repl::run(node.state().clone()));
        }

        tokio::signal::ctrl_c().await?;
        node.shut_down();
        Ok(())
    })
}
