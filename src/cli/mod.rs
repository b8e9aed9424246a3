// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use clap::Parser;

use crate::config::NodeConfig;

/// RAG chat node
#[derive(Parser, Debug)]
#[command(name = "rag-chat-node")]
#[command(version)]
#[command(about = "PDF question answering over a hosted LLM", long_about = None)]
pub struct Cli {
    /// Interface to bind (overrides API_HOST)
    #[arg(long, env = "API_HOST")]
    pub host: Option<String>,

    /// Port to listen on (overrides API_PORT)
    #[arg(long, short, env = "API_PORT")]
    pub port: Option<u16>,

    /// Load environment variables from this file instead of `.env`
    #[arg(long)]
    pub env_file: Option<std::path::PathBuf>,
}

impl Cli {
    /// Apply command-line overrides on top of the environment configuration
    pub fn apply(&self, config: &mut NodeConfig) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
    }
}
