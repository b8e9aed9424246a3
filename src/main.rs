// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use rag_chat_node::{
    api::{start_server, AppState},
    cli::Cli,
    config::NodeConfig,
    providers::OpenAiClient,
    rag::PdfTextExtractor,
    version,
};
use std::{env, sync::Arc};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.env_file {
        Some(path) => {
            dotenv::from_path(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
        }
        None => {
            dotenv::dotenv().ok();
        }
    }

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    info!("Starting {}", version::get_version_string());

    let mut config = NodeConfig::from_env();
    cli.apply(&mut config);
    config
        .validate()
        .map_err(|e| anyhow!("Invalid configuration: {}", e))?;

    let client = Arc::new(
        OpenAiClient::new(&config.provider).context("Failed to create OpenAI client")?,
    );
    let api_key_set = client.has_api_key();
    if !api_key_set {
        warn!("OPENAI_API_KEY is not set; uploads and chat will fail until it is configured");
    }

    info!(
        "Chunking: size={}, overlap={}, top_k={}",
        config.rag.chunk_size, config.rag.chunk_overlap, config.rag.top_k
    );

    let state = AppState::new(
        config,
        client.clone(),
        client,
        Arc::new(PdfTextExtractor::new()),
        api_key_set,
    )?;

    start_server(state)
        .await
        .map_err(|e| anyhow!("API server failed: {}", e))?;

    Ok(())
}
