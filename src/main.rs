// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Punchlist-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Punchlist and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Punchlist server entrypoint.
//!
//! Serves the issue API over HTTP from a folder store. `--demo` runs against a temporary
//! directory seeded with one building. See `punchlist --help` for every option; each one can
//! also be set through a `PUNCHLIST_*` environment variable.

use std::error::Error;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use punchlist::api::{router, AppState};
use punchlist::config::Config;
use punchlist::viewer::{CachedTokenProvider, StaticTokenSource};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for ctrl-c; shutting down");
        return;
    }
    tracing::info!("shutdown requested");
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let config = Config::parse();
        init_tracing();

        let store = config.open_store()?;
        tracing::info!(
            data_dir = %store.root().display(),
            durability = ?store.durability(),
            "opened data directory"
        );

        let mut state =
            AppState::from_store(Arc::new(store)).with_photo_url_ttl(config.photo_url_ttl());
        if let Some(token) = config.viewer_token.clone() {
            let source = StaticTokenSource::new(token, config.viewer_token_lifetime());
            state = state.with_token_provider(Arc::new(CachedTokenProvider::new(Arc::new(source))));
        } else {
            tracing::info!("no viewer token configured; /api/viewer/token will answer 503");
        }

        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;
            tracing::info!(addr = %listener.local_addr()?, "punchlist listening");
            axum::serve(listener, router(state))
                .with_graceful_shutdown(shutdown_signal())
                .await?;
            Ok::<(), Box<dyn Error>>(())
        })?;

        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("punchlist: {err}");
        std::process::exit(1);
    }
}
