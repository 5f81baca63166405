// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Punchlist-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Punchlist and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Command line and environment configuration for the server binary.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::model::{BuildingId, Floor, FloorId, ModelError};
use crate::store::{FolderStore, StoreError, WriteDurability};

pub const DEFAULT_PORT: u16 = 27436;

/// Building id used by `--demo`.
pub const DEMO_BUILDING_ID: &str = "demo-building";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("invalid demo data: {0}")]
    Demo(#[from] ModelError),
}

/// Punchlist issue tracking API server.
#[derive(Debug, Clone, Parser)]
#[command(name = "punchlist", version, about, long_about = None)]
pub struct Config {
    /// Directory holding issues, photos and the floor catalog (default: current directory)
    #[arg(long, env = "PUNCHLIST_DATA_DIR", conflicts_with = "demo")]
    pub data_dir: Option<PathBuf>,

    /// Address to bind the HTTP listener to
    #[arg(long, env = "PUNCHLIST_BIND", default_value = "127.0.0.1")]
    pub bind: IpAddr,

    /// Port to listen on (0 = ephemeral)
    #[arg(long, env = "PUNCHLIST_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Flush every write to disk before acknowledging it
    #[arg(long, env = "PUNCHLIST_DURABLE_WRITES")]
    pub durable_writes: bool,

    /// Lifetime of photo URLs when a request does not ask for one
    #[arg(
        long,
        env = "PUNCHLIST_PHOTO_URL_TTL_MINUTES",
        default_value_t = 60,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub photo_url_ttl_minutes: u64,

    /// Base URL blobs are served from; photo URLs use `file://` paths without it
    #[arg(long, env = "PUNCHLIST_PUBLIC_BASE_URL")]
    pub public_base_url: Option<String>,

    /// Access token handed to the 3D viewer
    #[arg(long, env = "PUNCHLIST_VIEWER_TOKEN", hide_env_values = true)]
    pub viewer_token: Option<String>,

    /// Lifetime reported for the viewer token
    #[arg(
        long,
        env = "PUNCHLIST_VIEWER_TOKEN_TTL_SECONDS",
        default_value_t = 3_600,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub viewer_token_ttl_seconds: u32,

    /// Serve from a fresh temporary directory seeded with a demo building
    #[arg(long)]
    pub demo: bool,
}

impl Config {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn photo_url_ttl(&self) -> Duration {
        Duration::from_secs(self.photo_url_ttl_minutes.saturating_mul(60))
    }

    pub fn viewer_token_lifetime(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::from(self.viewer_token_ttl_seconds))
    }

    pub fn write_durability(&self) -> WriteDurability {
        if self.durable_writes {
            WriteDurability::Durable
        } else {
            WriteDurability::BestEffort
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        if self.demo {
            let now_millis = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or(0);
            return std::env::temp_dir()
                .join(format!("punchlist-demo-{}-{now_millis}", std::process::id()));
        }
        self.data_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Opens the folder store; in demo mode also writes the demo floor catalog.
    pub fn open_store(&self) -> Result<FolderStore, ConfigError> {
        let mut store = FolderStore::new(self.data_dir()).with_durability(self.write_durability());
        if let Some(base_url) = &self.public_base_url {
            store = store.with_public_base_url(base_url.clone());
        }
        if self.demo {
            store.save_floors(&demo_floors()?)?;
            tracing::info!(
                data_dir = %store.root().display(),
                building_id = DEMO_BUILDING_ID,
                "seeded demo data"
            );
        }
        Ok(store)
    }
}

/// Three floors of [`DEMO_BUILDING_ID`].
pub fn demo_floors() -> Result<Vec<Floor>, ModelError> {
    let building = BuildingId::new(DEMO_BUILDING_ID)?;
    [("demo-1f", "1F", 1), ("demo-2f", "2F", 2), ("demo-3f", "3F", 3)]
        .into_iter()
        .map(|(id, name, number)| Floor::new(FloorId::new(id)?, building.clone(), name, number))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};
    use std::time::Duration;

    use clap::Parser;

    use super::{demo_floors, Config, DEFAULT_PORT};
    use crate::store::WriteDurability;

    fn parse(args: &[&str]) -> Result<Config, clap::Error> {
        Config::try_parse_from(std::iter::once("punchlist").chain(args.iter().copied()))
    }

    #[test]
    fn defaults() {
        let config = parse(&[]).expect("config");
        assert_eq!(config.socket_addr().ip(), IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.photo_url_ttl(), Duration::from_secs(3_600));
        assert_eq!(config.write_durability(), WriteDurability::BestEffort);
        assert_eq!(config.viewer_token_lifetime(), chrono::Duration::hours(1));
        assert_eq!(config.data_dir(), std::path::PathBuf::from("."));
    }

    #[test]
    fn flags_override_defaults() {
        let config = parse(&[
            "--data-dir",
            "/srv/punchlist",
            "--bind",
            "0.0.0.0",
            "--port",
            "8080",
            "--durable-writes",
            "--photo-url-ttl-minutes",
            "15",
            "--viewer-token",
            "secret",
        ])
        .expect("config");
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.write_durability(), WriteDurability::Durable);
        assert_eq!(config.photo_url_ttl(), Duration::from_secs(900));
        assert_eq!(config.viewer_token.as_deref(), Some("secret"));
        assert_eq!(config.data_dir(), std::path::PathBuf::from("/srv/punchlist"));
    }

    #[test]
    fn rejects_invalid_combinations() {
        assert!(parse(&["--demo", "--data-dir", "x"]).is_err());
        assert!(parse(&["--photo-url-ttl-minutes", "0"]).is_err());
        assert!(parse(&["--port", "70000"]).is_err());
    }

    #[test]
    fn demo_uses_a_fresh_temp_dir() {
        let config = parse(&["--demo"]).expect("config");
        let dir = config.data_dir();
        assert!(dir.starts_with(std::env::temp_dir()));
        assert!(dir
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with("punchlist-demo-")));
    }

    #[test]
    fn demo_floors_are_numbered() {
        let floors = demo_floors().expect("demo floors");
        let numbers = floors.iter().map(|f| f.floor_number()).collect::<Vec<_>>();
        assert_eq!(numbers, [1, 2, 3]);
    }
}
