//! Shared helpers for tests: build a configured [`axum_test::TestServer`]
//! backed by a temporary directory layout.

use std::path::Path;

use axum_test::TestServer;

use crate::config::{Config, SeparatorConfig, StorageConfig};
use crate::separator::create_separator;
use crate::storage::Storage;
use crate::{AppState, build_router};

/// A config whose upload/output directories live under `root` (normally a
/// tempdir owned by the calling test).
pub fn test_config(root: &Path, separator: SeparatorConfig) -> Config {
    Config {
        storage: StorageConfig {
            upload_dir: root.join("uploads"),
            output_dir: root.join("output"),
            ..StorageConfig::default()
        },
        separator,
        ..Config::default()
    }
}

pub async fn test_server(config: Config) -> TestServer {
    let storage = Storage::new(&config.storage);
    storage.ensure_dirs().await.expect("Failed to create test directories");

    let state = AppState {
        storage,
        separator: create_separator(&config.separator),
        config,
    };

    TestServer::new(build_router(state)).expect("Failed to create test server")
}
