//! Integration tests for codexec
//!
//! These tests run the real toolchains and require `python3`, `gcc` and `g++`
//! on PATH.
//! Run with: cargo test -p codexec --features integration-tests

#![cfg(feature = "integration-tests")]

use std::fs;
use std::path::Path;

use codexec::{Config, Runner};
use tempfile::TempDir;

mod compilation;
mod concurrency;
mod config_loading;
mod execution;
mod timeouts;

const FIXTURES_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

/// Helper to get fixture file content
pub(crate) fn fixture_source(name: &str) -> String {
    let path = format!("{FIXTURES_PATH}/sources/{name}");
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read fixture {path}: {e}"))
}

/// A runner whose artifacts land in a private temp directory
pub(crate) fn test_runner() -> (Runner, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = Config {
        temp_dir: Some(dir.path().to_path_buf()),
        ..Config::default()
    };
    (Runner::new(config), dir)
}

/// Names of files left behind in `dir`
pub(crate) fn leftovers(dir: &Path) -> Vec<String> {
    fs::read_dir(dir)
        .expect("Failed to read temp dir")
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}
