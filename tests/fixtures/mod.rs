//! Shared test fixtures

#![allow(dead_code)]

use std::path::PathBuf;

/// Path of a file under `tests/fixtures`
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Contents of a text fixture
pub fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name))
        .unwrap_or_else(|e| panic!("fixture {} unreadable: {}", name, e))
}

/// Packet with a localized description, a keyword bag and a creator struct
pub const PEARS: &str = "pears.xmp";

/// Same data written by exiftool: single-quoted attributes, attribute form
pub const PEARS_EXIFTOOL: &str = "pears_exiftool.xmp";
