#![allow(dead_code)]

pub mod http_server;
pub mod memory;

use std::path::{Path, PathBuf};

/// Write a manifest file into `dir` and return its path.
pub fn write_manifest(dir: &Path, lines: &[&str]) -> PathBuf {
    let path = dir.join("links.txt");
    let mut text = lines.join("\n");
    text.push('\n');
    std::fs::write(&path, text).expect("write manifest");
    path
}
