// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test utilities for CLI integration tests.

#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A port name that never exists, so nothing touches real hardware
pub const MISSING_PORT: &str = "/dev/gl7-test-no-such-port";

/// Config enabling pump heating
pub const POWERED_CONFIG: &str = r#"
[cycle]
he4_pump_power = 40.0
he3_pump_power = 30.0
"#;

/// Empty working directory for one test
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the project root
    pub fn file(&self, name: &str, contents: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(path, contents).expect("Failed to write file");
    }

    /// The gl7 binary, run inside the project with a clean environment
    pub fn gl7(&self) -> Command {
        let mut cmd = Command::cargo_bin("gl7").expect("gl7 binary");
        cmd.current_dir(self.dir.path())
            .env_remove("GL7_PORT")
            .env_remove("GL7_CONFIG")
            .env_remove("RUST_LOG");
        cmd
    }
}
