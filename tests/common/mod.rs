#![allow(dead_code)]

use std::{path::Path, sync::Mutex};

use assert_cmd::Command;
use once_cell::sync::Lazy;
use tempfile::TempDir;
use tradebook::{config::ConfigManager, storage::JsonLedger};

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates a ledger and config manager backed by a unique directory.
pub fn setup_test_env() -> (JsonLedger, ConfigManager) {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);

    let ledger = JsonLedger::open(&base, "trading_book").expect("open json ledger");
    let config_manager =
        ConfigManager::with_base_dir(base).expect("create config manager for temp dir");

    (ledger, config_manager)
}

pub struct CliOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs the binary in script mode against an isolated home directory.
pub struct ScriptHarness {
    home: TempDir,
}

impl ScriptHarness {
    pub fn new() -> Self {
        Self {
            home: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn home(&self) -> &Path {
        self.home.path()
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("tradebook_cli").expect("binary exists");
        cmd.env("TRADEBOOK_HOME", self.home())
            .env("TRADEBOOK_CLI_SCRIPT", "1")
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        cmd
    }

    pub fn run_script(&self, script: &str) -> CliOutput {
        let output = self
            .command()
            .write_stdin(script.to_string())
            .output()
            .expect("run script CLI");
        if !output.status.success() {
            panic!(
                "script CLI failed: status={}\nstdout:\n{}\nstderr:\n{}",
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        CliOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }

    pub fn trades_file(&self) -> std::path::PathBuf {
        self.home()
            .join("books")
            .join("trading_book")
            .join("trades.json")
    }
}
