//! Shared test utilities for jot CLI integration tests.

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A scratch storage root plus a scratch working directory.
pub struct Sandbox {
    pub backend: &'static str,
    home: TempDir,
    work: TempDir,
    tools: TempDir,
}

impl Sandbox {
    pub fn new(backend: &'static str) -> Self {
        Self {
            backend,
            home: TempDir::new().expect("create home dir"),
            work: TempDir::new().expect("create work dir"),
            tools: TempDir::new().expect("create tools dir"),
        }
    }

    /// Canonical working directory, as the CLI sees it.
    pub fn work(&self) -> PathBuf {
        self.work.path().canonicalize().expect("canonical work dir")
    }

    pub fn home(&self) -> &Path {
        self.home.path()
    }

    /// Writes an editor script that replaces the buffer with `content` and
    /// returns a command line running it, usable as `--editor`.
    pub fn editor_writing(&self, name: &str, content: &str) -> String {
        let script = self.tools.path().join(name);
        fs::write(&script, format!("printf '%s' '{content}' > \"$1\"\n"))
            .expect("write editor script");
        format!("sh {}", script.display())
    }

    /// A `jot` command isolated from the caller's environment, with no
    /// arguments yet.
    #[allow(deprecated)]
    pub fn bare(&self, cwd: &Path) -> Command {
        let mut cmd = Command::cargo_bin("jot").expect("jot binary should exist");
        cmd.current_dir(cwd)
            .env_remove("JOTHOME")
            .env_remove("JOT_BACKEND")
            .env_remove("JOT_EDITOR")
            .env_remove("JOT_LOG");
        cmd
    }

    /// A `jot` command with the sandbox's global flags placed before
    /// whatever the caller appends.
    pub fn jot(&self, cwd: &Path) -> Command {
        let mut cmd = self.bare(cwd);
        cmd.arg("--home")
            .arg(self.home.path())
            .arg("--backend")
            .arg(self.backend)
            .arg("--log-level")
            .arg("info");
        cmd
    }
}

pub const BACKENDS: [&str; 2] = ["sqlite", "fs"];
