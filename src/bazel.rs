//! Bazel server-log analysis.
//!
//! The Bazel server keeps a `java.log`-style file whose path `bazel info
//! server_log` reveals. Every client command is registered and executed
//! through the gRPC server, leaving one marker line each; this module splits
//! the log into per-command segments, recovers the full argument vector of
//! each invocation, and digs sandboxed compiler crashes out of the exception
//! traces that follow a failed spawn.

mod invocation;
mod sandbox;

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};

use tracing::debug;

pub use invocation::{Invocation, EXECUTE_MARK, REGISTER_MARK};
pub use sandbox::{extract_spawns, SandboxSpawn};

use crate::{fs, run, Result};

/// A parsed Bazel server log: the invocations that could be decoded, in file
/// order. Malformed segments are skipped, not fatal.
#[derive(Debug)]
pub struct ServerLog {
    pub invocations: Vec<Invocation>,
}

impl ServerLog {
    /// Splits `text` into segments at each register marker and parses each
    /// one. The preamble before the first marker forms a segment of its own
    /// and is discarded by validation.
    pub fn parse(text: &str) -> ServerLog {
        let lines: Vec<&str> = text.lines().collect();
        let mut segments: Vec<Vec<&str>> = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        for line in lines {
            if line.contains(REGISTER_MARK) && !current.is_empty() {
                segments.push(std::mem::take(&mut current));
            }
            current.push(line);
        }
        if !current.is_empty() {
            segments.push(current);
        }

        let mut invocations = Vec::new();
        for segment in &segments {
            match Invocation::parse(segment) {
                Ok(invocation) => invocations.push(invocation),
                Err(err) => debug!("skipping undecodable segment: {err}"),
            }
        }
        ServerLog { invocations }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<ServerLog> {
        Ok(ServerLog::parse(&fs::read_text(path)?))
    }

    /// Asks the local Bazel server where its log lives.
    pub fn locate() -> Result<PathBuf> {
        let output = run::exec("bazel").args(["info", "server_log"]).read()?;
        Ok(PathBuf::from(output.trim()))
    }

    /// The most recent invocation whose entry (`build`, `test`, `run`, ...)
    /// matches.
    pub fn last_with_entry(&self, entry: &str) -> Option<&Invocation> {
        self.invocations
            .iter()
            .rev()
            .find(|invocation| invocation.entry == entry)
    }
}
