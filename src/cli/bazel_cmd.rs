use std::path::Path;

use anyhow::{bail, Context};
use tracing::warn;

use crate::bazel::{extract_spawns, ServerLog};

pub fn run(entry: &str, log: Option<&Path>) -> anyhow::Result<()> {
    let log_path = match log {
        Some(path) => path.to_path_buf(),
        None => ServerLog::locate().context("failed to get the bazel server log path")?,
    };
    let server_log = ServerLog::from_file(&log_path)
        .with_context(|| format!("failed to read {}", log_path.display()))?;

    let invocation = match server_log.last_with_entry(entry) {
        Some(invocation) => invocation,
        None => bail!("no {entry} commands found in {}", log_path.display()),
    };

    println!("target: {}", invocation.target().unwrap_or(""));
    println!("executed at: {}", invocation.timestamp);

    if !invocation.has_flag("--sandbox_debug") {
        warn!(
            "option '--sandbox_debug' not found, please rebuild the target with '--sandbox_debug'"
        );
        return Ok(());
    }

    let spawns = extract_spawns(&invocation.exceptions);
    if spawns.is_empty() {
        println!("no sandboxed compiler crashes in this invocation");
    }
    for spawn in spawns {
        println!("compiler: {}", spawn.compiler);
        println!("compiler_args: {:?}", spawn.compiler_args);
        println!("wrapper_args: {:?}", spawn.wrapper_args);
    }
    Ok(())
}
