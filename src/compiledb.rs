//! Sorting and regeneration of `compile_commands.json`.
//!
//! Clangd-style compilation databases regenerated by the hedron extractor
//! come out in nondeterministic order, which makes them useless to diff.
//! Sorting by the `file` key keeps revisions comparable.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::{fs, run, Result};

/// One compilation database entry. Only `file` is interpreted; every other
/// key rides along untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(flatten)]
    pub rest: serde_json::Map<String, Value>,
}

/// Outcome of a [`sort_file`] pass, for reporting.
#[derive(Debug, Clone, Copy)]
pub struct SortReport {
    pub entries: usize,
    pub old_size: u64,
    pub new_size: u64,
}

/// Sorts the database at `path` by its `file` keys and rewrites it in place,
/// pretty-printed. Entries without a `file` key sort first and are kept.
pub fn sort_file(path: impl AsRef<Path>) -> Result<SortReport> {
    let path = path.as_ref();
    let old_size = fs::file_size(path)?;

    let mut entries: Vec<Entry> = serde_json::from_str(&fs::read_text(path)?)?;
    entries.sort_by(|a, b| a.file.cmp(&b.file));

    let mut rendered = serde_json::to_string_pretty(&entries)?;
    rendered.push('\n');
    fs::write_text(path, &rendered)?;

    let new_size = fs::file_size(path)?;
    Ok(SortReport {
        entries: entries.len(),
        old_size,
        new_size,
    })
}

/// Regenerates the database by running the hedron extractor through Bazel.
/// A throwaway output base keeps the main analysis cache intact, see
/// <https://bazel.build/advanced/performance/iteration-speed>.
pub fn generate(workspace: impl AsRef<Path>, output_base: &str) -> Result<()> {
    info!("regenerating compile_commands.json (output base {output_base})");
    run::exec("bazel")
        .arg(format!("--output_base={output_base}"))
        .args(["run", "@hedron_compile_commands//:refresh_all"])
        .current_dir(workspace.as_ref())
        .run()?;
    Ok(())
}
