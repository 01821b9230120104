//! Static-library dependency ordering.
//!
//! Single-pass linkers resolve symbols left to right, so `-l` order matters.
//! This module derives the dependency graph of a directory full of `.a`
//! archives from their `nm` symbol tables and prints a link order in which
//! every library appears after the libraries it depends on are no longer
//! needed, i.e. dependencies first.

mod graph;
mod symbols;


use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub use graph::{DepGraph, OrderReport};
pub use symbols::{baseline_symbols, symbols_of, SymbolTable};

use crate::{fs, Result};

/// Recursively finds `.a` archives under `dir`, sorted for determinism.
pub fn find_static_libs(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let mut libs = Vec::new();
    for entry in fs::filter_extension(fs::walk_files(dir), &["a"]) {
        libs.push(entry?.path);
    }
    libs.sort();
    Ok(libs)
}

/// Full analysis of a directory: discover archives, read their symbol
/// tables, and build the dependency graph. Symbols satisfied by the
/// baseline shared libraries (libc and friends) are not treated as missing.
pub fn analyze(dir: impl AsRef<Path>, baseline_libs: &[PathBuf]) -> Result<DepGraph> {
    let libraries = find_static_libs(dir)?;
    let mut tables = Vec::with_capacity(libraries.len());
    for lib in &libraries {
        tables.push(symbols_of(lib)?);
    }
    let baseline: HashSet<String> = baseline_symbols(baseline_libs)?;
    Ok(DepGraph::build(libraries, &tables, &baseline))
}
