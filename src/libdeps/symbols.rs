use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::{run, Result};

/// External symbols of one archive, split into what it defines and what it
/// needs from elsewhere.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    pub defined: HashSet<String>,
    pub undefined: HashSet<String>,
}

impl SymbolTable {
    /// Parses `nm --extern-only` output. Lines come as either
    /// `<type> <name>` (undefined or typed-but-unaddressed symbols) or
    /// `<addr> <type> <name>`; anything else is noise and skipped. Symbols
    /// an archive both needs and defines are self-satisfied and removed
    /// from the undefined set.
    pub fn parse_nm(output: &str) -> SymbolTable {
        let mut table = SymbolTable::default();
        for line in output.lines() {
            let fields: Vec<&str> = line.split_whitespace().collect();
            let (kind, name) = match fields.as_slice() {
                [kind, name] => (*kind, *name),
                [_, kind, name] => (*kind, *name),
                _ => continue,
            };
            if kind == "U" {
                table.undefined.insert(name.to_string());
            } else {
                table.defined.insert(name.to_string());
            }
        }
        table.undefined = table
            .undefined
            .difference(&table.defined)
            .cloned()
            .collect();
        table
    }
}

/// Reads the external symbol table of a static library.
pub fn symbols_of(library: &Path) -> Result<SymbolTable> {
    let output = run::exec("nm")
        .arg("--extern-only")
        .arg(library)
        .read()?;
    Ok(SymbolTable::parse_nm(&output))
}

/// Global symbols exported by a set of shared libraries, used as the
/// resolution baseline (symbols the runtime linker provides anyway).
/// Keeps initialized-data, text, indirect, and weak symbols, and strips
/// `@GLIBC_...` version suffixes.
pub fn baseline_symbols(libs: &[PathBuf]) -> Result<HashSet<String>> {
    let mut symbols = HashSet::new();
    for lib in libs {
        let output = match run::exec("nm")
            .args(["--dynamic", "--extern-only"])
            .arg(lib)
            .read()
        {
            Ok(output) => output,
            Err(err) => {
                warn!("skipping baseline library {}: {err}", lib.display());
                continue;
            }
        };
        symbols.extend(parse_dynamic(&output));
    }
    Ok(symbols)
}

pub(crate) fn parse_dynamic(output: &str) -> HashSet<String> {
    let mut symbols = HashSet::new();
    for line in output.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if let [_, kind, name] = fields.as_slice() {
            if matches!(*kind, "D" | "T" | "i" | "W") {
                let name = name.split('@').next().unwrap_or(name);
                symbols.insert(name.to_string());
            }
        }
    }
    symbols
}
