use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::warn;

use crate::config::Config;
use crate::libdeps;

pub fn run(dir: &Path, baseline: &[PathBuf], unresolved: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    let baseline_libs = if baseline.is_empty() {
        config.libdeps.baseline_libs.clone()
    } else {
        baseline.to_vec()
    };

    let graph = libdeps::analyze(dir, &baseline_libs)
        .with_context(|| format!("failed to analyze {}", dir.display()))?;

    println!("found {} libraries:", graph.libraries().len());
    for (index, lib) in graph.libraries().iter().enumerate() {
        println!("[{index}]: {}", lib.display());
    }

    let report = graph.ordered();
    for cycle in &report.cycles {
        let members: Vec<String> = cycle.iter().map(|lib| lib.display().to_string()).collect();
        warn!("dependency cycle between: {}", members.join(", "));
    }

    println!("libraries in dependency order: (later libraries depend on earlier libraries)");
    for lib in &report.order {
        println!("{}", lib.display());
    }

    if unresolved {
        for (lib, symbols) in graph.unresolved() {
            println!("unresolved symbols in {}:", lib.display());
            for symbol in symbols {
                println!("  {symbol}");
            }
        }
    }
    Ok(())
}
