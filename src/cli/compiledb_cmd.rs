use std::path::Path;

use anyhow::Context;

use crate::compiledb;

pub fn run(path: &Path, generate: bool, output_base: &str) -> anyhow::Result<()> {
    if generate {
        let workspace = std::env::current_dir()?;
        compiledb::generate(&workspace, output_base)
            .context("regenerating compile_commands.json failed")?;
    }

    let report = compiledb::sort_file(path)
        .with_context(|| format!("failed to sort {}", path.display()))?;
    println!(
        "origin file size: {}, new file size: {}",
        report.old_size, report.new_size
    );
    println!(
        "sorted {} has been written with {} entries",
        path.display(),
        report.entries
    );
    Ok(())
}
