//! The `toolshed` command-line interface: one subcommand per tool.

mod bazel_cmd;
mod compiledb_cmd;
mod config_cmd;
mod flagdiff_cmd;
mod libdeps_cmd;
mod yt_cmd;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::run;

#[derive(Parser)]
#[command(
    name = "toolshed",
    version,
    about = "A workbench of personal build and upload automation tools"
)]
pub struct Cli {
    /// print commands instead of running them
    #[arg(long, global = true)]
    dry_run: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// show the most recent bazel invocation and any sandboxed compiler crash
    Bazel {
        /// which command verb to look for (build, test, run, ...)
        #[arg(long, default_value = "build")]
        entry: String,
        /// read this log instead of asking `bazel info server_log`
        #[arg(long)]
        log: Option<PathBuf>,
    },
    /// sort compile_commands.json by its "file" keys
    SortCompiledb {
        /// the database to sort
        #[arg(default_value = "compile_commands.json")]
        path: PathBuf,
        /// regenerate it first via the hedron extractor
        #[arg(long)]
        generate: bool,
        /// throwaway output base used while regenerating
        #[arg(long, default_value = "/tmp/hedron_compile_commands")]
        output_base: String,
    },
    /// print static libraries in link order, dependencies first
    Libdeps {
        /// directory to scan for .a archives
        #[arg(default_value = ".")]
        dir: PathBuf,
        /// shared libraries providing the symbol baseline (default: config)
        #[arg(long)]
        baseline: Vec<PathBuf>,
        /// also list symbols nobody defines
        #[arg(long)]
        unresolved: bool,
    },
    /// diff two compiler command lines (each a file path or a literal command)
    Flagdiff { left: String, right: String },
    /// YouTube upload queue and channel audits
    Yt {
        #[command(subcommand)]
        action: YtAction,
    },
    /// manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum YtAction {
    /// upload every queued video, then move it to the done directory
    Upload {
        /// override the configured queue directory
        #[arg(long)]
        queue: Option<PathBuf>,
        /// override the configured done directory
        #[arg(long)]
        done: Option<PathBuf>,
    },
    /// audit all owned videos for processing/privacy surprises
    Videos,
    /// print the video category table for a region
    Categories {
        #[arg(long)]
        region: Option<String>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// print the effective configuration
    Show,
    /// write the default configuration file
    Init,
    /// print the configuration file path
    Path,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        if self.dry_run {
            run::set_dry_run(true);
        }
        match self.command {
            Commands::Bazel { entry, log } => bazel_cmd::run(&entry, log.as_deref()),
            Commands::SortCompiledb {
                path,
                generate,
                output_base,
            } => compiledb_cmd::run(&path, generate, &output_base),
            Commands::Libdeps {
                dir,
                baseline,
                unresolved,
            } => libdeps_cmd::run(&dir, &baseline, unresolved),
            Commands::Flagdiff { left, right } => flagdiff_cmd::run(&left, &right),
            Commands::Yt { action } => match action {
                YtAction::Upload { queue, done } => yt_cmd::upload(queue, done),
                YtAction::Videos => yt_cmd::videos(),
                YtAction::Categories { region } => yt_cmd::categories(region.as_deref()),
            },
            Commands::Config { action } => match action {
                ConfigAction::Show => config_cmd::show(),
                ConfigAction::Init => config_cmd::init(),
                ConfigAction::Path => config_cmd::path(),
            },
        }
    }
}
