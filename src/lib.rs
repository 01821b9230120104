//! Toolshed - a workbench of build and channel automation tools.
//!
//! The crate bundles the helpers behind the `toolshed` binary: a subprocess
//! runner with tee-style output capture, a Bazel server-log parser that digs
//! sandboxed compiler crashes out of the most recent invocation, a static
//! library dependency sorter built on `nm` symbol tables, a compile database
//! sorter, a compiler flag differ, and a resumable YouTube upload queue.
//! Everything is synchronous and fails loudly through [`Result`].

pub mod bazel;
pub mod cli;
pub mod compiledb;
pub mod config;
mod error;
pub mod flags;
pub mod fs;
pub mod libdeps;
pub mod record;
pub mod run;
pub mod youtube;

pub use error::{Error, Result};
pub use run::{exec, shell, Background, Exec, RunOutput};
