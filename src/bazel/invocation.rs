use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;

use crate::{Error, Result};

/// Marker left when the server registers an incoming client command.
pub const REGISTER_MARK: &str =
    "[com.google.devtools.build.lib.server.CommandManager.registerCommand]";

/// Marker left when the gRPC server actually executes the command; the full
/// argument vector follows it.
pub const EXECUTE_MARK: &str =
    "[com.google.devtools.build.lib.server.GrpcServerImpl.executeCommand]";

/// One client command recovered from the server log.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// The command verb: `build`, `test`, `run`, `info`, ...
    pub entry: String,
    /// Arguments interpreted by the server (startup options, targets).
    pub server_args: Vec<String>,
    /// Arguments after `--`, passed to the target binary.
    pub target_args: Vec<String>,
    /// Client environment forwarded via `--client_env=KEY=VALUE`.
    pub client_env: BTreeMap<String, String>,
    /// When the server executed the command (UTC).
    pub timestamp: DateTime<Utc>,
    /// `Caused by:` exception blocks found inside the segment.
    pub exceptions: Vec<String>,
}

impl Invocation {
    /// Parses one log segment. A valid segment holds exactly one register
    /// line and one execute line.
    pub fn parse(segment: &[&str]) -> Result<Invocation> {
        let register_count = segment
            .iter()
            .filter(|line| line.contains(REGISTER_MARK))
            .count();
        let execute_lines: Vec<&str> = segment
            .iter()
            .copied()
            .filter(|line| line.contains(EXECUTE_MARK))
            .collect();
        if register_count != 1 || execute_lines.len() != 1 {
            return Err(Error::LogFormat(format!(
                "segment must contain exactly one register and one execute line \
                 (got {register_count} and {})",
                execute_lines.len()
            )));
        }
        let execute_line = execute_lines[0];

        let timestamp = parse_timestamp(execute_line)?;
        let raw_args = bracketed_args(execute_line)?;

        let mut entry = String::new();
        let mut server_args = Vec::new();
        let mut target_args = Vec::new();
        let mut client_env = BTreeMap::new();
        let mut after_separator = false;

        for (i, word) in raw_args.iter().enumerate() {
            if i == 0 {
                entry = word.to_string();
                continue;
            }
            if let Some(payload) = word.strip_prefix("--client_env=") {
                let (key, value) = payload.split_once('=').ok_or_else(|| {
                    Error::LogFormat(format!("unparseable client env entry: {word}"))
                })?;
                client_env.insert(key.to_string(), value.to_string());
                continue;
            }
            if *word == "--" {
                after_separator = true;
                continue;
            }
            if after_separator {
                target_args.push(word.to_string());
            } else {
                server_args.push(word.to_string());
            }
        }

        Ok(Invocation {
            entry,
            server_args,
            target_args,
            client_env,
            timestamp,
            exceptions: collect_exceptions(segment),
        })
    }

    /// The first server arg that is not a flag: the build target.
    pub fn target(&self) -> Option<&str> {
        self.server_args
            .iter()
            .map(String::as_str)
            .find(|arg| !arg.starts_with("--"))
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.server_args.iter().any(|arg| arg == flag)
    }
}

// Execute lines open with a `241208 15:02:50.151:I 1408` prefix.
fn parse_timestamp(execute_line: &str) -> Result<DateTime<Utc>> {
    let pattern = Regex::new(r"^(\d{6} \d{2}:\d{2}:\d{2}\.\d{3}):I \d+")
        .expect("timestamp pattern is valid");
    let captures = pattern.captures(execute_line).ok_or_else(|| {
        Error::LogFormat(format!("no timestamp prefix on execute line: {execute_line}"))
    })?;
    let naive = NaiveDateTime::parse_from_str(&captures[1], "%y%m%d %H:%M:%S%.3f")
        .map_err(|err| Error::LogFormat(format!("bad timestamp: {err}")))?;
    Ok(naive.and_utc())
}

// The argument vector is logged as `[build, --foo, //target, ...]`.
fn bracketed_args(execute_line: &str) -> Result<Vec<String>> {
    let (_, tail) = execute_line.split_once(EXECUTE_MARK).ok_or_else(|| {
        Error::LogFormat("execute marker missing from execute line".to_string())
    })?;
    let tail = tail.trim();
    let inner = tail
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| Error::LogFormat(format!("argument vector is not bracketed: {tail}")))?;
    Ok(inner.split(", ").map(str::to_string).collect())
}

// A `Caused by:` line opens a block which extends through the indented lines
// that follow it. A block still open at the end of the segment is kept.
fn collect_exceptions(segment: &[&str]) -> Vec<String> {
    let mut exceptions = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut in_exception = false;
    for line in segment {
        if line.contains("Caused by:") {
            in_exception = true;
            current.push(line);
            continue;
        }
        if in_exception {
            if line.starts_with(' ') {
                current.push(line);
            } else {
                exceptions.push(current.join("\n"));
                current.clear();
                in_exception = false;
            }
        }
    }
    if !current.is_empty() {
        exceptions.push(current.join("\n"));
    }
    exceptions
}
