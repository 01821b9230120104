use regex::Regex;

/// A sandboxed compiler invocation recovered from a `SpawnExecException`
/// trace. With `--sandbox_debug`, the trace includes the full
/// `process-wrapper` command line Bazel used to run the compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxSpawn {
    /// Flags consumed by the process wrapper itself (`--timeout=...`).
    pub wrapper_args: Vec<String>,
    /// The compiler binary.
    pub compiler: String,
    /// Everything passed to the compiler.
    pub compiler_args: Vec<String>,
}

/// Extracts every sandboxed spawn from the given exception blocks. Only
/// blocks opened by a `SpawnExecException` are considered.
pub fn extract_spawns(exceptions: &[String]) -> Vec<SandboxSpawn> {
    let pattern =
        Regex::new(r"^\s+\S+process-wrapper (.*)").expect("process-wrapper pattern is valid");
    let mut spawns = Vec::new();
    for exception in exceptions {
        let mut lines = exception.lines();
        match lines.next() {
            Some(first) if first.contains("SpawnExecException") => {}
            _ => continue,
        }
        for line in lines {
            if let Some(captures) = pattern.captures(line) {
                spawns.push(parse_wrapper_args(&captures[1]));
            }
        }
    }
    spawns
}

fn parse_wrapper_args(all_args: &str) -> SandboxSpawn {
    let mut wrapper_args = Vec::new();
    let mut compiler = String::new();
    let mut compiler_args = Vec::new();
    let mut in_compiler_args = false;

    for raw in all_args.split(' ') {
        let arg = unquote(raw);
        if in_compiler_args {
            compiler_args.push(arg.to_string());
        } else if arg.starts_with("--") {
            wrapper_args.push(arg.to_string());
        } else {
            compiler = arg.to_string();
            in_compiler_args = true;
        }
    }

    SandboxSpawn {
        wrapper_args,
        compiler,
        compiler_args,
    }
}

fn unquote(arg: &str) -> &str {
    if arg.len() >= 2 && arg.starts_with('\'') && arg.ends_with('\'') {
        &arg[1..arg.len() - 1]
    } else {
        arg
    }
}
