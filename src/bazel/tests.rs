use super::*;
use chrono::{TimeZone, Utc};

fn sample_log() -> String {
    let mut log = String::new();
    log.push_str("Server startup banner, belongs to no command\n");
    log.push_str(&format!(
        "241208 15:02:01.000:I 1408 {REGISTER_MARK} Received command build\n"
    ));
    log.push_str(&format!(
        "241208 15:02:50.151:I 1408 {EXECUTE_MARK} [build, \
         --client_env=PATH=/usr/bin:/bin, --client_env=GIT_ASKPASS=left=right, \
         --sandbox_debug, //pkg:tool, --, --port=8080]\n"
    ));
    log.push_str("unrelated progress line\n");
    log.push_str(
        "Caused by: com.google.devtools.build.lib.exec.SpawnExecException: spawn failed\n",
    );
    log.push_str("  at com.google.devtools.build.lib.exec.SomeClass.method(SomeClass.java:1)\n");
    log.push_str(
        "        /home/u/.cache/bazel/install/abc/process-wrapper '--timeout=0' \
         '--kill_delay=15' /usr/bin/gcc '-c' 'foo.c' '-o' 'foo.o'\n",
    );
    log.push_str(&format!(
        "241208 15:05:00.000:I 1408 {REGISTER_MARK} Received command info\n"
    ));
    log.push_str(&format!(
        "241208 15:05:00.200:I 1408 {EXECUTE_MARK} [info, server_log]\n"
    ));
    log
}

#[test]
fn parses_invocations_and_skips_preamble() {
    let log = ServerLog::parse(&sample_log());
    assert_eq!(log.invocations.len(), 2);
    assert_eq!(log.invocations[0].entry, "build");
    assert_eq!(log.invocations[1].entry, "info");
}

#[test]
fn build_invocation_fields() {
    let log = ServerLog::parse(&sample_log());
    let build = log.last_with_entry("build").expect("build invocation");

    assert_eq!(
        build.timestamp,
        Utc.with_ymd_and_hms(2024, 12, 8, 15, 2, 50).unwrap()
            + chrono::Duration::milliseconds(151)
    );
    assert_eq!(build.target(), Some("//pkg:tool"));
    assert!(build.has_flag("--sandbox_debug"));
    assert_eq!(build.target_args, vec!["--port=8080"]);
    assert_eq!(
        build.client_env.get("PATH").map(String::as_str),
        Some("/usr/bin:/bin")
    );
    // values containing `=` keep everything after the first one
    assert_eq!(
        build.client_env.get("GIT_ASKPASS").map(String::as_str),
        Some("left=right")
    );
}

#[test]
fn collects_exception_blocks() {
    let log = ServerLog::parse(&sample_log());
    let build = log.last_with_entry("build").unwrap();
    assert_eq!(build.exceptions.len(), 1);
    assert!(build.exceptions[0].contains("SpawnExecException"));
    assert!(build.exceptions[0].contains("process-wrapper"));
}

#[test]
fn trailing_exception_block_is_kept() {
    let segment = vec![
        "241208 15:02:01.000:I 1 [com.google.devtools.build.lib.server.CommandManager.registerCommand] x",
        "241208 15:02:02.000:I 1 [com.google.devtools.build.lib.server.GrpcServerImpl.executeCommand] [build, //a]",
        "Caused by: java.io.IOException: boom",
        "  at Some.where(File.java:1)",
    ];
    let invocation = Invocation::parse(&segment).unwrap();
    assert_eq!(invocation.exceptions.len(), 1);
    assert!(invocation.exceptions[0].ends_with("at Some.where(File.java:1)"));
}

#[test]
fn segment_without_execute_line_is_rejected() {
    let segment = vec![
        "241208 15:02:01.000:I 1 [com.google.devtools.build.lib.server.CommandManager.registerCommand] x",
        "nothing else",
    ];
    assert!(Invocation::parse(&segment).is_err());
}

#[test]
fn unbracketed_args_are_rejected() {
    let segment = vec![
        "241208 15:02:01.000:I 1 [com.google.devtools.build.lib.server.CommandManager.registerCommand] x",
        "241208 15:02:02.000:I 1 [com.google.devtools.build.lib.server.GrpcServerImpl.executeCommand] build //a",
    ];
    assert!(Invocation::parse(&segment).is_err());
}

#[test]
fn extracts_sandbox_spawn() {
    let log = ServerLog::parse(&sample_log());
    let build = log.last_with_entry("build").unwrap();
    let spawns = extract_spawns(&build.exceptions);
    assert_eq!(spawns.len(), 1);
    let spawn = &spawns[0];
    assert_eq!(spawn.wrapper_args, vec!["--timeout=0", "--kill_delay=15"]);
    assert_eq!(spawn.compiler, "/usr/bin/gcc");
    assert_eq!(spawn.compiler_args, vec!["-c", "foo.c", "-o", "foo.o"]);
}

#[test]
fn non_spawn_exceptions_are_ignored() {
    let exceptions = vec![
        "Caused by: java.io.IOException: not a spawn\n  at X.y(Z.java:1)".to_string(),
    ];
    assert!(extract_spawns(&exceptions).is_empty());
}
