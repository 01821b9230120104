use tempfile::tempdir;
use toolshed::bazel::{extract_spawns, ServerLog, EXECUTE_MARK, REGISTER_MARK};

fn fixture() -> String {
    let mut log = String::new();
    log.push_str("INFO: server started\n");
    log.push_str(&format!(
        "241208 09:15:01.000:I 99 {REGISTER_MARK} Received command test\n"
    ));
    log.push_str(&format!(
        "241208 09:15:01.250:I 99 {EXECUTE_MARK} [test, \
         --client_env=HOME=/home/u, --sandbox_debug, //pkg:unit_test]\n"
    ));
    log.push_str("Caused by: com.google.devtools.build.lib.exec.SpawnExecException: failed\n");
    log.push_str("  at com.google.devtools.build.lib.exec.Runner.exec(Runner.java:5)\n");
    log.push_str(
        "        /cache/install/deadbeef/process-wrapper '--timeout=0' '--kill_delay=15' \
         /usr/bin/clang++ '-std=c++17' '-c' 'unit.cc' '-o' 'unit.o'\n",
    );
    log.push_str(&format!(
        "241208 09:20:00.000:I 99 {REGISTER_MARK} Received command build\n"
    ));
    log.push_str(&format!(
        "241208 09:20:00.100:I 99 {EXECUTE_MARK} [build, //pkg:tool, --, serve]\n"
    ));
    log
}

#[test]
fn picks_the_most_recent_matching_invocation() -> toolshed::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("java.log");
    std::fs::write(&path, fixture())?;

    let log = ServerLog::from_file(&path)?;
    assert_eq!(log.invocations.len(), 2);

    let build = log.last_with_entry("build").expect("build invocation");
    assert_eq!(build.target(), Some("//pkg:tool"));
    assert_eq!(build.target_args, vec!["serve"]);

    assert!(log.last_with_entry("run").is_none());
    Ok(())
}

#[test]
fn recovers_the_sandboxed_compiler_command() -> toolshed::Result<()> {
    let log = ServerLog::parse(&fixture());
    let test = log.last_with_entry("test").expect("test invocation");
    assert!(test.has_flag("--sandbox_debug"));
    assert_eq!(
        test.client_env.get("HOME").map(String::as_str),
        Some("/home/u")
    );

    let spawns = extract_spawns(&test.exceptions);
    assert_eq!(spawns.len(), 1);
    assert_eq!(spawns[0].compiler, "/usr/bin/clang++");
    assert_eq!(spawns[0].wrapper_args, vec!["--timeout=0", "--kill_delay=15"]);
    assert_eq!(
        spawns[0].compiler_args,
        vec!["-std=c++17", "-c", "unit.cc", "-o", "unit.o"]
    );
    Ok(())
}
