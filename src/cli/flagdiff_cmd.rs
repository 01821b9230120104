use std::path::Path;

use crate::flags::{diff, CommandParts, Diff};
use crate::fs;

pub fn run(left: &str, right: &str) -> anyhow::Result<()> {
    let (left_name, left_cmd) = resolve(left)?;
    let (right_name, right_cmd) = resolve(right)?;

    let left_parts = CommandParts::dissect(&left_cmd);
    let right_parts = CommandParts::dissect(&right_cmd);

    println!("== flags ==");
    print_diff(
        &diff(&left_parts.flags, &right_parts.flags),
        &left_name,
        &right_name,
    );
    println!("== operands ==");
    print_diff(
        &diff(&left_parts.operands, &right_parts.operands),
        &left_name,
        &right_name,
    );
    Ok(())
}

// Each side is a file holding the command line, or the literal command when
// no such file exists.
fn resolve(arg: &str) -> anyhow::Result<(String, String)> {
    let path = Path::new(arg);
    if path.is_file() {
        let text = fs::read_text(path)?;
        Ok((arg.to_string(), text.trim().to_string()))
    } else {
        let program = arg.split_whitespace().next().unwrap_or("command");
        Ok((format!("inline {program}"), arg.to_string()))
    }
}

fn print_diff(diff: &Diff, left_name: &str, right_name: &str) {
    println!("common:");
    for token in &diff.common {
        println!("\t{token}");
    }
    println!("extra in ({left_name}):");
    for token in &diff.only_left {
        println!("\t{token}");
    }
    println!("extra in ({right_name}):");
    for token in &diff.only_right {
        println!("\t{token}");
    }
}
