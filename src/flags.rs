//! Compile/link command comparison.
//!
//! Useful when a Bazel-driven compiler invocation misbehaves while the
//! native build works: dissect both command lines and diff the flag sets and
//! operand sets (object files, the `-o` target) instead of eyeballing two
//! 500-character strings.

use std::collections::BTreeSet;

/// A compiler command line dissected into flags and operands. Duplicates are
/// collapsed and both sets are kept sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandParts {
    pub flags: Vec<String>,
    pub operands: Vec<String>,
}

impl CommandParts {
    /// Splits `command` on whitespace, drops the program token, and buckets
    /// the rest: tokens starting with `-` are flags, the others operands.
    pub fn dissect(command: &str) -> CommandParts {
        let mut flags = BTreeSet::new();
        let mut operands = BTreeSet::new();
        for token in command.split_whitespace().skip(1) {
            if token.starts_with('-') {
                flags.insert(token.to_string());
            } else {
                operands.insert(token.to_string());
            }
        }
        CommandParts {
            flags: flags.into_iter().collect(),
            operands: operands.into_iter().collect(),
        }
    }
}

/// Sorted set difference of two command aspects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diff {
    pub common: Vec<String>,
    pub only_left: Vec<String>,
    pub only_right: Vec<String>,
}

/// Compares two sorted, deduplicated token lists.
pub fn diff(left: &[String], right: &[String]) -> Diff {
    let left: BTreeSet<&String> = left.iter().collect();
    let right: BTreeSet<&String> = right.iter().collect();
    Diff {
        common: left.intersection(&right).map(|s| s.to_string()).collect(),
        only_left: left.difference(&right).map(|s| s.to_string()).collect(),
        only_right: right.difference(&left).map(|s| s.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dissect_buckets_flags_and_operands() {
        let parts = CommandParts::dissect("gcc -Wall -O2 main.o util.o -o prog");
        assert_eq!(parts.flags, vec!["-O2", "-Wall", "-o"]);
        assert_eq!(parts.operands, vec!["main.o", "prog", "util.o"]);
    }

    #[test]
    fn dissect_dedupes_repeated_tokens() {
        let parts = CommandParts::dissect("gcc -Wall -Wall a.o a.o");
        assert_eq!(parts.flags, vec!["-Wall"]);
        assert_eq!(parts.operands, vec!["a.o"]);
    }

    #[test]
    fn diff_partitions_tokens() {
        let left = CommandParts::dissect("gcc -Wall -mavx -fwrapv a.o");
        let right = CommandParts::dissect("gcc -Wall -O2 -fwrapv a.o");
        let flag_diff = diff(&left.flags, &right.flags);
        assert_eq!(flag_diff.common, vec!["-Wall", "-fwrapv"]);
        assert_eq!(flag_diff.only_left, vec!["-mavx"]);
        assert_eq!(flag_diff.only_right, vec!["-O2"]);
    }

    #[test]
    fn diff_of_identical_commands_is_all_common() {
        let parts = CommandParts::dissect("gcc -g a.o");
        let d = diff(&parts.flags, &parts.flags);
        assert_eq!(d.common, vec!["-g"]);
        assert!(d.only_left.is_empty());
        assert!(d.only_right.is_empty());
    }
}
