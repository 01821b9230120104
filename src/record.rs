//! Benchmark record bookkeeping: dump a batch of measurements as a
//! timestamped JSON file and find the most recent one later.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{fs, Error, Result};

/// One benchmark measurement: free-form attributes of the thing under test
/// plus the observed results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub record_time: String,
    #[serde(default)]
    pub target_attributes: Map<String, Value>,
    #[serde(default)]
    pub test_result: Map<String, Value>,
}

impl Record {
    pub fn new(target_attributes: Map<String, Value>, test_result: Map<String, Value>) -> Self {
        Self {
            record_time: Local::now().to_rfc3339(),
            target_attributes,
            test_result,
        }
    }
}

/// Current local time formatted for use in file names.
pub fn timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Writes `records` to `dir` as `benchmark_<timestamp>.json`, returning the
/// path written.
pub fn dump_records(records: &[Record], dir: impl AsRef<Path>) -> Result<PathBuf> {
    let path = dir
        .as_ref()
        .join(format!("benchmark_{}.json", timestamp()));
    let rendered = serde_json::to_string_pretty(records)?;
    fs::write_text(&path, rendered)?;
    Ok(path)
}

/// Finds the newest record file in `dir` by the timestamp embedded in its
/// name (e.g. `benchmark_20240527_220536.json`).
pub fn latest_record(dir: impl AsRef<Path>) -> Result<PathBuf> {
    let pattern = Regex::new(r"\d{8}_\d{6}").expect("timestamp pattern is valid");
    let mut newest: Option<(NaiveDateTime, PathBuf)> = None;
    for entry in std::fs::read_dir(dir.as_ref())? {
        let path = entry?.path();
        let name = match path.file_name().and_then(|name| name.to_str()) {
            Some(name) => name,
            None => continue,
        };
        let stamp = match pattern.find(name) {
            Some(found) => found.as_str(),
            None => continue,
        };
        let parsed = NaiveDateTime::parse_from_str(stamp, "%Y%m%d_%H%M%S")
            .map_err(|err| Error::Config(format!("bad record timestamp in {name}: {err}")))?;
        if newest.as_ref().map(|(best, _)| parsed > *best).unwrap_or(true) {
            newest = Some((parsed, path));
        }
    }
    newest
        .map(|(_, path)| path)
        .ok_or_else(|| Error::Config("no record files found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn dump_and_reload_records() -> Result<()> {
        let temp = tempdir()?;
        let mut attributes = Map::new();
        attributes.insert("threads".to_string(), json!(8));
        let mut result = Map::new();
        result.insert("qps".to_string(), json!(1234.5));

        let path = dump_records(&[Record::new(attributes, result)], temp.path())?;
        let reloaded: Vec<Record> = serde_json::from_str(&fs::read_text(&path)?)?;
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded[0].target_attributes["threads"], json!(8));
        Ok(())
    }

    #[test]
    fn latest_record_picks_newest_by_name() -> Result<()> {
        let temp = tempdir()?;
        fs::write_text(temp.path().join("benchmark_20240101_000000.json"), "[]")?;
        fs::write_text(temp.path().join("benchmark_20240527_220536.json"), "[]")?;
        fs::write_text(temp.path().join("benchmark_20230615_120000.json"), "[]")?;

        let latest = latest_record(temp.path())?;
        assert_eq!(
            latest.file_name().unwrap(),
            "benchmark_20240527_220536.json"
        );
        Ok(())
    }

    #[test]
    fn latest_record_on_empty_dir_is_an_error() -> Result<()> {
        let temp = tempdir()?;
        assert!(latest_record(temp.path()).is_err());
        Ok(())
    }
}
