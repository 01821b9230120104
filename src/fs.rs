//! Filesystem helpers shared by the tools: recursive walks, extension
//! filters, glob expansion, and small read/write conveniences.

use std::{
    fs,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    time::SystemTime,
};

use glob::glob as glob_iter;

use crate::{Error, Result};

/// Metadata about a filesystem path captured during listing operations.
#[derive(Debug, Clone)]
pub struct PathEntry {
    pub path: PathBuf,
    pub metadata: fs::Metadata,
}

impl PathEntry {
    pub fn is_dir(&self) -> bool {
        self.metadata.is_dir()
    }

    pub fn is_file(&self) -> bool {
        self.metadata.is_file()
    }

    pub fn extension(&self) -> Option<&std::ffi::OsStr> {
        self.path.extension()
    }

    pub fn file_name(&self) -> Option<&std::ffi::OsStr> {
        self.path.file_name()
    }

    pub fn size(&self) -> u64 {
        self.metadata.len()
    }

    pub fn modified(&self) -> Option<SystemTime> {
        self.metadata.modified().ok()
    }
}

/// Recursively walks the directory tree depth-first, yielding every entry.
///
/// I/O errors are surfaced per-entry so a single unreadable directory does
/// not abort the whole walk.
pub fn walk(root: impl AsRef<Path>) -> WalkIter {
    WalkIter::new(root.as_ref().to_path_buf())
}

/// Walks the tree and yields only regular files.
pub fn walk_files(root: impl AsRef<Path>) -> impl Iterator<Item = Result<PathEntry>> {
    walk(root).filter(|entry| match entry {
        Ok(entry) => entry.is_file(),
        Err(_) => true,
    })
}

pub struct WalkIter {
    stack: Vec<PathBuf>,
    pending_err: Option<Error>,
}

impl WalkIter {
    fn new(root: PathBuf) -> Self {
        Self {
            stack: vec![root],
            pending_err: None,
        }
    }

    fn push_children(&mut self, dir: &Path) {
        match fs::read_dir(dir) {
            Ok(read_dir) => {
                for entry in read_dir {
                    match entry {
                        Ok(entry) => self.stack.push(entry.path()),
                        Err(err) => {
                            self.pending_err = Some(err.into());
                            break;
                        }
                    }
                }
            }
            Err(err) => {
                self.pending_err = Some(err.into());
            }
        }
    }
}

impl Iterator for WalkIter {
    type Item = Result<PathEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.pending_err.take() {
            return Some(Err(err));
        }
        let path = self.stack.pop()?;
        let metadata = match fs::symlink_metadata(&path) {
            Ok(metadata) => metadata,
            Err(err) => return Some(Err(err.into())),
        };
        if metadata.file_type().is_dir() && !metadata.file_type().is_symlink() {
            self.push_children(&path);
        }
        Some(Ok(PathEntry { path, metadata }))
    }
}

/// Keeps entries whose extension matches one of `exts` (case-insensitive).
pub fn filter_extension<I>(entries: I, exts: &[&str]) -> Vec<Result<PathEntry>>
where
    I: Iterator<Item = Result<PathEntry>>,
{
    let wanted: Vec<String> = exts.iter().map(|ext| ext.to_ascii_lowercase()).collect();
    entries
        .filter(|entry| match entry {
            Ok(entry) => entry
                .extension()
                .map(|ext| wanted.contains(&ext.to_string_lossy().to_ascii_lowercase()))
                .unwrap_or(false),
            Err(_) => true,
        })
        .collect()
}

/// Sorts entries by modification time, oldest first. Entries without a
/// readable mtime sort first.
pub fn sorted_by_mtime(mut entries: Vec<PathEntry>) -> Vec<PathEntry> {
    entries.sort_by_key(|entry| entry.modified().unwrap_or(SystemTime::UNIX_EPOCH));
    entries
}

/// Expands a filesystem glob (e.g. `build/**/*.a`) into matching paths.
pub fn glob(pattern: impl AsRef<str>) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in glob_iter(pattern.as_ref())? {
        paths.push(entry?);
    }
    Ok(paths)
}

/// Total size in bytes of all files under `root`.
pub fn dir_size(root: impl AsRef<Path>) -> Result<u64> {
    let mut total = 0;
    for entry in walk_files(root) {
        total += entry?.size();
    }
    Ok(total)
}

/// Size in bytes of a single file.
pub fn file_size(path: impl AsRef<Path>) -> Result<u64> {
    Ok(fs::metadata(path)?.len())
}

/// Reads a UTF-8 file completely into a `String`.
pub fn read_text(path: impl AsRef<Path>) -> Result<String> {
    Ok(fs::read_to_string(path)?)
}

/// Writes the provided text to the path (truncating an existing file).
pub fn write_text(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Result<()> {
    fs::write(path, contents)?;
    Ok(())
}

/// Reads a file as a vector of lines.
pub fn read_lines(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);
    let mut lines = Vec::new();
    for line in reader.lines() {
        lines.push(line?);
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn walk_files_finds_nested_entries() -> Result<()> {
        let temp = tempdir()?;
        let nested = temp.path().join("a/b");
        fs::create_dir_all(&nested)?;
        write_text(temp.path().join("top.txt"), "top")?;
        write_text(nested.join("deep.txt"), "deep")?;

        let files = walk_files(temp.path()).collect::<Result<Vec<_>>>()?;
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|entry| entry.is_file()));
        Ok(())
    }

    #[test]
    fn filter_extension_is_case_insensitive() -> Result<()> {
        let temp = tempdir()?;
        write_text(temp.path().join("clip.MOV"), "")?;
        write_text(temp.path().join("clip.mp4"), "")?;
        write_text(temp.path().join("notes.txt"), "")?;

        let videos = filter_extension(walk_files(temp.path()), &["mp4", "mov"])
            .into_iter()
            .collect::<Result<Vec<_>>>()?;
        assert_eq!(videos.len(), 2);
        Ok(())
    }

    #[test]
    fn glob_expands_nested_patterns() -> Result<()> {
        let temp = tempdir()?;
        let nested = temp.path().join("out/objs");
        fs::create_dir_all(&nested)?;
        write_text(nested.join("libfoo.a"), "")?;
        write_text(temp.path().join("libbar.a"), "")?;
        write_text(temp.path().join("readme.md"), "")?;

        let pattern = format!("{}/**/*.a", temp.path().display());
        let matched = glob(&pattern)?;
        assert_eq!(matched.len(), 2);
        Ok(())
    }

    #[test]
    fn read_lines_splits_on_newlines() -> Result<()> {
        let temp = tempdir()?;
        let path = temp.path().join("lines.txt");
        write_text(&path, "first\nsecond\n")?;
        assert_eq!(read_lines(&path)?, vec!["first", "second"]);
        Ok(())
    }

    #[test]
    fn dir_size_sums_file_bytes() -> Result<()> {
        let temp = tempdir()?;
        write_text(temp.path().join("a.bin"), [0u8; 10])?;
        write_text(temp.path().join("b.bin"), [0u8; 32])?;
        assert_eq!(dir_size(temp.path())?, 42);
        Ok(())
    }

    #[test]
    fn sorted_by_mtime_orders_oldest_first() -> Result<()> {
        let temp = tempdir()?;
        let old = temp.path().join("old.mp4");
        let new = temp.path().join("new.mp4");
        write_text(&old, "old")?;
        write_text(&new, "new")?;
        let past = SystemTime::now() - std::time::Duration::from_secs(3600);
        let file = fs::File::open(&old)?;
        file.set_modified(past)?;

        let entries = filter_extension(walk_files(temp.path()), &["mp4"])
            .into_iter()
            .collect::<Result<Vec<_>>>()?;
        let sorted = sorted_by_mtime(entries);
        assert_eq!(sorted[0].file_name().unwrap(), "old.mp4");
        Ok(())
    }
}
