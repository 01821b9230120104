use std::{
    fs::File,
    io::{Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use chrono::Local;
use serde_json::json;
use tracing::debug;

use crate::config::UploadConfig;
use crate::{fs, Error, Result};

use super::api::UploadCreated;
use super::client::{retry_request, Client};

const UPLOAD_URL: &str = "https://www.googleapis.com/upload/youtube/v3/videos";

/// Writes progress lines to stdout and the upload log simultaneously, each
/// prefixed with a local timestamp.
pub struct TeeLog {
    file: File,
}

impl TeeLog {
    pub fn create(path: &Path) -> Result<TeeLog> {
        Ok(TeeLog {
            file: File::create(path)?,
        })
    }

    pub fn say(&mut self, message: &str) -> Result<()> {
        let line = format!("{} | {message}", Local::now().format("%Y-%m-%d %H:%M:%S"));
        println!("{line}");
        writeln!(self.file, "{line}")?;
        self.file.flush()?;
        Ok(())
    }
}

/// `Content-Range` value for a chunk of `len` bytes at `offset`.
pub(crate) fn content_range(offset: u64, len: u64, total: u64) -> String {
    format!("bytes {}-{}/{}", offset, offset + len - 1, total)
}

/// Next offset after a 308 response: the server acknowledges received bytes
/// via `Range: bytes=0-N`. Without the header nothing was stored yet.
pub(crate) fn next_offset(range_header: Option<&str>) -> Option<u64> {
    let header = range_header?;
    let (_, end) = header.rsplit_once('-')?;
    end.trim().parse::<u64>().ok().map(|n| n + 1)
}

enum ChunkStep {
    Incomplete(u64),
    Complete(String),
}

impl Client {
    /// Uploads one file with the resumable protocol and returns the new
    /// video id. The title is the file name; description, category, and
    /// privacy come from config.
    pub fn upload_video(&mut self, path: &Path, config: &UploadConfig) -> Result<String> {
        let total = fs::file_size(path)?;
        if total == 0 {
            return Err(Error::Upload(format!("{} is empty", path.display())));
        }
        let title = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| Error::Upload(format!("{} has no file name", path.display())))?;

        let session_url = self.start_session(&title, total, config)?;
        debug!("resumable session opened for {title}");

        let mut file = File::open(path)?;
        let mut offset = 0u64;
        let chunk_size = config.chunk_size_bytes.max(1);
        loop {
            file.seek(SeekFrom::Start(offset))?;
            let mut chunk = vec![0u8; chunk_size.min(total - offset) as usize];
            file.read_exact(&mut chunk)?;

            match self.put_chunk(&session_url, offset, &chunk, total)? {
                ChunkStep::Complete(id) => return Ok(id),
                ChunkStep::Incomplete(next) => {
                    debug!("chunk accepted, next offset {next}/{total}");
                    offset = next;
                }
            }
            if offset >= total {
                return Err(Error::Upload(
                    "server never acknowledged completion of the final chunk".to_string(),
                ));
            }
        }
    }

    fn start_session(&mut self, title: &str, total: u64, config: &UploadConfig) -> Result<String> {
        let body = json!({
            "snippet": {
                "title": title,
                "description": config.description,
                "categoryId": config.category_id,
            },
            "status": {
                "privacyStatus": config.privacy,
            },
        });
        let policy = self.retry_policy();
        retry_request(&policy, "upload initiation", || {
            let token = self.bearer()?;
            let response = self
                .http()
                .post(UPLOAD_URL)
                .bearer_auth(token)
                .query(&[("uploadType", "resumable"), ("part", "snippet,status")])
                .header("X-Upload-Content-Length", total)
                .header("X-Upload-Content-Type", "video/*")
                .json(&body)
                .send()?;
            let status = response.status();
            if !status.is_success() {
                return Err(Error::Api {
                    status: status.as_u16(),
                    body: response.text().unwrap_or_default(),
                });
            }
            response
                .headers()
                .get("Location")
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
                .ok_or_else(|| {
                    Error::Upload("initiation response had no Location header".to_string())
                })
        })
    }

    fn put_chunk(
        &mut self,
        session_url: &str,
        offset: u64,
        chunk: &[u8],
        total: u64,
    ) -> Result<ChunkStep> {
        let range = content_range(offset, chunk.len() as u64, total);
        let policy = self.retry_policy();
        retry_request(&policy, "chunk upload", || {
            let token = self.bearer()?;
            let response = self
                .http()
                .put(session_url)
                .bearer_auth(token)
                .header("Content-Range", range.as_str())
                .body(chunk.to_vec())
                .send()?;
            let status = response.status().as_u16();
            if status == 308 {
                let acknowledged = response
                    .headers()
                    .get("Range")
                    .and_then(|value| value.to_str().ok());
                let next = next_offset(acknowledged).unwrap_or(offset);
                return Ok(ChunkStep::Incomplete(next));
            }
            if (200..300).contains(&status) {
                let created: UploadCreated = response.json()?;
                return Ok(ChunkStep::Complete(created.id));
            }
            Err(Error::Api {
                status,
                body: response.text().unwrap_or_default(),
            })
        })
    }
}

/// Result of one pass over the upload queue.
#[derive(Debug, Default)]
pub struct QueueReport {
    /// Successfully uploaded files and their new video ids.
    pub uploaded: Vec<(PathBuf, String)>,
}

/// Files eligible for upload: visible regular files with a video extension,
/// oldest first.
pub(crate) fn queued_videos(queue_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(queue_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if name.to_string_lossy().starts_with('.') {
            continue;
        }
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        entries.push(fs::PathEntry {
            path: entry.path(),
            metadata,
        });
    }
    let videos = entries
        .into_iter()
        .filter(|entry| {
            entry
                .extension()
                .map(|ext| {
                    let ext = ext.to_string_lossy().to_ascii_lowercase();
                    ext == "mp4" || ext == "mov"
                })
                .unwrap_or(false)
        })
        .collect();
    Ok(fs::sorted_by_mtime(videos)
        .into_iter()
        .map(|entry| entry.path)
        .collect())
}

/// Uploads everything in the queue directory, moving each file into the
/// done directory as it completes. A failure aborts the pass so the
/// remaining files stay queued for the next run.
pub fn run_queue(client: &mut Client, config: &UploadConfig) -> Result<QueueReport> {
    let queue_dir = config
        .queue_dir
        .as_deref()
        .ok_or_else(|| Error::Config("upload.queue_dir is not configured".to_string()))?;
    let done_dir = config
        .done_dir
        .as_deref()
        .ok_or_else(|| Error::Config("upload.done_dir is not configured".to_string()))?;

    let videos = queued_videos(queue_dir)?;
    let mut log = TeeLog::create(&config.log_path)?;
    log.say(&format!("found {} video files", videos.len()))?;

    let mut report = QueueReport::default();
    for path in videos {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        log.say(&format!("Uploading {name}"))?;
        let id = client.upload_video(&path, config)?;
        log.say(&format!("Video id '{id}' was successfully uploaded."))?;

        let target = done_dir.join(&name);
        std::fs::rename(&path, &target)?;
        log.say(&format!("Uploaded {name}"))?;
        report.uploaded.push((target, id));
    }
    Ok(report)
}
