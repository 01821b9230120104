use crate::Result;

use super::api::edit_url;
use super::client::Client;

/// Batch size for `videos.list`, the API maximum.
const AUDIT_BATCH: usize = 50;

/// One video whose status differs from what the channel owner expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditFinding {
    pub id: String,
    pub title: String,
    pub field: &'static str,
    pub expected: &'static str,
    pub got: String,
}

impl AuditFinding {
    pub fn edit_url(&self) -> String {
        edit_url(&self.id)
    }
}

/// Outcome of a full channel audit.
#[derive(Debug, Default)]
pub struct AuditReport {
    pub total_videos: usize,
    pub findings: Vec<AuditFinding>,
}

/// Walks every owned video and flags the ones that are still processing or
/// accidentally public: `uploadStatus` should be `processed` and
/// `privacyStatus` should be `private`.
pub fn audit_videos(client: &mut Client) -> Result<AuditReport> {
    let all = client.all_my_videos()?;
    let ids: Vec<String> = all
        .iter()
        .filter_map(|item| item.video_id().map(str::to_string))
        .collect();

    let mut report = AuditReport {
        total_videos: ids.len(),
        ..AuditReport::default()
    };

    for batch in ids.chunks(AUDIT_BATCH) {
        for video in client.list_videos(batch)? {
            let upload_status = video.status.upload_status.clone().unwrap_or_default();
            if upload_status != "processed" {
                report.findings.push(AuditFinding {
                    id: video.id.clone(),
                    title: video.snippet.title.clone(),
                    field: "uploadStatus",
                    expected: "processed",
                    got: upload_status,
                });
            }
            let privacy_status = video.status.privacy_status.clone().unwrap_or_default();
            if privacy_status != "private" {
                report.findings.push(AuditFinding {
                    id: video.id.clone(),
                    title: video.snippet.title.clone(),
                    field: "privacyStatus",
                    expected: "private",
                    got: privacy_status,
                });
            }
        }
    }
    Ok(report)
}
