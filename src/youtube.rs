//! YouTube Data API v3 tooling: queue-driven resumable uploads plus listing
//! and auditing of the channel's videos.
//!
//! The interactive OAuth consent flow is out of scope; the client consumes a
//! pre-provisioned "installed app" client-secrets file and a stored token,
//! and only performs refresh-token renewal itself.

mod api;
mod audit;
mod auth;
mod client;
mod upload;


pub use api::{edit_url, watch_url, SearchItem, SearchPage, Video, VideoStatus};
pub use audit::{audit_videos, AuditFinding, AuditReport};
pub use auth::{Authenticator, ClientSecrets, StoredToken};
pub use client::{Client, RetryClass, RetryPolicy};
pub use upload::{run_queue, QueueReport, TeeLog};
