use std::thread;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::config::RetryConfig;
use crate::{Error, Result};

use super::api::{SearchItem, SearchPage, VideoPage, Video};
use super::auth::Authenticator;

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Status codes worth retrying after a short sleep.
const RETRIABLE_STATUS_CODES: [u16; 4] = [500, 502, 503, 504];
/// Access denied usually means the daily quota ran out.
const ACCESS_DENIED_CODES: [u16; 1] = [403];

/// How a failed request should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClass {
    Transient,
    Quota,
    Fatal,
}

/// Bounded retry schedule for API calls.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub transient_sleep: Duration,
    pub quota_sleep: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> RetryPolicy {
        RetryPolicy {
            attempts: config.attempts.max(1),
            transient_sleep: Duration::from_secs(config.transient_sleep_secs),
            quota_sleep: Duration::from_secs(config.quota_sleep_secs),
        }
    }

    pub fn classify(status: u16) -> RetryClass {
        if RETRIABLE_STATUS_CODES.contains(&status) {
            RetryClass::Transient
        } else if ACCESS_DENIED_CODES.contains(&status) {
            RetryClass::Quota
        } else {
            RetryClass::Fatal
        }
    }

    fn sleep_for(&self, class: RetryClass) -> Option<Duration> {
        match class {
            RetryClass::Transient => Some(self.transient_sleep),
            RetryClass::Quota => Some(self.quota_sleep),
            RetryClass::Fatal => None,
        }
    }
}

/// Runs `attempt` until it succeeds, the error is fatal, or the attempt
/// budget is spent.
pub(crate) fn retry_request<T>(
    policy: &RetryPolicy,
    what: &str,
    mut attempt: impl FnMut() -> Result<T>,
) -> Result<T> {
    let mut last_err = None;
    for round in 1..=policy.attempts {
        match attempt() {
            Ok(value) => return Ok(value),
            Err(err) => {
                let class = match &err {
                    Error::Api { status, .. } => RetryPolicy::classify(*status),
                    // transport hiccups are worth a quick retry
                    Error::Http(_) => RetryClass::Transient,
                    _ => RetryClass::Fatal,
                };
                match policy.sleep_for(class) {
                    Some(sleep) if round < policy.attempts => {
                        warn!(
                            "{what} failed (attempt {round}/{}): {err}; retrying in {}s",
                            policy.attempts,
                            sleep.as_secs()
                        );
                        thread::sleep(sleep);
                        last_err = Some(err);
                    }
                    _ => return Err(err),
                }
            }
        }
    }
    Err(last_err.expect("retry loop exits early unless an error was seen"))
}

/// Thin typed client for the handful of YouTube Data API calls the tools
/// use. Every call refreshes the token as needed and retries per policy.
pub struct Client {
    http: reqwest::blocking::Client,
    auth: Authenticator,
    retry: RetryPolicy,
}

impl Client {
    pub fn new(auth: Authenticator, retry: RetryPolicy) -> Client {
        Client {
            http: reqwest::blocking::Client::new(),
            auth,
            retry,
        }
    }

    pub(crate) fn http(&self) -> &reqwest::blocking::Client {
        &self.http
    }

    pub(crate) fn bearer(&mut self) -> Result<String> {
        self.auth.token()
    }

    pub(crate) fn retry_policy(&self) -> RetryPolicy {
        self.retry.clone()
    }

    fn get_json<T: DeserializeOwned>(&mut self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let token = self.bearer()?;
        let response = self
            .http
            .get(format!("{API_BASE}/{path}"))
            .bearer_auth(token)
            .query(query)
            .send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }
        Ok(response.json()?)
    }

    /// One page of the authenticated user's videos.
    pub fn search_mine(&mut self, page_token: Option<&str>) -> Result<SearchPage> {
        let policy = self.retry_policy();
        retry_request(&policy, "search.list", || {
            let mut query = vec![
                ("part", "snippet"),
                ("forMine", "true"),
                ("maxResults", "10"),
                ("type", "video"),
            ];
            if let Some(token) = page_token {
                query.push(("pageToken", token));
            }
            self.get_json("search", &query)
        })
    }

    /// Every video the authenticated user owns, across all pages.
    pub fn all_my_videos(&mut self) -> Result<Vec<SearchItem>> {
        let mut all = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let page = self.search_mine(page_token.as_deref())?;
            all.extend(page.items);
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        Ok(all)
    }

    /// Status details for up to 50 videos per call.
    pub fn list_videos(&mut self, ids: &[String]) -> Result<Vec<Video>> {
        debug_assert!(ids.len() <= 50, "videos.list accepts at most 50 ids");
        let joined = ids.join(",");
        let policy = self.retry_policy();
        let page: VideoPage = retry_request(&policy, "videos.list", || {
            self.get_json(
                "videos",
                &[
                    ("part", "snippet,contentDetails,statistics,status"),
                    ("id", joined.as_str()),
                ],
            )
        })?;
        Ok(page.items)
    }

    /// Raw `videoCategories.list` response for a region.
    pub fn video_categories(&mut self, region: &str) -> Result<Value> {
        let policy = self.retry_policy();
        retry_request(&policy, "videoCategories.list", || {
            self.get_json("videoCategories", &[("part", "snippet"), ("regionCode", region)])
        })
    }
}
