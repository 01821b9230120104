use std::path::PathBuf;

use anyhow::Context;

use crate::config::Config;
use crate::youtube::{audit_videos, run_queue, Authenticator, Client, RetryPolicy};

fn client(config: &Config) -> anyhow::Result<Client> {
    let auth = Authenticator::from_config(&config.youtube)
        .context("cannot authenticate against the YouTube API")?;
    Ok(Client::new(auth, RetryPolicy::from_config(&config.retry)))
}

pub fn upload(queue: Option<PathBuf>, done: Option<PathBuf>) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    if queue.is_some() {
        config.upload.queue_dir = queue;
    }
    if done.is_some() {
        config.upload.done_dir = done;
    }

    let mut client = client(&config)?;
    let report = run_queue(&mut client, &config.upload)?;
    println!("uploaded {} videos", report.uploaded.len());
    Ok(())
}

pub fn videos() -> anyhow::Result<()> {
    let config = Config::load()?;
    let mut client = client(&config)?;

    let report = audit_videos(&mut client)?;
    println!(
        "video audit done, checked {} videos in total",
        report.total_videos
    );
    for (index, finding) in report.findings.iter().enumerate() {
        println!(
            "[{index}] {} error, expect {}, got {}: {} {}",
            finding.field,
            finding.expected,
            finding.got,
            finding.edit_url(),
            finding.title
        );
    }
    if report.findings.is_empty() {
        println!("all videos are processed and private");
    }
    Ok(())
}

pub fn categories(region: Option<&str>) -> anyhow::Result<()> {
    let config = Config::load()?;
    let mut client = client(&config)?;
    let region = region.unwrap_or(&config.youtube.region_code);

    let categories = client.video_categories(region)?;
    println!("{}", serde_json::to_string_pretty(&categories)?);
    Ok(())
}
