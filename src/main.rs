// Demo binary: simulated fetches spread across worker groups.
//
// Every task receives the same shared URL source as its argument and
// takes one URL from it. Set RUST_LOG=debug to watch groups start and stop.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use coroflow::{ExecutionConfig, Outcome, TaskHandle, threading_run_coros};
use log::info;
use tokio::sync::Mutex;

type UrlSource = Arc<Mutex<Vec<String>>>;

async fn fetch_data(urls: UrlSource) -> Result<String> {
    // Simulate network latency
    tokio::time::sleep(Duration::from_secs(1)).await;

    let url = urls
        .lock()
        .await
        .pop()
        .ok_or_else(|| anyhow!("URL source exhausted"))?;

    Ok(format!("Data fetched from {url}"))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let urls: Vec<String> = (1..=5)
        .map(|n| format!("https://example.com/data{n}"))
        .collect();
    let count = urls.len();
    let source: UrlSource = Arc::new(Mutex::new(urls));

    let tasks = TaskHandle::bind(std::iter::repeat_n(fetch_data, count), source);
    let config = ExecutionConfig::builder()
        .max_groups(3)
        .timeout_secs(5.0)
        .debug(true)
        .build();

    info!("Running {count} fetches across up to {} groups", config.max_groups);

    let mut outcomes = threading_run_coros(tasks, config)?.into_iter();
    for item in outcomes.by_ref() {
        match item? {
            Outcome::Success(data) => println!("{data}"),
            Outcome::Failure(e) => println!("fetch failed: {e:#}"),
            Outcome::TimedOut(limit) => println!("fetch timed out after {limit:?}"),
        }
    }

    info!("{}", outcomes.summary());
    Ok(())
}
