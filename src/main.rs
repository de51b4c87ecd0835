use anyhow::{Context, Result};
use live_status::{args, MethodTable};
use log::{info, LevelFilter};
use serde_json::{json, Value};
use simplelog::{Config, WriteLogger};
use std::fs::File;
use std::str::FromStr;
use std::time::Duration;
use tokio::time::sleep;

// The terminal is the status display, so logs go to a file instead.
fn init_logging() -> Result<()> {
    let level = std::env::var("LIVE_STATUS_LOG")
        .ok()
        .and_then(|level| LevelFilter::from_str(&level).ok())
        .unwrap_or(LevelFilter::Info);
    let path = std::env::temp_dir().join("live_status_demo.log");
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    WriteLogger::init(level, Config::default(), file)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    let console = live_status::console().add(MethodTable::new().method("println", |args| {
        let line: Vec<String> = args.iter().map(ToString::to_string).collect();
        println!("{}", line.join(" "));
        Ok(Value::Null)
    }));
    let logger = console.logger().clone();

    info!("Starting demo");
    logger.status("download", ["Downloading", "index"])?;
    sleep(Duration::from_millis(1500)).await;
    logger.status("build", args!["Building", json!({"target": "release", "jobs": 4})])?;
    sleep(Duration::from_secs(2)).await;

    console.call("println", ["Fetched 12 packages"])?;
    logger.status("download", ["Downloading", "assets"])?;
    sleep(Duration::from_secs(2)).await;

    logger.status_end_with("download", ["Downloaded"], |message, _| {
        println!("✓ {message}")
    })?;

    let answer = logger
        .wait_until_async(|| async {
            println!("Running checks...");
            sleep(Duration::from_secs(1)).await;
            42
        })
        .await;
    info!("Checks returned {answer}");

    sleep(Duration::from_secs(1)).await;
    logger.status_end_with("build", args![], |message, payload| {
        println!("✓ {message}");
        if let Some(payload) = payload {
            info!("Build payload: {payload}");
        }
    })?;
    logger.status_end_all()?;
    info!("Demo finished");
    Ok(())
}
