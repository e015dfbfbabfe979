use brite_logger::{LevelFilter, Logger};
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn file_logging_creates_json_log_file() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let log_dir = tmp_dir.path().join("logs");

    let logger = Logger::builder()
        .name("integration-file-logging")
        .console(false)
        .level(LevelFilter::INFO)
        .directory(&log_dir)
        .json(true)
        .max_files(2)
        .init()?;

    assert!(logger.writes_files());
    tracing::info!(attempt = 1, "submission forwarded");

    std::thread::sleep(Duration::from_millis(30));
    drop(logger);

    let log_file = fs::read_dir(&log_dir)?
        .flatten()
        .map(|entry| entry.path())
        .find(|path| path.extension().and_then(|ext| ext.to_str()) == Some("log"))
        .expect("log file should be created");

    let contents = fs::read_to_string(&log_file)?;
    let first = contents.lines().next().expect("log file should not be empty");
    let record: serde_json::Value = serde_json::from_str(first)?;
    assert_eq!(record["fields"]["message"], "submission forwarded");
    assert_eq!(record["fields"]["attempt"], 1);

    Ok(())
}
