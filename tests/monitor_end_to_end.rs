#![cfg(target_os = "linux")]

use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;
use procmon_lib::{monitor, MonitorError, MonitorOptions, SamplerConfig, HEADER};
use tempfile::TempDir;

const TIMESTAMP_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

fn options(dir: &Path, program: &str, args: &[&str], interval: f64) -> MonitorOptions {
    MonitorOptions {
        program: program.to_string(),
        args: args.iter().map(|a| a.to_string()).collect(),
        output_dir: dir.to_path_buf(),
        config: SamplerConfig::new(interval).expect("valid interval"),
    }
}

fn data_rows(content: &str) -> Vec<Vec<String>> {
    content
        .lines()
        .skip(1)
        .map(|line| line.split('\t').map(str::to_string).collect())
        .collect()
}

#[tokio::test]
async fn logs_a_sleeping_process_until_it_exits() {
    let dir = TempDir::new().expect("temp output dir");
    let report = monitor(&options(dir.path(), "sleep", &["1"], 0.3))
        .await
        .expect("monitoring sleep");

    assert_eq!(report.exit_status, Some(0));
    assert_eq!(report.log_path, dir.path().join("sleep_log.tsv"));

    let content = fs::read_to_string(&report.log_path).expect("log written");
    assert!(content.ends_with('\n'));
    assert_eq!(content.lines().next(), Some(HEADER.join("\t").as_str()));

    let rows = data_rows(&content);
    assert_eq!(rows.len() as u64, report.summary.samples_written);
    // ticks start at 0, 0.3, 0.6 and 0.9 s; the last one usually finds the
    // child already exited and is skipped
    assert!(
        (2..=4).contains(&rows.len()),
        "expected about three rows, got {}: {:?}",
        rows.len(),
        rows
    );
    assert!(
        report.summary.samples_written + report.summary.ticks_skipped <= 5,
        "{:?}",
        report.summary
    );

    let mut previous: Option<NaiveDateTime> = None;
    for row in &rows {
        assert_eq!(row.len(), 5, "malformed row {:?}", row);
        let timestamp =
            NaiveDateTime::parse_from_str(&row[0], TIMESTAMP_FORMAT).expect("asctime timestamp");
        if let Some(prev) = previous {
            assert!(timestamp >= prev, "timestamps went backwards: {:?}", rows);
        }
        previous = Some(timestamp);

        let vms: u64 = row[1].parse().expect("vms");
        let rss: u64 = row[2].parse().expect("rss");
        let cpu: u32 = row[3].parse().expect("cpu");
        let fd: usize = row[4].parse().expect("fd");
        // an exited child would show up as zeros
        assert!(rss > 0, "row without resident memory: {:?}", row);
        assert!(vms >= rss, "{:?}", row);
        assert!(cpu <= 100, "{:?}", row);
        assert!(fd > 0, "row without descriptors: {:?}", row);
    }
}

#[tokio::test]
async fn second_run_appends_without_new_header() {
    let dir = TempDir::new().expect("temp output dir");

    let first = monitor(&options(dir.path(), "/bin/sleep", &["0.4"], 0.1))
        .await
        .expect("first run");
    let after_first = fs::read_to_string(&first.log_path).unwrap();

    let second = monitor(&options(dir.path(), "/bin/sleep", &["0.4"], 0.1))
        .await
        .expect("second run");
    assert_eq!(first.log_path, second.log_path);

    let after_second = fs::read_to_string(&second.log_path).unwrap();
    assert!(after_second.starts_with(&after_first));
    assert_eq!(after_second.matches("TIME\tVMS").count(), 1);
    assert_eq!(
        data_rows(&after_second).len() as u64,
        first.summary.samples_written + second.summary.samples_written
    );
}

#[tokio::test]
async fn failed_launch_leaves_no_log_file() {
    let dir = TempDir::new().expect("temp output dir");
    let err = monitor(&options(dir.path(), "/nonexistent/ghost-binary", &[], 0.2))
        .await
        .expect_err("launch must fail");

    assert!(matches!(err, MonitorError::Launch { .. }));
    assert!(!dir.path().join("ghost-binary_log.tsv").exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn unwritable_log_still_reaps_the_child() {
    let dir = TempDir::new().expect("temp output dir");
    let missing = dir.path().join("no-such-dir");
    let err = monitor(&options(&missing, "sleep", &["30"], 0.2))
        .await
        .expect_err("sink must fail");

    assert!(matches!(err, MonitorError::Sink { .. }));
}
