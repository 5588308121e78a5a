//! Tests for the text and JSON reports.

use crate::cli::report::{render_json, render_text};
use linkfetch_core::{BatchResult, FetchOutcome, LogEvent};
use std::time::Duration;

fn sample() -> BatchResult {
    let mut result = BatchResult::new();
    result.merge(FetchOutcome::fetched(
        1500,
        vec![
            LogEvent::success("a.bin"),
            LogEvent::fail("b.bin copy from a.bin: create b.bin: File exists"),
        ],
    ));
    result.merge(FetchOutcome::system_error("mem://x: task panicked: boom"));
    result
}

#[test]
fn text_report_hides_per_file_events_by_default() {
    let text = render_text(&sample(), Duration::from_secs(123), false);
    assert_eq!(
        text,
        "Time elapsed: 2m 3s | Downloaded: 1500 bytes\n\
         ERROR mem://x: task panicked: boom\n"
    );
}

#[test]
fn verbose_text_report_lists_everything() {
    let text = render_text(&sample(), Duration::from_secs(5), true);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        [
            "Time elapsed: 5s | Downloaded: 1500 bytes",
            "OK a.bin",
            "FAIL b.bin copy from a.bin: create b.bin: File exists",
            "ERROR mem://x: task panicked: boom",
        ]
    );
}

#[test]
fn json_report_has_all_events() {
    let json = render_json(&sample(), Duration::from_millis(2500)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["total_bytes"], 1500);
    assert_eq!(value["elapsed_secs"], 2.5);
    let events = value["events"].as_array().unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0]["kind"], "success");
    assert_eq!(events[0]["message"], "a.bin");
    assert_eq!(events[2]["kind"], "system_error");
}
