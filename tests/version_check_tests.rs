//! Integration tests for version resolution against a loopback feed server

mod common;

use common::CannedResponse;
use std::time::Duration;
use updatego::update::{http, Checker, Deadline, PollPolicy};
use updatego::{InstallLayout, UpdateError};

const FEED: &str = r#"[
    {"version": "go1.17.1", "stable": true},
    {"version": "go1.16.8", "stable": true},
    {"version": "go1.18beta1", "stable": false}
]"#;

fn fast_policy() -> PollPolicy {
    PollPolicy {
        interval: Duration::from_millis(50),
        budget: Duration::from_millis(2_000),
        immediate: true,
    }
}

fn checker_for(base_url: &str) -> Checker {
    Checker::with_feed_url(http::build_client().unwrap(), base_url.to_string())
        .with_policy(fast_policy())
}

#[test]
fn latest_version_picks_first_stable_release() {
    let base = common::serve(vec![CannedResponse::ok(FEED)]);
    let checker = checker_for(&base);

    let deadline = Deadline::after(Duration::from_secs(5));
    let version = checker.latest_version(&deadline).unwrap();

    assert_eq!(version, "1.17.1");
}

#[test]
fn latest_version_retries_transient_server_errors() {
    let base = common::serve(vec![
        CannedResponse::status(500),
        CannedResponse::status(503),
        CannedResponse::ok(FEED),
    ]);
    let checker = checker_for(&base);

    let deadline = Deadline::after(Duration::from_secs(5));
    let version = checker.latest_version(&deadline).unwrap();

    assert_eq!(version, "1.17.1");
}

#[test]
fn latest_version_fails_without_stable_entry() {
    let feed = r#"[{"version": "go1.18beta1", "stable": false}]"#;
    let base = common::serve(vec![CannedResponse::ok(feed)]);
    let checker = checker_for(&base);

    let deadline = Deadline::after(Duration::from_secs(5));
    let result = checker.latest_version(&deadline);

    assert!(matches!(result, Err(UpdateError::NoStableRelease)));
}

#[test]
fn latest_version_times_out_when_feed_stays_down() {
    let responses = (0..20).map(|_| CannedResponse::status(500)).collect();
    let base = common::serve(responses);
    let checker = Checker::with_feed_url(http::build_client().unwrap(), base).with_policy(
        PollPolicy {
            interval: Duration::from_millis(50),
            budget: Duration::from_millis(300),
            immediate: true,
        },
    );

    let deadline = Deadline::after(Duration::from_secs(10));
    let result = checker.latest_version(&deadline);

    match result {
        Err(UpdateError::RetriesExhausted { last_error, .. }) => {
            assert!(
                matches!(
                    last_error.as_deref(),
                    Some(UpdateError::UnexpectedStatus { status: 500, .. })
                ),
                "the last retryable error should be surfaced"
            );
        },
        other => panic!("expected RetriesExhausted, got {:?}", other),
    }
}

#[test]
fn malformed_feed_is_an_error_not_a_retry() {
    let base = common::serve(vec![CannedResponse::ok("not json")]);
    let checker = checker_for(&base);

    let deadline = Deadline::after(Duration::from_secs(5));
    let result = checker.latest_version(&deadline);

    assert!(matches!(result, Err(UpdateError::Network { .. })));
}

#[test]
fn installed_version_reads_version_file() {
    let temp = tempfile::tempdir().unwrap();
    let layout = InstallLayout::new(temp.path().join("lib"), temp.path().join("bin")).unwrap();
    let checker = checker_for("http://127.0.0.1:1");

    let toolchain = layout.install_root.join("go");
    std::fs::create_dir_all(&toolchain).unwrap();
    std::fs::write(
        toolchain.join("VERSION"),
        "go1.22.1\ntime 2026-01-01T00:00:00Z\n",
    )
    .unwrap();

    assert_eq!(checker.installed_version(&layout).unwrap(), "1.22.1");
}

#[test]
fn installed_version_is_empty_on_fresh_machine() {
    let temp = tempfile::tempdir().unwrap();
    let layout = InstallLayout::new(temp.path().join("lib"), temp.path().join("bin")).unwrap();
    let checker = checker_for("http://127.0.0.1:1");

    assert_eq!(checker.installed_version(&layout).unwrap(), "");
}
