use crate::util::{booth, init, three_candidates};
use ballot::load::{error::LoadError, LoadProgress};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn ten_users_report_ten_times() {
    init();
    let booth = booth(three_candidates());
    booth.ballot.sync().refresh().await;

    let reports: Arc<Mutex<Vec<LoadProgress>>> = Arc::default();
    let r = reports.clone();
    booth
        .ballot
        .run_load(10, move |progress| r.lock().unwrap().push(progress))
        .expect("should start");

    // The caller is not held up by the submissions.
    assert!(booth.ballot.store().load_running());
    assert!(reports.lock().unwrap().is_empty());

    while booth.ballot.store().load_running() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let reports = reports.lock().unwrap();
    assert_eq!(reports.len(), 10);
    assert!(reports
        .windows(2)
        .all(|pair| pair[0].completed < pair[1].completed));
    assert_eq!(reports.last().map(|p| p.completed), Some(10));
    assert_eq!(booth.backend.votes().len(), 30);
    assert_eq!(booth.ballot.queue().pending(), 0);
}

#[tokio::test]
async fn refuses_an_empty_candidate_set() {
    init();
    let booth = booth(json!({ "s": {}, "c": [] }));
    booth.ballot.sync().refresh().await;

    let res = booth.ballot.run_load(10, |_| {});
    assert_eq!(res, Err(LoadError::NoCandidates));
    assert!(!booth.ballot.store().load_running());
    assert!(booth.backend.votes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn synthetic_votes_ignore_closed_voting() {
    init();
    let booth = booth(json!({
        "s": {},
        "c": [{ "id": "VOTING_STATUS", "name": "CLOSED" }, { "id": "c1", "name": "Ann" }]
    }));
    booth.ballot.sync().refresh().await;
    assert!(!booth.ballot.store().voting_open());

    booth.ballot.run_load(4, |_| {}).unwrap();
    while booth.ballot.store().load_running() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(booth.backend.votes().len(), 12);
    assert!(!booth.ballot.store().has_voted());
}
