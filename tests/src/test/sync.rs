use crate::util::{booth, booth_with, init, three_candidates};
use ballot::configuration::Configuration;
use ballot_common::category::Category;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn scores_from_short_aliases() {
    init();
    let booth = booth(json!({
        "s": { "c1": { "s": 5, "p": 2, "c": 1 } },
        "c": [{ "id": "c1", "name": "Ann", "song": "X" }]
    }));

    assert!(booth.ballot.sync().refresh().await);
    let candidates = booth.ballot.store().candidates();
    assert_eq!(candidates.len(), 1);
    let ann = &candidates[0];
    assert_eq!(ann.name, "Ann");
    assert_eq!(ann.song, "X");
    assert_eq!(ann.score(Category::Singing), 5);
    assert_eq!(ann.score(Category::Popularity), 2);
    assert_eq!(ann.score(Category::Costume), 1);
}

#[tokio::test]
async fn closed_flag_survives_a_missing_sentinel() {
    init();
    let booth = booth(json!({
        "s": {},
        "c": [{ "id": "VOTING_STATUS", "name": "CLOSED" }, { "id": "c1", "name": "Ann" }]
    }));
    booth.ballot.sync().refresh().await;
    assert!(!booth.ballot.store().voting_open());

    booth
        .backend
        .set_snapshot(json!({ "s": {}, "c": [{ "id": "c1", "name": "Ann" }] }));
    booth.ballot.sync().refresh().await;
    assert!(!booth.ballot.store().voting_open());
    assert_eq!(booth.ballot.store().candidates().len(), 1);
}

#[tokio::test]
async fn unchanged_snapshot_does_not_notify() {
    init();
    let booth = booth(three_candidates());
    let notified = Arc::new(AtomicUsize::new(0));
    let n = notified.clone();
    let subscription = booth.ballot.store().subscribe(move || {
        n.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(notified.load(Ordering::SeqCst), 1);

    assert!(booth.ballot.sync().refresh().await);
    assert_eq!(notified.load(Ordering::SeqCst), 2);
    let colors = booth
        .ballot
        .store()
        .candidates()
        .iter()
        .map(|c| c.color)
        .collect::<Vec<_>>();

    assert!(!booth.ballot.sync().refresh().await);
    assert_eq!(notified.load(Ordering::SeqCst), 2);
    let again = booth
        .ballot
        .store()
        .candidates()
        .iter()
        .map(|c| c.color)
        .collect::<Vec<_>>();
    assert_eq!(colors, again);

    subscription.unsubscribe();
}

#[tokio::test]
async fn failed_read_keeps_the_last_view() {
    init();
    let booth = booth(three_candidates());
    booth.ballot.sync().refresh().await;

    booth.backend.fail_reads(true);
    assert!(!booth.ballot.sync().refresh().await);
    assert_eq!(booth.ballot.store().candidates().len(), 3);

    booth.backend.fail_reads(false);
    booth.backend.set_snapshot(json!({ "s": [1, 2], "c": "not rows" }));
    assert!(!booth.ballot.sync().refresh().await);
    assert_eq!(booth.ballot.store().candidates().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn polling_follows_the_subscriber_count() {
    init();
    let mut conf = Configuration::default();
    conf.sync.interval_millis = 1000;
    let booth = booth_with(conf, three_candidates());

    booth.ballot.start_sync();
    booth.ballot.start_sync();
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(booth.backend.reads(), 1);
    assert_eq!(booth.ballot.store().candidates().len(), 3);

    tokio::time::sleep(Duration::from_millis(2000)).await;
    assert_eq!(booth.backend.reads(), 3);

    booth.ballot.stop_sync();
    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(booth.backend.reads(), 4);

    booth.ballot.stop_sync();
    assert!(!booth.ballot.sync().is_polling());
    tokio::time::sleep(Duration::from_millis(5000)).await;
    assert_eq!(booth.backend.reads(), 4);
}

#[tokio::test]
async fn null_stats_entry_does_not_stall_sync() {
    init();
    let booth = booth(json!({
        "s": { "c1": { "s": 5 }, "c2": null },
        "c": [{ "id": "c1", "name": "Ann" }, { "id": "c2", "name": "Bo" }]
    }));

    assert!(booth.ballot.sync().refresh().await);
    let candidates = booth.ballot.store().candidates();
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].score(Category::Singing), 5);
    assert_eq!(candidates[1].score(Category::Singing), 0);
}
