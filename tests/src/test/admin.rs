use crate::util::{booth, init, three_candidates};
use ballot::admin::NewCandidate;
use ballot_common::mutation::{ConfigMutation, ConfigRow};
use serde_json::json;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn closing_voting_round_trips_through_the_backend() {
    init();
    let booth = booth(three_candidates());
    booth.ballot.sync().refresh().await;

    booth.ballot.admin().set_voting_open(false).await.unwrap();
    assert!(!booth.ballot.store().voting_open());
    assert_eq!(
        booth.backend.mutations(),
        vec![ConfigMutation::Add(ConfigRow::voting_status(false))]
    );

    // The backend applies the row before the resync reads it back.
    booth.backend.set_snapshot(json!({
        "s": {},
        "c": [
            { "id": "VOTING_STATUS", "name": "CLOSED", "song": "SYSTEM_STATUS" },
            { "id": "c1", "name": "Ann" },
        ]
    }));
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(booth.backend.reads(), 2);
    assert!(!booth.ballot.store().voting_open());
    assert_eq!(booth.ballot.store().candidates().len(), 1);

    booth.ballot.admin().set_voting_open(true).await.unwrap();
    assert_eq!(
        booth.backend.mutations().last(),
        Some(&ConfigMutation::Update(ConfigRow::voting_status(true)))
    );
}

#[tokio::test(start_paused = true)]
async fn added_candidate_shows_up_after_resync() {
    init();
    let booth = booth(json!({ "s": {}, "c": [] }));

    let id = booth
        .ballot
        .admin()
        .add_candidate(NewCandidate {
            id: Some("c42".to_string()),
            name: "Dee".to_string(),
            song: "Song D".to_string(),
            image: None,
            video_link: Some("https://video.example/d".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(id, "c42");
    assert!(booth.ballot.store().candidates().is_empty());

    booth.backend.set_snapshot(json!({
        "s": { "c42": { "singing": 3 } },
        "c": [{ "id": "c42", "name": "Dee", "song": "Song D", "videoLink": "https://video.example/d" }]
    }));
    tokio::time::sleep(Duration::from_millis(1500)).await;

    let candidates = booth.ballot.store().candidates();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].video_link, "https://video.example/d");
    assert_eq!(candidates[0].scores.singing, 3);
}

#[tokio::test]
async fn unreachable_backend_is_reported() {
    init();
    let booth = booth(three_candidates());

    booth.backend.fail_reads(true);
    let report = booth.ballot.admin().check_connection().await;
    assert!(!report.ok);

    booth.backend.fail_reads(false);
    assert!(booth.ballot.admin().check_connection().await.ok);
}
