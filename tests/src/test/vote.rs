use crate::util::{booth, init, three_candidates};
use ballot::storage::Storage;
use ballot::submit::error::Rejection;
use ballot_common::{candidate::Vote, category::Category, selection::Selections};
use serde_json::json;
use std::time::Duration;

#[tokio::test]
async fn vote_once_per_device() {
    init();
    let booth = booth(three_candidates());
    booth.ballot.sync().refresh().await;
    assert!(booth.ballot.store().voting_open());
    assert!(!booth.ballot.store().has_voted());

    booth
        .ballot
        .submit(&Selections::new("c1", "c2", "c3"))
        .await
        .expect("should be accepted");
    assert_eq!(
        booth.backend.votes(),
        vec![
            Vote::new("c1", Category::Singing),
            Vote::new("c2", Category::Popularity),
            Vote::new("c3", Category::Costume),
        ]
    );
    assert!(booth.ballot.store().has_voted());

    let second = booth.ballot.submit(&Selections::new("c3", "c3", "c3")).await;
    assert_eq!(second, Err(Rejection::AlreadyVoted));
    assert_eq!(booth.backend.votes().len(), 3);

    booth.ballot.admin().clear_history().unwrap();
    booth
        .ballot
        .submit(&Selections::new("c3", "c3", "c3"))
        .await
        .expect("should be accepted after clearing history");
    assert_eq!(booth.backend.votes().len(), 6);
}

#[tokio::test]
async fn closed_voting_rejects_without_writes() {
    init();
    let booth = booth(json!({
        "s": {},
        "c": [
            { "id": "VOTING_STATUS", "name": "CLOSED", "song": "SYSTEM_STATUS" },
            { "id": "c1", "name": "Ann" },
        ]
    }));
    booth.ballot.sync().refresh().await;
    assert!(!booth.ballot.store().voting_open());

    let res = booth.ballot.submit(&Selections::new("c1", "c1", "c1")).await;
    assert_eq!(res, Err(Rejection::VotingClosed));
    assert!(booth.backend.votes().is_empty());
    assert!(!booth.ballot.store().has_voted());
}

#[tokio::test]
async fn test_mode_ignores_the_voted_fact() {
    init();
    let booth = booth(json!({
        "s": {},
        "c": [
            { "id": "SETTING_MODE", "name": "TEST", "song": "SYSTEM_CONFIG" },
            { "id": "c1", "name": "Ann" },
        ]
    }));
    booth.ballot.sync().refresh().await;
    booth.storage.set_voted().unwrap();

    for _ in 0..2 {
        booth
            .ballot
            .submit(&Selections::new("c1", "c1", "c1"))
            .await
            .expect("test mode accepts repeat votes");
    }
    assert_eq!(booth.backend.votes().len(), 6);
}

#[tokio::test(start_paused = true)]
async fn sequential_queue_keeps_submissions_apart() {
    init();
    let booth = booth(three_candidates());
    booth.ballot.sync().refresh().await;
    booth.backend.hold_writes();

    booth
        .ballot
        .run_load(2, |_| {})
        .expect("should start with candidates known");

    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(booth.ballot.queue().active(), 1);
    assert_eq!(booth.ballot.queue().pending(), 5);
    assert!(booth.backend.votes().is_empty());

    booth.backend.release_writes();
    while booth.ballot.store().load_running() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let categories = booth
        .backend
        .votes()
        .iter()
        .map(|v| v.category)
        .collect::<Vec<_>>();
    assert_eq!(
        categories,
        vec![
            Category::Singing,
            Category::Popularity,
            Category::Costume,
            Category::Singing,
            Category::Popularity,
            Category::Costume,
        ]
    );
}
