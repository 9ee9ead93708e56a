//! End-to-end: several participants sharing one ledger.

use std::io::Write;
use std::time::Duration;

use commitsync::chain::{ChainManager, ReconcileOutcome};
use commitsync::core::{encode, Uid};
use commitsync::{start, Config};
use commitsync_testkit::{bucket, TestNetwork};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn credentials_file(account: char, secret: char) -> tempfile::NamedTempFile {
    let json = format!(
        r#"{{"account_id":"{}","read":{{"access_key_id":"{}","secret_access_key":"{}"}}}}"#,
        account.to_string().repeat(32),
        account.to_string().repeat(32),
        secret.to_string().repeat(64)
    );
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn participants_see_each_other() {
    init_tracing();
    let network = TestNetwork::new();
    let alice = network.join(Uid(0), 1, 100.0);
    let bob = network.join(Uid(1), 2, 100.0);
    let _validator = network.join(Uid(2), 3, 50_000.0);

    let alice_creds = credentials_file('a', 'a');
    let config = Config {
        chain: network.config(),
        credentials_path: Some(alice_creds.path().to_path_buf()),
    };

    let alice_manager = start(&config, network.ledger(), network.membership(), alice)
        .await
        .unwrap();
    assert_eq!(alice_manager.bucket(Uid(0)), Some(bucket('a')));

    let bob_manager = ChainManager::start(
        network.config(),
        network.ledger(),
        network.membership(),
        Some(network.identity(&bob, bucket('b'))),
    )
    .await
    .unwrap();

    // Bob's start refreshed after publishing; Alice catches up on demand.
    assert_eq!(bob_manager.peers(), vec![Uid(0), Uid(1)]);
    alice_manager.refresh().await.unwrap();
    assert_eq!(alice_manager.bucket(Uid(1)), Some(bucket('b')));
    assert_eq!(alice_manager.all_buckets()[&Uid(2)], None);

    alice_manager.shutdown().await;
    bob_manager.shutdown().await;
}

#[tokio::test]
async fn credential_rotation_republishes_once() {
    init_tracing();
    let network = TestNetwork::new();
    let alice = network.join(Uid(4), 1, 0.0);
    network.commit(&alice, &bucket('a'));

    let rotated = credentials_file('a', 'z');
    let config = Config {
        chain: network.config(),
        credentials_path: Some(rotated.path().to_path_buf()),
    };

    let manager = start(&config, network.ledger(), network.membership(), alice)
        .await
        .unwrap();
    assert_eq!(network.ledger.submission_count(), 1);
    assert_eq!(
        manager.bucket(Uid(4)).map(|b| b.secret_access_key),
        Some("z".repeat(64))
    );

    assert_eq!(
        manager.reconcile().await.unwrap(),
        ReconcileOutcome::Unchanged { uid: Uid(4) }
    );
    assert_eq!(network.ledger.submission_count(), 1);
    manager.shutdown().await;
}

#[tokio::test]
async fn observer_tracks_windows() {
    init_tracing();
    let network = TestNetwork::new();
    network.ledger.advance_to(7);

    let manager = start(
        &Config {
            chain: network.config(),
            credentials_path: None,
        },
        network.ledger(),
        network.membership(),
        commitsync::Keypair::from_seed(&[9; 32]),
    )
    .await
    .unwrap();
    assert_eq!(manager.current_block(), 7);
    assert_eq!(manager.current_window(), 0);

    manager.spawn_block_listener().unwrap();
    while network.ledger.subscriber_count() == 0 {
        tokio::task::yield_now().await;
    }
    network.ledger.advance_to(31);

    let state = tokio::time::timeout(Duration::from_secs(1), manager.wait_for_window(3))
        .await
        .unwrap();
    assert_eq!(state.window, 3);
    assert_eq!(
        manager.window_to_seed(3).await.unwrap(),
        commitsync::ledger::MemoryLedger::hash_for(30).to_hex()
    );
    manager.shutdown().await;
}

#[tokio::test]
async fn malformed_commitment_does_not_hide_others() {
    init_tracing();
    let network = TestNetwork::new();
    let good = network.join(Uid(1), 1, 0.0);
    let bad = network.join(Uid(2), 2, 0.0);
    network.commit(&good, &bucket('g'));
    network
        .ledger
        .set_record(network.netuid, bad.hotkey(), &encode(&bucket('b')).unwrap()[..100]);

    let manager = ChainManager::start(network.config(), network.ledger(), network.membership(), None)
        .await
        .unwrap();
    assert_eq!(manager.commitments().keys().copied().collect::<Vec<_>>(), vec![Uid(1)]);
    assert!(manager.fetch_commitment(Uid(2)).await.is_err());
    manager.shutdown().await;
}
