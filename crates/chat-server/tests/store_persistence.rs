use chat_server::chat::sweeper::Sweeper;
use chat_server::core::clock::ManualClock;
use chat_server::core::config::StoreConfig;
use chat_server::core::{AppState, ChatServerConfig};
use chrono::Duration;
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

fn config_for(dir: &std::path::Path) -> ChatServerConfig {
    ChatServerConfig {
        store: StoreConfig::Json(dir.to_path_buf()),
        ..ChatServerConfig::default()
    }
}

#[tokio::test]
async fn test_room_state_survives_restart() {
    let dir = tempdir().unwrap();
    let config = config_for(dir.path());
    let clock = Arc::new(ManualClock::at_epoch());

    {
        let store = config.store.open().await.unwrap();
        let state = AppState::new(config.clone(), store, clock.clone());
        state.directory.register("alice").await.unwrap();
        state.directory.register("bob").await.unwrap();
        // store is dropped here
    }

    assert!(dir.path().join("participants.json").exists());
    assert!(dir.path().join("messages.json").exists());

    let store = config.store.open().await.unwrap();
    let state = AppState::new(config, store, clock.clone());
    assert_eq!(state.directory.list().await.unwrap().len(), 2);
    assert_eq!(state.log.list_for("carol", None).await.unwrap().len(), 2);

    // Reloaded entries keep their last-seen times and expire normally
    clock.advance(Duration::seconds(11));
    let mut evicted = Sweeper::from_state(&state).sweep().await.unwrap();
    evicted.sort();
    assert_eq!(evicted, vec!["alice", "bob"]);
}

#[tokio::test]
async fn test_eviction_is_persisted() {
    let dir = tempdir().unwrap();
    let config = config_for(dir.path());
    let clock = Arc::new(ManualClock::at_epoch());

    {
        let state = AppState::new(config.clone(), config.store.open().await.unwrap(), clock.clone());
        state.directory.register("alice").await.unwrap();
        clock.advance(Duration::seconds(12));
        Sweeper::from_state(&state).sweep().await.unwrap();
    }

    let state = AppState::new(config.clone(), config.store.open().await.unwrap(), clock);
    assert!(state.directory.list().await.unwrap().is_empty());

    let messages = state.log.list_for("anyone", None).await.unwrap();
    let texts: Vec<_> = messages.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["joined", "left"]);
}

#[tokio::test]
async fn test_corrupt_participants_file_fails_open() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("participants.json"), "{ malformed json ...").unwrap();

    let result = config_for(dir.path()).store.open().await;
    assert!(result.is_err(), "Opening a corrupt store should fail");
    assert!(result.err().unwrap().to_string().contains("corrupt collection"));
}
