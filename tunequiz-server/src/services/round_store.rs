//! In-memory round registry
//!
//! Rounds live for the process lifetime. The lock is held only for the map
//! read or the single state swap; clip preparation never holds it while a
//! tool is running.

use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{ClipState, Round, RoundError};

/// Round id → lifecycle record
#[derive(Debug, Default)]
pub struct RoundStore {
    rounds: RwLock<HashMap<String, Round>>,
}

impl RoundStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new Pending round and return its id
    pub async fn create(
        &self,
        title: String,
        artist: String,
        source_ref: String,
        clip_length_seconds: u32,
    ) -> String {
        let id = Uuid::new_v4().simple().to_string();
        let round = Round::new(id.clone(), title, artist, source_ref, clip_length_seconds);

        self.rounds.write().await.insert(id.clone(), round);
        tracing::debug!(round_id = %id, "Round created");
        id
    }

    /// Snapshot of a round
    pub async fn get(&self, round_id: &str) -> Result<Round, RoundError> {
        self.rounds
            .read()
            .await
            .get(round_id)
            .cloned()
            .ok_or_else(|| RoundError::NotFound(round_id.to_string()))
    }

    pub async fn mark_ready(&self, round_id: &str, clip_path: PathBuf) -> Result<(), RoundError> {
        self.finish(round_id, ClipState::Ready { clip_path }).await
    }

    pub async fn mark_failed(&self, round_id: &str, detail: String) -> Result<(), RoundError> {
        self.finish(round_id, ClipState::Failed { detail }).await
    }

    async fn finish(&self, round_id: &str, terminal: ClipState) -> Result<(), RoundError> {
        let label = terminal.label();
        let mut rounds = self.rounds.write().await;
        let round = rounds
            .get_mut(round_id)
            .ok_or_else(|| RoundError::NotFound(round_id.to_string()))?;
        round.finish(terminal)?;
        tracing::debug!(round_id = %round_id, state = label, "Round finished");
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.rounds.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rounds.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    async fn store_with_round() -> (RoundStore, String) {
        let store = RoundStore::new();
        let id = store
            .create(
                "Tum Hi Ho".into(),
                "Arijit Singh".into(),
                "https://www.youtube.com/watch?v=Umqb9KENgmk".into(),
                30,
            )
            .await;
        (store, id)
    }

    #[tokio::test]
    async fn test_create_is_pending() {
        let (store, id) = store_with_round().await;
        let round = store.get(&id).await.unwrap();

        assert_eq!(round.state(), &ClipState::Pending);
        assert_eq!(round.clip_length_seconds, 30);
        assert!(round.finished_at.is_none());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_round() {
        let store = RoundStore::new();
        assert_eq!(
            store.get("nope").await.unwrap_err(),
            RoundError::NotFound("nope".into())
        );
        assert_eq!(
            store.mark_ready("nope", PathBuf::from("/tmp/x.mp3")).await.unwrap_err(),
            RoundError::NotFound("nope".into())
        );
    }

    #[tokio::test]
    async fn test_second_transition_rejected_and_record_unchanged() {
        let (store, id) = store_with_round().await;
        store.mark_ready(&id, PathBuf::from("/tmp/clip.mp3")).await.unwrap();

        let err = store.mark_failed(&id, "late failure".into()).await.unwrap_err();
        assert_eq!(err, RoundError::AlreadyTerminal(id.clone()));

        let round = store.get(&id).await.unwrap();
        assert!(round.is_ready());
        assert!(round.error_detail().is_none());
        assert_eq!(round.clip_path(), Some(std::path::Path::new("/tmp/clip.mp3")));
    }

    #[tokio::test]
    async fn test_failed_round_carries_detail_only() {
        let (store, id) = store_with_round().await;
        store.mark_failed(&id, "yt-dlp exited with 1".into()).await.unwrap();

        let round = store.get(&id).await.unwrap();
        assert!(round.clip_path().is_none());
        assert_eq!(round.status().error.as_deref(), Some("yt-dlp exited with 1"));
        assert!(round.finished_at.is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_have_unique_ids() {
        let store = Arc::new(RoundStore::new());
        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..50 {
            let store = store.clone();
            tasks.spawn(async move {
                store
                    .create(format!("song {i}"), "a".into(), "https://youtu.be/x".into(), 10)
                    .await
            });
        }

        let mut ids = HashSet::new();
        while let Some(id) = tasks.join_next().await {
            assert!(ids.insert(id.unwrap()));
        }
        assert_eq!(store.len().await, 50);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_terminal_writes_single_winner() {
        let (store, id) = store_with_round().await;
        let store = Arc::new(store);

        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..8 {
            let store = store.clone();
            let id = id.clone();
            tasks.spawn(async move {
                if i % 2 == 0 {
                    store.mark_ready(&id, PathBuf::from("/tmp/clip.mp3")).await
                } else {
                    store.mark_failed(&id, format!("failure {i}")).await
                }
            });
        }

        let mut winners = 0;
        while let Some(result) = tasks.join_next().await {
            if result.unwrap().is_ok() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
        assert!(store.get(&id).await.unwrap().is_terminal());
    }
}
