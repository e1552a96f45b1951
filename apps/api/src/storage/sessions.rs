//! Session Store: owns one `ScreeningSession` per candidate between requests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use tokio::sync::{OwnedMutexGuard, RwLock};
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::session::ScreeningSession;
use crate::storage::StorageError;

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, id: Uuid) -> Result<Option<ScreeningSession>, StorageError>;
    async fn save(&self, session: &ScreeningSession) -> Result<(), StorageError>;
    /// Returns whether a session was removed.
    async fn remove(&self, id: Uuid) -> Result<bool, StorageError>;
}

/// Process-local store. Entries expire `ttl` after their last save; expired
/// entries read as missing and are pruned on the next save.
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<Uuid, (ScreeningSession, Instant)>>,
    ttl: Duration,
}

impl InMemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    fn is_live(&self, saved_at: Instant) -> bool {
        saved_at.elapsed() < self.ttl
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, id: Uuid) -> Result<Option<ScreeningSession>, StorageError> {
        Ok(self
            .sessions
            .read()
            .await
            .get(&id)
            .filter(|(_, saved_at)| self.is_live(*saved_at))
            .map(|(session, _)| session.clone()))
    }

    async fn save(&self, session: &ScreeningSession) -> Result<(), StorageError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, (_, saved_at)| self.is_live(*saved_at));
        if sessions.len() < before {
            debug!("Pruned {} expired sessions", before - sessions.len());
        }
        sessions.insert(session.id, (session.clone(), Instant::now()));
        Ok(())
    }

    async fn remove(&self, id: Uuid) -> Result<bool, StorageError> {
        Ok(self
            .sessions
            .write()
            .await
            .remove(&id)
            .is_some_and(|(_, saved_at)| self.is_live(saved_at)))
    }
}

/// Per-session mutual exclusion for the load, transition, save cycle.
///
/// A handler holds the guard from `acquire` until its save completes, so two
/// requests on one session never work from the same snapshot. Idle entries are
/// dropped on the next `acquire`.
#[derive(Default)]
pub struct SessionLocks {
    locks: Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>,
}

impl SessionLocks {
    pub async fn acquire(&self, id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.retain(|other, lock| *other == id || Arc::strong_count(lock) > 1);
            locks.entry(id).or_default().clone()
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().unwrap().len()
    }
}

/// Sessions as JSON strings under `screening:session:<id>`, expiring after `ttl_secs`.
pub struct RedisSessionStore {
    conn: redis::aio::MultiplexedConnection,
    ttl_secs: u64,
}

impl RedisSessionStore {
    pub async fn connect(redis_url: &str, ttl_secs: u64) -> Result<Self, StorageError> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        info!("Redis session store connected (ttl {ttl_secs}s)");
        Ok(Self { conn, ttl_secs })
    }

    fn key(id: Uuid) -> String {
        format!("screening:session:{id}")
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, id: Uuid) -> Result<Option<ScreeningSession>, StorageError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(Self::key(id)).await?;
        raw.map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(StorageError::from)
    }

    async fn save(&self, session: &ScreeningSession) -> Result<(), StorageError> {
        let json = serde_json::to_string(session)?;
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(Self::key(session.id), json, self.ttl_secs)
            .await?;
        Ok(())
    }

    async fn remove(&self, id: Uuid) -> Result<bool, StorageError> {
        let mut conn = self.conn.clone();
        let removed: u64 = conn.del(Self::key(id)).await?;
        Ok(removed > 0)
    }
}
