//! Session Registry
//!
//! Process-wide map from session id to that session's store and progress
//! channel. The map lock is only held for lookups; each session carries its
//! own async mutex, held for the whole exchange. The guard for an exchange is
//! owned, so the exchange can run on its own task and outlive the request
//! that started it.
//!
//! Sessions idle for longer than the configured time to live are dropped the
//! next time a session is created or looked up. A session with an exchange
//! in flight is never dropped.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::{broadcast, watch, Mutex, MutexGuard, OwnedMutexGuard, RwLock};
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use sdk::{AgentEvent, ProgressSink, SageError, Turn};

use super::SessionStore;

/// Opaque session identifier (a UUID v4 for server-created sessions)
pub type SessionId = String;

/// Buffered progress events per session
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Default idle time before a session is dropped
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(3600);

/// One session: its store, a broadcast channel for progress events and the
/// last transcript published outside an exchange
pub struct SessionHandle {
    id: SessionId,
    store: Arc<Mutex<SessionStore>>,
    events: broadcast::Sender<AgentEvent>,
    published: watch::Sender<Vec<Turn>>,
    last_active: StdMutex<Instant>,
}

impl SessionHandle {
    fn new(id: SessionId) -> Self {
        let mut store = SessionStore::new();
        store.initialize();
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (published, _) = watch::channel(store.transcript().to_vec());
        Self {
            id,
            store: Arc::new(Mutex::new(store)),
            events,
            published,
            last_active: StdMutex::new(Instant::now()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Wait for the store
    pub async fn lock(&self) -> MutexGuard<'_, SessionStore> {
        self.store.lock().await
    }

    /// Take the store for a new exchange or a reset.
    ///
    /// The guard is owned so it can be moved into a spawned task.
    ///
    /// # Errors
    ///
    /// `SageError::SessionBusy` while another exchange holds the session.
    pub fn try_begin(&self) -> Result<OwnedMutexGuard<SessionStore>, SageError> {
        Arc::clone(&self.store)
            .try_lock_owned()
            .map_err(|_| SageError::SessionBusy)
    }

    /// True while an exchange holds the store
    pub fn is_busy(&self) -> bool {
        self.store.try_lock().is_err()
    }

    /// Record `store`'s transcript as the view served while the session is busy
    pub fn publish(&self, store: &SessionStore) {
        self.published.send_replace(store.transcript().to_vec());
    }

    /// Transcript as of the last `publish`
    pub fn published_transcript(&self) -> Vec<Turn> {
        self.published.borrow().clone()
    }

    /// Receive progress events from exchanges started after this call
    pub fn subscribe(&self) -> broadcast::Receiver<AgentEvent> {
        self.events.subscribe()
    }

    /// Sink that forwards agent progress to this session's subscribers
    pub fn sink(&self) -> BroadcastSink {
        BroadcastSink {
            tx: self.events.clone(),
        }
    }

    fn touch(&self) {
        if let Ok(mut last) = self.last_active.lock() {
            *last = Instant::now();
        }
    }

    fn idle_for(&self) -> Duration {
        self.last_active
            .lock()
            .map(|last| last.elapsed())
            .unwrap_or_default()
    }
}

/// Progress sink backed by a broadcast channel
#[derive(Clone)]
pub struct BroadcastSink {
    tx: broadcast::Sender<AgentEvent>,
}

impl ProgressSink for BroadcastSink {
    fn on_event(&self, event: AgentEvent) {
        // No subscribers is fine
        let _ = self.tx.send(event);
    }
}

pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, Arc<SessionHandle>>>,
    idle_ttl: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_idle_ttl(DEFAULT_SESSION_TTL)
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry that drops sessions idle for longer than `idle_ttl`
    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_ttl,
        }
    }

    /// Create a session under a fresh id
    pub async fn create(&self) -> (SessionId, Arc<SessionHandle>) {
        let id = Uuid::new_v4().to_string();
        let handle = Arc::new(SessionHandle::new(id.clone()));

        let mut sessions = self.sessions.write().await;
        self.evict_idle(&mut sessions);
        sessions.insert(id.clone(), Arc::clone(&handle));
        debug!("Created session {}", id);
        (id, handle)
    }

    /// Look up a session, creating it on first use
    pub async fn get_or_create(&self, id: &str) -> Arc<SessionHandle> {
        let mut sessions = self.sessions.write().await;
        self.evict_idle(&mut sessions);

        let handle = Arc::clone(sessions.entry(id.to_string()).or_insert_with(|| {
            debug!("Created session {}", id);
            Arc::new(SessionHandle::new(id.to_string()))
        }));
        handle.touch();
        handle
    }

    pub async fn get(&self, id: &str) -> Option<Arc<SessionHandle>> {
        let handle = self.sessions.read().await.get(id).cloned()?;
        handle.touch();
        Some(handle)
    }

    /// Drop a session. Returns whether it existed.
    pub async fn remove(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            debug!("Removed session {}", id);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    fn evict_idle(&self, sessions: &mut HashMap<SessionId, Arc<SessionHandle>>) {
        let before = sessions.len();
        sessions.retain(|_, handle| handle.is_busy() || handle.idle_for() <= self.idle_ttl);

        let evicted = before - sessions.len();
        if evicted > 0 {
            info!("Evicted {} idle sessions", evicted);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::GREETING;

    #[tokio::test]
    async fn test_create_initializes_session() {
        let registry = SessionRegistry::new();
        let (id, handle) = registry.create().await;

        assert_eq!(handle.id(), id);
        assert_eq!(registry.len().await, 1);

        let store = handle.lock().await;
        assert_eq!(store.transcript()[0].content, GREETING);
    }

    #[tokio::test]
    async fn test_get_or_create_returns_same_handle() {
        let registry = SessionRegistry::new();
        let first = registry.get_or_create("abc").await;
        let second = registry.get_or_create("abc").await;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_remove() {
        let registry = SessionRegistry::new();
        let (id, _) = registry.create().await;

        assert!(registry.remove(&id).await);
        assert!(!registry.remove(&id).await);
        assert!(registry.get(&id).await.is_none());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_try_begin_rejects_concurrent_exchange() {
        let registry = SessionRegistry::new();
        let (_, handle) = registry.create().await;

        let guard = handle.try_begin().unwrap();
        assert!(matches!(handle.try_begin(), Err(SageError::SessionBusy)));
        drop(guard);
        assert!(handle.try_begin().is_ok());
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let registry = SessionRegistry::new();
        let (_, a) = registry.create().await;
        let (_, b) = registry.create().await;

        a.lock().await.append_user_turn("only in a").unwrap();

        assert_eq!(a.lock().await.transcript().len(), 2);
        assert_eq!(b.lock().await.transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_broadcast_sink_reaches_subscribers() {
        let registry = SessionRegistry::new();
        let (_, handle) = registry.create().await;
        let mut rx = handle.subscribe();

        handle.sink().on_event(AgentEvent::Thinking { iteration: 1 });

        assert_eq!(rx.recv().await.unwrap(), AgentEvent::Thinking { iteration: 1 });
    }

    #[tokio::test]
    async fn test_owned_guard_outlives_borrow_of_handle() {
        let registry = SessionRegistry::new();
        let (_, handle) = registry.create().await;

        let mut guard = handle.try_begin().unwrap();
        let task = tokio::spawn(async move {
            guard.append_user_turn("from a task").unwrap();
        });
        task.await.unwrap();

        assert_eq!(handle.lock().await.transcript().len(), 2);
        assert!(!handle.is_busy());
    }

    #[tokio::test]
    async fn test_published_transcript_lags_until_publish() {
        let registry = SessionRegistry::new();
        let (_, handle) = registry.create().await;

        let mut store = handle.try_begin().unwrap();
        store.record_exchange("q", "a");
        assert_eq!(handle.published_transcript().len(), 1);

        handle.publish(&store);
        assert_eq!(handle.published_transcript().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_sessions_are_evicted() {
        let registry = SessionRegistry::with_idle_ttl(Duration::from_secs(60));
        let (stale, _) = registry.create().await;

        tokio::time::advance(Duration::from_secs(61)).await;
        let (fresh, _) = registry.create().await;

        assert!(registry.get(&stale).await.is_none());
        assert!(registry.get(&fresh).await.is_some());
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_keeps_session_alive() {
        let registry = SessionRegistry::with_idle_ttl(Duration::from_secs(60));
        let (id, _) = registry.create().await;

        tokio::time::advance(Duration::from_secs(40)).await;
        registry.get_or_create(&id).await;
        tokio::time::advance(Duration::from_secs(40)).await;
        registry.create().await;

        assert!(registry.get(&id).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_busy_session_is_not_evicted() {
        let registry = SessionRegistry::with_idle_ttl(Duration::from_secs(60));
        let (id, handle) = registry.create().await;
        let guard = handle.try_begin().unwrap();

        tokio::time::advance(Duration::from_secs(120)).await;
        registry.create().await;

        assert!(registry.get(&id).await.is_some());
        drop(guard);
    }

    #[test]
    fn test_sink_without_subscribers_is_silent() {
        let handle = SessionHandle::new("x".to_string());
        handle.sink().on_event(AgentEvent::Thinking { iteration: 1 });
    }
}
