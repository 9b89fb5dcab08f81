//! Session store.
//!
//! Maps opaque session IDs to [`SessionState`] behind a per-session mutex.
//! Only sessions that carry state are stored: a request without a live ID
//! runs against a transient anonymous state, and an entry is written when a
//! login establishes it. Entries live for a fixed TTL from creation (`moka`'s
//! time-to-live, not time-to-idle). Expiry is checked on lookup, so an expired
//! ID simply resolves to an anonymous state.

use std::sync::Arc;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use moka::future::Cache;
use rand::RngCore;
use tokio::sync::Mutex;

use crate::config::SessionConfig;
use crate::models::SessionState;

/// Shared, lockable state of one session.
///
/// Requests on the same session serialize on this mutex; different sessions
/// never contend.
pub type SessionHandle = Arc<Mutex<SessionState>>;

/// Number of random bytes in a session ID.
const SESSION_ID_BYTES: usize = 32;

/// Opaque session token (256 random bits, URL-safe base64).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Length of the encoded token.
    pub const ENCODED_LEN: usize = (SESSION_ID_BYTES * 4).div_ceil(3);

    /// Generate a new random session ID.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; SESSION_ID_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Accept a client-supplied token if it has the shape of one we issued.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let well_formed = value.len() == Self::ENCODED_LEN
            && value
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        well_formed.then(|| Self(value.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The session a request is bound to.
#[derive(Clone)]
pub struct ResolvedSession {
    /// ID of the stored session, or `None` for a transient anonymous one.
    pub id: Option<SessionId>,
    pub handle: SessionHandle,
}

/// Process-wide session store.
#[derive(Clone)]
pub struct SessionStore {
    cache: Cache<SessionId, SessionHandle>,
}

impl SessionStore {
    /// Create a store with the configured TTL and capacity.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_sessions)
            .time_to_live(config.ttl)
            .build();

        Self { cache }
    }

    /// Look up a live session.
    pub async fn load(&self, id: &SessionId) -> Option<SessionHandle> {
        self.cache.get(id).await
    }

    /// Bind a request to its session.
    ///
    /// A missing, unknown or expired ID yields a transient anonymous state
    /// that is never stored.
    pub async fn resolve(&self, presented: Option<&SessionId>) -> ResolvedSession {
        if let Some(id) = presented
            && let Some(handle) = self.load(id).await
        {
            return ResolvedSession {
                id: Some(id.clone()),
                handle,
            };
        }

        ResolvedSession {
            id: None,
            handle: Arc::new(Mutex::new(SessionState::new())),
        }
    }

    /// Store `state` under a freshly generated ID.
    ///
    /// `previous` is dropped from the store, so a token known before login
    /// never reaches the new state.
    pub async fn establish(
        &self,
        previous: Option<&SessionId>,
        state: SessionState,
    ) -> (SessionId, SessionHandle) {
        if let Some(previous) = previous {
            self.cache.invalidate(previous).await;
        }

        let id = SessionId::generate();
        let handle: SessionHandle = Arc::new(Mutex::new(state));
        self.cache.insert(id.clone(), Arc::clone(&handle)).await;
        tracing::debug!("session established");
        (id, handle)
    }

    /// Destroy a session and everything in it.
    ///
    /// The state is reset before the entry is dropped, so a request that
    /// already holds the handle observes an anonymous session. Destroying an
    /// unknown ID is a no-op.
    pub async fn destroy(&self, id: &SessionId) {
        if let Some(handle) = self.cache.remove(id).await {
            *handle.lock().await = SessionState::new();
            tracing::debug!("session destroyed");
        }
    }

    /// Approximate number of live sessions.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Whether no sessions are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply pending evictions; `len` is only exact afterwards.
    pub async fn sync(&self) {
        self.cache.run_pending_tasks().await;
    }
}
