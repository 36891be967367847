//! Process-wide session table.
//!
//! Sessions live in memory only; nothing survives a restart. A session is
//! persisted by the HTTP layer only once it carries at least one data key —
//! lifetime/path/domain settings alone never create a table entry or a
//! cookie.

use std::collections::HashMap;
use std::time::{Duration, SystemTime};

use dashmap::DashMap;
use uuid::Uuid;

/// Default session lifetime: one day.
pub(crate) const DEFAULT_LIFETIME: Duration = Duration::from_secs(86_400);

/// A per-request mutable session.
///
/// `id` stays `None` until the session is first saved; lifetime, path, and
/// domain are cookie settings, not data — they do not count toward
/// persistence.
#[derive(Debug, Clone)]
pub struct Session {
    id: Option<String>,
    /// How long the session (and its cookie) lives past the last save.
    pub lifetime: Duration,
    /// Cookie path attribute.
    pub path: Option<String>,
    /// Cookie domain attribute.
    pub domain: Option<String>,
    data: HashMap<String, String>,
}

impl Session {
    /// Create a fresh, unsaved session.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: None,
            lifetime: DEFAULT_LIFETIME,
            path: None,
            domain: None,
            data: HashMap::new(),
        }
    }

    /// The stored id, once the session has been saved.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Read a data key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    /// Set a data key. Setting the first key makes the session persistent.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.data.insert(key.into(), value.into());
    }

    /// Remove a data key.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.data.remove(key)
    }

    /// Whether the session carries any data keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
struct StoredSession {
    expires_at: SystemTime,
    session: Session,
}

/// The process-wide session table, keyed by session id.
///
/// Shared mutable state: mutation is append/overwrite-by-key, guarded by
/// the map's internal sharding so multi-threaded hosts need no extra lock.
/// Expired entries are dropped on load and by the periodic
/// [`SessionSweeper`](crate::SessionSweeper).
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<String, StoredSession>,
}

impl SessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a session by id. Expired entries are removed and treated as
    /// missing.
    #[must_use]
    pub fn load(&self, id: &str) -> Option<Session> {
        let stored = self.sessions.get(id)?;
        if stored.expires_at <= SystemTime::now() {
            drop(stored);
            self.sessions.remove(id);
            return None;
        }
        Some(stored.session.clone())
    }

    /// Persist a session, assigning an id on first save and pushing the
    /// expiry out by the session's lifetime. Returns the id.
    pub fn save(&self, session: &mut Session) -> String {
        let id = session
            .id
            .get_or_insert_with(|| Uuid::new_v4().to_string())
            .clone();
        let expires_at = SystemTime::now() + session.lifetime;
        self.sessions.insert(
            id.clone(),
            StoredSession {
                expires_at,
                session: session.clone(),
            },
        );
        tracing::debug!(session_id = id, "saved session");
        id
    }

    /// Drop a session by id.
    pub fn remove(&self, id: &str) {
        self.sessions.remove(id);
    }

    /// Remove every expired session; returns how many were dropped.
    pub fn sweep_expired(&self) -> usize {
        let now = SystemTime::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, stored| stored.expires_at > now);
        before - self.sessions.len()
    }

    /// Number of live entries (including not-yet-swept expired ones).
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
