//! Server-side sessions
//!
//! TigerStyle: The browser only ever holds an opaque random id. The
//! session maps it to a user id and the purchase history; the user row is
//! re-read from storage on every request.
//!
//! Lifecycle:
//! 1. Login/register creates a fresh id (any previous id is dropped)
//! 2. Every lookup refreshes `last_seen`
//! 3. Idle sessions expire, logout destroys the session

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use chrono::{DateTime, Duration, Utc};
use finova_store::Gadget;
use tokio::sync::RwLock;
use uuid::Uuid;

// =============================================================================
// TigerStyle Constants
// =============================================================================

/// Session cookie name
pub const SESSION_COOKIE_NAME: &str = "finova_sid";

/// Idle time after which a session expires
pub const SESSION_IDLE_SECS_MAX: i64 = 30 * 60;

/// Maximum number of live sessions
pub const SESSIONS_COUNT_MAX: usize = 10_000;

/// Maximum purchase history entries kept per session
pub const PURCHASES_COUNT_MAX: usize = 1_000;

// =============================================================================
// Types
// =============================================================================

/// Per-client session data
#[derive(Debug, Clone)]
pub struct Session {
    /// Authenticated user
    pub user_id: i32,
    /// Gadgets bought in this session, one entry per unit
    pub purchases: Vec<Gadget>,
    /// When the session was created
    pub created_at: DateTime<Utc>,
    /// Last request seen with this session
    pub last_seen: DateTime<Utc>,
}

impl Session {
    fn new(user_id: i32) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            purchases: Vec::new(),
            created_at: now,
            last_seen: now,
        }
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.last_seen > Duration::seconds(SESSION_IDLE_SECS_MAX)
    }
}

// =============================================================================
// Session Store
// =============================================================================

/// Shared in-memory session store.
///
/// Cloning shares the underlying map.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an authenticated session and return its id.
    ///
    /// `previous` is destroyed; its purchase history moves to the new id.
    pub async fn login(&self, previous: Option<&str>, user_id: i32) -> String {
        let id = Uuid::new_v4().simple().to_string();
        let mut session = Session::new(user_id);

        let mut sessions = self.sessions.write().await;
        if let Some(old) = previous.and_then(|prev| sessions.remove(prev)) {
            if old.user_id == user_id {
                session.purchases = old.purchases;
            }
        }

        if sessions.len() >= SESSIONS_COUNT_MAX {
            let now = Utc::now();
            sessions.retain(|_, s| !s.is_expired(now));
        }
        if sessions.len() >= SESSIONS_COUNT_MAX {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, s)| s.last_seen)
                .map(|(id, _)| id.clone());
            if let Some(oldest) = oldest {
                sessions.remove(&oldest);
                tracing::warn!("Session cap reached, evicted least recently used session");
            }
        }

        sessions.insert(id.clone(), session);

        // Postcondition
        assert!(sessions.len() <= SESSIONS_COUNT_MAX, "session cap exceeded");

        id
    }

    /// Look up a live session, refreshing its idle timer.
    pub async fn get(&self, id: &str) -> Option<Session> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(id)?;
        if session.is_expired(now) {
            sessions.remove(id);
            return None;
        }
        session.last_seen = now;
        Some(session.clone())
    }

    /// True when the session exists and has not expired. Does not touch
    /// the idle timer.
    pub async fn is_live(&self, id: &str) -> bool {
        let now = Utc::now();
        self.sessions
            .read()
            .await
            .get(id)
            .is_some_and(|s| !s.is_expired(now))
    }

    /// Drop a session. Unknown ids are ignored.
    pub async fn destroy(&self, id: &str) {
        self.sessions.write().await.remove(id);
    }

    /// Purchase history, empty when the session is unknown.
    pub async fn purchases(&self, id: &str) -> Vec<Gadget> {
        self.sessions
            .read()
            .await
            .get(id)
            .map(|s| s.purchases.clone())
            .unwrap_or_default()
    }

    /// Replace the purchase history.
    pub async fn set_purchases(&self, id: &str, mut purchases: Vec<Gadget>) {
        truncate_oldest(&mut purchases);
        if let Some(session) = self.sessions.write().await.get_mut(id) {
            session.purchases = purchases;
        }
    }

    /// Append `quantity` copies of a gadget to the purchase history.
    pub async fn append_purchase(&self, id: &str, gadget: &Gadget, quantity: usize) {
        if let Some(session) = self.sessions.write().await.get_mut(id) {
            session
                .purchases
                .extend(std::iter::repeat(gadget).take(quantity).cloned());
            truncate_oldest(&mut session.purchases);
        }
    }

    /// Remove expired sessions, returning how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(now));
        before - sessions.len()
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// True when no session exists
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    #[cfg(test)]
    async fn backdate(&self, id: &str, secs: i64) {
        if let Some(session) = self.sessions.write().await.get_mut(id) {
            session.last_seen -= Duration::seconds(secs);
        }
    }
}

fn truncate_oldest(purchases: &mut Vec<Gadget>) {
    if purchases.len() > PURCHASES_COUNT_MAX {
        let excess = purchases.len() - PURCHASES_COUNT_MAX;
        purchases.drain(..excess);
    }
}

// =============================================================================
// Cookies
// =============================================================================

/// `Set-Cookie` value carrying a session id
pub fn session_cookie(id: &str) -> String {
    format!(
        "{SESSION_COOKIE_NAME}={id}; Path=/; HttpOnly; SameSite=Lax; Max-Age={SESSION_IDLE_SECS_MAX}"
    )
}

/// `Set-Cookie` value that clears the session cookie
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Session id from the request's `Cookie` headers
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE_NAME && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

// =============================================================================
// Tests
// =============================================================================
