//! Server-held admin session store.
//!
//! Administrative sessions live in process memory, keyed by an opaque
//! unguessable identifier; only that identifier ever reaches the browser.
//! Lifetimes are fixed-duration (not sliding). Reads validate: a lookup that
//! finds an expired entry evicts it, so the first read past expiry reports
//! `Expired` and every later read reports `NotFound`. A periodic sweeper
//! removes expired entries that nobody reads, for memory hygiene.
//!
//! Login is two-phase: credentials buy a short-lived pending ticket, the
//! completion endpoint on the far side of the redirect re-checks the ticket's
//! freshness and only then commits the real session.

use std::collections::HashMap;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::admin::AdminUserRef;

/// How long a pending login ticket stays redeemable.
const PENDING_TICKET_SECS: i64 = 60;

/// Errors from session lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    /// No entry under this identifier.
    #[error("session not found")]
    NotFound,
    /// The entry existed but its validity window has passed. The entry is
    /// evicted as part of the read.
    #[error("session expired")]
    Expired,
}

/// An authenticated administrative session.
#[derive(Debug, Clone)]
pub struct AdminSession {
    /// Opaque identifier, carried only inside the session cookie.
    pub id: String,
    /// The authenticated admin.
    pub user: AdminUserRef,
    /// When the session was issued.
    pub created_at: DateTime<Utc>,
    /// Fixed expiry; reads never extend it.
    pub expires_at: DateTime<Utc>,
}

/// A pending login awaiting completion across the redirect boundary.
#[derive(Debug, Clone)]
pub struct PendingTicket {
    /// Opaque ticket identifier, passed in the completion query string.
    pub id: String,
    /// Redemption deadline.
    pub expires_at: DateTime<Utc>,
}

#[derive(Default)]
struct Inner {
    sessions: HashMap<String, AdminSession>,
    pending: HashMap<String, PendingEntry>,
}

struct PendingEntry {
    user: AdminUserRef,
    expires_at: DateTime<Utc>,
}

/// In-process store for admin sessions and pending login tickets.
///
/// Cheap to clone; all clones share one map.
#[derive(Clone)]
pub struct AdminSessionStore {
    inner: Arc<RwLock<Inner>>,
    session_lifetime: Duration,
}

impl AdminSessionStore {
    /// Create a store issuing sessions with the given fixed lifetime.
    #[must_use]
    pub fn new(session_lifetime: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
            session_lifetime,
        }
    }

    /// Issue a session for an authenticated admin and return its identifier.
    pub async fn issue(&self, user: AdminUserRef) -> String {
        self.issue_at(user, Utc::now()).await
    }

    async fn issue_at(&self, user: AdminUserRef, now: DateTime<Utc>) -> String {
        let id = new_opaque_id();
        let session = AdminSession {
            id: id.clone(),
            user,
            created_at: now,
            expires_at: now + self.session_lifetime,
        };
        tracing::debug!(
            created_at = %session.created_at,
            expires_at = %session.expires_at,
            "admin session issued"
        );
        self.inner.write().await.sessions.insert(id.clone(), session);
        id
    }

    /// Look up a session by identifier.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotFound` if absent, `SessionError::Expired` on
    /// the first read past the expiry (the entry is evicted as part of that
    /// read, so subsequent reads return `NotFound`).
    pub async fn validate(&self, id: &str) -> Result<AdminSession, SessionError> {
        self.validate_at(id, Utc::now()).await
    }

    async fn validate_at(&self, id: &str, now: DateTime<Utc>) -> Result<AdminSession, SessionError> {
        let mut inner = self.inner.write().await;
        let session = inner.sessions.get(id).ok_or(SessionError::NotFound)?;

        if now > session.expires_at {
            // Evict on expired read. remove() is delete-if-exists, so a
            // concurrent read discovering the same expiry is harmless.
            inner.sessions.remove(id);
            return Err(SessionError::Expired);
        }

        Ok(session.clone())
    }

    /// Destroy a session. Deleting an already-absent entry is a no-op.
    pub async fn revoke(&self, id: &str) {
        self.inner.write().await.sessions.remove(id);
    }

    /// First phase of admin login: stash the authenticated identity and hand
    /// back a short-lived ticket that crosses the redirect boundary.
    pub async fn begin_login(&self, user: AdminUserRef) -> PendingTicket {
        self.begin_login_at(user, Utc::now()).await
    }

    async fn begin_login_at(&self, user: AdminUserRef, now: DateTime<Utc>) -> PendingTicket {
        let id = new_opaque_id();
        let expires_at = now + Duration::seconds(PENDING_TICKET_SECS);
        self.inner
            .write()
            .await
            .pending
            .insert(id.clone(), PendingEntry { user, expires_at });
        let ticket = PendingTicket { id, expires_at };
        tracing::debug!(expires_at = %ticket.expires_at, "pending login ticket issued");
        ticket
    }

    /// Second phase of admin login: consume the ticket, re-check freshness,
    /// and commit the real session.
    ///
    /// The ticket is removed whether or not it is still fresh: a ticket is
    /// redeemable at most once.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotFound` for an unknown (or already consumed)
    /// ticket, `SessionError::Expired` for one past its window.
    pub async fn complete_login(&self, ticket_id: &str) -> Result<String, SessionError> {
        self.complete_login_at(ticket_id, Utc::now()).await
    }

    async fn complete_login_at(
        &self,
        ticket_id: &str,
        now: DateTime<Utc>,
    ) -> Result<String, SessionError> {
        let entry = {
            let mut inner = self.inner.write().await;
            inner.pending.remove(ticket_id).ok_or(SessionError::NotFound)?
        };

        if now > entry.expires_at {
            return Err(SessionError::Expired);
        }

        Ok(self.issue_at(entry.user, now).await)
    }

    /// Remove every expired session and pending ticket.
    pub async fn delete_expired(&self) {
        self.delete_expired_at(Utc::now()).await;
    }

    async fn delete_expired_at(&self, now: DateTime<Utc>) {
        let mut inner = self.inner.write().await;
        inner.sessions.retain(|_, s| s.expires_at >= now);
        inner.pending.retain(|_, p| p.expires_at >= now);
    }

    /// Spawn a background task sweeping expired entries every `period`.
    ///
    /// Request-path eviction keeps correctness without this; the sweeper only
    /// bounds memory held by sessions nobody reads again.
    pub fn spawn_sweeper(&self, period: std::time::Duration) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                store.delete_expired().await;
                let sessions = store.session_count().await;
                tracing::debug!(sessions, "admin session sweep complete");
            }
        })
    }

    /// Number of live session entries (expired-but-unswept included).
    pub async fn session_count(&self) -> usize {
        self.inner.read().await.sessions.len()
    }
}

/// Generate an opaque, unguessable identifier (256 bits, base64url).
fn new_opaque_id() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crestline_core::{AdminUserId, Email};

    fn admin() -> AdminUserRef {
        AdminUserRef {
            id: AdminUserId::new(1),
            email: Email::parse("admin@crestline.example").unwrap(),
            display_name: "Admin".to_owned(),
        }
    }

    fn store() -> AdminSessionStore {
        AdminSessionStore::new(Duration::hours(24))
    }

    #[tokio::test]
    async fn test_issue_and_validate() {
        let store = store();
        let id = store.issue(admin()).await;
        let session = store.validate(&id).await.unwrap();
        assert_eq!(session.id, id);
        assert_eq!(session.user.display_name, "Admin");
    }

    #[tokio::test]
    async fn test_validate_unknown_id() {
        let store = store();
        assert_eq!(
            store.validate("nope").await.unwrap_err(),
            SessionError::NotFound
        );
    }

    #[tokio::test]
    async fn test_expired_read_evicts() {
        let store = store();
        let now = Utc::now();
        let id = store.issue_at(admin(), now).await;

        let later = now + Duration::hours(24) + Duration::seconds(1);
        // First read past expiry reports Expired and evicts.
        assert_eq!(
            store.validate_at(&id, later).await.unwrap_err(),
            SessionError::Expired
        );
        // Second read finds nothing.
        assert_eq!(
            store.validate_at(&id, later).await.unwrap_err(),
            SessionError::NotFound
        );
    }

    #[tokio::test]
    async fn test_lifetime_is_fixed_not_sliding() {
        let store = store();
        let now = Utc::now();
        let id = store.issue_at(admin(), now).await;

        // Reading close to the deadline does not extend it.
        let near_deadline = now + Duration::hours(23);
        let session = store.validate_at(&id, near_deadline).await.unwrap();
        assert_eq!(session.expires_at, now + Duration::hours(24));

        let past_deadline = now + Duration::hours(24) + Duration::seconds(1);
        assert_eq!(
            store.validate_at(&id, past_deadline).await.unwrap_err(),
            SessionError::Expired
        );
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let store = store();
        let id = store.issue(admin()).await;
        store.revoke(&id).await;
        store.revoke(&id).await;
        assert_eq!(
            store.validate(&id).await.unwrap_err(),
            SessionError::NotFound
        );
    }

    #[tokio::test]
    async fn test_pending_ticket_roundtrip() {
        let store = store();
        let now = Utc::now();
        let ticket = store.begin_login_at(admin(), now).await;

        let session_id = store
            .complete_login_at(&ticket.id, now + Duration::seconds(5))
            .await
            .unwrap();
        assert!(store.validate(&session_id).await.is_ok());
    }

    #[tokio::test]
    async fn test_pending_ticket_is_single_use() {
        let store = store();
        let now = Utc::now();
        let ticket = store.begin_login_at(admin(), now).await;

        store.complete_login_at(&ticket.id, now).await.unwrap();
        assert_eq!(
            store.complete_login_at(&ticket.id, now).await.unwrap_err(),
            SessionError::NotFound
        );
    }

    #[tokio::test]
    async fn test_pending_ticket_freshness_window() {
        let store = store();
        let now = Utc::now();
        let ticket = store.begin_login_at(admin(), now).await;

        let too_late = now + Duration::seconds(PENDING_TICKET_SECS + 1);
        assert_eq!(
            store.complete_login_at(&ticket.id, too_late).await.unwrap_err(),
            SessionError::Expired
        );
        // Consumed either way.
        assert_eq!(
            store.complete_login_at(&ticket.id, now).await.unwrap_err(),
            SessionError::NotFound
        );
    }

    #[tokio::test]
    async fn test_delete_expired_sweeps_both_maps() {
        let store = store();
        let now = Utc::now();
        let live = store.issue_at(admin(), now).await;
        let dead = store.issue_at(admin(), now - Duration::hours(25)).await;
        store.begin_login_at(admin(), now - Duration::hours(1)).await;

        store.delete_expired_at(now).await;

        assert!(store.validate_at(&live, now).await.is_ok());
        assert_eq!(
            store.validate_at(&dead, now).await.unwrap_err(),
            SessionError::NotFound
        );
        assert_eq!(store.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_opaque_ids_are_unique() {
        let store = store();
        let a = store.issue(admin()).await;
        let b = store.issue(admin()).await;
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
    }
}
