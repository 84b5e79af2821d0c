/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 */

//! Connection records: one row per in-flight (or completed) France Connect
//! authentication attempt.
//!
//! Expected Postgres schema:
//!
//! ```sql
//! CREATE TABLE connections (
//!     id              BIGSERIAL PRIMARY KEY,
//!     state           TEXT NOT NULL DEFAULT '',
//!     nonce           TEXT NOT NULL DEFAULT '',
//!     connection_type TEXT NOT NULL DEFAULT 'FS',
//!     expires_on      TIMESTAMPTZ NOT NULL,
//!     access_token    TEXT,
//!     user_sub        TEXT
//! );
//! CREATE INDEX connections_state_idx ON connections (state);
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use tokio::sync::RwLock;

/// Which relying-party role this connection was opened for.
///
/// `Fs` (fournisseur de service): this application acts as a federation
/// client of France Connect. `Fi` (fournisseur d'identité): this application
/// acts as an identity provider itself. Both roles share the same record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionType {
    Fs,
    Fi,
}

impl ConnectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionType::Fs => "FS",
            ConnectionType::Fi => "FI",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "FI" => ConnectionType::Fi,
            _ => ConnectionType::Fs,
        }
    }
}

/// One France Connect authentication attempt.
///
/// `state` and `nonce` are rewritten each time authorization is initiated;
/// only the latest pair is valid for the callback. `expires_on` is fixed at
/// creation and never extended.
#[derive(Debug, Clone)]
pub struct Connection {
    pub id: i64,
    pub state: String,
    pub nonce: String,
    pub connection_type: ConnectionType,
    pub expires_on: DateTime<Utc>,
    /// Set as soon as the token exchange succeeds, independent of whether the
    /// ID token later validates.
    pub access_token: Option<String>,
    /// Subject identifier of the resolved local user, set on success.
    pub user_sub: Option<String>,
}

impl Connection {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_on < now
    }
}

/// Persistence contract for [`Connection`] records.
///
/// `save` must persist all mutable fields atomically. `find_by_state` is
/// exact-match only. Implementations are selected at composition time:
/// [`PgConnectionRepository`] in production, [`InMemoryConnectionRepository`]
/// in tests.
#[async_trait::async_trait]
pub trait ConnectionRepository: Send + Sync {
    /// Create a fresh record with `expires_on = now + ttl`.
    async fn create(&self) -> Result<Connection, sqlx::Error>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Connection>, sqlx::Error>;

    async fn find_by_state(&self, state: &str) -> Result<Option<Connection>, sqlx::Error>;

    async fn save(&self, connection: &Connection) -> Result<(), sqlx::Error>;
}

// ---------------------------------------------------------------------------
// Postgres implementation
// ---------------------------------------------------------------------------

#[derive(Debug, sqlx::FromRow)]
struct ConnectionRow {
    id: i64,
    state: String,
    nonce: String,
    connection_type: String,
    expires_on: DateTime<Utc>,
    access_token: Option<String>,
    user_sub: Option<String>,
}

impl From<ConnectionRow> for Connection {
    fn from(row: ConnectionRow) -> Self {
        Connection {
            id: row.id,
            state: row.state,
            nonce: row.nonce,
            connection_type: ConnectionType::from_str(&row.connection_type),
            expires_on: row.expires_on,
            access_token: row.access_token,
            user_sub: row.user_sub,
        }
    }
}

/// Production repository backed by Postgres.
#[derive(Clone)]
pub struct PgConnectionRepository {
    pool: PgPool,
    ttl_secs: i64,
}

impl PgConnectionRepository {
    pub fn new(pool: PgPool, ttl_secs: i64) -> Self {
        Self { pool, ttl_secs }
    }
}

#[async_trait::async_trait]
impl ConnectionRepository for PgConnectionRepository {
    async fn create(&self) -> Result<Connection, sqlx::Error> {
        let expires_on = Utc::now() + Duration::seconds(self.ttl_secs);
        let row = sqlx::query_as::<_, ConnectionRow>(
            r#"
            INSERT INTO connections (state, nonce, connection_type, expires_on)
            VALUES ('', '', 'FS', $1)
            RETURNING id, state, nonce, connection_type, expires_on, access_token, user_sub
            "#,
        )
        .bind(expires_on)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Connection>, sqlx::Error> {
        let row = sqlx::query_as::<_, ConnectionRow>(
            "SELECT id, state, nonce, connection_type, expires_on, access_token, user_sub \
             FROM connections WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn find_by_state(&self, state: &str) -> Result<Option<Connection>, sqlx::Error> {
        let row = sqlx::query_as::<_, ConnectionRow>(
            "SELECT id, state, nonce, connection_type, expires_on, access_token, user_sub \
             FROM connections WHERE state = $1",
        )
        .bind(state)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn save(&self, connection: &Connection) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE connections
            SET state = $2, nonce = $3, connection_type = $4,
                access_token = $5, user_sub = $6
            WHERE id = $1
            "#,
        )
        .bind(connection.id)
        .bind(&connection.state)
        .bind(&connection.nonce)
        .bind(connection.connection_type.as_str())
        .bind(&connection.access_token)
        .bind(&connection.user_sub)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

/// In-memory repository for tests and local composition.
///
/// Each map mutation holds the write lock for the whole read-modify-write,
/// so `save` is atomic per record.
#[derive(Clone, Default)]
pub struct InMemoryConnectionRepository {
    inner: Arc<RwLock<HashMap<i64, Connection>>>,
    next_id: Arc<AtomicI64>,
    ttl_secs: i64,
}

impl InMemoryConnectionRepository {
    pub fn new(ttl_secs: i64) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
            ttl_secs,
        }
    }

    /// Insert a pre-built record, for test setup.
    pub async fn insert(&self, connection: Connection) {
        self.next_id
            .fetch_max(connection.id + 1, Ordering::SeqCst);
        self.inner.write().await.insert(connection.id, connection);
    }
}

#[async_trait::async_trait]
impl ConnectionRepository for InMemoryConnectionRepository {
    async fn create(&self) -> Result<Connection, sqlx::Error> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let connection = Connection {
            id,
            state: String::new(),
            nonce: String::new(),
            connection_type: ConnectionType::Fs,
            expires_on: Utc::now() + Duration::seconds(self.ttl_secs),
            access_token: None,
            user_sub: None,
        };
        self.inner.write().await.insert(id, connection.clone());
        Ok(connection)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Connection>, sqlx::Error> {
        Ok(self.inner.read().await.get(&id).cloned())
    }

    async fn find_by_state(&self, state: &str) -> Result<Option<Connection>, sqlx::Error> {
        Ok(self
            .inner
            .read()
            .await
            .values()
            .find(|c| c.state == state)
            .cloned())
    }

    async fn save(&self, connection: &Connection) -> Result<(), sqlx::Error> {
        self.inner
            .write()
            .await
            .insert(connection.id, connection.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_assigns_increasing_ids_and_ttl_bound_expiry() {
        let repo = InMemoryConnectionRepository::new(300);
        let before = Utc::now();
        let a = repo.create().await.unwrap();
        let b = repo.create().await.unwrap();
        assert!(b.id > a.id);
        assert!(a.expires_on >= before + Duration::seconds(299));
        assert!(a.expires_on <= Utc::now() + Duration::seconds(300));
        assert!(a.access_token.is_none());
    }

    #[tokio::test]
    async fn find_by_state_is_exact_match() {
        let repo = InMemoryConnectionRepository::new(300);
        let mut conn = repo.create().await.unwrap();
        conn.state = "abc123".to_string();
        repo.save(&conn).await.unwrap();

        assert!(repo.find_by_state("abc123").await.unwrap().is_some());
        assert!(repo.find_by_state("abc").await.unwrap().is_none());
        assert!(repo.find_by_state("abc1234").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_persists_all_mutable_fields() {
        let repo = InMemoryConnectionRepository::new(300);
        let mut conn = repo.create().await.unwrap();
        conn.state = "s".to_string();
        conn.nonce = "n".to_string();
        conn.access_token = Some("tok".to_string());
        conn.user_sub = Some("sub".to_string());
        repo.save(&conn).await.unwrap();

        let loaded = repo.find_by_id(conn.id).await.unwrap().unwrap();
        assert_eq!(loaded.state, "s");
        assert_eq!(loaded.nonce, "n");
        assert_eq!(loaded.access_token.as_deref(), Some("tok"));
        assert_eq!(loaded.user_sub.as_deref(), Some("sub"));
    }

    #[test]
    fn expiry_is_a_strict_comparison() {
        let now = Utc::now();
        let conn = Connection {
            id: 1,
            state: String::new(),
            nonce: String::new(),
            connection_type: ConnectionType::Fs,
            expires_on: now,
            access_token: None,
            user_sub: None,
        };
        assert!(!conn.is_expired(now));
        assert!(conn.is_expired(now + Duration::seconds(1)));
    }

    #[test]
    fn connection_type_round_trips_through_text() {
        assert_eq!(
            ConnectionType::from_str(ConnectionType::Fs.as_str()),
            ConnectionType::Fs
        );
        assert_eq!(
            ConnectionType::from_str(ConnectionType::Fi.as_str()),
            ConnectionType::Fi
        );
    }
}
