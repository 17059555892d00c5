use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;
use uuid::Uuid;

/// Name of the cookie carrying the opaque session token.
pub const SESSION_COOKIE: &str = "session";

/// Claims
///
/// The standard payload structure inside the JWT access tokens issued by the
/// external identity provider. The session store validates the embedded
/// expiry on every resolution so stale tokens cannot keep a session alive.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the UUID of the admin user at the identity provider.
    pub sub: Uuid,
    /// Expiration time (exp): timestamp after which the token is rejected.
    pub exp: usize,
    /// Issued at (iat): timestamp when the token was issued.
    pub iat: usize,
}

/// Session
///
/// A resolved server-side session row from `public.sessions`. The access
/// guard consumes only its presence; the user id is carried for handlers that
/// want to attribute admin actions.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// SessionError
///
/// Failure of the session collaborator itself (not "no session"). The guard
/// treats any of these as an unauthenticated request — fail closed.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session store unavailable: {0}")]
    Store(#[from] sqlx::Error),
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

/// SessionStore Trait
///
/// Abstract contract for session resolution and lifecycle. The guard only
/// ever calls `resolve`; creation and destruction belong to the sign-in and
/// sign-out handlers. `Arc<dyn SessionStore>` makes the store shareable
/// across Axum's task boundaries, mirroring the repository layer.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Resolve the session for an opaque token. `Ok(None)` means no valid
    /// session exists; `Err` means the store itself could not answer.
    async fn resolve(&self, token: &str) -> Result<Option<Session>, SessionError>;

    /// Record a freshly issued token for a signed-in admin.
    async fn create(&self, user_id: Uuid, token: &str) -> Result<Session, SessionError>;

    /// Remove a session. Idempotent: destroying an unknown token is not an error.
    async fn destroy(&self, token: &str) -> Result<(), SessionError>;
}

/// SessionState
///
/// The concrete type used to share the session store across the application state.
pub type SessionState = Arc<dyn SessionStore>;

/// PostgresSessionStore
///
/// Database-backed session store. Tokens are the identity provider's JWT
/// access tokens; beyond row presence, `resolve` re-validates the token's
/// expiry locally so a session dies when its token does, even if the row
/// was never cleaned up.
pub struct PostgresSessionStore {
    pool: PgPool,
    decoding_key: DecodingKey,
}

impl PostgresSessionStore {
    pub fn new(pool: PgPool, jwt_secret: &str) -> Self {
        Self {
            pool,
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
        }
    }

    /// Checks the token's signature and expiry. Undecodable or expired tokens
    /// are indistinguishable from absent sessions on purpose.
    fn token_is_live(&self, token: &str) -> bool {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        decode::<Claims>(token, &self.decoding_key, &validation).is_ok()
    }
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    /// resolve
    ///
    /// Row lookup followed by local expiry validation. Database errors
    /// propagate as `SessionError` so the guard can fail closed rather than
    /// mistaking an outage for "no session" in the logs.
    async fn resolve(&self, token: &str) -> Result<Option<Session>, SessionError> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT token, user_id, created_at FROM sessions WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session.filter(|s| self.token_is_live(&s.token)))
    }

    async fn create(&self, user_id: Uuid, token: &str) -> Result<Session, SessionError> {
        let session = sqlx::query_as::<_, Session>(
            "INSERT INTO sessions (token, user_id, created_at) VALUES ($1, $2, NOW()) \
             RETURNING token, user_id, created_at",
        )
        .bind(token)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(session)
    }

    async fn destroy(&self, token: &str) -> Result<(), SessionError> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

// --- Mock Implementations (For Tests) ---

/// MockSessionStore
///
/// In-memory session store for unit and router tests. Supports three modes:
/// a set of known-valid tokens, a failing mode (every resolution errors, for
/// fail-closed tests), and a panicking mode (any resolution aborts the test,
/// proving that unguarded paths never touch the store).
pub struct MockSessionStore {
    tokens: std::sync::Mutex<Vec<String>>,
    pub should_fail: bool,
    pub panic_on_use: bool,
}

impl MockSessionStore {
    pub fn new() -> Self {
        Self {
            tokens: std::sync::Mutex::new(Vec::new()),
            should_fail: false,
            panic_on_use: false,
        }
    }

    pub fn with_token(token: &str) -> Self {
        let store = Self::new();
        store.tokens.lock().unwrap().push(token.to_string());
        store
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::new()
        }
    }

    pub fn new_panicking() -> Self {
        Self {
            panic_on_use: true,
            ..Self::new()
        }
    }
}

impl Default for MockSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MockSessionStore {
    async fn resolve(&self, token: &str) -> Result<Option<Session>, SessionError> {
        if self.panic_on_use {
            panic!("session store consulted for an unguarded path");
        }
        if self.should_fail {
            return Err(SessionError::Unavailable(
                "mock store failure requested".to_string(),
            ));
        }
        let known = self.tokens.lock().unwrap().iter().any(|t| t == token);
        Ok(known.then(|| Session {
            token: token.to_string(),
            user_id: Uuid::nil(),
            created_at: Utc::now(),
        }))
    }

    async fn create(&self, user_id: Uuid, token: &str) -> Result<Session, SessionError> {
        if self.should_fail {
            return Err(SessionError::Unavailable(
                "mock store failure requested".to_string(),
            ));
        }
        self.tokens.lock().unwrap().push(token.to_string());
        Ok(Session {
            token: token.to_string(),
            user_id,
            created_at: Utc::now(),
        })
    }

    async fn destroy(&self, token: &str) -> Result<(), SessionError> {
        self.tokens.lock().unwrap().retain(|t| t != token);
        Ok(())
    }
}
