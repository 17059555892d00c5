use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;

use crate::{
    AppState,
    auth::{SESSION_COOKIE, Session, SessionError},
};

/// GuardConfig
///
/// Static configuration for the admin access guard: exactly one protected
/// path prefix and the sign-in path unauthenticated traffic is sent to.
#[derive(Debug, Clone)]
pub struct GuardConfig {
    pub protected_prefix: String,
    pub sign_in_path: String,
}

impl GuardConfig {
    pub fn new(protected_prefix: &str, sign_in_path: &str) -> Self {
        Self {
            protected_prefix: protected_prefix.to_string(),
            sign_in_path: sign_in_path.to_string(),
        }
    }

    /// Prefix + wildcard-suffix match: the prefix itself and anything below
    /// it. `/admin-secret-xyzzy` is a different path and must not match.
    pub fn applies_to(&self, path: &str) -> bool {
        path == self.protected_prefix
            || path
                .strip_prefix(&self.protected_prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

/// GuardOutcome
///
/// The guard's entire decision space: let the request through unchanged, or
/// terminate it with a redirect to the sign-in path. There is no third state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Allow,
    Redirect(String),
}

/// evaluate
///
/// The pure decision at the heart of the guard, kept free of any framework
/// plumbing so it is unit-testable without a request pipeline.
///
/// - Paths outside the protected prefix are allowed unconditionally; the
///   session lookup result is not even inspected.
/// - Under the prefix, only a present session allows the request. An absent
///   session *and* a session-store failure both redirect: the guard fails
///   closed, never open.
pub fn evaluate(
    config: &GuardConfig,
    path: &str,
    session: &Result<Option<Session>, SessionError>,
) -> GuardOutcome {
    if !config.applies_to(path) {
        return GuardOutcome::Allow;
    }

    match session {
        Ok(Some(_)) => GuardOutcome::Allow,
        Ok(None) => GuardOutcome::Redirect(config.sign_in_path.clone()),
        Err(e) => {
            tracing::warn!("session resolution failed, failing closed: {e}");
            GuardOutcome::Redirect(config.sign_in_path.clone())
        }
    }
}

/// admin_guard
///
/// Axum middleware wrapping [`evaluate`]. Applied to the whole router so the
/// outside-prefix bypass is real behavior: for unprotected paths the session
/// store is never consulted and the request proceeds with zero overhead.
///
/// The guard reads the session cookie and resolves it through the session
/// collaborator; it never mutates session state. A redirect is terminal for
/// the request — the downstream handler does not run.
pub async fn admin_guard(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let config = GuardConfig::new(&state.config.admin_prefix, &state.config.sign_in_path);
    let path = request.uri().path();

    // Short-circuit before any session work for unprotected paths.
    if !config.applies_to(path) {
        return next.run(request).await;
    }

    let session = match jar.get(SESSION_COOKIE) {
        Some(cookie) => state.sessions.resolve(cookie.value()).await,
        // No cookie at all is simply "no session", not a store failure.
        None => Ok(None),
    };

    match evaluate(&config, path, &session) {
        GuardOutcome::Allow => next.run(request).await,
        GuardOutcome::Redirect(target) => Redirect::to(&target).into_response(),
    }
}
