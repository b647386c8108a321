use async_trait::async_trait;
use uuid::Uuid;

use crate::models::Profile;

/// The fixed location every denied navigation is sent to.
pub const FALLBACK_ROUTE: &str = "/";

/// Session
///
/// The visitor's authentication state at the moment of a navigation attempt.
/// It is constructed by the HTTP layer (see `auth::Session` extraction) and
/// passed into the guards as explicit context. A missing, expired, or
/// malformed credential produces `identity: None`; the guards never
/// distinguish *why* a session is anonymous.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// The authenticated user's ID (`auth.users.id` / `public.profiles.id`),
    /// or `None` for an anonymous visitor.
    pub identity: Option<Uuid>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self { identity: None }
    }

    pub fn authenticated(identity: Uuid) -> Self {
        Self {
            identity: Some(identity),
        }
    }
}

/// GuardOutcome
///
/// The two terminal states of a guard evaluation. A guard never errors: every
/// input, including a failed profile lookup, resolves to one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Let the navigation continue to its handler.
    Proceed,
    /// Abort the navigation and send the visitor to the given route.
    Redirect(&'static str),
}

/// LookupError
///
/// A profile lookup that could not be completed (connection loss, pool
/// exhaustion, query failure). The admin guard swallows this into the same
/// outcome as "not an admin"; the type exists so the repository can surface
/// the failure at the seam and tests can simulate it.
#[derive(Debug, thiserror::Error)]
#[error("profile lookup failed: {0}")]
pub struct LookupError(#[from] pub sqlx::Error);

/// ProfileLookup
///
/// The one external collaborator of the admin guard: a read-only query
/// returning privilege metadata for an identity. Implementations must return
/// at most the single row matching `identity`, with `is_admin` already
/// normalized to a plain bool (SQL NULL collapses to false at this boundary).
#[async_trait]
pub trait ProfileLookup: Send + Sync {
    async fn profile_by_identity(&self, identity: Uuid) -> Result<Option<Profile>, LookupError>;
}

/// guest_only
///
/// Guard for routes meant only for unauthenticated visitors (login, signup).
/// An identified session is redirected home; an anonymous one proceeds. Pure
/// and synchronous: the decision depends on nothing but the session.
pub fn guest_only(session: &Session) -> GuardOutcome {
    if session.identity.is_some() {
        GuardOutcome::Redirect(FALLBACK_ROUTE)
    } else {
        GuardOutcome::Proceed
    }
}

/// admin_only
///
/// Guard for administrative routes. An anonymous session is redirected
/// immediately, without touching the lookup. An identified session triggers
/// exactly one `profile_by_identity` call — fresh on every navigation, so a
/// revoked privilege takes effect on the very next route change.
///
/// Fail-closed: a lookup error, a missing row, and `is_admin = false` all
/// resolve to the same redirect. The error never propagates past this
/// function.
pub async fn admin_only<L>(session: &Session, lookup: &L) -> GuardOutcome
where
    L: ProfileLookup + ?Sized,
{
    let Some(identity) = session.identity else {
        return GuardOutcome::Redirect(FALLBACK_ROUTE);
    };

    match lookup.profile_by_identity(identity).await {
        Ok(Some(profile)) if profile.is_admin => GuardOutcome::Proceed,
        // Missing row, non-admin row, or a failed lookup: deny identically.
        Ok(_) | Err(_) => GuardOutcome::Redirect(FALLBACK_ROUTE),
    }
}
