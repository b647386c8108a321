use async_trait::async_trait;
use myflix::guard::{self, FALLBACK_ROUTE, GuardOutcome, LookupError, ProfileLookup, Session};
use myflix::models::Profile;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

// --- Mock Profile Lookup ---

// Stands in for the repository as the admin guard's collaborator. Records
// every invocation so tests can assert how many lookups a navigation cost.
struct MockProfileLookup {
    profile: Option<Profile>,
    fail: bool,
    calls: AtomicUsize,
}

impl MockProfileLookup {
    fn returning(profile: Option<Profile>) -> Self {
        Self {
            profile,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            profile: None,
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileLookup for MockProfileLookup {
    async fn profile_by_identity(&self, identity: Uuid) -> Result<Option<Profile>, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            // Simulated transport error (connection pool gave up).
            return Err(LookupError::from(sqlx::Error::PoolTimedOut));
        }
        Ok(self.profile.clone().filter(|p| p.id == identity))
    }
}

// --- Helpers ---

const USER_ID: Uuid = Uuid::from_u128(1);

fn profile(id: Uuid, is_admin: bool) -> Profile {
    Profile {
        id,
        email: Some("user@example.com".to_string()),
        is_admin,
    }
}

// --- Guest Guard ---

#[test]
fn test_guest_guard_allows_anonymous_visitor() {
    let outcome = guard::guest_only(&Session::anonymous());
    assert_eq!(outcome, GuardOutcome::Proceed);
}

#[test]
fn test_guest_guard_redirects_logged_in_visitor() {
    // A logged-in user navigating to /login is sent home.
    let outcome = guard::guest_only(&Session::authenticated(USER_ID));
    assert_eq!(outcome, GuardOutcome::Redirect(FALLBACK_ROUTE));
}

// --- Admin Guard ---

#[tokio::test]
async fn test_admin_guard_redirects_anonymous_without_lookup() {
    let lookup = MockProfileLookup::returning(Some(profile(USER_ID, true)));

    let outcome = guard::admin_only(&Session::anonymous(), &lookup).await;

    assert_eq!(outcome, GuardOutcome::Redirect(FALLBACK_ROUTE));
    // The short-circuit must not touch the collaborator at all.
    assert_eq!(lookup.call_count(), 0);
}

#[tokio::test]
async fn test_admin_guard_allows_admin_profile() {
    let lookup = MockProfileLookup::returning(Some(profile(USER_ID, true)));

    let outcome = guard::admin_only(&Session::authenticated(USER_ID), &lookup).await;

    assert_eq!(outcome, GuardOutcome::Proceed);
    assert_eq!(lookup.call_count(), 1);
}

#[tokio::test]
async fn test_admin_guard_redirects_non_admin_profile() {
    // is_admin = false; NULL and absent collapse to this same value at the
    // lookup boundary, so one case covers all three.
    let lookup = MockProfileLookup::returning(Some(profile(USER_ID, false)));

    let outcome = guard::admin_only(&Session::authenticated(USER_ID), &lookup).await;

    assert_eq!(outcome, GuardOutcome::Redirect(FALLBACK_ROUTE));
}

#[tokio::test]
async fn test_admin_guard_redirects_when_no_profile_row() {
    // Authenticated identity with no matching profiles row.
    let lookup = MockProfileLookup::returning(None);

    let outcome = guard::admin_only(&Session::authenticated(USER_ID), &lookup).await;

    assert_eq!(outcome, GuardOutcome::Redirect(FALLBACK_ROUTE));
    assert_eq!(lookup.call_count(), 1);
}

#[tokio::test]
async fn test_admin_guard_redirects_when_profile_belongs_to_other_identity() {
    let other = Uuid::from_u128(2);
    let lookup = MockProfileLookup::returning(Some(profile(other, true)));

    let outcome = guard::admin_only(&Session::authenticated(USER_ID), &lookup).await;

    assert_eq!(outcome, GuardOutcome::Redirect(FALLBACK_ROUTE));
}

#[tokio::test]
async fn test_admin_guard_fails_closed_on_lookup_error() {
    let lookup = MockProfileLookup::failing();

    // Must resolve to a plain redirect; the transport error stays inside.
    let outcome = guard::admin_only(&Session::authenticated(USER_ID), &lookup).await;

    assert_eq!(outcome, GuardOutcome::Redirect(FALLBACK_ROUTE));
    assert_eq!(lookup.call_count(), 1);
}

// --- Idempotence & Freshness ---

#[tokio::test]
async fn test_admin_guard_is_idempotent_and_looks_up_fresh_each_time() {
    let session = Session::authenticated(USER_ID);
    let lookup = MockProfileLookup::returning(Some(profile(USER_ID, true)));

    let first = guard::admin_only(&session, &lookup).await;
    let second = guard::admin_only(&session, &lookup).await;

    assert_eq!(first, second);
    // No memoization across navigations: two evaluations, two lookups.
    assert_eq!(lookup.call_count(), 2);
}

#[test]
fn test_guest_guard_is_idempotent() {
    let session = Session::authenticated(USER_ID);
    assert_eq!(guard::guest_only(&session), guard::guest_only(&session));

    let anon = Session::anonymous();
    assert_eq!(guard::guest_only(&anon), guard::guest_only(&anon));
}
