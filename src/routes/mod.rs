/// Router Module Index
///
/// Organizes the application's routing logic into access-segregated modules.
/// Access control is applied explicitly at the module level (via Axum route
/// layers), so a handler can never be reached without its guard having run.
///
/// The four modules map directly to the guard kinds.

/// Routes accessible to all visitors (anonymous, read-only catalog).
pub mod public;

/// Routes meant only for unauthenticated visitors (login, signup).
/// Protected by the guest-only guard: identified sessions are redirected home.
pub mod guest;

/// Routes requiring a resolved identity. Anonymous sessions receive 401.
pub mod authenticated;

/// Routes restricted to profiles with `is_admin = true`.
/// Protected by the admin-only guard, which performs the privilege lookup.
pub mod admin;
