//! Router Module Index
//!
//! Splits the gateway's routes by access level. The session gate is applied to a whole
//! module as a route layer, so a handler cannot be exposed without it by accident.

/// Routes reachable without a session: region browsing, weather, sign-in/sign-out.
pub mod public;

/// Routes behind the session gate. A request without a stored credential is
/// redirected to `/login?next=<path>` before any handler runs.
pub mod authenticated;
