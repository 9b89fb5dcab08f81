//! Role-based access decisions.
//!
//! [`authorize`] is a pure function over a session's state. The HTTP layer
//! calls it through [`crate::middleware::auth::Authorized`], which holds the
//! session lock while the handler runs.

use thiserror::Error;

use market_stall_core::Role;

use crate::models::{Identity, SessionState};

/// Why a session was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccessDenied {
    /// No one is logged in on this session.
    #[error("Authentication required")]
    Unauthenticated,

    /// Logged in, but with a role outside the allowed set.
    #[error("Forbidden: must be {}", join_roles(.allowed))]
    Forbidden {
        /// Roles that would have been accepted.
        allowed: &'static [Role],
    },
}

fn join_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Decide whether `session` may perform an operation open to `allowed`.
///
/// # Errors
///
/// Returns `AccessDenied::Unauthenticated` when the session has no identity,
/// and `AccessDenied::Forbidden` when the identity's role is not allowed.
pub fn authorize<'s>(
    session: &'s SessionState,
    allowed: &'static [Role],
) -> Result<&'s Identity, AccessDenied> {
    authorize_identity(session.identity(), allowed)
}

/// Same decision for an identity taken out of a session.
///
/// # Errors
///
/// See [`authorize`].
pub fn authorize_identity<'a>(
    identity: Option<&'a Identity>,
    allowed: &'static [Role],
) -> Result<&'a Identity, AccessDenied> {
    let identity = identity.ok_or(AccessDenied::Unauthenticated)?;

    if !allowed.contains(&identity.role) {
        return Err(AccessDenied::Forbidden { allowed });
    }

    Ok(identity)
}
