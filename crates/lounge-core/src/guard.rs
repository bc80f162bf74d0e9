//! Role-gated navigation decisions.
//!
//! The guard is a pure function of (session resolution, required role): no
//! timers, no I/O, no internal state. The view layer asks it what to render
//! for a protected screen and follows the answer.

use lounge_proto::Role;

use crate::Identity;

/// Whether the persisted session has been resolved yet.
///
/// On startup the store restores from durable storage asynchronously from
/// the view's perspective; until that finishes the guard must not redirect,
/// or a reload would bounce an authenticated user to the login screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionResolution {
    /// Restoration still in flight.
    Resolving,
    /// Restoration finished; the session is present or absent.
    Resolved(Option<Identity>),
}

/// Decision for a protected screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAccess {
    /// Session not yet resolved; render a placeholder, do not redirect.
    Loading,
    /// No session; redirect to the login screen.
    Unauthenticated,
    /// Authenticated as the wrong role; render access-denied. The session
    /// stays intact, no forced logout.
    WrongRole {
        /// The role the session actually has.
        actual: Role,
    },
    /// Authenticated and authorized; render the protected content.
    Authorized(Identity),
}

impl RouteAccess {
    /// Evaluate the guard for a screen requiring `required`.
    pub fn evaluate(resolution: &SessionResolution, required: Role) -> Self {
        match resolution {
            SessionResolution::Resolving => Self::Loading,
            SessionResolution::Resolved(None) => Self::Unauthenticated,
            SessionResolution::Resolved(Some(identity)) => {
                if identity.role == required {
                    Self::Authorized(identity.clone())
                } else {
                    Self::WrongRole { actual: identity.role }
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(role: Role) -> Identity {
        Identity {
            id: 7,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            role,
            role_id: 31,
        }
    }

    #[test]
    fn unresolved_session_loads() {
        let access = RouteAccess::evaluate(&SessionResolution::Resolving, Role::Visitor);
        assert_eq!(access, RouteAccess::Loading);
    }

    #[test]
    fn missing_session_redirects() {
        let access = RouteAccess::evaluate(&SessionResolution::Resolved(None), Role::Provider);
        assert_eq!(access, RouteAccess::Unauthenticated);
    }

    #[test]
    fn wrong_role_is_denied_without_logout() {
        let resolution = SessionResolution::Resolved(Some(identity(Role::Visitor)));
        let access = RouteAccess::evaluate(&resolution, Role::Provider);
        assert_eq!(access, RouteAccess::WrongRole { actual: Role::Visitor });
    }

    #[test]
    fn matching_role_is_authorized() {
        let resolution = SessionResolution::Resolved(Some(identity(Role::Provider)));
        let access = RouteAccess::evaluate(&resolution, Role::Provider);
        assert!(matches!(access, RouteAccess::Authorized(id) if id.role == Role::Provider));
    }
}
