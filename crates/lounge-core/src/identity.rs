//! The authenticated identity.

use lounge_proto::{Role, UserDto};
use serde::{Deserialize, Serialize};

/// The authenticated account.
///
/// Created at login, destroyed at logout, immutable in between. `role_id`
/// is the role-scoped id the server uses in channel names and queue
/// entries; it is distinct from the global account id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Global account id.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Account email.
    pub email: String,
    /// Account role.
    pub role: Role,
    /// Role-scoped id.
    pub role_id: u64,
}

impl From<UserDto> for Identity {
    fn from(user: UserDto) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            role_id: user.type_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_keeps_role_scoped_id() {
        let user = UserDto {
            id: 7,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            role: Role::Visitor,
            type_id: 31,
        };

        let identity = Identity::from(user);
        assert_eq!(identity.id, 7);
        assert_eq!(identity.role_id, 31);
        assert_eq!(identity.role, Role::Visitor);
    }
}
