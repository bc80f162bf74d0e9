//! Authentication request/response bodies.

use serde::{Deserialize, Serialize};

/// Account role. Closed set: the server knows no third role, and neither do
/// we. Role checks are exhaustive matches, never string comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Patient-side account waiting to be seen.
    Visitor,
    /// Clinician-side account picking visitors from the queue.
    Provider,
}

impl Role {
    /// Wire name of the role, as the server spells it.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Visitor => "visitor",
            Self::Provider => "provider",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `POST /login` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

/// Account as the server reports it at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDto {
    /// Global account id.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Account email.
    pub email: String,
    /// Account role.
    #[serde(rename = "type")]
    pub role: Role,
    /// Role-scoped id (visitor id or provider id); used in channel names and
    /// queue entries.
    pub type_id: u64,
}

/// Bearer credential block of the login response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorisation {
    /// Opaque bearer token.
    pub token: String,
    /// Token scheme, normally `bearer`.
    #[serde(rename = "type")]
    pub token_type: String,
    /// Lifetime in seconds.
    pub expires_in: u64,
}

/// `POST /login` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Outcome marker, `success` on the happy path.
    pub status: String,
    /// The authenticated account.
    pub user: UserDto,
    /// Issued credential.
    pub authorisation: Authorisation,
}
