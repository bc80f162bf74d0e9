//! Push-channel naming.

use serde::{Deserialize, Serialize};

use crate::Role;

/// A push channel the client can subscribe to.
///
/// Two categories exist: per-identity private channels, scoped by the
/// role-scoped id, and one shared broadcast channel carrying queue
/// membership changes. Private channels require an authenticated handshake;
/// the broadcast channel does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// Private channel of one visitor (`visitor.<id>`).
    VisitorPrivate(u64),
    /// Private channel of one provider (`provider.<id>`).
    ProviderPrivate(u64),
    /// Shared broadcast channel for queue membership changes
    /// (`lounge.queue`).
    LoungeQueue,
}

impl Channel {
    /// Private channel for the given role-scoped id.
    pub fn private(role: Role, type_id: u64) -> Self {
        match role {
            Role::Visitor => Self::VisitorPrivate(type_id),
            Role::Provider => Self::ProviderPrivate(type_id),
        }
    }

    /// Wire name of the channel.
    pub fn name(&self) -> String {
        match self {
            Self::VisitorPrivate(id) => format!("visitor.{id}"),
            Self::ProviderPrivate(id) => format!("provider.{id}"),
            Self::LoungeQueue => "lounge.queue".to_string(),
        }
    }

    /// Parse a wire name back into a channel. `None` for names outside the
    /// contract.
    pub fn parse(name: &str) -> Option<Self> {
        if name == "lounge.queue" {
            return Some(Self::LoungeQueue);
        }
        if let Some(id) = name.strip_prefix("visitor.") {
            return id.parse().ok().map(Self::VisitorPrivate);
        }
        if let Some(id) = name.strip_prefix("provider.") {
            return id.parse().ok().map(Self::ProviderPrivate);
        }
        None
    }

    /// Whether subscribing requires the authenticated handshake.
    pub fn requires_auth(&self) -> bool {
        match self {
            Self::VisitorPrivate(_) | Self::ProviderPrivate(_) => true,
            Self::LoungeQueue => false,
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for channel in [
            Channel::VisitorPrivate(31),
            Channel::ProviderPrivate(7),
            Channel::LoungeQueue,
        ] {
            assert_eq!(Channel::parse(&channel.name()), Some(channel));
        }
    }

    #[test]
    fn foreign_names_do_not_parse() {
        assert_eq!(Channel::parse("presence.lobby"), None);
        assert_eq!(Channel::parse("visitor.not-a-number"), None);
        assert_eq!(Channel::parse(""), None);
    }

    #[test]
    fn only_private_channels_require_auth() {
        assert!(Channel::VisitorPrivate(1).requires_auth());
        assert!(Channel::ProviderPrivate(1).requires_auth());
        assert!(!Channel::LoungeQueue.requires_auth());
    }
}
