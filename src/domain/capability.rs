//! Capability tags and permission sets.
//!
//! Role permissions are stored as strings in the config store but are parsed
//! into a closed set of tags before any check runs. Unknown strings fail
//! closed: they grant nothing and are logged once at resolution time.

use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A single named permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// `*`: every capability, including future ones
    Wildcard,
    /// `system.admin`: organization-wide visibility
    SystemAdmin,
    /// `credits.view`: read claims within the holder's scope
    CreditsView,
    /// `credits.submit`: create claims
    CreditsSubmit,
    /// `credits.approve`: approve pending claims
    CreditsApprove,
    /// `credits.reject`: reject pending claims
    CreditsReject,
    /// `credits.export`: produce claim exports and statistics
    CreditsExport,
    /// `users.manage`: user CRUD, password reset, unlock
    UsersManage,
    /// `config.manage`: role/credit-type/field/status configuration
    ConfigManage,
    /// `structure.manage`: grade/major/class directory
    StructureManage,
    /// `notices.publish`: announcement board
    NoticesPublish,
}

impl Capability {
    /// The wire/storage representation of this capability.
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Wildcard => "*",
            Capability::SystemAdmin => "system.admin",
            Capability::CreditsView => "credits.view",
            Capability::CreditsSubmit => "credits.submit",
            Capability::CreditsApprove => "credits.approve",
            Capability::CreditsReject => "credits.reject",
            Capability::CreditsExport => "credits.export",
            Capability::UsersManage => "users.manage",
            Capability::ConfigManage => "config.manage",
            Capability::StructureManage => "structure.manage",
            Capability::NoticesPublish => "notices.publish",
        }
    }
}

/// Unknown capability strings are rejected, not silently matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCapability(pub String);

impl std::fmt::Display for UnknownCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown capability: {}", self.0)
    }
}

impl FromStr for Capability {
    type Err = UnknownCapability;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "*" => Ok(Capability::Wildcard),
            "system.admin" => Ok(Capability::SystemAdmin),
            "credits.view" => Ok(Capability::CreditsView),
            "credits.submit" => Ok(Capability::CreditsSubmit),
            "credits.approve" => Ok(Capability::CreditsApprove),
            "credits.reject" => Ok(Capability::CreditsReject),
            "credits.export" => Ok(Capability::CreditsExport),
            "users.manage" => Ok(Capability::UsersManage),
            "config.manage" => Ok(Capability::ConfigManage),
            "structure.manage" => Ok(Capability::StructureManage),
            "notices.publish" => Ok(Capability::NoticesPublish),
            other => Err(UnknownCapability(other.to_string())),
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The resolved permission set of one role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    tags: HashSet<Capability>,
}

impl CapabilitySet {
    /// The empty set. A role with no config resolves to this (fail closed).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from stored permission strings. Unrecognized strings are
    /// dropped with a warning and grant nothing.
    pub fn from_strings<S: AsRef<str>>(raw: &[S]) -> Self {
        let mut tags = HashSet::new();
        for s in raw {
            match s.as_ref().parse::<Capability>() {
                Ok(cap) => {
                    tags.insert(cap);
                }
                Err(unknown) => {
                    tracing::warn!(capability = %unknown.0, "ignoring unknown capability string");
                }
            }
        }
        Self { tags }
    }

    pub fn from_tags(tags: impl IntoIterator<Item = Capability>) -> Self {
        Self {
            tags: tags.into_iter().collect(),
        }
    }

    /// True when the set holds the wildcard or the exact capability.
    pub fn contains(&self, cap: Capability) -> bool {
        self.tags.contains(&Capability::Wildcard) || self.tags.contains(&cap)
    }

    /// True when the wildcard itself is present.
    pub fn has_wildcard(&self) -> bool {
        self.tags.contains(&Capability::Wildcard)
    }

    /// Organization-wide visibility: wildcard or `system.admin`.
    pub fn is_org_wide(&self) -> bool {
        self.has_wildcard() || self.tags.contains(&Capability::SystemAdmin)
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_capabilities() {
        assert_eq!("*".parse::<Capability>().unwrap(), Capability::Wildcard);
        assert_eq!(
            "credits.approve".parse::<Capability>().unwrap(),
            Capability::CreditsApprove
        );
        assert_eq!(
            "system.admin".parse::<Capability>().unwrap(),
            Capability::SystemAdmin
        );
    }

    #[test]
    fn test_unknown_capability_fails_closed() {
        assert!("credits.hack".parse::<Capability>().is_err());

        let set = CapabilitySet::from_strings(&["credits.hack", "credits.view"]);
        assert_eq!(set.len(), 1);
        assert!(set.contains(Capability::CreditsView));
        assert!(!set.contains(Capability::CreditsApprove));
    }

    #[test]
    fn test_wildcard_grants_everything() {
        let set = CapabilitySet::from_strings(&["*"]);
        assert!(set.contains(Capability::CreditsApprove));
        assert!(set.contains(Capability::ConfigManage));
        assert!(set.is_org_wide());
    }

    #[test]
    fn test_empty_set_grants_nothing() {
        let set = CapabilitySet::empty();
        assert!(!set.contains(Capability::CreditsView));
        assert!(!set.is_org_wide());
    }

    #[test]
    fn test_round_trip_as_str() {
        for cap in [
            Capability::Wildcard,
            Capability::SystemAdmin,
            Capability::CreditsView,
            Capability::CreditsSubmit,
            Capability::CreditsApprove,
            Capability::CreditsReject,
            Capability::CreditsExport,
            Capability::UsersManage,
            Capability::ConfigManage,
            Capability::StructureManage,
            Capability::NoticesPublish,
        ] {
            assert_eq!(cap.as_str().parse::<Capability>().unwrap(), cap);
        }
    }
}
