//! Principals and document permissions.
//!
//! A document carries unix-style permission bits checked against the
//! principal running an operation. Members of the `dba` group bypass the
//! bit check. User and group management is out of scope; principals are
//! constructed by the caller.

use thiserror::Error;

/// Group granting unrestricted access.
pub const DBA_GROUP: &str = "dba";

/// The principal an operation runs as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    name: String,
    groups: Vec<String>,
}

impl Principal {
    /// Create a principal with group memberships.
    pub fn new(name: impl Into<String>, groups: Vec<String>) -> Self {
        Self {
            name: name.into(),
            groups,
        }
    }

    /// An administrative principal (member of `dba`).
    pub fn admin(name: impl Into<String>) -> Self {
        Self::new(name, vec![DBA_GROUP.to_string()])
    }

    /// A plain principal with no group memberships.
    pub fn user(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }

    pub fn is_dba(&self) -> bool {
        self.has_group(DBA_GROUP)
    }
}

/// Capability requested against a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Read,
    Update,
}

impl Capability {
    /// Permission bit within one owner/group/other triplet.
    fn bit(self) -> u16 {
        match self {
            Capability::Read => 0o4,
            Capability::Update => 0o2,
        }
    }
}

/// Unix-style permission bits with an owner and a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permissions {
    owner: String,
    group: String,
    mode: u16,
}

/// Raised when a principal lacks a capability on a document.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("permission to {capability} document denied for {principal}")]
pub struct PermissionDenied {
    pub principal: String,
    pub capability: String,
}

impl Permissions {
    /// Default mode for stored documents: owner and group may update,
    /// everyone may read.
    pub const DEFAULT_MODE: u16 = 0o664;

    pub fn new(owner: impl Into<String>, group: impl Into<String>, mode: u16) -> Self {
        Self {
            owner: owner.into(),
            group: group.into(),
            mode,
        }
    }

    /// Permissions owned by the given principal's name with the default mode.
    pub fn owned_by(principal: &Principal) -> Self {
        Self::new(principal.name(), DBA_GROUP, Self::DEFAULT_MODE)
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn mode(&self) -> u16 {
        self.mode
    }

    pub fn set_mode(&mut self, mode: u16) {
        self.mode = mode;
    }

    /// True if the principal holds the capability.
    pub fn validate(&self, principal: &Principal, capability: Capability) -> bool {
        if principal.is_dba() {
            return true;
        }
        let bit = capability.bit();
        if principal.name() == self.owner {
            self.mode & (bit << 6) != 0
        } else if principal.has_group(&self.group) {
            self.mode & (bit << 3) != 0
        } else {
            self.mode & bit != 0
        }
    }

    /// Require the capability, or report which principal was denied.
    pub fn require(
        &self,
        principal: &Principal,
        capability: Capability,
    ) -> Result<(), PermissionDenied> {
        if self.validate(principal, capability) {
            Ok(())
        } else {
            Err(PermissionDenied {
                principal: principal.name().to_string(),
                capability: match capability {
                    Capability::Read => "read".to_string(),
                    Capability::Update => "update".to_string(),
                },
            })
        }
    }
}
