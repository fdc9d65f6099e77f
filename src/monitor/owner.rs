//! Owner and group attribution.

use std::fmt;
use std::path::Path;

/// Name reported when an owner or group cannot be determined.
pub const UNKNOWN: &str = "unknown";

/// Who owns a file at the time of a modification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribution {
    pub owner: String,
    pub group: String,
}

impl Attribution {
    pub fn new(owner: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            group: group.into(),
        }
    }

    /// Attribution used when the lookup fails.
    #[must_use]
    pub fn unknown() -> Self {
        Self::new(UNKNOWN, UNKNOWN)
    }
}

impl fmt::Display for Attribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user {} of group {}", self.owner, self.group)
    }
}

/// Resolves the owner and group of a file.
pub trait OwnerResolver: Send + Sync {
    /// Look up who owns `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file's metadata cannot be read.
    fn resolve_owner(&self, path: &Path) -> std::io::Result<Attribution>;
}

/// Resolves owners from filesystem metadata and the system user database.
///
/// Ids without a matching name are reported numerically.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOwnerResolver;

#[cfg(unix)]
impl OwnerResolver for SystemOwnerResolver {
    fn resolve_owner(&self, path: &Path) -> std::io::Result<Attribution> {
        use nix::unistd::{Gid, Group, Uid, User};
        use std::os::unix::fs::MetadataExt;

        let metadata = std::fs::metadata(path)?;
        let (uid, gid) = (metadata.uid(), metadata.gid());

        let owner = User::from_uid(Uid::from_raw(uid))
            .ok()
            .flatten()
            .map_or_else(|| uid.to_string(), |user| user.name);
        let group = Group::from_gid(Gid::from_raw(gid))
            .ok()
            .flatten()
            .map_or_else(|| gid.to_string(), |group| group.name);

        Ok(Attribution { owner, group })
    }
}

#[cfg(not(unix))]
impl OwnerResolver for SystemOwnerResolver {
    fn resolve_owner(&self, path: &Path) -> std::io::Result<Attribution> {
        std::fs::metadata(path)?;
        Ok(Attribution::unknown())
    }
}
