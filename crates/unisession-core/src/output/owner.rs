use std::path::Path;

use crate::error::CombineError;

/// Group that should own every created directory and copied file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupId(pub u32);

impl GroupId {
    /// Accepts a numeric gid or a group name known to the system group
    /// database (files, LDAP, SSSD, ... through NSS).
    #[cfg(unix)]
    pub fn resolve(group: &str) -> Result<Self, CombineError> {
        if let Ok(gid) = group.parse::<u32>() {
            return Ok(Self(gid));
        }
        match nix::unistd::Group::from_name(group) {
            Ok(Some(entry)) => Ok(Self(entry.gid.as_raw())),
            Ok(None) => Err(CombineError::Config(format!(
                "Unknown owner group: {group}"
            ))),
            Err(e) => Err(CombineError::Config(format!(
                "Cannot resolve group {group}: {e}"
            ))),
        }
    }

    #[cfg(not(unix))]
    pub fn resolve(group: &str) -> Result<Self, CombineError> {
        group.parse::<u32>().map(Self).map_err(|_| {
            CombineError::Config(format!("Owner group must be a numeric gid here: {group}"))
        })
    }

    /// Change the group owner of `path`, leaving the user owner as is.
    #[cfg(unix)]
    pub fn apply(&self, path: &Path) -> Result<(), CombineError> {
        let gid = nix::unistd::Gid::from_raw(self.0);
        nix::unistd::chown(path, None, Some(gid))
            .map_err(|errno| CombineError::io(path)(errno.into()))
    }

    #[cfg(not(unix))]
    pub fn apply(&self, path: &Path) -> Result<(), CombineError> {
        tracing::warn!("Group ownership is not supported here; leaving {}", path.display());
        Ok(())
    }
}
