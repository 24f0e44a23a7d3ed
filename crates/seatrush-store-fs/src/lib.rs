// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Filesystem-backed `KvStore` for SeatRush (uses the platform data dir).
//!
//! State lives in two scopes under one root: `local/` survives everything
//! except explicit removal, `session/` is wiped on logout.

use directories::ProjectDirs;
use seatrush_app_core::store::{KvStore, StoreError};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Which half of the state root a store addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Durable values (page, identity, wait-session, completion).
    Local,
    /// Values that only live for the current sign-in (resume target).
    Session,
}

impl Scope {
    fn dir_name(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Session => "session",
        }
    }
}

/// Resolve the default state root (e.g., `~/.local/share/SeatRush`).
pub fn default_root() -> Result<PathBuf, StoreError> {
    let proj = ProjectDirs::from("dev", "seatrush", "SeatRush")
        .ok_or_else(|| StoreError::Other("could not resolve data dir".into()))?;
    Ok(proj.data_dir().to_path_buf())
}

/// Store values as JSON files under `<root>/<scope>/`.
#[derive(Debug, Clone)]
pub struct FsKvStore {
    base: PathBuf,
}

impl FsKvStore {
    /// Create a store for `scope` under `root`, creating directories as needed.
    pub fn open(root: &Path, scope: Scope) -> Result<Self, StoreError> {
        let base = root.join(scope.dir_name());
        fs::create_dir_all(&base)?;
        Ok(Self { base })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        if key.is_empty()
            || !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
            || key.starts_with('.')
        {
            return Err(StoreError::Other(format!("invalid key: {key:?}")));
        }
        Ok(self.base.join(format!("{key}.json")))
    }
}

impl KvStore for FsKvStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read(path) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(StoreError::NotFound),
            Err(err) => Err(StoreError::Io(err)),
        }
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.base)?;
        // Write-then-rename so a reader never observes a half-written record.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &path)?;
        debug!(key, bytes = data.len(), "store write");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(path) {
            Ok(()) => {
                debug!(key, "store remove");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StoreError::Io(err)),
        }
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_dir_all(&self.base) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(StoreError::Io(err)),
        }
        fs::create_dir_all(&self.base)?;
        debug!(base = %self.base.display(), "store cleared");
        Ok(())
    }
}
