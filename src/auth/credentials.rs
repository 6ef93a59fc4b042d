//! Pairing token files.
//!
//! One plain-text file per application identity id, holding exactly the
//! token bytes with no framing. The file name is the percent-encoded id, so
//! distinct ids never share a file. Files live in `~/.freebox-watcher/` unless
//! another directory is configured.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::traits::CredentialsError;

/// The default token directory name, relative to the home directory.
const TOKEN_DIR: &str = ".freebox-watcher";

/// Extension of the token files.
const TOKEN_EXTENSION: &str = "token";

/// Manages the token files of a directory.
#[derive(Debug, Clone)]
pub struct TokenFileManager {
    dir: PathBuf,
}

impl TokenFileManager {
    /// Create a manager rooted at `~/.freebox-watcher`.
    ///
    /// Returns `None` if the home directory cannot be determined.
    pub fn new() -> Option<Self> {
        let home = dirs::home_dir()?;
        Some(Self {
            dir: home.join(TOKEN_DIR),
        })
    }

    /// Create a manager rooted at a custom directory.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory holding the token files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the token file for an identity id.
    pub fn path_for(&self, app_id: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", file_stem(app_id), TOKEN_EXTENSION))
    }

    /// Read the token for `app_id`.
    ///
    /// A missing file is the normal "not paired yet" state and yields `Ok(None)`.
    pub fn load(&self, app_id: &str) -> Result<Option<String>, CredentialsError> {
        let path = self.path_for(app_id);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CredentialsError::LoadFailed(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let token = String::from_utf8(bytes)
            .map_err(|e| CredentialsError::Corrupted(format!("{}: {}", path.display(), e)))?;
        if token.is_empty() {
            return Ok(None);
        }
        Ok(Some(token))
    }

    /// Write the token for `app_id`, creating the directory if needed.
    pub fn save(&self, app_id: &str, token: &str) -> Result<(), CredentialsError> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            CredentialsError::SaveFailed(format!("{}: {}", self.dir.display(), e))
        })?;

        let path = self.path_for(app_id);
        let mut file = fs::File::create(&path)
            .map_err(|e| CredentialsError::SaveFailed(format!("{}: {}", path.display(), e)))?;
        file.write_all(token.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| CredentialsError::SaveFailed(format!("{}: {}", path.display(), e)))
    }
}

/// Reversible mapping of an identity id onto a file name stem without path
/// separators. Ids made of `[A-Za-z0-9._~-]` map onto themselves.
fn file_stem(app_id: &str) -> String {
    urlencoding::encode(app_id).into_owned()
}
