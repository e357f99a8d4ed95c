//! Directory-backed credential loading.
//!
//! Message queue credentials are mounted as a flat directory, one file per
//! secret (the Kubernetes secret volume layout). Mounted volumes also carry
//! hidden bookkeeping entries such as `..data` or `.staging/`, which are never
//! credentials.

use super::error::{Result, SecretsError};
use super::types::{CredentialMap, SecretBytes};
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info};

/// Prefix that marks an entry as hidden volume metadata.
const HIDDEN_PREFIX: u8 = b'.';

/// Read every credential file in `path` into a [`CredentialMap`].
///
/// Direct children only. Directories and names starting with `.` are skipped;
/// every other entry is read in full and keyed by its file name. Entries are
/// read in file name order and the first unreadable file fails the whole
/// load: nothing read before it is returned.
///
/// # Errors
///
/// - [`SecretsError::NotFound`] if `path` does not exist
/// - [`SecretsError::ReadDir`] if `path` cannot be listed
/// - [`SecretsError::InvalidName`] if a credential file name is not UTF-8
/// - [`SecretsError::Read`] with the untouched I/O error of the first
///   unreadable credential file
pub fn load_secrets(path: impl AsRef<Path>) -> Result<CredentialMap> {
    let dir = path.as_ref();

    if let Err(e) = fs::metadata(dir) {
        if e.kind() == io::ErrorKind::NotFound {
            return Err(SecretsError::NotFound { path: dir.to_path_buf() });
        }
    }

    let read_dir_err = |source| SecretsError::ReadDir { path: dir.to_path_buf(), source };
    let mut entries = fs::read_dir(dir)
        .map_err(read_dir_err)?
        .collect::<io::Result<Vec<_>>>()
        .map_err(read_dir_err)?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut secrets = CredentialMap::new();
    for entry in entries {
        let file_path = entry.path();
        let raw_name = entry.file_name();

        if raw_name.as_encoded_bytes().first() == Some(&HIDDEN_PREFIX) {
            debug!(entry = %raw_name.to_string_lossy(), "Skipping hidden secrets entry");
            continue;
        }

        let file_type = entry
            .file_type()
            .map_err(|source| SecretsError::Read { path: file_path.clone(), source })?;
        if file_type.is_dir() {
            debug!(entry = %raw_name.to_string_lossy(), "Skipping secrets subdirectory");
            continue;
        }

        let file_name = raw_name
            .into_string()
            .map_err(|_| SecretsError::InvalidName { path: file_path.clone() })?;

        info!(secret = %file_name, "Reading secret from {}", file_name);
        let contents =
            fs::read(&file_path).map_err(|source| SecretsError::Read { path: file_path, source })?;

        secrets.insert(file_name, SecretBytes::new(contents));
    }

    Ok(secrets)
}
