//! Persistence of the bearer token across restarts.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::StorageError;

/// Key the token is stored under.
pub const TOKEN_KEY: &str = "elite-token";

/// Environment override for the token file location.
pub const TOKEN_PATH_ENV: &str = "ELITE_TOKEN_PATH";

/// A single persisted string: the current bearer token, or nothing.
pub trait TokenStorage: Send + Sync {
    fn load(&self) -> Result<Option<String>, StorageError>;

    fn save(&self, token: &str) -> Result<(), StorageError>;

    /// Remove the entry; removing a missing entry is not an error.
    fn clear(&self) -> Result<(), StorageError>;
}

/// Token kept in a file named after [`TOKEN_KEY`].
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$ELITE_TOKEN_PATH`, or `<data dir>/elite/elite-token`.
    pub fn from_env() -> Result<Self, StorageError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, StorageError> {
        match lookup(TOKEN_PATH_ENV).filter(|path| !path.trim().is_empty()) {
            Some(path) => Ok(Self::new(path)),
            None => Self::in_data_dir(),
        }
    }

    pub fn in_data_dir() -> Result<Self, StorageError> {
        let dir = dirs::data_dir().ok_or(StorageError::NoDataDir)?;
        Ok(Self::new(dir.join("elite").join(TOKEN_KEY)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok((!contents.is_empty()).then_some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn save(&self, token: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        write_private(&self.path, token).map_err(|e| self.io_error(e))
    }

    fn clear(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// Owner-only from the moment the file exists; an older file keeps its inode,
/// so its mode is tightened before the token is written.
fn write_private(path: &Path, token: &str) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
        options.mode(0o600);
        let mut file = options.open(path)?;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        file.write_all(token.as_bytes())
    }
    #[cfg(not(unix))]
    {
        options.open(path)?.write_all(token.as_bytes())
    }
}

/// In-process storage; lost on exit.
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    value: Mutex<Option<String>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            value: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.value.lock().unwrap_or_else(|p| p.into_inner()).clone())
    }

    fn save(&self, token: &str) -> Result<(), StorageError> {
        *self.value.lock().unwrap_or_else(|p| p.into_inner()) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.value.lock().unwrap_or_else(|p| p.into_inner()) = None;
        Ok(())
    }
}

impl<T: TokenStorage + ?Sized> TokenStorage for std::sync::Arc<T> {
    fn load(&self) -> Result<Option<String>, StorageError> {
        (**self).load()
    }

    fn save(&self, token: &str) -> Result<(), StorageError> {
        (**self).save(token)
    }

    fn clear(&self) -> Result<(), StorageError> {
        (**self).clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_storage_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileTokenStorage::new(dir.path().join("nested").join(TOKEN_KEY));

        assert_eq!(storage.load().unwrap(), None);

        storage.save("abc.def.ghi").unwrap();
        assert_eq!(storage.load().unwrap().as_deref(), Some("abc.def.ghi"));

        storage.clear().unwrap();
        assert_eq!(storage.load().unwrap(), None);

        // clearing twice is fine
        storage.clear().unwrap();
    }

    #[test]
    fn empty_file_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(TOKEN_KEY);
        std::fs::write(&path, "").unwrap();

        assert_eq!(FileTokenStorage::new(path).load().unwrap(), None);
    }

    #[test]
    fn token_round_trips_byte_for_byte() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileTokenStorage::new(dir.path().join(TOKEN_KEY));

        storage.save(" padded.token ").unwrap();
        assert_eq!(storage.load().unwrap().as_deref(), Some(" padded.token "));

        // a shorter token fully replaces a longer one
        storage.save("t").unwrap();
        assert_eq!(storage.load().unwrap().as_deref(), Some("t"));
    }

    #[test]
    fn path_override_wins_over_data_dir() {
        let storage = FileTokenStorage::from_lookup(|key| {
            (key == TOKEN_PATH_ENV).then(|| "/tmp/elite-test/token".to_string())
        })
        .unwrap();
        assert_eq!(storage.path(), Path::new("/tmp/elite-test/token"));
    }

    #[test]
    fn blank_override_falls_back_to_data_dir() {
        let lookup = |_: &str| Some("  ".to_string());
        match (FileTokenStorage::from_lookup(lookup), FileTokenStorage::in_data_dir()) {
            (Ok(storage), Ok(default)) => assert_eq!(storage.path(), default.path()),
            (Err(StorageError::NoDataDir), Err(StorageError::NoDataDir)) => {}
            (got, want) => panic!("expected the data-dir default, got {got:?} vs {want:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn token_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let storage = FileTokenStorage::new(dir.path().join(TOKEN_KEY));
        storage.save("t").unwrap();

        let mode = std::fs::metadata(storage.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        // a pre-existing world-readable file is tightened on save
        std::fs::set_permissions(storage.path(), std::fs::Permissions::from_mode(0o644)).unwrap();
        storage.save("u").unwrap();
        let mode = std::fs::metadata(storage.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn memory_storage_lifecycle() {
        let storage = MemoryTokenStorage::with_token("a");
        assert_eq!(storage.load().unwrap().as_deref(), Some("a"));
        storage.clear().unwrap();
        assert_eq!(storage.load().unwrap(), None);
    }
}
