use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use mineboard_client::{IdentityStorage, StorageError};
use tempfile::NamedTempFile;
use tracing::debug;

/// One JSON object in `identity.json`, the native stand-in for browser
/// local storage. Values are kept byte for byte.
#[derive(Debug, Clone)]
pub struct FileIdentityStorage {
    path: PathBuf,
}

impl FileIdentityStorage {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join("identity.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(err) => return Err(unavailable(&self.path, err)),
        };

        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|err| {
            StorageError::Unavailable(format!("{}: {err}", self.path.display()))
        })
    }
}

impl IdentityStorage for FileIdentityStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    #[tracing::instrument(skip(self, value), fields(file = %self.path.display()))]
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());

        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut temp = NamedTempFile::new_in(dir).map_err(|err| unavailable(dir, err))?;
        serde_json::to_writer(&mut temp, &values)
            .map_err(|err| unavailable(&self.path, err.into()))?;
        temp.persist(&self.path)
            .map_err(|err| unavailable(&self.path, err.error))?;

        debug!(entries = values.len(), "saved identity storage");
        Ok(())
    }
}

fn unavailable(path: &Path, err: std::io::Error) -> StorageError {
    StorageError::Unavailable(format!("{}: {err}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mineboard_client::{DEFAULT_IDENTITY_KEY, IdentityGate};
    use tempfile::tempdir;

    #[test]
    fn first_visit_has_no_nickname() {
        let temp = tempdir().expect("tempdir");
        let gate = IdentityGate::new(FileIdentityStorage::new(temp.path()));
        assert_eq!(gate.resolve(), None);
    }

    #[test]
    fn nickname_survives_new_session() {
        let temp = tempdir().expect("tempdir");
        let mut gate = IdentityGate::new(FileIdentityStorage::new(temp.path()));
        gate.submit("Steve").expect("submit");

        let mut storage = FileIdentityStorage::new(temp.path());
        storage.set("other", "value").expect("set other key");
        let next_session = IdentityGate::new(storage);
        assert_eq!(next_session.resolve().as_deref(), Some("Steve"));
        assert_eq!(
            next_session
                .storage()
                .get("other")
                .expect("read other key")
                .as_deref(),
            Some("value")
        );
        assert_eq!(next_session.key(), DEFAULT_IDENTITY_KEY);
    }

    #[test]
    fn values_round_trip_verbatim() {
        let temp = tempdir().expect("tempdir");
        let mut gate = IdentityGate::new(FileIdentityStorage::new(temp.path()));
        assert_eq!(gate.submit("Ste\nve").as_deref(), Ok("Ste\nve"));

        let mut storage = FileIdentityStorage::new(temp.path());
        storage.set("a=b", "c=d # e").expect("set key with separators");

        let next_session = IdentityGate::new(FileIdentityStorage::new(temp.path()));
        assert_eq!(next_session.resolve().as_deref(), Some("Ste\nve"));
        assert_eq!(
            next_session
                .storage()
                .get("a=b")
                .expect("read key with separators")
                .as_deref(),
            Some("c=d # e")
        );
    }

    #[test]
    fn corrupt_file_reads_as_unavailable() {
        let temp = tempdir().expect("tempdir");
        let storage = FileIdentityStorage::new(temp.path());
        fs::write(storage.path(), "MINECRAFT_NICKNAME=Steve\n").expect("write garbage");

        assert!(matches!(
            storage.get(DEFAULT_IDENTITY_KEY),
            Err(StorageError::Unavailable(_))
        ));
        assert_eq!(IdentityGate::new(storage).resolve(), None);
    }

    #[test]
    fn unreadable_location_reports_unavailable() {
        let temp = tempdir().expect("tempdir");
        let blocker = temp.path().join("identity.json");
        fs::create_dir(&blocker).expect("make directory where file should be");

        let storage = FileIdentityStorage::new(temp.path());
        assert!(matches!(
            storage.get(DEFAULT_IDENTITY_KEY),
            Err(StorageError::Unavailable(_))
        ));
        assert_eq!(IdentityGate::new(storage).resolve(), None);
    }
}
