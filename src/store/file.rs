use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::entry::{Entry, Kind};
use crate::error::StoreError;
use crate::eval::Flag;
use crate::store::{EntryStore, MemoryStore};

/// On-disk layout: one array of tables per kind.
///
/// ```toml
/// [[email]]
/// identifier = "fraud@example.com"
/// flag = "blocked"
/// notes = "chargeback"
///
/// [[app_user_id]]
/// identifier = "u-1"
/// flag = "verified"
/// ```
#[derive(Debug, Default, Deserialize, Serialize)]
struct EntryFile {
    #[serde(default)]
    email: Vec<Record>,
    #[serde(default)]
    app_user_id: Vec<Record>,
}

#[derive(Debug, Deserialize, Serialize)]
struct Record {
    identifier: String,
    flag: Flag,
    #[serde(default)]
    notes: String,
}

/// Entry store persisted to a TOML file.
///
/// Every write replaces the file through a temp file in the same directory,
/// so a crash mid-save leaves the previous contents intact.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: MemoryStore,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(source) => return Err(StoreError::Read { path, source }),
        };

        let file: EntryFile = toml::from_str(&content).map_err(|source| StoreError::Parse {
            path: path.clone(),
            source,
        })?;

        let mut entries = MemoryStore::new();
        for (kind, records) in [(Kind::Email, file.email), (Kind::AppUserId, file.app_user_id)] {
            for r in records {
                entries.insert(Entry::new(kind, &r.identifier, r.flag, r.notes)?);
            }
        }

        Ok(Self { path, entries })
    }

    fn save(&self) -> Result<(), StoreError> {
        let mut file = EntryFile::default();
        for entry in self.entries.entries() {
            let record = Record {
                identifier: entry.identifier.clone(),
                flag: entry.flag,
                notes: entry.notes.clone(),
            };
            match entry.kind {
                Kind::Email => file.email.push(record),
                Kind::AppUserId => file.app_user_id.push(record),
            }
        }

        let text = toml::to_string(&file)?;
        let write_err = |source: std::io::Error| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(write_err)?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(text.as_bytes()).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}

impl EntryStore for FileStore {
    fn get(&self, kind: Kind, identifier: &str) -> Result<Option<Entry>, StoreError> {
        self.entries.get(kind, identifier)
    }

    fn upsert(&mut self, entry: Entry) -> Result<Option<Entry>, StoreError> {
        let previous = self.entries.upsert(entry)?;
        self.save()?;
        Ok(previous)
    }

    fn remove(&mut self, kind: Kind, identifier: &str) -> Result<Option<Entry>, StoreError> {
        let removed = self.entries.remove(kind, identifier)?;
        if removed.is_some() {
            self.save()?;
        }
        Ok(removed)
    }

    fn list(&self, kind: Kind) -> Result<Vec<Entry>, StoreError> {
        self.entries.list(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("entries.toml")).unwrap();
        assert!(store.list(Kind::Email).unwrap().is_empty());
    }

    #[test]
    fn writes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/entries.toml");

        let mut store = FileStore::open(&path).unwrap();
        store
            .upsert(Entry::email("Fraud@Example.com", Flag::Blocked, "chargeback").unwrap())
            .unwrap();
        store
            .upsert(Entry::app_user_id("u-9", Flag::Verified, "vip").unwrap())
            .unwrap();

        let reopened = FileStore::open(&path).unwrap();
        let hit = reopened.lookup(Kind::Email, "fraud@example.com").unwrap().unwrap();
        assert_eq!(hit.flag, Flag::Blocked);
        assert_eq!(hit.notes, "chargeback");
        assert_eq!(reopened.list(Kind::AppUserId).unwrap().len(), 1);
    }

    #[test]
    fn hand_written_file_is_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entries.toml");
        std::fs::write(
            &path,
            r#"
            [[email]]
            identifier = "  Ops@Example.com "
            flag = "review"
        "#,
        )
        .unwrap();

        let store = FileStore::open(&path).unwrap();
        let hit = store.get(Kind::Email, "ops@example.com").unwrap().unwrap();
        assert_eq!(hit.flag, Flag::Review);
        assert_eq!(hit.notes, "");
    }

    #[test]
    fn unknown_flag_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entries.toml");
        std::fs::write(
            &path,
            r#"
            [[app_user_id]]
            identifier = "u-1"
            flag = "maybe"
        "#,
        )
        .unwrap();

        assert!(matches!(
            FileStore::open(&path),
            Err(StoreError::Parse { .. })
        ));
    }

    #[test]
    fn invalid_stored_email_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entries.toml");
        std::fs::write(
            &path,
            r#"
            [[email]]
            identifier = "nobody"
            flag = "blocked"
        "#,
        )
        .unwrap();

        assert!(matches!(
            FileStore::open(&path),
            Err(StoreError::Invalid(_))
        ));
    }

    #[test]
    fn save_replaces_file_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entries.toml");
        std::fs::write(
            &path,
            r#"
            [[email]]
            identifier = "old@example.com"
            flag = "review"
        "#,
        )
        .unwrap();

        let mut store = FileStore::open(&path).unwrap();
        store.remove(Kind::Email, "old@example.com").unwrap();
        store
            .upsert(Entry::email("new@example.com", Flag::Blocked, "").unwrap())
            .unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("entries.toml")]);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(!text.contains("old@example.com"));
        assert!(text.contains("new@example.com"));
    }

    #[test]
    fn save_into_missing_directory_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();

        let mut store = FileStore::open(blocker.join("entries.toml")).unwrap();
        let err = store
            .upsert(Entry::app_user_id("u-1", Flag::Review, "").unwrap())
            .unwrap_err();
        assert!(matches!(err, StoreError::Write { .. }));
        assert_eq!(std::fs::read_to_string(&blocker).unwrap(), "");
    }

    #[test]
    fn remove_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entries.toml");
        let mut store = FileStore::open(&path).unwrap();
        store
            .upsert(Entry::app_user_id("u-1", Flag::Review, "").unwrap())
            .unwrap();
        store.remove(Kind::AppUserId, "u-1").unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert!(reopened.get(Kind::AppUserId, "u-1").unwrap().is_none());
    }
}
