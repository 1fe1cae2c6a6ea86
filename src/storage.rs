use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Every record the app persists, with its on-disk file name. Call sites name
/// a variant instead of passing strings around, so a typo cannot silently
/// split one record across two files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKey {
    ShoppingList,
    Countdown,
}

impl RecordKey {
    fn file_name(self) -> &'static str {
        match self {
            RecordKey::ShoppingList => "shopping.json",
            RecordKey::Countdown => "countdown.json",
        }
    }
}

#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(err) => write!(f, "io error: {err}"),
            StorageError::Json(err) => write!(f, "json error: {err}"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(value: std::io::Error) -> Self {
        StorageError::Io(value)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        StorageError::Json(value)
    }
}

pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn ensure_dirs(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Loads a record, treating a missing file as "never saved" rather than
    /// an error. Anything else (unreadable file, malformed JSON) propagates.
    pub fn read<T: DeserializeOwned>(&self, key: RecordKey) -> Result<Option<T>, StorageError> {
        let mut file = match File::open(self.root.join(key.file_name())) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let mut buf = String::new();
        file.read_to_string(&mut buf)?;
        Ok(Some(serde_json::from_str(&buf)?))
    }

    pub fn write<T: Serialize>(&self, key: RecordKey, data: &T) -> Result<(), StorageError> {
        self.write_atomic(self.root.join(key.file_name()), data)
    }

    fn write_atomic<T: Serialize>(&self, path: PathBuf, data: &T) -> Result<(), StorageError> {
        let temp_path = path.with_extension("tmp");
        let json = serde_json::to_vec_pretty(data)?;
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&json)?;
            file.sync_all()?;
        }
        fs::rename(temp_path, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CountdownFile, ReminderState, ShoppingFile, ShoppingItem};

    fn make_shopping() -> ShoppingFile {
        ShoppingFile {
            schema_version: 1,
            items: vec![ShoppingItem {
                id: "a".to_string(),
                name: "Milk".to_string(),
                completed_at: None,
                updated_at: 10,
            }],
        }
    }

    #[test]
    fn read_returns_none_when_record_was_never_saved() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().to_path_buf());
        let loaded: Option<ShoppingFile> = storage.read(RecordKey::ShoppingList).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().to_path_buf());

        storage.write(RecordKey::ShoppingList, &make_shopping()).unwrap();
        let loaded: ShoppingFile = storage.read(RecordKey::ShoppingList).unwrap().unwrap();
        assert_eq!(loaded.items.len(), 1);
        assert_eq!(loaded.items[0].name, "Milk");

        // No stray temp file left behind.
        assert!(dir.path().join("shopping.json").exists());
        assert!(!dir.path().join("shopping.tmp").exists());
    }

    #[test]
    fn second_write_replaces_the_first() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().to_path_buf());

        storage.write(RecordKey::ShoppingList, &make_shopping()).unwrap();
        let empty = ShoppingFile { schema_version: 1, items: Vec::new() };
        storage.write(RecordKey::ShoppingList, &empty).unwrap();

        let loaded: ShoppingFile = storage.read(RecordKey::ShoppingList).unwrap().unwrap();
        assert!(loaded.items.is_empty());
    }

    #[test]
    fn keys_map_to_distinct_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().to_path_buf());

        storage.write(RecordKey::ShoppingList, &make_shopping()).unwrap();
        let countdown = CountdownFile {
            schema_version: 1,
            reminder: ReminderState {
                current_notification_id: Some("7".to_string()),
                completed_at_timestamps: vec![5],
            },
        };
        storage.write(RecordKey::Countdown, &countdown).unwrap();

        assert!(dir.path().join("shopping.json").exists());
        assert!(dir.path().join("countdown.json").exists());

        let loaded: CountdownFile = storage.read(RecordKey::Countdown).unwrap().unwrap();
        assert_eq!(loaded.reminder.completed_at_timestamps, vec![5]);
        let other: ShoppingFile = storage.read(RecordKey::ShoppingList).unwrap().unwrap();
        assert_eq!(other.items[0].id, "a");
    }

    #[test]
    fn malformed_json_is_a_json_error_not_a_missing_record() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("countdown.json"), "{not json").unwrap();

        let storage = Storage::new(dir.path().to_path_buf());
        let result: Result<Option<CountdownFile>, _> = storage.read(RecordKey::Countdown);
        assert!(matches!(result, Err(StorageError::Json(_))));
    }

    #[test]
    fn write_fails_with_io_error_when_root_is_not_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file_as_root = dir.path().join("not-a-dir");
        std::fs::write(&file_as_root, "x").unwrap();

        let storage = Storage::new(file_as_root);
        let result = storage.write(RecordKey::ShoppingList, &make_shopping());
        assert!(matches!(result, Err(StorageError::Io(_))));
    }

    #[test]
    fn ensure_dirs_creates_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("data").join("taskly");

        let storage = Storage::new(nested.clone());
        storage.ensure_dirs().unwrap();
        assert!(nested.is_dir());
    }
}
