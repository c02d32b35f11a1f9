use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

const STORE_VERSION: u8 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SaveKey {
    Lives,
    CurrentLevel,
    CurrentScore,
    HighScore,
}

impl SaveKey {
    pub const ALL: [SaveKey; 4] = [
        SaveKey::Lives,
        SaveKey::CurrentLevel,
        SaveKey::CurrentScore,
        SaveKey::HighScore,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lives => "Lives",
            Self::CurrentLevel => "CurrentLevel",
            Self::CurrentScore => "CurrentScore",
            Self::HighScore => "HighScore",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == value)
    }
}

/// Integer key-value persistence. Writes may be buffered until `flush`.
pub trait SaveStore {
    fn get(&self, key: SaveKey) -> Option<u32>;

    fn set(&mut self, key: SaveKey, value: u32);

    fn flush(&mut self) {}
}

impl<S: SaveStore + ?Sized> SaveStore for Box<S> {
    fn get(&self, key: SaveKey) -> Option<u32> {
        (**self).get(key)
    }

    fn set(&mut self, key: SaveKey, value: u32) {
        (**self).set(key, value)
    }

    fn flush(&mut self) {
        (**self).flush()
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: BTreeMap<SaveKey, u32>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values(values: impl IntoIterator<Item = (SaveKey, u32)>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }
}

impl SaveStore for MemoryStore {
    fn get(&self, key: SaveKey) -> Option<u32> {
        self.values.get(&key).copied()
    }

    fn set(&mut self, key: SaveKey, value: u32) {
        self.values.insert(key, value);
    }
}

#[derive(Clone, Debug, Serialize)]
struct SaveFile {
    version: u8,
    #[serde(rename = "updatedAt")]
    updated_at: String,
    values: BTreeMap<SaveKey, u32>,
}

#[derive(Clone, Debug, Deserialize)]
struct SaveFileRaw {
    version: u8,
    values: HashMap<String, serde_json::Value>,
}

/// JSON file backed store. Unreadable files start empty; write failures are
/// reported on stderr and otherwise ignored.
pub struct JsonFileStore {
    file_path: PathBuf,
    values: BTreeMap<SaveKey, u32>,
    dirty: bool,
}

impl JsonFileStore {
    pub fn new(file_path: PathBuf) -> Self {
        let values = load_values(&file_path);
        Self {
            file_path,
            values,
            dirty: false,
        }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    fn save(&self) {
        if let Some(parent) = self.file_path.parent() {
            if let Err(error) = fs::create_dir_all(parent) {
                eprintln!(
                    "[save-store] failed to create parent dir {}: {error}",
                    parent.display()
                );
                return;
            }
        }

        let payload = SaveFile {
            version: STORE_VERSION,
            updated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            values: self.values.clone(),
        };
        match serde_json::to_string_pretty(&payload) {
            Ok(text) => {
                if let Err(error) = fs::write(&self.file_path, text) {
                    eprintln!(
                        "[save-store] failed to write {}: {error}",
                        self.file_path.display()
                    );
                }
            }
            Err(error) => {
                eprintln!(
                    "[save-store] failed to serialize payload for {}: {error}",
                    self.file_path.display()
                );
            }
        }
    }
}

impl SaveStore for JsonFileStore {
    fn get(&self, key: SaveKey) -> Option<u32> {
        self.values.get(&key).copied()
    }

    fn set(&mut self, key: SaveKey, value: u32) {
        if self.values.insert(key, value) != Some(value) {
            self.dirty = true;
        }
    }

    fn flush(&mut self) {
        if !self.dirty {
            return;
        }
        self.save();
        self.dirty = false;
    }
}

fn load_values(path: &Path) -> BTreeMap<SaveKey, u32> {
    let text = match fs::read_to_string(path) {
        Ok(value) => value,
        Err(error) => {
            if error.kind() != std::io::ErrorKind::NotFound {
                eprintln!("[save-store] failed to read {}: {error}", path.display());
            }
            return BTreeMap::new();
        }
    };
    let parsed = match serde_json::from_str::<SaveFileRaw>(&text) {
        Ok(value) if value.version == STORE_VERSION => value,
        Ok(value) => {
            eprintln!(
                "[save-store] unsupported version {} at {}",
                value.version,
                path.display()
            );
            return BTreeMap::new();
        }
        Err(error) => {
            eprintln!("[save-store] failed to parse {}: {error}", path.display());
            return BTreeMap::new();
        }
    };

    let mut values = BTreeMap::new();
    for (name, raw_value) in parsed.values {
        let Some(key) = SaveKey::parse(&name) else {
            eprintln!(
                "[save-store] ignoring unknown key '{name}' in {}",
                path.display()
            );
            continue;
        };
        match serde_json::from_value::<u32>(raw_value) {
            Ok(value) => {
                values.insert(key, value);
            }
            Err(error) => {
                eprintln!(
                    "[save-store] failed to parse value for '{name}' in {}: {error}",
                    path.display()
                );
            }
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str) -> PathBuf {
        let unique = format!(
            "{}-{}-{}",
            name,
            std::process::id(),
            rand::random::<u32>()
        );
        std::env::temp_dir().join(unique).join("save.json")
    }

    #[test]
    fn values_survive_a_reload() {
        let path = temp_file("save-store-reload");
        let mut store = JsonFileStore::new(path.clone());
        assert_eq!(store.get(SaveKey::HighScore), None);
        store.set(SaveKey::HighScore, 12_340);
        store.set(SaveKey::Lives, 2);
        store.flush();

        let reloaded = JsonFileStore::new(path.clone());
        assert_eq!(reloaded.get(SaveKey::HighScore), Some(12_340));
        assert_eq!(reloaded.get(SaveKey::Lives), Some(2));
        assert_eq!(reloaded.get(SaveKey::CurrentLevel), None);

        let text = fs::read_to_string(&path).expect("file written");
        assert!(text.contains("\"updatedAt\""));
        let _ = fs::remove_dir_all(path.parent().expect("parent exists"));
    }

    #[test]
    fn nothing_is_written_before_flush() {
        let path = temp_file("save-store-buffered");
        let mut store = JsonFileStore::new(path.clone());
        store.set(SaveKey::CurrentScore, 10);
        assert!(!path.exists());
        store.flush();
        assert!(path.exists());
        let _ = fs::remove_dir_all(path.parent().expect("parent exists"));
    }

    #[test]
    fn load_keeps_valid_values_and_skips_the_rest() {
        let path = temp_file("save-store-partial");
        let parent = path.parent().expect("parent exists").to_path_buf();
        fs::create_dir_all(&parent).expect("create dir");
        let raw = r#"{
  "version": 1,
  "updatedAt": "2026-01-01T00:00:00.000Z",
  "values": {
    "HighScore": 5000,
    "Lives": -1,
    "Bonus": 3
  }
}"#;
        fs::write(&path, raw).expect("write file");

        let store = JsonFileStore::new(path.clone());
        assert_eq!(store.get(SaveKey::HighScore), Some(5000));
        assert_eq!(store.get(SaveKey::Lives), None);
        let _ = fs::remove_dir_all(&parent);
    }

    #[test]
    fn unsupported_version_starts_empty() {
        let path = temp_file("save-store-version");
        let parent = path.parent().expect("parent exists").to_path_buf();
        fs::create_dir_all(&parent).expect("create dir");
        fs::write(&path, r#"{"version":9,"values":{"HighScore":1}}"#).expect("write file");

        let store = JsonFileStore::new(path.clone());
        assert_eq!(store.get(SaveKey::HighScore), None);
        let _ = fs::remove_dir_all(&parent);
    }

    #[test]
    fn boxed_store_forwards_calls() {
        let mut store: Box<dyn SaveStore> =
            Box::new(MemoryStore::with_values([(SaveKey::Lives, 3)]));
        store.set(SaveKey::CurrentLevel, 4);
        assert_eq!(store.get(SaveKey::Lives), Some(3));
        assert_eq!(store.get(SaveKey::CurrentLevel), Some(4));
    }
}
