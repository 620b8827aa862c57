use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Serialize, de::DeserializeOwned};

use crate::store::schema::Preferences;

const PREFERENCES_FILE: &str = "preferences.json";

pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kata-dojo");
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    fn load<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        let path = self.file_path(name);
        if !path.exists() {
            return T::default();
        }
        match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable store file");
                T::default()
            }),
            Err(_) => T::default(),
        }
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    pub fn load_preferences(&self) -> Preferences {
        self.load(PREFERENCES_FILE)
    }

    pub fn save_preferences(&self, prefs: &Preferences) -> Result<()> {
        self.save(PREFERENCES_FILE, prefs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_test_store() -> (TempDir, JsonStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_missing_file_loads_default() {
        let (_dir, store) = make_test_store();
        assert_eq!(store.load_preferences(), Preferences::default());
    }

    #[test]
    fn test_save_then_load() {
        let (_dir, store) = make_test_store();
        let prefs = Preferences {
            theme: Some("light".into()),
        };
        store.save_preferences(&prefs).unwrap();
        assert_eq!(store.load_preferences(), prefs);

        let raw = fs::read_to_string(store.file_path(PREFERENCES_FILE)).unwrap();
        assert!(raw.contains("\"theme\": \"light\""));
    }

    #[test]
    fn test_corrupt_file_loads_default() {
        let (_dir, store) = make_test_store();
        fs::write(store.file_path(PREFERENCES_FILE), "{not json").unwrap();
        assert_eq!(store.load_preferences(), Preferences::default());
    }

    #[test]
    fn test_save_leaves_no_tmp_file() {
        let (dir, store) = make_test_store();
        store.save_preferences(&Preferences::default()).unwrap();
        let tmp_files: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("tmp"))
            .collect();
        assert!(tmp_files.is_empty(), "no residual .tmp files");
    }
}
