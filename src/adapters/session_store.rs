use crate::domain::ports::SessionStore;
use crate::utils::error::Result;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Session storage that lives exactly as long as the value does.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    entries: HashMap<String, String>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn put(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// 以目錄模擬瀏覽器分頁的 session：每個 key 一個 JSON 檔
///
/// With `clear_on_drop` the files are removed when the store goes away,
/// which ends the session.
#[derive(Debug)]
pub struct FileSessionStore {
    base_path: PathBuf,
    clear_on_drop: bool,
    written: Vec<String>,
}

impl FileSessionStore {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;
        Ok(Self {
            base_path,
            clear_on_drop: false,
            written: Vec::new(),
        })
    }

    pub fn clear_on_drop(mut self, enabled: bool) -> Self {
        self.clear_on_drop = enabled;
        self
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{}.json", file_name))
    }
}

impl SessionStore for FileSessionStore {
    fn put(&mut self, key: &str, value: String) -> Result<()> {
        let path = self.path_for(key);
        fs::write(&path, value)?;
        tracing::debug!("Stored session key '{}' at {}", key, path.display());
        if !self.written.iter().any(|k| k == key) {
            self.written.push(key.to_string());
        }
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        self.written.retain(|k| k != key);
        Ok(())
    }
}

impl Drop for FileSessionStore {
    fn drop(&mut self) {
        if !self.clear_on_drop {
            return;
        }
        for key in std::mem::take(&mut self.written) {
            if let Err(e) = fs::remove_file(self.path_for(&key)) {
                tracing::warn!("Could not clear session key '{}': {}", key, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_overwrites() {
        let mut store = MemorySessionStore::new();
        assert_eq!(store.get("formData").unwrap(), None);

        store.put("formData", "first".to_string()).unwrap();
        store.put("formData", "second".to_string()).unwrap();
        assert_eq!(store.get("formData").unwrap().as_deref(), Some("second"));

        store.remove("formData").unwrap();
        assert_eq!(store.get("formData").unwrap(), None);
    }

    #[test]
    fn test_file_store_persists_between_instances() {
        let temp_dir = TempDir::new().unwrap();

        {
            let mut store = FileSessionStore::new(temp_dir.path()).unwrap();
            store.put("formData", "{}".to_string()).unwrap();
        }

        let store = FileSessionStore::new(temp_dir.path()).unwrap();
        assert_eq!(store.get("formData").unwrap().as_deref(), Some("{}"));
        assert!(temp_dir.path().join("formData.json").exists());
    }

    #[test]
    fn test_file_store_clears_on_drop() {
        let temp_dir = TempDir::new().unwrap();

        {
            let mut store = FileSessionStore::new(temp_dir.path())
                .unwrap()
                .clear_on_drop(true);
            store.put("formData", "{}".to_string()).unwrap();
            assert!(store.get("formData").unwrap().is_some());
        }

        let store = FileSessionStore::new(temp_dir.path()).unwrap();
        assert_eq!(store.get("formData").unwrap(), None);
    }

    #[test]
    fn test_remove_missing_key_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileSessionStore::new(temp_dir.path()).unwrap();
        assert!(store.remove("formData").is_ok());
    }
}
