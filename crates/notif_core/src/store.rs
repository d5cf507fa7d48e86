use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};
use thiserror::Error;

use crate::platform::PreferenceStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("preference store io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("namespace file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unable to encode namespace `{namespace}`: {source}")]
    Encode {
        namespace: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid namespace `{0}`")]
    InvalidNamespace(String),
}

type Namespace = BTreeMap<String, String>;

/// In-process store. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    namespaces: RwLock<HashMap<String, Namespace>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .namespaces
            .read()
            .get(namespace)
            .and_then(|entries| entries.get(key))
            .cloned())
    }

    fn put(&self, namespace: &str, key: &str, value: &str) -> Result<(), StoreError> {
        self.namespaces
            .write()
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, namespace: &str, key: &str) -> Result<(), StoreError> {
        if let Some(entries) = self.namespaces.write().get_mut(namespace) {
            entries.remove(key);
        }
        Ok(())
    }

    fn entries(&self, namespace: &str) -> Result<Vec<(String, String)>, StoreError> {
        Ok(self
            .namespaces
            .read()
            .get(namespace)
            .map(|entries| {
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Store keeping one `<namespace>.json` object per namespace under `root`.
#[derive(Debug)]
pub struct JsonFileStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|source| StoreError::Io {
            path: root.clone(),
            source,
        })?;
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    fn namespace_path(&self, namespace: &str) -> Result<PathBuf, StoreError> {
        let valid = !namespace.is_empty()
            && namespace
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
            && !namespace.starts_with('.');
        if !valid {
            return Err(StoreError::InvalidNamespace(namespace.to_string()));
        }
        Ok(self.root.join(format!("{namespace}.json")))
    }

    fn load(&self, namespace: &str) -> Result<Namespace, StoreError> {
        let path = self.namespace_path(namespace)?;
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Namespace::new()),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        if raw.trim().is_empty() {
            return Ok(Namespace::new());
        }
        serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt { path, source })
    }

    fn save(&self, namespace: &str, entries: &Namespace) -> Result<(), StoreError> {
        let path = self.namespace_path(namespace)?;
        let encoded =
            serde_json::to_string_pretty(entries).map_err(|source| StoreError::Encode {
                namespace: namespace.to_string(),
                source,
            })?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, encoded).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StoreError::Io { path, source })
    }

    /// Applies `edit` and rewrites the namespace file only if it reports a change.
    fn update(
        &self,
        namespace: &str,
        edit: impl FnOnce(&mut Namespace) -> bool,
    ) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();
        let mut entries = self.load(namespace)?;
        if !edit(&mut entries) {
            return Ok(());
        }
        self.save(namespace, &entries)
    }
}

impl PreferenceStore for JsonFileStore {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load(namespace)?.remove(key))
    }

    fn put(&self, namespace: &str, key: &str, value: &str) -> Result<(), StoreError> {
        self.update(namespace, |entries| {
            entries.insert(key.to_string(), value.to_string()).as_deref() != Some(value)
        })
    }

    fn remove(&self, namespace: &str, key: &str) -> Result<(), StoreError> {
        self.update(namespace, |entries| entries.remove(key).is_some())
    }

    fn entries(&self, namespace: &str) -> Result<Vec<(String, String)>, StoreError> {
        Ok(self.load(namespace)?.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn memory_store_is_namespaced() {
        let store = MemoryStore::new();
        store.put("a", "1", "one").unwrap();
        store.put("b", "1", "uno").unwrap();
        assert_eq!(store.get("a", "1").unwrap().as_deref(), Some("one"));
        store.remove("a", "1").unwrap();
        assert!(store.get("a", "1").unwrap().is_none());
        assert_eq!(
            store.entries("b").unwrap(),
            vec![("1".to_string(), "uno".to_string())]
        );
        assert!(store.entries("missing").unwrap().is_empty());
    }

    #[test]
    fn file_store_survives_reopen() {
        let temp = tempdir().expect("tempdir");
        {
            let store = JsonFileStore::open(temp.path()).unwrap();
            store.put("LocalNotification", "3", r#"{"id":3}"#).unwrap();
            store.put("LocalNotification", "4", r#"{"id":4}"#).unwrap();
            store.remove("LocalNotification", "4").unwrap();
        }
        let reopened = JsonFileStore::open(temp.path()).unwrap();
        assert_eq!(
            reopened.entries("LocalNotification").unwrap(),
            vec![("3".to_string(), r#"{"id":3}"#.to_string())]
        );
        assert!(temp.path().join("LocalNotification.json").is_file());
        assert!(!temp.path().join("LocalNotification.json.tmp").exists());
    }

    #[test]
    fn file_store_remove_of_absent_key_leaves_files_alone() {
        let temp = tempdir().expect("tempdir");
        let store = JsonFileStore::open(temp.path()).unwrap();
        let path = temp.path().join("LocalNotification.json");

        store.remove("LocalNotification", "1").unwrap();
        assert!(!path.exists());

        store.put("LocalNotification", "1", "{}").unwrap();
        fs::write(&path, r#"{"1": "{}", "2": "kept verbatim"}"#).unwrap();
        store.remove("LocalNotification", "3").unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            r#"{"1": "{}", "2": "kept verbatim"}"#
        );

        store.remove("LocalNotification", "2").unwrap();
        assert_eq!(
            store.entries("LocalNotification").unwrap(),
            vec![("1".to_string(), "{}".to_string())]
        );
    }

    #[test]
    fn file_store_rejects_path_like_namespaces() {
        let temp = tempdir().expect("tempdir");
        let store = JsonFileStore::open(temp.path()).unwrap();
        assert!(matches!(
            store.put("../escape", "k", "v"),
            Err(StoreError::InvalidNamespace(_))
        ));
    }

    #[test]
    fn file_store_reports_corrupt_namespace() {
        let temp = tempdir().expect("tempdir");
        fs::write(temp.path().join("broken.json"), "[not an object").unwrap();
        let store = JsonFileStore::open(temp.path()).unwrap();
        assert!(matches!(
            store.entries("broken"),
            Err(StoreError::Corrupt { .. })
        ));
    }
}
