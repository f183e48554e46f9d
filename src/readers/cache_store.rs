use crate::error::CacheError;
use crate::models::Place;
use crate::utils::constants::CACHE_FILE_EXTENSION;
use crate::utils::dates::parse_date;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One raw JSON payload per (place, date) at `<root>/<place>/<date>.json`.
///
/// Payloads are stored as received, independent of the field schema. Nothing
/// is ever expired. Not safe for concurrent use by several processes.
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

/// What the cache holds for one place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheInventory {
    pub files: usize,
    pub unreadable: usize,
    pub first_date: Option<String>,
    pub last_date: Option<String>,
}

impl CacheStore {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn place_dir(&self, place: &Place) -> PathBuf {
        self.root.join(place.id())
    }

    pub fn path_for(&self, place: &Place, date: &str) -> PathBuf {
        self.place_dir(place)
            .join(format!("{}.{}", date, CACHE_FILE_EXTENSION))
    }

    /// Cached payload, or `None` on a miss. An unreadable or unparsable file
    /// is logged and treated as a miss.
    pub fn get(&self, place: &Place, date: &str) -> Option<Value> {
        let path = self.path_for(place, date);
        if !path.exists() {
            debug!("Cache miss for {} date {}", place, date);
            return None;
        }

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Unable to read cache file {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(payload) => {
                debug!("Cache hit for {} date {} at {}", place, date, path.display());
                Some(payload)
            }
            Err(e) => {
                warn!(
                    "Cache file {} is not valid JSON, refetching: {}",
                    path.display(),
                    e
                );
                None
            }
        }
    }

    pub fn put(&self, place: &Place, date: &str, payload: &Value) -> Result<PathBuf, CacheError> {
        let path = self.path_for(place, date);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| CacheError::DirCreation(parent.to_path_buf(), e))?;
        }

        let text = serde_json::to_string_pretty(payload)
            .map_err(|e| CacheError::Serialise(path.clone(), e))?;
        fs::write(&path, text).map_err(|e| CacheError::Write(path.clone(), e))?;

        debug!("Cached {} date {} to {}", place, date, path.display());
        Ok(path)
    }

    /// Scan the place directory. A missing directory is an empty inventory.
    pub fn inventory(&self, place: &Place) -> std::io::Result<CacheInventory> {
        let dir = self.place_dir(place);
        let mut inventory = CacheInventory::default();
        if !dir.is_dir() {
            return Ok(inventory);
        }

        let mut dates = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().map_or(true, |ext| ext != CACHE_FILE_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if parse_date(stem).is_none() {
                continue;
            }

            inventory.files += 1;
            let readable = fs::read_to_string(&path)
                .ok()
                .and_then(|text| serde_json::from_str::<Value>(&text).ok())
                .is_some();
            if !readable {
                inventory.unreadable += 1;
            }
            dates.push(stem.to_string());
        }

        dates.sort();
        inventory.first_date = dates.first().cloned();
        inventory.last_date = dates.last().cloned();
        Ok(inventory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_put_then_get() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::new(dir.path());
        let place = Place::new("Norway/Oslo").unwrap();
        let payload = json!({"history": {"observations": []}});

        let path = store.put(&place, "20240101", &payload).unwrap();

        assert_eq!(path, dir.path().join("Norway").join("Oslo").join("20240101.json"));
        assert_eq!(store.get(&place, "20240101"), Some(payload));
        assert_eq!(store.get(&place, "20240102"), None);
    }

    #[test]
    fn test_corrupt_file_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::new(dir.path());
        let place = Place::new("Norway/Oslo").unwrap();
        let path = store.path_for(&place, "20240101");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{'history': {'observations': []}}").unwrap();

        assert_eq!(store.get(&place, "20240101"), None);
    }

    #[test]
    fn test_put_fails_when_place_dir_is_a_file() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::new(dir.path());
        let place = Place::new("Norway/Oslo").unwrap();
        fs::create_dir_all(dir.path().join("Norway")).unwrap();
        fs::write(dir.path().join("Norway").join("Oslo"), "not a directory").unwrap();

        let result = store.put(&place, "20240101", &json!({}));
        assert!(matches!(result, Err(CacheError::DirCreation(_, _))));
    }

    #[test]
    fn test_inventory() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::new(dir.path());
        let place = Place::new("Norway/Bergen").unwrap();

        assert_eq!(store.inventory(&place).unwrap(), CacheInventory::default());

        store.put(&place, "20240103", &json!({})).unwrap();
        store.put(&place, "20240101", &json!({})).unwrap();
        fs::write(store.path_for(&place, "20240102"), "garbage").unwrap();
        fs::write(store.place_dir(&place).join("notes.txt"), "ignored").unwrap();

        let inventory = store.inventory(&place).unwrap();
        assert_eq!(inventory.files, 3);
        assert_eq!(inventory.unreadable, 1);
        assert_eq!(inventory.first_date.as_deref(), Some("20240101"));
        assert_eq!(inventory.last_date.as_deref(), Some("20240103"));
    }
}
