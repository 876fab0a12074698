use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{CareAction, Notification, Permission, Plant};

pub const USER_KEY: &str = "fujiwara_user";
pub const PLANTS_KEY: &str = "fujiwara_plants";
pub const NOTIFICATIONS_KEY: &str = "fujiwara_notifications";
pub const SHOW_ARCHIVE_KEY: &str = "showOldNotifications";
pub const PERMISSION_KEY: &str = "fujiwara_notification_permission";

/// String key-value storage with the semantics of a browser's local storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;
}

#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// All entries live in a single JSON object on disk. Every `set` writes the
/// whole file back through a temporary sibling and a rename.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| Error::Corrupt {
                key: path.display().to_string(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), keys = entries.len(), "store opened");
        Ok(Self { path, entries })
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&self.entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }
}

/// Typed records over a [`KeyValueStore`].
pub struct Repository<S> {
    store: S,
}

impl<S: KeyValueStore> Repository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn user(&self) -> Result<Option<String>> {
        self.store.get(USER_KEY)
    }

    pub fn set_user(&mut self, name: &str) -> Result<()> {
        self.store.set(USER_KEY, name.to_string())
    }

    pub fn plants(&self) -> Result<Vec<Plant>> {
        self.read_list(PLANTS_KEY)
    }

    pub fn save_plants(&mut self, plants: &[Plant]) -> Result<()> {
        self.store.set(PLANTS_KEY, serde_json::to_string(plants)?)
    }

    pub fn notifications(&self) -> Result<Vec<Notification>> {
        self.read_list(NOTIFICATIONS_KEY)
    }

    pub fn save_notifications(&mut self, notifications: &[Notification]) -> Result<()> {
        self.store.set(NOTIFICATIONS_KEY, serde_json::to_string(notifications)?)
    }

    pub fn is_done(&self, action: CareAction, title: &str, day: NaiveDate) -> Result<bool> {
        Ok(self.store.get(&done_key(action, title, day))?.as_deref() == Some("true"))
    }

    pub fn mark_done(&mut self, action: CareAction, title: &str, day: NaiveDate) -> Result<()> {
        self.store.set(&done_key(action, title, day), "true".to_string())
    }

    #[cfg(test)]
    pub fn next_due(&self, action: CareAction, title: &str) -> Result<Option<String>> {
        self.store.get(&next_key(action, title))
    }

    pub fn set_next_due(
        &mut self,
        action: CareAction,
        title: &str,
        at: DateTime<Utc>,
    ) -> Result<()> {
        self.store.set(&next_key(action, title), at.to_rfc3339())
    }

    /// Only the literal `"false"` hides the archive; anything else shows it.
    pub fn show_archive(&self) -> Result<bool> {
        Ok(self.store.get(SHOW_ARCHIVE_KEY)?.as_deref() != Some("false"))
    }

    pub fn set_show_archive(&mut self, show: bool) -> Result<()> {
        self.store.set(SHOW_ARCHIVE_KEY, show.to_string())
    }

    pub fn permission(&self) -> Result<Permission> {
        Ok(self
            .store
            .get(PERMISSION_KEY)?
            .map(|v| Permission::parse(&v))
            .unwrap_or_default())
    }

    pub fn set_permission(&mut self, permission: Permission) -> Result<()> {
        self.store.set(PERMISSION_KEY, permission.as_str().to_string())
    }

    fn read_list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        match self.store.get(key)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|source| Error::Corrupt {
                key: key.to_string(),
                source,
            }),
            None => Ok(Vec::new()),
        }
    }
}

fn done_key(action: CareAction, title: &str, day: NaiveDate) -> String {
    format!("fujiwara_done_{}_{}_{}", action, title, day.format("%Y-%m-%d"))
}

fn next_key(action: CareAction, title: &str) -> String {
    format!("fujiwara_next_{}_{}", action, title)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn missing_lists_read_as_empty() {
        let repo = Repository::new(MemoryStore::default());
        assert!(repo.plants().unwrap().is_empty());
        assert!(repo.notifications().unwrap().is_empty());
        assert_eq!(repo.user().unwrap(), None);
    }

    #[test]
    fn corrupt_list_fails_the_read() {
        let mut store = MemoryStore::default();
        store.set(PLANTS_KEY, "[{not json".into()).unwrap();
        let repo = Repository::new(store);
        match repo.plants() {
            Err(Error::Corrupt { key, .. }) => assert_eq!(key, PLANTS_KEY),
            other => panic!("expected corrupt error, got {other:?}"),
        }
    }

    #[test]
    fn plants_and_notifications_survive_a_file_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let tomat = Plant::new("Tomat".into(), day(2026, 10, 1));
        let mut cabai = Plant::new("Cabai".into(), day(2026, 9, 20));
        cabai.fertilizer = true;
        let plants = vec![tomat.clone(), cabai.clone()];
        let reminder = Notification::new(
            "Beri Pupuk NPK 16 - Cabai".into(),
            "Jangan lupa beri pupuk.".into(),
            cabai.id,
            CareAction::Fertilizer,
            Some(10),
            Utc::now(),
        );

        let mut repo = Repository::new(JsonFileStore::open(&path).unwrap());
        repo.save_plants(&plants).unwrap();
        repo.save_notifications(std::slice::from_ref(&reminder)).unwrap();
        drop(repo);

        let repo = Repository::new(JsonFileStore::open(&path).unwrap());
        assert_eq!(repo.plants().unwrap(), plants);
        assert_eq!(repo.notifications().unwrap(), vec![reminder]);
    }

    #[test]
    fn archive_preference_maps_only_false_to_hidden() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let reopen = || Repository::new(JsonFileStore::open(&path).unwrap());

        assert!(reopen().show_archive().unwrap());

        reopen().set_show_archive(false).unwrap();
        assert!(!reopen().show_archive().unwrap());

        reopen().set_show_archive(true).unwrap();
        assert!(reopen().show_archive().unwrap());

        let mut store = JsonFileStore::open(&path).unwrap();
        store.set(SHOW_ARCHIVE_KEY, "nope".into()).unwrap();
        assert!(reopen().show_archive().unwrap());
    }

    #[test]
    fn done_marker_is_scoped_to_the_day() {
        let mut repo = Repository::new(MemoryStore::default());
        let title = "Waktunya Menyiram - Tomat";
        repo.mark_done(CareAction::Water, title, day(2026, 10, 17)).unwrap();
        assert!(repo.is_done(CareAction::Water, title, day(2026, 10, 17)).unwrap());
        assert!(!repo.is_done(CareAction::Water, title, day(2026, 10, 18)).unwrap());
        assert!(!repo.is_done(CareAction::Move, title, day(2026, 10, 17)).unwrap());
    }

    #[test]
    fn empty_file_opens_as_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "").unwrap();
        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get(USER_KEY).unwrap(), None);
    }
}
