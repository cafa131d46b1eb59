/// Storage for chrome.storage.local: records, settings and button placement

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wasm_bindgen::prelude::*;

use crate::error::{Result, TrackerError};
use crate::migrate;
use crate::record::{ButtonPosition, CapturePayload, Record, SettingToggle, Settings};
use chrono::{DateTime, Utc};

pub const SAVED_URLS_KEY: &str = "savedUrls";
pub const SETTINGS_KEY: &str = "settings";
pub const BUTTON_POSITION_KEY: &str = "buttonPosition";
pub const SCHEMA_VERSION_KEY: &str = "schemaVersion";

/// Layout version written by this build
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

// Import JS bridge functions
#[wasm_bindgen(module = "/extension.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getStorage(key: &str) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setStorage(key: &str, value: JsValue) -> std::result::Result<(), JsValue>;
}

/// Whole-value get/set under a key. No transactions and no partial updates.
#[allow(async_fn_in_trait)]
pub trait KeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Value>>;
    async fn set(&self, key: &str, value: Value) -> Result<()>;
}

/// `chrome.storage.local` through the JS bridge
#[derive(Debug, Default, Clone, Copy)]
pub struct ChromeStore;

impl KeyValueStore for ChromeStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let value_js = getStorage(key)
            .await
            .map_err(|e| TrackerError::storage(format!("Failed to get {}: {:?}", key, e)))?;

        if value_js.is_null() || value_js.is_undefined() {
            Ok(None)
        } else {
            Ok(Some(serde_wasm_bindgen::from_value(value_js)?))
        }
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        // Plain objects, not JS Maps, so chrome.storage can persist them
        let value_js = value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())?;

        setStorage(key, value_js)
            .await
            .map_err(|e| TrackerError::storage(format!("Failed to set {}: {:?}", key, e)))
    }
}

/// In-memory backend with switchable write failures
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: std::cell::RefCell<std::collections::HashMap<String, Value>>,
    fail_writes: std::cell::Cell<bool>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    pub fn raw(&self, key: &str) -> Option<Value> {
        self.values.borrow().get(key).cloned()
    }

    pub fn insert_raw(&self, key: &str, value: Value) {
        self.values.borrow_mut().insert(key.to_string(), value);
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        if self.fail_writes.get() {
            return Err(TrackerError::storage("QUOTA_BYTES quota exceeded"));
        }
        self.values.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }
}

/// What an upsert did to the collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created(String),
    Updated(String),
}

impl UpsertOutcome {
    pub fn id(&self) -> &str {
        match self {
            UpsertOutcome::Created(id) | UpsertOutcome::Updated(id) => id,
        }
    }
}

/// The `savedUrls` collection
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct RecordCollection {
    pub records: Vec<Record>,
}

impl RecordCollection {
    pub fn new() -> Self {
        RecordCollection {
            records: Vec::new(),
        }
    }

    pub fn from_records(records: Vec<Record>) -> Self {
        RecordCollection { records }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[cfg(test)]
    pub fn find_by_url(&self, url: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.url == url)
    }

    #[cfg(test)]
    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Merge into the record with exactly this URL, or append a new one
    pub fn upsert(
        &mut self,
        payload: CapturePayload,
        now: DateTime<Utc>,
        new_id: impl FnOnce() -> String,
    ) -> UpsertOutcome {
        match self.records.iter_mut().find(|r| r.url == payload.url) {
            Some(existing) => {
                existing.merge_capture(payload, now);
                UpsertOutcome::Updated(existing.id.clone())
            }
            None => {
                let record = Record::new(new_id(), payload, now);
                let id = record.id.clone();
                self.records.push(record);
                UpsertOutcome::Created(id)
            }
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let original_len = self.records.len();
        self.records.retain(|r| r.id != id);
        self.records.len() < original_len
    }
}

/// Typed access to the extension's storage keys
#[derive(Debug, Clone, Default)]
pub struct TrackerStore<S> {
    backend: S,
}

impl<S: KeyValueStore> TrackerStore<S> {
    pub fn new(backend: S) -> Self {
        TrackerStore { backend }
    }

    #[cfg(test)]
    pub fn backend(&self) -> &S {
        &self.backend
    }

    async fn read<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        match self.backend.get(key).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(T::default()),
        }
    }

    async fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.backend.set(key, serde_json::to_value(value)?).await
    }

    pub async fn load_records(&self) -> Result<RecordCollection> {
        self.read(SAVED_URLS_KEY).await
    }

    pub async fn save_records(&self, records: &RecordCollection) -> Result<()> {
        self.write(SAVED_URLS_KEY, records).await
    }

    pub async fn clear_records(&self) -> Result<()> {
        self.save_records(&RecordCollection::new()).await
    }

    /// Remove one record by id, returning the reduced collection
    pub async fn delete_record(&self, id: &str) -> Result<RecordCollection> {
        let mut records = self.load_records().await?;
        if records.remove(id) {
            self.save_records(&records).await?;
        } else {
            log::warn!("Delete requested for unknown record {}", id);
        }
        Ok(records)
    }

    pub async fn load_settings(&self) -> Result<Settings> {
        self.read(SETTINGS_KEY).await
    }

    pub async fn save_settings(&self, settings: &Settings) -> Result<()> {
        self.write(SETTINGS_KEY, settings).await
    }

    /// Flip one setting and write the whole settings object back
    pub async fn toggle_setting(&self, toggle: SettingToggle) -> Result<Settings> {
        let mut settings = self.load_settings().await?;
        settings.toggle(toggle);
        self.save_settings(&settings).await?;
        Ok(settings)
    }

    pub async fn load_button_position(&self) -> Result<Option<ButtonPosition>> {
        match self.backend.get(BUTTON_POSITION_KEY).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub async fn save_button_position(&self, position: &ButtonPosition) -> Result<()> {
        self.write(BUTTON_POSITION_KEY, position).await
    }

    pub async fn schema_version(&self) -> Result<u32> {
        self.read(SCHEMA_VERSION_KEY).await
    }

    /// First-install layout: no records, default settings, current schema
    pub async fn initialize_on_install(&self) -> Result<()> {
        self.save_records(&RecordCollection::new()).await?;
        self.save_settings(&Settings::default()).await?;
        self.write(SCHEMA_VERSION_KEY, &CURRENT_SCHEMA_VERSION).await
    }

    /// Bring stored data up to `CURRENT_SCHEMA_VERSION`
    pub async fn migrate(&self, now: DateTime<Utc>) -> Result<u32> {
        let found = self.schema_version().await?;

        if found > CURRENT_SCHEMA_VERSION {
            return Err(TrackerError::UnsupportedSchema {
                found,
                supported: CURRENT_SCHEMA_VERSION,
            });
        }
        if found == CURRENT_SCHEMA_VERSION {
            return Ok(found);
        }

        let raw = match self.backend.get(SAVED_URLS_KEY).await? {
            Some(Value::Array(items)) => items,
            Some(other) => {
                log::warn!("Discarding non-array {} during migration: {}", SAVED_URLS_KEY, other);
                Vec::new()
            }
            None => Vec::new(),
        };

        let records = migrate::normalize_records(raw, now);
        log::info!(
            "Migrated {} records from schema {} to {}",
            records.len(),
            found,
            CURRENT_SCHEMA_VERSION
        );

        self.save_records(&RecordCollection::from_records(records)).await?;
        self.write(SCHEMA_VERSION_KEY, &CURRENT_SCHEMA_VERSION).await?;

        Ok(CURRENT_SCHEMA_VERSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use futures::executor::block_on;
    use serde_json::json;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, day, 9, 0, 0).unwrap()
    }

    fn payload(url: &str) -> CapturePayload {
        CapturePayload {
            url: url.to_string(),
            title: "Title".to_string(),
            site_name: "Site".to_string(),
            domain: "example.com".to_string(),
            timestamp: at(1),
        }
    }

    fn collection_with(urls: &[&str]) -> RecordCollection {
        let mut records = RecordCollection::new();
        for (i, url) in urls.iter().enumerate() {
            records.upsert(payload(url), at(1), || format!("id-{}", i));
        }
        records
    }

    #[test]
    fn test_upsert_creates_then_updates() {
        let mut records = RecordCollection::new();

        let created = records.upsert(payload("https://example.com"), at(1), || "id-1".to_string());
        let updated = records.upsert(payload("https://example.com"), at(2), || "id-2".to_string());

        assert_eq!(created, UpsertOutcome::Created("id-1".to_string()));
        assert_eq!(updated, UpsertOutcome::Updated("id-1".to_string()));
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_upsert_matches_exact_url_only() {
        let mut records = RecordCollection::new();
        records.upsert(payload("https://example.com"), at(1), || "id-1".to_string());
        records.upsert(payload("https://example.com/"), at(1), || "id-2".to_string());

        assert_eq!(records.len(), 2);
        assert_eq!(records.find_by_url("https://example.com/").unwrap().id, "id-2");
    }

    #[test]
    fn test_remove_targets_one_id() {
        let mut records = collection_with(&["https://a.com", "https://b.com", "https://c.com"]);

        assert!(records.remove("id-1"));
        assert!(!records.remove("id-1"));

        assert_eq!(records.len(), 2);
        assert!(records.get("id-0").is_some());
        assert!(records.get("id-2").is_some());
    }

    #[test]
    fn test_missing_keys_decode_to_defaults() {
        let store = TrackerStore::new(MemoryStore::new());

        assert!(block_on(store.load_records()).unwrap().is_empty());
        assert_eq!(block_on(store.load_settings()).unwrap(), Settings::default());
        assert_eq!(block_on(store.load_button_position()).unwrap(), None);
        assert_eq!(block_on(store.schema_version()).unwrap(), 0);
    }

    #[test]
    fn test_records_stored_as_plain_array() {
        let store = TrackerStore::new(MemoryStore::new());
        block_on(store.save_records(&collection_with(&["https://a.com"]))).unwrap();

        let raw = store.backend().raw(SAVED_URLS_KEY).unwrap();
        assert!(raw.is_array());
        assert_eq!(raw[0]["url"], "https://a.com");
    }

    #[test]
    fn test_delete_record_persists_reduced_collection() {
        let store = TrackerStore::new(MemoryStore::new());
        block_on(store.save_records(&collection_with(&["https://a.com", "https://b.com"]))).unwrap();

        let remaining = block_on(store.delete_record("id-0")).unwrap();

        assert_eq!(remaining.len(), 1);
        let reloaded = block_on(store.load_records()).unwrap();
        assert_eq!(reloaded, remaining);
        assert_eq!(reloaded.records[0].id, "id-1");
    }

    #[test]
    fn test_clear_records() {
        let store = TrackerStore::new(MemoryStore::new());
        block_on(store.save_records(&collection_with(&["https://a.com", "https://b.com"]))).unwrap();

        block_on(store.clear_records()).unwrap();

        assert!(block_on(store.load_records()).unwrap().is_empty());
    }

    #[test]
    fn test_toggle_setting_writes_whole_object() {
        let store = TrackerStore::new(MemoryStore::new());
        store.backend().insert_raw(SETTINGS_KEY, json!({"enabled": true}));

        let settings = block_on(store.toggle_setting(SettingToggle::AutoSave)).unwrap();

        assert!(settings.auto_save);
        let raw = store.backend().raw(SETTINGS_KEY).unwrap();
        assert_eq!(raw, json!({"enabled": true, "showNotifications": true, "autoSave": true}));
    }

    #[test]
    fn test_button_position_round_trip() {
        let store = TrackerStore::new(MemoryStore::new());
        let position = ButtonPosition {
            top: "120px".to_string(),
            right: "auto".to_string(),
            left: "0px".to_string(),
            bottom: "auto".to_string(),
        };

        block_on(store.save_button_position(&position)).unwrap();

        assert_eq!(block_on(store.load_button_position()).unwrap(), Some(position));
    }

    #[test]
    fn test_initialize_on_install() {
        let store = TrackerStore::new(MemoryStore::new());

        block_on(store.initialize_on_install()).unwrap();

        assert_eq!(store.backend().raw(SAVED_URLS_KEY), Some(json!([])));
        assert_eq!(
            store.backend().raw(SETTINGS_KEY),
            Some(json!({"enabled": true, "showNotifications": true, "autoSave": false}))
        );
        assert_eq!(block_on(store.schema_version()).unwrap(), CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn test_migrate_from_unversioned_layout() {
        let store = TrackerStore::new(MemoryStore::new());
        store.backend().insert_raw(
            SAVED_URLS_KEY,
            json!([
                {
                    "id": "legacy1",
                    "url": "https://www.example.com/page",
                    "title": "",
                    "timestamp": "2024-01-01T00:00:00.000Z",
                    "createdAt": "2024-01-01T00:00:00.000Z"
                }
            ]),
        );

        let version = block_on(store.migrate(at(5))).unwrap();

        assert_eq!(version, CURRENT_SCHEMA_VERSION);
        let records = block_on(store.load_records()).unwrap();
        let record = &records.records[0];
        assert_eq!(record.id, "legacy1");
        assert_eq!(record.domain, "www.example.com");
        assert_eq!(record.site_name, "Example.com");
        assert_eq!(record.last_saved, Some(record.created_at));
        assert_eq!(block_on(store.schema_version()).unwrap(), CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn test_migrate_is_noop_at_current_version() {
        let store = TrackerStore::new(MemoryStore::new());
        block_on(store.initialize_on_install()).unwrap();
        store.backend().fail_writes(true);

        assert_eq!(block_on(store.migrate(at(5))).unwrap(), CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn test_migrate_rejects_newer_schema() {
        let store = TrackerStore::new(MemoryStore::new());
        store.backend().insert_raw(SCHEMA_VERSION_KEY, json!(9));

        let result = block_on(store.migrate(at(5)));

        assert_eq!(
            result,
            Err(TrackerError::UnsupportedSchema { found: 9, supported: CURRENT_SCHEMA_VERSION })
        );
    }
}
