use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

/// A patient record as persisted in the document collection.
///
/// `created_date` is set once at creation and never changes; `updated_date`
/// is refreshed on every save of a replacement record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub disease: String,
    pub description: String,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

impl Patient {
    /// Construct a fresh record with a generated id and both timestamps set to now.
    pub fn new(name: String, age: u32, disease: String, description: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            age,
            disease,
            description,
            created_date: now,
            updated_date: now,
        }
    }
}

/// Errors from the patient store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no patient record with id {id}")]
    NotFound { id: String },

    #[error("patient store unavailable: {0}")]
    Unavailable(#[from] std::io::Error),

    #[error("corrupt collection file: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Document-collection client for patient records.
///
/// Records live in an in-memory map keyed by id and are mirrored to a single
/// JSON collection file under the configured data directory. The file is read
/// once at open and rewritten after every mutation, so concurrent in-flight
/// requests share one consistent view behind the lock.
pub struct PatientStore {
    path: PathBuf,
    records: RwLock<HashMap<String, Patient>>,
}

impl PatientStore {
    /// Open the collection, loading any existing records from disk.
    pub fn open(data_dir: &Path, collection: &str) -> Result<Self, StoreError> {
        fs::create_dir_all(data_dir)?;
        let path = data_dir.join(format!("{collection}.json"));

        let records = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            let loaded: Vec<Patient> = serde_json::from_str(&raw)?;
            loaded.into_iter().map(|p| (p.id.clone(), p)).collect()
        } else {
            HashMap::new()
        };

        info!(
            collection = %collection,
            records = records.len(),
            "Patient collection opened"
        );

        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    /// All records, oldest first. Empty vec when the collection is empty.
    pub async fn list_all(&self) -> Result<Vec<Patient>, StoreError> {
        let records = self.records.read().await;
        let mut all: Vec<Patient> = records.values().cloned().collect();
        all.sort_by(|a, b| (a.created_date, &a.id).cmp(&(b.created_date, &b.id)));
        Ok(all)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Patient, StoreError> {
        let records = self.records.read().await;
        records
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }

    /// Insert or overwrite the record, returning the persisted form.
    pub async fn save(&self, patient: Patient) -> Result<Patient, StoreError> {
        let mut records = self.records.write().await;
        records.insert(patient.id.clone(), patient.clone());
        self.persist(&records)?;
        Ok(patient)
    }

    /// Remove the record if present. Succeeds silently on an unknown id.
    pub async fn delete_by_id(&self, id: &str) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        if records.remove(id).is_some() {
            self.persist(&records)?;
        }
        Ok(())
    }

    /// Drop every record in the collection.
    pub async fn delete_all(&self) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        records.clear();
        self.persist(&records)?;
        Ok(())
    }

    pub async fn count(&self) -> usize {
        self.records.read().await.len()
    }

    // Rewrite the collection file from the in-memory map. Caller holds the
    // write lock, so the file never sees a half-applied mutation.
    fn persist(&self, records: &HashMap<String, Patient>) -> Result<(), StoreError> {
        let all: Vec<&Patient> = records.values().collect();
        let raw = serde_json::to_string(&all)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> Patient {
        Patient::new(
            "Alice".to_string(),
            30,
            "flu".to_string(),
            "mild".to_string(),
        )
    }

    #[tokio::test]
    async fn save_then_find_round_trips() {
        let dir = tempdir().unwrap();
        let store = PatientStore::open(dir.path(), "patients").unwrap();

        let saved = store.save(sample()).await.unwrap();
        let found = store.find_by_id(&saved.id).await.unwrap();

        assert_eq!(found, saved);
        assert_eq!(found.name, "Alice");
        assert_eq!(found.age, 30);
    }

    #[tokio::test]
    async fn new_record_timestamps_are_equal() {
        let patient = sample();
        assert_eq!(patient.created_date, patient.updated_date);
    }

    #[tokio::test]
    async fn find_unknown_id_is_not_found() {
        let dir = tempdir().unwrap();
        let store = PatientStore::open(dir.path(), "patients").unwrap();

        let err = store.find_by_id("missing").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = PatientStore::open(dir.path(), "patients").unwrap();

        let saved = store.save(sample()).await.unwrap();
        store.delete_by_id(&saved.id).await.unwrap();
        store.delete_by_id(&saved.id).await.unwrap();
        store.delete_by_id("never-existed").await.unwrap();

        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_all_on_empty_collection_is_empty() {
        let dir = tempdir().unwrap();
        let store = PatientStore::open(dir.path(), "patients").unwrap();

        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_all_clears_the_collection() {
        let dir = tempdir().unwrap();
        let store = PatientStore::open(dir.path(), "patients").unwrap();

        store.save(sample()).await.unwrap();
        store.save(sample()).await.unwrap();
        assert_eq!(store.count().await, 2);

        store.delete_all().await.unwrap();
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn records_survive_reopen() {
        let dir = tempdir().unwrap();
        let saved = {
            let store = PatientStore::open(dir.path(), "patients").unwrap();
            store.save(sample()).await.unwrap()
        };

        let reopened = PatientStore::open(dir.path(), "patients").unwrap();
        let found = reopened.find_by_id(&saved.id).await.unwrap();
        assert_eq!(found, saved);
    }

    #[tokio::test]
    async fn overwrite_keeps_one_record_per_id() {
        let dir = tempdir().unwrap();
        let store = PatientStore::open(dir.path(), "patients").unwrap();

        let original = store.save(sample()).await.unwrap();
        let replacement = Patient {
            age: 31,
            updated_date: Utc::now(),
            ..original.clone()
        };
        store.save(replacement.clone()).await.unwrap();

        let all = store.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].age, 31);
        assert_eq!(all[0].created_date, original.created_date);
        assert!(all[0].updated_date >= all[0].created_date);
    }
}
