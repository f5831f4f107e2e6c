//! JSON File Membership Store Adapter
//!
//! Persists every membership record in a single JSON object keyed by
//! canonical user id. The whole map lives in memory behind one async mutex;
//! each upsert mutates the map and rewrites the file before releasing the
//! lock, so concurrent writers never lose an update.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

use crate::domain::foundation::UserId;
use crate::domain::membership::MembershipRecord;
use crate::ports::{MembershipStore, StoreError};

type RecordMap = BTreeMap<String, MembershipRecord>;

/// File-backed membership store.
#[derive(Debug)]
pub struct JsonFileMembershipStore {
    path: PathBuf,
    records: Mutex<RecordMap>,
}

impl JsonFileMembershipStore {
    /// Open the store at `path`, loading existing records.
    ///
    /// A missing or empty file is an empty store; the file is created on the
    /// first write.
    ///
    /// # Example
    /// ```ignore
    /// let store = JsonFileMembershipStore::open("./data/memberships.json").await?;
    /// ```
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let records = load(&path).await?;

        tracing::debug!(path = %path.display(), records = records.len(), "Membership store opened");

        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }

    /// Sibling temp file used for atomic replacement.
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("memberships.json"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn persist(&self, records: &RecordMap) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(records)
            .map_err(|e| StoreError::SerializationFailed(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::IoError(e.to_string()))?;
        }

        let temp = self.temp_path();
        fs::write(&temp, json)
            .await
            .map_err(|e| StoreError::IoError(e.to_string()))?;
        fs::rename(&temp, &self.path)
            .await
            .map_err(|e| StoreError::IoError(e.to_string()))?;

        Ok(())
    }
}

async fn load(path: &Path) -> Result<RecordMap, StoreError> {
    let contents = match fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(RecordMap::new()),
        Err(e) => return Err(StoreError::IoError(e.to_string())),
    };

    if contents.trim().is_empty() {
        return Ok(RecordMap::new());
    }

    let raw: RecordMap = serde_json::from_str(&contents)
        .map_err(|e| StoreError::DeserializationFailed(e.to_string()))?;

    // Files written before ids were canonicalized may carry mixed-case keys.
    let mut records = RecordMap::new();
    for (key, record) in raw {
        match UserId::new(&key) {
            Ok(user_id) => {
                records.insert(user_id.as_str().to_string(), record);
            }
            Err(_) => tracing::warn!(key = %key, "Dropping membership record with blank user id"),
        }
    }

    Ok(records)
}

#[async_trait]
impl MembershipStore for JsonFileMembershipStore {
    async fn get(&self, user_id: &UserId) -> Result<Option<MembershipRecord>, StoreError> {
        let records = self.records.lock().await;
        Ok(records.get(user_id.as_str()).cloned())
    }

    async fn upsert(&self, user_id: &UserId, record: MembershipRecord) -> Result<(), StoreError> {
        let mut records = self.records.lock().await;
        let previous = records.insert(user_id.as_str().to_string(), record);

        if let Err(e) = self.persist(&records).await {
            // Keep memory consistent with what is on disk.
            match previous {
                Some(previous) => records.insert(user_id.as_str().to_string(), previous),
                None => records.remove(user_id.as_str()),
            };
            return Err(e);
        }

        Ok(())
    }
}
