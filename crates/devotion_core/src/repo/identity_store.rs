//! Identity statement persistence.

use crate::model::completion::IdentityStatement;
use crate::repo::codec::{decode_value, encode_value};
use crate::repo::kv_repo::{KvRepository, RecordKind, RepoResult, StorageKey};
use chrono::Utc;
use log::info;
use std::collections::BTreeMap;

/// Typed store for one identity statement per section.
pub struct IdentityStore<K: KvRepository> {
    kv: K,
}

impl<K: KvRepository> IdentityStore<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    /// Saves (overwrites) the statement of one section.
    pub fn save(
        &self,
        section_key: &str,
        section_title: &str,
        statement: &str,
    ) -> RepoResult<IdentityStatement> {
        let key = StorageKey::identity(section_key)?;
        let record = IdentityStatement {
            section_key: key.section_key().to_string(),
            section_title: section_title.to_string(),
            statement: statement.to_string(),
            completed_at: Utc::now(),
        };
        self.kv.set(&key, &encode_value(&record)?)?;
        info!(
            "event=identity_save module=repo status=ok section={} chars={}",
            key.section_key(),
            statement.chars().count()
        );
        Ok(record)
    }

    /// Stores a record keeping its timestamp (legacy import).
    pub fn put(&self, record: &IdentityStatement) -> RepoResult<()> {
        let key = StorageKey::identity(&record.section_key)?;
        let mut normalized = record.clone();
        normalized.section_key = key.section_key().to_string();
        self.kv.set(&key, &encode_value(&normalized)?)
    }

    pub fn load(&self, section_key: &str) -> RepoResult<Option<IdentityStatement>> {
        let key = StorageKey::identity(section_key)?;
        Ok(self
            .kv
            .get(&key)?
            .and_then(|raw| decode_value(&key, &raw)))
    }

    /// Statement text only.
    pub fn load_statement(&self, section_key: &str) -> RepoResult<Option<String>> {
        Ok(self.load(section_key)?.map(|record| record.statement))
    }

    pub fn has(&self, section_key: &str) -> RepoResult<bool> {
        Ok(self.load(section_key)?.is_some())
    }

    /// Every decodable statement keyed by its section.
    pub fn list_all(&self) -> RepoResult<BTreeMap<String, IdentityStatement>> {
        let mut statements = BTreeMap::new();
        for entry in self.kv.list(RecordKind::Identity, None)? {
            if let Some(record) = decode_value::<IdentityStatement>(&entry.key, &entry.value) {
                statements.insert(record.section_key.clone(), record);
            }
        }
        Ok(statements)
    }

    pub fn clear(&self, section_key: &str) -> RepoResult<bool> {
        let key = StorageKey::identity(section_key)?;
        self.kv.delete(&key)
    }

    pub fn clear_all(&self) -> RepoResult<usize> {
        self.kv.delete_matching(RecordKind::Identity, None)
    }
}
