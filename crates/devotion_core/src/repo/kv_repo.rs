//! Structured key-value repository and SQLite implementation.
//!
//! # Responsibility
//! - Own the one storage namespace for every persisted record kind.
//! - Build keys from typed parts instead of ad hoc string concatenation.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - A key is `(kind, section_key, slot)`; `section_key` is trimmed and
//!   never blank.
//! - `set` is a full overwrite (upsert); there is no partial patch.
//! - Values are opaque UTF-8 text here; typed stores own (de)serialization.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::assessment::AssessmentPhase;
use crate::model::draft::DraftField;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const LEGACY_PREFIX: &str = "cost_";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for key-value persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Key parts cannot form a valid storage key.
    InvalidKey(String),
    /// Value could not be encoded for storage.
    Serialization(serde_json::Error),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted row cannot be mapped back to a key.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidKey(message) => write!(f, "invalid storage key: {message}"),
            Self::Serialization(err) => write!(f, "failed to encode stored value: {err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "storage requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "storage requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "storage requires column `{column}` in table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted entry: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Record family stored under one key namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecordKind {
    Assessment,
    DayCompletion,
    Identity,
    Draft,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Assessment => "assessment",
            Self::DayCompletion => "day_completion",
            Self::Identity => "identity",
            Self::Draft => "draft",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "assessment" => Some(Self::Assessment),
            "day_completion" => Some(Self::DayCompletion),
            "identity" => Some(Self::Identity),
            "draft" => Some(Self::Draft),
            _ => None,
        }
    }
}

/// Structured storage key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StorageKey {
    kind: RecordKind,
    section_key: String,
    slot: String,
}

impl StorageKey {
    /// Builds a key from raw parts.
    ///
    /// # Errors
    /// - `InvalidKey` when `section_key` is blank after trim.
    pub fn new(
        kind: RecordKind,
        section_key: &str,
        slot: impl Into<String>,
    ) -> RepoResult<Self> {
        let section_key = normalize_section_key(section_key)?;
        Ok(Self {
            kind,
            section_key,
            slot: slot.into(),
        })
    }

    /// Key of the assessment record for one phase.
    pub fn assessment(section_key: &str, phase: AssessmentPhase) -> RepoResult<Self> {
        Self::new(RecordKind::Assessment, section_key, phase.as_str())
    }

    /// Key of the completion flag for one day.
    pub fn day_completion(section_key: &str, day: u32) -> RepoResult<Self> {
        Self::new(RecordKind::DayCompletion, section_key, day.to_string())
    }

    /// Key of the section identity statement.
    pub fn identity(section_key: &str) -> RepoResult<Self> {
        Self::new(RecordKind::Identity, section_key, "")
    }

    /// Key of one free-text draft slot of a day exercise.
    pub fn draft(section_key: &str, day: u32, field: DraftField, index: usize) -> RepoResult<Self> {
        Self::new(
            RecordKind::Draft,
            section_key,
            format!("{}{}/{index}", draft_day_prefix(day), field.as_str()),
        )
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn section_key(&self) -> &str {
        &self.section_key
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    /// Renders the flat key format used by browser local storage exports.
    pub fn legacy_key(&self) -> String {
        match self.kind {
            RecordKind::Assessment => {
                format!("{LEGACY_PREFIX}assessment_{}_{}", self.section_key, self.slot)
            }
            RecordKind::DayCompletion => format!(
                "{LEGACY_PREFIX}day_completion_{}_day{}",
                self.section_key, self.slot
            ),
            RecordKind::Identity => format!("{LEGACY_PREFIX}identity_{}", self.section_key),
            RecordKind::Draft => format!(
                "{LEGACY_PREFIX}draft_{}_day{}",
                self.section_key,
                self.slot.replace('/', "_")
            ),
        }
    }
}

impl Display for StorageKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.kind.as_str(), self.section_key, self.slot)
    }
}

/// Slot prefix shared by every draft of one day.
pub(crate) fn draft_day_prefix(day: u32) -> String {
    format!("{day}/")
}

/// Normalizes a section key for storage.
pub fn normalize_section_key(section_key: &str) -> RepoResult<String> {
    let trimmed = section_key.trim();
    if trimmed.is_empty() {
        return Err(RepoError::InvalidKey(
            "section key must not be blank".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// One stored key-value row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvEntry {
    pub key: StorageKey,
    pub value: String,
    /// Epoch milliseconds of the last overwrite.
    pub updated_at: i64,
}

/// Repository interface for structured key-value storage.
pub trait KvRepository {
    /// Reads one raw value.
    fn get(&self, key: &StorageKey) -> RepoResult<Option<String>>;
    /// Inserts or fully replaces one value.
    fn set(&self, key: &StorageKey, value: &str) -> RepoResult<()>;
    /// Deletes one value. Returns whether a row existed.
    fn delete(&self, key: &StorageKey) -> RepoResult<bool>;
    /// Lists entries of one kind, optionally scoped to one section.
    ///
    /// Ordered by `section_key ASC, slot ASC`.
    fn list(&self, kind: RecordKind, section_key: Option<&str>) -> RepoResult<Vec<KvEntry>>;
    /// Deletes entries of one kind, optionally scoped to one section.
    fn delete_matching(&self, kind: RecordKind, section_key: Option<&str>) -> RepoResult<usize>;
    /// Storage-wide reset of every kind.
    fn clear_all(&self) -> RepoResult<usize>;
}

/// SQLite-backed key-value repository.
#[derive(Debug, Clone, Copy)]
pub struct SqliteKvRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKvRepository<'conn> {
    /// Creates repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` for foreign schemas.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_kv_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl KvRepository for SqliteKvRepository<'_> {
    fn get(&self, key: &StorageKey) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value
                 FROM kv_entries
                 WHERE kind = ?1 AND section_key = ?2 AND slot = ?3;",
                params![key.kind.as_str(), key.section_key, key.slot],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &StorageKey, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (kind, section_key, slot, value)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (kind, section_key, slot) DO UPDATE
             SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key.kind.as_str(), key.section_key, key.slot, value],
        )?;
        Ok(())
    }

    fn delete(&self, key: &StorageKey) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM kv_entries
             WHERE kind = ?1 AND section_key = ?2 AND slot = ?3;",
            params![key.kind.as_str(), key.section_key, key.slot],
        )?;
        Ok(changed > 0)
    }

    fn list(&self, kind: RecordKind, section_key: Option<&str>) -> RepoResult<Vec<KvEntry>> {
        let mut sql = String::from(
            "SELECT kind, section_key, slot, value, updated_at
             FROM kv_entries
             WHERE kind = ?",
        );
        let mut bind_values = vec![Value::Text(kind.as_str().to_string())];
        if let Some(section_key) = section_key {
            sql.push_str(" AND section_key = ?");
            bind_values.push(Value::Text(normalize_section_key(section_key)?));
        }
        sql.push_str(" ORDER BY section_key ASC, slot ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }
        Ok(entries)
    }

    fn delete_matching(&self, kind: RecordKind, section_key: Option<&str>) -> RepoResult<usize> {
        let changed = match section_key {
            Some(section_key) => self.conn.execute(
                "DELETE FROM kv_entries WHERE kind = ?1 AND section_key = ?2;",
                params![kind.as_str(), normalize_section_key(section_key)?],
            )?,
            None => self
                .conn
                .execute("DELETE FROM kv_entries WHERE kind = ?1;", [kind.as_str()])?,
        };
        Ok(changed)
    }

    fn clear_all(&self) -> RepoResult<usize> {
        let changed = self.conn.execute("DELETE FROM kv_entries;", [])?;
        Ok(changed)
    }
}

fn parse_entry_row(row: &Row<'_>) -> RepoResult<KvEntry> {
    let kind_text: String = row.get("kind")?;
    let kind = RecordKind::parse(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid kind `{kind_text}` in kv_entries.kind"))
    })?;
    let section_key: String = row.get("section_key")?;

    Ok(KvEntry {
        key: StorageKey::new(kind, &section_key, row.get::<_, String>("slot")?)?,
        value: row.get("value")?,
        updated_at: row.get("updated_at")?,
    })
}

fn ensure_kv_connection_ready(conn: &Connection) -> RepoResult<()> {
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let expected_version = latest_version();
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "kv_entries")? {
        return Err(RepoError::MissingRequiredTable("kv_entries"));
    }

    for column in ["kind", "section_key", "slot", "value", "updated_at"] {
        if !table_has_column(conn, "kv_entries", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "kv_entries",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
