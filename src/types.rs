use rusqlite::types::{FromSql, FromSqlResult, Value, ValueRef};
use std::fmt;
use std::path::PathBuf;

/// One row of a source export's `channel_members` table.
///
/// Values are carried exactly as SQLite returned them so the consolidated
/// store receives the same NULLs, numbers, text and blobs as the source.
#[derive(Debug, Clone, PartialEq)]
pub struct MembershipRecord {
    pub user_id: Value,
    pub display_name: Value,
    pub guild_id: Value,
    pub guild_name: Value,
    pub roles: Value,
    pub status: Value,
    pub platforms: Value,
}

/// A membership row as stored in the consolidated store, tagged with the file it came from
#[derive(Debug, Clone, PartialEq)]
pub struct ConsolidatedRecord {
    pub member: MembershipRecord,
    pub source_db: String,
}

impl ConsolidatedRecord {
    pub fn tagged(member: MembershipRecord, source_db: impl Into<String>) -> Self {
        Self {
            member,
            source_db: source_db.into(),
        }
    }
}

/// A value read back from the consolidated store.
///
/// Its TEXT columns hold text, NULL or blobs; numbers only appear if a
/// store was written by something else and are read as their text form.
/// NULL and the empty string stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Cell {
    Null,
    Text(String),
    Blob(Vec<u8>),
}

impl Cell {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl FromSql for Cell {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Ok(match value {
            ValueRef::Null => Cell::Null,
            ValueRef::Integer(i) => Cell::Text(i.to_string()),
            ValueRef::Real(f) => Cell::Text(f.to_string()),
            ValueRef::Text(bytes) => Cell::Text(String::from_utf8_lossy(bytes).into_owned()),
            ValueRef::Blob(bytes) => Cell::Blob(bytes.to_vec()),
        })
    }
}

/// Console rendering: NULL prints as `NULL`, blobs as lossy UTF-8
impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => write!(f, "NULL"),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Blob(bytes) => write!(f, "{}", String::from_utf8_lossy(bytes)),
        }
    }
}

/// A distinct (guildId, guildName) pair observed in the consolidated store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GuildEntry {
    pub guild_id: Cell,
    pub guild_name: Cell,
}

impl fmt::Display for GuildEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Guild Name: {} (ID: {})", self.guild_name, self.guild_id)
    }
}

/// A user present in both compared guilds, with the name they use in each
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonUser {
    pub user_id: Cell,
    pub name_in_a: Cell,
    pub name_in_b: Cell,
}

/// Result of comparing two guilds
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Overlap {
    pub guild_a: String,
    pub guild_b: String,
    /// Sorted by user id
    pub users: Vec<CommonUser>,
}

impl Overlap {
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// What happened to one source file during ingestion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    Ingested { path: PathBuf, rows: usize },
    Failed { path: PathBuf, reason: String },
}

impl SourceOutcome {
    pub fn path(&self) -> &PathBuf {
        match self {
            SourceOutcome::Ingested { path, .. } | SourceOutcome::Failed { path, .. } => path,
        }
    }
}

/// Aggregated outcome of one ingestion pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub outcomes: Vec<SourceOutcome>,
}

impl IngestReport {
    pub fn total_rows(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match o {
                SourceOutcome::Ingested { rows, .. } => *rows,
                SourceOutcome::Failed { .. } => 0,
            })
            .sum()
    }

    pub fn ingested_files(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, SourceOutcome::Ingested { .. }))
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &SourceOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, SourceOutcome::Failed { .. }))
    }
}
