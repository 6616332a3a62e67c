//! The consolidated store ("merge target")
//!
//! A single SQLite file rebuilt from scratch on every run. Creation wipes any
//! previous file; ingestion writes through one long-lived transaction; the
//! catalog and overlap queries each open their own read-only connection.

use rusqlite::{params, Connection, OpenFlags, Row, Transaction};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants::MEMBERS_TABLE;
use crate::error::Result;
use crate::types::{ConsolidatedRecord, MembershipRecord};

/// Handle to the consolidated store on disk
#[derive(Debug, Clone)]
pub struct MergeTarget {
    path: PathBuf,
}

impl MergeTarget {
    /// Remove any existing store at `path` and create a fresh, empty one.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if path.exists() {
            info!(path = %path.display(), "Removing previous consolidated store");
            fs::remove_file(&path)?;
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(&path)?;
        conn.execute_batch(&format!(
            r#"
            CREATE TABLE {MEMBERS_TABLE} (
                userId      TEXT,
                displayName TEXT,
                guildId     TEXT,
                guildName   TEXT,
                roles       TEXT,
                status      TEXT,
                platforms   TEXT,
                sourceDb    TEXT
            );
            "#
        ))?;
        conn.close().map_err(|(_, e)| e)?;

        debug!(path = %path.display(), "Created consolidated store");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read-write connection used for the ingestion pass
    pub fn open_writer(&self) -> Result<Connection> {
        Ok(Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_WRITE,
        )?)
    }

    /// Read-only connection used by the catalog and overlap queries
    pub fn open_reader(&self) -> Result<Connection> {
        Ok(Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY,
        )?)
    }

    pub fn row_count(&self) -> Result<usize> {
        let conn = self.open_reader()?;
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {MEMBERS_TABLE}"),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Every stored row, in storage order
    pub fn records(&self) -> Result<Vec<ConsolidatedRecord>> {
        let conn = self.open_reader()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT userId, displayName, guildId, guildName, roles, status, platforms, sourceDb
             FROM {MEMBERS_TABLE} ORDER BY rowid"
        ))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(ConsolidatedRecord::tagged(
                    membership_from_row(row)?,
                    row.get::<_, String>(7)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

/// Append `records` inside the ingestion transaction, reusing one prepared statement.
pub fn insert_records(tx: &Transaction<'_>, records: &[ConsolidatedRecord]) -> Result<()> {
    let mut stmt = tx.prepare_cached(&format!(
        "INSERT INTO {MEMBERS_TABLE} (userId, displayName, guildId, guildName, roles, status, platforms, sourceDb)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
    ))?;
    for record in records {
        let m = &record.member;
        stmt.execute(params![
            m.user_id,
            m.display_name,
            m.guild_id,
            m.guild_name,
            m.roles,
            m.status,
            m.platforms,
            record.source_db,
        ])?;
    }
    Ok(())
}

/// Build a [`MembershipRecord`] from the first seven columns of `row`, values untouched
pub fn membership_from_row(row: &Row<'_>) -> rusqlite::Result<MembershipRecord> {
    Ok(MembershipRecord {
        user_id: row.get(0)?,
        display_name: row.get(1)?,
        guild_id: row.get(2)?,
        guild_name: row.get(3)?,
        roles: row.get(4)?,
        status: row.get(5)?,
        platforms: row.get(6)?,
    })
}
