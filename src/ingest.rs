use rusqlite::{Connection, OpenFlags};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::constants::MEMBERS_TABLE;
use crate::error::Result;
use crate::metrics::core::time_operation;
use crate::metrics::IngestionMetrics;
use crate::store::{insert_records, membership_from_row, MergeTarget};
use crate::types::{ConsolidatedRecord, IngestReport, MembershipRecord, SourceOutcome};

/// Read every `channel_members` row from one source export.
///
/// The source is opened read-only and closed before returning.
pub fn read_source(path: &Path) -> Result<Vec<MembershipRecord>> {
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    let mut stmt = conn.prepare(&format!(
        "SELECT userId, displayName, guildId, guildName, roles, status, platforms FROM {MEMBERS_TABLE}"
    ))?;
    let rows = stmt
        .query_map([], |row| membership_from_row(row))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    drop(stmt);
    conn.close().map_err(|(_, e)| e)?;
    Ok(rows)
}

/// Merge every source into `target`.
///
/// Each file is read fully, tagged with its path and appended in one batch.
/// A file that cannot be read is reported to `out` right away, recorded as
/// failed and skipped; the rest of the pass carries on. Everything is
/// committed once, after the last file. Only failures on the target itself
/// (or on `out`) are returned as errors.
pub fn merge_sources(
    target: &MergeTarget,
    sources: &[PathBuf],
    out: &mut dyn Write,
) -> Result<IngestReport> {
    let _timing = time_operation(IngestionMetrics::duration_histogram());
    let mut conn = target.open_writer()?;
    let tx = conn.transaction()?;
    let mut report = IngestReport::default();

    for path in sources {
        let source_db = path.display().to_string();
        let outcome = match read_source(path) {
            Ok(members) => {
                let tagged: Vec<ConsolidatedRecord> = members
                    .into_iter()
                    .map(|m| ConsolidatedRecord::tagged(m, source_db.as_str()))
                    .collect();
                insert_records(&tx, &tagged)?;
                info!(source = %source_db, rows = tagged.len(), "Merged source file");
                IngestionMetrics::record_file_ingested(tagged.len());
                SourceOutcome::Ingested {
                    path: path.clone(),
                    rows: tagged.len(),
                }
            }
            Err(e) => {
                warn!(source = %source_db, error = %e, "Skipping unreadable source file");
                IngestionMetrics::record_file_failed();
                writeln!(out, "Error accessing database {}: {}", source_db, e)?;
                SourceOutcome::Failed {
                    path: path.clone(),
                    reason: e.to_string(),
                }
            }
        };
        report.outcomes.push(outcome);
    }

    tx.commit()?;
    info!(
        files = sources.len(),
        ingested = report.ingested_files(),
        rows = report.total_rows(),
        "Ingestion pass committed"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::params;
    use rusqlite::types::Value;
    use tempfile::tempdir;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    fn write_source(path: &Path, rows: &[(&str, &str, &str, &str)]) {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch(
            "CREATE TABLE channel_members (
                userId TEXT, displayName TEXT, guildId TEXT, guildName TEXT,
                roles TEXT, status TEXT, platforms TEXT, extra TEXT
            )",
        )
        .unwrap();
        for (user, name, guild, guild_name) in rows {
            conn.execute(
                "INSERT INTO channel_members VALUES (?1, ?2, ?3, ?4, '[]', 'online', '{}', 'ignored')",
                params![user, name, guild, guild_name],
            )
            .unwrap();
        }
    }

    #[test]
    fn test_read_source_selects_membership_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("one.db");
        write_source(&path, &[("u1", "Alice", "g1", "GuildOne")]);

        let rows = read_source(&path).unwrap();
        assert_eq!(
            rows,
            vec![MembershipRecord {
                user_id: text("u1"),
                display_name: text("Alice"),
                guild_id: text("g1"),
                guild_name: text("GuildOne"),
                roles: text("[]"),
                status: text("online"),
                platforms: text("{}"),
            }]
        );
    }

    #[test]
    fn test_read_source_missing_table_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("other.db");
        Connection::open(&path)
            .unwrap()
            .execute_batch("CREATE TABLE something_else (x TEXT)")
            .unwrap();
        assert!(read_source(&path).is_err());
    }

    #[test]
    fn test_merge_keeps_duplicates_and_tags_sources() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.db");
        let b = dir.path().join("b.db");
        write_source(
            &a,
            &[("u1", "Alice", "g1", "GuildOne"), ("u1", "Alice", "g1", "GuildOne")],
        );
        write_source(&b, &[("u1", "Alice", "g1", "GuildOne")]);

        let target = MergeTarget::create(dir.path().join("central.db")).unwrap();
        let report = merge_sources(&target, &[a.clone(), b.clone()], &mut Vec::<u8>::new()).unwrap();

        assert_eq!(report.total_rows(), 3);
        let stored = target.records().unwrap();
        assert_eq!(stored.len(), 3);
        let from_a = stored
            .iter()
            .filter(|r| r.source_db == a.display().to_string())
            .count();
        assert_eq!(from_a, 2);
        assert_eq!(stored[2].source_db, b.display().to_string());
    }

    #[test]
    fn test_corrupt_file_is_isolated() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.db");
        let junk = dir.path().join("junk.db");
        write_source(&good, &[("u1", "Alice", "g1", "GuildOne")]);
        std::fs::write(&junk, b"this is not a sqlite database at all, not even close").unwrap();

        let target = MergeTarget::create(dir.path().join("central.db")).unwrap();
        let mut out: Vec<u8> = Vec::new();
        let report = merge_sources(&target, &[junk.clone(), good], &mut out).unwrap();

        assert_eq!(report.ingested_files(), 1);
        assert_eq!(report.failures().count(), 1);
        assert_eq!(report.failures().next().unwrap().path(), &junk);
        assert_eq!(target.row_count().unwrap(), 1);
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.starts_with(&format!("Error accessing database {}: ", junk.display())));
        assert_eq!(printed.lines().count(), 1);
    }

    #[test]
    fn test_source_errors_are_printed_before_a_fatal_target_error() {
        let dir = tempdir().unwrap();
        let junk = dir.path().join("junk.db");
        let good = dir.path().join("good.db");
        std::fs::write(&junk, b"this is not a sqlite database at all, not even close").unwrap();
        write_source(&good, &[("u1", "Alice", "g1", "GuildOne")]);

        let target = MergeTarget::create(dir.path().join("central.db")).unwrap();
        Connection::open(target.path())
            .unwrap()
            .execute_batch("DROP TABLE channel_members")
            .unwrap();

        let mut out: Vec<u8> = Vec::new();
        let result = merge_sources(&target, &[junk.clone(), good], &mut out);
        assert!(result.is_err());
        assert!(String::from_utf8(out)
            .unwrap()
            .starts_with(&format!("Error accessing database {}: ", junk.display())));
    }

    #[test]
    fn test_null_and_blob_cells_do_not_fail_the_source() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mixed.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE channel_members (
                userId TEXT, displayName TEXT, guildId TEXT, guildName TEXT,
                roles TEXT, status TEXT, platforms BLOB
            );
            INSERT INTO channel_members VALUES ('u1', NULL, 'g1', 'GuildOne', '[]', 'online', x'00ff7b');
            INSERT INTO channel_members VALUES ('u2', 'Bob', 'g1', 'GuildOne', '[]', 'online', '{}');",
        )
        .unwrap();
        drop(conn);

        let target = MergeTarget::create(dir.path().join("central.db")).unwrap();
        let mut out: Vec<u8> = Vec::new();
        let report = merge_sources(&target, &[path], &mut out).unwrap();

        assert_eq!(report.failures().count(), 0);
        assert_eq!(report.total_rows(), 2);
        assert!(out.is_empty());
        let stored = target.records().unwrap();
        assert_eq!(stored[0].member.display_name, Value::Null);
        assert_eq!(stored[0].member.platforms, Value::Blob(vec![0x00, 0xff, 0x7b]));
        assert_eq!(stored[1].member.display_name, text("Bob"));
    }
}
