use std::io::Write;
use tracing::error;

use crate::constants::MEMBERS_TABLE;
use crate::error::Result;
use crate::metrics::QueryMetrics;
use crate::store::MergeTarget;
use crate::types::GuildEntry;

/// All distinct (guildId, guildName) pairs in the consolidated store.
///
/// The same id under two different names yields two entries, and a NULL
/// name is a different entry from an empty one.
pub fn list_guilds(target: &MergeTarget) -> Result<Vec<GuildEntry>> {
    let conn = target.open_reader()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT DISTINCT guildId, guildName FROM {MEMBERS_TABLE}"
    ))?;
    let guilds = stmt
        .query_map([], |row| {
            Ok(GuildEntry {
                guild_id: row.get(0)?,
                guild_name: row.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(guilds)
}

/// Print the guild catalog to `out` and return it.
///
/// A failed query is reported and yields an empty catalog. Only failures
/// writing to `out` are returned as errors.
pub fn report_guilds(target: &MergeTarget, out: &mut dyn Write) -> Result<Vec<GuildEntry>> {
    let guilds = match list_guilds(target) {
        Ok(guilds) => guilds,
        Err(e) => {
            error!(error = %e, "Guild catalog query failed");
            QueryMetrics::record_query_error("catalog");
            writeln!(out, "Error displaying guilds: {}", e)?;
            return Ok(Vec::new());
        }
    };

    writeln!(out, "\nAvailable Guilds:")?;
    for guild in &guilds {
        writeln!(out, "  - {}", guild)?;
    }
    QueryMetrics::record_catalog_size(guilds.len());
    Ok(guilds)
}
