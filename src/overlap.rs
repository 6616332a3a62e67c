use rusqlite::{params, Connection};
use std::collections::{BTreeSet, HashMap};
use std::io::Write;
use tracing::{error, info};

use crate::constants::MEMBERS_TABLE;
use crate::error::Result;
use crate::metrics::QueryMetrics;
use crate::store::MergeTarget;
use crate::types::{Cell, CommonUser, Overlap};

/// userId -> displayName for one guild.
///
/// When a user appears under several names, the last row SQLite returns
/// wins. No ordering is imposed, so which name survives is unspecified.
fn guild_members(conn: &Connection, guild_id: &str) -> Result<HashMap<Cell, Cell>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT DISTINCT userId, displayName FROM {MEMBERS_TABLE} WHERE guildId = ?1"
    ))?;
    let rows = stmt.query_map(params![guild_id], |row| {
        Ok((row.get::<_, Cell>(0)?, row.get::<_, Cell>(1)?))
    })?;

    let mut members = HashMap::new();
    for row in rows {
        let (user_id, display_name) = row?;
        members.insert(user_id, display_name);
    }
    Ok(members)
}

/// Users present in both `guild_a` and `guild_b`, sorted by user id.
///
/// The ids are used verbatim; an id absent from the store simply has no members.
pub fn find_common_users(target: &MergeTarget, guild_a: &str, guild_b: &str) -> Result<Overlap> {
    let conn = target.open_reader()?;
    let members_a = guild_members(&conn, guild_a)?;
    let members_b = if guild_a == guild_b {
        members_a.clone()
    } else {
        guild_members(&conn, guild_b)?
    };

    let common: BTreeSet<&Cell> = members_a
        .keys()
        .filter(|user_id| members_b.contains_key(*user_id))
        .collect();

    let users = common
        .into_iter()
        .map(|user_id| CommonUser {
            user_id: user_id.clone(),
            name_in_a: members_a[user_id].clone(),
            name_in_b: members_b[user_id].clone(),
        })
        .collect();

    Ok(Overlap {
        guild_a: guild_a.to_string(),
        guild_b: guild_b.to_string(),
        users,
    })
}

/// Print the users shared by two guilds to `out` and return them.
///
/// A failed query is reported and treated as "nothing found". Only failures
/// writing to `out` are returned as errors.
pub fn report_common_users(
    target: &MergeTarget,
    guild_a: &str,
    guild_b: &str,
    out: &mut dyn Write,
) -> Result<Overlap> {
    let overlap = match find_common_users(target, guild_a, guild_b) {
        Ok(overlap) => overlap,
        Err(e) => {
            error!(error = %e, guild_a, guild_b, "Overlap query failed");
            QueryMetrics::record_query_error("overlap");
            writeln!(out, "Error finding users in selected guilds: {}", e)?;
            return Ok(Overlap {
                guild_a: guild_a.to_string(),
                guild_b: guild_b.to_string(),
                users: Vec::new(),
            });
        }
    };

    info!(guild_a, guild_b, common = overlap.users.len(), "Compared guilds");
    QueryMetrics::record_common_users(overlap.users.len());

    if overlap.is_empty() {
        writeln!(
            out,
            "\nNo users found in both Guild {} and Guild {}.",
            guild_a, guild_b
        )?;
        return Ok(overlap);
    }

    writeln!(out, "\nUsers in both Guild {} and Guild {}:", guild_a, guild_b)?;
    for user in &overlap.users {
        writeln!(out, "  - User ID: {}", user.user_id)?;
        writeln!(out, "    Display Name in Guild {}: {}", guild_a, user.name_in_a)?;
        writeln!(out, "    Display Name in Guild {}: {}", guild_b, user.name_in_b)?;
    }
    Ok(overlap)
}
