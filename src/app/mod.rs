//! The end-to-end run: discover, rebuild, merge, list guilds, compare two of them

pub mod ports;

use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, info_span};

use crate::app::ports::Prompt;
use crate::catalog::report_guilds;
use crate::config::Settings;
use crate::discovery::find_source_files;
use crate::error::Result;
use crate::ingest::merge_sources;
use crate::metrics::IngestionMetrics;
use crate::overlap::report_common_users;
use crate::store::MergeTarget;
use crate::types::{GuildEntry, IngestReport, Overlap};

pub const GUILD_A_PROMPT: &str = "Enter the Guild ID for Guild A: ";
pub const GUILD_B_PROMPT: &str = "Enter the Guild ID for Guild B: ";

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunSummary {
    /// Discovery found nothing to merge
    NoSourceFiles,
    /// Sources were merged but the store holds no guilds
    NoGuilds { ingest: IngestReport },
    /// Two guilds were compared
    Compared {
        ingest: IngestReport,
        guilds: Vec<GuildEntry>,
        overlap: Overlap,
    },
}

/// Source files under `root`, minus the consolidated store itself
fn discover(root: &Path, settings: &Settings, central_db: &Path) -> Result<Vec<PathBuf>> {
    let mut files = find_source_files(root, &settings.source_suffix)?;
    files.retain(|path| !is_same_file(path, central_db));
    Ok(files)
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Run the whole pipeline rooted at `root`.
///
/// Progress and results go to `out`; guild ids come from `prompt`. Errors
/// are returned only for fatal conditions: an unreadable root, a store that
/// cannot be rebuilt, or a failed prompt or write.
pub fn run(
    root: &Path,
    settings: &Settings,
    prompt: &mut dyn Prompt,
    out: &mut dyn Write,
) -> Result<RunSummary> {
    let span = info_span!("run", root = %root.display());
    let _enter = span.enter();

    let central_db = settings.central_db_in(root);

    writeln!(out, "Searching for SQLite files...")?;
    let sources = discover(root, settings, &central_db)?;
    IngestionMetrics::record_files_discovered(sources.len());

    if sources.is_empty() {
        writeln!(out, "No SQLite files found.")?;
        return Ok(RunSummary::NoSourceFiles);
    }
    writeln!(out, "Found {} SQLite files.", sources.len())?;

    let target = MergeTarget::create(&central_db)?;
    let ingest = merge_sources(&target, &sources, out)?;

    let guilds = report_guilds(&target, out)?;
    if guilds.is_empty() {
        writeln!(out, "No guilds available to compare.")?;
        return Ok(RunSummary::NoGuilds { ingest });
    }

    let guild_a = prompt.ask(GUILD_A_PROMPT)?.trim().to_string();
    let guild_b = prompt.ask(GUILD_B_PROMPT)?.trim().to_string();
    info!(guild_a = %guild_a, guild_b = %guild_b, "Comparing guilds");

    let overlap = report_common_users(&target, &guild_a, &guild_b, out)?;
    Ok(RunSummary::Compared {
        ingest,
        guilds,
        overlap,
    })
}
