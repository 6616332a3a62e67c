use clap::Parser;
use tracing::info;

use guild_overlap::app::{self, RunSummary};
use guild_overlap::config::Settings;
use guild_overlap::infra::stdin_prompt;
use guild_overlap::logging;
use guild_overlap::metrics::{init_metrics, render_snapshot};

#[derive(Parser)]
#[command(name = "guild_overlap")]
#[command(about = "Merge every channel_members SQLite export under the current directory and list users shared by two guilds")]
#[command(version)]
struct Cli {}

fn main() -> anyhow::Result<()> {
    let _cli = Cli::parse();

    let root = std::env::current_dir()?;
    let _log_guard = logging::init_logging(&root);
    init_metrics();

    let settings = Settings::load_from_dir(&root)?;
    info!(root = %root.display(), ?settings, "Starting guild_overlap");

    let mut prompt = stdin_prompt();
    let mut stdout = std::io::stdout();
    let summary = app::run(&root, &settings, &mut prompt, &mut stdout)?;

    match &summary {
        RunSummary::NoSourceFiles => info!("Run finished: no source files"),
        RunSummary::NoGuilds { ingest } => {
            info!(rows = ingest.total_rows(), "Run finished: no guilds to compare")
        }
        RunSummary::Compared { overlap, .. } => {
            info!(common = overlap.users.len(), "Run finished")
        }
    }
    if let Some(snapshot) = render_snapshot() {
        info!(metrics = %snapshot, "Run metrics");
    }
    Ok(())
}
