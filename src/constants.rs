/// Fixed names shared by discovery, the merge target and the queries

/// Default location of the consolidated store, relative to the working directory
pub const CENTRAL_DB_PATH: &str = "central.db";

/// File name suffix that marks a source export
pub const SOURCE_SUFFIX: &str = ".db";

/// Table read from every source and written in the consolidated store
pub const MEMBERS_TABLE: &str = "channel_members";

/// Optional settings file looked up in the working directory
pub const CONFIG_FILE: &str = "guild_overlap.toml";

// Logging
pub const LOG_DIR: &str = "logs";
pub const LOG_FILE: &str = "guild_overlap.log";
