use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "maxnote")]
#[command(about = "Inspect and manage MaxNote settings from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to the local storage file
    #[arg(long, global = true, value_name = "PATH")]
    pub data_path: Option<PathBuf>,

    /// Optional path to the settings config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show current settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change a single setting
    Set {
        /// Field name, e.g. displayName or retentionDays
        field: String,
        /// New value
        value: String,
    },
    /// Restore default settings
    Reset,
    /// Check values without saving them: maxnote validate displayName=Ana
    Validate {
        /// One or more FIELD=VALUE pairs
        #[arg(required = true, value_name = "FIELD=VALUE")]
        pairs: Vec<String>,
    },
    /// Export settings
    Export {
        /// Export format
        #[arg(long, value_enum, default_value_t = ArtifactFormat::Json)]
        format: ArtifactFormat,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
        /// Export the cached snapshot instead of the stored settings
        #[arg(long)]
        cached: bool,
    },
    /// Import settings from a JSON or CSV export
    Import {
        /// Path to the export file
        path: PathBuf,
        /// Import format (guessed from the file extension when omitted)
        #[arg(long, value_enum)]
        format: Option<ArtifactFormat>,
    },
    /// Sync settings with the remote endpoint
    Sync {
        /// JSON snapshot to treat as the server-side settings
        #[arg(long, value_name = "PATH")]
        remote: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List or resolve conflicts against a remote snapshot
    Conflicts {
        /// Remote snapshot (defaults to the one recorded by the last sync)
        #[arg(value_name = "PATH")]
        remote: Option<PathBuf>,
        /// Resolve every conflict with this strategy
        #[arg(long, value_enum)]
        resolve: Option<Resolution>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage cached settings snapshots
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
    /// Show the logged-in user
    Whoami,
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Remove one cache entry, or every entry when KEY is omitted
    Clear {
        /// Cache key, e.g. backup or current
        key: Option<String>,
    },
    /// Show sync bookkeeping kept in the cache
    Status,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ArtifactFormat {
    Json,
    Csv,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum Resolution {
    Local,
    Remote,
    Merge,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}
