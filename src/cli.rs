use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gpx-to-sqlite")]
#[command(version, about = "Convert geocaching GPX files to and from a SQLite database")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import a GPX file into a SQLite database
    Import {
        /// GPX file to import
        gpx_file: PathBuf,

        /// SQLite database path (created if missing)
        db: PathBuf,

        /// Fail on documents that are not GPX instead of importing nothing
        #[arg(short, long)]
        strict: bool,
    },

    /// Export caches from a SQLite database to a GPX file
    Export {
        /// SQLite database path
        db: PathBuf,

        /// Output GPX file path
        output: PathBuf,

        /// Cache ids to export, in order (comma-separated)
        #[arg(short, long, value_delimiter = ',', required = true)]
        caches: Vec<i64>,

        /// Maximum number of logs per cache (0 omits the logs block)
        #[arg(short, long, default_value_t = 5)]
        max_logs: usize,

        /// Include satellite waypoints (parking, trailhead, ...) as
        /// separate top-level waypoints
        #[arg(short, long)]
        waypoints: bool,
    },

    /// List all database table names
    ListTables,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
