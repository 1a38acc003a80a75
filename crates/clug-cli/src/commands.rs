//! Subcommands.

use std::path::PathBuf;

use clap::Subcommand;

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Download multibeam bathymetry surveys
    ///
    /// Each survey is written under TARGET_DIR with its bucket path, e.g.
    /// `<TARGET_DIR>/mb/ship/<platform>/<survey>/...`.
    Mb {
        /// Survey identifiers, e.g. EX2201
        #[arg(required = true, num_args = 1..)]
        surveys: Vec<String>,
        /// Existing, writable directory to download into
        target_dir: PathBuf,
    },
}
