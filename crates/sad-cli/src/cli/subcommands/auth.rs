use clap::Subcommand;

/// Authentication commands.
#[derive(Clone, Debug, Subcommand)]
pub enum AuthCommands {
    /// Create a new auth id.
    New {
        /// Password for the new id (defaults to `auth.password` from config).
        #[arg(long)]
        password: Option<String>,
    },
    /// Check a set of credentials.
    Set {
        id: u64,
        /// Defaults to `auth.password` from config.
        #[arg(long)]
        password: Option<String>,
    },
}
