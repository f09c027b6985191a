use clap::Subcommand;

use crate::cli::subcommands::{AuthCommands, ProfileCommands, ProjectCommands};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Auth ids.
    Auth {
        #[command(subcommand)]
        action: AuthCommands,
    },
    /// Projects.
    Project {
        #[command(subcommand)]
        action: ProjectCommands,
    },
    /// Profiles inside a project.
    Profile {
        #[command(subcommand)]
        action: ProfileCommands,
    },
}
