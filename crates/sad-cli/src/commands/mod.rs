mod auth;
mod parse;
mod profile;
mod project;

use sad_client::Session;
use sad_config::SadConfig;

use crate::cli::{Commands, GlobalFlags};

/// Dispatch a parsed command to the corresponding handler module.
pub fn dispatch(
    command: &Commands,
    session: &Session,
    config: &SadConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Auth { action } => auth::handle(action, session, config, flags),
        Commands::Project { action } => project::handle(action, session, flags),
        Commands::Profile { action } => profile::handle(action, session, flags),
    }
}
