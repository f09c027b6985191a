use anyhow::Context;
use sad_client::Session;
use sad_config::SadConfig;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::AuthCommands;
use crate::output::report;

/// Handle `sadctl auth <subcommand>`.
pub fn handle(
    action: &AuthCommands,
    session: &Session,
    config: &SadConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        AuthCommands::New { password } => {
            let password = resolve_password(password.as_deref(), config)?;
            report(&session.new_auth(password)?, flags.format)
        }
        AuthCommands::Set { id, password } => {
            let password = resolve_password(password.as_deref(), config)?;
            report(&session.authenticate(*id, password)?, flags.format)
        }
    }
}

fn resolve_password<'a>(flag: Option<&'a str>, config: &'a SadConfig) -> anyhow::Result<&'a str> {
    flag.or_else(|| (!config.auth.password.is_empty()).then_some(config.auth.password.as_str()))
        .context("no password given: pass --password or set SADSTATE_AUTH__PASSWORD")
}
