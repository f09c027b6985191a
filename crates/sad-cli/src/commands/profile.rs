use std::fs::File;

use anyhow::Context;
use sad_client::{Content, Profile, ProfileEdit, ProfilePermissions, Session};

use crate::cli::GlobalFlags;
use crate::cli::subcommands::{ProfileCommands, ProfileEditArgs, ProfileUploadArgs};
use crate::commands::parse::parse_grants;
use crate::commands::project::fetch as fetch_project;
use crate::output::report;

/// Handle `sadctl profile <subcommand>`.
pub fn handle(
    action: &ProfileCommands,
    session: &Session,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        ProfileCommands::Get { project, profile } => {
            let project = fetch_project(session, project, flags)?;
            report(&project.get_profile(profile)?, flags.format)
        }
        ProfileCommands::List { project } => {
            let project = fetch_project(session, project, flags)?;
            report(&project.get_all_profiles()?, flags.format)
        }
        ProfileCommands::Add {
            project,
            profile,
            grant,
        } => {
            let grants = parse_grants::<ProfilePermissions>(grant)?;
            let project = fetch_project(session, project, flags)?;
            report(&project.add_profile(profile, grants.as_ref())?, flags.format)
        }
        ProfileCommands::Remove { project, profile } => {
            let project = fetch_project(session, project, flags)?;
            report(&project.remove_profile(profile)?, flags.format)
        }
        ProfileCommands::Read { project, profile } => {
            let profile = fetch(session, project, profile, flags)?;
            report(&profile.read()?, flags.format)
        }
        ProfileCommands::Write(args) => {
            let content = content_of(args)?;
            let profile = fetch(session, &args.project, &args.profile, flags)?;
            report(&profile.write(content)?, flags.format)
        }
        ProfileCommands::Append(args) => {
            let content = content_of(args)?;
            let profile = fetch(session, &args.project, &args.profile, flags)?;
            report(&profile.append(content)?, flags.format)
        }
        ProfileCommands::Edit(args) => edit(args, session, flags),
    }
}

fn edit(args: &ProfileEditArgs, session: &Session, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut changes = ProfileEdit::new();
    changes.name.clone_from(&args.rename);
    changes.permissions = parse_grants(&args.grant)?;

    let profile = fetch(session, &args.project, &args.profile, flags)?;
    report(&profile.edit(&changes)?, flags.format)
}

fn content_of(args: &ProfileUploadArgs) -> anyhow::Result<Content> {
    if let Some(data) = &args.data {
        return Ok(Content::from(data.as_str()));
    }
    if let Some(path) = &args.file {
        let file =
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        return Ok(Content::reader(file));
    }
    Ok(Content::reader(std::io::stdin()))
}

/// Fetch a profile through its project.
///
/// The project handle must outlive the call that follows, so it is kept
/// alive by the session cache.
fn fetch(
    session: &Session,
    project: &str,
    profile: &str,
    flags: &GlobalFlags,
) -> anyhow::Result<Profile> {
    let project = fetch_project(session, project, flags)?;
    let response = project.get_profile(profile)?;
    match response.profile() {
        Some(found) => Ok(found.clone()),
        None => {
            report(&response, flags.format)?;
            anyhow::bail!("profile '{profile}' could not be fetched")
        }
    }
}
