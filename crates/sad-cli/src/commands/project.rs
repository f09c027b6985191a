use sad_client::{Project, ProjectEdit, ProjectPermissions, Response, Session};

use crate::cli::GlobalFlags;
use crate::cli::subcommands::{ProjectCommands, ProjectEditArgs};
use crate::commands::parse::parse_grants;
use crate::output::report;

/// Handle `sadctl project <subcommand>`.
pub fn handle(
    action: &ProjectCommands,
    session: &Session,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        ProjectCommands::Get { name } => report(&session.get_project(name)?, flags.format),
        ProjectCommands::Register { name, grant } => {
            let grants = parse_grants::<ProjectPermissions>(grant)?;
            report(
                &session.register_project(name, grants.as_ref())?,
                flags.format,
            )
        }
        ProjectCommands::Delete { name } => {
            let project = fetch(session, name, flags)?;
            report(&project.delete()?, flags.format)
        }
        ProjectCommands::Edit(args) => edit(args, session, flags),
    }
}

fn edit(args: &ProjectEditArgs, session: &Session, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut changes = ProjectEdit::new();
    changes.name.clone_from(&args.rename);
    changes.permissions = parse_grants(&args.grant)?;

    let project = fetch(session, &args.name, flags)?;
    report(&project.edit(&changes)?, flags.format)
}

/// Look a project up by name, reporting the failure if there is none.
pub fn fetch(session: &Session, name: &str, flags: &GlobalFlags) -> anyhow::Result<Project> {
    match session.get_project(name)? {
        Response::Project { project, .. } => Ok(project),
        other => {
            report(&other, flags.format)?;
            anyhow::bail!("project '{name}' could not be fetched")
        }
    }
}
