use clap::{Args, Subcommand};

/// Project commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ProjectCommands {
    /// Fetch a project.
    Get { name: String },
    /// Register a new project.
    Register {
        name: String,
        /// Grant as `AUTH_ID=PERMS`, PERMS an integer or names joined by `|`.
        #[arg(long)]
        grant: Vec<String>,
    },
    /// Delete a project and all of its profiles.
    Delete { name: String },
    /// Rename a project or change its grants.
    Edit(ProjectEditArgs),
}

#[derive(Clone, Debug, Args)]
pub struct ProjectEditArgs {
    pub name: String,
    #[arg(long)]
    pub rename: Option<String>,
    /// Grant as `AUTH_ID=PERMS`; merged into the existing grants.
    #[arg(long)]
    pub grant: Vec<String>,
}
