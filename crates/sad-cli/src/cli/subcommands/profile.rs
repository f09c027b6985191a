use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Profile commands. Every command names the project first.
#[derive(Clone, Debug, Subcommand)]
pub enum ProfileCommands {
    /// Fetch one profile.
    Get { project: String, profile: String },
    /// List every profile of a project.
    List { project: String },
    /// Add a profile.
    Add {
        project: String,
        profile: String,
        /// Grant as `AUTH_ID=PERMS`, PERMS an integer or names joined by `|`.
        #[arg(long)]
        grant: Vec<String>,
    },
    /// Remove a profile.
    Remove { project: String, profile: String },
    /// Print a profile's contents.
    Read { project: String, profile: String },
    /// Replace a profile's contents.
    Write(ProfileUploadArgs),
    /// Append to a profile's contents.
    Append(ProfileUploadArgs),
    /// Rename a profile or change its grants.
    Edit(ProfileEditArgs),
}

/// Source of uploaded content; stdin when neither flag is given.
#[derive(Clone, Debug, Args)]
pub struct ProfileUploadArgs {
    pub project: String,
    pub profile: String,
    #[arg(long, conflicts_with = "file")]
    pub data: Option<String>,
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Clone, Debug, Args)]
pub struct ProfileEditArgs {
    pub project: String,
    pub profile: String,
    #[arg(long)]
    pub rename: Option<String>,
    /// Grant as `AUTH_ID=PERMS`; merged into the existing grants.
    #[arg(long)]
    pub grant: Vec<String>,
}
