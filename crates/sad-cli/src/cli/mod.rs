use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `sadctl` binary.
#[derive(Debug, Parser)]
#[command(name = "sadctl", version, about = "sadstate - project and profile client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Quiet mode (errors only in the log)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Service URL (overrides `server.host` from config)
    #[arg(long, global = true)]
    pub host: Option<String>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            verbose: self.verbose,
            host: self.host.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use pretty_assertions::assert_eq;

    use super::subcommands::{AuthCommands, ProfileCommands, ProjectCommands};
    use super::{Cli, Commands, GlobalFlags, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from([
            "sadctl",
            "--format",
            "raw",
            "--verbose",
            "project",
            "get",
            "notes",
        ])
        .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Project {
                action: ProjectCommands::Get { ref name }
            } if name == "notes"
        ));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["sadctl", "auth", "new", "--quiet", "--host", "http://h"])
            .expect("cli should parse");

        assert!(cli.quiet);
        let flags: GlobalFlags = cli.global_flags();
        assert_eq!(flags.host.as_deref(), Some("http://h"));
        assert!(matches!(
            cli.command,
            Commands::Auth {
                action: AuthCommands::New { password: None }
            }
        ));
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        let parsed = Cli::try_parse_from(["sadctl", "--format", "table", "auth", "new"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn grants_are_repeatable() {
        let cli = Cli::try_parse_from([
            "sadctl", "profile", "edit", "notes", "main", "--grant", "7=READ", "--grant", "8=3",
        ])
        .expect("cli should parse");

        let Commands::Profile {
            action: ProfileCommands::Edit(args),
        } = cli.command
        else {
            panic!("expected profile edit");
        };
        assert_eq!(args.project, "notes");
        assert_eq!(args.profile, "main");
        assert_eq!(args.grant, vec!["7=READ".to_owned(), "8=3".to_owned()]);
        assert_eq!(args.rename, None);
    }

    #[test]
    fn write_sources_conflict() {
        let parsed = Cli::try_parse_from([
            "sadctl", "profile", "write", "notes", "main", "--data", "x", "--file", "f.txt",
        ]);
        assert!(parsed.is_err());
    }
}
