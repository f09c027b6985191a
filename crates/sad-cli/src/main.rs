use anyhow::Context;
use clap::Parser;
use sad_client::Session;
use sad_config::SadConfig;

mod cli;
mod commands;
mod output;

fn main() {
    if let Err(error) = run() {
        eprintln!("sadctl error: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let flags = cli.global_flags();
    init_tracing(flags.quiet, flags.verbose)?;

    let mut config = SadConfig::load_with_dotenv().context("failed to load configuration")?;
    if let Some(host) = &flags.host {
        config.server.host.clone_from(host);
    }
    if !config.server.is_configured() {
        anyhow::bail!("no service host configured: pass --host or set SADSTATE_SERVER__HOST");
    }

    let session = Session::from_config(&config).context("failed to create session")?;
    if !matches!(cli.command, cli::Commands::Auth { .. }) {
        authenticate_from_config(&session, &config)?;
    }

    commands::dispatch(&cli.command, &session, &config, &flags)
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("SADSTATE_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

/// Log in with the configured credentials, if any.
fn authenticate_from_config(session: &Session, config: &SadConfig) -> anyhow::Result<()> {
    let Some(id) = config.auth.id.filter(|_| config.auth.is_configured()) else {
        tracing::debug!("no credentials configured, continuing unauthenticated");
        return Ok(());
    };

    let response = session
        .authenticate(id, &config.auth.password)
        .context("failed to authenticate")?;
    if !response.is_success() {
        anyhow::bail!(
            "authentication as {id} failed: {response}: {}",
            response.reason().unwrap_or_default()
        );
    }
    tracing::debug!(auth_id = id, "authenticated");
    Ok(())
}
