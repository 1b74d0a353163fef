//! Management entry point, e.g. `manage db_wait_service`

use anyhow::Result;
use clap::Command;
use core_lib::{AppConfig, LineReporter, ManagementCommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn cli() -> Command {
    let mut cli = Command::new("manage")
        .about("Service management commands")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true);

    for command in ManagementCommand::ALL {
        cli = cli.subcommand(Command::new(command.name()).about(command.about()));
    }

    cli
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let matches = cli().get_matches();

    init_tracing();

    let name = matches
        .subcommand_name()
        .ok_or_else(|| anyhow::anyhow!("No command given"))?;
    let command = ManagementCommand::lookup(name)?;

    let config = AppConfig::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    info!("Configuration loaded successfully");
    info!("Running command: {}", command);

    let mut reporter = LineReporter::stdout();
    if let Err(e) = command.run(&config, &mut reporter).await {
        error!("Command {} failed: {}", command, e);
        return Err(e.into());
    }

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            let default_level = if cfg!(debug_assertions) {
                "debug"
            } else {
                "info"
            };

            format!("manage={0},core_lib={0},sqlx=warn", default_level).into()
        });

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    let is_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    if is_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_lists_every_command() {
        cli().debug_assert();

        let names: Vec<String> = cli()
            .get_subcommands()
            .map(|sub| sub.get_name().to_string())
            .collect();
        assert_eq!(names, vec!["db_wait_service", "check"]);
    }

    #[test]
    fn test_cli_parses_command_without_flags() {
        let matches = cli().try_get_matches_from(["manage", "db_wait_service"]).unwrap();
        assert_eq!(matches.subcommand_name(), Some("db_wait_service"));

        assert!(cli()
            .try_get_matches_from(["manage", "db_wait_service", "--retries", "3"])
            .is_err());
        assert!(cli().try_get_matches_from(["manage", "runserver"]).is_err());
    }
}
