//! # Rontapi CLI Entry Point
//!
//! The main executable for the rontapi tool. This file drives the application
//! lifecycle:
//!
//! 1. **Initialization**: Parses command-line arguments using [`cli::Cli`].
//! 2. **Connection**: Resolves the connection settings (configuration file plus
//!    flags) and bootstraps a [`Filer`] via `rontapi_core`.
//! 3. **Execution**: Delegates the request to the discovered command catalog.
//! 4. **Presentation**: Formats and prints the resulting data or error status
//!    to standard output/error.

mod cli;
mod formatter;

use clap::Parser;
use cli::{Cli, Commands, ConnectionArgs, ListCommands};
use formatter::{CommandList, FormattedString, GenericError, PackageList};
use rontapi_core::client::Filer;
use rontapi_core::config::NaConfig;
use rontapi_core::session::settings::{AuthStyle, ServerType, Settings, TransportType};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();
    let host = args.host;

    let settings = match build_settings(&host, &args.connection) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("{}", FormattedString::from(GenericError("Invalid settings", err)));
            process::exit(1);
        }
    };

    match args.command {
        Commands::Call { command, args } => run_call(&host, settings, &command, args),
        Commands::List { sub } => match sub {
            ListCommands::Packages => list_packages(&host, settings),
            ListCommands::Commands { package } => list_commands(&host, settings, &package),
        },
        Commands::Describe { command } => describe_command(&host, settings, &command),
    }
}

/// Resolves the effective settings: configuration file first (when given),
/// command-line flags on top.
fn build_settings(host: &str, args: &ConnectionArgs) -> anyhow::Result<Settings> {
    let mut settings = match &args.config {
        Some(path) => NaConfig::from_file(path)?.resolve(host, &args.role)?,
        None => Settings::default(),
    };

    if let Some(user) = &args.user {
        settings.user = user.clone();
    }
    if let Some(password) = &args.password {
        settings.password = password.clone();
    }
    if let Some(style) = &args.style {
        settings.style = AuthStyle::from_name(style)?;
    }
    if let Some(vfiler) = &args.vfiler {
        settings.vfiler = vfiler.clone();
    }
    if let Some(server_type) = &args.server_type {
        settings.server_type = ServerType::from_name(server_type)?;
    }
    if let Some(transport) = &args.transport {
        settings.transport_type = Some(TransportType::from_name(transport)?);
    }
    if let Some(port) = args.port {
        settings.port = Some(port);
    }

    Ok(settings)
}

fn connect_or_exit(host: &str, settings: Settings) -> Filer {
    match Filer::connect(host, settings) {
        Ok(filer) => filer,
        Err(err) => {
            eprintln!("{}", FormattedString::from(err));
            process::exit(1);
        }
    }
}

fn list_packages(host: &str, settings: Settings) {
    let filer = connect_or_exit(host, settings);

    let packages = filer.packages().map(str::to_string).collect();
    println!("{}", FormattedString::from(PackageList(packages)));
}

fn list_commands(host: &str, settings: Settings, package: &str) {
    let filer = connect_or_exit(host, settings);

    match filer.package(package) {
        Some(pkg) => {
            let commands = pkg.commands().map(|command| command.name.clone()).collect();
            println!(
                "{}",
                FormattedString::from(CommandList(package.to_string(), commands))
            );
        }
        None => {
            eprintln!(
                "{}",
                FormattedString::from(GenericError(
                    "Unknown package",
                    format!("no package '{package}' on {host}")
                ))
            );
            process::exit(1);
        }
    }
}

fn describe_command(host: &str, settings: Settings, command: &str) {
    let filer = connect_or_exit(host, settings);

    match filer.command(command) {
        Some(descriptor) => {
            let info = descriptor.describe(filer.model());
            println!("{}", FormattedString::from(info));
        }
        None => {
            eprintln!(
                "{}",
                FormattedString::from(GenericError(
                    "Unknown command",
                    format!("no command '{command}' on {host}")
                ))
            );
            process::exit(1);
        }
    }
}

fn run_call(
    host: &str,
    settings: Settings,
    command: &str,
    args: Vec<(String, serde_json::Value)>,
) {
    let mut filer = connect_or_exit(host, settings);

    let kwargs = args.into_iter().collect();
    match filer.call(command, kwargs) {
        Ok(output) => {
            println!(
                "{}",
                FormattedString::from(serde_json::Value::Object(output))
            );
        }
        Err(err) => {
            eprintln!("{}", FormattedString::from(err));
            process::exit(1);
        }
    }
}
