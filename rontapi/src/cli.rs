//! # CLI
//!
//! This module defines the command-line interface of `rontapi` using `clap`.
//!
//! It is responsible for parsing user input and performing validation (e.g.,
//! ensuring call arguments are `key=value`).
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rontapi", version, about = "Dynamic ONTAPI CLI")]
pub struct Cli {
    /// The storage system to connect to (hostname or address)
    pub host: String,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Connection settings, applied on top of the configuration file (if any).
#[derive(Args)]
pub struct ConnectionArgs {
    /// User name for LOGIN authentication
    #[arg(short, long)]
    pub user: Option<String>,

    /// Password for LOGIN authentication
    #[arg(short, long)]
    pub password: Option<String>,

    /// Authentication style (LOGIN, HOSTS or CERTIFICATE)
    #[arg(long)]
    pub style: Option<String>,

    /// Tunnel calls to this vfiler
    #[arg(long)]
    pub vfiler: Option<String>,

    /// Server type (Filer, NetCache, Agent or DFM)
    #[arg(long)]
    pub server_type: Option<String>,

    /// Transport (HTTP or HTTPS); autodetected when omitted
    #[arg(short, long)]
    pub transport: Option<String>,

    /// Port override
    #[arg(long)]
    pub port: Option<u16>,

    /// Path to a JSON configuration file with roles and per-filer overrides
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Role to resolve from the configuration file
    #[arg(short, long, default_value = "default")]
    pub role: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Perform an ONTAPI call against a storage system
    ///
    /// This command connects, discovers the remote command catalog and invokes
    /// a command with named arguments.
    ///
    /// ## Examples:
    ///
    /// ```bash
    /// rontapi filer01 -u root -p secret call volume-list-info -a volume=vol0
    /// ```
    Call {
        /// Full dashed command name (e.g. volume-list-info)
        command: String,

        /// Named argument as key=value; the value is parsed as JSON when
        /// possible and taken as a plain string otherwise
        #[arg(short = 'a', long = "arg", value_parser = parse_arg)]
        args: Vec<(String, serde_json::Value)>,
    },

    /// List available packages or commands
    List {
        #[command(subcommand)]
        sub: ListCommands,
    },

    /// Describe a command in detail
    Describe {
        /// Full dashed command name (e.g. volume-list-info)
        command: String,
    },
}

#[derive(Subcommand)]
pub enum ListCommands {
    /// List all command packages discovered on the system
    Packages,

    /// List the commands of one package
    Commands {
        /// Package name (e.g. volume)
        package: String,
    },
}

fn parse_arg(value: &str) -> Result<(String, serde_json::Value), String> {
    let (key, raw) = value
        .split_once('=')
        .ok_or_else(|| "Format must be 'key=value'".to_string())?;

    if key.trim().is_empty() {
        return Err("Argument name cannot be empty".to_string());
    }

    // Bare words are common ("-a volume=vol0"); fall back to a plain string
    // when the value is not valid JSON.
    let parsed = serde_json::from_str(raw)
        .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()));
    Ok((key.trim().to_string(), parsed))
}

#[cfg(test)]
mod tests {
    use super::parse_arg;
    use serde_json::{Value, json};

    #[test]
    fn parses_json_values_and_bare_strings() {
        assert_eq!(
            parse_arg("volume=vol0").unwrap(),
            ("volume".to_string(), Value::String("vol0".to_string()))
        );
        assert_eq!(
            parse_arg("size=1024").unwrap(),
            ("size".to_string(), json!(1024))
        );
        assert_eq!(
            parse_arg("volumes=[\"a\",\"b\"]").unwrap(),
            ("volumes".to_string(), json!(["a", "b"]))
        );
    }

    #[test]
    fn rejects_malformed_arguments() {
        assert!(parse_arg("no-equals-sign").is_err());
        assert!(parse_arg("=value").is_err());
    }
}
