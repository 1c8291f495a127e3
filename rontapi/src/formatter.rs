use colored::*;
use rontapi_core::command::CommandInfo;
use rontapi_core::errors::OntapiError;
use std::fmt::Display;

/// A wrapper struct for a formatted, colored string.
///
/// Implements `Display` so it can be printed directly.
pub struct FormattedString(pub String);

pub struct PackageList(pub Vec<String>);

pub struct CommandList(pub String, pub Vec<String>);

impl std::fmt::Display for FormattedString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f)?;
        writeln!(f, "{}", self.0)?;
        Ok(())
    }
}

impl From<serde_json::Value> for FormattedString {
    fn from(value: serde_json::Value) -> Self {
        FormattedString(serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string()))
    }
}

impl From<OntapiError> for FormattedString {
    fn from(err: OntapiError) -> Self {
        let label = match &err {
            OntapiError::SchemaDiscovery { .. } => "Bootstrap Failed:",
            OntapiError::Transport(_) => "Transport Error:",
            OntapiError::Api { .. } => "API Failed:",
            OntapiError::Usage(_) => "Usage Error:",
            OntapiError::EncryptedUnsupported(_) => "Unsupported:",
        };
        FormattedString(format!("{}\n\n'{}'", label.red().bold(), err))
    }
}

impl From<PackageList> for FormattedString {
    fn from(PackageList(packages): PackageList) -> Self {
        if packages.is_empty() {
            return FormattedString("No packages found.".yellow().to_string());
        }

        let mut out = String::new();
        out.push_str("Available Packages:\n");
        for package in packages {
            out.push_str(&format!("  - {}\n", package.green()));
        }
        FormattedString(out.trim_end().to_string())
    }
}

impl From<CommandList> for FormattedString {
    fn from(CommandList(package, commands): CommandList) -> Self {
        if commands.is_empty() {
            return FormattedString(format!("No commands in '{package}'.").yellow().to_string());
        }

        let mut out = String::new();
        out.push_str(&format!("Commands of {}:\n", package.cyan().bold()));
        for command in commands {
            out.push_str(&format!("  - {}\n", command.green()));
        }
        FormattedString(out.trim_end().to_string())
    }
}

impl From<CommandInfo> for FormattedString {
    fn from(info: CommandInfo) -> Self {
        let mut out = String::new();
        out.push_str(&format!("{}\n", info.name.cyan().bold()));

        push_elements(&mut out, "Required arguments:", &info.required);
        push_elements(&mut out, "Optional arguments:", &info.optional);
        push_elements(&mut out, "Output fields:", &info.outputs);

        FormattedString(out.trim_end().to_string())
    }
}

fn push_elements(
    out: &mut String,
    heading: &str,
    elements: &[rontapi_core::command::DescribedElement],
) {
    out.push_str(&format!("\n{heading}\n"));
    if elements.is_empty() {
        out.push_str("  (none)\n");
        return;
    }
    for element in elements {
        out.push_str(&format!(
            "  - `{}` : {}\n",
            element.name.green(),
            element.type_name
        ));
    }
}

pub struct GenericError<T: Display>(pub &'static str, pub T);

impl<T: Display> From<GenericError<T>> for FormattedString {
    fn from(GenericError(msg, err): GenericError<T>) -> Self {
        FormattedString(format!("{}:\n\n'{}'", msg.red().bold(), err))
    }
}
