//! # Layered Connection Configuration
//!
//! [`NaConfig`] holds connection settings for a fleet of targets, organized as
//! role defaults plus per-target overrides:
//!
//! ```json
//! {
//!   "roles": {
//!     "default": { "user": "root", "style": "LOGIN" },
//!     "backup":  { "user": "backup-operator" }
//!   },
//!   "filer-roles": {
//!     "filer01": {
//!       "default": { "password": "secret" },
//!       "backup":  { "transport_type": "HTTPS" }
//!     }
//!   }
//! }
//! ```
//!
//! Resolution overlays four layers onto the built-in defaults, most specific
//! last: the `default` role, the target's `default` entry, the requested role,
//! and the target's entry for that role. Enum-valued entries are validated while
//! the overlay is applied, before any network I/O.
use crate::errors::{OntapiError, OntapiResult};
use crate::session::settings::{AuthStyle, ServerType, Settings, TransportType};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One configuration layer: only the entries that are present are applied.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsPatch {
    pub user: Option<String>,
    pub password: Option<String>,
    pub style: Option<String>,
    pub vfiler: Option<String>,
    pub server_type: Option<String>,
    pub transport_type: Option<String>,
    pub port: Option<u16>,
    pub url: Option<String>,
    pub cert_file: Option<PathBuf>,
    pub key_file: Option<PathBuf>,
    pub ca_file: Option<PathBuf>,
    pub cert_required: Option<bool>,
    pub verify_cn: Option<bool>,
    pub cmd_list: Option<Vec<String>>,
}

impl SettingsPatch {
    /// Applies this layer onto `settings`, validating enum values.
    pub fn apply(&self, settings: &mut Settings) -> OntapiResult<()> {
        if let Some(user) = &self.user {
            settings.user = user.clone();
        }
        if let Some(password) = &self.password {
            settings.password = password.clone();
        }
        if let Some(style) = &self.style {
            settings.style = AuthStyle::from_name(style)?;
        }
        if let Some(vfiler) = &self.vfiler {
            settings.vfiler = vfiler.clone();
        }
        if let Some(server_type) = &self.server_type {
            settings.server_type = ServerType::from_name(server_type)?;
        }
        if let Some(transport_type) = &self.transport_type {
            settings.transport_type = Some(TransportType::from_name(transport_type)?);
        }
        if let Some(port) = self.port {
            settings.port = Some(port);
        }
        if let Some(url) = &self.url {
            settings.url = Some(url.clone());
        }
        if let Some(cert_file) = &self.cert_file {
            settings.cert_file = Some(cert_file.clone());
        }
        if let Some(key_file) = &self.key_file {
            settings.key_file = Some(key_file.clone());
        }
        if let Some(ca_file) = &self.ca_file {
            settings.ca_file = Some(ca_file.clone());
        }
        if let Some(cert_required) = self.cert_required {
            settings.cert_required = cert_required;
        }
        if let Some(verify_cn) = self.verify_cn {
            settings.verify_cn = verify_cn;
        }
        if let Some(cmd_list) = &self.cmd_list {
            settings.cmd_list = Some(cmd_list.clone());
        }
        Ok(())
    }
}

/// Role defaults and per-target role overrides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NaConfig {
    pub roles: BTreeMap<String, SettingsPatch>,
    #[serde(rename = "filer-roles")]
    pub filer_roles: BTreeMap<String, BTreeMap<String, SettingsPatch>>,
}

impl NaConfig {
    /// Loads a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> OntapiResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| {
            OntapiError::Usage(format!("cannot read config {}: {err}", path.display()))
        })?;
        serde_json::from_str(&raw).map_err(|err| {
            OntapiError::Usage(format!("invalid config {}: {err}", path.display()))
        })
    }

    /// Resolves the effective [`Settings`] for `(name, role)`.
    pub fn resolve(&self, name: &str, role: &str) -> OntapiResult<Settings> {
        let mut settings = Settings::default();

        if let Some(patch) = self.roles.get("default") {
            patch.apply(&mut settings)?;
        }
        if let Some(patch) = self.filer_roles.get(name).and_then(|r| r.get("default")) {
            patch.apply(&mut settings)?;
        }
        if role != "default" {
            if let Some(patch) = self.roles.get(role) {
                patch.apply(&mut settings)?;
            }
            if let Some(patch) = self.filer_roles.get(name).and_then(|r| r.get(role)) {
                patch.apply(&mut settings)?;
            }
        }

        Ok(settings)
    }
}
