//! Connection settings: authentication style, transport, server role and the
//! per-role defaults for URL path and port.
//!
//! All enum-valued settings are validated eagerly: an invalid value is a usage
//! error raised before any network I/O happens.
use crate::errors::{OntapiError, OntapiResult};
use std::path::PathBuf;

/// How the session authenticates against the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthStyle {
    /// HTTP Basic authentication with user and password.
    #[default]
    Login,
    /// Host-based trust (`/etc/hosts.equiv` on the target); no credentials sent.
    Hosts,
    /// TLS client certificate.
    Certificate,
}

impl AuthStyle {
    pub fn from_name(name: &str) -> OntapiResult<Self> {
        match name {
            "LOGIN" => Ok(AuthStyle::Login),
            "HOSTS" => Ok(AuthStyle::Hosts),
            "CERTIFICATE" => Ok(AuthStyle::Certificate),
            other => Err(OntapiError::Usage(format!(
                "{other} is not a valid value for style"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportType {
    Http,
    Https,
}

impl TransportType {
    pub fn from_name(name: &str) -> OntapiResult<Self> {
        match name {
            "HTTP" => Ok(TransportType::Http),
            "HTTPS" => Ok(TransportType::Https),
            other => Err(OntapiError::Usage(format!(
                "{other} is not a valid value for transport_type"
            ))),
        }
    }

    pub fn scheme(&self) -> &'static str {
        match self {
            TransportType::Http => "http",
            TransportType::Https => "https",
        }
    }
}

/// The kind of system being managed. Drives the default URL path and port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServerType {
    #[default]
    Filer,
    NetCache,
    Agent,
    Dfm,
}

impl ServerType {
    pub fn from_name(name: &str) -> OntapiResult<Self> {
        match name {
            "Filer" => Ok(ServerType::Filer),
            "NetCache" => Ok(ServerType::NetCache),
            "Agent" => Ok(ServerType::Agent),
            "DFM" => Ok(ServerType::Dfm),
            other => Err(OntapiError::Usage(format!(
                "{other} is not a valid value for server_type"
            ))),
        }
    }

    /// Default request path for this role.
    pub fn default_url(&self) -> &'static str {
        match self {
            ServerType::Filer => "/servlets/netapp.servlets.admin.XMLrequest_filer",
            ServerType::NetCache => "/servlets/netapp.servlets.admin.XMLrequest",
            ServerType::Agent | ServerType::Dfm => "/apis/XMLrequest",
        }
    }

    /// Default port for this role and transport.
    pub fn default_port(&self, transport: TransportType) -> u16 {
        match transport {
            TransportType::Https => match self {
                ServerType::Dfm => 8488,
                _ => 443,
            },
            TransportType::Http => match self {
                ServerType::Filer | ServerType::NetCache => 80,
                ServerType::Agent => 4092,
                ServerType::Dfm => 8081,
            },
        }
    }
}

/// Everything needed to open a session against one target.
#[derive(Debug, Clone)]
pub struct Settings {
    pub user: String,
    pub password: String,
    pub style: AuthStyle,
    /// Multi-tenant scope attribute; empty means unscoped.
    pub vfiler: String,
    pub server_type: ServerType,
    /// `None` means auto-negotiate (probe HTTPS, fall back to HTTP).
    pub transport_type: Option<TransportType>,
    /// Explicit port override; `None` uses the role default.
    pub port: Option<u16>,
    /// Explicit path override; `None` uses the role default.
    pub url: Option<String>,
    pub cert_file: Option<PathBuf>,
    pub key_file: Option<PathBuf>,
    pub ca_file: Option<PathBuf>,
    /// Require a verifiable peer certificate chain.
    pub cert_required: bool,
    /// Verify the peer certificate's common name against the target host.
    pub verify_cn: bool,
    /// Restrict bootstrap to these commands instead of listing all of them.
    pub cmd_list: Option<Vec<String>>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            user: "root".to_string(),
            password: String::new(),
            style: AuthStyle::default(),
            vfiler: String::new(),
            server_type: ServerType::default(),
            transport_type: None,
            port: None,
            url: None,
            cert_file: None,
            key_file: None,
            ca_file: None,
            cert_required: false,
            verify_cn: false,
            cmd_list: None,
        }
    }
}

impl Settings {
    /// Effective request path for the given role.
    pub fn url_path(&self) -> String {
        self.url
            .clone()
            .unwrap_or_else(|| self.server_type.default_url().to_string())
    }

    /// Effective port for the chosen transport.
    pub fn effective_port(&self, transport: TransportType) -> u16 {
        self.port
            .unwrap_or_else(|| self.server_type.default_port(transport))
    }
}
