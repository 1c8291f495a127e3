//! # Error Model
//!
//! Every failure surfaced by this crate is an [`OntapiError`]. Remote failures carry
//! the errno and reason reported by the target; when the errno is listed in the
//! static table of well-known ONTAPI error numbers, the matching symbolic name is
//! attached to the message as well.
mod errno;

pub use errno::error_name;

use std::fmt;

/// Convenience alias used across the crate.
pub type OntapiResult<T> = Result<T, OntapiError>;

/// The bootstrap step that was running when schema discovery failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryStage {
    /// The version-query command (`system-get-ontapi-version`).
    Version,
    /// The type-catalog command (`system-api-list-types`).
    TypeCatalog,
    /// The command-list or command-elements query.
    CommandCatalog,
}

impl fmt::Display for DiscoveryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiscoveryStage::Version => "version discovery",
            DiscoveryStage::TypeCatalog => "type catalog discovery",
            DiscoveryStage::CommandCatalog => "command catalog discovery",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OntapiError {
    /// A discovery command failed or the returned schema could not be resolved.
    /// Fatal: the session is never exposed in a partially bootstrapped state.
    #[error("schema discovery failed during {stage}: {reason}")]
    SchemaDiscovery {
        stage: DiscoveryStage,
        reason: String,
    },

    /// Socket, TLS or HTTP-status failure while executing a call.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The remote system answered with `status != "succeeded"`.
    #[error("{}", api_failure_message(*errno, reason, *errname))]
    Api {
        errno: i32,
        reason: String,
        /// Symbolic name from the static errno table, when known.
        errname: Option<&'static str>,
    },

    /// Caller-side mistake: unknown command, unexpected keyword argument,
    /// invalid configuration value.
    #[error("{0}")]
    Usage(String),

    /// Content of an encrypted-flagged element was accessed.
    #[error("encrypted element '{0}' is not supported")]
    EncryptedUnsupported(String),
}

impl OntapiError {
    /// Builds an [`OntapiError::Api`], looking the errno up in the static table.
    pub fn api(errno: i32, reason: impl Into<String>) -> Self {
        OntapiError::Api {
            errno,
            reason: reason.into(),
            errname: errno::error_name(errno),
        }
    }

    /// Remote errno of an API failure, `None` for every other kind.
    pub fn errno(&self) -> Option<i32> {
        match self {
            OntapiError::Api { errno, .. } => Some(*errno),
            _ => None,
        }
    }
}

fn api_failure_message(errno: i32, reason: &str, errname: Option<&'static str>) -> String {
    if errno > -1 {
        format!(
            "{reason} (Err Nr. {errno} - {})",
            errname.unwrap_or_default()
        )
    } else {
        reason.to_string()
    }
}
