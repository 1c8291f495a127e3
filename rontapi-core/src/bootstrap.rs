//! # Schema Bootstrap
//!
//! The linear, fail-fast discovery sequence that runs exactly once per session:
//!
//! 1. query the protocol version (`system-get-ontapi-version`),
//! 2. fetch the type catalog (`system-api-list-types`) and resolve it in two
//!    passes,
//! 3. list the invokable commands (`system-api-list`), or take the caller's
//!    explicit allow-list, and fetch their element declarations
//!    (`system-api-get-elements`),
//! 4. build the `{package -> ApiPackage}` catalog.
//!
//! There are no retries and no partial results: any failure aborts session
//! construction with a [`SchemaDiscovery`](crate::errors::OntapiError::SchemaDiscovery)
//! error naming the step that failed, and the facade exposes no namespace until
//! the final step has completed. A changed remote schema requires a new session.
mod system;

use crate::command::{ApiCommand, ApiPackage};
use crate::errors::{DiscoveryStage, OntapiError, OntapiResult};
use crate::schema::{TypeModel, resolve};
use crate::session::Session;
use serde_json::Value;
use std::collections::BTreeMap;
use system::SystemApi;

/// Everything discovery produced: immutable for the rest of the session.
#[derive(Debug, Clone)]
pub struct Catalog {
    /// Negotiated `"major.minor"` protocol version.
    pub version: String,
    pub model: TypeModel,
    pub packages: BTreeMap<String, ApiPackage>,
}

/// Runs the full discovery sequence against `session`.
pub fn discover(session: &mut Session) -> OntapiResult<Catalog> {
    let system = SystemApi::new();

    let version = query_version(&system, session)?;
    session.set_version(version.clone());

    let model = query_type_model(&system, session)?;
    let packages = query_commands(&system, session, &model)?;

    Ok(Catalog {
        version,
        model,
        packages,
    })
}

fn query_version(system: &SystemApi, session: &mut Session) -> OntapiResult<String> {
    let result = system
        .get_ontapi_version(session)
        .map_err(|err| discovery_error(DiscoveryStage::Version, &err))?;

    let major = integer_entry(&result, "major-version");
    let minor = integer_entry(&result, "minor-version");
    match (major, minor) {
        (Some(major), Some(minor)) => Ok(format!("{major}.{minor}")),
        _ => Err(OntapiError::SchemaDiscovery {
            stage: DiscoveryStage::Version,
            reason: "version reply misses major-version/minor-version".to_string(),
        }),
    }
}

fn query_type_model(system: &SystemApi, session: &mut Session) -> OntapiResult<TypeModel> {
    let result = system
        .api_list_types(session)
        .map_err(|err| discovery_error(DiscoveryStage::TypeCatalog, &err))?;

    let entries = array_entry(&result, "type-entries");
    resolve::build_type_model(&entries)
}

fn query_commands(
    system: &SystemApi,
    session: &mut Session,
    model: &TypeModel,
) -> OntapiResult<BTreeMap<String, ApiPackage>> {
    // Either list everything the target offers, or honor the caller's explicit
    // command allow-list and skip the full listing.
    let command_names = match session.settings().cmd_list.clone() {
        Some(names) => names,
        None => {
            let result = system
                .api_list(session)
                .map_err(|err| discovery_error(DiscoveryStage::CommandCatalog, &err))?;
            array_entry(&result, "apis")
                .iter()
                .filter_map(|api| api.get("name").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        }
    };

    let result = system
        .api_get_elements(session, &command_names)
        .map_err(|err| discovery_error(DiscoveryStage::CommandCatalog, &err))?;

    let mut grouped: BTreeMap<String, Vec<ApiCommand>> = BTreeMap::new();
    for entry in array_entry(&result, "api-entries") {
        let Some(name) = entry.get("name").and_then(Value::as_str) else {
            continue;
        };
        let elements = match entry.get("api-elements") {
            Some(Value::Array(items)) => resolve::resolve_command_elements(items, model)?,
            _ => Vec::new(),
        };
        let command = ApiCommand::new(name, elements);
        grouped
            .entry(command.package().to_string())
            .or_default()
            .push(command);
    }

    Ok(grouped
        .into_iter()
        .map(|(package, commands)| (package, ApiPackage::new(commands)))
        .collect())
}

fn discovery_error(stage: DiscoveryStage, err: &OntapiError) -> OntapiError {
    OntapiError::SchemaDiscovery {
        stage,
        reason: err.to_string(),
    }
}

fn integer_entry(result: &serde_json::Map<String, Value>, key: &str) -> Option<i64> {
    result.get(key).and_then(Value::as_i64)
}

fn array_entry(result: &serde_json::Map<String, Value>, key: &str) -> Vec<Value> {
    match result.get(key) {
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
}
