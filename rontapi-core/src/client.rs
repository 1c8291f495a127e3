//! # Client Facade
//!
//! A [`Filer`] is one bootstrapped connection: a [`Session`] plus the discovered
//! catalog. Connecting runs the full schema bootstrap; the per-package
//! namespaces do not exist until it has completed, so a `Filer` value is always
//! fully usable.
//!
//! Calls go through the dispatch table: [`Filer::call`] takes the full dashed
//! command name, [`Filer::invoke`] a package/method pair; both bind the named
//! arguments against the discovered declaration and return the decoded output
//! fields. The read-only explorer accessors ([`Filer::packages`],
//! [`Filer::package`], [`ApiCommand::describe`]) issue no wire traffic.
use crate::bootstrap::{self, Catalog};
use crate::command::{ApiCommand, ApiPackage};
use crate::errors::{OntapiError, OntapiResult};
use crate::schema::TypeModel;
use crate::session::{Session, Settings};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One bootstrapped connection to a storage system.
#[derive(Debug)]
pub struct Filer {
    session: Session,
    model: TypeModel,
    packages: BTreeMap<String, ApiPackage>,
}

impl Filer {
    /// Opens a session against `host` and discovers the remote schema.
    ///
    /// Transport negotiation, version discovery and catalog generation all run
    /// here; any failure aborts construction and nothing is exposed.
    pub fn connect(host: &str, settings: Settings) -> OntapiResult<Self> {
        let mut session = Session::new(host, settings)?;
        let Catalog {
            version: _,
            model,
            packages,
        } = bootstrap::discover(&mut session)?;
        Ok(Filer {
            session,
            model,
            packages,
        })
    }

    pub fn host(&self) -> &str {
        self.session.host()
    }

    /// The negotiated `"major.minor"` ONTAPI version.
    pub fn version(&self) -> &str {
        self.session.version()
    }

    /// The resolved type model (read-only).
    pub fn model(&self) -> &TypeModel {
        &self.model
    }

    /// Package names discovered at bootstrap, sorted.
    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    /// One package's command namespace.
    pub fn package(&self, name: &str) -> Option<&ApiPackage> {
        self.packages.get(name)
    }

    /// Invokes a command by its full dashed name, e.g.
    /// `call("volume-list-info", args)`.
    pub fn call(
        &mut self,
        api_command_name: &str,
        kwargs: Map<String, Value>,
    ) -> OntapiResult<Map<String, Value>> {
        let package = api_command_name
            .split('-')
            .next()
            .unwrap_or(api_command_name);
        let command_name = api_command_name
            .strip_prefix(package)
            .map(|rest| rest.trim_start_matches('-'))
            .unwrap_or_default();
        self.invoke(package, command_name, kwargs)
    }

    /// Invokes `method` (method name or dashed command name) of `package` with
    /// named arguments.
    pub fn invoke(
        &mut self,
        package: &str,
        method: &str,
        kwargs: Map<String, Value>,
    ) -> OntapiResult<Map<String, Value>> {
        let command = self
            .packages
            .get(package)
            .and_then(|pkg| pkg.command(method))
            .ok_or_else(|| {
                OntapiError::Usage(format!("No such api command {package}-{method}"))
            })?
            .clone();

        let (arguments, fields) = command.bind(&kwargs)?;
        self.session
            .do_api_call(&command.name, &arguments, &fields, &self.model)
    }

    /// Finds one command descriptor by its full dashed name.
    pub fn command(&self, api_command_name: &str) -> Option<&ApiCommand> {
        let package = api_command_name.split('-').next()?;
        let rest = api_command_name
            .strip_prefix(package)?
            .trim_start_matches('-');
        self.packages.get(package)?.command(rest)
    }
}
