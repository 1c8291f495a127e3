//! # Connection Registry
//!
//! A [`FilerRegistry`] caches bootstrapped [`Filer`] connections by
//! `(target, role)`, resolving each target's [`Settings`] through the layered
//! [`NaConfig`] overlays before connecting. It is an explicit, caller-owned
//! value (there is no process-wide singleton) and the intended sole caller of
//! [`Filer::connect`] in multi-target deployments.
use crate::client::Filer;
use crate::config::NaConfig;
use crate::errors::OntapiResult;
use crate::session::Settings;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

#[derive(Debug, Default)]
pub struct FilerRegistry {
    config: NaConfig,
    connections: HashMap<(String, String), Filer>,
}

impl FilerRegistry {
    pub fn new(config: NaConfig) -> Self {
        FilerRegistry {
            config,
            connections: HashMap::new(),
        }
    }

    /// The connection for `(name, role)`, connecting with the overlaid
    /// configuration when none is cached yet.
    pub fn get(&mut self, name: &str, role: &str) -> OntapiResult<&mut Filer> {
        match self.connections.entry((name.to_string(), role.to_string())) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let settings = self.config.resolve(name, role)?;
                Ok(entry.insert(Filer::connect(name, settings)?))
            }
        }
    }

    /// Connects `(name, role)` with explicit settings, replacing any cached
    /// connection. Use this where settings differ from the configuration.
    pub fn create(
        &mut self,
        name: &str,
        role: &str,
        settings: Settings,
    ) -> OntapiResult<&mut Filer> {
        let key = (name.to_string(), role.to_string());
        let filer = Filer::connect(name, settings)?;
        Ok(self.connections.entry(key).insert_entry(filer).into_mut())
    }

    /// Drops the cached connection for `(name, role)`, returning it if present.
    /// Dropping has no remote side effects.
    pub fn drop_connection(&mut self, name: &str, role: &str) -> Option<Filer> {
        self.connections
            .remove(&(name.to_string(), role.to_string()))
    }

    /// The `(target, role)` pairs currently cached.
    pub fn connected(&self) -> impl Iterator<Item = (&str, &str)> {
        self.connections
            .keys()
            .map(|(name, role)| (name.as_str(), role.as_str()))
    }
}
