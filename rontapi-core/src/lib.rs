//! # Rontapi Core
//!
//! `rontapi_core` is the foundational library powering the Rontapi CLI. It provides a
//! dynamic client for the ONTAPI XML-over-HTTP management protocol spoken by NetApp
//! storage systems, capable of talking to any target without compile-time knowledge
//! of the remote schema.
//!
//! Instead of shipping generated stubs, the client discovers its own contract at
//! connect time: it queries the target for its protocol version, its catalog of
//! composite types and its catalog of invokable commands, then builds an in-memory
//! type model and a dispatch table of callable command bindings.
//!
//! ## Key Components
//!
//! * **[`Filer`](client::Filer):** The main entry point. Connecting runs the schema
//!   bootstrap and exposes one namespace per command package, plus a generic
//!   `call` dispatcher working on full dashed command names.
//! * **[`FilerRegistry`](registry::FilerRegistry):** A caller-owned connection cache
//!   keyed by `(target, role)`, applying the layered [`NaConfig`](config::NaConfig)
//!   overlays before each connect.
//!
//! ## Internal modules
//!
//! We've decided to expose the lower layers that we use internally so that callers
//! with unusual needs can drive them directly:
//!
//! * **[`Session`](session::Session):** Owns the HTTP(S) connection, authentication
//!   and the per-call envelope; executes one raw API call end to end.
//! * **[`schema`]:** The resolved type model (primitives plus the arena of named
//!   composite types declared by the remote catalog).
//! * **[`marshal`]:** Converts bound values to and from the wire XML, driven by the
//!   type model.
//! * **[`bootstrap`]:** The fail-fast discovery sequence building the catalog.
//!
//! ## Dynamic values
//!
//! Arguments and decoded output fields are represented as [`serde_json::Value`]:
//! callers pass JSON-shaped data in and receive JSON-shaped results, with the
//! marshaling engine validating the shape against the discovered schema.
pub mod bootstrap;
pub mod client;
pub mod command;
pub mod config;
pub mod errors;
pub mod marshal;
pub mod registry;
pub mod schema;
pub mod session;

// Re-export so consumers use a compatible version of the dynamic value type.
pub use serde_json;

pub use client::Filer;
pub use errors::{OntapiError, OntapiResult};
pub use registry::FilerRegistry;
pub use session::{Session, Settings};
