//! # Session / Transport
//!
//! A [`Session`] owns one target's network connection state: the validated
//! [`Settings`], the negotiated transport, and the protocol version used in the
//! request envelope. [`Session::do_api_call`] executes one remote call end to
//! end: build the XML document, POST it, check HTTP and remote status, decode
//! the declared output fields.
//!
//! Execution is synchronous and blocking; one call occupies the connection for
//! its whole open→send→receive→close lifecycle. A session supports one in-flight
//! call at a time (the call path takes `&mut self`); distinct sessions are fully
//! independent.
pub mod settings;
mod transport;

pub use settings::{AuthStyle, ServerType, Settings, TransportType};

use crate::errors::{OntapiError, OntapiResult};
use crate::marshal::{Argument, Field, de, ser};
use crate::schema::TypeModel;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use serde_json::{Map, Value};
use transport::Transport;

/// The envelope version announced before discovery has run.
const INITIAL_VERSION: &str = "1.0";

/// One target's connection, authentication and envelope state.
#[derive(Debug)]
pub struct Session {
    host: String,
    settings: Settings,
    transport: Transport,
    version: String,
}

impl Session {
    /// Validates `settings` and prepares the transport for `host`.
    ///
    /// Unless HTTP is explicitly pinned, HTTPS reachability is probed once here
    /// (TCP connect with a short timeout); an explicit HTTPS request that turns
    /// out unreachable downgrades to HTTP with a logged warning. No API call is
    /// issued yet.
    pub fn new(host: &str, settings: Settings) -> OntapiResult<Self> {
        let transport = Transport::negotiate(host, &settings)?;
        Ok(Session {
            host: host.to_string(),
            settings,
            transport,
            version: INITIAL_VERSION.to_string(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The negotiated `"major.minor"` protocol version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Installs the discovered protocol version; subsequent envelopes carry it.
    pub(crate) fn set_version(&mut self, version: String) {
        self.version = version;
    }

    /// Executes one remote call end to end and returns the decoded output
    /// fields as a `field name -> value` map.
    pub fn do_api_call(
        &mut self,
        command: &str,
        arguments: &[Argument],
        fields: &[Field],
        model: &TypeModel,
    ) -> OntapiResult<Map<String, Value>> {
        let body = self.request_document(command, arguments, model)?;
        tracing::debug!(command, request = %String::from_utf8_lossy(&body), "XML request");

        let response = self.transport.post(body)?;
        tracing::debug!(command, response = %response, "XML response");

        parse_results(&response, fields, model)
    }

    /// Builds the request document: the `<netapp>` envelope carrying the
    /// negotiated version (and the vfiler scope attribute when configured), one
    /// child element named after the command, and the marshaled arguments in
    /// declaration order.
    fn request_document(
        &self,
        command: &str,
        arguments: &[Argument],
        model: &TypeModel,
    ) -> OntapiResult<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(write_error)?;

        let mut envelope = BytesStart::new("netapp");
        if !self.settings.vfiler.is_empty() {
            envelope.push_attribute(("vfiler", self.settings.vfiler.as_str()));
        }
        envelope.push_attribute(("version", self.version.as_str()));
        writer
            .write_event(Event::Start(envelope))
            .map_err(write_error)?;

        writer
            .write_event(Event::Start(BytesStart::new(command)))
            .map_err(write_error)?;
        for argument in arguments {
            ser::append_argument(&mut writer, argument, model)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(command)))
            .map_err(write_error)?;

        writer
            .write_event(Event::End(BytesEnd::new("netapp")))
            .map_err(write_error)?;

        Ok(writer.into_inner())
    }
}

fn write_error(err: std::io::Error) -> OntapiError {
    OntapiError::Transport(format!("failed to write request XML: {err}"))
}

/// Locates the `<results>` element, checks its status attribute and decodes the
/// declared output fields.
///
/// A status other than `succeeded` is a protocol failure carrying the remote
/// errno and reason (enriched with the well-known error name when the code is
/// in the static table).
fn parse_results(
    body: &str,
    fields: &[Field],
    model: &TypeModel,
) -> OntapiResult<Map<String, Value>> {
    let document = roxmltree::Document::parse(body)
        .map_err(|err| OntapiError::Transport(format!("unparsable response XML: {err}")))?;

    let results = document
        .descendants()
        .find(|node| node.is_element() && node.tag_name().name() == "results")
        .ok_or_else(|| {
            OntapiError::Transport("response contains no <results> element".to_string())
        })?;

    let status = results.attribute("status").unwrap_or_default();
    if status != "succeeded" {
        let errno = results
            .attribute("errno")
            .and_then(|raw| raw.parse::<i32>().ok())
            .unwrap_or(-1);
        let reason = results.attribute("reason").unwrap_or_default();
        return Err(OntapiError::api(errno, reason));
    }

    let mut decoded = Map::new();
    for field in fields {
        decoded.insert(field.name().to_string(), de::read_field(field, results, model)?);
    }
    Ok(decoded)
}
