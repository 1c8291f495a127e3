//! HTTP(S) transport: auto-negotiation, TLS material and the single-POST call
//! path with the one recovered failure (HTTPS handshake → HTTP retry).
use super::settings::{AuthStyle, Settings, TransportType};
use crate::errors::{OntapiError, OntapiResult};
use reqwest::blocking::Client;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Budget for the HTTPS reachability probe at construction.
const PROBE_TIMEOUT: Duration = Duration::from_millis(250);

/// Connect/handshake deadline per call. Once a response begins streaming there
/// is no read deadline.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
pub(crate) struct Transport {
    host: String,
    settings: Settings,
    transport_type: TransportType,
    /// True when auto-negotiation (the probe) chose HTTPS; only then may a
    /// failed TLS handshake fall back to HTTP.
    negotiated: bool,
    client: Client,
}

impl Transport {
    /// Chooses the transport for `host` and builds the HTTP client.
    ///
    /// Unless HTTP is explicitly pinned, TCP reachability of the HTTPS port is
    /// probed once with a short timeout: success pins HTTPS, failure pins HTTP.
    /// If HTTPS was explicitly requested but is unreachable, the downgrade is
    /// logged as a warning.
    pub fn negotiate(host: &str, settings: &Settings) -> OntapiResult<Self> {
        let (transport_type, negotiated) = match settings.transport_type {
            Some(TransportType::Http) => (TransportType::Http, false),
            requested => {
                let port = settings.effective_port(TransportType::Https);
                if probe(host, port) {
                    tracing::debug!(host, "HTTPS test was successful");
                    (TransportType::Https, true)
                } else {
                    if requested == Some(TransportType::Https) {
                        tracing::warn!(host, "HTTPS was specified but is unreachable, falling back to HTTP");
                    }
                    (TransportType::Http, false)
                }
            }
        };

        let client = build_client(transport_type, settings)?;
        Ok(Transport {
            host: host.to_string(),
            settings: settings.clone(),
            transport_type,
            negotiated,
            client,
        })
    }

    /// Sends one request document and returns the response body.
    ///
    /// Exactly one failure is recovered: a failed connect/handshake after
    /// auto-negotiation chose HTTPS downgrades to HTTP and retries the send
    /// once. Every other transport failure is fatal to the call.
    pub fn post(&mut self, body: Vec<u8>) -> OntapiResult<String> {
        let response = match self.send(&body) {
            Ok(response) => response,
            Err(err)
                if self.transport_type == TransportType::Https
                    && self.negotiated
                    && err.is_connect() =>
            {
                tracing::warn!(
                    host = %self.host,
                    "TLS handshake failed after negotiation, retrying over HTTP"
                );
                self.transport_type = TransportType::Http;
                self.client = build_client(TransportType::Http, &self.settings)?;
                self.send(&body)
                    .map_err(|err| OntapiError::Transport(err.to_string()))?
            }
            Err(err) => return Err(OntapiError::Transport(err.to_string())),
        };

        let status = response.status();
        if !status.is_success() {
            return Err(OntapiError::Transport(format!(
                "HTTP result status {} \"{}\"",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .text()
            .map_err(|err| OntapiError::Transport(format!("failed to read response: {err}")))
    }

    fn send(&self, body: &[u8]) -> Result<reqwest::blocking::Response, reqwest::Error> {
        let url = format!(
            "{}://{}:{}{}",
            self.transport_type.scheme(),
            self.host,
            self.settings.effective_port(self.transport_type),
            self.settings.url_path()
        );

        let mut request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "text/xml; charset=\"UTF-8\"")
            .header(CONTENT_LENGTH, body.len())
            .body(body.to_vec());

        if self.settings.style == AuthStyle::Login {
            request = request.basic_auth(&self.settings.user, Some(&self.settings.password));
        }

        request.send()
    }
}

/// TCP reachability probe used by the transport negotiation.
fn probe(host: &str, port: u16) -> bool {
    let Ok(mut addrs) = (host, port).to_socket_addrs() else {
        return false;
    };
    addrs.any(|addr| TcpStream::connect_timeout(&addr, PROBE_TIMEOUT).is_ok())
}

/// Builds the blocking client for the chosen transport, wiring up the TLS
/// material and verification toggles for certificate-style sessions.
///
/// Management appliances routinely present self-signed certificates, so
/// non-certificate styles skip peer verification; certificate style honors the
/// `cert_required` and `verify_cn` toggles (common-name verification happens in
/// the TLS layer, before any header is sent, and fails closed on mismatch).
fn build_client(transport_type: TransportType, settings: &Settings) -> OntapiResult<Client> {
    let mut builder = Client::builder().connect_timeout(CONNECT_TIMEOUT);

    if transport_type == TransportType::Https {
        if settings.style == AuthStyle::Certificate {
            builder = builder.identity(load_identity(settings)?);
            if let Some(ca_file) = &settings.ca_file {
                let pem = std::fs::read(ca_file).map_err(|err| {
                    OntapiError::Usage(format!("cannot read ca_file {}: {err}", ca_file.display()))
                })?;
                let certificate = reqwest::Certificate::from_pem(&pem)
                    .map_err(|err| OntapiError::Usage(format!("invalid ca_file: {err}")))?;
                builder = builder.add_root_certificate(certificate);
            }
            builder = builder
                .danger_accept_invalid_certs(!settings.cert_required)
                .danger_accept_invalid_hostnames(!settings.verify_cn);
        } else {
            builder = builder
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true);
        }
    }

    builder
        .build()
        .map_err(|err| OntapiError::Transport(format!("failed to build HTTP client: {err}")))
}

fn load_identity(settings: &Settings) -> OntapiResult<reqwest::Identity> {
    let (Some(cert_file), Some(key_file)) = (&settings.cert_file, &settings.key_file) else {
        return Err(OntapiError::Usage(
            "certificate style requires cert_file and key_file".to_string(),
        ));
    };
    let cert = std::fs::read(cert_file).map_err(|err| {
        OntapiError::Usage(format!("cannot read cert_file {}: {err}", cert_file.display()))
    })?;
    let key = std::fs::read(key_file).map_err(|err| {
        OntapiError::Usage(format!("cannot read key_file {}: {err}", key_file.display()))
    })?;
    reqwest::Identity::from_pkcs8_pem(&cert, &key)
        .map_err(|err| OntapiError::Usage(format!("invalid client certificate material: {err}")))
}
