//! Canned ONTAPI responder for integration tests.
//!
//! Listens on a real TCP socket, reads one HTTP POST per connection, picks the
//! response by the command element found in the request body and replies with
//! the canned `<results>` payload wrapped in the ONTAPI envelope. Connections
//! are not kept alive, matching the protocol's one-call-per-connection model.
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

/// One canned route: the dashed command name and the inner `<results>` element.
pub type Route = (&'static str, String);

pub struct MockFiler {
    port: u16,
    /// Requests seen so far, in arrival order (the raw XML bodies).
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockFiler {
    /// Starts the responder on an ephemeral port with the given routes.
    ///
    /// A request whose body contains no routed command element is answered with
    /// a failed `<results>` so that mis-matched tests fail loudly instead of
    /// hanging.
    pub fn spawn(routes: Vec<Route>) -> Self {
        Self::spawn_with(routes, None)
    }

    /// Starts a responder that answers every request with the given HTTP status
    /// line (e.g. `"500 Internal Server Error"`) and an empty body.
    pub fn spawn_failing(status: &'static str) -> Self {
        Self::spawn_with(Vec::new(), Some(status))
    }

    fn spawn_with(routes: Vec<Route>, fail_status: Option<&'static str>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock listener");
        let port = listener.local_addr().expect("local addr").port();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let seen = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                let routes = routes.clone();
                let seen = Arc::clone(&seen);
                thread::spawn(move || handle(stream, &routes, fail_status, &seen));
            }
        });

        MockFiler { port, requests }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn host(&self) -> &'static str {
        "127.0.0.1"
    }

    /// The request bodies received so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("requests lock").clone()
    }
}

fn handle(
    mut stream: TcpStream,
    routes: &[Route],
    fail_status: Option<&'static str>,
    seen: &Arc<Mutex<Vec<String>>>,
) {
    let Some(body) = read_request(&mut stream) else {
        return;
    };
    seen.lock().expect("requests lock").push(body.clone());

    if let Some(status) = fail_status {
        let response =
            format!("HTTP/1.1 {status}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        let _ = stream.write_all(response.as_bytes());
        return;
    }

    let results = routes
        .iter()
        .find(|(command, _)| body.contains(&format!("<{command}>")))
        .map(|(_, results)| results.clone())
        .unwrap_or_else(|| {
            r#"<results status="failed" errno="-1" reason="no canned response"></results>"#
                .to_string()
        });

    let payload = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<netapp version=\"1.21\">{results}</netapp>"
    );
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        payload.len(),
        payload
    );
    let _ = stream.write_all(response.as_bytes());
}

/// Reads one HTTP request, honoring Content-Length, and returns its body.
fn read_request(stream: &mut TcpStream) -> Option<String> {
    let mut reader = BufReader::new(stream);
    let mut content_length = 0usize;

    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).ok()? == 0 {
            return None;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':')
            && name.eq_ignore_ascii_case("content-length")
        {
            content_length = value.trim().parse().ok()?;
        }
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).ok()?;
    Some(String::from_utf8_lossy(&body).into_owned())
}

/// Canned payloads for the discovery sequence and a tiny `volume` package.
pub mod fixtures {
    use super::Route;

    /// `system-get-ontapi-version` reply.
    pub fn version() -> Route {
        (
            "system-get-ontapi-version",
            r#"<results status="succeeded"><major-version>1</major-version><minor-version>21</minor-version></results>"#
                .to_string(),
        )
    }

    /// `system-api-list-types` reply declaring `volume-info` before the
    /// forward-referenced `volume-size-info` it contains.
    pub fn type_catalog() -> Route {
        (
            "system-api-list-types",
            r#"<results status="succeeded"><type-entries>
<system-api-type-entry-info><name>volume-info</name><type-elements>
<system-api-element-info><name>name</name><type>string</type></system-api-element-info>
<system-api-element-info><name>size</name><type>volume-size-info</type><is-optional>true</is-optional></system-api-element-info>
</type-elements></system-api-type-entry-info>
<system-api-type-entry-info><name>volume-size-info</name><type-elements>
<system-api-element-info><name>total</name><type>integer</type></system-api-element-info>
<system-api-element-info><name>used</name><type>integer</type></system-api-element-info>
</type-elements></system-api-type-entry-info>
</type-entries></results>"#
                .to_string(),
        )
    }

    /// `system-api-list` reply naming the commands of the `volume` package.
    pub fn api_list() -> Route {
        (
            "system-api-list",
            r#"<results status="succeeded"><apis>
<system-api-info><name>volume-list-info</name></system-api-info>
<system-api-info><name>volume-rename</name></system-api-info>
</apis></results>"#
                .to_string(),
        )
    }

    /// `system-api-get-elements` reply declaring both commands' elements.
    pub fn api_elements() -> Route {
        (
            "system-api-get-elements",
            r#"<results status="succeeded"><api-entries>
<system-api-entry-info><name>volume-list-info</name><api-elements>
<system-api-element-info><name>volume</name><type>string</type><is-optional>true</is-optional></system-api-element-info>
<system-api-element-info><name>volumes</name><type>volume-info[]</type><is-output>true</is-output></system-api-element-info>
</api-elements></system-api-entry-info>
<system-api-entry-info><name>volume-rename</name><api-elements>
<system-api-element-info><name>volume</name><type>string</type></system-api-element-info>
<system-api-element-info><name>new-volume-name</name><type>string</type></system-api-element-info>
</api-elements></system-api-entry-info>
</api-entries></results>"#
                .to_string(),
        )
    }

    /// The whole bootstrap conversation plus any extra routes.
    pub fn bootstrap_with(extra: Vec<Route>) -> Vec<Route> {
        let mut routes = vec![version(), type_catalog(), api_list(), api_elements()];
        routes.extend(extra);
        routes
    }
}
