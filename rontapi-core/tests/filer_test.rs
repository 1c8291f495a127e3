use mock_filer::{MockFiler, fixtures};
use rontapi_core::client::Filer;
use rontapi_core::errors::{DiscoveryStage, OntapiError};
use rontapi_core::registry::FilerRegistry;
use rontapi_core::session::settings::{Settings, TransportType};
use serde_json::{Map, json};

fn settings_for(mock: &MockFiler) -> Settings {
    Settings {
        transport_type: Some(TransportType::Http),
        port: Some(mock.port()),
        ..Settings::default()
    }
}

#[test]
fn bootstrap_discovers_version_types_and_commands() {
    let mock = MockFiler::spawn(fixtures::bootstrap_with(vec![]));
    let filer = Filer::connect(mock.host(), settings_for(&mock)).unwrap();

    assert_eq!(filer.version(), "1.21");

    // Forward reference in the type catalog resolves.
    assert!(filer.model().lookup("volume-info").is_some());
    assert!(filer.model().lookup("volume-size-info").is_some());

    let packages: Vec<_> = filer.packages().collect();
    assert_eq!(packages, vec!["volume"]);

    let package = filer.package("volume").unwrap();
    assert_eq!(package.len(), 2);
    assert!(package.command("list_info").is_some());
    assert!(package.command("rename").is_some());
}

#[test]
fn describe_runs_without_wire_traffic() {
    let mock = MockFiler::spawn(fixtures::bootstrap_with(vec![]));
    let filer = Filer::connect(mock.host(), settings_for(&mock)).unwrap();
    let requests_after_bootstrap = mock.requests().len();

    let info = filer
        .command("volume-list-info")
        .unwrap()
        .describe(filer.model());
    assert_eq!(info.method_name, "list_info");
    assert_eq!(info.optional[0].name, "volume");
    assert_eq!(info.outputs[0].name, "volumes");
    assert_eq!(info.outputs[0].type_name, "volume-info[]");

    assert_eq!(mock.requests().len(), requests_after_bootstrap);
}

#[test]
fn calls_decode_declared_output_fields() {
    let volumes = (
        "volume-list-info",
        r#"<results status="succeeded"><volumes>
<volume-info><name>vol0</name><size><total>100</total><used>40</used></size></volume-info>
<volume-info><name>vol1</name></volume-info>
</volumes></results>"#
            .to_string(),
    );
    let mock = MockFiler::spawn(fixtures::bootstrap_with(vec![volumes]));
    let mut filer = Filer::connect(mock.host(), settings_for(&mock)).unwrap();

    let output = filer.call("volume-list-info", Map::new()).unwrap();
    let volumes = output.get("volumes").unwrap();

    assert_eq!(volumes[0]["name"], json!("vol0"));
    assert_eq!(volumes[0]["size"], json!({"total": 100, "used": 40}));
    assert_eq!(volumes[1]["name"], json!("vol1"));
    assert_eq!(volumes[1]["size"], json!(null));
}

#[test]
fn optional_arguments_are_omitted_from_the_wire() {
    let volumes = (
        "volume-list-info",
        r#"<results status="succeeded"><volumes></volumes></results>"#.to_string(),
    );
    let mock = MockFiler::spawn(fixtures::bootstrap_with(vec![volumes]));
    let mut filer = Filer::connect(mock.host(), settings_for(&mock)).unwrap();

    filer.call("volume-list-info", Map::new()).unwrap();

    let mut kwargs = Map::new();
    kwargs.insert("volume".to_string(), json!("vol0"));
    filer.call("volume-list-info", kwargs).unwrap();

    let requests = mock.requests();
    let bare = &requests[requests.len() - 2];
    let bound = &requests[requests.len() - 1];

    assert!(bare.contains("<volume-list-info></volume-list-info>"));
    assert!(bound.contains("<volume>vol0</volume>"));
}

#[test]
fn vfiler_scope_is_announced_in_the_envelope() {
    let mock = MockFiler::spawn(fixtures::bootstrap_with(vec![]));

    let settings = Settings {
        vfiler: "vfiler0".to_string(),
        ..settings_for(&mock)
    };
    Filer::connect(mock.host(), settings).unwrap();

    let requests = mock.requests();
    assert!(requests[0].contains(r#"vfiler="vfiler0""#));
    // The first envelope announces the pre-discovery version.
    assert!(requests[0].contains(r#"version="1.0""#));
    // Once discovery has run, envelopes carry the negotiated version.
    assert!(requests.last().unwrap().contains(r#"version="1.21""#));
}

#[test]
fn remote_failures_carry_errno_and_reason() {
    let failure = (
        "volume-rename",
        r#"<results status="failed" errno="13040" reason="No volume named 'missing' exists"></results>"#
            .to_string(),
    );
    let mock = MockFiler::spawn(fixtures::bootstrap_with(vec![failure]));
    let mut filer = Filer::connect(mock.host(), settings_for(&mock)).unwrap();

    let mut kwargs = Map::new();
    kwargs.insert("volume".to_string(), json!("missing"));
    kwargs.insert("new_volume_name".to_string(), json!("renamed"));

    let err = filer.call("volume-rename", kwargs).unwrap_err();
    match err {
        OntapiError::Api { errno, reason, .. } => {
            assert_eq!(errno, 13040);
            assert_eq!(reason, "No volume named 'missing' exists");
        }
        other => panic!("expected an API failure, got {other:?}"),
    }
}

#[test]
fn unknown_commands_and_arguments_are_usage_errors() {
    let mock = MockFiler::spawn(fixtures::bootstrap_with(vec![]));
    let mut filer = Filer::connect(mock.host(), settings_for(&mock)).unwrap();

    let err = filer.call("volume-destroy", Map::new()).unwrap_err();
    match err {
        OntapiError::Usage(message) => {
            assert_eq!(message, "No such api command volume-destroy");
        }
        other => panic!("expected a usage error, got {other:?}"),
    }

    let mut kwargs = Map::new();
    kwargs.insert("verbose".to_string(), json!(true));
    let err = filer.call("volume-list-info", kwargs).unwrap_err();
    assert!(matches!(err, OntapiError::Usage(_)));
}

#[test]
fn explicit_command_lists_skip_the_full_listing() {
    let mock = MockFiler::spawn(fixtures::bootstrap_with(vec![]));

    let settings = Settings {
        cmd_list: Some(vec!["volume-rename".to_string()]),
        ..settings_for(&mock)
    };
    Filer::connect(mock.host(), settings).unwrap();

    let requests = mock.requests();
    assert!(!requests.iter().any(|body| body.contains("<system-api-list>")));
    assert!(requests.iter().any(|body| {
        body.contains("<api-list-info>volume-rename</api-list-info>")
    }));
}

#[test]
fn http_status_failures_abort_the_bootstrap() {
    let mock = MockFiler::spawn_failing("500 Internal Server Error");

    let err = Filer::connect(mock.host(), settings_for(&mock)).unwrap_err();
    match err {
        OntapiError::SchemaDiscovery { stage, reason } => {
            assert_eq!(stage, DiscoveryStage::Version);
            assert!(reason.contains("500"), "unexpected reason: {reason}");
        }
        other => panic!("expected a discovery error, got {other:?}"),
    }
}

#[test]
fn unreachable_targets_fail_during_discovery() {
    // Bind a port and drop it again so nothing is listening there.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    let settings = Settings {
        transport_type: Some(TransportType::Http),
        port: Some(port),
        ..Settings::default()
    };
    let err = Filer::connect("127.0.0.1", settings).unwrap_err();
    assert!(matches!(
        err,
        OntapiError::SchemaDiscovery {
            stage: DiscoveryStage::Version,
            ..
        }
    ));
}

#[test]
fn registry_caches_connections_by_target_and_role() {
    let mock = MockFiler::spawn(fixtures::bootstrap_with(vec![]));

    let mut registry = FilerRegistry::default();
    registry
        .create(mock.host(), "default", settings_for(&mock))
        .unwrap();
    let bootstraps = mock.requests().len();

    // A second lookup reuses the cached connection.
    let filer = registry.get(mock.host(), "default").unwrap();
    assert_eq!(filer.version(), "1.21");
    assert_eq!(mock.requests().len(), bootstraps);

    let connected: Vec<_> = registry.connected().collect();
    assert_eq!(connected, vec![(mock.host(), "default")]);

    assert!(registry.drop_connection(mock.host(), "default").is_some());
    assert!(registry.connected().next().is_none());
}
