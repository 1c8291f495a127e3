use rontapi_core::command::{ApiCommand, ApiPackage};
use rontapi_core::errors::OntapiError;
use rontapi_core::schema::{PrimitiveType, TypeElement, TypeModel, TypeRef};
use serde_json::{Map, Value, json};

const STRING: TypeRef = TypeRef::Primitive(PrimitiveType::String);
const INTEGER: TypeRef = TypeRef::Primitive(PrimitiveType::Integer);

fn volume_list_info() -> ApiCommand {
    ApiCommand::new(
        "volume-list-info",
        vec![
            TypeElement::new("volume", STRING).optional(),
            TypeElement::new("max-records", INTEGER).optional(),
            TypeElement::new("volumes", STRING).array().output(),
        ],
    )
}

#[test]
fn method_names_strip_the_package_prefix() {
    assert_eq!(volume_list_info().method_name(), "list_info");
    assert_eq!(volume_list_info().package(), "volume");
    assert_eq!(volume_list_info().command_name(), "list-info");
}

#[test]
fn degenerate_method_names_fall_back_to_the_full_name() {
    // "cifs-break" would collapse to the keyword "break".
    let command = ApiCommand::new("cifs-break", vec![]);
    assert_eq!(command.method_name(), "cifs_break");

    // A leading digit is not a legal identifier either.
    let command = ApiCommand::new("iscsi-7g-status", vec![]);
    assert_eq!(command.method_name(), "iscsi_7g_status");

    let command = ApiCommand::new("volume-list-info", vec![]);
    assert_eq!(command.method_name(), "list_info");
}

#[test]
fn bind_matches_arguments_by_underscored_name() {
    let command = volume_list_info();

    let mut kwargs = Map::new();
    kwargs.insert("volume".to_string(), json!("vol0"));
    kwargs.insert("max_records".to_string(), json!(20));

    let (arguments, fields) = command.bind(&kwargs).unwrap();
    assert_eq!(arguments.len(), 2);
    assert_eq!(arguments[0].value, json!("vol0"));
    assert_eq!(arguments[1].value, json!(20));

    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].name(), "volumes");
}

#[test]
fn bind_applies_schema_defaults_for_unbound_arguments() {
    let command = volume_list_info();

    let (arguments, _) = command.bind(&Map::new()).unwrap();
    // Plain string elements default to the empty string, everything else to null.
    assert_eq!(arguments[0].value, json!(""));
    assert_eq!(arguments[1].value, Value::Null);
}

#[test]
fn bind_rejects_unexpected_keyword_arguments() {
    let command = volume_list_info();

    let mut kwargs = Map::new();
    kwargs.insert("verbose".to_string(), json!(true));

    let err = command.bind(&kwargs).unwrap_err();
    match err {
        OntapiError::Usage(message) => {
            assert_eq!(
                message,
                "list_info() got an unexpected keyword argument 'verbose'"
            );
        }
        other => panic!("expected a usage error, got {other:?}"),
    }
}

#[test]
fn describe_partitions_elements_by_direction_and_optionality() {
    let command = ApiCommand::new(
        "volume-rename",
        vec![
            TypeElement::new("volume", STRING),
            TypeElement::new("new-volume-name", STRING),
            TypeElement::new("force", STRING).optional(),
        ],
    );

    let info = command.describe(&TypeModel::new());
    assert_eq!(info.name, "volume-rename");
    assert_eq!(info.method_name, "rename");
    assert_eq!(info.required.len(), 2);
    assert_eq!(info.required[0].name, "volume");
    assert_eq!(info.required[1].name, "new_volume_name");
    assert_eq!(info.optional.len(), 1);
    assert!(info.outputs.is_empty());
}

#[test]
fn packages_dispatch_by_method_or_dashed_name() {
    let package = ApiPackage::new(vec![
        volume_list_info(),
        ApiCommand::new("volume-rename", vec![]),
    ]);

    assert_eq!(package.len(), 2);
    assert_eq!(
        package.command("list_info").unwrap().name,
        "volume-list-info"
    );
    assert_eq!(
        package.command("list-info").unwrap().name,
        "volume-list-info"
    );
    assert!(package.command("destroy").is_none());
}
