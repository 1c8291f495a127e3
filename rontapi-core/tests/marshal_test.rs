use roxmltree::Document;
use rontapi_core::errors::OntapiError;
use rontapi_core::marshal::{Argument, Field, de, ser};
use rontapi_core::schema::{PrimitiveType, TypeElement, TypeModel, TypeRef};
use serde_json::{Value, json};

const STRING: TypeRef = TypeRef::Primitive(PrimitiveType::String);
const INTEGER: TypeRef = TypeRef::Primitive(PrimitiveType::Integer);
const BOOLEAN: TypeRef = TypeRef::Primitive(PrimitiveType::Boolean);

/// A small model: `size-info { total, used }`, the bare-value `volume-name`
/// and `volume-info { name, size-info, aggr-list }`.
fn test_model() -> TypeModel {
    let mut model = TypeModel::new();

    let size_info = model.register("size-info");
    model.install_elements(
        size_info,
        vec![
            TypeElement::new("total", INTEGER),
            TypeElement::new("used", INTEGER),
        ],
    );

    let volume_name = model.register("volume-name");
    model.install_elements(volume_name, vec![TypeElement::new("", STRING)]);

    let volume_info = model.register("volume-info");
    model.install_elements(
        volume_info,
        vec![
            TypeElement::new("name", STRING),
            TypeElement::new("size-info", TypeRef::Named(size_info)).optional(),
            TypeElement::new("aggr-list", STRING).array().optional(),
        ],
    );

    model
}

fn named(model: &TypeModel, name: &str) -> TypeRef {
    TypeRef::Named(model.lookup(name).unwrap())
}

fn results(xml: &str) -> String {
    format!(r#"<results status="succeeded">{xml}</results>"#)
}

#[test]
fn serializes_primitive_arguments() {
    let model = test_model();

    let arg = Argument::new(json!("vol0"), TypeElement::new("volume", STRING));
    assert_eq!(
        ser::to_xml_fragment(&arg, &model).unwrap(),
        "<volume>vol0</volume>"
    );

    let arg = Argument::new(json!(42), TypeElement::new("max-records", INTEGER));
    assert_eq!(
        ser::to_xml_fragment(&arg, &model).unwrap(),
        "<max-records>42</max-records>"
    );

    let arg = Argument::new(json!(true), TypeElement::new("verbose", BOOLEAN));
    assert_eq!(
        ser::to_xml_fragment(&arg, &model).unwrap(),
        "<verbose>true</verbose>"
    );
}

#[test]
fn omits_unset_optional_arguments() {
    let model = test_model();

    let unset = [
        Argument::new(Value::Null, TypeElement::new("volume", STRING).optional()),
        Argument::new(json!(""), TypeElement::new("volume", STRING).optional()),
        Argument::new(json!([]), TypeElement::new("aggrs", STRING).array().optional()),
        Argument::new(
            Value::Null,
            TypeElement::new("size", named(&model, "size-info")).optional(),
        ),
    ];
    for arg in &unset {
        assert_eq!(ser::to_xml_fragment(arg, &model).unwrap(), "");
    }

    // A required element is emitted even when empty.
    let arg = Argument::new(json!(""), TypeElement::new("volume", STRING));
    assert_eq!(
        ser::to_xml_fragment(&arg, &model).unwrap(),
        "<volume></volume>"
    );
}

#[test]
fn set_optional_arguments_are_emitted() {
    let model = test_model();

    let arg = Argument::new(json!("vol0"), TypeElement::new("volume", STRING).optional());
    assert_eq!(
        ser::to_xml_fragment(&arg, &model).unwrap(),
        "<volume>vol0</volume>"
    );

    let arg = Argument::new(
        json!({"total": 10}),
        TypeElement::new("size", named(&model, "size-info")).optional(),
    );
    assert_eq!(
        ser::to_xml_fragment(&arg, &model).unwrap(),
        "<size><total>10</total></size>"
    );
}

#[test]
fn array_arguments_repeat_the_member_structure() {
    let model = test_model();

    // Named members are wrapped in the member type's name.
    let arg = Argument::new(
        json!([{"name": "a"}, {"name": "b"}, {"name": "c"}]),
        TypeElement::new("volumes", named(&model, "volume-info")).array(),
    );
    assert_eq!(
        ser::to_xml_fragment(&arg, &model).unwrap(),
        "<volumes>\
         <volume-info><name>a</name></volume-info>\
         <volume-info><name>b</name></volume-info>\
         <volume-info><name>c</name></volume-info>\
         </volumes>"
    );

    // Primitive members carry the primitive's name.
    let arg = Argument::new(
        json!(["aggr0", "aggr1"]),
        TypeElement::new("aggr-list", STRING).array(),
    );
    assert_eq!(
        ser::to_xml_fragment(&arg, &model).unwrap(),
        "<aggr-list><string>aggr0</string><string>aggr1</string></aggr-list>"
    );
}

#[test]
fn bare_value_singleton_serializes_as_direct_text() {
    let model = test_model();

    let arg = Argument::new(
        json!(["vol0", "vol1"]),
        TypeElement::new("volumes", named(&model, "volume-name")).array(),
    );
    assert_eq!(
        ser::to_xml_fragment(&arg, &model).unwrap(),
        "<volumes><volume-name>vol0</volume-name><volume-name>vol1</volume-name></volumes>"
    );

    // An empty bare value writes nothing at all.
    let arg = Argument::new(json!(""), TypeElement::new("volume", named(&model, "volume-name")));
    assert_eq!(ser::to_xml_fragment(&arg, &model).unwrap(), "");
}

#[test]
fn composite_children_follow_declaration_order() {
    let model = test_model();

    // Map insertion order differs from schema order; the schema wins.
    let mut value = serde_json::Map::new();
    value.insert("size-info".to_string(), json!({"used": 1, "total": 2}));
    value.insert("name".to_string(), json!("vol0"));

    let arg = Argument::new(
        Value::Object(value),
        TypeElement::new("volume", named(&model, "volume-info")),
    );
    assert_eq!(
        ser::to_xml_fragment(&arg, &model).unwrap(),
        "<volume><name>vol0</name><size-info><total>2</total><used>1</used></size-info></volume>"
    );
}

#[test]
fn encrypted_elements_refuse_content_access() {
    let model = test_model();

    let mut element = TypeElement::new("password", STRING);
    element.encrypted = true;

    let err = ser::to_xml_fragment(&Argument::new(json!("secret"), element.clone()), &model)
        .unwrap_err();
    assert!(matches!(err, OntapiError::EncryptedUnsupported(name) if name == "password"));

    let xml = results("<password>secret</password>");
    let doc = Document::parse(&xml).unwrap();
    let err = de::read_field(&Field::new(element), doc.root_element(), &model).unwrap_err();
    assert!(matches!(err, OntapiError::EncryptedUnsupported(_)));
}

#[test]
fn decodes_primitive_fields() {
    let model = test_model();
    let xml = results("<state>online</state><count>7</count><is-clone>true</is-clone>");
    let doc = Document::parse(&xml).unwrap();
    let root = doc.root_element();

    let value = de::read_field(&Field::new(TypeElement::new("state", STRING)), root, &model);
    assert_eq!(value.unwrap(), json!("online"));

    let value = de::read_field(&Field::new(TypeElement::new("count", INTEGER)), root, &model);
    assert_eq!(value.unwrap(), json!(7));

    let value = de::read_field(&Field::new(TypeElement::new("is-clone", BOOLEAN)), root, &model);
    assert_eq!(value.unwrap(), json!(true));

    // Missing scalar field decodes to null, missing array field to [].
    let value = de::read_field(&Field::new(TypeElement::new("absent", STRING)), root, &model);
    assert_eq!(value.unwrap(), json!(""));

    let value = de::read_field(
        &Field::new(TypeElement::new("absent", STRING).array()),
        root,
        &model,
    );
    assert_eq!(value.unwrap(), json!([]));
}

#[test]
fn decodes_composite_and_array_fields() {
    let model = test_model();
    let xml = results(
        "<volumes>\
         <volume-info><name>vol0</name>\
         <size-info><total>100</total><used>40</used></size-info>\
         <aggr-list><aggr>aggr0</aggr><aggr>aggr1</aggr></aggr-list>\
         </volume-info>\
         <volume-info><name>vol1</name></volume-info>\
         </volumes>",
    );
    let doc = Document::parse(&xml).unwrap();

    let field = Field::new(TypeElement::new("volumes", named(&model, "volume-info")).array());
    let value = de::read_field(&field, doc.root_element(), &model).unwrap();

    assert_eq!(
        value,
        json!([
            {
                "name": "vol0",
                "size-info": {"total": 100, "used": 40},
                "aggr-list": ["aggr0", "aggr1"]
            },
            {
                "name": "vol1",
                "size-info": null,
                "aggr-list": []
            }
        ])
    );
}

#[test]
fn decodes_bare_value_members() {
    let model = test_model();
    let xml = results("<volumes><volume-name>vol0</volume-name><volume-name>vol1</volume-name></volumes>");
    let doc = Document::parse(&xml).unwrap();

    let field = Field::new(TypeElement::new("volumes", named(&model, "volume-name")).array());
    let value = de::read_field(&field, doc.root_element(), &model).unwrap();
    assert_eq!(value, json!(["vol0", "vol1"]));
}

#[test]
fn tolerates_integer_fields_that_arrive_as_strings() {
    let model = test_model();

    // At field top level a failed parse decodes to null.
    let xml = results("<port>0c</port>");
    let doc = Document::parse(&xml).unwrap();
    let value = de::read_field(&Field::new(TypeElement::new("port", INTEGER)), doc.root_element(), &model);
    assert_eq!(value.unwrap(), Value::Null);

    // Inside a composite the raw string is kept instead.
    let xml = results("<size-info><total>0c</total><used>4</used></size-info>");
    let doc = Document::parse(&xml).unwrap();
    let field = Field::new(TypeElement::new("size-info", named(&model, "size-info")));
    let value = de::read_field(&field, doc.root_element(), &model).unwrap();
    assert_eq!(value, json!({"total": "0c", "used": 4}));
}
