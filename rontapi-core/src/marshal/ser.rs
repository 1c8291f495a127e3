//! Serialization: bound arguments into request XML.
use super::Argument;
use crate::errors::{OntapiError, OntapiResult};
use crate::schema::{TypeElement, TypeId, TypeModel, TypeRef};
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use serde_json::Value;
use std::io::Write;

/// Appends one argument to the request document.
///
/// Required arguments are always emitted; optional arguments are omitted
/// entirely when they are not [set](is_set).
pub fn append_argument<W: Write>(
    writer: &mut Writer<W>,
    arg: &Argument,
    model: &TypeModel,
) -> OntapiResult<()> {
    if arg.element.is_optional && !is_set(arg, model) {
        return Ok(());
    }
    write_element(writer, &arg.element, &arg.value, model)
}

/// Serializes a single argument into a standalone XML fragment. Mostly useful
/// for diagnostics and tests; [`append_argument`] is the per-call entry point.
pub fn to_xml_fragment(arg: &Argument, model: &TypeModel) -> OntapiResult<String> {
    let mut writer = Writer::new(Vec::new());
    append_argument(&mut writer, arg, model)?;
    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

/// The presence rule deciding whether an optional argument is emitted.
///
/// * primitive booleans/integers: set when non-null
/// * primitive strings: set when non-empty
/// * arrays: set when non-empty
/// * composites: the bare-value emptiness rule, or any declared child key
///   present in the bound object
pub fn is_set(arg: &Argument, model: &TypeModel) -> bool {
    let element = &arg.element;
    let value = &arg.value;

    if element.is_array {
        return value.as_array().is_some_and(|items| !items.is_empty());
    }

    match element.type_ref {
        TypeRef::Primitive(crate::schema::PrimitiveType::String) => match value {
            Value::Null => false,
            Value::String(s) => !s.is_empty(),
            _ => true,
        },
        TypeRef::Primitive(_) => !value.is_null(),
        TypeRef::Named(id) => named_is_set(id, value, model),
    }
}

fn named_is_set(id: TypeId, value: &Value, model: &TypeModel) -> bool {
    if value.is_null() {
        return false;
    }
    let named = model.get(id);
    if named.is_bare_value() {
        return match value {
            Value::String(s) => !s.is_empty(),
            _ => true,
        };
    }
    match value {
        Value::Object(map) => named
            .elements
            .iter()
            .any(|element| map.contains_key(&element.name)),
        _ => false,
    }
}

/// Writes one named element (argument or composite child) and its content.
fn write_element<W: Write>(
    writer: &mut Writer<W>,
    element: &TypeElement,
    value: &Value,
    model: &TypeModel,
) -> OntapiResult<()> {
    if element.is_array {
        open(writer, &element.name)?;
        if let Some(members) = value.as_array() {
            for member in members {
                write_array_member(writer, element, member, model)?;
            }
        }
        return close(writer, &element.name);
    }

    match element.type_ref {
        TypeRef::Primitive(_) => {
            let content = text_content(element, value)?;
            open(writer, &element.name)?;
            text(writer, &content)?;
            close(writer, &element.name)
        }
        TypeRef::Named(id) => write_composite(writer, &element.name, id, value, model),
    }
}

/// One member of an array element: named members are wrapped in an element
/// carrying the member type's name, primitive members in one carrying the
/// primitive's name. Deserialization walks children positionally, so the member
/// tag never has to match on the way back in.
fn write_array_member<W: Write>(
    writer: &mut Writer<W>,
    element: &TypeElement,
    member: &Value,
    model: &TypeModel,
) -> OntapiResult<()> {
    match element.type_ref {
        TypeRef::Named(id) => {
            let name = model.get(id).name.clone();
            write_composite(writer, &name, id, member, model)
        }
        TypeRef::Primitive(p) => {
            let content = text_content(element, member)?;
            open(writer, p.name())?;
            text(writer, &content)?;
            close(writer, p.name())
        }
    }
}

/// Writes a composite value under `name`.
///
/// The bare-value singleton serializes as a direct text node (and nothing at
/// all when the value is empty or absent); every other composite recurses per
/// declared child element, looking the child's value up by name.
fn write_composite<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    id: TypeId,
    value: &Value,
    model: &TypeModel,
) -> OntapiResult<()> {
    let named = model.get(id);

    if named.is_bare_value() {
        let content = text_content(&named.elements[0], value)?;
        if content.is_empty() {
            return Ok(());
        }
        open(writer, name)?;
        text(writer, &content)?;
        return close(writer, name);
    }

    open(writer, name)?;
    if let Some(map) = value.as_object() {
        // Children are emitted in schema declaration order, not map order.
        for element in &named.elements {
            if let Some(child_value) = map.get(&element.name) {
                write_element(writer, element, child_value, model)?;
            }
        }
    }
    close(writer, name)
}

/// String form of a primitive value. Accessing the content of an
/// encrypted-flagged element fails explicitly as unsupported.
fn text_content(element: &TypeElement, value: &Value) -> OntapiResult<String> {
    if element.encrypted {
        return Err(OntapiError::EncryptedUnsupported(element.name.clone()));
    }
    Ok(match value {
        Value::Null => String::new(),
        Value::Bool(b) => if *b { "true" } else { "false" }.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

fn open<W: Write>(writer: &mut Writer<W>, name: &str) -> OntapiResult<()> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(xml_write_error)
}

fn close<W: Write>(writer: &mut Writer<W>, name: &str) -> OntapiResult<()> {
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(xml_write_error)
}

fn text<W: Write>(writer: &mut Writer<W>, content: &str) -> OntapiResult<()> {
    writer
        .write_event(Event::Text(BytesText::new(content)))
        .map_err(xml_write_error)
}

fn xml_write_error(err: std::io::Error) -> OntapiError {
    OntapiError::Transport(format!("failed to write request XML: {err}"))
}
