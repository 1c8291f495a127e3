//! Deserialization: response XML into dynamic values.
use super::Field;
use crate::errors::{OntapiError, OntapiResult};
use crate::schema::{NamedType, PrimitiveType, TypeElement, TypeModel, TypeRef};
use roxmltree::Node;
use serde_json::{Map, Value};

/// What a failed non-string primitive parse decodes to.
///
/// At field top level the historical behavior is `null`; inside composite
/// elements the raw string is kept instead. This is a workaround for real
/// remote schema/version mismatches (`controller-device-path-port` is declared
/// integer but returns a string on older releases) and must not be "fixed"
/// into an error.
#[derive(Debug, Clone, Copy)]
enum ParseFallback {
    Null,
    RawString,
}

/// Decodes one declared output field from the `<results>` element.
pub fn read_field(field: &Field, results: Node<'_, '_>, model: &TypeModel) -> OntapiResult<Value> {
    let element = &field.element;

    if element.is_array {
        return read_field_array(element, results, model);
    }

    match element.type_ref {
        TypeRef::Primitive(p) => {
            let text = find_first(results, &element.name).and_then(node_text);
            guard_encrypted(element)?;
            Ok(parse_primitive(
                p,
                text.as_deref(),
                &element.name,
                ParseFallback::Null,
            ))
        }
        TypeRef::Named(id) => match find_first(results, &element.name) {
            Some(node) => read_named(model.get(id), node, model),
            None => Ok(Value::Null),
        },
    }
}

/// Array fields collect every matching element in document order. No match
/// yields an empty sequence, never an absent value.
fn read_field_array(
    element: &TypeElement,
    results: Node<'_, '_>,
    model: &TypeModel,
) -> OntapiResult<Value> {
    match element.type_ref {
        TypeRef::Named(id) => {
            let named = model.get(id);
            let mut values = Vec::new();
            for node in find_all(results, &named.name) {
                values.push(read_named(named, node, model)?);
            }
            Ok(Value::Array(values))
        }
        TypeRef::Primitive(p) => {
            guard_encrypted(element)?;
            let Some(wrapper) = find_first(results, &element.name) else {
                return Ok(Value::Array(Vec::new()));
            };
            Ok(read_primitive_members(p, wrapper, &element.name))
        }
    }
}

/// Decodes a composite value from `node`.
///
/// The bare-value singleton reads the direct text node; everything else builds
/// an object with one entry per declared child element.
fn read_named(named: &NamedType, node: Node<'_, '_>, model: &TypeModel) -> OntapiResult<Value> {
    if named.is_bare_value() {
        guard_encrypted(&named.elements[0])?;
        let text = node_text(node).unwrap_or_default();
        return Ok(Value::String(text));
    }

    let mut object = Map::new();
    for element in &named.elements {
        object.insert(element.name.clone(), read_element(element, node, model)?);
    }
    Ok(Value::Object(object))
}

/// Decodes one composite child element relative to `parent`.
fn read_element(
    element: &TypeElement,
    parent: Node<'_, '_>,
    model: &TypeModel,
) -> OntapiResult<Value> {
    let Some(root) = find_first(parent, &element.name) else {
        return Ok(if element.is_array {
            Value::Array(Vec::new())
        } else {
            Value::Null
        });
    };

    if element.is_array {
        return match element.type_ref {
            TypeRef::Primitive(p) => {
                guard_encrypted(element)?;
                Ok(read_primitive_members(p, root, &element.name))
            }
            TypeRef::Named(id) => {
                let named = model.get(id);
                let mut values = Vec::new();
                for child in root.children().filter(Node::is_element) {
                    values.push(read_named(named, child, model)?);
                }
                Ok(Value::Array(values))
            }
        };
    }

    match element.type_ref {
        TypeRef::Primitive(p) => {
            guard_encrypted(element)?;
            Ok(parse_primitive(
                p,
                node_text(root).as_deref(),
                &element.name,
                ParseFallback::RawString,
            ))
        }
        TypeRef::Named(id) => read_named(model.get(id), root, model),
    }
}

/// Members of a primitive array: every element child of the wrapper, parsed in
/// document order. Member tag names are not inspected, so any naming the remote
/// chooses decodes the same way.
fn read_primitive_members(p: PrimitiveType, wrapper: Node<'_, '_>, context: &str) -> Value {
    let values = wrapper
        .children()
        .filter(Node::is_element)
        .map(|child| {
            parse_primitive(
                p,
                node_text(child).as_deref(),
                context,
                ParseFallback::RawString,
            )
        })
        .collect();
    Value::Array(values)
}

/// Parses a primitive text node.
///
/// * booleans are literal equality with `true`
/// * integers parse numerically; a failed parse is tolerated (see
///   [`ParseFallback`]) and logged so schema drift stays observable
/// * strings pass through verbatim
fn parse_primitive(
    p: PrimitiveType,
    text: Option<&str>,
    context: &str,
    fallback: ParseFallback,
) -> Value {
    match p {
        PrimitiveType::Boolean => Value::Bool(text == Some("true")),
        PrimitiveType::String => Value::String(text.unwrap_or_default().to_string()),
        PrimitiveType::Integer => {
            let Some(text) = text else {
                return Value::Null;
            };
            match text.parse::<i64>() {
                Ok(number) => Value::Number(number.into()),
                Err(_) => {
                    tracing::error!(
                        element = context,
                        value = text,
                        "got value error for conversion to integer"
                    );
                    match fallback {
                        ParseFallback::Null => Value::Null,
                        ParseFallback::RawString => Value::String(text.to_string()),
                    }
                }
            }
        }
    }
}

fn guard_encrypted(element: &TypeElement) -> OntapiResult<()> {
    if element.encrypted {
        return Err(OntapiError::EncryptedUnsupported(element.name.clone()));
    }
    Ok(())
}

/// First descendant element named `name`, in document order.
fn find_first<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.descendants()
        .filter(|n| n.id() != node.id())
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

/// All descendant elements named `name`, in document order.
fn find_all<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Vec<Node<'a, 'input>> {
    node.descendants()
        .filter(|n| n.id() != node.id())
        .filter(|n| n.is_element() && n.tag_name().name() == name)
        .collect()
}

fn node_text(node: Node<'_, '_>) -> Option<String> {
    node.text().map(str::to_string)
}
