//! Two-pass resolution of the raw schema tables returned by the remote system.
//!
//! The raw input is the decoded payload of the discovery calls: a sequence of
//! JSON objects with `name` / `type` / flag entries. The same element shape is
//! used by both the type catalog and the per-command element lists, so command
//! resolution reuses [`resolve_element`] against an already-built model.
use super::{PrimitiveType, TypeElement, TypeModel, TypeRef};
use crate::errors::{DiscoveryStage, OntapiError, OntapiResult};
use serde_json::Value;

/// Element descriptor as it appears on the wire, before type resolution.
#[derive(Debug, Clone)]
pub struct RawElement {
    pub name: String,
    pub declared_type: String,
    pub encrypted: bool,
    pub nonempty: bool,
    pub is_optional: bool,
    pub is_output: bool,
}

impl RawElement {
    /// Reads one element descriptor out of a decoded response object.
    ///
    /// A missing or null `type` defaults to `string`: some releases omit the
    /// type for elements that are plain strings.
    pub fn from_value(value: &Value) -> OntapiResult<Self> {
        let obj = value.as_object().ok_or_else(|| OntapiError::SchemaDiscovery {
            stage: DiscoveryStage::TypeCatalog,
            reason: format!("malformed element descriptor: {value}"),
        })?;

        let declared_type = match obj.get("type") {
            None | Some(Value::Null) => "string".to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };

        Ok(RawElement {
            name: string_entry(obj.get("name")),
            declared_type,
            encrypted: flag_entry(obj.get("encrypted")),
            nonempty: flag_entry(obj.get("is-nonempty")),
            is_optional: flag_entry(obj.get("is-optional")),
            is_output: flag_entry(obj.get("is-output")),
        })
    }
}

fn string_entry(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

/// Flags arrive either as decoded booleans or as literal strings, depending on
/// how the element was declared in the bootstrap descriptors.
fn flag_entry(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s == "true",
        _ => false,
    }
}

/// Resolves one raw element against `model`. The `[]` suffix on the declared
/// type sets the array flag; the remaining name must be a primitive or a type
/// known to the model.
pub fn resolve_element(
    raw: &RawElement,
    model: &TypeModel,
    stage: DiscoveryStage,
) -> OntapiResult<TypeElement> {
    let is_array = raw.declared_type.contains("[]");
    let base = raw.declared_type.replace("[]", "");

    let type_ref = if let Some(primitive) = PrimitiveType::from_name(&base) {
        TypeRef::Primitive(primitive)
    } else if let Some(id) = model.lookup(&base) {
        TypeRef::Named(id)
    } else {
        return Err(OntapiError::SchemaDiscovery {
            stage,
            reason: format!(
                "unresolved type reference '{}' for element '{}'",
                raw.declared_type, raw.name
            ),
        });
    };

    Ok(TypeElement {
        name: raw.name.clone(),
        type_ref,
        is_array,
        is_optional: raw.is_optional,
        is_output: raw.is_output,
        encrypted: raw.encrypted,
        nonempty: raw.nonempty,
    })
}

/// Builds the full type model from the decoded type catalog
/// (`type-entries` payload of `system-api-list-types`).
///
/// Pass one registers a skeleton for every declared name so that forward and
/// mutual references resolve; pass two installs the resolved element lists.
pub fn build_type_model(entries: &[Value]) -> OntapiResult<TypeModel> {
    let mut model = TypeModel::new();
    let mut raw_entries = Vec::with_capacity(entries.len());

    for entry in entries {
        let name = entry
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| OntapiError::SchemaDiscovery {
                stage: DiscoveryStage::TypeCatalog,
                reason: format!("type catalog entry without a name: {entry}"),
            })?;
        let id = model.register(name);

        let elements = match entry.get("type-elements") {
            Some(Value::Array(items)) => items
                .iter()
                .map(RawElement::from_value)
                .collect::<OntapiResult<Vec<_>>>()?,
            _ => Vec::new(),
        };
        raw_entries.push((id, elements));
    }

    for (id, raw_elements) in raw_entries {
        let elements = raw_elements
            .iter()
            .map(|raw| resolve_element(raw, &model, DiscoveryStage::TypeCatalog))
            .collect::<OntapiResult<Vec<_>>>()?;
        model.install_elements(id, elements);
    }

    Ok(model)
}

/// Resolves a command's element list (`api-elements` payload) against the
/// already-built model. The returned elements keep their declared order,
/// arguments and output fields interleaved.
pub fn resolve_command_elements(
    elements: &[Value],
    model: &TypeModel,
) -> OntapiResult<Vec<TypeElement>> {
    elements
        .iter()
        .map(|value| {
            let raw = RawElement::from_value(value)?;
            resolve_element(&raw, model, DiscoveryStage::CommandCatalog)
        })
        .collect()
}
