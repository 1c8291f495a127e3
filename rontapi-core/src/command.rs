//! # Command Descriptors & Dynamic Binding
//!
//! An [`ApiCommand`] describes one remote operation: its dashed, package-prefixed
//! name and its ordered element list, partitioned by direction into arguments and
//! output fields. Commands of one package live in an [`ApiPackage`], an explicit
//! dispatch table from method name (and from dashed command name) to descriptor.
//! Bindings are looked up and invoked generically; no method synthesis happens at
//! runtime.
//!
//! Bindings accept **named arguments only**: a keyed object whose entries are
//! matched against the declared non-output elements. Unknown keys are a usage
//! error naming the key; declared arguments without a caller value get the schema
//! default (absent, or an empty string for a plain optional string element).
use crate::errors::{OntapiError, OntapiResult};
use crate::marshal::{Argument, Field};
use crate::schema::{PrimitiveType, TypeElement, TypeModel, TypeRef};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Keywords that cannot be used as generated method names. A derived name that
/// lands here (or starts with a digit) deterministically falls back to the full
/// dashed command name with separators replaced.
const RESERVED_WORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub",
    "ref", "return", "self", "static", "struct", "super", "trait", "true", "type", "unsafe", "use",
    "where", "while",
];

/// One remote operation's descriptor.
#[derive(Debug, Clone)]
pub struct ApiCommand {
    /// Full dashed name, package prefix included (e.g. `volume-list-info`).
    pub name: String,
    /// Ordered element list, arguments and output fields interleaved as declared.
    pub elements: Vec<TypeElement>,
}

impl ApiCommand {
    pub fn new(name: impl Into<String>, elements: Vec<TypeElement>) -> Self {
        ApiCommand {
            name: name.into(),
            elements,
        }
    }

    /// The command's package: the first dash-delimited segment.
    pub fn package(&self) -> &str {
        self.name.split('-').next().unwrap_or(&self.name)
    }

    /// The dashed command name with the package prefix stripped.
    pub fn command_name(&self) -> String {
        self.name
            .split('-')
            .skip(1)
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Input elements, in declaration order.
    pub fn arguments(&self) -> impl Iterator<Item = &TypeElement> {
        self.elements.iter().filter(|element| !element.is_output)
    }

    /// Output elements, in declaration order.
    pub fn output_fields(&self) -> impl Iterator<Item = &TypeElement> {
        self.elements.iter().filter(|element| element.is_output)
    }

    /// Identifier-shaped method name for this command.
    ///
    /// The package prefix is stripped and dashes become underscores. When the
    /// result is a reserved word or starts with a digit, the full dashed name
    /// (package included, dashes to underscores) is used instead.
    pub fn method_name(&self) -> String {
        let name = self
            .name
            .split('-')
            .skip(1)
            .collect::<Vec<_>>()
            .join("_");
        let degenerate = RESERVED_WORDS.contains(&name.as_str())
            || name.chars().next().is_some_and(|c| c.is_ascii_digit());
        if degenerate {
            self.name.replace('-', "_")
        } else {
            name
        }
    }

    /// Schema default for an unbound argument: absent for everything except a
    /// plain string element, which defaults to the empty string.
    pub fn default_value(element: &TypeElement) -> Value {
        if element.is_array {
            return Value::Null;
        }
        match element.type_ref {
            TypeRef::Primitive(PrimitiveType::String) => Value::String(String::new()),
            _ => Value::Null,
        }
    }

    /// Binds caller-supplied named arguments against this command's declaration.
    ///
    /// Returns the serialization-ready argument list (declaration order) and the
    /// output field list. Keys that match no declared non-output element fail as
    /// a usage error naming the offending key.
    pub fn bind(&self, kwargs: &Map<String, Value>) -> OntapiResult<(Vec<Argument>, Vec<Field>)> {
        let mut arguments = Vec::new();
        let mut known = Vec::new();

        for element in self.arguments() {
            let key = element.binding_name();
            let value = kwargs
                .get(&key)
                .cloned()
                .unwrap_or_else(|| Self::default_value(element));
            known.push(key);
            arguments.push(Argument::new(value, element.clone()));
        }

        for key in kwargs.keys() {
            if !known.iter().any(|k| k == key) {
                return Err(OntapiError::Usage(format!(
                    "{}() got an unexpected keyword argument '{}'",
                    self.method_name(),
                    key
                )));
            }
        }

        let fields = self
            .output_fields()
            .map(|element| Field::new(element.clone()))
            .collect();

        Ok((arguments, fields))
    }

    /// Read-only description of the command for the explorer surface. Issues no
    /// wire traffic; everything here was resolved during bootstrap.
    pub fn describe(&self, model: &TypeModel) -> CommandInfo {
        let mut info = CommandInfo {
            name: self.name.clone(),
            method_name: self.method_name(),
            required: Vec::new(),
            optional: Vec::new(),
            outputs: Vec::new(),
        };
        for element in self.arguments() {
            let described = DescribedElement {
                name: element.binding_name(),
                type_name: model.display_name(element.type_ref, element.is_array),
            };
            if element.is_optional {
                info.optional.push(described);
            } else {
                info.required.push(described);
            }
        }
        for element in self.output_fields() {
            info.outputs.push(DescribedElement {
                name: element.name.clone(),
                type_name: model.display_name(element.type_ref, element.is_array),
            });
        }
        info
    }
}

/// Explorer view of one element: binding name plus display type name.
#[derive(Debug, Clone)]
pub struct DescribedElement {
    pub name: String,
    pub type_name: String,
}

/// Explorer view of one command.
#[derive(Debug, Clone)]
pub struct CommandInfo {
    pub name: String,
    pub method_name: String,
    pub required: Vec<DescribedElement>,
    pub optional: Vec<DescribedElement>,
    pub outputs: Vec<DescribedElement>,
}

/// One package's commands plus the dispatch table over them.
///
/// Built once at bootstrap; read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ApiPackage {
    commands: Vec<ApiCommand>,
    by_method: HashMap<String, usize>,
    by_command: HashMap<String, usize>,
}

impl ApiPackage {
    pub fn new(commands: Vec<ApiCommand>) -> Self {
        let mut by_method = HashMap::new();
        let mut by_command = HashMap::new();
        for (idx, command) in commands.iter().enumerate() {
            by_method.insert(command.method_name(), idx);
            by_command.insert(command.command_name(), idx);
        }
        ApiPackage {
            commands,
            by_method,
            by_command,
        }
    }

    /// Looks a command up by method name (`list_info`) or by its dashed
    /// command name (`list-info`).
    pub fn command(&self, name: &str) -> Option<&ApiCommand> {
        self.by_method
            .get(name)
            .or_else(|| self.by_command.get(name))
            .map(|idx| &self.commands[*idx])
    }

    /// All commands of this package, in catalog order.
    pub fn commands(&self) -> impl Iterator<Item = &ApiCommand> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
