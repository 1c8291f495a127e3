//! Resolved type graph: primitives, named composite types and the arena that
//! owns them.
use std::collections::HashMap;

/// The fixed set of primitive ONTAPI types. There is no extension mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    Boolean,
    Integer,
    String,
}

impl PrimitiveType {
    /// Maps a declared type name onto a primitive, if it is one.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "boolean" => Some(PrimitiveType::Boolean),
            "integer" => Some(PrimitiveType::Integer),
            "string" => Some(PrimitiveType::String),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Integer => "integer",
            PrimitiveType::String => "string",
        }
    }
}

/// Arena index of a [`NamedType`] inside its [`TypeModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(pub(crate) usize);

/// Reference to a resolved type: either a primitive or a named type by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeRef {
    Primitive(PrimitiveType),
    Named(TypeId),
}

/// One schema field descriptor: name plus resolved type reference and flags.
///
/// An empty `name` is only legal as the single element of a named type and marks
/// the *bare value* case: the value is serialized as a direct text node with no
/// wrapping element.
#[derive(Debug, Clone)]
pub struct TypeElement {
    pub name: String,
    pub type_ref: TypeRef,
    pub is_array: bool,
    pub is_optional: bool,
    pub is_output: bool,
    pub encrypted: bool,
    pub nonempty: bool,
}

impl TypeElement {
    /// Plain element of the given type, all flags cleared.
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        TypeElement {
            name: name.into(),
            type_ref,
            is_array: false,
            is_optional: false,
            is_output: false,
            encrypted: false,
            nonempty: false,
        }
    }

    pub fn array(mut self) -> Self {
        self.is_array = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.is_optional = true;
        self
    }

    pub fn output(mut self) -> Self {
        self.is_output = true;
        self
    }

    /// The identifier callers use to bind this element: dashes become underscores.
    pub fn binding_name(&self) -> String {
        self.name.replace('-', "_")
    }
}

/// A composite type declared by the remote schema: a name plus an ordered
/// sequence of child elements.
#[derive(Debug, Clone)]
pub struct NamedType {
    pub name: String,
    pub elements: Vec<TypeElement>,
}

impl NamedType {
    /// The bare-value singleton rule: exactly one element with an empty name.
    pub fn is_bare_value(&self) -> bool {
        self.elements.len() == 1 && self.elements[0].name.is_empty()
    }
}

/// Arena of named types, addressed by [`TypeId`] or by schema-unique name.
///
/// Built exactly once at session bootstrap and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct TypeModel {
    types: Vec<NamedType>,
    index: HashMap<String, TypeId>,
}

impl TypeModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a skeleton record for `name` and returns its id. Registering an
    /// already-known name returns the existing id unchanged.
    pub fn register(&mut self, name: &str) -> TypeId {
        if let Some(id) = self.index.get(name) {
            return *id;
        }
        let id = TypeId(self.types.len());
        self.types.push(NamedType {
            name: name.to_string(),
            elements: Vec::new(),
        });
        self.index.insert(name.to_string(), id);
        id
    }

    /// Replaces the (skeleton) element list of `id` with fully resolved elements.
    pub fn install_elements(&mut self, id: TypeId, elements: Vec<TypeElement>) {
        self.types[id.0].elements = elements;
    }

    pub fn get(&self, id: TypeId) -> &NamedType {
        &self.types[id.0]
    }

    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.index.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Human-readable type name for explorer output, e.g. `volume-info[]`.
    pub fn display_name(&self, type_ref: TypeRef, is_array: bool) -> String {
        let base = match type_ref {
            TypeRef::Primitive(p) => p.name().to_string(),
            TypeRef::Named(id) => self.get(id).name.clone(),
        };
        if is_array { format!("{base}[]") } else { base }
    }
}
