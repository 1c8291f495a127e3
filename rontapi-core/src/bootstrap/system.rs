//! Hand-built descriptors for the fixed discovery commands.
//!
//! Discovery has a chicken-and-egg problem: the commands that return the remote
//! schema must themselves be called before any schema exists. Their shapes are
//! part of the protocol and never change, so they are declared here against a
//! small private type model.
use crate::errors::OntapiResult;
use crate::marshal::{Argument, Field};
use crate::schema::{PrimitiveType, TypeElement, TypeId, TypeModel, TypeRef};
use crate::session::Session;
use serde_json::{Map, Value};

const BOOLEAN: TypeRef = TypeRef::Primitive(PrimitiveType::Boolean);
const INTEGER: TypeRef = TypeRef::Primitive(PrimitiveType::Integer);
const STRING: TypeRef = TypeRef::Primitive(PrimitiveType::String);

/// The discovery command bindings and the type model backing them.
#[derive(Debug)]
pub(crate) struct SystemApi {
    model: TypeModel,
    api_list_info: TypeId,
    api_info: TypeId,
    entry_info: TypeId,
    type_entry_info: TypeId,
}

impl SystemApi {
    pub(crate) fn new() -> Self {
        let mut model = TypeModel::new();

        // Bare-value type carrying one command name per array member.
        let api_list_info = model.register("api-list-info");
        model.install_elements(api_list_info, vec![TypeElement::new("", STRING)]);

        let element_info = model.register("system-api-element-info");
        model.install_elements(
            element_info,
            vec![
                TypeElement::new("encrypted", STRING).optional(),
                TypeElement::new("is-nonempty", BOOLEAN).optional(),
                TypeElement::new("is-optional", BOOLEAN).optional(),
                TypeElement::new("is-output", BOOLEAN).optional(),
                TypeElement::new("is-validated", BOOLEAN).optional(),
                TypeElement::new("name", STRING),
                TypeElement::new("type", STRING),
            ],
        );

        let entry_info = model.register("system-api-entry-info");
        model.install_elements(
            entry_info,
            vec![
                TypeElement::new("name", STRING),
                TypeElement::new("api-elements", TypeRef::Named(element_info)).array(),
            ],
        );

        let api_info = model.register("system-api-info");
        model.install_elements(
            api_info,
            vec![
                TypeElement::new("is-streaming", BOOLEAN).optional(),
                TypeElement::new("license", STRING).optional(),
                TypeElement::new("name", STRING),
            ],
        );

        let type_entry_info = model.register("system-api-type-entry-info");
        model.install_elements(
            type_entry_info,
            vec![
                TypeElement::new("name", STRING),
                TypeElement::new("type-elements", TypeRef::Named(element_info)).array(),
            ],
        );

        SystemApi {
            model,
            api_list_info,
            api_info,
            entry_info,
            type_entry_info,
        }
    }

    /// Invokes `system-get-ontapi-version`.
    pub(crate) fn get_ontapi_version(
        &self,
        session: &mut Session,
    ) -> OntapiResult<Map<String, Value>> {
        let fields = [
            Field::new(TypeElement::new("major-version", INTEGER)),
            Field::new(TypeElement::new("minor-version", INTEGER)),
        ];
        session.do_api_call("system-get-ontapi-version", &[], &fields, &self.model)
    }

    /// Invokes `system-api-list`: the full command listing.
    pub(crate) fn api_list(&self, session: &mut Session) -> OntapiResult<Map<String, Value>> {
        let fields = [Field::new(
            TypeElement::new("apis", TypeRef::Named(self.api_info)).array(),
        )];
        session.do_api_call("system-api-list", &[], &fields, &self.model)
    }

    /// Invokes `system-api-list-types`: the composite type catalog.
    pub(crate) fn api_list_types(&self, session: &mut Session) -> OntapiResult<Map<String, Value>> {
        let fields = [Field::new(
            TypeElement::new("type-entries", TypeRef::Named(self.type_entry_info)).array(),
        )];
        session.do_api_call("system-api-list-types", &[], &fields, &self.model)
    }

    /// Invokes `system-api-get-elements` for the given command names.
    pub(crate) fn api_get_elements(
        &self,
        session: &mut Session,
        command_names: &[String],
    ) -> OntapiResult<Map<String, Value>> {
        let names = command_names
            .iter()
            .map(|name| Value::String(name.clone()))
            .collect();
        let arguments = [Argument::new(
            Value::Array(names),
            TypeElement::new("api-list", TypeRef::Named(self.api_list_info)).array(),
        )];
        let fields = [Field::new(
            TypeElement::new("api-entries", TypeRef::Named(self.entry_info)).array(),
        )];
        session.do_api_call("system-api-get-elements", &arguments, &fields, &self.model)
    }
}
