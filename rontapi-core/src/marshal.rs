//! # Marshaling Engine
//!
//! Converts dynamic values ([`serde_json::Value`]) to and from the wire XML,
//! driven by the resolved [`TypeModel`](crate::schema::TypeModel).
//!
//! The serialization format has several orthogonal axes:
//!
//! * **primitive vs. composite**: primitives become a single element wrapping a
//!   text node; composites recurse per child element, looking values up by name
//!   in an object.
//! * **scalar vs. array**: arrays repeat the member structure once per sequence
//!   entry, in order.
//! * **required vs. optional**: required elements are always emitted; optional
//!   elements only when they are *set* (see [`ser::is_set`]).
//! * **the bare value**: a named type with exactly one unnamed element carries
//!   its value as a direct text node with no per-field wrapper element.
//!
//! Deserialization is deliberately lenient about primitive parses: known remote
//! version/schema mismatches produce values whose declared type does not match
//! the text on the wire, and raising there would make whole responses unreadable.
//! A failed integer parse decodes to `null` at field top level and to the raw
//! string inside composite elements; both cases emit a `tracing` diagnostic so
//! operators can spot genuine schema drift.
pub mod de;
pub mod ser;

use crate::schema::TypeElement;
use serde_json::Value;

/// A value bound to its schema element for serialization. Created per call and
/// discarded when the call completes.
#[derive(Debug, Clone)]
pub struct Argument {
    pub value: Value,
    pub element: TypeElement,
}

impl Argument {
    pub fn new(value: Value, element: TypeElement) -> Self {
        Argument { value, element }
    }
}

/// A schema element used purely to deserialize one output field.
#[derive(Debug, Clone)]
pub struct Field {
    pub element: TypeElement,
}

impl Field {
    pub fn new(element: TypeElement) -> Self {
        Field { element }
    }

    pub fn name(&self) -> &str {
        &self.element.name
    }
}
