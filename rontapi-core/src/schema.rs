//! # Type Model
//!
//! The remote system declares its composite types as a flat catalog of
//! `name -> ordered element list` entries, where an element's declared type may
//! reference another catalog entry that appears later in the same catalog (or the
//! entry itself). To cope with forward and mutual references the model is an
//! **arena**: every [`NamedType`] lives in the [`TypeModel`] and is addressed by a
//! [`TypeId`]; elements reference their type through [`TypeRef`] rather than by
//! embedding it, so the graph never needs cyclic ownership.
//!
//! Resolution is two explicit passes (see [`resolve::build_type_model`]): pass one
//! registers a skeleton record for every declared name, pass two resolves each
//! element's declared type string against the primitives and the skeletons. A
//! declared type that resolves to neither is a fatal schema error.
pub mod model;
pub mod resolve;

pub use model::{NamedType, PrimitiveType, TypeElement, TypeId, TypeModel, TypeRef};
