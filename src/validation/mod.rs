//! Declarative payload validation
//!
//! A compact schema text (`field: Type` / `field: Type!`) is parsed into
//! per-field operator lists and checked against JSON payloads before they
//! are sent as GraphQL mutation variables.

pub mod operators;
pub mod schema;

pub use operators::{Contains, JsonText, Matches, OneOf, Operator, OperatorRegistry, TypeCheck};
pub use schema::{FieldRules, ValidationSpec};
