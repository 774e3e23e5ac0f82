//! Core model, configuration and error types shared by the tsinterop parser,
//! generator and CLI.

pub mod config;
pub mod error;
pub mod schema;

pub use config::InteropConfig;
pub use error::{GenerationError, InteropError, ParseError, ParseErrorKind, Result};
pub use schema::{Function, GenericParameter, Module, Parameter, Primitive, TypeExpr};
