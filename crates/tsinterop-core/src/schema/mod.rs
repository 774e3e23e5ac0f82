mod module;
mod types;

pub use module::{module_name, module_url, Function, GenericParameter, Module, Parameter};
pub use types::{Primitive, TypeExpr};
