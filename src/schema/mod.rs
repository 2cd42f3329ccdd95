//! API schema loading (OpenAPI 3.x, Swagger 2.0; JSON or YAML).

pub mod error;
pub mod loader;
pub mod model;

pub use error::{SchemaError, SchemaResult};
pub use loader::{load_schema, parse_schema};
pub use model::{
    ApiSchema, Operation, Parameter, ParameterLocation, PathItem, SchemaFormat,
    SecurityRequirement, SecurityScheme, SecuritySchemeKind, SpecVersion,
};
