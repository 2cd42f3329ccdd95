pub mod cli;
pub mod config;
pub mod error;
pub mod io;
pub mod logging;
pub mod parsing;
pub mod routes;
pub mod scan;
pub mod schema;
pub mod types;
pub mod validate;

pub use config::Settings;
pub use error::{ValidatorError, ValidatorResult};
pub use parsing::{DiscoveredEndpoint, Framework, Language};
pub use routes::RouteTemplate;
pub use scan::{EndpointScanner, ScanOutcome};
pub use schema::{ApiSchema, load_schema};
pub use types::{HttpMethod, SourceLocation};
pub use validate::{Finding, RuleId, Severity, ValidationReport, Validator};
