pub mod endpoint;
pub mod error;
pub mod factory;
pub mod go;
pub mod javascript;
pub mod language;
pub mod parser;
pub mod python;
pub mod rust;

pub use endpoint::{DiscoveredEndpoint, Framework};
pub use error::ParseError;
pub use factory::{ExtractorFactory, ExtractorSet};
pub use go::GoExtractor;
pub use javascript::JavaScriptExtractor;
pub use language::Language;
pub use parser::EndpointExtractor;
pub use python::PythonExtractor;
pub use rust::RustExtractor;
