//! Record Registry
//!
//! A typed record registry: named record schemas (field name to field type,
//! including array fields) are registered together with a factory, then
//! looked up or instantiated by name at runtime.
//!
//! ## Features
//!
//! - **Closed field types**: `Scalar`, `Integer`, `Boolean`, `String` and
//!   arrays of them, parsed once from tags such as `"Integer[]"`
//! - **Configurable re-registration**: overwrite (default) or strict
//! - **Fresh instances**: every `construct` runs the factory again, array
//!   fields start empty
//! - **Definition files**: register many types from TOML or JSON
//!
//! ## Example
//!
//! ```
//! use record_registry::{CollectedPoints, FieldValue, TypeRegistry};
//!
//! let registry = TypeRegistry::new();
//! CollectedPoints::register(&registry).unwrap();
//!
//! let instance = registry.construct("CollectedPoints").unwrap();
//! assert_eq!(instance.get("points"), Some(&FieldValue::Array(vec![])));
//! ```

pub mod builtin;
pub mod checksum;
pub mod config;
pub mod error;
pub mod field;
pub mod loader;
pub mod registry;
pub mod schema;
pub mod value;

pub use builtin::{register_builtins, CollectedPoints};
pub use checksum::Fingerprint;
pub use config::RegistryConfig;
pub use error::{RegistryError, Result};
pub use field::{FieldType, ParseFieldTypeError};
pub use loader::{bootstrap, load_definitions, DefinitionFile};
pub use registry::{RegistrationPolicy, TypeRegistry};
pub use schema::{default_factory, Factory, FieldSchema, RecordSchema, TypeDefinition};
pub use value::{FieldValue, RecordInstance};
