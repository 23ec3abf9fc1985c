//! Definition files
//!
//! Declares many record types at once, as TOML or JSON:
//!
//! ```toml
//! [types.CollectedPoints.members]
//! points = "Integer[]"
//! distances = "Scalar[]"
//! ```

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::builtin::register_builtins;
use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};
use crate::registry::TypeRegistry;
use crate::schema::TypeDefinition;

/// A set of type definitions, in file order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionFile {
    #[serde(default)]
    pub types: IndexMap<String, TypeDefinition>,
}

impl DefinitionFile {
    /// Load a definition file, choosing the format by extension
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            _ => Err(RegistryError::UnsupportedFormat(path.display().to_string())),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Register every type in file order, stopping at the first failure
    ///
    /// Types registered before the failure stay registered.
    pub fn register_all(&self, registry: &TypeRegistry) -> Result<usize> {
        for (type_name, definition) in &self.types {
            registry.register_type(type_name, definition)?;
        }
        debug!(count = self.types.len(), "Registered definition file");
        Ok(self.types.len())
    }
}

/// Load and register a definition file in one step
pub fn load_definitions(registry: &TypeRegistry, path: impl AsRef<Path>) -> Result<usize> {
    DefinitionFile::from_path(path)?.register_all(registry)
}

/// Build a registry from configuration: builtins first, then definition files
pub fn bootstrap(config: &RegistryConfig) -> Result<TypeRegistry> {
    let registry = TypeRegistry::from_config(config);
    if config.registry.builtins {
        register_builtins(&registry)?;
    }
    for path in &config.registry.definitions {
        load_definitions(&registry, path)?;
    }
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldType;

    const POINTS_TOML: &str = r#"
[types.CollectedPoints.members]
points = "Integer[]"
distances = "Scalar[]"

[types.Marker]
"#;

    #[test]
    fn test_parse_toml_preserves_member_order() {
        let file = DefinitionFile::from_toml_str(POINTS_TOML).unwrap();
        assert_eq!(file.len(), 2);
        let names: Vec<_> = file.types["CollectedPoints"].members.keys().cloned().collect();
        assert_eq!(names, vec!["points", "distances"]);
        assert!(file.types["Marker"].members.is_empty());
    }

    #[test]
    fn test_parse_json() {
        let file = DefinitionFile::from_json_str(
            r#"{"types": {"CollectedPoints": {"members": {"points": "Integer[]", "distances": "Scalar[]"}}}}"#,
        )
        .unwrap();
        let registry = TypeRegistry::new();
        assert_eq!(file.register_all(&registry).unwrap(), 1);
        let schema = registry.lookup("CollectedPoints").unwrap();
        assert_eq!(schema.fields[1].field_type, FieldType::array_of(FieldType::Scalar));
    }

    #[test]
    fn test_register_all_stops_at_invalid_type() {
        let file = DefinitionFile::from_toml_str(
            r#"
[types.Good.members]
ids = "Integer[]"

[types.Bad.members]
ids = "Index[]"
"#,
        )
        .unwrap();

        let registry = TypeRegistry::new();
        assert!(matches!(
            file.register_all(&registry),
            Err(RegistryError::InvalidSchema { .. })
        ));
        assert!(registry.contains("Good"));
        assert!(!registry.contains("Bad"));
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("types.yaml");
        std::fs::write(&path, "types: {}").unwrap();
        assert!(matches!(
            DefinitionFile::from_path(&path),
            Err(RegistryError::UnsupportedFormat(_))
        ));
    }
}
