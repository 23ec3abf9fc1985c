//! Type Registry
//!
//! Holds the authoritative mapping from type name to record schema and
//! factory. One registry is created per hosting context and passed
//! explicitly to whoever registers or constructs records; there is no
//! process-global instance.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};
use crate::schema::{default_factory, Factory, FieldSchema, RecordSchema, TypeDefinition};
use crate::value::RecordInstance;

/// What to do when a type name is registered a second time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationPolicy {
    /// Last registration wins (contexts re-register on every reload)
    #[default]
    Overwrite,
    /// A second registration fails with `DuplicateType`
    Strict,
}

/// Registry of named record types
///
/// All operations take a single lock around the table, so a registry can be
/// shared between threads behind an `Arc`.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    policy: RegistrationPolicy,
    types: Mutex<HashMap<String, RecordSchema>>,
}

impl TypeRegistry {
    /// Create an empty registry with the overwrite policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry with the given re-registration policy
    pub fn with_policy(policy: RegistrationPolicy) -> Self {
        Self {
            policy,
            types: Mutex::new(HashMap::new()),
        }
    }

    /// Create an empty registry configured from `config`
    pub fn from_config(config: &RegistryConfig) -> Self {
        Self::with_policy(config.registry.policy)
    }

    pub fn policy(&self) -> RegistrationPolicy {
        self.policy
    }

    /// Register a record type with an explicit factory
    ///
    /// On failure the registry is left exactly as it was.
    pub fn register(
        &self,
        type_name: impl Into<String>,
        fields: Vec<FieldSchema>,
        factory: Factory,
    ) -> Result<()> {
        let schema = RecordSchema::new(type_name, fields, factory)?;
        self.insert(schema)
    }

    /// Register a type from its host definition, using the default factory
    pub fn register_type(&self, type_name: &str, definition: &TypeDefinition) -> Result<()> {
        let fields = definition.parse_fields(type_name)?;
        let factory = default_factory(type_name, &fields);
        self.register(type_name, fields, factory)
    }

    /// Register a type from its host definition with an explicit constructor
    pub fn register_type_with(
        &self,
        type_name: &str,
        definition: &TypeDefinition,
        factory: Factory,
    ) -> Result<()> {
        let fields = definition.parse_fields(type_name)?;
        self.register(type_name, fields, factory)
    }

    /// Get the current schema for a type
    pub fn lookup(&self, type_name: &str) -> Result<RecordSchema> {
        self.table()
            .get(type_name)
            .cloned()
            .ok_or_else(|| RegistryError::not_found(type_name))
    }

    /// Host-facing alias for [`TypeRegistry::lookup`]
    pub fn get_type(&self, type_name: &str) -> Result<RecordSchema> {
        self.lookup(type_name)
    }

    /// Build a fresh default instance of a type
    ///
    /// Fails with `FactoryMismatch` if the factory's instance does not match
    /// the registered fields.
    pub fn construct(&self, type_name: &str) -> Result<RecordInstance> {
        // Factory runs outside the lock so it may itself use the registry
        let schema = self.lookup(type_name)?;
        schema.instantiate()
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.table().contains_key(type_name)
    }

    /// Registered type names, sorted
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.table().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table().is_empty()
    }

    /// Drop every registration, e.g. when the owning context is torn down
    pub fn unregister_all(&self) {
        let mut table = self.table();
        let cleared = table.len();
        table.clear();
        debug!(cleared, "Cleared type registry");
    }

    fn insert(&self, schema: RecordSchema) -> Result<()> {
        let mut table = self.table();

        if let Some(existing) = table.get(&schema.type_name) {
            if self.policy == RegistrationPolicy::Strict {
                return Err(RegistryError::DuplicateType {
                    type_name: schema.type_name,
                });
            }
            if existing.fingerprint != schema.fingerprint {
                warn!(
                    type_name = %schema.type_name,
                    old = existing.fingerprint.short(),
                    new = schema.fingerprint.short(),
                    "Re-registration changed record shape"
                );
            } else {
                debug!(type_name = %schema.type_name, "Re-registered type");
            }
        } else {
            debug!(
                type_name = %schema.type_name,
                fields = schema.fields.len(),
                "Registered type"
            );
        }

        table.insert(schema.type_name.clone(), schema);
        Ok(())
    }

    fn table(&self) -> MutexGuard<'_, HashMap<String, RecordSchema>> {
        // Every critical section leaves the map consistent, so a poisoned
        // lock still guards valid data.
        self.types.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldType;

    fn points_definition() -> TypeDefinition {
        TypeDefinition::new()
            .member("points", "Integer[]")
            .member("distances", "Scalar[]")
    }

    #[test]
    fn test_create_registry() {
        let registry = TypeRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.policy(), RegistrationPolicy::Overwrite);
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = TypeRegistry::new();
        registry.register_type("CollectedPoints", &points_definition()).unwrap();

        let schema = registry.lookup("CollectedPoints").unwrap();
        assert_eq!(schema.type_name, "CollectedPoints");
        assert_eq!(schema.fields[0].field_type, FieldType::array_of(FieldType::Integer));
        assert!(registry.contains("CollectedPoints"));
        assert_eq!(registry.type_names(), vec!["CollectedPoints".to_string()]);
    }

    #[test]
    fn test_invalid_definition_leaves_state_untouched() {
        let registry = TypeRegistry::new();
        registry.register_type("CollectedPoints", &points_definition()).unwrap();

        let bad = TypeDefinition::new().member("points", "Point[]");
        let err = registry.register_type("CollectedPoints", &bad).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidSchema { .. }));

        let schema = registry.lookup("CollectedPoints").unwrap();
        assert_eq!(schema.fields.len(), 2);
    }

    #[test]
    fn test_empty_type_name_rejected() {
        let registry = TypeRegistry::new();
        let err = registry.register_type("", &points_definition()).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidSchema { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_strict_policy() {
        let registry = TypeRegistry::with_policy(RegistrationPolicy::Strict);
        registry.register_type("CollectedPoints", &points_definition()).unwrap();

        let other = TypeDefinition::new().member("points", "Scalar[]");
        let err = registry.register_type("CollectedPoints", &other).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateType { .. }));
        assert_eq!(registry.lookup("CollectedPoints").unwrap().fields.len(), 2);
    }

    #[test]
    fn test_unregister_all_is_idempotent() {
        let registry = TypeRegistry::new();
        registry.register_type("CollectedPoints", &points_definition()).unwrap();
        registry.unregister_all();
        registry.unregister_all();
        assert!(registry.is_empty());
        assert!(registry.lookup("CollectedPoints").unwrap_err().is_not_found());
    }
}
