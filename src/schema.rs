//! Record schemas and the host-facing type definition shape

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::checksum::Fingerprint;
use crate::error::{RegistryError, Result};
use crate::field::FieldType;
use crate::value::RecordInstance;

/// Zero-argument constructor producing a fresh default instance
pub type Factory = Arc<dyn Fn() -> RecordInstance + Send + Sync>;

/// A single named, typed field declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// A registered record type: ordered fields plus the factory that builds it
#[derive(Clone)]
pub struct RecordSchema {
    /// Unique name within a registry (e.g. "CollectedPoints")
    pub type_name: String,
    /// Field declarations in registration order
    pub fields: Vec<FieldSchema>,
    /// Fingerprint of `fields`
    pub fingerprint: Fingerprint,
    /// When this schema was registered
    pub registered_at: DateTime<Utc>,
    factory: Factory,
}

impl RecordSchema {
    /// Validate the field list and bind it to a factory
    pub fn new(type_name: impl Into<String>, fields: Vec<FieldSchema>, factory: Factory) -> Result<Self> {
        let type_name = type_name.into();
        validate(&type_name, &fields)?;
        let fingerprint = Fingerprint::of_fields(&fields);

        Ok(Self {
            type_name,
            fields,
            fingerprint,
            registered_at: Utc::now(),
            factory,
        })
    }

    /// Invoke the factory and check the instance against the declared fields
    ///
    /// The instance must carry this type's name and exactly the declared
    /// fields, each with its declared type and a conforming value.
    pub fn instantiate(&self) -> Result<RecordInstance> {
        let instance = (self.factory)();
        self.check_instance(&instance)?;
        Ok(instance)
    }

    fn check_instance(&self, instance: &RecordInstance) -> Result<()> {
        let mismatch = |reason: String| RegistryError::FactoryMismatch {
            type_name: self.type_name.clone(),
            reason,
        };

        if instance.type_name() != self.type_name {
            return Err(mismatch(format!("instance is named '{}'", instance.type_name())));
        }

        for field in &self.fields {
            let declared = instance.field_type(&field.name);
            let value = instance.get(&field.name);
            let (Some(declared), Some(value)) = (declared, value) else {
                return Err(mismatch(format!("field '{}' is missing", field.name)));
            };
            if *declared != field.field_type || !value.conforms_to(&field.field_type) {
                return Err(mismatch(format!(
                    "field '{}' is not {}",
                    field.name, field.field_type
                )));
            }
        }

        if instance.len() != self.fields.len() {
            return Err(mismatch(format!(
                "{} fields declared, instance has {}",
                self.fields.len(),
                instance.len()
            )));
        }

        Ok(())
    }

    /// Get a field declaration by name
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The schema as the tag map a host would have registered
    pub fn to_definition(&self) -> TypeDefinition {
        TypeDefinition {
            members: self
                .fields
                .iter()
                .map(|f| (f.name.clone(), f.field_type.to_string()))
                .collect(),
        }
    }
}

impl fmt::Debug for RecordSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordSchema")
            .field("type_name", &self.type_name)
            .field("fields", &self.fields)
            .field("fingerprint", &self.fingerprint)
            .field("registered_at", &self.registered_at)
            .finish_non_exhaustive()
    }
}

/// Host registration shape: member name to field type tag
///
/// ```
/// use record_registry::TypeDefinition;
///
/// let def = TypeDefinition::new()
///     .member("points", "Integer[]")
///     .member("distances", "Scalar[]");
/// assert_eq!(def.parse_fields("CollectedPoints").unwrap().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDefinition {
    #[serde(default)]
    pub members: IndexMap<String, String>,
}

impl TypeDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member; a repeated name replaces the earlier tag in place
    pub fn member(mut self, name: impl Into<String>, tag: impl Into<String>) -> Self {
        self.members.insert(name.into(), tag.into());
        self
    }

    /// Parse every tag into a field declaration, keeping member order
    pub fn parse_fields(&self, type_name: &str) -> Result<Vec<FieldSchema>> {
        self.members
            .iter()
            .map(|(name, tag)| {
                let field_type = tag.parse::<FieldType>().map_err(|e| {
                    RegistryError::invalid(type_name, format!("member '{}': {}", name, e))
                })?;
                Ok(FieldSchema::new(name.clone(), field_type))
            })
            .collect()
    }
}

/// Factory building a fresh instance with every field at its default
pub fn default_factory(type_name: impl Into<String>, fields: &[FieldSchema]) -> Factory {
    let type_name = type_name.into();
    let fields = fields.to_vec();
    Arc::new(move || RecordInstance::new(type_name.clone(), &fields))
}

fn validate(type_name: &str, fields: &[FieldSchema]) -> Result<()> {
    if type_name.trim().is_empty() {
        return Err(RegistryError::invalid(type_name, "type name is empty"));
    }

    let mut seen = HashSet::new();
    for field in fields {
        if field.name.trim().is_empty() {
            return Err(RegistryError::invalid(type_name, "field name is empty"));
        }
        if !seen.insert(field.name.as_str()) {
            return Err(RegistryError::invalid(
                type_name,
                format!("duplicate field '{}'", field.name),
            ));
        }
    }

    Ok(())
}
