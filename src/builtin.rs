//! Built-in record types

use std::sync::Arc;

use crate::error::{RegistryError, Result};
use crate::field::FieldType;
use crate::registry::TypeRegistry;
use crate::schema::{FieldSchema, TypeDefinition};
use crate::value::{FieldValue, RecordInstance};

/// Point indices collected by a query, with the distance found for each
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectedPoints {
    pub points: Vec<i64>,
    pub distances: Vec<f64>,
}

impl CollectedPoints {
    pub const TYPE_NAME: &'static str = "CollectedPoints";

    pub fn new() -> Self {
        Self::default()
    }

    /// `points: Integer[]`, `distances: Scalar[]`
    pub fn fields() -> Vec<FieldSchema> {
        vec![
            FieldSchema::new("points", FieldType::array_of(FieldType::Integer)),
            FieldSchema::new("distances", FieldType::array_of(FieldType::Scalar)),
        ]
    }

    /// `{ points: Integer[], distances: Scalar[] }`
    pub fn definition() -> TypeDefinition {
        Self::fields()
            .into_iter()
            .fold(TypeDefinition::new(), |def, field| {
                def.member(field.name, field.field_type.to_string())
            })
    }

    /// Register this type, constructing instances from `CollectedPoints::new`
    pub fn register(registry: &TypeRegistry) -> Result<()> {
        registry.register(
            Self::TYPE_NAME,
            Self::fields(),
            Arc::new(|| RecordInstance::from(CollectedPoints::new())),
        )
    }
}

/// Register every built-in type
pub fn register_builtins(registry: &TypeRegistry) -> Result<()> {
    CollectedPoints::register(registry)
}

impl From<CollectedPoints> for RecordInstance {
    fn from(value: CollectedPoints) -> Self {
        let values = [FieldValue::from(value.points), FieldValue::from(value.distances)];
        RecordInstance::from_parts(
            CollectedPoints::TYPE_NAME,
            CollectedPoints::fields().into_iter().zip(values),
        )
    }
}

impl TryFrom<RecordInstance> for CollectedPoints {
    type Error = RegistryError;

    fn try_from(instance: RecordInstance) -> Result<Self> {
        if instance.type_name() != Self::TYPE_NAME {
            return Err(RegistryError::RecordMismatch {
                expected: Self::TYPE_NAME.to_string(),
                actual: instance.type_name().to_string(),
            });
        }
        let points = collect(&instance, "points", FieldValue::as_integer)?;
        let distances = collect(&instance, "distances", FieldValue::as_scalar)?;
        Ok(Self { points, distances })
    }
}

fn collect<T>(
    instance: &RecordInstance,
    field: &str,
    element: fn(&FieldValue) -> Option<T>,
) -> Result<Vec<T>> {
    let mismatch = || RegistryError::TypeMismatch {
        type_name: instance.type_name().to_string(),
        field: field.to_string(),
        expected: instance
            .field_type(field)
            .map(ToString::to_string)
            .unwrap_or_else(|| "array".to_string()),
    };

    let items = instance
        .get(field)
        .ok_or_else(|| RegistryError::UnknownField {
            type_name: instance.type_name().to_string(),
            field: field.to_string(),
        })?
        .as_array()
        .ok_or_else(mismatch)?;

    items.iter().map(|item| element(item).ok_or_else(mismatch)).collect()
}
