//! Field values and record instances

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::{RegistryError, Result};
use crate::field::FieldType;
use crate::schema::FieldSchema;

/// Value held by a record field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Scalar(f64),
    Integer(i64),
    Boolean(bool),
    String(String),
    Array(Vec<FieldValue>),
}

impl FieldValue {
    /// Check that this value has the shape described by `field_type`
    pub fn conforms_to(&self, field_type: &FieldType) -> bool {
        match (self, field_type) {
            (FieldValue::Scalar(_), FieldType::Scalar)
            | (FieldValue::Integer(_), FieldType::Integer)
            | (FieldValue::Boolean(_), FieldType::Boolean)
            | (FieldValue::String(_), FieldType::String) => true,
            (FieldValue::Array(items), FieldType::ArrayOf(element)) => {
                items.iter().all(|item| item.conforms_to(element))
            }
            _ => false,
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            FieldValue::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Scalar(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Boolean(v)
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::String(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::String(v.to_string())
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(items: Vec<T>) -> Self {
        FieldValue::Array(items.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Slot {
    field_type: FieldType,
    value: FieldValue,
}

/// A constructed record, exclusively owned by whoever requested it
///
/// Every declared field is always present; array fields start empty.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordInstance {
    type_name: String,
    slots: IndexMap<String, Slot>,
}

impl RecordInstance {
    /// Create an instance with every field set to its type's default
    pub fn new(type_name: impl Into<String>, fields: &[FieldSchema]) -> Self {
        let slots = fields
            .iter()
            .map(|field| {
                let slot = Slot {
                    field_type: field.field_type.clone(),
                    value: field.field_type.default_value(),
                };
                (field.name.clone(), slot)
            })
            .collect();

        Self {
            type_name: type_name.into(),
            slots,
        }
    }

    /// Build an instance from fields paired with values of their declared types
    pub(crate) fn from_parts(
        type_name: impl Into<String>,
        parts: impl IntoIterator<Item = (FieldSchema, FieldValue)>,
    ) -> Self {
        let slots = parts
            .into_iter()
            .map(|(field, value)| {
                debug_assert!(value.conforms_to(&field.field_type));
                let slot = Slot {
                    field_type: field.field_type,
                    value,
                };
                (field.name, slot)
            })
            .collect();

        Self {
            type_name: type_name.into(),
            slots,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.slots.get(field).map(|slot| &slot.value)
    }

    /// Declared type of a field
    pub fn field_type(&self, field: &str) -> Option<&FieldType> {
        self.slots.get(field).map(|slot| &slot.field_type)
    }

    /// Replace a field's value, checking it against the declared type
    pub fn set(&mut self, field: &str, value: impl Into<FieldValue>) -> Result<()> {
        let value = value.into();
        let slot = slot_mut(&mut self.slots, &self.type_name, field)?;
        if !value.conforms_to(&slot.field_type) {
            return Err(RegistryError::TypeMismatch {
                type_name: self.type_name.clone(),
                field: field.to_string(),
                expected: slot.field_type.to_string(),
            });
        }
        slot.value = value;
        Ok(())
    }

    /// Append an element to an array field
    pub fn push(&mut self, field: &str, value: impl Into<FieldValue>) -> Result<()> {
        let value = value.into();
        let slot = slot_mut(&mut self.slots, &self.type_name, field)?;
        match (&mut slot.value, slot.field_type.element()) {
            (FieldValue::Array(items), Some(element)) if value.conforms_to(element) => {
                items.push(value);
                Ok(())
            }
            _ => Err(RegistryError::TypeMismatch {
                type_name: self.type_name.clone(),
                field: field.to_string(),
                expected: slot
                    .field_type
                    .element()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "array field".to_string()),
            }),
        }
    }

    /// Fields in declaration order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.slots
            .iter()
            .map(|(name, slot)| (name.as_str(), &slot.value))
    }
}

fn slot_mut<'a>(
    slots: &'a mut IndexMap<String, Slot>,
    type_name: &str,
    field: &str,
) -> Result<&'a mut Slot> {
    slots.get_mut(field).ok_or_else(|| RegistryError::UnknownField {
        type_name: type_name.to_string(),
        field: field.to_string(),
    })
}

impl Serialize for RecordInstance {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.slots.len()))?;
        for (name, value) in self.fields() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points_fields() -> Vec<FieldSchema> {
        vec![
            FieldSchema::new("points", FieldType::array_of(FieldType::Integer)),
            FieldSchema::new("distances", FieldType::array_of(FieldType::Scalar)),
        ]
    }

    #[test]
    fn test_new_instance_has_empty_arrays() {
        let instance = RecordInstance::new("CollectedPoints", &points_fields());
        assert_eq!(instance.get("points"), Some(&FieldValue::Array(vec![])));
        assert_eq!(instance.get("distances"), Some(&FieldValue::Array(vec![])));
        assert_eq!(instance.len(), 2);
    }

    #[test]
    fn test_set_checks_type() {
        let mut instance = RecordInstance::new("CollectedPoints", &points_fields());
        instance.set("points", vec![1i64, 2, 3]).unwrap();
        assert!(matches!(
            instance.set("points", vec![1.5f64]),
            Err(RegistryError::TypeMismatch { .. })
        ));
        assert!(matches!(
            instance.set("normals", vec![1i64]),
            Err(RegistryError::UnknownField { .. })
        ));
        assert_eq!(instance.get("points").and_then(FieldValue::as_array).map(<[_]>::len), Some(3));
    }

    #[test]
    fn test_push() {
        let mut instance = RecordInstance::new("CollectedPoints", &points_fields());
        instance.push("distances", 0.25f64).unwrap();
        instance.push("distances", 4.0f64).unwrap();
        assert!(instance.push("distances", 7i64).is_err());
        assert_eq!(
            instance.get("distances"),
            Some(&FieldValue::Array(vec![FieldValue::Scalar(0.25), FieldValue::Scalar(4.0)]))
        );
    }

    #[test]
    fn test_serializes_in_declaration_order() {
        let mut instance = RecordInstance::new("CollectedPoints", &points_fields());
        instance.push("points", 7i64).unwrap();
        let json = serde_json::to_string(&instance).unwrap();
        assert_eq!(json, r#"{"points":[7],"distances":[]}"#);
    }
}
