//! Schema fingerprints for detecting shape drift across re-registrations

use sha2::{Digest, Sha256};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::schema::FieldSchema;

/// SHA256 fingerprint of a record's field list
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint the canonical `name:tag` form of the fields, in order
    pub fn of_fields(fields: &[FieldSchema]) -> Self {
        let canonical = fields
            .iter()
            .map(|f| format!("{}:{}", f.name, f.field_type))
            .collect::<Vec<_>>()
            .join(",");
        let hash = Sha256::digest(canonical.as_bytes());
        Self(format!("{:x}", hash))
    }

    /// Get the hex string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex digits, enough for log lines
    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldType;

    fn fields(names: &[(&str, FieldType)]) -> Vec<FieldSchema> {
        names
            .iter()
            .map(|(name, ty)| FieldSchema::new(*name, ty.clone()))
            .collect()
    }

    #[test]
    fn test_fingerprint_consistency() {
        let a = fields(&[("points", FieldType::array_of(FieldType::Integer))]);
        assert_eq!(Fingerprint::of_fields(&a), Fingerprint::of_fields(&a.clone()));
        assert_eq!(Fingerprint::of_fields(&a).as_str().len(), 64);
    }

    #[test]
    fn test_fingerprint_tracks_type_and_order() {
        let a = fields(&[("x", FieldType::Scalar), ("y", FieldType::Integer)]);
        let b = fields(&[("x", FieldType::Scalar), ("y", FieldType::Scalar)]);
        let c = fields(&[("y", FieldType::Integer), ("x", FieldType::Scalar)]);
        assert_ne!(Fingerprint::of_fields(&a), Fingerprint::of_fields(&b));
        assert_ne!(Fingerprint::of_fields(&a), Fingerprint::of_fields(&c));
    }

    #[test]
    fn test_short_on_truncated_fingerprint() {
        let fingerprint: Fingerprint = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(fingerprint.short(), "abc");

        let full = Fingerprint::of_fields(&[]);
        assert_eq!(full.short().len(), 12);
        assert!(full.as_str().starts_with(full.short()));
    }
}
