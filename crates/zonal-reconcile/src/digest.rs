//! Per-field content digests.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use zonal_core::{hash_value, ContentHash};

/// Flat map from top-level field name to the content hash of its value.
///
/// Two peers exchange digest maps instead of full objects to detect
/// divergence cheaply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestMap {
    /// Field name to content hash.
    pub fields: BTreeMap<String, ContentHash>,
}

impl DigestMap {
    /// Digest map with no fields.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of digested fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no fields were digested.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Hash of a named field, if present.
    pub fn get(&self, name: &str) -> Option<&ContentHash> {
        self.fields.get(name)
    }
}

/// Digest every top-level field of `value`.
///
/// Sequences are canonicalized before hashing: each element is hashed,
/// the element hashes are sorted, and the field hash covers the sorted
/// list. Two sequences holding the same sub-objects in different order
/// therefore digest identically. Non-object values digest to an empty map.
pub fn digest(value: &Value) -> DigestMap {
    let mut fields = BTreeMap::new();
    if let Some(object) = value.as_object() {
        for (name, sub) in object {
            fields.insert(name.clone(), field_hash(sub));
        }
    }
    DigestMap { fields }
}

fn field_hash(value: &Value) -> ContentHash {
    match value {
        Value::Array(items) => {
            let mut element_hashes: Vec<ContentHash> = items.iter().map(hash_value).collect();
            element_hashes.sort();

            let mut hasher = blake3::Hasher::new();
            for hash in &element_hashes {
                hasher.update(&hash.0);
            }
            hasher.finalize().into()
        }
        other => hash_value(other),
    }
}
