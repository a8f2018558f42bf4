//! Deterministic remote-wins merge.

use serde_json::map::Entry;
use serde_json::{Map, Value};

/// Controls how sequence elements are matched during a merge.
#[derive(Debug, Clone)]
pub struct MergePolicy {
    /// Keys whose combined values identify a sequence element. Two
    /// elements carrying equal values under every identity key are the
    /// same logical element.
    pub identity_keys: Vec<String>,
}

impl Default for MergePolicy {
    fn default() -> Self {
        // Service records in the zone are identified by which API they
        // expose and where it lives.
        Self {
            identity_keys: vec!["api".to_owned(), "serviceAddress".to_owned()],
        }
    }
}

impl MergePolicy {
    /// Build a policy around custom identity keys.
    pub fn with_identity_keys(keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            identity_keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    fn identity_of<'a>(&self, element: &'a Value) -> Option<Vec<&'a Value>> {
        let object = element.as_object()?;
        self.identity_keys
            .iter()
            .map(|key| object.get(key))
            .collect()
    }

    fn same_element(&self, a: &Value, b: &Value) -> bool {
        match (self.identity_of(a), self.identity_of(b)) {
            (Some(ia), Some(ib)) => ia == ib,
            // Elements without a full identity fall back to equality.
            _ => a == b,
        }
    }
}

/// Reconcile a remote payload into `local`.
///
/// Precedence, per field:
/// - remote-only keys are added (remote is authoritative for new keys),
/// - scalar conflicts resolve to the remote value,
/// - nested objects merge recursively under the same rules,
/// - sequences merge as a de-duplicated union by element identity, with
///   the remote copy kept for matched elements,
/// - keys the payload never mentions are preserved unchanged.
///
/// Not commutative for scalar conflicts, but idempotent: re-applying the
/// same payload is a no-op.
pub fn merge(local: &mut Value, remote_payload: &Map<String, Value>, policy: &MergePolicy) {
    let Some(object) = local.as_object_mut() else {
        return;
    };
    for (name, remote_value) in remote_payload {
        match object.entry(name.clone()) {
            Entry::Occupied(mut entry) => merge_value(entry.get_mut(), remote_value, policy),
            Entry::Vacant(entry) => {
                entry.insert(remote_value.clone());
            }
        }
    }
}

fn merge_value(local: &mut Value, remote: &Value, policy: &MergePolicy) {
    match (local, remote) {
        (Value::Object(local_object), Value::Object(remote_object)) => {
            for (key, remote_value) in remote_object {
                match local_object.entry(key.clone()) {
                    Entry::Occupied(mut entry) => {
                        merge_value(entry.get_mut(), remote_value, policy);
                    }
                    Entry::Vacant(entry) => {
                        entry.insert(remote_value.clone());
                    }
                }
            }
            // Local-only keys are never deleted by a merge.
        }
        (Value::Array(local_items), Value::Array(remote_items)) => {
            let merged = sequence_union(local_items, remote_items, policy);
            *local_items = merged;
        }
        (local_value, remote_value) => {
            if local_value != remote_value {
                *local_value = remote_value.clone();
            }
        }
    }
}

/// De-duplicated union of two sequences.
///
/// Remote elements come first so that a matched identity keeps the remote
/// copy; every unmatched element from either side survives once.
fn sequence_union(local: &[Value], remote: &[Value], policy: &MergePolicy) -> Vec<Value> {
    let mut merged: Vec<Value> = Vec::with_capacity(local.len() + remote.len());
    for candidate in remote.iter().chain(local.iter()) {
        if !merged
            .iter()
            .any(|existing| policy.same_element(existing, candidate))
        {
            merged.push(candidate.clone());
        }
    }
    merged
}
