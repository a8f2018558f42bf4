//! Digest comparison and content resolution.

use crate::digest::{digest, DigestMap};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Result of comparing a local value against a remote digest.
///
/// `fields` names what the remote side must send back (present on both
/// sides with differing hashes, or present remotely but absent locally).
/// `extra` carries fully-materialized local-only fields the remote side
/// lacks, so one round trip both asks and pushes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiffSet {
    /// Names of fields to request from the remote peer.
    pub fields: BTreeSet<String>,
    /// Local-only fields pushed to the remote peer, by value.
    pub extra: Map<String, Value>,
}

impl DiffSet {
    /// Whether nothing diverged.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.extra.is_empty()
    }
}

/// Compare `local` against a peer's digest map.
///
/// Every field named in `remote_digest` whose local hash differs, or which
/// is missing locally, lands in [`DiffSet::fields`]. Every local field the
/// remote digest does not mention lands, by value, in [`DiffSet::extra`].
pub fn diff(local: &Value, remote_digest: &DigestMap) -> DiffSet {
    let local_digest = digest(local);

    let mut fields = BTreeSet::new();
    for (name, remote_hash) in &remote_digest.fields {
        match local_digest.get(name) {
            Some(local_hash) if local_hash == remote_hash => {}
            _ => {
                fields.insert(name.clone());
            }
        }
    }

    let mut extra = Map::new();
    if let Some(object) = local.as_object() {
        for (name, value) in object {
            if remote_digest.get(name).is_none() {
                extra.insert(name.clone(), value.clone());
            }
        }
    }

    DiffSet { fields, extra }
}

/// Turn a received diff set into the content payload to transmit.
///
/// Requested field names are answered out of `local`; fields bundled in
/// [`DiffSet::extra`] are applied directly into `local` (they are fields
/// this side did not have yet). Returns the name-to-value payload for the
/// requester to [`merge`](crate::merge).
pub fn resolve(diff_set: &DiffSet, local: &mut Value) -> Map<String, Value> {
    let mut payload = Map::new();
    for name in &diff_set.fields {
        if let Some(value) = local.get(name) {
            payload.insert(name.clone(), value.clone());
        }
    }

    if !diff_set.extra.is_empty() {
        if let Some(object) = local.as_object_mut() {
            for (name, value) in &diff_set.extra {
                object.insert(name.clone(), value.clone());
            }
        }
    }

    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identical_values_produce_an_empty_diff() {
        let value = json!({"userData": {"city": "London"}, "crl": ""});
        let diff_set = diff(&value, &digest(&value));
        assert!(diff_set.is_empty());
    }

    #[test]
    fn differing_field_is_named_for_request() {
        let local = json!({"userPref": {"provider": 80}});
        let remote = digest(&json!({"userPref": {"provider": 6080}}));
        let diff_set = diff(&local, &remote);
        assert!(diff_set.fields.contains("userPref"));
        assert!(diff_set.extra.is_empty());
    }

    #[test]
    fn remote_only_field_is_named_for_request() {
        let local = json!({"cert": {}});
        let remote = digest(&json!({"cert": {}, "crl": "blob"}));
        let diff_set = diff(&local, &remote);
        assert_eq!(diff_set.fields, BTreeSet::from(["crl".to_owned()]));
    }

    #[test]
    fn local_only_field_is_pushed_by_value() {
        let local = json!({"cert": {}, "policy": {"rule": "permit"}});
        let remote = digest(&json!({"cert": {}}));
        let diff_set = diff(&local, &remote);
        assert!(diff_set.fields.is_empty());
        assert_eq!(diff_set.extra.get("policy"), Some(&json!({"rule": "permit"})));
    }

    #[test]
    fn resolve_answers_requests_out_of_local_state() {
        let diff_set = DiffSet {
            fields: BTreeSet::from(["crl".to_owned(), "unknown".to_owned()]),
            extra: Map::new(),
        };
        let mut local = json!({"crl": "blob", "cert": {}});
        let payload = resolve(&diff_set, &mut local);
        assert_eq!(payload.get("crl"), Some(&json!("blob")));
        // A requested field this side does not hold is simply skipped.
        assert!(payload.get("unknown").is_none());
    }

    #[test]
    fn resolve_applies_pushed_extras_into_local_state() {
        let mut extra = Map::new();
        extra.insert("policy".to_owned(), json!({"rule": "permit"}));
        let diff_set = DiffSet {
            fields: BTreeSet::new(),
            extra,
        };
        let mut local = json!({"cert": {}});
        let payload = resolve(&diff_set, &mut local);
        assert!(payload.is_empty());
        assert_eq!(local.get("policy"), Some(&json!({"rule": "permit"})));
    }
}
