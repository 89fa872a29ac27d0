//! Coalescing of HelmRelease values over chart defaults.

use serde_yaml::{Mapping, Value};

/// Merge `overrides` over `defaults`.
///
/// Nested mappings merge key by key, any other override replaces the default
/// outright, and a `null` override removes the key, as `helm` does.
pub fn coalesce_values(defaults: &Value, overrides: &Value) -> Value {
    match (defaults, overrides) {
        (Value::Mapping(base), Value::Mapping(over)) => Value::Mapping(coalesce_mappings(base, over)),
        (_, Value::Null) => defaults.clone(),
        (_, over) => over.clone(),
    }
}

fn coalesce_mappings(base: &Mapping, over: &Mapping) -> Mapping {
    let mut merged = base.clone();

    for (key, value) in over {
        if value.is_null() {
            merged.remove(key);
            continue;
        }

        let next = match merged.get(key) {
            Some(existing @ Value::Mapping(_)) if value.is_mapping() => coalesce_values(existing, value),
            _ => value.clone(),
        };
        merged.insert(key.clone(), next);
    }

    merged
}

/// Re-express keys that coalescing removed from `defaults` as explicit nulls.
///
/// `helm template -f` merges the file over the chart's `values.yaml` again, so
/// a removed default only stays removed when the file says `key: null`.
pub fn restore_deletions(defaults: &Value, coalesced: &Value) -> Value {
    let (Value::Mapping(base), Value::Mapping(merged)) = (defaults, coalesced) else {
        return coalesced.clone();
    };

    let mut out = merged.clone();
    for (key, default) in base {
        match merged.get(key) {
            None => {
                out.insert(key.clone(), Value::Null);
            }
            Some(value) if value.is_mapping() && default.is_mapping() => {
                out.insert(key.clone(), restore_deletions(default, value));
            }
            Some(_) => {}
        }
    }
    Value::Mapping(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn test_nested_keys_merge_and_scalars_overwrite() {
        let defaults = yaml(
            r#"
replicaCount: 1
image:
  repository: ghcr.io/stefanprodan/podinfo
  tag: 6.0.0
resources:
  requests:
    cpu: 100m
"#,
        );
        let overrides = yaml(
            r#"
replicaCount: 3
image:
  tag: 6.5.0
"#,
        );

        let merged = coalesce_values(&defaults, &overrides);
        assert_eq!(merged["replicaCount"], yaml("3"));
        assert_eq!(merged["image"]["tag"], yaml("6.5.0"));
        assert_eq!(merged["image"]["repository"], yaml("ghcr.io/stefanprodan/podinfo"));
        assert_eq!(merged["resources"]["requests"]["cpu"], yaml("100m"));
    }

    #[test]
    fn test_null_override_removes_key() {
        let defaults = yaml("a: 1\nb: 2\n");
        let merged = coalesce_values(&defaults, &yaml("b: null\n"));
        assert_eq!(merged, yaml("a: 1\n"));
    }

    #[test]
    fn test_mapping_replaces_scalar_and_lists_are_not_merged() {
        let defaults = yaml("tolerations: [a, b]\nnode: small\n");
        let overrides = yaml("tolerations: [c]\nnode:\n  size: large\n");

        let merged = coalesce_values(&defaults, &overrides);
        assert_eq!(merged["tolerations"], yaml("[c]"));
        assert_eq!(merged["node"]["size"], yaml("large"));
    }

    #[test]
    fn test_missing_overrides_keep_defaults() {
        let defaults = yaml("a: 1\n");
        assert_eq!(coalesce_values(&defaults, &Value::Null), defaults);
    }

    #[test]
    fn test_removed_defaults_come_back_as_nulls() {
        let defaults = yaml("a: 1\nb: 2\nnested:\n  keep: x\n  drop: y\n");
        let overrides = yaml("b: null\nnested:\n  drop: null\n");
        let merged = coalesce_values(&defaults, &overrides);
        assert_eq!(merged, yaml("a: 1\nnested:\n  keep: x\n"));

        let file = restore_deletions(&defaults, &merged);
        assert_eq!(file["b"], Value::Null);
        assert_eq!(file["nested"]["drop"], Value::Null);
        assert_eq!(file["nested"]["keep"], yaml("x"));
        assert_eq!(file["a"], yaml("1"));
        assert!(file.as_mapping().unwrap().contains_key("b"));
    }

    #[test]
    fn test_restore_deletions_without_removals_is_identity() {
        let defaults = yaml("a: 1\nimage:\n  tag: old\n");
        let merged = coalesce_values(&defaults, &yaml("image:\n  tag: new\n"));
        assert_eq!(restore_deletions(&defaults, &merged), merged);
    }
}
