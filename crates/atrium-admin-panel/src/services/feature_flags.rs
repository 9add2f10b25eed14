use std::collections::HashMap;
use std::hash::Hash;

use atrium_entities::{feature_flags, FeatureFlagKey};
use tracing::debug;

use crate::types::FeatureFlagValue;

/// Pair every key with its stored value, or with `default` when nothing is stored.
///
/// Output follows the order of `keys`. Stored entries whose key is not listed are ignored.
pub fn left_join_with_default<K, V, I>(keys: &[K], stored: I, default: V) -> Vec<(K, V)>
where
    K: Copy + Eq + Hash,
    V: Clone,
    I: IntoIterator<Item = (K, V)>,
{
    let mut stored: HashMap<K, V> = stored.into_iter().collect();
    keys.iter()
        .map(|key| {
            let value = stored.remove(key).unwrap_or_else(|| default.clone());
            (*key, value)
        })
        .collect()
}

/// Full flag set of a workspace: every known key, `false` unless a row overrides it.
pub fn merge_feature_flags(rows: &[feature_flags::Model]) -> Vec<FeatureFlagValue> {
    let stored = rows.iter().filter_map(|row| match FeatureFlagKey::from_str(&row.key) {
        Some(key) => Some((key, row.value)),
        None => {
            debug!("Ignoring unknown feature flag '{}' on workspace {}", row.key, row.workspace_id);
            None
        }
    });

    left_join_with_default(&FeatureFlagKey::all(), stored, false)
        .into_iter()
        .map(|(key, value)| FeatureFlagValue { key, value })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn row(key: &str, value: bool) -> feature_flags::Model {
        feature_flags::Model {
            id: Uuid::new_v4(),
            workspace_id: Uuid::nil(),
            key: key.to_string(),
            value,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_left_join_keeps_key_order_and_defaults() {
        let joined = left_join_with_default(&["a", "b", "c"], vec![("c", 3), ("a", 1)], 0);
        assert_eq!(joined, vec![("a", 1), ("b", 0), ("c", 3)]);
    }

    #[test]
    fn test_left_join_drops_unlisted_entries() {
        let joined = left_join_with_default(&["a"], vec![("z", 9)], 0);
        assert_eq!(joined, vec![("a", 0)]);
    }

    #[test]
    fn test_merge_without_rows_reports_every_key_disabled() {
        let flags = merge_feature_flags(&[]);

        assert_eq!(flags.len(), FeatureFlagKey::all().len());
        assert!(flags.iter().all(|flag| !flag.value));
    }

    #[test]
    fn test_merge_applies_stored_values() {
        let flags = merge_feature_flags(&[
            row("IS_COPILOT_ENABLED", true),
            row("IS_WORKFLOW_ENABLED", false),
        ]);

        let copilot = flags
            .iter()
            .find(|flag| flag.key == FeatureFlagKey::IsCopilotEnabled)
            .unwrap();
        assert!(copilot.value);
        assert_eq!(flags.iter().filter(|flag| flag.value).count(), 1);
    }

    #[test]
    fn test_merge_ignores_retired_keys() {
        let flags = merge_feature_flags(&[row("IS_RETIRED_FEATURE_ENABLED", true)]);

        assert_eq!(flags.len(), FeatureFlagKey::all().len());
        assert!(flags.iter().all(|flag| !flag.value));
    }
}
