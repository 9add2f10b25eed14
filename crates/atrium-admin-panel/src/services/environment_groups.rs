//! Buckets configuration variables by display group

use std::cmp::Ordering;
use std::collections::HashMap;

use atrium_config::{EnvironmentEntry, EnvironmentVariablesGroup, GroupMetadata};

use crate::error::AdminPanelError;
use crate::types::{EnvironmentVariable, EnvironmentVariablesGroupData};

/// Group `entries` by their declared group.
///
/// Groups come out ordered by `position` and the variables inside each group by name.
/// A group missing from `metadata` is an error rather than being dropped.
pub fn group_environment_variables<'a, I>(
    entries: I,
    metadata: &HashMap<EnvironmentVariablesGroup, GroupMetadata>,
) -> Result<Vec<EnvironmentVariablesGroupData>, AdminPanelError>
where
    I: IntoIterator<Item = (&'a str, &'a EnvironmentEntry)>,
{
    let mut buckets: HashMap<EnvironmentVariablesGroup, Vec<EnvironmentVariable>> = HashMap::new();

    for (name, entry) in entries {
        buckets
            .entry(entry.metadata.group)
            .or_default()
            .push(EnvironmentVariable {
                name: name.to_string(),
                description: entry.metadata.description.clone(),
                value: entry.value.to_display_string(),
                sensitive: entry.metadata.sensitive,
            });
    }

    let mut groups = Vec::with_capacity(buckets.len());
    for (group, mut variables) in buckets {
        let group_metadata = metadata
            .get(&group)
            .ok_or(AdminPanelError::UnknownEnvironmentGroup { group })?;
        variables.sort_by(|a, b| locale_compare(&a.name, &b.name));
        groups.push((group_metadata.position, group, group_metadata, variables));
    }

    groups.sort_by_key(|(position, ..)| *position);

    Ok(groups
        .into_iter()
        .map(|(_, group, group_metadata, variables)| EnvironmentVariablesGroupData {
            name: group,
            description: group_metadata.description.to_string(),
            is_hidden_on_load: group_metadata.is_hidden_on_load,
            variables,
        })
        .collect())
}

/// Case-insensitive comparison where punctuation sorts before digits and digits
/// before letters. Names equal up to case put lowercase first at the first
/// differing position, then fall back to code point order.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    a.chars()
        .map(collation_key)
        .cmp(b.chars().map(collation_key))
        .then_with(|| a.chars().map(char::is_uppercase).cmp(b.chars().map(char::is_uppercase)))
        .then_with(|| a.cmp(b))
}

fn collation_key(c: char) -> (u8, char) {
    if c.is_alphabetic() {
        (2, c.to_lowercase().next().unwrap_or(c))
    } else if c.is_numeric() {
        (1, c)
    } else {
        (0, c)
    }
}
