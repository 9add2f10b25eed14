use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use super::catalog::{self, VariableDefinition, VariableKind, CATALOG};
use super::groups::EnvironmentVariablesGroup;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EnvironmentError {
    #[error("Unknown environment variable: {name}")]
    UnknownVariable { name: String },

    #[error("Invalid value for {name}: expected {expected}, got '{value}'")]
    InvalidValue {
        name: String,
        expected: &'static str,
        value: String,
    },

    #[error("Environment variable {name} is required")]
    MissingValue { name: String },

    #[error("Environment variable {name} is not a {expected}")]
    WrongKind { name: String, expected: &'static str },
}

/// A resolved, typed variable value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EnvironmentValue {
    String(String),
    Number(i64),
    Bool(bool),
    List(Vec<String>),
}

impl EnvironmentValue {
    /// The value as shown to administrators. Lists are comma joined.
    pub fn to_display_string(&self) -> String {
        match self {
            EnvironmentValue::String(value) => value.clone(),
            EnvironmentValue::Number(value) => value.to_string(),
            EnvironmentValue::Bool(value) => value.to_string(),
            EnvironmentValue::List(values) => values.join(","),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableMetadata {
    pub group: EnvironmentVariablesGroup,
    pub description: String,
    pub sensitive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentEntry {
    pub value: EnvironmentValue,
    pub metadata: VariableMetadata,
}

/// Resolved configuration catalog.
///
/// Values are parsed once when the service is built; lookups never touch the process
/// environment again.
#[derive(Debug, Clone)]
pub struct EnvironmentService {
    values: HashMap<&'static str, EnvironmentEntry>,
}

impl EnvironmentService {
    /// Resolve every catalog variable from `vars`, falling back to its default.
    pub fn load<I, K, V>(vars: I) -> Result<Self, EnvironmentError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let supplied: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        let mut values = HashMap::with_capacity(CATALOG.len());
        for definition in CATALOG {
            let raw = supplied
                .get(definition.name)
                .map(String::as_str)
                .or(definition.default);
            let value = resolve(definition, raw)?;

            values.insert(
                definition.name,
                EnvironmentEntry {
                    value,
                    metadata: VariableMetadata {
                        group: definition.group,
                        description: definition.description.to_string(),
                        sensitive: definition.sensitive,
                    },
                },
            );
        }

        debug!("Resolved {} environment variables", values.len());
        Ok(Self { values })
    }

    pub fn from_process_env() -> Result<Self, EnvironmentError> {
        Self::load(std::env::vars())
    }

    /// Every variable keyed by name.
    pub fn get_all(&self) -> &HashMap<&'static str, EnvironmentEntry> {
        &self.values
    }

    pub fn get(&self, name: &str) -> Result<&EnvironmentValue, EnvironmentError> {
        self.values
            .get(name)
            .map(|entry| &entry.value)
            .ok_or_else(|| EnvironmentError::UnknownVariable {
                name: name.to_string(),
            })
    }

    pub fn get_string(&self, name: &str) -> Result<&str, EnvironmentError> {
        match self.get(name)? {
            EnvironmentValue::String(value) => Ok(value),
            _ => Err(wrong_kind(name, "string")),
        }
    }

    /// Like [`Self::get_string`] but an empty value reads as `None`.
    pub fn get_optional_string(&self, name: &str) -> Result<Option<&str>, EnvironmentError> {
        let value = self.get_string(name)?;
        Ok((!value.is_empty()).then_some(value))
    }

    pub fn get_number(&self, name: &str) -> Result<i64, EnvironmentError> {
        match self.get(name)? {
            EnvironmentValue::Number(value) => Ok(*value),
            _ => Err(wrong_kind(name, "number")),
        }
    }

    pub fn get_bool(&self, name: &str) -> Result<bool, EnvironmentError> {
        match self.get(name)? {
            EnvironmentValue::Bool(value) => Ok(*value),
            _ => Err(wrong_kind(name, "boolean")),
        }
    }

    pub fn get_list(&self, name: &str) -> Result<&[String], EnvironmentError> {
        match self.get(name)? {
            EnvironmentValue::List(values) => Ok(values),
            _ => Err(wrong_kind(name, "list")),
        }
    }

    pub fn is_sensitive(&self, name: &str) -> bool {
        catalog::find(name).map(|d| d.sensitive).unwrap_or(false)
    }
}

fn wrong_kind(name: &str, expected: &'static str) -> EnvironmentError {
    EnvironmentError::WrongKind {
        name: name.to_string(),
        expected,
    }
}

fn resolve(
    definition: &VariableDefinition,
    raw: Option<&str>,
) -> Result<EnvironmentValue, EnvironmentError> {
    let invalid = |expected: &'static str, value: &str| EnvironmentError::InvalidValue {
        name: definition.name.to_string(),
        expected,
        value: value.to_string(),
    };
    let missing = || EnvironmentError::MissingValue {
        name: definition.name.to_string(),
    };

    match definition.kind {
        VariableKind::String => Ok(EnvironmentValue::String(
            raw.unwrap_or_default().to_string(),
        )),
        VariableKind::Number => {
            let raw = raw.ok_or_else(missing)?.trim();
            raw.parse::<i64>()
                .map(EnvironmentValue::Number)
                .map_err(|_| invalid("a number", raw))
        }
        VariableKind::Bool => {
            let raw = raw.ok_or_else(missing)?.trim();
            match raw.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(EnvironmentValue::Bool(true)),
                "false" | "0" | "no" => Ok(EnvironmentValue::Bool(false)),
                _ => Err(invalid("a boolean", raw)),
            }
        }
        VariableKind::List => Ok(EnvironmentValue::List(
            raw.unwrap_or_default()
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<EnvironmentService, EnvironmentError> {
        EnvironmentService::load(vars.iter().map(|(k, v)| (k.to_string(), v.to_string())))
    }

    #[test]
    fn test_defaults_apply_when_unset() {
        let env = load(&[]).unwrap();

        assert_eq!(env.get_number("LOGIN_TOKEN_EXPIRES_IN_SECONDS").unwrap(), 900);
        assert!(!env.get_bool("IS_MULTIWORKSPACE_ENABLED").unwrap());
        assert_eq!(env.get_string("DEFAULT_SUBDOMAIN").unwrap(), "app");
    }

    #[test]
    fn test_unset_optional_values_are_empty() {
        let env = load(&[]).unwrap();

        assert_eq!(env.get_string("APP_SECRET").unwrap(), "");
        assert_eq!(env.get_optional_string("APP_SECRET").unwrap(), None);
        assert!(env.get_list("BILLING_PLAN_PRO_METERED_PRICE_IDS").unwrap().is_empty());
    }

    #[test]
    fn test_supplied_values_are_parsed() {
        let env = load(&[
            ("ACCESS_TOKEN_EXPIRES_IN_SECONDS", " 3600 "),
            ("IS_BILLING_ENABLED", "TRUE"),
            ("BILLING_PLAN_PRO_METERED_PRICE_IDS", "price_a, price_b,,"),
        ])
        .unwrap();

        assert_eq!(env.get_number("ACCESS_TOKEN_EXPIRES_IN_SECONDS").unwrap(), 3600);
        assert!(env.get_bool("IS_BILLING_ENABLED").unwrap());
        assert_eq!(
            env.get_list("BILLING_PLAN_PRO_METERED_PRICE_IDS").unwrap(),
            &["price_a".to_string(), "price_b".to_string()]
        );
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let err = load(&[("LOGIN_TOKEN_EXPIRES_IN_SECONDS", "soon")]).unwrap_err();
        assert!(matches!(
            err,
            EnvironmentError::InvalidValue { ref name, .. } if name == "LOGIN_TOKEN_EXPIRES_IN_SECONDS"
        ));
    }

    #[test]
    fn test_invalid_bool_is_rejected() {
        let err = load(&[("IS_BILLING_ENABLED", "maybe")]).unwrap_err();
        assert!(matches!(err, EnvironmentError::InvalidValue { .. }));
    }

    #[test]
    fn test_unknown_and_wrong_kind_lookups() {
        let env = load(&[]).unwrap();

        assert!(matches!(
            env.get("NOT_A_VARIABLE"),
            Err(EnvironmentError::UnknownVariable { .. })
        ));
        assert!(matches!(
            env.get_bool("DEFAULT_SUBDOMAIN"),
            Err(EnvironmentError::WrongKind { .. })
        ));
    }

    #[test]
    fn test_unrelated_variables_are_ignored() {
        let env = load(&[("HOME", "/root")]).unwrap();
        assert!(!env.get_all().contains_key("HOME"));
        assert_eq!(env.get_all().len(), CATALOG.len());
    }

    #[test]
    fn test_display_strings() {
        assert_eq!(EnvironmentValue::Number(42).to_display_string(), "42");
        assert_eq!(EnvironmentValue::Bool(false).to_display_string(), "false");
        assert_eq!(
            EnvironmentValue::List(vec!["a".into(), "b".into()]).to_display_string(),
            "a,b"
        );
    }

    #[test]
    fn test_metadata_follows_catalog() {
        let env = load(&[]).unwrap();
        let entry = &env.get_all()["BILLING_STRIPE_API_KEY"];

        assert!(entry.metadata.sensitive);
        assert_eq!(entry.metadata.group, EnvironmentVariablesGroup::BillingConfig);
        assert!(env.is_sensitive("APP_SECRET"));
        assert!(!env.is_sensitive("FRONTEND_URL"));
    }
}
