// ABOUTME: Build argument values: literals or references to environment variables.
// ABOUTME: `{ env: NAME, default: value }` reads NAME when the build runs.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EnvValue {
    Literal(String),
    FromEnv {
        #[serde(rename = "env")]
        var: String,
        #[serde(default)]
        default: Option<String>,
    },
}

impl EnvValue {
    pub fn resolve(&self) -> Result<String> {
        self.resolve_with(|var| std::env::var(var).ok())
    }

    pub fn resolve_with<F>(&self, lookup: F) -> Result<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        match self {
            EnvValue::Literal(s) => Ok(s.clone()),
            EnvValue::FromEnv { var, default } => lookup(var)
                .or_else(|| default.clone())
                .ok_or_else(|| Error::MissingEnvVar(var.clone())),
        }
    }
}

pub fn resolve_env_map(map: &HashMap<String, EnvValue>) -> Result<HashMap<String, String>> {
    map.iter()
        .map(|(k, v)| v.resolve().map(|resolved| (k.clone(), resolved)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_literal_and_reference() {
        let map: HashMap<String, EnvValue> =
            serde_yaml::from_str("A: plain\nB: { env: NPM_TOKEN, default: none }\n").unwrap();
        assert_eq!(map["A"], EnvValue::Literal("plain".to_string()));
        assert_eq!(
            map["B"],
            EnvValue::FromEnv {
                var: "NPM_TOKEN".to_string(),
                default: Some("none".to_string()),
            }
        );
    }

    #[test]
    fn reference_prefers_environment_over_default() {
        let value = EnvValue::FromEnv {
            var: "NPM_TOKEN".to_string(),
            default: Some("none".to_string()),
        };
        assert_eq!(
            value.resolve_with(|_| Some("secret".to_string())).unwrap(),
            "secret"
        );
        assert_eq!(value.resolve_with(|_| None).unwrap(), "none");
    }

    #[test]
    fn missing_reference_without_default_fails() {
        let value = EnvValue::FromEnv {
            var: "NPM_TOKEN".to_string(),
            default: None,
        };
        let err = value.resolve_with(|_| None).unwrap_err();
        assert!(matches!(err, Error::MissingEnvVar(ref v) if v == "NPM_TOKEN"));
    }
}
