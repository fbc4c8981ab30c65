use std::path::Path;

use anyhow::Result;
use jsonschema::{validator_for, Validator};
use once_cell::sync::Lazy;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::portal::{AnyPortal, Portal};
use crate::sequence::{tuple, Tuple};
use crate::versioned::{versioned, Versioned};

/// How tuples treat input lists whose length differs from their arity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ArityPolicy {
    /// Extra trailing elements are ignored; missing positions are absent.
    #[default]
    Permissive,
    /// Length must equal the arity.
    Exact,
}

/// What a versioned read does with a tag newer than its migration count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FutureVersionPolicy {
    /// Fail at the version slot (`[0]`).
    #[default]
    Reject,
    /// Hand the un-migrated payload to the current schema.
    Validate,
}

/// Construction-time settings for portals whose behaviour has a policy knob.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct PortalConfig {
    pub tuple_arity: ArityPolicy,
    pub future_versions: FutureVersionPolicy,
}

static SCHEMA_JSON: Lazy<serde_json::Value> = Lazy::new(|| {
    serde_json::to_value(schemars::schema_for!(PortalConfig)).expect("schema value")
});

static VALIDATOR: Lazy<Validator> =
    Lazy::new(|| validator_for(&SCHEMA_JSON).expect("valid schema"));

/// JSON schema of the TOML settings file, as used to validate it.
pub fn config_schema_json() -> serde_json::Value {
    SCHEMA_JSON.clone()
}

pub fn load_config(path: impl AsRef<Path>) -> Result<PortalConfig> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let cfg = PortalConfig::from_toml_str(&content)?;
    tracing::debug!(path = %path.as_ref().display(), ?cfg, "loaded portal config");
    Ok(cfg)
}

impl PortalConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: toml::Table = toml::from_str(content)?;
        let json_value = serde_json::to_value(&raw)?;
        let validation_errors: Vec<_> = VALIDATOR
            .iter_errors(&json_value)
            .map(|e| e.to_string())
            .collect();
        if !validation_errors.is_empty() {
            return Err(anyhow::anyhow!(validation_errors.join(", ")));
        }
        Ok(toml::from_str(content)?)
    }

    pub fn tuple(&self, items: Vec<AnyPortal>) -> Tuple {
        tuple(items).with_arity(self.tuple_arity)
    }

    pub fn versioned<P: Portal>(&self, schema: P) -> Versioned<P> {
        versioned(schema).with_future_versions(self.future_versions)
    }
}
