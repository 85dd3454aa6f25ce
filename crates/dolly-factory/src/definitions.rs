use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use dolly_core::{DEFAULT_PRIMARY_KEY, Storage, Value};

use crate::association::AssociationKind;
use crate::errors::DefinitionError;
use crate::factory::Factory;
use crate::options::Options;
use crate::sequence::Sequence;

/// Declarative blueprint file, usually TOML.
///
/// Blueprints register in file order, so associations and `extends` may only
/// reference blueprints declared earlier in the file (or already registered
/// on the factory).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefinitionFile {
    #[serde(rename = "blueprint", default)]
    pub blueprints: Vec<BlueprintDefinition>,
}

/// One `[[blueprint]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlueprintDefinition {
    pub name: String,
    /// Base blueprint; the entry is registered through `Factory::extend`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<String>,
    #[serde(default)]
    pub fields: IndexMap<String, toml::Value>,
    /// Field name to template; `{n}` is replaced by the sequence counter.
    #[serde(default)]
    pub sequences: IndexMap<String, String>,
    #[serde(default)]
    pub associations: IndexMap<String, AssociationDefinition>,
}

/// Association entry referencing another blueprint by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssociationDefinition {
    pub kind: AssociationKind,
    pub blueprint: String,
    pub foreign_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl DefinitionFile {
    pub fn from_toml_str(contents: &str) -> Result<Self, DefinitionError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load(path: &Path) -> Result<Self, DefinitionError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Register every blueprint of the file on `factory`.
    pub fn apply<S: Storage>(&self, factory: &mut Factory<S>) -> Result<(), DefinitionError> {
        for definition in &self.blueprints {
            let options = definition.options(factory)?;
            match &definition.extends {
                Some(base) => factory.extend(base, &definition.name, options)?,
                None => factory.define(&definition.name, options)?,
            };
        }

        info!(blueprints = self.blueprints.len(), "definitions applied");
        Ok(())
    }
}

impl BlueprintDefinition {
    fn options<S: Storage>(&self, factory: &Factory<S>) -> Result<Options, DefinitionError> {
        let mut options = Options::new();

        if let Some(table) = &self.table {
            options = options.table(table.as_str());
        }
        if let Some(primary_key) = &self.primary_key {
            options = options.primary_key(primary_key.as_str());
        }

        for (field, value) in &self.fields {
            options = options.field(field.as_str(), self.scalar(field, value)?);
        }

        for (field, pattern) in &self.sequences {
            options = options.sequence(field.as_str(), Sequence::template(pattern.as_str()));
        }

        for (field, definition) in &self.associations {
            let association = factory.association_with_key(
                definition.kind,
                &definition.blueprint,
                &definition.foreign_key,
                definition.key.as_deref().unwrap_or(DEFAULT_PRIMARY_KEY),
            )?;
            options = options.association(field.as_str(), association);
        }

        Ok(options)
    }

    fn scalar(&self, field: &str, value: &toml::Value) -> Result<Value, DefinitionError> {
        match value {
            toml::Value::String(value) => Ok(Value::Text(value.clone())),
            toml::Value::Integer(value) => Ok(Value::Int(*value)),
            toml::Value::Float(value) => Ok(Value::Float(*value)),
            toml::Value::Boolean(value) => Ok(Value::Bool(*value)),
            toml::Value::Datetime(value) => Ok(Value::Text(value.to_string())),
            toml::Value::Array(_) | toml::Value::Table(_) => Err(DefinitionError::UnsupportedValue {
                blueprint: self.name.clone(),
                field: field.to_string(),
                message: "arrays and tables cannot be field defaults".to_string(),
            }),
        }
    }
}
