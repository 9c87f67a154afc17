use super::{FieldDeclaration, FieldKind, FieldPolicyTable, GeneratedField, RecordTypeBuilder};
use crate::core::ConfigError;
use crate::generator::{GeneratorOptions, GeneratorRegistry};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Declarative record-type registration, usually loaded from JSON:
///
/// ```json
/// {
///   "name": "optionsdoc",
///   "fields": [
///     { "name": "_id", "generated": { "options": { "len": 2, "alphabet": "abc" }, "retries": 10 } },
///     { "name": "num" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordTypeConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_retries: Option<u32>,
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated: Option<GeneratedFieldConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedFieldConfig {
    #[serde(default = "default_generator_name")]
    pub generator: String,
    #[serde(default)]
    pub options: GeneratorOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
}

fn default_generator_name() -> String {
    "shortid".to_string()
}

impl RecordTypeConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Resolves generator names against `registry` and builds the table.
    pub fn build(&self, registry: &GeneratorRegistry) -> Result<FieldPolicyTable, ConfigError> {
        let mut builder = RecordTypeBuilder::new(&self.name);
        if let Some(retries) = self.default_retries {
            builder = builder.default_retries(retries);
        }

        for field in &self.fields {
            let kind = match &field.generated {
                None => FieldKind::Plain,
                Some(generated) => {
                    let generator = registry.get(&generated.generator).ok_or_else(|| {
                        ConfigError::UnknownGenerator {
                            field: field.name.clone(),
                            generator: generated.generator.clone(),
                        }
                    })?;
                    let mut declared =
                        GeneratedField::new(generator).options(generated.options.clone());
                    if let Some(retries) = generated.retries {
                        declared = declared.retries(retries);
                    }
                    FieldKind::Generated(declared)
                }
            };
            builder = builder.declare(FieldDeclaration {
                name: field.name.clone(),
                kind,
            });
        }

        builder.build()
    }
}
