//! Field Policy Table: which fields of a record type receive generated
//! identifiers, and how.

pub mod config;

use crate::core::{ConfigError, GenerationError, Value};
use crate::generator::{GeneratorOptions, SharedGenerator};
use std::collections::HashSet;
use std::fmt;

pub use config::{FieldConfig, GeneratedFieldConfig, RecordTypeConfig};

/// Retry budget for generated fields that do not set one.
pub const DEFAULT_RETRIES: u32 = 4;

/// Generator binding for one field, as declared at registration.
#[derive(Clone)]
pub struct GeneratedField {
    generator: SharedGenerator,
    options: GeneratorOptions,
    retries: Option<u32>,
}

impl GeneratedField {
    pub fn new(generator: SharedGenerator) -> Self {
        Self {
            generator,
            options: GeneratorOptions::new(),
            retries: None,
        }
    }

    pub fn options(mut self, options: GeneratorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }
}

/// Registration tag for a declared field.
#[derive(Clone)]
pub enum FieldKind {
    Plain,
    Generated(GeneratedField),
}

#[derive(Clone)]
pub struct FieldDeclaration {
    pub name: String,
    pub kind: FieldKind,
}

/// One generated field of a [`FieldPolicyTable`].
#[derive(Clone)]
pub struct FieldPolicy {
    name: String,
    generator: SharedGenerator,
    options: GeneratorOptions,
    retries: u32,
}

impl FieldPolicy {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn generator(&self) -> &SharedGenerator {
        &self.generator
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub async fn generate(&self) -> Result<Value, GenerationError> {
        self.generator.generate(&self.options).await
    }
}

impl fmt::Debug for FieldPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldPolicy")
            .field("name", &self.name)
            .field("generator", &self.generator.name())
            .field("options", &self.options)
            .field("retries", &self.retries)
            .finish()
    }
}

/// Immutable, declaration-ordered generated fields of one record type.
#[derive(Debug, Clone)]
pub struct FieldPolicyTable {
    record_type: String,
    fields: Vec<FieldPolicy>,
}

impl FieldPolicyTable {
    pub fn builder(record_type: impl Into<String>) -> RecordTypeBuilder {
        RecordTypeBuilder::new(record_type)
    }

    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    pub fn fields(&self) -> &[FieldPolicy] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldPolicy> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Collects field declarations for a record type and freezes them into a
/// [`FieldPolicyTable`].
pub struct RecordTypeBuilder {
    record_type: String,
    declarations: Vec<FieldDeclaration>,
    default_retries: u32,
}

impl RecordTypeBuilder {
    pub fn new(record_type: impl Into<String>) -> Self {
        Self {
            record_type: record_type.into(),
            declarations: Vec::new(),
            default_retries: DEFAULT_RETRIES,
        }
    }

    pub fn field(self, name: impl Into<String>) -> Self {
        self.declare(FieldDeclaration {
            name: name.into(),
            kind: FieldKind::Plain,
        })
    }

    pub fn generated(self, name: impl Into<String>, field: GeneratedField) -> Self {
        self.declare(FieldDeclaration {
            name: name.into(),
            kind: FieldKind::Generated(field),
        })
    }

    pub fn declare(mut self, declaration: FieldDeclaration) -> Self {
        self.declarations.push(declaration);
        self
    }

    pub fn default_retries(mut self, retries: u32) -> Self {
        self.default_retries = retries;
        self
    }

    pub fn build(self) -> Result<FieldPolicyTable, ConfigError> {
        let mut seen = HashSet::with_capacity(self.declarations.len());
        let mut fields = Vec::new();

        for declaration in self.declarations {
            if declaration.name.is_empty() {
                return Err(ConfigError::EmptyFieldName);
            }
            if !seen.insert(declaration.name.clone()) {
                return Err(ConfigError::DuplicateField(declaration.name));
            }

            if let FieldKind::Generated(generated) = declaration.kind {
                fields.push(FieldPolicy {
                    name: declaration.name,
                    generator: generated.generator,
                    options: generated.options,
                    retries: generated.retries.unwrap_or(self.default_retries),
                });
            }
        }

        Ok(FieldPolicyTable {
            record_type: self.record_type,
            fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{SequenceGenerator, ShortIdGenerator};
    use std::sync::Arc;

    #[test]
    fn test_only_generated_fields_enter_table() {
        let table = FieldPolicyTable::builder("order")
            .generated("_id", GeneratedField::new(Arc::new(ShortIdGenerator)))
            .field("num")
            .generated(
                "ref",
                GeneratedField::new(Arc::new(SequenceGenerator::new())).retries(0),
            )
            .build()
            .unwrap();

        let names: Vec<&str> = table.fields().iter().map(FieldPolicy::name).collect();
        assert_eq!(names, vec!["_id", "ref"]);
        assert_eq!(table.get("_id").unwrap().retries(), DEFAULT_RETRIES);
        assert_eq!(table.get("ref").unwrap().retries(), 0);
        assert!(table.get("num").is_none());
    }

    #[test]
    fn test_default_retries_override() {
        let table = FieldPolicyTable::builder("doc")
            .default_retries(10)
            .generated("_id", GeneratedField::new(Arc::new(ShortIdGenerator)))
            .build()
            .unwrap();
        assert_eq!(table.get("_id").unwrap().retries(), 10);
    }

    #[test]
    fn test_rejects_duplicate_and_empty_names() {
        let dup = FieldPolicyTable::builder("doc")
            .field("_id")
            .generated("_id", GeneratedField::new(Arc::new(ShortIdGenerator)))
            .build();
        assert!(matches!(dup, Err(ConfigError::DuplicateField(name)) if name == "_id"));

        let empty = FieldPolicyTable::builder("doc").field("").build();
        assert!(matches!(empty, Err(ConfigError::EmptyFieldName)));
    }

    #[test]
    fn test_table_without_generated_fields_is_empty() {
        let table = FieldPolicyTable::builder("plain").field("a").build().unwrap();
        assert!(table.is_empty());
        assert_eq!(table.record_type(), "plain");
    }
}
