use super::Value;
use std::collections::BTreeMap;

/// A record the save loop can assign identifiers to.
///
/// Implementors expose their fields by name. A field is considered unset when
/// it is missing or holds [`Value::Null`].
pub trait Record: Send {
    /// Returns `true` while the record has never been persisted.
    fn is_new(&self) -> bool;

    fn field(&self, name: &str) -> Option<&Value>;

    fn set_field(&mut self, name: &str, value: Value);

    fn clear_field(&mut self, name: &str);

    fn is_field_absent(&self, name: &str) -> bool {
        self.field(name).is_none_or(Value::is_null)
    }
}

/// Field-map record used by the in-memory collection and the CLI.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    fields: BTreeMap<String, Value>,
    persisted: bool,
}

impl Document {
    /// Creates an empty, not yet persisted document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a document that already exists in the store.
    pub fn existing(fields: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
            persisted: true,
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    pub fn mark_persisted(&mut self) {
        self.persisted = true;
    }

    pub fn is_persisted(&self) -> bool {
        self.persisted
    }
}

impl Record for Document {
    fn is_new(&self) -> bool {
        !self.persisted
    }

    fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    fn set_field(&mut self, name: &str, value: Value) {
        self.fields.insert(name.to_string(), value);
    }

    fn clear_field(&mut self, name: &str) {
        self.fields.remove(name);
    }
}
