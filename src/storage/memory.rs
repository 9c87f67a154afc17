use super::RecordWriter;
use crate::core::{Document, Record, Value, WriteError};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

type Fields = BTreeMap<String, Value>;

#[derive(Default)]
struct CollectionRows {
    /// Documents keyed by primary key value.
    documents: BTreeMap<Value, Fields>,
    /// One index per unique key, aligned with `MemoryCollection::unique_keys`.
    indexes: Vec<HashMap<Vec<Value>, Value>>,
}

/// In-memory document collection with unique keys.
///
/// The primary key (default `_id`) is always unique and must be set. Extra
/// unique keys may span several fields; a key with any `Null` component is
/// not checked, as with SQL `UNIQUE`.
pub struct MemoryCollection {
    name: String,
    unique_keys: Vec<Vec<String>>,
    required: Vec<String>,
    report_keys: bool,
    rows: RwLock<CollectionRows>,
}

impl MemoryCollection {
    pub fn new(name: impl Into<String>) -> Self {
        let rows = CollectionRows {
            documents: BTreeMap::new(),
            indexes: vec![HashMap::new()],
        };
        Self {
            name: name.into(),
            unique_keys: vec![vec!["_id".to_string()]],
            required: Vec::new(),
            report_keys: true,
            rows: RwLock::new(rows),
        }
    }

    /// Renames the primary key field. Call before the first write.
    pub fn primary_key(mut self, field: impl Into<String>) -> Self {
        self.unique_keys[0] = vec![field.into()];
        self
    }

    pub fn unique(self, field: impl Into<String>) -> Self {
        self.unique_compound([field.into()])
    }

    pub fn unique_compound<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unique_keys
            .push(fields.into_iter().map(Into::into).collect());
        self.rows.get_mut().indexes.push(HashMap::new());
        self
    }

    pub fn required(mut self, field: impl Into<String>) -> Self {
        self.required.push(field.into());
        self
    }

    /// When `false`, uniqueness failures carry only a message and no key
    /// names, like stores that report duplicates as plain text.
    pub fn report_keys(mut self, report: bool) -> Self {
        self.report_keys = report;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn primary_key_field(&self) -> &str {
        &self.unique_keys[0][0]
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.documents.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn get(&self, primary_key: &Value) -> Option<Document> {
        let rows = self.rows.read().await;
        rows.documents
            .get(primary_key)
            .map(|fields| Document::existing(fields.clone()))
    }

    pub async fn documents(&self) -> Vec<Document> {
        let rows = self.rows.read().await;
        rows.documents
            .values()
            .map(|fields| Document::existing(fields.clone()))
            .collect()
    }

    fn validate(&self, fields: &Fields) -> Result<Value, WriteError> {
        let pk_field = self.primary_key_field();
        let pk = match fields.get(pk_field) {
            Some(value) if !value.is_null() => value.clone(),
            _ => {
                return Err(WriteError::ConstraintViolation(format!(
                    "Column '{}' cannot be NULL",
                    pk_field
                )));
            }
        };

        for field in &self.required {
            if fields.get(field).is_none_or(Value::is_null) {
                return Err(WriteError::Validation(format!(
                    "Field '{}' is required in collection '{}'",
                    field, self.name
                )));
            }
        }

        Ok(pk)
    }

    fn key_values(key: &[String], fields: &Fields) -> Option<Vec<Value>> {
        let values: Vec<Value> = key
            .iter()
            .map(|column| fields.get(column).cloned().unwrap_or(Value::Null))
            .collect();
        if values.iter().any(Value::is_null) {
            return None;
        }
        Some(values)
    }

    fn check_uniqueness(
        &self,
        rows: &CollectionRows,
        fields: &Fields,
        ignore: Option<&Value>,
    ) -> Result<(), WriteError> {
        for (key, index) in self.unique_keys.iter().zip(&rows.indexes) {
            let Some(values) = Self::key_values(key, fields) else {
                continue;
            };
            if let Some(owner) = index.get(&values)
                && Some(owner) != ignore
            {
                return Err(self.conflict(key, &values));
            }
        }
        Ok(())
    }

    fn conflict(&self, key: &[String], values: &[Value]) -> WriteError {
        let message = if let ([column], [value]) = (key, values) {
            format!(
                "Unique constraint violation: Column '{}' already contains value {}",
                column, value
            )
        } else {
            let columns: Vec<String> = key.iter().map(|c| format!("'{}'", c)).collect();
            let values: Vec<String> = values.iter().map(ToString::to_string).collect();
            format!(
                "Unique constraint violation: Columns ({}) already contain values ({})",
                columns.join(", "),
                values.join(", ")
            )
        };

        if self.report_keys {
            WriteError::UniqueViolation {
                keys: key.to_vec(),
                message,
            }
        } else {
            WriteError::ConstraintViolation(message)
        }
    }

    fn index_insert(&self, rows: &mut CollectionRows, pk: &Value, fields: &Fields) {
        for (key, index) in self.unique_keys.iter().zip(rows.indexes.iter_mut()) {
            if let Some(values) = Self::key_values(key, fields) {
                index.insert(values, pk.clone());
            }
        }
    }

    fn index_remove(&self, rows: &mut CollectionRows, fields: &Fields) {
        for (key, index) in self.unique_keys.iter().zip(rows.indexes.iter_mut()) {
            if let Some(values) = Self::key_values(key, fields) {
                index.remove(&values);
            }
        }
    }
}

#[async_trait]
impl RecordWriter<Document> for MemoryCollection {
    async fn write(&self, record: &mut Document) -> Result<(), WriteError> {
        let fields = record.fields().clone();
        let pk = self.validate(&fields)?;
        let mut rows = self.rows.write().await;

        if record.is_new() {
            self.check_uniqueness(&rows, &fields, None)?;
            self.index_insert(&mut rows, &pk, &fields);
            rows.documents.insert(pk, fields);
            record.mark_persisted();
            return Ok(());
        }

        let Some(previous) = rows.documents.get(&pk).cloned() else {
            return Err(WriteError::NotFound(format!(
                "{} = {} in collection '{}'",
                self.primary_key_field(),
                pk,
                self.name
            )));
        };
        self.check_uniqueness(&rows, &fields, Some(&pk))?;
        self.index_remove(&mut rows, &previous);
        self.index_insert(&mut rows, &pk, &fields);
        rows.documents.insert(pk, fields);
        Ok(())
    }
}
