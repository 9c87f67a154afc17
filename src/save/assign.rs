use crate::core::{GenerationError, Record, SaveError};
use crate::policy::{FieldPolicy, FieldPolicyTable};
use futures::future::join_all;

/// Fills every unset generated field of a new record.
///
/// All selected generators run concurrently and are awaited together. The
/// record is only touched once every generator succeeded; on the first
/// failure (in table order) nothing is applied. Returns the names of the
/// fields that received a value.
pub async fn assign<R: Record>(
    record: &mut R,
    table: &FieldPolicyTable,
) -> Result<Vec<String>, SaveError> {
    if !record.is_new() {
        return Ok(Vec::new());
    }

    let selected: Vec<&FieldPolicy> = table
        .fields()
        .iter()
        .filter(|field| record.is_field_absent(field.name()))
        .collect();
    if selected.is_empty() {
        return Ok(Vec::new());
    }

    let results = join_all(selected.iter().map(|field| field.generate())).await;

    let mut values = Vec::with_capacity(selected.len());
    for (field, result) in selected.iter().zip(results) {
        let value = result.and_then(|value| {
            if value.is_null() {
                Err(GenerationError::EmptyIdentifier)
            } else {
                Ok(value)
            }
        });
        match value {
            Ok(value) => values.push((field.name(), value)),
            Err(source) => {
                return Err(SaveError::Generation {
                    field: field.name().to_string(),
                    source,
                });
            }
        }
    }

    let mut assigned = Vec::with_capacity(values.len());
    for (name, value) in values {
        record.set_field(name, value);
        assigned.push(name.to_string());
    }
    Ok(assigned)
}
