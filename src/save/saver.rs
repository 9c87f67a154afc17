use super::assign::assign;
use super::attribution::AttributionMode;
use super::budget::RetryBudget;
use crate::core::{Record, SaveError, WriteError};
use crate::policy::FieldPolicyTable;
use crate::storage::RecordWriter;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Instrument, Level, event, info_span};

/// Knobs for the save loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveOptions {
    pub attribution: AttributionMode,
    /// Upper bound for a single underlying write. A timed-out write ends the
    /// save with [`WriteError::TimedOut`].
    pub write_timeout: Option<Duration>,
}

impl SaveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribution(mut self, mode: AttributionMode) -> Self {
        self.attribution = mode;
        self
    }

    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = Some(timeout);
        self
    }
}

/// Successful result of one save invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    /// Underlying writes performed, including the successful one.
    pub attempts: u32,
    /// Fields holding generated values, in table order.
    pub generated: Vec<String>,
}

/// State of one save invocation. Dropped when the invocation returns.
struct SaveSession<'t> {
    table: &'t FieldPolicyTable,
    budget: RetryBudget,
    generated: Vec<String>,
    attempts: u32,
}

impl<'t> SaveSession<'t> {
    fn new(table: &'t FieldPolicyTable) -> Self {
        Self {
            table,
            budget: RetryBudget::from_table(table),
            generated: Vec::new(),
            attempts: 0,
        }
    }

    fn record_assigned(&mut self, fields: Vec<String>) {
        for field in fields {
            if !self.generated.contains(&field) {
                self.generated.push(field);
            }
        }
    }

    fn generated_in_table_order(&self) -> Vec<String> {
        self.table
            .fields()
            .iter()
            .map(|field| field.name())
            .filter(|name| self.generated.iter().any(|g| g == name))
            .map(str::to_string)
            .collect()
    }

    /// Decides what a failed write means: the fields to regenerate, or the
    /// terminal error.
    fn on_write_failure(
        &mut self,
        err: WriteError,
        mode: AttributionMode,
    ) -> Result<Vec<String>, SaveError> {
        let candidates = self.generated_in_table_order();
        let implicated = match err.unique_conflict() {
            Some(conflict) => mode.implicated(&conflict, candidates.iter().map(String::as_str)),
            None => Vec::new(),
        };
        if implicated.is_empty() {
            event!(Level::DEBUG, error = %err, "write failed, not retryable");
            return Err(SaveError::Write(err));
        }

        let retrying: Vec<String> = implicated
            .iter()
            .filter(|field| self.budget.try_consume(field))
            .cloned()
            .collect();
        if retrying.is_empty() {
            event!(
                Level::DEBUG,
                fields = ?implicated,
                error = %err,
                "uniqueness conflict with no retries left"
            );
            return Err(SaveError::UniquenessConflict {
                fields: implicated,
                source: err,
            });
        }

        for field in &retrying {
            event!(
                Level::WARN,
                field = %field,
                attempt = self.attempts,
                retries_left = self.budget.remaining(field),
                error = %err,
                "uniqueness conflict on generated field, regenerating"
            );
        }
        Ok(retrying)
    }

    fn outcome(&self) -> SaveOutcome {
        SaveOutcome {
            attempts: self.attempts,
            generated: self.generated_in_table_order(),
        }
    }
}

async fn write_once<R, W>(
    record: &mut R,
    writer: &W,
    timeout: Option<Duration>,
) -> Result<(), WriteError>
where
    R: Record,
    W: RecordWriter<R> + ?Sized,
{
    match timeout {
        None => writer.write(record).await,
        Some(limit) => tokio::time::timeout(limit, writer.write(record))
            .await
            .unwrap_or(Err(WriteError::TimedOut(limit))),
    }
}

/// Saves `record` through `writer`, assigning generated identifiers to new
/// records and regenerating them on attributable uniqueness conflicts.
///
/// Records that are not new, or that have no unset generated field, are
/// written once without any assignment or retry.
pub async fn save<R, W>(
    record: &mut R,
    table: &FieldPolicyTable,
    writer: &W,
    options: &SaveOptions,
) -> Result<SaveOutcome, SaveError>
where
    R: Record,
    W: RecordWriter<R> + ?Sized,
{
    let span = info_span!("shortkey.save", record_type = %table.record_type());
    run_save(record, table, writer, options).instrument(span).await
}

async fn run_save<R, W>(
    record: &mut R,
    table: &FieldPolicyTable,
    writer: &W,
    options: &SaveOptions,
) -> Result<SaveOutcome, SaveError>
where
    R: Record,
    W: RecordWriter<R> + ?Sized,
{
    let needs_assignment = record.is_new()
        && table
            .fields()
            .iter()
            .any(|field| record.is_field_absent(field.name()));
    if !needs_assignment {
        event!(Level::DEBUG, "no generated fields to assign, writing through");
        write_once(record, writer, options.write_timeout).await?;
        return Ok(SaveOutcome {
            attempts: 1,
            generated: Vec::new(),
        });
    }

    let mut session = SaveSession::new(table);
    loop {
        let assigned = assign(record, table).await?;
        session.record_assigned(assigned);
        session.attempts += 1;

        match write_once(record, writer, options.write_timeout).await {
            Ok(()) => {
                event!(Level::DEBUG, attempts = session.attempts, "record saved");
                return Ok(session.outcome());
            }
            Err(err) => {
                for field in session.on_write_failure(err, options.attribution)? {
                    record.clear_field(&field);
                }
            }
        }
    }
}

/// Save decorator a host store routes new-record writes through.
pub struct ShortIdSaver<W> {
    writer: W,
    table: Arc<FieldPolicyTable>,
    options: SaveOptions,
}

impl<W> ShortIdSaver<W> {
    pub fn new(writer: W, table: impl Into<Arc<FieldPolicyTable>>) -> Self {
        Self {
            writer,
            table: table.into(),
            options: SaveOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SaveOptions) -> Self {
        self.options = options;
        self
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn table(&self) -> &Arc<FieldPolicyTable> {
        &self.table
    }

    pub fn options(&self) -> &SaveOptions {
        &self.options
    }

    pub async fn save<R>(&self, record: &mut R) -> Result<SaveOutcome, SaveError>
    where
        R: Record,
        W: RecordWriter<R>,
    {
        save(record, &self.table, &self.writer, &self.options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Document, Value};
    use crate::generator::{GeneratorOptions, SequenceGenerator};
    use crate::policy::GeneratedField;
    use crate::storage::MemoryCollection;

    fn sequence_table(retries: u32) -> FieldPolicyTable {
        FieldPolicyTable::builder("doc")
            .generated(
                "_id",
                GeneratedField::new(Arc::new(SequenceGenerator::new()))
                    .options(GeneratorOptions::new().with("len", 1).with("alphabet", "ab"))
                    .retries(retries),
            )
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_retry_skips_taken_identifier() {
        let collection = MemoryCollection::new("docs");
        collection
            .write(&mut Document::new().with("_id", "a"))
            .await
            .unwrap();

        let saver = ShortIdSaver::new(&collection, sequence_table(1));
        let mut doc = Document::new();
        let outcome = saver.save(&mut doc).await.unwrap();

        assert_eq!(outcome.attempts, 2);
        assert_eq!(outcome.generated, vec!["_id"]);
        assert_eq!(doc.get("_id"), Some(&Value::from("b")));
    }

    #[tokio::test]
    async fn test_exhausted_budget_reports_conflict() {
        let collection = MemoryCollection::new("docs");
        collection
            .write(&mut Document::new().with("_id", "a"))
            .await
            .unwrap();

        let saver = ShortIdSaver::new(&collection, sequence_table(0));
        let err = saver.save(&mut Document::new()).await.unwrap_err();
        assert!(err.is_uniqueness_conflict());
        assert_eq!(err.conflicting_fields(), ["_id".to_string()]);
    }

    #[tokio::test]
    async fn test_session_order_and_dedup() {
        let table = FieldPolicyTable::builder("doc")
            .generated("b", GeneratedField::new(Arc::new(SequenceGenerator::new())))
            .generated("a", GeneratedField::new(Arc::new(SequenceGenerator::new())))
            .build()
            .unwrap();
        let mut session = SaveSession::new(&table);
        session.record_assigned(vec!["a".into()]);
        session.record_assigned(vec!["b".into(), "a".into()]);
        assert_eq!(session.generated_in_table_order(), vec!["b", "a"]);
    }
}
