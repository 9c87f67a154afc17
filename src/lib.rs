// ============================================================================
// shortkey Library
// ============================================================================

//! Short, human-friendly generated identifiers for new records, with
//! transparent retries when a generated value collides with an existing
//! unique key.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use shortkey::{Document, FieldPolicyTable, GeneratedField, MemoryCollection, ShortIdGenerator, ShortIdSaver};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let table = FieldPolicyTable::builder("doc")
//!     .generated("_id", GeneratedField::new(Arc::new(ShortIdGenerator)))
//!     .field("num")
//!     .build()?;
//!
//! let saver = ShortIdSaver::new(MemoryCollection::new("docs"), table);
//! let mut doc = Document::new().with("num", 1i64);
//! saver.save(&mut doc).await?;
//!
//! assert_eq!(doc.get("_id").and_then(|id| id.as_str()).map(str::len), Some(7));
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod generator;
pub mod policy;
pub mod save;
pub mod storage;

pub use crate::core::{
    ConfigError, Document, GenerationError, Record, Result, SaveError, UniqueConflict, Value,
    WriteError,
};
pub use generator::{
    Alphabet, GeneratorOptions, GeneratorRegistry, IdGenerator, SequenceGenerator,
    SharedGenerator, ShortIdGenerator, TimestampGenerator, UuidGenerator, generator_fn,
};
pub use policy::{
    DEFAULT_RETRIES, FieldKind, FieldPolicy, FieldPolicyTable, GeneratedField, RecordTypeBuilder,
    RecordTypeConfig,
};
pub use save::{AttributionMode, SaveOptions, SaveOutcome, ShortIdSaver, assign, save};
pub use storage::{MemoryCollection, RecordWriter};
