pub mod error;
pub mod record;
pub mod value;

pub use error::{ConfigError, GenerationError, Result, SaveError, UniqueConflict, WriteError};
pub use record::{Document, Record};
pub use value::Value;
