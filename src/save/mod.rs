//! Identifier assignment and the retry-on-conflict save loop.

pub mod assign;
pub mod attribution;
pub mod budget;
pub mod saver;

pub use assign::assign;
pub use attribution::AttributionMode;
pub use budget::RetryBudget;
pub use saver::{SaveOptions, SaveOutcome, ShortIdSaver, save};
