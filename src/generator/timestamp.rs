use super::{GeneratorOptions, IdGenerator};
use crate::core::{GenerationError, Value};
use async_trait::async_trait;
use chrono::Utc;
use chrono::format::{Item, StrftimeItems};

pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S%3f";

/// Clock-derived identifiers. Options: `format` (strftime), `prefix`.
///
/// Two records created within the same clock tick collide; the save loop's
/// retries absorb that.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampGenerator;

#[async_trait]
impl IdGenerator for TimestampGenerator {
    fn name(&self) -> &str {
        "timestamp"
    }

    async fn generate(&self, options: &GeneratorOptions) -> Result<Value, GenerationError> {
        let format = options.get_str("format")?.unwrap_or(DEFAULT_TIMESTAMP_FORMAT);
        let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
        if items.iter().any(|item| matches!(item, Item::Error)) {
            return Err(GenerationError::InvalidOptions(format!(
                "invalid timestamp format '{}'",
                format
            )));
        }

        let stamp = Utc::now().format_with_items(items.into_iter()).to_string();
        let prefix = options.get_str("prefix")?.unwrap_or_default();
        Ok(Value::Text(format!("{prefix}{stamp}")))
    }
}
