use super::{GeneratorOptions, IdGenerator};
use crate::core::{GenerationError, Value};
use async_trait::async_trait;
use uuid::Uuid;

/// Random v4 UUIDs. Option `format`: `hyphenated` (default) or `simple`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

#[async_trait]
impl IdGenerator for UuidGenerator {
    fn name(&self) -> &str {
        "uuid"
    }

    async fn generate(&self, options: &GeneratorOptions) -> Result<Value, GenerationError> {
        let id = Uuid::new_v4();
        let text = match options.get_str("format")? {
            None | Some("hyphenated") => id.hyphenated().to_string(),
            Some("simple") => id.simple().to_string(),
            Some(other) => {
                return Err(GenerationError::InvalidOptions(format!(
                    "unknown uuid format '{}'",
                    other
                )));
            }
        };
        Ok(Value::Text(text))
    }
}
