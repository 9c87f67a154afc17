//! Identifier generator plugins.
//!
//! A generator turns an options bag into one identifier value. Generators may
//! complete asynchronously and may fail; a failure aborts the current save.

pub mod alphabet;
pub mod registry;
pub mod sequence;
pub mod shortid;
pub mod timestamp;
pub mod uuid_v4;

use crate::core::{GenerationError, Value};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

pub use alphabet::{Alphabet, DEFAULT_ALPHABET, DEFAULT_LENGTH, MAX_LENGTH};
pub use registry::GeneratorRegistry;
pub use sequence::SequenceGenerator;
pub use shortid::ShortIdGenerator;
pub use timestamp::TimestampGenerator;
pub use uuid_v4::UuidGenerator;

/// Produces one identifier per call.
#[async_trait]
pub trait IdGenerator: Send + Sync {
    /// Name used in logs and registries.
    fn name(&self) -> &str;

    async fn generate(&self, options: &GeneratorOptions) -> Result<Value, GenerationError>;
}

pub type SharedGenerator = Arc<dyn IdGenerator>;

/// Opaque per-field generator configuration (`len`, `alphabet`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeneratorOptions(Map<String, JsonValue>);

impl GeneratorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    pub fn get_usize(&self, key: &str) -> Result<Option<usize>, GenerationError> {
        match self.0.get(key) {
            None | Some(JsonValue::Null) => Ok(None),
            Some(value) => value
                .as_u64()
                .and_then(|v| usize::try_from(v).ok())
                .map(Some)
                .ok_or_else(|| {
                    GenerationError::InvalidOptions(format!(
                        "option '{}' must be a non-negative integer, got {}",
                        key, value
                    ))
                }),
        }
    }

    pub fn get_str(&self, key: &str) -> Result<Option<&str>, GenerationError> {
        match self.0.get(key) {
            None | Some(JsonValue::Null) => Ok(None),
            Some(JsonValue::String(s)) => Ok(Some(s)),
            Some(other) => Err(GenerationError::InvalidOptions(format!(
                "option '{}' must be a string, got {}",
                key, other
            ))),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, JsonValue>> for GeneratorOptions {
    fn from(map: Map<String, JsonValue>) -> Self {
        Self(map)
    }
}

/// Generator backed by an async closure.
pub struct FnGenerator<F> {
    name: String,
    f: F,
}

impl<F> FnGenerator<F> {
    pub fn named(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> fmt::Debug for FnGenerator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnGenerator")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Wraps `f` as an [`IdGenerator`] named `"fn"`.
pub fn generator_fn<F, Fut>(f: F) -> FnGenerator<F>
where
    F: Fn(GeneratorOptions) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, GenerationError>> + Send,
{
    FnGenerator::named("fn", f)
}

#[async_trait]
impl<F, Fut> IdGenerator for FnGenerator<F>
where
    F: Fn(GeneratorOptions) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, GenerationError>> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, options: &GeneratorOptions) -> Result<Value, GenerationError> {
        (self.f)(options.clone()).await
    }
}
