use super::alphabet::{Alphabet, length_from_options};
use super::{GeneratorOptions, IdGenerator};
use crate::core::{GenerationError, Value};
use async_trait::async_trait;
use rand::Rng;

/// Random short identifiers, seven URL-safe symbols by default.
///
/// Options: `len`, `alphabet`, `base`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortIdGenerator;

impl ShortIdGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn draw(alphabet: &Alphabet, len: usize) -> String {
        let mut rng = rand::thread_rng();
        (0..len)
            .map(|_| alphabet.symbol(rng.gen_range(0..alphabet.len())))
            .collect()
    }
}

#[async_trait]
impl IdGenerator for ShortIdGenerator {
    fn name(&self) -> &str {
        "shortid"
    }

    async fn generate(&self, options: &GeneratorOptions) -> Result<Value, GenerationError> {
        let alphabet = Alphabet::from_options(options)?;
        let len = length_from_options(options)?;
        Ok(Value::Text(Self::draw(&alphabet, len)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_shape() {
        let value = ShortIdGenerator
            .generate(&GeneratorOptions::new())
            .await
            .unwrap();
        let id = value.as_str().unwrap();
        assert_eq!(id.chars().count(), 7);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'));
    }

    #[tokio::test]
    async fn test_respects_len_and_alphabet() {
        let options = GeneratorOptions::new().with("len", 2).with("alphabet", "abc");
        for _ in 0..50 {
            let value = ShortIdGenerator.generate(&options).await.unwrap();
            let id = value.as_str().unwrap();
            assert_eq!(id.len(), 2);
            assert!(id.chars().all(|c| "abc".contains(c)));
        }
    }

    #[tokio::test]
    async fn test_invalid_options_fail() {
        let options = GeneratorOptions::new().with("alphabet", "");
        let err = ShortIdGenerator.generate(&options).await.unwrap_err();
        assert!(matches!(err, GenerationError::InvalidOptions(_)));
    }
}
