use super::alphabet::{Alphabet, length_from_options};
use super::{GeneratorOptions, IdGenerator};
use crate::core::{GenerationError, Value};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

/// Deterministic identifiers: a shared counter rendered as a fixed-width
/// string over the alphabet.
///
/// With `len = 2` and `alphabet = "abc"` the sequence is `aa, ab, ac, ba, ...,
/// cc` and then wraps back to `aa`.
#[derive(Debug, Default)]
pub struct SequenceGenerator {
    counter: AtomicU64,
}

impl SequenceGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(start: u64) -> Self {
        Self {
            counter: AtomicU64::new(start),
        }
    }

    /// Number of identifiers handed out so far.
    pub fn issued(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }

    pub fn render(alphabet: &Alphabet, len: usize, n: u64) -> String {
        let base = alphabet.len() as u64;
        let mut n = match alphabet.capacity(len) {
            Some(capacity) => n % capacity,
            None => n,
        };

        let mut out = vec![alphabet.symbol(0); len];
        for slot in out.iter_mut().rev() {
            *slot = alphabet.symbol((n % base) as usize);
            n /= base;
        }
        out.into_iter().collect()
    }
}

#[async_trait]
impl IdGenerator for SequenceGenerator {
    fn name(&self) -> &str {
        "sequence"
    }

    async fn generate(&self, options: &GeneratorOptions) -> Result<Value, GenerationError> {
        let alphabet = Alphabet::from_options(options)?;
        let len = length_from_options(options)?;
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(Value::Text(Self::render(&alphabet, len, n)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_is_fixed_width() {
        let alphabet = Alphabet::new("abc").unwrap();
        assert_eq!(SequenceGenerator::render(&alphabet, 2, 0), "aa");
        assert_eq!(SequenceGenerator::render(&alphabet, 2, 1), "ab");
        assert_eq!(SequenceGenerator::render(&alphabet, 2, 3), "ba");
        assert_eq!(SequenceGenerator::render(&alphabet, 2, 8), "cc");
    }

    #[test]
    fn test_render_wraps_after_capacity() {
        let alphabet = Alphabet::new("abc").unwrap();
        assert_eq!(SequenceGenerator::render(&alphabet, 2, 9), "aa");
    }

    #[tokio::test]
    async fn test_counter_advances() {
        let generator = SequenceGenerator::starting_at(2);
        let options = GeneratorOptions::new().with("len", 3).with("base", 10);
        assert_eq!(generator.generate(&options).await.unwrap(), Value::from("002"));
        assert_eq!(generator.generate(&options).await.unwrap(), Value::from("003"));
        assert_eq!(generator.issued(), 4);
    }

    #[tokio::test]
    async fn test_huge_length_is_an_option_error() {
        let generator = SequenceGenerator::new();
        let err = generator
            .generate(&GeneratorOptions::new().with("len", u64::MAX))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::InvalidOptions(_)));
        assert_eq!(generator.issued(), 0);
    }
}
