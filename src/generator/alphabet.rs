use super::GeneratorOptions;
use crate::core::GenerationError;
use std::collections::HashSet;

/// URL-safe 64 symbol alphabet. Shorter `base` values take a prefix of it.
pub const DEFAULT_ALPHABET: &str =
    "0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_-";

pub const DEFAULT_LENGTH: usize = 7;

/// Longest identifier a generator will produce.
pub const MAX_LENGTH: usize = 64;

const SUPPORTED_BASES: [usize; 5] = [10, 16, 36, 62, 64];

/// Validated set of symbols identifiers are drawn from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<char>,
}

impl Alphabet {
    pub fn new(symbols: &str) -> Result<Self, GenerationError> {
        let symbols: Vec<char> = symbols.chars().collect();
        if symbols.is_empty() {
            return Err(GenerationError::InvalidOptions(
                "alphabet cannot be empty".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(symbols.len());
        if let Some(dup) = symbols.iter().find(|c| !seen.insert(**c)) {
            return Err(GenerationError::InvalidOptions(format!(
                "alphabet contains '{}' more than once",
                dup
            )));
        }

        Ok(Self { symbols })
    }

    pub fn from_base(base: usize) -> Result<Self, GenerationError> {
        if !SUPPORTED_BASES.contains(&base) {
            return Err(GenerationError::InvalidOptions(format!(
                "unsupported base {}, expected one of {:?}",
                base, SUPPORTED_BASES
            )));
        }
        Self::new(&DEFAULT_ALPHABET[..base])
    }

    /// Resolves `alphabet`, then `base`, then the default alphabet.
    pub fn from_options(options: &GeneratorOptions) -> Result<Self, GenerationError> {
        if let Some(symbols) = options.get_str("alphabet")? {
            return Self::new(symbols);
        }
        match options.get_usize("base")? {
            Some(base) => Self::from_base(base),
            None => Ok(Self::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbol(&self, index: usize) -> char {
        self.symbols[index % self.symbols.len()]
    }

    pub fn contains(&self, c: char) -> bool {
        self.symbols.contains(&c)
    }

    /// Number of distinct identifiers of `len` symbols, `None` on overflow.
    pub fn capacity(&self, len: usize) -> Option<u64> {
        let exp = u32::try_from(len).ok()?;
        (self.symbols.len() as u64).checked_pow(exp)
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_ALPHABET.chars().collect(),
        }
    }
}

/// Reads the `len` option, defaulting to [`DEFAULT_LENGTH`]. Must lie in
/// `1..=MAX_LENGTH`.
pub fn length_from_options(options: &GeneratorOptions) -> Result<usize, GenerationError> {
    let len = options.get_usize("len")?.unwrap_or(DEFAULT_LENGTH);
    if !(1..=MAX_LENGTH).contains(&len) {
        return Err(GenerationError::InvalidOptions(format!(
            "len must be between 1 and {}, got {}",
            MAX_LENGTH, len
        )));
    }
    Ok(len)
}
