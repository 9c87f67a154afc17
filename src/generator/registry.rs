use super::{
    IdGenerator, SequenceGenerator, SharedGenerator, ShortIdGenerator, TimestampGenerator,
    UuidGenerator,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{Level, event};

/// Named generators, used to resolve declarative record-type config.
#[derive(Clone, Default)]
pub struct GeneratorRegistry {
    generators: HashMap<String, SharedGenerator>,
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `shortid`, `sequence`, `uuid` and `timestamp`.
    pub fn with_default_generators() -> Self {
        let mut registry = Self::new();
        registry.register_generator(ShortIdGenerator);
        registry.register_generator(SequenceGenerator::new());
        registry.register_generator(UuidGenerator);
        registry.register_generator(TimestampGenerator);
        registry
    }

    /// Registers `generator` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, generator: SharedGenerator) {
        let name = name.into();
        event!(Level::DEBUG, generator = %name, "registered id generator");
        self.generators.insert(name, generator);
    }

    /// Registers `generator` under its own [`IdGenerator::name`].
    pub fn register_generator<G: IdGenerator + 'static>(&mut self, generator: G) {
        let name = generator.name().to_string();
        self.register(name, Arc::new(generator));
    }

    pub fn get(&self, name: &str) -> Option<SharedGenerator> {
        self.generators.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.generators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
