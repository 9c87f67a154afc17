use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shortkey::{
    Document, FieldPolicyTable, GeneratedField, GeneratorOptions, GeneratorRegistry,
    MemoryCollection, RecordTypeConfig, SaveError, SequenceGenerator, ShortIdGenerator,
    SharedGenerator, ShortIdSaver,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shortkey")]
#[command(about = "Generate short identifiers and exercise the conflict-retry save loop")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print identifiers from a registered generator
    Generate {
        #[arg(long, default_value = "shortid")]
        generator: String,
        #[arg(long)]
        len: Option<usize>,
        #[arg(long)]
        alphabet: Option<String>,
        #[arg(long, default_value_t = 1)]
        count: usize,
    },
    /// Load a record-type config and print its generated fields
    CheckConfig { path: PathBuf },
    /// Save new documents into an in-memory collection and tally the results
    Simulate {
        #[arg(long, default_value_t = 2)]
        len: usize,
        #[arg(long, default_value = "abc")]
        alphabet: String,
        #[arg(long, default_value_t = 0)]
        retries: u32,
        #[arg(long, default_value_t = 20)]
        inserts: usize,
        /// Enumerate identifiers in order instead of drawing them at random
        #[arg(long)]
        sequential: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Generate {
            generator,
            len,
            alphabet,
            count,
        } => generate(&generator, len, alphabet, count).await,
        Command::CheckConfig { path } => check_config(&path),
        Command::Simulate {
            len,
            alphabet,
            retries,
            inserts,
            sequential,
        } => simulate(len, &alphabet, retries, inserts, sequential).await,
    }
}

fn options_from_args(len: Option<usize>, alphabet: Option<String>) -> GeneratorOptions {
    let mut options = GeneratorOptions::new();
    if let Some(len) = len {
        options = options.with("len", len);
    }
    if let Some(alphabet) = alphabet {
        options = options.with("alphabet", alphabet);
    }
    options
}

async fn generate(
    name: &str,
    len: Option<usize>,
    alphabet: Option<String>,
    count: usize,
) -> Result<()> {
    let registry = GeneratorRegistry::with_default_generators();
    let generator = registry.get(name).with_context(|| {
        format!(
            "unknown generator '{}', available: {}",
            name,
            registry.names().join(", ")
        )
    })?;

    let options = options_from_args(len, alphabet);
    for _ in 0..count {
        let id = generator
            .generate(&options)
            .await
            .with_context(|| format!("generator '{}' failed", name))?;
        println!("{}", id);
    }
    Ok(())
}

fn check_config(path: &Path) -> Result<()> {
    let config = RecordTypeConfig::from_path(path)
        .with_context(|| format!("failed to load '{}'", path.display()))?;
    let table = config.build(&GeneratorRegistry::with_default_generators())?;

    println!("record type: {}", table.record_type());
    if table.is_empty() {
        println!("  (no generated fields)");
    }
    for field in table.fields() {
        println!(
            "  {} <- {} retries={} options={}",
            field.name(),
            field.generator().name(),
            field.retries(),
            serde_json::to_string(field.options())?
        );
    }
    Ok(())
}

async fn simulate(
    len: usize,
    alphabet: &str,
    retries: u32,
    inserts: usize,
    sequential: bool,
) -> Result<()> {
    let generator: SharedGenerator = if sequential {
        Arc::new(SequenceGenerator::new())
    } else {
        Arc::new(ShortIdGenerator)
    };
    let options = options_from_args(Some(len), Some(alphabet.to_string()));
    let table = FieldPolicyTable::builder("simulated")
        .generated(
            "_id",
            GeneratedField::new(generator).options(options).retries(retries),
        )
        .field("num")
        .build()?;

    let saver = ShortIdSaver::new(MemoryCollection::new("simulated"), table);
    let mut saved = 0usize;
    let mut conflicts = 0usize;
    let mut attempts = 0u32;

    for num in 0..inserts {
        let mut doc = Document::new().with("num", num as i64);
        match saver.save(&mut doc).await {
            Ok(outcome) => {
                saved += 1;
                attempts += outcome.attempts;
            }
            Err(SaveError::UniquenessConflict { .. }) => conflicts += 1,
            Err(other) => return Err(other.into()),
        }
    }

    println!("alphabet: {} len: {} retries: {}", alphabet, len, retries);
    println!("saved: {}", saved);
    println!("conflicts: {}", conflicts);
    println!("write attempts for saved records: {}", attempts);
    println!("stored: {}", saver.writer().len().await);
    Ok(())
}
