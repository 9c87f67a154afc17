use shortkey::{
    Document, FieldPolicyTable, GeneratedField, GeneratorOptions, MemoryCollection, SaveError,
    SequenceGenerator, SharedGenerator, ShortIdGenerator, ShortIdSaver, WriteError,
};
use std::collections::HashSet;
use std::sync::Arc;

fn doc_table(generator: SharedGenerator, options: GeneratorOptions, retries: u32) -> FieldPolicyTable {
    FieldPolicyTable::builder("doc")
        .generated(
            "_id",
            GeneratedField::new(generator).options(options).retries(retries),
        )
        .field("num")
        .build()
        .unwrap()
}

fn small_options() -> GeneratorOptions {
    GeneratorOptions::new().with("len", 2).with("alphabet", "abc")
}

#[tokio::test]
async fn test_default_ids_are_seven_url_safe_chars_and_distinct() {
    let saver = ShortIdSaver::new(
        MemoryCollection::new("defaultdocs"),
        doc_table(Arc::new(ShortIdGenerator), GeneratorOptions::new(), 4),
    );

    let mut ids = HashSet::new();
    for num in 0..1000i64 {
        let mut doc = Document::new().with("num", num);
        saver.save(&mut doc).await.unwrap();

        let id = doc.get("_id").and_then(|v| v.as_str()).unwrap().to_string();
        assert_eq!(id.len(), 7);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'));
        ids.insert(id);
    }

    assert_eq!(ids.len(), 1000);
    assert_eq!(saver.writer().len().await, 1000);
}

#[tokio::test]
async fn test_exhausted_space_without_retries_reports_every_duplicate() {
    let saver = ShortIdSaver::new(
        MemoryCollection::new("optionsdocs"),
        doc_table(Arc::new(SequenceGenerator::new()), small_options(), 0),
    );

    let mut ids = HashSet::new();
    let mut duplicates = 0;
    for num in 0..20i64 {
        let mut doc = Document::new().with("num", num);
        match saver.save(&mut doc).await {
            Ok(outcome) => {
                assert_eq!(outcome.attempts, 1);
                let id = doc.get("_id").and_then(|v| v.as_str()).unwrap().to_string();
                assert_eq!(id.len(), 2);
                assert!(id.chars().all(|c| "abc".contains(c)));
                ids.insert(id);
            }
            Err(err) => {
                assert!(err.is_uniqueness_conflict(), "unexpected error: {err}");
                assert!(matches!(
                    err.write_error(),
                    Some(WriteError::UniqueViolation { .. })
                ));
                duplicates += 1;
            }
        }
    }

    assert_eq!(ids.len(), 9);
    assert_eq!(duplicates, 11);
    assert_eq!(saver.writer().len().await, 9);
}

#[tokio::test]
async fn test_random_ids_over_small_space_never_mask_conflicts() {
    let saver = ShortIdSaver::new(
        MemoryCollection::new("optionsdocs"),
        doc_table(Arc::new(ShortIdGenerator), small_options(), 10),
    );

    let mut ids = HashSet::new();
    let mut duplicates = 0;
    for num in 0..20i64 {
        let mut doc = Document::new().with("num", num);
        match saver.save(&mut doc).await {
            Ok(_) => {
                let id = doc.get("_id").and_then(|v| v.as_str()).unwrap().to_string();
                assert!(id.len() == 2 && id.chars().all(|c| "abc".contains(c)));
                assert!(ids.insert(id));
            }
            Err(SaveError::UniquenessConflict { fields, .. }) => {
                assert_eq!(fields, vec!["_id"]);
                duplicates += 1;
            }
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert!(ids.len() <= 9);
    assert_eq!(ids.len() + duplicates, 20);
    assert!(duplicates >= 11);
}

#[tokio::test]
async fn test_sequence_with_retries_fills_the_space() {
    let saver = ShortIdSaver::new(
        MemoryCollection::new("optionsdocs"),
        doc_table(Arc::new(SequenceGenerator::new()), small_options(), 8),
    );

    let mut saved = 0;
    for num in 0..12i64 {
        if saver.save(&mut Document::new().with("num", num)).await.is_ok() {
            saved += 1;
        }
    }

    assert_eq!(saved, 9);
}
