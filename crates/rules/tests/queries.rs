//! Integration tests that verify every rule document shipped in `queries/`
//! passes validation and deserializes into a [`RuleDocument`].

use hunt_rules::{validate_document, RuleDocument, RuleLevel, RuleLoader};

/// Integration tests run from the crate directory, so go up two levels.
fn queries_dir() -> std::path::PathBuf {
    let manifest = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest.join("../../queries")
}

#[test]
fn all_shipped_queries_are_valid() {
    let loader = RuleLoader::new(queries_dir());
    let files = loader.discover().expect("discover queries");
    assert!(files.len() >= 3, "expected shipped queries, found {}", files.len());

    for path in files {
        let value = RuleLoader::read_value(&path).expect("read query");
        let result = validate_document(&value);
        assert!(
            result.valid,
            "{} failed validation: {:?}",
            path.display(),
            result.messages()
        );
        assert!(result.warnings.is_empty(), "{}: {:?}", path.display(), result.warnings);

        let doc = RuleDocument::from_value(value).expect("deserialize query");
        assert!(!doc.kql.trim().is_empty());
    }
}

#[test]
fn process_chain_has_empty_lists() {
    let path = queries_dir().join("endpoint/process_chain.yaml");
    let doc = RuleDocument::from_value(RuleLoader::read_value(&path).unwrap()).unwrap();
    assert!(doc.references.is_empty());
    assert!(doc.falsepositives.is_empty());
    assert_eq!(doc.level, RuleLevel::Medium);
}
