use super::*;
use std::io::Write;

#[test]
fn missing_file_yields_defaults() {
    let config = MeshConfig::load(Path::new("/nonexistent/mesh.toml")).unwrap();
    assert_eq!(config, MeshConfig::default());
}

#[test]
fn partial_file_fills_remaining_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "dedupe_ttl = \"90s\"").unwrap();

    let config = MeshConfig::load(file.path()).unwrap();
    assert_eq!(config.dedupe_ttl, Duration::from_secs(90));
    assert_eq!(config.subscriber_capacity, DEFAULT_SUBSCRIBER_CAPACITY);
    assert!(config.store_path.is_none());
}

#[test]
fn full_file_parses() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
dedupe_ttl = "2m"
subscriber_capacity = 64
redact_terms = ["ssn"]
store_path = "/var/lib/mesh/events.json"
"#
    )
    .unwrap();

    let config = MeshConfig::load(file.path()).unwrap();
    assert_eq!(config.dedupe_ttl, Duration::from_secs(120));
    assert_eq!(config.subscriber_capacity, 64);
    assert_eq!(config.redact_terms, vec!["ssn".to_string()]);
    assert_eq!(
        config.store_path,
        Some(PathBuf::from("/var/lib/mesh/events.json"))
    );
}

#[test]
fn malformed_file_is_a_parse_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "dedupe_ttl = [1, 2]").unwrap();

    assert!(matches!(
        MeshConfig::load(file.path()),
        Err(ConfigError::Parse(_))
    ));
}
