use std::io::Write;

use tableq::prelude::*;
use tableq_test::{people, person_schema, TableRequest};

#[test]
fn test_prelude_runs_a_request() {
    let params = TableRequest::people().search("*|Cr").build();
    let result = Parser::new(&params, person_schema(), people())
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(result.filtered_count, 1);
}

#[test]
fn test_options_from_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "tableq:\n  starts_with_token: \"^\"\n  ends_with_token: \"$\"\n  default_take: 2").unwrap();
    let options = ParserOptions::load(file.path()).unwrap();

    let params = TableRequest::people().without("length").search("^t").build();
    let result = Parser::with_options(&params, person_schema(), people(), options)
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(result.filtered_count, 2);
    assert_eq!(result.page.len(), 2);
}

#[test]
fn test_missing_config_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let options = ParserOptions::load(dir.path().join("tableq.yaml")).unwrap();
    assert_eq!(options, ParserOptions::default());
}

#[test]
fn test_invalid_config_file_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "starts_with_token: \"|\"\nends_with_token: \"|\"").unwrap();
    let err = ParserOptions::load(file.path()).unwrap_err();
    assert!(matches!(err, TableError::Config(_)));
}
