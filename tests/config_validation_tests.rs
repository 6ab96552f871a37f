//! Config Validation Tests
//!
//! Typo detection on unknown keys, value checks, and the file loading path.
//! These run against the config layer alone, without classifying anything.

use eds_mineral::config::validation::{
    known_config_keys, suggest_correction, validate_ranges, validate_unknown_keys,
};
use eds_mineral::config::{ClassifierConfig, ConfigError};
use eds_mineral::Scheme;

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_scheme_key_warns_with_suggestion() {
    let toml_str = r#"
[classifier]
shceme = "panta"
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert!(warnings[0].field.contains("shceme"));
    assert_eq!(warnings[0].suggestion.as_deref(), Some("classifier.scheme"));
}

#[test]
fn typo_in_section_name_warns() {
    let toml_str = r#"
[outptu]
delimiter = ";"
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert!(warnings.iter().any(|w| w.field == "outptu"
        && w.suggestion.as_deref() == Some("output")));
}

#[test]
fn valid_config_produces_zero_warnings() {
    let toml_str = r#"
[classifier]
scheme = "donarummo"
parallel = true
parallel_min_rows = 512
report_degenerate_rows = false

[model]
path = "models/weber.json"

[output]
delimiter = "\t"
include_group = true
include_refractive_index = false
keep_input_columns = true
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert!(warnings.is_empty(), "Expected 0 warnings, got: {:?}", warnings);
}

#[test]
fn every_known_key_is_its_own_suggestion() {
    let known = known_config_keys();
    for key in &known {
        assert_eq!(suggest_correction(key, &known).as_deref(), Some(*key));
    }
}

#[test]
fn unknown_keys_do_not_fail_the_load() {
    let config = ClassifierConfig::from_toml_str(
        r#"
[classifier]
scheme = "panta"
colour = "blue"
"#,
    )
    .unwrap();
    assert_eq!(config.scheme(), Scheme::Panta);
}

// ============================================================================
// Value Validation
// ============================================================================

#[test]
fn unknown_scheme_is_a_validation_error() {
    let err = ClassifierConfig::from_toml_str("[classifier]\nscheme = \"weka\"\n").unwrap_err();
    match err {
        ConfigError::Validation(errors) => {
            assert_eq!(errors.len(), 1);
            assert!(errors[0].contains("weka"), "{}", errors[0]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn multiple_errors_are_collected() {
    let err = ClassifierConfig::from_toml_str(
        r#"
[classifier]
scheme = "nope"
parallel_min_rows = 0

[output]
delimiter = ""
"#,
    )
    .unwrap_err();
    match err {
        ConfigError::Validation(errors) => assert_eq!(errors.len(), 3, "{errors:?}"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn wrong_value_type_is_a_parse_error() {
    let err = ClassifierConfig::from_toml_str("[classifier]\nparallel = \"yes\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_, _)));
}

#[test]
fn tab_delimiter_is_accepted() {
    let config = ClassifierConfig::from_toml_str("[output]\ndelimiter = \"\\t\"\n").unwrap();
    assert_eq!(config.delimiter(), '\t');
}

#[test]
fn ml_with_model_path_has_no_warnings() {
    let mut config = ClassifierConfig::default();
    config.model.path = Some("weber.json".into());
    let (errors, warnings) = validate_ranges(&config);
    assert!(errors.is_empty());
    assert!(warnings.is_empty(), "{warnings:?}");
}

#[test]
fn refractive_index_without_group_warns() {
    let mut config = ClassifierConfig::default();
    config.classifier.scheme = "kandler".to_string();
    config.output.include_group = false;
    let (_, warnings) = validate_ranges(&config);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].field, "output.include_refractive_index");
}

// ============================================================================
// File Loading
// ============================================================================

#[test]
fn load_from_file_reports_path_on_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[classifier\nscheme = ").unwrap();

    let err = ClassifierConfig::load_from_file(&path).unwrap_err();
    match &err {
        ConfigError::Parse(p, _) => assert_eq!(p, &path),
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("broken.toml"));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ClassifierConfig::load_from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_, _)));
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("eds_mineral.toml");

    let mut config = ClassifierConfig::default();
    config.classifier.scheme = "kandler".to_string();
    config.output.delimiter = ";".to_string();
    config.output.keep_input_columns = true;
    config.save_to_file(&path).unwrap();

    assert_eq!(ClassifierConfig::load_from_file(&path).unwrap(), config);
}
