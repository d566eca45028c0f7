//! Configuration system tests.

use spanlog::core::{Config, ConfigBuilder};
use std::io::Write;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.generator.timestamp_bits, 37);
    assert_eq!(config.generator.group_bits, 5);
    assert_eq!(config.generator.machine_bits, 10);
    assert_eq!(config.generator.sequence_bits(), 12);
    assert_eq!(config.sampling.span_limit, 100);
}

#[test]
fn test_config_builder() {
    let config = ConfigBuilder::new()
        .timestamp_bits(41)
        .group_bits(4)
        .machine_bits(8)
        .span_limit(500)
        .build()
        .unwrap();

    assert_eq!(config.generator.timestamp_bits, 41);
    assert_eq!(config.generator.group_bits, 4);
    assert_eq!(config.generator.machine_bits, 8);
    assert_eq!(config.generator.sequence_bits(), 11);
    assert_eq!(config.sampling.span_limit, 500);
}

#[test]
fn test_yaml_config() {
    let yaml = r#"
generator:
  timestamp_bits: 40
  group_bits: 6
  machine_bits: 8
sampling:
  span_limit: 250
"#;

    let config = ConfigBuilder::new()
        .from_yaml(yaml)
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(config.generator.timestamp_bits, 40);
    assert_eq!(config.generator.group_bits, 6);
    assert_eq!(config.generator.machine_bits, 8);
    assert_eq!(config.generator.sequence_bits(), 10);
    assert_eq!(config.sampling.span_limit, 250);
}

#[test]
fn test_partial_yaml_uses_defaults() {
    let yaml = r#"
sampling:
  span_limit: 9
"#;

    let config = ConfigBuilder::new()
        .from_yaml(yaml)
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(config.generator.timestamp_bits, 37);
    assert_eq!(config.sampling.span_limit, 9);
}

#[test]
fn test_config_validation() {
    // Valid config should pass
    let valid_config = Config::default();
    assert!(valid_config.validate().is_ok());

    // No room left for a sequence counter
    let invalid_config = ConfigBuilder::new()
        .timestamp_bits(48)
        .group_bits(8)
        .machine_bits(8)
        .build();
    assert!(invalid_config.is_err());

    // Zero-width fields
    let invalid_config = ConfigBuilder::new().group_bits(0).build();
    assert!(invalid_config.is_err());

    // Zero span budget
    let invalid_config = ConfigBuilder::new().span_limit(0).build();
    assert!(invalid_config.is_err());
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "generator:\n  machine_bits: 12\nsampling:\n  span_limit: 50"
    )
    .unwrap();

    let config = Config::load_from_file(file.path()).unwrap();
    assert_eq!(config.generator.machine_bits, 12);
    assert_eq!(config.generator.sequence_bits(), 10);
    assert_eq!(config.sampling.span_limit, 50);
}

#[test]
fn test_load_from_file_rejects_invalid() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "sampling:\n  span_limit: 0").unwrap();

    assert!(Config::load_from_file(file.path()).is_err());
}
