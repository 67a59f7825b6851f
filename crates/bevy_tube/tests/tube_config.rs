//! Tube config parsing and validation.
//!
//! Run: cargo test -p bevy_tube --test tube_config

use bevy_tube::{CrtMaskParams, TubeConfig, TubeConfigError, TubeSettings};

#[test]
fn empty_document_gives_defaults() {
  let config = TubeConfig::from_toml("").expect("empty config is valid");
  assert_eq!(config, TubeConfig::default());

  let settings = config.to_settings();
  let defaults = TubeSettings::default();
  assert_eq!(settings.virtual_width, defaults.virtual_width);
  assert_eq!(settings.virtual_height, defaults.virtual_height);
  assert_eq!(settings.curve, defaults.curve);
  assert_eq!(settings.corner_size, defaults.corner_size);
  assert_eq!(settings.margin_ratio, defaults.margin_ratio);
  assert!(settings.mask.is_none());
}

#[test]
fn partial_document_overrides_fields() {
  let config = TubeConfig::from_toml(
    r#"
virtual_width = 320
virtual_height = 240
curve = 12.5

[mask]
edge = 0.2
size = 16
"#,
  )
  .expect("config is valid");

  assert_eq!(config.virtual_width, 320);
  assert_eq!(config.virtual_height, 240);
  assert_eq!(config.curve, 12.5);
  assert_eq!(config.margin_ratio, 0.03);
  assert_eq!(config.mask.edge, 0.2);
  assert_eq!(config.mask.size, 16);
  assert_eq!(config.mask.overlap, CrtMaskParams::default().overlap);
}

#[test]
fn malformed_toml_is_a_parse_error() {
  let err = TubeConfig::from_toml("curve = \"very\"").unwrap_err();
  assert!(matches!(err, TubeConfigError::Parse(_)));
  assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn oversized_corner_is_rejected_before_rasterizing() {
  let err = TubeConfig::from_toml("corner_size = 20000.0").unwrap_err();
  assert!(matches!(
    err,
    TubeConfigError::CornerTooLarge { size, max } if size == 20000.0 && max == 112.0
  ));
}

#[test]
fn out_of_range_values_are_rejected() {
  let cases = [
    ("virtual_width = 0", "virtual screen"),
    ("margin_ratio = 1.0", "margin ratio"),
    ("curve = -3.0", "curvature"),
    ("corner_size = -1.0", "corner size"),
    ("corner_oversampling = 0", "oversampling"),
    ("corner_size = 20000.0", "fit the virtual screen"),
    ("corner_oversampling = 4000000000", "times oversampling"),
    ("[mask]\nsize = 0", "mask size"),
  ];

  for (source, message) in cases {
    let err = TubeConfig::from_toml(source).unwrap_err();
    let text = err.to_string();
    assert!(
      text.contains(message),
      "{:?}: expected '{}' in '{}'",
      source,
      message,
      text
    );
  }
}
