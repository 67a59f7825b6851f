//! Construction parameters for the tube filter.

use bevy::asset::Asset;
use bevy::prelude::*;
use bevy::reflect::TypePath;
use serde::{Deserialize, Serialize};

use crate::corners::MAX_CORNER_TEXTURE_HALF;
use crate::mask::CrtMaskParams;

/// Render layer the blit quad, blit camera and invalidators live on.
pub const DEFAULT_TUBE_LAYER: usize = 24;

/// Parameters the filter is constructed with.
#[derive(Resource, Clone, Debug)]
pub struct TubeSettings {
  /// Width of the virtual screen.
  pub virtual_width: u32,
  /// Height of the virtual screen.
  pub virtual_height: u32,
  /// Curvature in virtual pixels.
  pub curve: f32,
  /// Radius of the corner rounds on the virtual screen.
  pub corner_size: f32,
  /// Corner texture oversampling.
  pub corner_oversampling: u32,
  /// Share of the real view left as margin around the tube.
  pub margin_ratio: f32,
  /// Custom shadow mask. Generated from `mask_params` when `None`.
  pub mask: Option<Handle<Image>>,
  /// Parameters for the generated shadow mask.
  pub mask_params: CrtMaskParams,
  /// Layer for the real-view entities.
  pub render_layer: usize,
}

impl Default for TubeSettings {
  fn default() -> Self {
    Self {
      virtual_width: 256,
      virtual_height: 224,
      curve: 20.0,
      corner_size: 16.0,
      corner_oversampling: 4,
      margin_ratio: 0.03,
      mask: None,
      mask_params: CrtMaskParams::default(),
      render_layer: DEFAULT_TUBE_LAYER,
    }
  }
}

impl TubeSettings {
  /// Virtual screen size as a vector.
  pub fn virtual_size(&self) -> Vec2 {
    Vec2::new(self.virtual_width as f32, self.virtual_height as f32)
  }

  /// Rejects parameters the geometry cannot work with.
  pub fn validate(&self) -> Result<(), TubeConfigError> {
    if self.virtual_width == 0 || self.virtual_height == 0 {
      return Err(TubeConfigError::ZeroVirtualSize {
        width: self.virtual_width,
        height: self.virtual_height,
      });
    }
    validate_margin(self.margin_ratio)?;
    validate_curve(self.curve)?;
    if !self.corner_size.is_finite() || self.corner_size < 0.0 {
      return Err(TubeConfigError::InvalidCornerSize(self.corner_size));
    }
    let max_corner = self.virtual_size().min_element() * 0.5;
    if self.corner_size > max_corner {
      return Err(TubeConfigError::CornerTooLarge {
        size: self.corner_size,
        max: max_corner,
      });
    }
    if self.corner_oversampling == 0 {
      return Err(TubeConfigError::ZeroOversampling);
    }
    let texels = (self.corner_size * self.corner_oversampling as f32).round();
    if texels > MAX_CORNER_TEXTURE_HALF as f32 {
      return Err(TubeConfigError::CornerTextureTooLarge(texels));
    }
    if self.mask.is_none() && self.mask_params.size == 0 {
      return Err(TubeConfigError::ZeroMaskSize);
    }
    Ok(())
  }
}

pub(crate) fn validate_margin(margin_ratio: f32) -> Result<(), TubeConfigError> {
  if !(0.0..1.0).contains(&margin_ratio) {
    return Err(TubeConfigError::MarginOutOfRange(margin_ratio));
  }
  Ok(())
}

pub(crate) fn validate_view_size(width: f32, height: f32) -> Result<(), TubeConfigError> {
  if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
    return Err(TubeConfigError::InvalidViewSize { width, height });
  }
  Ok(())
}

pub(crate) fn validate_curve(curve: f32) -> Result<(), TubeConfigError> {
  if !curve.is_finite() || curve < 0.0 {
    return Err(TubeConfigError::InvalidCurve(curve));
  }
  Ok(())
}

/// Tube settings as stored in a TOML file.
///
/// ```toml
/// virtual_width = 256
/// virtual_height = 224
/// curve = 20.0
/// margin_ratio = 0.03
///
/// [mask]
/// edge = 0.15
/// ```
#[derive(Asset, TypePath, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TubeConfig {
  pub virtual_width: u32,
  pub virtual_height: u32,
  pub curve: f32,
  pub corner_size: f32,
  pub corner_oversampling: u32,
  pub margin_ratio: f32,
  pub mask: CrtMaskParams,
}

impl Default for TubeConfig {
  fn default() -> Self {
    let settings = TubeSettings::default();
    Self {
      virtual_width: settings.virtual_width,
      virtual_height: settings.virtual_height,
      curve: settings.curve,
      corner_size: settings.corner_size,
      corner_oversampling: settings.corner_oversampling,
      margin_ratio: settings.margin_ratio,
      mask: settings.mask_params,
    }
  }
}

impl TubeConfig {
  /// Parses and validates a TOML document.
  pub fn from_toml(source: &str) -> Result<Self, TubeConfigError> {
    let config: Self = toml::from_str(source).map_err(TubeConfigError::Parse)?;
    config.to_settings().validate()?;
    Ok(config)
  }

  /// Converts to plugin settings, keeping other settings at their defaults.
  pub fn to_settings(&self) -> TubeSettings {
    TubeSettings {
      virtual_width: self.virtual_width,
      virtual_height: self.virtual_height,
      curve: self.curve,
      corner_size: self.corner_size,
      corner_oversampling: self.corner_oversampling,
      margin_ratio: self.margin_ratio,
      mask_params: self.mask,
      ..default()
    }
  }
}

/// Tube configuration errors.
#[derive(Debug)]
pub enum TubeConfigError {
  ZeroVirtualSize { width: u32, height: u32 },
  MarginOutOfRange(f32),
  InvalidCurve(f32),
  InvalidCornerSize(f32),
  CornerTooLarge { size: f32, max: f32 },
  CornerTextureTooLarge(f32),
  ZeroOversampling,
  InvalidViewSize { width: f32, height: f32 },
  ZeroMaskSize,
  Parse(toml::de::Error),
}

impl std::fmt::Display for TubeConfigError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::ZeroVirtualSize { width, height } => {
        write!(f, "virtual screen must be non-empty, got {}x{}", width, height)
      }
      Self::MarginOutOfRange(m) => write!(f, "margin ratio must be in [0, 1), got {}", m),
      Self::InvalidCurve(c) => write!(f, "curvature must be finite and >= 0, got {}", c),
      Self::InvalidCornerSize(s) => write!(f, "corner size must be finite and >= 0, got {}", s),
      Self::CornerTooLarge { size, max } => {
        write!(f, "corner size must fit the virtual screen (<= {}), got {}", max, size)
      }
      Self::CornerTextureTooLarge(texels) => write!(
        f,
        "corner size times oversampling must be <= {}, got {}",
        MAX_CORNER_TEXTURE_HALF, texels
      ),
      Self::ZeroOversampling => write!(f, "corner oversampling must be at least 1"),
      Self::InvalidViewSize { width, height } => {
        write!(f, "view size must be finite and positive, got {}x{}", width, height)
      }
      Self::ZeroMaskSize => write!(f, "mask size must be at least 1"),
      Self::Parse(e) => write!(f, "invalid tube config: {}", e),
    }
  }
}

impl std::error::Error for TubeConfigError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::Parse(e) => Some(e),
      _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_are_valid() {
    assert!(TubeSettings::default().validate().is_ok());
  }

  #[test]
  fn zero_virtual_size_rejected() {
    let settings = TubeSettings {
      virtual_height: 0,
      ..default()
    };
    assert!(matches!(
      settings.validate(),
      Err(TubeConfigError::ZeroVirtualSize {
        width: 256,
        height: 0
      })
    ));
  }

  #[test]
  fn margin_must_leave_room() {
    for margin in [-0.1, 1.0, f32::NAN] {
      let settings = TubeSettings {
        margin_ratio: margin,
        ..default()
      };
      assert!(matches!(
        settings.validate(),
        Err(TubeConfigError::MarginOutOfRange(_))
      ));
    }
  }

  #[test]
  fn corner_must_fit_virtual_screen() {
    let settings = TubeSettings {
      corner_size: 113.0,
      ..default()
    };
    assert!(matches!(
      settings.validate(),
      Err(TubeConfigError::CornerTooLarge { max, .. }) if max == 112.0
    ));
  }

  #[test]
  fn oversampled_corner_texture_is_bounded() {
    let settings = TubeSettings {
      corner_oversampling: 4_000_000_000,
      ..default()
    };
    assert!(matches!(
      settings.validate(),
      Err(TubeConfigError::CornerTextureTooLarge(_))
    ));
  }

  #[test]
  fn custom_mask_skips_mask_size_check() {
    let settings = TubeSettings {
      mask: Some(Handle::default()),
      mask_params: CrtMaskParams { size: 0, ..default() },
      ..default()
    };
    assert!(settings.validate().is_ok());
  }
}
