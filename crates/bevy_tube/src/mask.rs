//! Procedural CRT shadow mask: RGB sub-pixel stripes with a scanline falloff.
//!
//! Each channel is a clamped triangle wave across the texture width, phase
//! shifted by a third of a period per channel:
//!
//! ```text
//!       M  R  Y  G  C  B
//!   R  ￣ ￣ ＼ ＿ ＿ ／
//!   G  ＿ ／ ￣ ￣ ＼ ＿
//!   B  ＼ ＿ ＿ ／ ￣ ￣
//! ```
//!
//! Rows are darkened towards the top and bottom to form the scanline gap.

use bevy::asset::RenderAssetUsages;
use bevy::image::{ImageAddressMode, ImageFilterMode, ImageSampler, ImageSamplerDescriptor};
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use serde::{Deserialize, Serialize};

use crate::rgba::{Rgba, to_bytes, unit_to_byte};

/// Default side length of the generated mask texture.
pub const CRT_MASK_TEX_SIZE: u32 = 32;

/// Phase offsets of the red, green and blue stripes.
const CHANNEL_PHASES: [f32; 3] = [0.0 / 3.0, 1.0 / 3.0, 2.0 / 3.0];

/// Parameters for [`crt_mask_pixels`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrtMaskParams {
  /// Edge sharpness of the colour boundaries.
  pub edge: f32,
  /// Overlap of neighbouring colour stripes.
  pub overlap: f32,
  /// Edge sharpness of the scanlines.
  pub scanline_edge: f32,
  /// Thickness of the dark scanline gap.
  pub scanline_thickness: f32,
  /// Texture side length in pixels.
  pub size: u32,
}

impl Default for CrtMaskParams {
  fn default() -> Self {
    Self {
      edge: 0.15,
      overlap: 3.0,
      scanline_edge: 0.25,
      scanline_thickness: 0.15,
      size: CRT_MASK_TEX_SIZE,
    }
  }
}

impl CrtMaskParams {
  /// Intensity of one colour stripe at normalized column `x`.
  fn stripe(&self, x: f32, phase: f32) -> f32 {
    let p = (x + phase).fract();
    ((1.5 - (p - 0.5).abs() * 6.0 + self.overlap) * self.edge + 0.5).clamp(0.0, 1.0)
  }

  /// Scanline brightness at normalized row `y`.
  fn scanline(&self, y: f32) -> f32 {
    let s = (self.scanline_edge + 1.0 - self.scanline_thickness)
      - (y - 0.5).abs() * 2.0 * self.scanline_edge;
    s.clamp(0.0, 1.0)
  }
}

/// Generates the mask pixels, row-major, `size * size` entries.
///
/// Deterministic for a given set of parameters.
pub fn crt_mask_pixels(params: &CrtMaskParams) -> Vec<Rgba> {
  let size = params.size.max(1) as usize;
  // A one-pixel mask has no span to normalize over.
  let span = (size - 1).max(1) as f32;

  let columns: Vec<[f32; 3]> = (0..size)
    .map(|ix| {
      let x = ix as f32 / span;
      CHANNEL_PHASES.map(|phase| params.stripe(x, phase))
    })
    .collect();

  let mut pixels = Vec::with_capacity(size * size);
  for iy in 0..size {
    let s = params.scanline(iy as f32 / span);
    for [r, g, b] in &columns {
      pixels.push(Rgba::new(
        unit_to_byte(r * s),
        unit_to_byte(g * s),
        unit_to_byte(b * s),
        255,
      ));
    }
  }
  pixels
}

/// Builds the mask image with a repeating, linearly filtered sampler.
pub fn crt_mask_image(params: &CrtMaskParams) -> Image {
  let size = params.size.max(1);
  let mut image = Image::new(
    Extent3d {
      width: size,
      height: size,
      depth_or_array_layers: 1,
    },
    TextureDimension::D2,
    to_bytes(&crt_mask_pixels(params)),
    // Multiplied straight into the output, so keep the values linear.
    TextureFormat::Rgba8Unorm,
    RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
  );
  image.sampler = ImageSampler::Descriptor(ImageSamplerDescriptor {
    label: Some("tube_crt_mask".into()),
    address_mode_u: ImageAddressMode::Repeat,
    address_mode_v: ImageAddressMode::Repeat,
    mag_filter: ImageFilterMode::Linear,
    min_filter: ImageFilterMode::Linear,
    ..default()
  });
  image
}

/// Generates the mask and adds it to the image assets.
pub fn create_crt_mask(images: &mut Assets<Image>, params: &CrtMaskParams) -> Handle<Image> {
  images.add(crt_mask_image(params))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn mask_is_deterministic() {
    let params = CrtMaskParams::default();
    assert_eq!(crt_mask_pixels(&params), crt_mask_pixels(&params));
  }

  #[test]
  fn mask_has_requested_size_and_is_opaque() {
    let params = CrtMaskParams {
      size: 8,
      ..default()
    };
    let pixels = crt_mask_pixels(&params);
    assert_eq!(pixels.len(), 64);
    assert!(pixels.iter().all(|p| p.a == 255));
  }

  #[test]
  fn stripes_peak_in_phase_order() {
    let params = CrtMaskParams::default();
    let size = params.size as usize;
    let pixels = crt_mask_pixels(&params);
    // Middle row: full scanline brightness.
    let row = &pixels[(size / 2) * size..(size / 2 + 1) * size];

    // Red peaks at the middle column, green near 1/6, blue near 5/6.
    let mid = row[size / 2];
    assert_eq!(mid.r, 255);
    assert!(mid.g < 255 && mid.b < 255);

    let sixth = row[(size - 1) / 6];
    assert_eq!(sixth.g, 255);
    assert!(sixth.b < sixth.g);

    let five_sixths = row[5 * (size - 1) / 6];
    assert_eq!(five_sixths.b, 255);
    assert!(five_sixths.g < five_sixths.b);
  }

  #[test]
  fn scanlines_darken_top_and_bottom() {
    let params = CrtMaskParams::default();
    let size = params.size as usize;
    let pixels = crt_mask_pixels(&params);
    let column = size / 2;
    let top = pixels[column].r;
    let middle = pixels[(size / 2) * size + column].r;
    let bottom = pixels[(size - 1) * size + column].r;
    assert!(top < middle);
    assert_eq!(top, bottom);
    // Edge scanline factor: 1.1 - 0.5 * 0.25 * 2 = 0.85
    assert_eq!(top, unit_to_byte(0.85));
  }

  #[test]
  fn overlap_changes_output() {
    let soft = crt_mask_pixels(&CrtMaskParams::default());
    let hard = crt_mask_pixels(&CrtMaskParams {
      overlap: 0.0,
      ..default()
    });
    assert_ne!(soft, hard);
  }

  #[test]
  fn single_pixel_mask_is_well_defined() {
    let pixels = crt_mask_pixels(&CrtMaskParams {
      size: 1,
      ..default()
    });
    assert_eq!(pixels.len(), 1);
    assert_eq!(pixels[0].a, 255);
  }

  #[test]
  fn mask_image_repeats() {
    let image = crt_mask_image(&CrtMaskParams::default());
    assert_eq!(image.width(), CRT_MASK_TEX_SIZE);
    let ImageSampler::Descriptor(descriptor) = &image.sampler else {
      panic!("mask should carry an explicit sampler");
    };
    assert_eq!(descriptor.address_mode_u, ImageAddressMode::Repeat);
    assert_eq!(descriptor.address_mode_v, ImageAddressMode::Repeat);
  }
}
