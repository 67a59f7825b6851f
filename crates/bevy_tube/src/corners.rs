//! Rounded screen corners.
//!
//! A single `2n × 2n` texture holds black everywhere outside an inscribed
//! circle. Its four quadrants become four sprites pinned to the corners of
//! the virtual screen, so the corners get curved along with the content.

use bevy::asset::RenderAssetUsages;
use bevy::image::ImageSampler;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use bevy::sprite::Anchor;
use rayon::prelude::*;

use crate::rgba::{Rgba, to_bytes, unit_to_byte};

/// Subsamples per axis when measuring circle coverage.
const SUPERSAMPLE: u32 = 4;

/// Which corner of the virtual screen a sprite covers.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TubeCorner {
  TopLeft,
  TopRight,
  BottomLeft,
  BottomRight,
}

impl TubeCorner {
  pub const ALL: [Self; 4] = [
    Self::TopLeft,
    Self::TopRight,
    Self::BottomLeft,
    Self::BottomRight,
  ];

  /// Sprite anchor, matching the corner it is pinned to.
  pub fn anchor(self) -> Anchor {
    match self {
      Self::TopLeft => Anchor::TOP_LEFT,
      Self::TopRight => Anchor::TOP_RIGHT,
      Self::BottomLeft => Anchor::BOTTOM_LEFT,
      Self::BottomRight => Anchor::BOTTOM_RIGHT,
    }
  }

  /// Quadrant of the corner texture, for a texture of side `2 * half`.
  pub fn region(self, half: u32) -> URect {
    let (x, y) = match self {
      Self::TopLeft => (0, 0),
      Self::TopRight => (half, 0),
      Self::BottomLeft => (0, half),
      Self::BottomRight => (half, half),
    };
    URect::new(x, y, x + half, y + half)
  }

  /// Position on the virtual screen, y down.
  pub fn virtual_position(self, virtual_size: Vec2) -> Vec2 {
    match self {
      Self::TopLeft => Vec2::ZERO,
      Self::TopRight => Vec2::new(virtual_size.x, 0.0),
      Self::BottomLeft => Vec2::new(0.0, virtual_size.y),
      Self::BottomRight => virtual_size,
    }
  }
}

/// Largest half side of the corner texture, in texels.
pub const MAX_CORNER_TEXTURE_HALF: u32 = 2048;

/// Half the side of the corner texture, in texels.
///
/// Clamped to `1..=MAX_CORNER_TEXTURE_HALF`.
pub fn corner_texture_half(corner_size: f32, oversampling: u32) -> u32 {
  (corner_size * oversampling as f32)
    .round()
    .clamp(1.0, MAX_CORNER_TEXTURE_HALF as f32) as u32
}

/// Rasterizes the corner texture: black with alpha = 1 - circle coverage.
///
/// Returns the side length and row-major pixels.
pub fn corner_round_pixels(corner_size: f32, oversampling: u32) -> (u32, Vec<Rgba>) {
  let half = corner_texture_half(corner_size, oversampling);
  let side = half * 2;
  let radius_sq = (half as f32) * (half as f32);
  let center = half as f32;
  let step = 1.0 / SUPERSAMPLE as f32;
  let total = (SUPERSAMPLE * SUPERSAMPLE) as f32;

  // Parallel over rows
  let pixels: Vec<Rgba> = (0..side)
    .into_par_iter()
    .flat_map_iter(|py| {
      (0..side).map(move |px| {
        let mut inside = 0u32;
        for sy in 0..SUPERSAMPLE {
          let dy = py as f32 + (sy as f32 + 0.5) * step - center;
          for sx in 0..SUPERSAMPLE {
            let dx = px as f32 + (sx as f32 + 0.5) * step - center;
            if dx * dx + dy * dy <= radius_sq {
              inside += 1;
            }
          }
        }
        Rgba::black(unit_to_byte(1.0 - inside as f32 / total))
      })
    })
    .collect();

  (side, pixels)
}

/// Builds the corner texture image.
pub fn corner_round_image(corner_size: f32, oversampling: u32) -> Image {
  let (side, pixels) = corner_round_pixels(corner_size, oversampling);
  let mut image = Image::new(
    Extent3d {
      width: side,
      height: side,
      depth_or_array_layers: 1,
    },
    TextureDimension::D2,
    to_bytes(&pixels),
    TextureFormat::Rgba8UnormSrgb,
    RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
  );
  image.sampler = ImageSampler::linear();
  image
}

/// Creates the four corner sprites sharing one texture.
///
/// Sprites are sized in texels and scaled down by `oversampling`, so they
/// cover `corner_size` virtual pixels each.
pub fn corner_round_sprites(
  images: &mut Assets<Image>,
  corner_size: f32,
  oversampling: u32,
) -> [(TubeCorner, Sprite, Anchor, Vec3); 4] {
  let half = corner_texture_half(corner_size, oversampling);
  let texture = images.add(corner_round_image(corner_size, oversampling));
  let scale = Vec3::new(
    1.0 / oversampling as f32,
    1.0 / oversampling as f32,
    1.0,
  );

  TubeCorner::ALL.map(|corner| {
    let region = corner.region(half);
    let sprite = Sprite {
      image: texture.clone(),
      rect: Some(Rect::new(
        region.min.x as f32,
        region.min.y as f32,
        region.max.x as f32,
        region.max.y as f32,
      )),
      ..default()
    };
    (corner, sprite, corner.anchor(), scale)
  })
}
