//! Coordinate mapping between the real view and the curved virtual screen.
//!
//! The virtual screen is fitted into the real view with a uniform scale and
//! a margin, centred, then bowed with a rational barrel distortion:
//!
//! ```text
//! coord' = coord / (1 - curve * coord.yx²)
//! ```
//!
//! where `coord` is the position on the fitted rectangle in `[-1, 1]`. The
//! fragment shader runs the same mapping per pixel to find which virtual
//! pixel to sample, so [`TubeGeometry::sample_pos`] and `tube.wgsl` must
//! stay in lockstep.

use bevy::math::{Rect, Vec2};

use crate::material::TubeUniform;

/// Iteration cap for [`TubeGeometry::project`].
const PROJECT_MAX_ITERATIONS: usize = 64;

/// Convergence threshold for [`TubeGeometry::project`], in normalized units.
const PROJECT_EPSILON: f32 = 1e-6;

/// Derived geometry for one virtual/real size pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TubeGeometry {
  virtual_size: Vec2,
  real_size: Vec2,
  margin_ratio: f32,
  curve_px: f32,
  /// Size of the fitted virtual screen on the real view.
  size: Vec2,
  /// Top-left of the fitted virtual screen on the real view.
  offset: Vec2,
  /// Real-to-virtual scale (reciprocal of the fit scale).
  scale: Vec2,
  /// Curvature normalized per axis.
  curve: Vec2,
}

impl TubeGeometry {
  /// Binds virtual and real dimensions and computes the initial fit.
  pub fn new(virtual_size: Vec2, real_size: Vec2, curve_px: f32, margin_ratio: f32) -> Self {
    let mut geometry = Self {
      virtual_size,
      real_size,
      margin_ratio,
      curve_px: 0.0,
      size: Vec2::ZERO,
      offset: Vec2::ZERO,
      scale: Vec2::ONE,
      curve: Vec2::ZERO,
    };
    geometry.set_curve(curve_px);
    geometry.resize(real_size, margin_ratio);
    geometry
  }

  /// Refits the virtual screen into a real view of the given size.
  ///
  /// Uses a single scale for both axes so the virtual aspect ratio is kept.
  pub fn resize(&mut self, real_size: Vec2, margin_ratio: f32) {
    let shrink = 1.0 - margin_ratio;
    let fit = (shrink * real_size / self.virtual_size).min_element();

    self.size = self.virtual_size * fit;
    self.scale = Vec2::splat(1.0 / fit);
    self.offset = (real_size - self.size) * 0.5;
    self.real_size = real_size;
    self.margin_ratio = margin_ratio;
  }

  /// Sets the curvature, in virtual pixels.
  pub fn set_curve(&mut self, curve_px: f32) {
    self.curve_px = curve_px;
    self.curve = Vec2::splat(curve_px) / self.virtual_size;
  }

  /// Curvature in virtual pixels.
  pub fn curve(&self) -> f32 {
    self.curve_px
  }

  /// Curvature normalized per axis, as the shader sees it.
  pub fn normalized_curve(&self) -> Vec2 {
    self.curve
  }

  pub fn virtual_size(&self) -> Vec2 {
    self.virtual_size
  }

  pub fn real_size(&self) -> Vec2 {
    self.real_size
  }

  pub fn margin_ratio(&self) -> f32 {
    self.margin_ratio
  }

  /// Size of the fitted virtual screen on the real view.
  pub fn size(&self) -> Vec2 {
    self.size
  }

  /// Top-left corner of the fitted virtual screen on the real view.
  pub fn offset(&self) -> Vec2 {
    self.offset
  }

  /// Real-to-virtual scale.
  pub fn scale(&self) -> Vec2 {
    self.scale
  }

  /// Rectangle the uncurved virtual screen occupies on the real view.
  pub fn view_rect(&self) -> Rect {
    Rect::from_corners(self.offset, self.offset + self.size)
  }

  /// Maps a point on the real view to the virtual screen, unrounded.
  ///
  /// Same mapping as the fragment shader, minus the sampling-only scanline
  /// wave and nearest-neighbour merge.
  pub fn sample_pos(&self, real: Vec2) -> Vec2 {
    let pos = real - self.offset;
    let coord = pos / self.size * 2.0 - 1.0;
    let curved = Vec2::new(
      coord.x / (1.0 - self.curve.x * coord.y * coord.y),
      coord.y / (1.0 - self.curve.y * coord.x * coord.x),
    );
    let coord2 = (curved * 0.5 + 0.5) * self.scale;
    coord2 * self.size
  }

  /// Translates a point on the real view to integer virtual coordinates.
  ///
  /// Rounds half up, so `-2.5` becomes `-2`.
  pub fn translate_pos(&self, x: f32, y: f32) -> Vec2 {
    let pos = self.sample_pos(Vec2::new(x, y));
    (pos + 0.5).floor()
  }

  /// Finds where a virtual point is displayed on the real view.
  ///
  /// Inverse of [`sample_pos`](Self::sample_pos). The barrel equations have
  /// no convenient closed form in this direction, so the undistorted
  /// coordinate is found by fixed-point iteration. Returns `None` past the
  /// curve's pole or if the iteration does not settle.
  pub fn project(&self, virtual_pos: Vec2) -> Option<Vec2> {
    let coord2 = virtual_pos / self.size;
    let curved = (coord2 / self.scale - 0.5) * 2.0;

    let mut coord = curved;
    for _ in 0..PROJECT_MAX_ITERATIONS {
      let denom = Vec2::new(
        1.0 - self.curve.x * coord.y * coord.y,
        1.0 - self.curve.y * coord.x * coord.x,
      );
      if denom.min_element() <= 0.0 {
        return None;
      }
      let next = curved * denom;
      if !next.is_finite() {
        return None;
      }
      let delta = (next - coord).abs().max_element();
      coord = next;
      if delta < PROJECT_EPSILON {
        return Some(self.offset + (coord + 1.0) * 0.5 * self.size);
      }
    }
    None
  }

  /// Packs the derived values into the shader uniform block.
  pub fn uniform(&self) -> TubeUniform {
    TubeUniform {
      size: self.size,
      offset: self.offset,
      scale: self.scale,
      curve: self.curve,
      virtual_size: self.virtual_size,
      view_size: self.real_size,
    }
  }
}
