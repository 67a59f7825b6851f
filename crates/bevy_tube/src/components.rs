//! Components for the tube filter.

use bevy::prelude::*;

/// Marker for the camera that draws the virtual screen.
///
/// Content must be drawn in the rectangle `(0, 0)`–`(virtual_width,
/// -virtual_height)` in world space; the filter takes over the camera's
/// target and projection.
#[derive(Component, Default)]
pub struct TubeSourceCamera;

/// Camera that draws the warped result to the window.
#[derive(Component)]
pub struct TubeBlitCamera;

/// Full-view quad carrying the [`TubeMaterial`](crate::TubeMaterial).
#[derive(Component)]
pub struct TubeBlitQuad;

/// Invisible 1×1 marker kept last in the real-view draw order.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TubeInvalidator {
  /// Pinned to the real view's top-left pixel.
  Origin,
  /// Pinned to the real view's bottom-right pixel.
  FarCorner,
}

impl TubeInvalidator {
  /// Top-left of the marker's pixel on the real view.
  pub fn real_position(self, real_size: Vec2) -> Vec2 {
    match self {
      Self::Origin => Vec2::ZERO,
      Self::FarCorner => real_size - Vec2::ONE,
    }
  }
}

/// Marker for every entity the filter spawns.
#[derive(Component)]
pub struct TubePipelineEntity;
