//! Runtime state of the tube filter.

use bevy::prelude::*;

use crate::config::{
  TubeConfigError, TubeSettings, validate_curve, validate_margin, validate_view_size,
};
use crate::geometry::TubeGeometry;
use crate::material::TubeMaterial;

/// The tube filter: current geometry plus the assets it renders with.
///
/// Mutating the geometry (through [`resize`](Self::resize) or
/// [`set_curve`](Self::set_curve)) is picked up by the sync system on the
/// next frame.
#[derive(Resource, Debug)]
pub struct TubeFilter {
  geometry: TubeGeometry,
  /// Render pipeline is set up.
  pub initialized: bool,
  /// Render target the source camera draws the virtual screen into.
  pub virtual_target: Handle<Image>,
  /// Shadow mask in use.
  pub mask: Handle<Image>,
  /// Material on the blit quad.
  pub material: Handle<TubeMaterial>,
}

impl TubeFilter {
  /// Binds the virtual screen described by `settings` to a real view.
  pub fn new(settings: &TubeSettings, real_size: Vec2) -> Self {
    Self {
      geometry: TubeGeometry::new(
        settings.virtual_size(),
        real_size,
        settings.curve,
        settings.margin_ratio,
      ),
      initialized: false,
      virtual_target: Handle::default(),
      mask: Handle::default(),
      material: Handle::default(),
    }
  }

  pub fn geometry(&self) -> &TubeGeometry {
    &self.geometry
  }

  /// Refits the virtual screen into a real view of `width × height`.
  pub fn resize(&mut self, width: f32, height: f32, margin_ratio: f32) -> Result<(), TubeConfigError> {
    validate_view_size(width, height)?;
    validate_margin(margin_ratio)?;
    self.geometry.resize(Vec2::new(width, height), margin_ratio);
    Ok(())
  }

  /// Sets the curvature in virtual pixels.
  pub fn set_curve(&mut self, curve: f32) -> Result<(), TubeConfigError> {
    validate_curve(curve)?;
    self.geometry.set_curve(curve);
    Ok(())
  }

  /// Curvature in virtual pixels.
  pub fn curve(&self) -> f32 {
    self.geometry.curve()
  }

  /// Translates a real-view position to integer virtual coordinates.
  pub fn translate_pos(&self, x: f32, y: f32) -> Vec2 {
    self.geometry.translate_pos(x, y)
  }

  /// Where a virtual position is shown on the real view.
  pub fn project(&self, virtual_pos: Vec2) -> Option<Vec2> {
    self.geometry.project(virtual_pos)
  }

  /// Window cursor translated to virtual coordinates.
  pub fn cursor_position(&self, window: &Window) -> Option<Vec2> {
    window
      .cursor_position()
      .map(|cursor| self.translate_pos(cursor.x, cursor.y))
  }
}

/// World position of a virtual-screen point, as seen by the source camera.
///
/// The source camera's origin sits on the top-left corner of the virtual
/// screen; virtual y grows downward, world y upward.
pub fn virtual_to_world(virtual_pos: Vec2) -> Vec2 {
  Vec2::new(virtual_pos.x, -virtual_pos.y)
}

/// World position of a real-view point, as seen by the blit camera.
pub fn real_to_blit_world(real_pos: Vec2, real_size: Vec2) -> Vec2 {
  Vec2::new(real_pos.x - real_size.x * 0.5, real_size.y * 0.5 - real_pos.y)
}
