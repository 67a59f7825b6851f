//! Per-frame systems keeping the tube pipeline in step with its geometry.

use bevy::camera::visibility::RenderLayers;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::components::{TubeBlitCamera, TubeBlitQuad, TubeInvalidator};
use crate::config::TubeSettings;
use crate::material::TubeMaterial;
use crate::setup::blit_projection;
use crate::state::{TubeFilter, real_to_blit_world};

/// Highest depth an invalidator is lifted to, inside the blit camera's range.
pub const INVALIDATOR_MAX_Z: f32 = 999.0;

/// System: refits the tube when the primary window changes size.
pub fn tube_handle_window_resize(
  mut filter: ResMut<TubeFilter>,
  windows: Query<&Window, With<PrimaryWindow>>,
  mut last_size: Local<Vec2>,
) {
  let Ok(window) = windows.single() else {
    return;
  };

  let size = Vec2::new(window.width(), window.height());
  if size == *last_size || size.x <= 0.0 || size.y <= 0.0 {
    return;
  }
  *last_size = size;

  if size == filter.geometry().real_size() {
    return;
  }

  let margin = filter.geometry().margin_ratio();
  match filter.resize(size.x, size.y, margin) {
    Ok(()) => info!("Tube resize: {}x{} view", size.x, size.y),
    Err(e) => error!("Tube resize failed: {}", e),
  }
}

/// System: pushes the filter geometry into the material and blit entities.
#[allow(clippy::type_complexity)]
pub fn tube_sync_geometry(
  filter: Res<TubeFilter>,
  mut materials: ResMut<Assets<TubeMaterial>>,
  mut quads: Query<&mut Transform, (With<TubeBlitQuad>, Without<TubeInvalidator>)>,
  mut cameras: Query<&mut Projection, With<TubeBlitCamera>>,
  mut invalidators: Query<(&TubeInvalidator, &mut Transform), Without<TubeBlitQuad>>,
) {
  let geometry = filter.geometry();
  let real_size = geometry.real_size();

  if let Some(material) = materials.get_mut(&filter.material) {
    let uniforms = geometry.uniform();
    if material.uniforms != uniforms {
      material.uniforms = uniforms;
    }
  }

  for mut transform in quads.iter_mut() {
    transform.scale = real_size.extend(1.0);
  }

  for mut projection in cameras.iter_mut() {
    *projection = blit_projection(real_size);
  }

  for (invalidator, mut transform) in invalidators.iter_mut() {
    let pos = real_to_blit_world(invalidator.real_position(real_size), real_size);
    transform.translation.x = pos.x;
    transform.translation.y = pos.y;
  }
}

/// System: keeps the invalidators last in the real view's draw order.
///
/// Anything else drawn on the tube layer is sorted below them.
#[allow(clippy::type_complexity)]
pub fn invalidate(
  settings: Res<TubeSettings>,
  others: Query<
    (&GlobalTransform, &RenderLayers),
    (Without<TubeInvalidator>, Without<Camera>, Without<TubeBlitQuad>),
  >,
  mut invalidators: Query<&mut Transform, With<TubeInvalidator>>,
) {
  let tube_layer = RenderLayers::layer(settings.render_layer);
  let top = others
    .iter()
    .filter(|(_, layers)| layers.intersects(&tube_layer))
    .map(|(transform, _)| transform.translation().z)
    .fold(0.0_f32, f32::max);

  let z = (top + 1.0).min(INVALIDATOR_MAX_Z);
  for mut transform in invalidators.iter_mut() {
    if transform.translation.z != z {
      transform.translation.z = z;
    }
  }
}
