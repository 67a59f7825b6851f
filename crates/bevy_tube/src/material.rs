//! Tube shader material.

use bevy::prelude::*;
use bevy::render::render_resource::{AsBindGroup, ShaderType};
use bevy::shader::ShaderRef;
use bevy::sprite_render::Material2d;

/// Uniform block shared with `shaders/tube.wgsl`.
///
/// All fields are `Vec2` so the WGSL layout needs no padding.
#[derive(Clone, Copy, Debug, Default, PartialEq, ShaderType)]
pub struct TubeUniform {
  /// Size of the fitted virtual screen on the real view.
  pub size: Vec2,
  /// Top-left of the fitted virtual screen on the real view.
  pub offset: Vec2,
  /// Real-to-virtual scale.
  pub scale: Vec2,
  /// Curvature normalized per axis.
  pub curve: Vec2,
  /// Virtual screen resolution (the source texture size).
  pub virtual_size: Vec2,
  /// Real view size.
  pub view_size: Vec2,
}

/// Warps the virtual screen onto the real view.
#[derive(Asset, TypePath, AsBindGroup, Clone)]
pub struct TubeMaterial {
  #[uniform(0)]
  pub uniforms: TubeUniform,

  /// Virtual screen render target.
  #[texture(1)]
  #[sampler(2)]
  pub source_image: Handle<Image>,

  /// Shadow mask, sampled with repeat.
  #[texture(3)]
  #[sampler(4)]
  pub mask: Handle<Image>,
}

impl Material2d for TubeMaterial {
  fn fragment_shader() -> ShaderRef {
    "embedded://bevy_tube/shaders/tube.wgsl".into()
  }
}
