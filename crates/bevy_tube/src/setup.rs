//! Spawns the tube render pipeline once a source camera and window exist.

use bevy::{
  camera::{RenderTarget, ScalingMode, visibility::RenderLayers},
  image::ImageSampler,
  prelude::*,
  render::render_resource::{
    Extent3d, TextureDescriptor, TextureDimension, TextureFormat, TextureUsages,
  },
  sprite::Anchor,
  window::PrimaryWindow,
};

use crate::components::{
  TubeBlitCamera, TubeBlitQuad, TubeInvalidator, TubePipelineEntity, TubeSourceCamera,
};
use crate::config::TubeSettings;
use crate::corners::corner_round_sprites;
use crate::mask::create_crt_mask;
use crate::material::TubeMaterial;
use crate::state::{TubeFilter, real_to_blit_world, virtual_to_world};

/// Camera order of the blit pass; the source camera renders before it.
pub const TUBE_BLIT_ORDER: isize = 10;

/// Draw depth of the corner sprites inside the virtual screen.
pub const CORNER_Z: f32 = 900.0;

/// Alpha of the invalidator markers: present, but never visible.
const INVALIDATOR_ALPHA: f32 = 1.0 / 255.0;

/// Sets up the virtual render target, blit pass, corners and invalidators.
#[allow(clippy::too_many_arguments)]
pub fn setup_tube(
  mut commands: Commands,
  settings: Res<TubeSettings>,
  mut filter: ResMut<TubeFilter>,
  mut images: ResMut<Assets<Image>>,
  mut meshes: ResMut<Assets<Mesh>>,
  mut materials: ResMut<Assets<TubeMaterial>>,
  source_cameras: Query<(Entity, &Camera, Option<&RenderLayers>), With<TubeSourceCamera>>,
  windows: Query<&Window, With<PrimaryWindow>>,
) {
  if filter.initialized {
    return;
  }

  let Ok((camera_entity, camera, source_layers)) = source_cameras.single() else {
    return;
  };

  let Ok(window) = windows.single() else {
    return;
  };

  let real_size = Vec2::new(window.width(), window.height());
  if real_size.x <= 0.0 || real_size.y <= 0.0 {
    return;
  }

  let virtual_size = settings.virtual_size();
  info!(
    "Tube: {}x{} virtual screen on {}x{} view",
    settings.virtual_width, settings.virtual_height, real_size.x, real_size.y
  );

  let virtual_target = create_render_target(
    Extent3d {
      width: settings.virtual_width,
      height: settings.virtual_height,
      depth_or_array_layers: 1,
    },
    &mut images,
  );

  // Redirect the source camera into the virtual screen, origin top-left.
  commands.entity(camera_entity).insert((
    Camera {
      target: RenderTarget::Image(virtual_target.clone().into()),
      order: camera.order.min(TUBE_BLIT_ORDER - 1),
      ..camera.clone()
    },
    Projection::Orthographic(OrthographicProjection {
      near: -1000.0,
      far: 1000.0,
      scale: 1.0,
      viewport_origin: Vec2::new(0.0, 1.0),
      scaling_mode: ScalingMode::Fixed {
        width: virtual_size.x,
        height: virtual_size.y,
      },
      area: Rect::default(),
    }),
  ));

  let mask = settings
    .mask
    .clone()
    .unwrap_or_else(|| create_crt_mask(&mut images, &settings.mask_params));

  if let Err(e) = filter.resize(real_size.x, real_size.y, settings.margin_ratio) {
    warn!("Tube: keeping previous fit: {}", e);
  }

  let material = materials.add(TubeMaterial {
    uniforms: filter.geometry().uniform(),
    source_image: virtual_target.clone(),
    mask: mask.clone(),
  });

  let tube_layer = RenderLayers::layer(settings.render_layer);

  commands.spawn((
    Name::new("TubeBlitQuad"),
    TubeBlitQuad,
    TubePipelineEntity,
    Mesh2d(meshes.add(Rectangle::new(1.0, 1.0))),
    MeshMaterial2d(material.clone()),
    Transform::from_scale(real_size.extend(1.0)),
    Visibility::default(),
    tube_layer.clone(),
  ));

  commands.spawn((
    Name::new("TubeBlitCamera"),
    TubeBlitCamera,
    TubePipelineEntity,
    Camera2d,
    Camera {
      order: TUBE_BLIT_ORDER,
      clear_color: ClearColorConfig::Custom(Color::BLACK),
      ..default()
    },
    blit_projection(real_size),
    Transform::default(),
    tube_layer.clone(),
  ));

  for invalidator in [TubeInvalidator::Origin, TubeInvalidator::FarCorner] {
    let pos = real_to_blit_world(invalidator.real_position(real_size), real_size);
    commands.spawn((
      Name::new(format!("TubeInvalidator_{:?}", invalidator)),
      invalidator,
      TubePipelineEntity,
      Sprite::from_color(Color::srgba(0.0, 0.0, 0.0, INVALIDATOR_ALPHA), Vec2::ONE),
      Anchor::TOP_LEFT,
      Transform::from_translation(pos.extend(1.0)),
      tube_layer.clone(),
    ));
  }

  // Corners live inside the virtual screen so they are curved with it.
  let corner_layers = source_layers.cloned().unwrap_or_default();
  for (corner, sprite, anchor, scale) in
    corner_round_sprites(&mut images, settings.corner_size, settings.corner_oversampling)
  {
    let pos = virtual_to_world(corner.virtual_position(virtual_size));
    commands.spawn((
      Name::new(format!("TubeCorner_{:?}", corner)),
      corner,
      TubePipelineEntity,
      sprite,
      anchor,
      Transform::from_translation(pos.extend(CORNER_Z)).with_scale(scale),
      corner_layers.clone(),
    ));
  }

  filter.virtual_target = virtual_target;
  filter.mask = mask;
  filter.material = material;
  filter.initialized = true;
  info!("Tube: pipeline initialized");
}

/// Blit camera projection: one world unit per real-view pixel, centred.
pub(crate) fn blit_projection(real_size: Vec2) -> Projection {
  Projection::Orthographic(OrthographicProjection {
    near: -1000.0,
    far: 1000.0,
    scale: 1.0,
    viewport_origin: Vec2::new(0.5, 0.5),
    scaling_mode: ScalingMode::Fixed {
      width: real_size.x,
      height: real_size.y,
    },
    area: Rect::default(),
  })
}

/// Creates the virtual screen render target.
fn create_render_target(size: Extent3d, images: &mut Assets<Image>) -> Handle<Image> {
  let mut image = Image {
    texture_descriptor: TextureDescriptor {
      label: Some("tube_virtual_screen"),
      size,
      dimension: TextureDimension::D2,
      format: TextureFormat::Rgba8UnormSrgb,
      mip_level_count: 1,
      sample_count: 1,
      usage: TextureUsages::TEXTURE_BINDING
        | TextureUsages::COPY_DST
        | TextureUsages::RENDER_ATTACHMENT,
      view_formats: &[],
    },
    // The shader blends toward texel centres itself; filtering does the rest.
    sampler: ImageSampler::linear(),
    ..default()
  };
  image.resize(size);
  images.add(image)
}
