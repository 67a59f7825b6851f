//! E2E test for tube pipeline construction.
//!
//! Runs `setup_tube` headless against a primary window and a source camera,
//! then checks the entities and assets it creates.
//!
//! Run: cargo test -p bevy_tube --test tube_setup_e2e

use bevy::camera::RenderTarget;
use bevy::prelude::*;
use bevy::sprite::Anchor;
use bevy::window::PrimaryWindow;
use bevy_tube::{
  TUBE_BLIT_ORDER, TubeBlitCamera, TubeCorner, TubeFilter, TubeInvalidator, TubeMaterial,
  TubePlugin, TubeSettings, TubeSourceCamera, real_to_blit_world, setup_tube, virtual_to_world,
};

const WINDOW_SIZE: Vec2 = Vec2::new(800.0, 600.0);

/// Headless app with the assets setup needs; the plugin is added last so a
/// custom mask can be created first.
fn create_test_app() -> App {
  let mut app = App::new();
  app.add_plugins(MinimalPlugins);
  app.add_plugins(bevy::asset::AssetPlugin::default());

  // Normally registered by the render and sprite plugins
  app.init_asset::<Image>();
  app.init_asset::<Mesh>();
  app.init_asset::<TubeMaterial>();

  let mut window = Window::default();
  window.resolution.set(WINDOW_SIZE.x, WINDOW_SIZE.y);
  app.world_mut().spawn((window, PrimaryWindow));

  app
}

fn finish(mut app: App, settings: TubeSettings, camera_order: isize) -> App {
  app.add_plugins(TubePlugin::new(settings));
  app.add_systems(Update, setup_tube);
  app.world_mut().spawn((
    Camera2d,
    Camera {
      order: camera_order,
      ..default()
    },
    TubeSourceCamera,
  ));
  app.update();
  app
}

#[test]
fn setup_initializes_filter_and_fits_window() {
  let app = finish(create_test_app(), TubeSettings::default(), 0);

  let filter = app.world().resource::<TubeFilter>();
  assert!(filter.initialized, "setup should mark the filter initialized");
  assert_eq!(filter.geometry().real_size(), WINDOW_SIZE);

  let materials = app.world().resource::<Assets<TubeMaterial>>();
  let material = materials.get(&filter.material).expect("Material should exist");
  assert_eq!(material.uniforms, filter.geometry().uniform());
  assert_eq!(material.source_image, filter.virtual_target);
  assert_eq!(material.mask, filter.mask);
}

#[test]
fn source_camera_renders_into_virtual_target() {
  let mut app = finish(create_test_app(), TubeSettings::default(), 50);

  let virtual_target = app.world().resource::<TubeFilter>().virtual_target.clone();
  let image_size = app
    .world()
    .resource::<Assets<Image>>()
    .get(&virtual_target)
    .expect("Render target should exist")
    .size();
  assert_eq!(image_size, UVec2::new(256, 224));

  let mut cameras = app
    .world_mut()
    .query_filtered::<&Camera, With<TubeSourceCamera>>();
  let camera = cameras.single(app.world()).expect("one source camera");
  let RenderTarget::Image(target) = &camera.target else {
    panic!("source camera should render to an image, got {:?}", camera.target);
  };
  assert_eq!(target.handle, virtual_target);
  assert!(
    camera.order < TUBE_BLIT_ORDER,
    "source order {} should be below blit order {}",
    camera.order,
    TUBE_BLIT_ORDER
  );

  let mut blit = app
    .world_mut()
    .query_filtered::<&Camera, With<TubeBlitCamera>>();
  let blit = blit.single(app.world()).expect("one blit camera");
  assert_eq!(blit.order, TUBE_BLIT_ORDER);
}

#[test]
fn corners_pin_to_virtual_screen_corners() {
  let mut app = finish(create_test_app(), TubeSettings::default(), 0);
  let virtual_size = Vec2::new(256.0, 224.0);

  let mut corners = app
    .world_mut()
    .query::<(&TubeCorner, &Transform, &Anchor, &Sprite)>();
  let found: Vec<_> = corners
    .iter(app.world())
    .map(|(corner, transform, anchor, sprite)| (*corner, *transform, *anchor, sprite.rect))
    .collect();
  assert_eq!(found.len(), 4);

  for (corner, transform, anchor, rect) in found {
    let (virtual_pos, expected_anchor) = match corner {
      TubeCorner::TopLeft => (Vec2::ZERO, Anchor::TOP_LEFT),
      TubeCorner::TopRight => (Vec2::new(256.0, 0.0), Anchor::TOP_RIGHT),
      TubeCorner::BottomLeft => (Vec2::new(0.0, 224.0), Anchor::BOTTOM_LEFT),
      TubeCorner::BottomRight => (virtual_size, Anchor::BOTTOM_RIGHT),
    };
    assert_eq!(
      transform.translation.truncate(),
      virtual_to_world(virtual_pos),
      "{:?}",
      corner
    );
    assert_eq!(anchor, expected_anchor, "{:?}", corner);
    // 16px corner oversampled 4x, shown at quarter scale
    assert_eq!(rect.map(|r| r.size()), Some(Vec2::splat(64.0)));
    assert_eq!(transform.scale.truncate(), Vec2::splat(0.25));
  }
}

#[test]
fn invalidators_start_at_view_corners() {
  let mut app = finish(create_test_app(), TubeSettings::default(), 0);

  let mut invalidators = app
    .world_mut()
    .query::<(&TubeInvalidator, &Transform)>();
  let found: Vec<_> = invalidators
    .iter(app.world())
    .map(|(invalidator, transform)| (*invalidator, transform.translation.truncate()))
    .collect();
  assert_eq!(found.len(), 2);

  for (invalidator, pos) in found {
    let expected = match invalidator {
      TubeInvalidator::Origin => Vec2::ZERO,
      TubeInvalidator::FarCorner => WINDOW_SIZE - Vec2::ONE,
    };
    assert_eq!(pos, real_to_blit_world(expected, WINDOW_SIZE), "{:?}", invalidator);
  }
}

#[test]
fn custom_mask_replaces_generated_one() {
  let mut app = create_test_app();
  let mask = app
    .world_mut()
    .resource_mut::<Assets<Image>>()
    .add(Image::default());
  let image_count = app.world().resource::<Assets<Image>>().len();

  let settings = TubeSettings {
    mask: Some(mask.clone()),
    ..default()
  };
  let app = finish(app, settings, 0);

  let filter = app.world().resource::<TubeFilter>();
  assert_eq!(filter.mask, mask);
  let materials = app.world().resource::<Assets<TubeMaterial>>();
  let material = materials.get(&filter.material).expect("Material should exist");
  assert_eq!(material.mask, mask);

  // Virtual target and corner texture only, no generated mask
  let images = app.world().resource::<Assets<Image>>();
  assert_eq!(images.len(), image_count + 2);
}

#[test]
fn generated_mask_is_used_by_default() {
  let app = finish(create_test_app(), TubeSettings::default(), 0);

  let filter = app.world().resource::<TubeFilter>();
  let images = app.world().resource::<Assets<Image>>();
  let mask = images.get(&filter.mask).expect("generated mask should exist");
  assert_eq!(mask.size(), UVec2::new(32, 32));
}
