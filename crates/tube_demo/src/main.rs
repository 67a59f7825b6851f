mod config;
mod console;
mod cursor;
mod scene;

use bevy::{prelude::*, window::WindowResolution};
use bevy_tube::TubePlugin;

fn main() {
  let config = config::DemoConfig::load();

  App::new()
    .add_plugins(
      DefaultPlugins
        .set(ImagePlugin::default_nearest())
        .set(WindowPlugin {
          primary_window: Some(Window {
            resolution: WindowResolution::new(config.window.width, config.window.height),
            title: config.window.title.clone(),
            ..default()
          }),
          ..default()
        })
        .disable::<bevy::pbr::PbrPlugin>(),
    )
    .add_plugins(TubePlugin::new(config.tube.to_settings()))
    .add_plugins(config::ConfigPlugin)
    .add_plugins(scene::ScenePlugin)
    .add_plugins(cursor::CursorPlugin)
    .add_plugins(console::ConsoleCommandsPlugin)
    .run();
}
