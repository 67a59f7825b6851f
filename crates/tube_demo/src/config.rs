//! Demo config: startup load plus hot reload of the tube curve and margin.

use bevy::{asset::AssetEvent, ecs::message::MessageReader, prelude::*, reflect::TypePath};
use bevy_common_assets::toml::TomlAssetPlugin;
use bevy_tube::{TubeConfig, TubeConfigError, TubeFilter, TubeSettings};
use serde::Deserialize;

pub const CONFIG_PATH: &str = "config/tube.config.toml";

#[derive(Asset, TypePath, Deserialize, Debug, Clone)]
pub struct DemoConfig {
  pub window: WindowConfig,
  #[serde(default)]
  pub tube: TubeConfig,
}

#[derive(Deserialize, Debug, Clone)]
pub struct WindowConfig {
  pub width: u32,
  pub height: u32,
  pub title: String,
}

impl DemoConfig {
  pub fn from_toml(source: &str) -> Result<Self, TubeConfigError> {
    let config: Self = toml::from_str(source).map_err(TubeConfigError::Parse)?;
    config.tube.to_settings().validate()?;
    Ok(config)
  }

  /// Reads the config from the assets directory.
  pub fn load() -> Self {
    let source = std::fs::read_to_string(format!("assets/{}", CONFIG_PATH))
      .expect("Failed to read config file");
    Self::from_toml(&source).expect("Failed to parse config file")
  }
}

#[derive(Resource)]
struct ConfigHandle(Handle<DemoConfig>);

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
  fn build(&self, app: &mut App) {
    app
      .add_plugins(TomlAssetPlugin::<DemoConfig>::new(&["config.toml"]))
      .add_systems(Startup, watch_config_file)
      .add_systems(Update, apply_config_changes);
  }
}

fn watch_config_file(mut commands: Commands, asset_server: Res<AssetServer>) {
  let handle: Handle<DemoConfig> = asset_server.load(CONFIG_PATH);
  commands.insert_resource(ConfigHandle(handle));
}

fn apply_config_changes(
  config_handle: Option<Res<ConfigHandle>>,
  mut messages: MessageReader<AssetEvent<DemoConfig>>,
  configs: Res<Assets<DemoConfig>>,
  mut settings: ResMut<TubeSettings>,
  mut filter: ResMut<TubeFilter>,
) {
  let Some(config_handle) = config_handle else {
    return;
  };

  for event in messages.read() {
    let AssetEvent::Modified { id } = event else {
      continue;
    };
    if config_handle.0.id() != *id {
      continue;
    }
    let Some(config) = configs.get(&config_handle.0) else {
      continue;
    };

    let tube = config.tube.to_settings();
    if let Err(e) = tube.validate() {
      error!("Config reload rejected: {}", e);
      continue;
    }

    if tube.virtual_size() != settings.virtual_size() {
      warn!("Config reload: virtual screen size takes effect on restart");
    }

    let real_size = filter.geometry().real_size();
    let applied = filter
      .set_curve(tube.curve)
      .and_then(|()| filter.resize(real_size.x, real_size.y, tube.margin_ratio));
    match applied {
      Ok(()) => {
        settings.curve = tube.curve;
        settings.margin_ratio = tube.margin_ratio;
        info!(
          "Config reloaded: curve {} margin {}",
          tube.curve, tube.margin_ratio
        );
      }
      Err(e) => error!("Config reload rejected: {}", e),
    }
  }
}
