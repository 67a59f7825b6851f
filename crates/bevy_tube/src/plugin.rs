//! Tube filter plugin.

use bevy::{prelude::*, sprite_render::Material2dPlugin, transform::TransformSystems};

use crate::config::TubeSettings;
use crate::material::TubeMaterial;
use crate::setup::setup_tube;
use crate::state::TubeFilter;
use crate::systems::{invalidate, tube_handle_window_resize, tube_sync_geometry};

/// Curved CRT screen for a low-resolution virtual screen.
///
/// Mark the camera that draws the game with
/// [`TubeSourceCamera`](crate::TubeSourceCamera); the plugin redirects it
/// into a render target of the virtual resolution and draws that target onto
/// the window with curvature, a shadow mask and rounded corners.
#[derive(Default)]
pub struct TubePlugin {
  pub settings: TubeSettings,
}

impl TubePlugin {
  pub fn new(settings: TubeSettings) -> Self {
    Self { settings }
  }
}

/// Per-frame tube systems, after game logic and before transform propagation.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct TubeSet;

/// Run condition: tube pipeline is set up.
pub fn tube_initialized(filter: Res<TubeFilter>) -> bool {
  filter.initialized
}

impl Plugin for TubePlugin {
  fn build(&self, app: &mut App) {
    let settings = match self.settings.validate() {
      Ok(()) => self.settings.clone(),
      Err(e) => {
        error!("Tube: invalid settings ({}), using defaults", e);
        TubeSettings::default()
      }
    };

    // Until the window is known, the virtual screen maps onto itself.
    let filter = TubeFilter::new(&settings, settings.virtual_size());
    app.insert_resource(settings);
    app.insert_resource(filter);

    // Coordinate translation still works headless
    if !app.is_plugin_added::<bevy::render::RenderPlugin>() {
      return;
    }

    bevy::asset::embedded_asset!(app, "shaders/tube.wgsl");
    app.add_plugins(Material2dPlugin::<TubeMaterial>::default());

    app.configure_sets(PostUpdate, TubeSet.before(TransformSystems::Propagate));

    app.add_systems(Update, setup_tube.run_if(not(tube_initialized)));

    app.add_systems(
      PostUpdate,
      (
        tube_handle_window_resize,
        tube_sync_geometry.run_if(resource_changed::<TubeFilter>),
        invalidate,
      )
        .chain()
        .in_set(TubeSet)
        .run_if(tube_initialized),
    );
  }
}
