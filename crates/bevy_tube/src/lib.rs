//! Tube (CRT screen) filter for Bevy 0.17.
//!
//! Renders a low-resolution virtual screen into a texture and draws it onto
//! the window as a curved CRT tube:
//!
//! - Barrel curvature with a configurable strength in virtual pixels
//! - Shadow mask and scanlines from a generated (or custom) mask texture
//! - Rounded screen corners
//! - Aspect-preserving fit with a margin, refitted on window resize
//!
//! # Usage
//!
//! ```ignore
//! use bevy::prelude::*;
//! use bevy_tube::{TubePlugin, TubeSettings, TubeSourceCamera};
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(TubePlugin::new(TubeSettings {
//!             virtual_width: 256,
//!             virtual_height: 224,
//!             ..default()
//!         }))
//!         .add_systems(Startup, setup)
//!         .run();
//! }
//!
//! fn setup(mut commands: Commands) {
//!     // Draws the rectangle (0, 0)..(256, -224) in world space.
//!     commands.spawn((Camera2d, TubeSourceCamera));
//! }
//! ```
//!
//! Pointer input on the window maps back onto the virtual screen with
//! [`TubeFilter::translate_pos`] or [`TubeFilter::cursor_position`].

pub mod components;
pub mod config;
pub mod corners;
pub mod geometry;
pub mod mask;
pub mod material;
pub mod plugin;
pub mod rgba;
pub mod setup;
pub mod state;
pub mod systems;

pub use components::{
  TubeBlitCamera, TubeBlitQuad, TubeInvalidator, TubePipelineEntity, TubeSourceCamera,
};
pub use config::{DEFAULT_TUBE_LAYER, TubeConfig, TubeConfigError, TubeSettings};
pub use corners::{TubeCorner, corner_round_image, corner_round_sprites};
pub use geometry::TubeGeometry;
pub use mask::{CrtMaskParams, create_crt_mask, crt_mask_image};
pub use material::{TubeMaterial, TubeUniform};
pub use plugin::{TubePlugin, TubeSet, tube_initialized};
pub use rgba::Rgba;
pub use setup::{TUBE_BLIT_ORDER, setup_tube};
pub use state::{TubeFilter, real_to_blit_world, virtual_to_world};
pub use systems::{invalidate, tube_handle_window_resize, tube_sync_geometry};
