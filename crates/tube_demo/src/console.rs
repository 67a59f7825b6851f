//! Developer console commands for tuning the tube at runtime.
//!
//! Toggle with the backtick key.

use bevy::prelude::*;
use bevy_console::{AddConsoleCommand, ConsoleCommand, ConsolePlugin, reply};
use bevy_egui::EguiPlugin;
use bevy_tube::{TubeFilter, TubeSettings};
use clap::Parser;

#[derive(Parser, ConsoleCommand)]
#[command(name = "curve")]
pub struct CurveCommand {
  /// Curvature in virtual pixels
  px: f32,
}

#[derive(Parser, ConsoleCommand)]
#[command(name = "margin")]
pub struct MarginCommand {
  /// Share of the window left around the tube, in [0, 1)
  ratio: f32,
}

pub struct ConsoleCommandsPlugin;

impl Plugin for ConsoleCommandsPlugin {
  fn build(&self, app: &mut App) {
    if !app.is_plugin_added::<EguiPlugin>() {
      app.add_plugins(EguiPlugin::default());
    }
    app
      .add_plugins(ConsolePlugin)
      .add_console_command::<CurveCommand, _>(curve_command)
      .add_console_command::<MarginCommand, _>(margin_command);
  }
}

fn curve_command(
  mut log: ConsoleCommand<CurveCommand>,
  mut filter: ResMut<TubeFilter>,
  mut settings: ResMut<TubeSettings>,
) {
  if let Some(Ok(CurveCommand { px })) = log.take() {
    match filter.set_curve(px) {
      Ok(()) => {
        settings.curve = px;
        reply!(log, "Curve set to {}px", px);
      }
      Err(e) => reply!(log, "{}", e),
    }
  }
}

fn margin_command(
  mut log: ConsoleCommand<MarginCommand>,
  mut filter: ResMut<TubeFilter>,
  mut settings: ResMut<TubeSettings>,
) {
  if let Some(Ok(MarginCommand { ratio })) = log.take() {
    let real_size = filter.geometry().real_size();
    match filter.resize(real_size.x, real_size.y, ratio) {
      Ok(()) => {
        settings.margin_ratio = ratio;
        reply!(log, "Margin set to {}", ratio);
      }
      Err(e) => reply!(log, "{}", e),
    }
  }
}
