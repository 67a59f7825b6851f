//! Test pattern on the virtual screen: a checkerboard and random lines.

use bevy::{prelude::*, sprite::Anchor};
use bevy_tube::{TubeSettings, TubeSourceCamera, virtual_to_world};
use rand::Rng;

/// Side length of a checkerboard square in virtual pixels.
const CELL_SIZE: u32 = 16;

/// Lines are cleared every this many frames.
const LINE_CLEAR_INTERVAL: u64 = 60;

const BACKGROUND: Color = Color::srgb(0.0, 0.0, 1.0);
const CELL_COLOR: Color = Color::srgb(1.0, 0.0, 0.0);

/// Lines drawn since the last clear.
#[derive(Resource, Default)]
pub struct LineHistory {
  pub lines: Vec<(Vec2, Vec2, Color)>,
  pub frame: u64,
}

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
  fn build(&self, app: &mut App) {
    app
      .init_resource::<LineHistory>()
      .add_systems(Startup, spawn_scene)
      .add_systems(Update, (add_random_line, draw_lines).chain());
  }
}

/// Top-left corners of the red squares, row by row.
///
/// Even rows start at column 0, odd rows at column 1.
pub fn checkerboard_cells(virtual_size: UVec2, cell: u32) -> Vec<UVec2> {
  let cols = virtual_size.x / cell;
  let rows = virtual_size.y / cell;
  (0..rows)
    .flat_map(|row| {
      (row % 2..cols)
        .step_by(2)
        .map(move |col| UVec2::new(col * cell, row * cell))
    })
    .collect()
}

/// Cycles cyan, magenta, yellow.
pub fn line_color(frame: u64) -> Color {
  let rgb = (0xff_ff00_ffff_u64 >> ((frame % 3) * 8)) & 0xff_ffff;
  Color::srgb_u8((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

fn spawn_scene(mut commands: Commands, settings: Res<TubeSettings>) {
  commands.spawn((
    Name::new("SourceCamera"),
    Camera2d,
    Camera {
      clear_color: ClearColorConfig::Custom(BACKGROUND),
      ..default()
    },
    TubeSourceCamera,
  ));

  let virtual_size = UVec2::new(settings.virtual_width, settings.virtual_height);
  let cell = Vec2::splat(CELL_SIZE as f32);
  for pos in checkerboard_cells(virtual_size, CELL_SIZE) {
    commands.spawn((
      Sprite::from_color(CELL_COLOR, cell),
      Anchor::TOP_LEFT,
      Transform::from_translation(virtual_to_world(pos.as_vec2()).extend(0.0)),
    ));
  }
}

fn add_random_line(mut history: ResMut<LineHistory>, settings: Res<TubeSettings>) {
  if history.frame % LINE_CLEAR_INTERVAL == 0 {
    history.lines.clear();
  }

  let mut rng = rand::rng();
  let mut point = || {
    Vec2::new(
      rng.random_range(0..settings.virtual_width) as f32,
      rng.random_range(0..settings.virtual_height) as f32,
    )
  };
  let from = point();
  let to = point();

  let color = line_color(history.frame);
  history.lines.push((from, to, color));
  history.frame += 1;
}

fn draw_lines(history: Res<LineHistory>, mut gizmos: Gizmos) {
  for (from, to, color) in &history.lines {
    gizmos.line_2d(virtual_to_world(*from), virtual_to_world(*to), *color);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn checkerboard_alternates_rows() {
    let cells = checkerboard_cells(UVec2::new(256, 224), 16);
    // 14 rows of 8 squares
    assert_eq!(cells.len(), 112);
    assert_eq!(cells[0], UVec2::new(0, 0));
    assert_eq!(cells[8], UVec2::new(16, 16));
    assert!(cells.iter().all(|c| (c.x / 16 + c.y / 16) % 2 == 0));
  }

  #[test]
  fn line_colors_cycle() {
    assert_eq!(line_color(0), Color::srgb_u8(0, 255, 255));
    assert_eq!(line_color(1), Color::srgb_u8(255, 0, 255));
    assert_eq!(line_color(2), Color::srgb_u8(255, 255, 0));
    assert_eq!(line_color(3), line_color(0));
  }
}
