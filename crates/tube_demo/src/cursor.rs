//! Shows where the window cursor lands on the virtual screen.

use bevy::{prelude::*, sprite::Anchor, window::PrimaryWindow};
use bevy_egui::{
  EguiContext, EguiContexts, EguiPlugin, EguiPrimaryContextPass, PrimaryEguiContext, egui,
};
use bevy_tube::{TubeBlitCamera, TubeFilter, TubeSettings, tube_initialized, virtual_to_world};

const MARKER_Z: f32 = 10.0;

/// Virtual pixel under the cursor, if it is on the virtual screen.
#[derive(Resource, Default)]
pub struct VirtualCursor(pub Option<Vec2>);

#[derive(Component)]
struct CursorMarker;

/// Egui context sits on the blit camera.
#[derive(Resource, Default)]
struct EguiMoved(bool);

pub struct CursorPlugin;

impl Plugin for CursorPlugin {
  fn build(&self, app: &mut App) {
    if !app.is_plugin_added::<EguiPlugin>() {
      app.add_plugins(EguiPlugin::default());
    }
    app
      .init_resource::<VirtualCursor>()
      .init_resource::<EguiMoved>()
      .add_systems(Startup, spawn_marker)
      .add_systems(Update, (track_cursor, move_marker).chain())
      .add_systems(
        PostUpdate,
        move_egui_to_blit_camera
          .run_if(tube_initialized)
          .run_if(|moved: Res<EguiMoved>| !moved.0),
      )
      .add_systems(EguiPrimaryContextPass, render_cursor_ui);
  }
}

/// Whether `pos` is a pixel of a virtual screen of `size`.
pub fn on_screen(pos: Vec2, size: Vec2) -> bool {
  pos.cmpge(Vec2::ZERO).all() && pos.cmplt(size).all()
}

fn spawn_marker(mut commands: Commands) {
  commands.spawn((
    Name::new("CursorMarker"),
    CursorMarker,
    Sprite::from_color(Color::WHITE, Vec2::ONE),
    Anchor::TOP_LEFT,
    Transform::from_xyz(0.0, 0.0, MARKER_Z),
    Visibility::Hidden,
  ));
}

fn track_cursor(
  filter: Res<TubeFilter>,
  settings: Res<TubeSettings>,
  windows: Query<&Window, With<PrimaryWindow>>,
  mut cursor: ResMut<VirtualCursor>,
) {
  let pos = windows
    .single()
    .ok()
    .and_then(|window| filter.cursor_position(window))
    .filter(|pos| on_screen(*pos, settings.virtual_size()));

  if cursor.0 != pos {
    cursor.0 = pos;
  }
}

fn move_marker(
  cursor: Res<VirtualCursor>,
  mut markers: Query<(&mut Transform, &mut Visibility), With<CursorMarker>>,
) {
  if !cursor.is_changed() {
    return;
  }

  for (mut transform, mut visibility) in markers.iter_mut() {
    match cursor.0 {
      Some(pos) => {
        let world = virtual_to_world(pos);
        transform.translation.x = world.x;
        transform.translation.y = world.y;
        *visibility = Visibility::Inherited;
      }
      None => *visibility = Visibility::Hidden,
    }
  }
}

/// Moves egui off the source camera so the UI is drawn on the window, not
/// inside the curved virtual screen.
fn move_egui_to_blit_camera(
  mut commands: Commands,
  source_cameras: Query<Entity, (With<EguiContext>, Without<TubeBlitCamera>)>,
  blit_cameras: Query<Entity, (With<TubeBlitCamera>, Without<EguiContext>)>,
  mut moved: ResMut<EguiMoved>,
) {
  let Ok(blit) = blit_cameras.single() else {
    return;
  };

  for entity in source_cameras.iter() {
    commands
      .entity(entity)
      .remove::<EguiContext>()
      .remove::<PrimaryEguiContext>();
  }
  commands
    .entity(blit)
    .insert((EguiContext::default(), PrimaryEguiContext));

  moved.0 = true;
  info!("Tube: egui moved to the blit camera");
}

fn render_cursor_ui(mut contexts: EguiContexts, cursor: Res<VirtualCursor>, filter: Res<TubeFilter>) {
  let Ok(ctx) = contexts.ctx_mut() else {
    return;
  };
  egui::Window::new("Tube")
    .anchor(egui::Align2::LEFT_TOP, [10.0, 10.0])
    .title_bar(false)
    .resizable(false)
    .movable(false)
    .frame(egui::Frame::NONE.fill(egui::Color32::from_rgba_unmultiplied(20, 20, 25, 200)))
    .show(ctx, |ui| {
      let geometry = filter.geometry();
      ui.label(format!("curve {:.1}px", geometry.curve()));
      ui.label(format!("margin {:.3}", geometry.margin_ratio()));
      match cursor.0 {
        Some(pos) => ui.label(format!("cursor {}, {}", pos.x, pos.y)),
        None => ui.label("cursor -"),
      };
    });
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn on_screen_is_half_open() {
    let size = Vec2::new(256.0, 224.0);
    assert!(on_screen(Vec2::ZERO, size));
    assert!(on_screen(Vec2::new(255.0, 223.0), size));
    assert!(!on_screen(Vec2::new(256.0, 0.0), size));
    assert!(!on_screen(Vec2::new(0.0, -1.0), size));
  }
}
