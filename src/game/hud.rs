use bevy::prelude::*;

use crate::game::config::{GameConfig, GameConfigHandle};
use crate::game::simulation::{FrameClock, FrameSet};

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_hud)
           .add_systems(Update, update_fps_text.after(FrameSet::Clock));
    }
}

#[derive(Component)]
pub struct FpsText;

fn setup_hud(mut commands: Commands) {
    commands.spawn((
        Text::new("FPS: --"),
        TextFont { font_size: 18.0, ..default() },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(10.0),
            bottom: Val::Px(10.0),
            ..default()
        },
        FpsText,
    ));
}

/// Shown until the runtime config says otherwise.
fn update_fps_text(
    clock: Res<FrameClock>,
    config_handle: Option<Res<GameConfigHandle>>,
    game_configs: Res<Assets<GameConfig>>,
    mut query: Query<(&mut Text, &mut Visibility), With<FpsText>>,
) {
    let show = config_handle
        .and_then(|handle| game_configs.get(&handle.0).map(|config| config.show_fps))
        .unwrap_or(true);

    for (mut text, mut visibility) in query.iter_mut() {
        visibility.set_if_neq(if show { Visibility::Inherited } else { Visibility::Hidden });
        if show && clock.is_changed() {
            text.0 = format!("FPS: {}", clock.fps);
        }
    }
}
