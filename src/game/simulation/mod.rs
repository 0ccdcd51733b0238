/// Simulation layer - deterministic per-frame game logic.
///
/// This module is organized into:
/// - **resources**: Fixed-point engine constants and view toggles
/// - **clock**: The 16-bit hardware tick counter and frame timing
/// - **collision**: Circle-versus-tile collision and per-axis clamping
/// - **player**: Player state, input sampling and movement

use bevy::prelude::*;

use crate::game::angle::SinLut;
use crate::game::config::{GameConfig, GameConfigHandle, KeyBindings};
use crate::game::world::WorldGrid;

// Module declarations
pub mod resources;
pub mod clock;
pub mod collision;
pub mod player;

// Re-export commonly used items
pub use resources::*;
pub use clock::{FrameClock, TIMER_HZ};
pub use player::{InputState, LogicalButton, PlayerState};

/// Stages of one frame, run in this order every `Update`.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum FrameSet {
    Clock,    // Sample the tick counter
    Input,    // Poll buttons into InputState
    Movement, // Rotate, then move and collide the player
    Render,   // Cast rays and draw into the back page
    Present,  // Flip pages and hand the front page to the display
}

/// Main simulation plugin
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FrameClock>();
        app.init_resource::<InputState>();
        app.init_resource::<ViewSettings>();
        app.init_resource::<SinLut>();

        app.configure_sets(Update, (
            FrameSet::Clock,
            FrameSet::Input,
            FrameSet::Movement,
            FrameSet::Render,
            FrameSet::Present,
        ).chain());

        app.add_systems(Update, (
            clock::sample_frame_clock.in_set(FrameSet::Clock),
            read_input.in_set(FrameSet::Input),
            update_player
                .in_set(FrameSet::Movement)
                .run_if(resource_exists::<WorldGrid>)
                .run_if(resource_exists::<PlayerState>),
        ));
    }
}

impl KeyBindings {
    pub fn key_for(&self, button: LogicalButton) -> KeyCode {
        match button {
            LogicalButton::Forward => self.forward,
            LogicalButton::Backward => self.backward,
            LogicalButton::StrafeLeft => self.strafe_left,
            LogicalButton::StrafeRight => self.strafe_right,
            LogicalButton::TurnLeft => self.turn_left,
            LogicalButton::TurnRight => self.turn_right,
        }
    }
}

/// Sample the held buttons once per frame and handle the minimap toggle.
/// Uses the hot-reloadable bindings once they are loaded, defaults before.
pub fn read_input(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    config_handle: Option<Res<GameConfigHandle>>,
    game_configs: Option<Res<Assets<GameConfig>>>,
    mut input: ResMut<InputState>,
    mut view: ResMut<ViewSettings>,
) {
    let Some(keys) = keys else {
        *input = InputState::default();
        return;
    };

    let loaded = config_handle
        .as_ref()
        .zip(game_configs.as_ref())
        .and_then(|(handle, configs)| configs.get(&handle.0));
    let default_bindings = KeyBindings::default();
    let bindings = loaded.map(|config| &config.keys).unwrap_or(&default_bindings);

    *input = InputState::poll(|button| keys.pressed(bindings.key_for(button)));

    if keys.just_pressed(bindings.toggle_minimap) {
        view.show_minimap = !view.show_minimap;
        info!("Minimap {}", if view.show_minimap { "shown" } else { "hidden" });
    }
}

/// Apply this frame's input to the player.
pub fn update_player(
    clock: Res<FrameClock>,
    input: Res<InputState>,
    grid: Res<WorldGrid>,
    trig: Res<SinLut>,
    config: Res<SimConfig>,
    mut player: ResMut<PlayerState>,
) {
    if input.is_idle() {
        return;
    }
    player.update(clock.dt, &input, &grid, trig.as_ref(), &config);
    trace!(
        "Player at ({}, {}) heading {:#06x}",
        player.position.x,
        player.position.y,
        player.heading.0
    );
}
