use bevy::prelude::*;

pub mod angle;
pub mod config;
pub mod display;
pub mod fixed_math;
pub mod hud;
pub mod render;
pub mod simulation;
pub mod world;

use config::GameConfigPlugin;
use display::DisplayPlugin;
use hud::HudPlugin;
use render::ViewPlugin;
use simulation::SimulationPlugin;

/// Everything the windowed demo runs. Headless apps (tests, tools) can add
/// [`HeadlessGamePlugin`] instead, which leaves out the display and HUD.
pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((HeadlessGamePlugin, DisplayPlugin, HudPlugin));
    }
}

/// Config, simulation and software rendering without any window output.
pub struct HeadlessGamePlugin;

impl Plugin for HeadlessGamePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((GameConfigPlugin, SimulationPlugin, ViewPlugin));
    }
}
