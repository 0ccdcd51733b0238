use std::fmt;
use std::path::Path;

use anyhow::Context;
use bevy::prelude::*;
use bevy_common_assets::ron::RonAssetPlugin;
use serde::{Deserialize, Serialize};

use crate::game::angle::Angle;
use crate::game::fixed_math::FixedNum;
use crate::game::simulation::collision::circle_hits_walls;
use crate::game::simulation::{PlayerState, SimConfig, ViewSettings};
use crate::game::world::WorldGrid;

pub const INITIAL_CONFIG_PATH: &str = "assets/initial_config.ron";

/// Upper bounds that keep every world coordinate, ray length and screen
/// size well inside the fixed-point and `u32` ranges.
pub const MAX_TILE_SIZE: i32 = 1024;
pub const MAX_WORLD_EXTENT: i32 = 65_536;
pub const MAX_SCREEN_SIDE: u32 = 4096;
pub const MAX_DISPLAY_SCALE: u32 = 16;
/// Four turns per second.
pub const MAX_ANGULAR_SPEED: f32 = 262_144.0;

/// Static configuration loaded once at startup: the map and every constant the
/// simulation and renderer are built from. Values are human-friendly floats
/// here and converted to fixed point exactly once, in [`build_world`].
#[derive(Resource, Deserialize, Serialize, Clone, Debug)]
pub struct InitialConfig {
    /// Map rows, top to bottom. `#` is a wall, `.` is floor.
    pub map: Vec<String>,
    /// Tile edge length in world units (pixels).
    pub tile_size: i32,
    /// Horizontal field of view in angle units (65536 = full turn).
    pub fov: u16,
    /// Longest distance a ray travels before the column is treated as open.
    pub max_ray_length: f32,
    /// Coarse ray marching increment.
    pub ray_step: f32,
    /// Sub-steps per coarse step when refining a hit.
    pub ray_refine_steps: u32,
    /// World units per second.
    pub linear_speed: f32,
    /// Angle units per second.
    pub angular_speed: f32,
    pub player_radius: f32,
    /// Starting tile; the player spawns at its center.
    pub player_start: (i32, i32),
    pub player_start_heading: u16,
    pub screen_width: u32,
    pub screen_height: u32,
    /// Width in pixels of the strip rendered from each ray.
    pub column_width: u32,
    /// Window pixels per frame buffer pixel.
    pub display_scale: u32,
    pub show_minimap: bool,
}

impl Default for InitialConfig {
    fn default() -> Self {
        Self {
            map: [
                "########",
                "#......#",
                "#.#.#.##",
                "#.#.#..#",
                "#...##.#",
                "#.#....#",
                "#....#.#",
                "########",
            ]
            .iter()
            .map(|row| row.to_string())
            .collect(),
            tile_size: 8,
            fov: 0x4000,
            max_ray_length: 64.0,
            ray_step: 1.0,
            ray_refine_steps: 8,
            linear_speed: 24.0,
            angular_speed: 16384.0,
            player_radius: 3.0,
            player_start: (1, 6),
            player_start_heading: 0,
            screen_width: 240,
            screen_height: 160,
            column_width: 1,
            display_scale: 4,
            show_minimap: true,
        }
    }
}

impl InitialConfig {
    /// Window size in physical pixels, `None` if it does not fit in `u32`.
    pub fn window_size(&self) -> Option<(u32, u32)> {
        let scale = self.display_scale.max(1);
        Some((self.screen_width.checked_mul(scale)?, self.screen_height.checked_mul(scale)?))
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        ron::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
    }
}

/// Startup configuration that cannot produce a playable world.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    EmptyMap,
    RaggedRow { row: usize, expected: usize, found: usize },
    UnknownTile { row: usize, column: usize, tile: char },
    OpenBorder { x: i32, y: i32 },
    InvalidTileSize(i32),
    StartOutOfBounds { x: i32, y: i32 },
    StartInWall { x: i32, y: i32 },
    RadiusTooLarge { radius: f32, tile_size: i32 },
    InvalidFov(u16),
    InvalidRay(&'static str),
    InvalidScreen { width: u32, height: u32, column_width: u32 },
    /// A number that is NaN or outside what the engine can represent.
    OutOfRange { field: &'static str, value: f64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyMap => write!(f, "map has no tiles"),
            Self::RaggedRow { row, expected, found } => {
                write!(f, "map row {} has {} tiles, expected {}", row, found, expected)
            }
            Self::UnknownTile { row, column, tile } => {
                write!(f, "unknown tile {:?} at row {}, column {}", tile, row, column)
            }
            Self::OpenBorder { x, y } => write!(f, "map border is open at tile ({}, {})", x, y),
            Self::InvalidTileSize(size) => {
                write!(f, "tile size must be between 1 and {}, got {}", MAX_TILE_SIZE, size)
            }
            Self::StartOutOfBounds { x, y } => write!(f, "player start ({}, {}) is outside the map", x, y),
            Self::StartInWall { x, y } => write!(f, "player start ({}, {}) overlaps a wall", x, y),
            Self::RadiusTooLarge { radius, tile_size } => write!(
                f,
                "player radius {} must be positive and below half the tile size {}",
                radius, tile_size
            ),
            Self::InvalidFov(fov) => write!(f, "field of view {:#06x} must be between 0 and a half turn", fov),
            Self::InvalidRay(reason) => write!(f, "invalid ray settings: {}", reason),
            Self::InvalidScreen { width, height, column_width } => write!(
                f,
                "invalid screen {}x{} with column width {}",
                width, height, column_width
            ),
            Self::OutOfRange { field, value } => write!(f, "{} is out of range: {}", field, value),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Everything the frame loop needs, validated and converted to fixed point.
#[derive(Debug, Clone)]
pub struct WorldSetup {
    pub grid: WorldGrid,
    pub sim_config: SimConfig,
    pub player: PlayerState,
}

/// Range-check a config float and convert it to fixed point. NaN fails the
/// range check.
fn fixed_in_range(field: &'static str, value: f32, min: f32, max: f32) -> Result<FixedNum, ConfigError> {
    let out_of_range = || ConfigError::OutOfRange { field, value: value as f64 };
    if !(min..=max).contains(&value) {
        return Err(out_of_range());
    }
    FixedNum::checked_from_num(value).ok_or_else(out_of_range)
}

fn check_upper(field: &'static str, value: u32, max: u32) -> Result<(), ConfigError> {
    if value > max {
        return Err(ConfigError::OutOfRange { field, value: value as f64 });
    }
    Ok(())
}

/// Validate an [`InitialConfig`] and convert it into simulation resources.
///
/// Rejects maps without a solid border and starting positions outside the map
/// or touching a wall, so the frame loop never sees either.
pub fn build_world(config: &InitialConfig) -> Result<WorldSetup, ConfigError> {
    let grid = WorldGrid::from_rows(&config.map, config.tile_size)?;
    grid.validate_border()?;
    let extent = grid.width().max(grid.height()).checked_mul(grid.tile_size());
    if !extent.is_some_and(|e| e <= MAX_WORLD_EXTENT) {
        return Err(ConfigError::OutOfRange {
            field: "map",
            value: grid.width().max(grid.height()) as f64 * grid.tile_size() as f64,
        });
    }

    if config.screen_width == 0 || config.screen_height == 0 || config.column_width == 0 {
        return Err(ConfigError::InvalidScreen {
            width: config.screen_width,
            height: config.screen_height,
            column_width: config.column_width,
        });
    }
    check_upper("screen_width", config.screen_width, MAX_SCREEN_SIDE)?;
    check_upper("screen_height", config.screen_height, MAX_SCREEN_SIDE)?;
    check_upper("display_scale", config.display_scale, MAX_DISPLAY_SCALE)?;
    if config.fov == 0 || config.fov >= Angle::HALF_TURN.0 {
        return Err(ConfigError::InvalidFov(config.fov));
    }
    if !(config.ray_step > 0.0) {
        return Err(ConfigError::InvalidRay("ray_step must be positive"));
    }
    if !(config.max_ray_length >= config.ray_step) {
        return Err(ConfigError::InvalidRay("max_ray_length must be at least one ray_step"));
    }
    if config.ray_refine_steps == 0 {
        return Err(ConfigError::InvalidRay("ray_refine_steps must be at least 1"));
    }
    if !(config.player_radius > 0.0) || config.player_radius * 2.0 >= config.tile_size as f32 {
        return Err(ConfigError::RadiusTooLarge {
            radius: config.player_radius,
            tile_size: config.tile_size,
        });
    }

    let sim_config = SimConfig {
        tile_size: grid.tile_size_fixed(),
        fov: config.fov,
        max_ray_length: fixed_in_range("max_ray_length", config.max_ray_length, 0.0, MAX_WORLD_EXTENT as f32)?,
        ray_step: fixed_in_range("ray_step", config.ray_step, 0.0, MAX_WORLD_EXTENT as f32)?,
        ray_refine_steps: config.ray_refine_steps,
        linear_speed: fixed_in_range("linear_speed", config.linear_speed, 0.0, MAX_WORLD_EXTENT as f32)?,
        angular_speed: fixed_in_range("angular_speed", config.angular_speed, 0.0, MAX_ANGULAR_SPEED)?,
        player_radius: fixed_in_range("player_radius", config.player_radius, 0.0, MAX_TILE_SIZE as f32)?,
        screen_width: config.screen_width,
        screen_height: config.screen_height,
        column_width: config.column_width,
    };
    if sim_config.ray_step.to_bits() < sim_config.ray_refine_steps as i32 {
        return Err(ConfigError::InvalidRay("ray_step is too small to split into ray_refine_steps"));
    }

    let (sx, sy) = config.player_start;
    if !grid.in_bounds(sx, sy) {
        return Err(ConfigError::StartOutOfBounds { x: sx, y: sy });
    }
    let position = grid.tile_center(sx, sy);
    if grid.is_wall(sx, sy) || circle_hits_walls(&grid, position, sim_config.player_radius) {
        return Err(ConfigError::StartInWall { x: sx, y: sy });
    }

    let player = PlayerState {
        position,
        heading: Angle(config.player_start_heading),
    };

    Ok(WorldSetup { grid, sim_config, player })
}

/// Physical key for each logical button.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct KeyBindings {
    pub forward: KeyCode,
    pub backward: KeyCode,
    pub strafe_left: KeyCode,
    pub strafe_right: KeyCode,
    pub turn_left: KeyCode,
    pub turn_right: KeyCode,
    pub toggle_minimap: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: KeyCode::ArrowUp,
            backward: KeyCode::ArrowDown,
            strafe_left: KeyCode::KeyZ,
            strafe_right: KeyCode::KeyX,
            turn_left: KeyCode::ArrowLeft,
            turn_right: KeyCode::ArrowRight,
            toggle_minimap: KeyCode::KeyM,
        }
    }
}

/// Runtime configuration that can be hot-reloaded while the demo runs.
/// Nothing here affects the simulation.
#[derive(Deserialize, Serialize, Asset, TypePath, Clone, Debug, Default)]
pub struct GameConfig {
    pub keys: KeyBindings,
    /// RGB15 colors (components 0..=31), indexed by palette slot.
    pub palette: Vec<[u8; 3]>,
    pub show_fps: bool,
}

#[derive(Resource)]
pub struct GameConfigHandle(pub Handle<GameConfig>);

pub struct GameConfigPlugin;

impl Plugin for GameConfigPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(RonAssetPlugin::<GameConfig>::new(&["game_config.ron"]))
           .add_systems(Startup, (load_initial_config, setup_world, setup_runtime_config).chain())
           .add_systems(Update, log_runtime_config_changes.run_if(resource_exists::<GameConfigHandle>));
    }
}

/// Load static initial configuration synchronously at startup.
/// A config inserted before startup (tests, tools) is kept as is.
fn load_initial_config(mut commands: Commands, existing: Option<Res<InitialConfig>>) {
    if existing.is_some() {
        info!("Using pre-inserted InitialConfig");
        return;
    }

    match InitialConfig::load(INITIAL_CONFIG_PATH) {
        Ok(config) => {
            info!("Loaded initial config from {}", INITIAL_CONFIG_PATH);
            commands.insert_resource(config);
        }
        Err(e) => {
            error!("{:#}", e);
            error!("Using default InitialConfig");
            commands.insert_resource(InitialConfig::default());
        }
    }
}

/// Turn the initial config into the world, the player and [`SimConfig`].
/// An invalid config ends the app before the first frame.
pub fn setup_world(
    mut commands: Commands,
    config: Res<InitialConfig>,
    mut exit: MessageWriter<AppExit>,
) {
    match build_world(&config) {
        Ok(setup) => {
            info!(
                "World ready: {}x{} tiles of {} units, player at tile {:?} heading {:#06x}",
                setup.grid.width(),
                setup.grid.height(),
                setup.grid.tile_size(),
                config.player_start,
                setup.player.heading.0,
            );
            commands.insert_resource(setup.grid);
            commands.insert_resource(setup.sim_config);
            commands.insert_resource(setup.player);
            commands.insert_resource(ViewSettings { show_minimap: config.show_minimap });
        }
        Err(e) => {
            error!("Invalid initial config: {}", e);
            exit.write(AppExit::error());
        }
    }
}

/// Load runtime configuration asynchronously (can be hot-reloaded).
fn setup_runtime_config(mut commands: Commands, asset_server: Res<AssetServer>) {
    let handle = asset_server.load("game_config.ron");
    commands.insert_resource(GameConfigHandle(handle));
}

/// Log runtime config loads and reloads.
fn log_runtime_config_changes(
    config_handle: Res<GameConfigHandle>,
    mut events: MessageReader<AssetEvent<GameConfig>>,
) {
    for event in events.read() {
        if event.is_modified(config_handle.0.id()) || event.is_loaded_with_dependencies(config_handle.0.id()) {
            info!("Runtime config loaded/updated (key bindings, palette)");
        }
    }
}
