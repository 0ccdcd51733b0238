/// Resource definitions for the simulation.

use bevy::prelude::*;
use crate::game::fixed_math::FixedNum;

// ============================================================================
// Simulation Configuration
// ============================================================================

/// Engine constants in fixed point, built once from
/// [`InitialConfig`](crate::game::config::InitialConfig).
///
/// The config file is user-facing and uses floats; this is the single point
/// where they become [`FixedNum`], so every system downstream sees identical
/// bit patterns no matter where it runs.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct SimConfig {
    /// Tile edge length, also the scan step of the collision resolver.
    pub tile_size: FixedNum,
    /// Field of view in angle units.
    pub fov: u16,
    pub max_ray_length: FixedNum,
    pub ray_step: FixedNum,
    pub ray_refine_steps: u32,
    /// World units per second.
    pub linear_speed: FixedNum,
    /// Angle units per second.
    pub angular_speed: FixedNum,
    pub player_radius: FixedNum,
    pub screen_width: u32,
    pub screen_height: u32,
    pub column_width: u32,
}

// ============================================================================
// View Settings
// ============================================================================

/// Runtime view toggles.
#[derive(Resource, Debug, Clone)]
pub struct ViewSettings {
    pub show_minimap: bool,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self { show_minimap: true }
    }
}
