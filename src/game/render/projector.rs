use bevy::prelude::*;

use crate::game::fixed_math::{checked_div, to_fixed, to_int};
use crate::game::simulation::SimConfig;

use super::framebuffer::{palette_index, RenderTarget};
use super::raycaster::{RayHit, WallFace};

/// Screen-space wall strip for one ray.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallSlice {
    pub x0: i32,
    pub x1: i32,
    pub top: i32,
    pub bottom: i32,
    pub color: u8,
}

/// Wall height on screen for a corrected distance: a wall one tile away
/// fills the screen. Degenerate distances (zero after correction, or so
/// small the quotient overflows) also fill the screen.
fn wall_height(hit: &RayHit, config: &SimConfig) -> i32 {
    let screen_height = config.screen_height as i32;
    let height = checked_div(hit.distance, config.tile_size)
        .and_then(|tiles| checked_div(to_fixed(screen_height), tiles));

    match height {
        Some(height) => to_int(height).clamp(0, screen_height),
        None => {
            debug!(
                "Degenerate projection for column {} at distance {}, using full height",
                hit.column, hit.distance
            );
            screen_height
        }
    }
}

/// Project a ray onto the screen. `None` for rays that hit nothing.
pub fn project(hit: &RayHit, config: &SimConfig) -> Option<WallSlice> {
    let face = hit.hit?;
    let height = wall_height(hit, config);
    let top = ((config.screen_height as i32 - height) / 2).max(0);
    let x0 = hit.column as i32;

    Some(WallSlice {
        x0,
        x1: (x0 + config.column_width as i32).min(config.screen_width as i32),
        top,
        bottom: top + height,
        color: match face {
            WallFace::EastWest => palette_index::WALL,
            WallFace::NorthSouth => palette_index::WALL_SHADE,
        },
    })
}

/// Fill one strip top to bottom: sky, wall, floor. Without a wall the strip
/// splits into sky and floor at the horizon.
pub fn draw_column<R: RenderTarget + ?Sized>(target: &mut R, x0: i32, x1: i32, slice: Option<&WallSlice>) {
    let height = target.height() as i32;
    match slice {
        Some(slice) => {
            target.fill_rect(x0, 0, x1, slice.top, palette_index::SKY);
            target.fill_rect(x0, slice.top, x1, slice.bottom, slice.color);
            target.fill_rect(x0, slice.bottom, x1, height, palette_index::FLOOR);
        }
        None => {
            let horizon = height / 2;
            target.fill_rect(x0, 0, x1, horizon, palette_index::SKY);
            target.fill_rect(x0, horizon, x1, height, palette_index::FLOOR);
        }
    }
}
