/// One ray per screen strip, marched through the tile grid.
///
/// The march samples `origin + dir * d` for `d = step, 2 * step, ...`,
/// recomputing each sample from the origin so rounding never accumulates.
/// When a coarse sample lands in a wall the ray backs up to the last free
/// sample and marches again in finer sub-steps to find the wall face.

use crate::game::angle::{Angle, TrigTable};
use crate::game::fixed_math::{mul, FixedNum, FixedVec2};
use crate::game::simulation::{PlayerState, SimConfig};
use crate::game::world::WorldGrid;

/// Which kind of tile boundary a ray crossed into the wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallFace {
    /// A vertical boundary, crossed while moving east or west.
    EastWest,
    /// A horizontal boundary, crossed while moving north or south.
    NorthSouth,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Left screen x of the strip this ray was cast for.
    pub column: u32,
    pub angle: Angle,
    /// Distance along the ray.
    pub raw_distance: FixedNum,
    /// Distance projected onto the view direction.
    pub distance: FixedNum,
    /// `None` when the ray ran out of length without hitting a wall.
    pub hit: Option<WallFace>,
}

/// Angle of the ray through `screen_x`, sweeping `fov` left to right.
pub fn column_angle(heading: Angle, screen_x: u32, screen_width: u32, fov: u16) -> Angle {
    let sweep = (fov as u64 * screen_x as u64 / screen_width as u64) as i32;
    heading.wrapping_offset(sweep - (fov / 2) as i32)
}

fn sample(origin: FixedVec2, dir: FixedVec2, distance: FixedNum) -> FixedVec2 {
    origin + dir.scale(distance)
}

/// Cast the ray for the strip starting at `screen_x`.
pub fn cast_column<T: TrigTable + ?Sized>(
    screen_x: u32,
    player: &PlayerState,
    grid: &WorldGrid,
    trig: &T,
    config: &SimConfig,
) -> RayHit {
    let angle = column_angle(player.heading, screen_x, config.screen_width, config.fov);
    let dir = FixedVec2::new(trig.cos(angle), trig.sin(angle));
    let origin = player.position;

    let mut free = FixedNum::ZERO;
    let mut d = config.ray_step;
    while d <= config.max_ray_length {
        let point = sample(origin, dir, d);
        if grid.is_wall_at(point.x, point.y) {
            let (raw_distance, face) = refine(origin, dir, free, d, grid, config);
            return RayHit {
                column: screen_x,
                angle,
                raw_distance,
                distance: mul(raw_distance, trig.cos(angle - player.heading)),
                hit: Some(face),
            };
        }
        free = d;
        d += config.ray_step;
    }

    RayHit {
        column: screen_x,
        angle,
        raw_distance: config.max_ray_length,
        distance: config.max_ray_length,
        hit: None,
    }
}

/// Find the first wall sample in `(free, wall]` at sub-step resolution and
/// classify the face by which tile coordinate changed on entering it.
fn refine(
    origin: FixedVec2,
    dir: FixedVec2,
    free: FixedNum,
    wall: FixedNum,
    grid: &WorldGrid,
    config: &SimConfig,
) -> (FixedNum, WallFace) {
    let sub = FixedNum::from_bits(config.ray_step.to_bits() / config.ray_refine_steps as i32);

    let mut last_free = free;
    let mut hit_at = wall;
    let mut d = free + sub;
    while d < wall {
        let point = sample(origin, dir, d);
        if grid.is_wall_at(point.x, point.y) {
            hit_at = d;
            break;
        }
        last_free = d;
        d += sub;
    }

    let before = sample(origin, dir, last_free);
    let after = sample(origin, dir, hit_at);
    let (bx, _) = grid.tile_of(before.x, before.y);
    let (ax, _) = grid.tile_of(after.x, after.y);
    // Entering through a corner counts as the east/west face
    let face = if ax != bx { WallFace::EastWest } else { WallFace::NorthSouth };

    (hit_at, face)
}

/// One ray per `column_width` strip, left to right.
pub fn cast_view<T: TrigTable + ?Sized>(
    player: &PlayerState,
    grid: &WorldGrid,
    trig: &T,
    config: &SimConfig,
    out: &mut Vec<RayHit>,
) {
    out.clear();
    out.extend(
        (0..config.screen_width)
            .step_by(config.column_width as usize)
            .map(|x| cast_column(x, player, grid, trig, config)),
    );
}
