/// Circle-versus-tile collision and per-axis movement clamping.
///
/// This module handles:
/// - Testing the player's circular body against the walls around it
/// - Clamping a desired single-axis displacement to the last safe position

use crate::game::fixed_math::{abs, mul, FixedNum, FixedVec2};
use crate::game::world::WorldGrid;

/// Which coordinate a displacement moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// True if a circle at `center` overlaps any wall tile in the 3x3 block
/// around the tile containing `center`.
///
/// For each wall the offset from tile center to circle center is clamped to
/// the tile's half extent, giving the closest point of the tile's box; the
/// circle touches the wall when that point is strictly closer than `radius`.
/// Tiles outside the grid are skipped. `radius` must stay below half a tile
/// for the 3x3 block to cover every reachable wall.
pub fn circle_hits_walls(grid: &WorldGrid, center: FixedVec2, radius: FixedNum) -> bool {
    let (cx, cy) = grid.tile_of(center.x, center.y);
    let half = FixedNum::from_bits(grid.tile_size_fixed().to_bits() / 2);
    let radius_sq = mul(radius, radius);

    for ty in cy - 1..=cy + 1 {
        for tx in cx - 1..=cx + 1 {
            if !grid.in_bounds(tx, ty) || !grid.is_wall(tx, ty) {
                continue;
            }
            let offset = center - grid.tile_center(tx, ty);
            let clamped = FixedVec2::new(offset.x.clamp(-half, half), offset.y.clamp(-half, half));
            // Vector from the closest point on the tile to the circle center
            let gap = offset - clamped;
            if gap.length_squared() < radius_sq {
                return true;
            }
        }
    }
    false
}

/// Largest safe part of `delta` along `axis`.
///
/// Candidate displacements are scanned in tile-size increments (`step`,
/// `2 * step`, ...) with the last candidate being exactly `|delta|`. At the
/// first candidate whose circle overlaps a wall, the previous candidate is
/// returned (zero if the very first one collides). If nothing collides the
/// full `delta` comes back unchanged.
///
/// The scan is coarse: a wall thinner than one step lying between two
/// candidates is not seen. Per-frame deltas are far below a tile, so in
/// practice only the final candidate is ever tested.
///
/// `current` is the coordinate being moved, `other` the fixed coordinate on
/// the other axis.
pub fn clamp_steps(
    grid: &WorldGrid,
    current: FixedNum,
    delta: FixedNum,
    other: FixedNum,
    axis: Axis,
    radius: FixedNum,
) -> FixedNum {
    if delta == FixedNum::ZERO {
        return FixedNum::ZERO;
    }

    let step = grid.tile_size_fixed();
    let magnitude = abs(delta);
    let signed = |m: FixedNum| if delta < FixedNum::ZERO { -m } else { m };

    let mut safe = FixedNum::ZERO;
    loop {
        let candidate = (safe + step).min(magnitude);
        let moved = current + signed(candidate);
        let center = match axis {
            Axis::Horizontal => FixedVec2::new(moved, other),
            Axis::Vertical => FixedVec2::new(other, moved),
        };
        if circle_hits_walls(grid, center, radius) {
            return signed(safe);
        }
        if candidate == magnitude {
            return delta;
        }
        safe = candidate;
    }
}

#[cfg(test)]
#[path = "collision_tests.rs"]
mod tests;
