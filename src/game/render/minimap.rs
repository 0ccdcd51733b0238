/// Top-down overlay of the map, one screen pixel per world unit.

use crate::game::angle::TrigTable;
use crate::game::fixed_math::{to_int, FixedNum, FixedVec2};
use crate::game::simulation::{PlayerState, SimConfig};
use crate::game::world::WorldGrid;

use super::framebuffer::{palette_index, RenderTarget};

/// Gap between the overlay and the screen edges.
const MARGIN: i32 = 4;

/// Screen position of the overlay's top-left corner: the top-right corner of
/// the screen.
pub fn minimap_origin<R: RenderTarget + ?Sized>(target: &R, grid: &WorldGrid) -> (i32, i32) {
    let map_width = grid.width() * grid.tile_size();
    (target.width() as i32 - map_width - MARGIN, MARGIN)
}

/// Draw tiles, then the heading ray, then the player on top.
pub fn draw_minimap<R: RenderTarget + ?Sized, T: TrigTable + ?Sized>(
    target: &mut R,
    grid: &WorldGrid,
    player: &PlayerState,
    trig: &T,
    config: &SimConfig,
) {
    let (ox, oy) = minimap_origin(target, grid);
    let ts = grid.tile_size();

    target.fill_rect(ox, oy, ox + grid.width() * ts, oy + grid.height() * ts, palette_index::FLOOR);
    for (tx, ty) in grid.wall_tiles() {
        let (x, y) = (ox + tx * ts, oy + ty * ts);
        target.fill_rect(x, y, x + ts, y + ts, palette_index::WALL);
    }

    // Heading ray in whole-unit steps up to the first wall
    let dir = FixedVec2::new(trig.cos(player.heading), trig.sin(player.heading));
    let mut d = FixedNum::ONE;
    while d <= config.max_ray_length {
        let point = player.position + dir.scale(d);
        if grid.is_wall_at(point.x, point.y) {
            break;
        }
        target.plot(ox + to_int(point.x), oy + to_int(point.y), palette_index::DIRECTION);
        d += FixedNum::ONE;
    }

    target.plot(
        ox + to_int(player.position.x),
        oy + to_int(player.position.y),
        palette_index::PLAYER,
    );
}
