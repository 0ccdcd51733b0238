use bevy::prelude::*;
use fixedbitset::FixedBitSet;

use crate::game::config::{ConfigError, MAX_TILE_SIZE};
use crate::game::fixed_math::{to_fixed, to_int, FixedNum, FixedVec2};

/// Static tile map.
///
/// World space is pixel space: the top-left corner of tile `(0, 0)` sits at
/// the origin, x grows right and y grows down. Each tile is `tile_size` world
/// units on a side. The grid never changes after startup.
///
/// Queries outside the grid answer "no wall"; collision code that walks
/// neighbors skips out-of-bounds tiles explicitly via [`WorldGrid::in_bounds`].
#[derive(Resource, Clone, Debug)]
pub struct WorldGrid {
    width: i32,
    height: i32,
    tile_size: i32,
    walls: FixedBitSet,
}

impl WorldGrid {
    /// Parse map rows. `#` or `1` is a wall; `.`, `0` or a space is open floor.
    pub fn from_rows<S: AsRef<str>>(rows: &[S], tile_size: i32) -> Result<Self, ConfigError> {
        if !(1..=MAX_TILE_SIZE).contains(&tile_size) {
            return Err(ConfigError::InvalidTileSize(tile_size));
        }
        let height = rows.len();
        let width = rows.first().map(|r| r.as_ref().chars().count()).unwrap_or(0);
        if width == 0 || height == 0 {
            return Err(ConfigError::EmptyMap);
        }

        let mut walls = FixedBitSet::with_capacity(width * height);
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let found = row.chars().count();
            if found != width {
                return Err(ConfigError::RaggedRow { row: y, expected: width, found });
            }
            for (x, ch) in row.chars().enumerate() {
                match ch {
                    '#' | '1' => walls.insert(y * width + x),
                    '.' | '0' | ' ' => {}
                    other => return Err(ConfigError::UnknownTile { row: y, column: x, tile: other }),
                }
            }
        }

        Ok(Self {
            width: width as i32,
            height: height as i32,
            tile_size,
            walls,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Tile edge length in world units.
    pub fn tile_size(&self) -> i32 {
        self.tile_size
    }

    pub fn tile_size_fixed(&self) -> FixedNum {
        to_fixed(self.tile_size)
    }

    #[inline]
    pub fn in_bounds(&self, tx: i32, ty: i32) -> bool {
        tx >= 0 && ty >= 0 && tx < self.width && ty < self.height
    }

    #[inline]
    pub fn is_wall(&self, tx: i32, ty: i32) -> bool {
        self.in_bounds(tx, ty) && self.walls.contains((ty * self.width + tx) as usize)
    }

    /// Tile containing a world position. Coordinates are rounded to the
    /// nearest whole unit before the floor division.
    #[inline]
    pub fn tile_of(&self, x: FixedNum, y: FixedNum) -> (i32, i32) {
        (
            to_int(x).div_euclid(self.tile_size),
            to_int(y).div_euclid(self.tile_size),
        )
    }

    #[inline]
    pub fn is_wall_at(&self, x: FixedNum, y: FixedNum) -> bool {
        let (tx, ty) = self.tile_of(x, y);
        self.is_wall(tx, ty)
    }

    pub fn tile_center(&self, tx: i32, ty: i32) -> FixedVec2 {
        let half = FixedNum::from_bits(to_fixed(self.tile_size).to_bits() / 2);
        FixedVec2::new(
            to_fixed(tx * self.tile_size) + half,
            to_fixed(ty * self.tile_size) + half,
        )
    }

    /// Every edge tile must be a wall so nothing can walk or see off the map.
    pub fn validate_border(&self) -> Result<(), ConfigError> {
        let edge = (0..self.width)
            .flat_map(|x| [(x, 0), (x, self.height - 1)])
            .chain((0..self.height).flat_map(|y| [(0, y), (self.width - 1, y)]));
        for (x, y) in edge {
            if !self.is_wall(x, y) {
                return Err(ConfigError::OpenBorder { x, y });
            }
        }
        Ok(())
    }

    /// Wall tiles in row-major order.
    pub fn wall_tiles(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.walls
            .ones()
            .map(|idx| ((idx as i32) % self.width, (idx as i32) / self.width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAZE: [&str; 8] = [
        "########",
        "#......#",
        "#.#.#.##",
        "#.#.#..#",
        "#...##.#",
        "#.#....#",
        "#....#.#",
        "########",
    ];

    #[test]
    fn test_parse_maze() {
        let grid = WorldGrid::from_rows(&MAZE, 8).unwrap();
        assert_eq!(grid.width(), 8);
        assert_eq!(grid.height(), 8);
        assert!(grid.is_wall(0, 0));
        assert!(!grid.is_wall(1, 1));
        assert!(grid.is_wall(2, 2));
        assert!(grid.validate_border().is_ok());
        assert_eq!(grid.wall_tiles().filter(|&(x, y)| x == 2 && y == 2).count(), 1);
    }

    #[test]
    fn test_digit_rows_parse_like_symbols() {
        let grid = WorldGrid::from_rows(&["111", "101", "111"], 8).unwrap();
        assert!(!grid.is_wall(1, 1));
        assert!(grid.is_wall(2, 1));
    }

    #[test]
    fn test_out_of_bounds_is_not_a_wall() {
        let grid = WorldGrid::from_rows(&MAZE, 8).unwrap();
        assert!(!grid.is_wall(-1, 0));
        assert!(!grid.is_wall(0, -1));
        assert!(!grid.is_wall(8, 3));
        assert!(!grid.is_wall(3, 8));
        assert!(!grid.is_wall_at(to_fixed(-100), to_fixed(-100)));
    }

    #[test]
    fn test_tile_of_rounds_before_dividing() {
        let grid = WorldGrid::from_rows(&MAZE, 8).unwrap();
        assert_eq!(grid.tile_of(to_fixed(12), to_fixed(52)), (1, 6));
        // 15.4 rounds down to 15, still tile 1
        assert_eq!(grid.tile_of(FixedNum::from_num(15.4), to_fixed(8)), (1, 1));
        // 15.5 rounds up to 16, which is tile 2
        assert_eq!(grid.tile_of(FixedNum::from_num(15.5), to_fixed(8)), (2, 1));
        assert_eq!(grid.tile_of(to_fixed(-1), to_fixed(0)), (-1, 0));
    }

    #[test]
    fn test_tile_center() {
        let grid = WorldGrid::from_rows(&MAZE, 8).unwrap();
        assert_eq!(grid.tile_center(1, 6), FixedVec2::from_ints(12, 52));
    }

    #[test]
    fn test_rejects_malformed_maps() {
        let empty: [&str; 0] = [];
        assert!(matches!(WorldGrid::from_rows(&empty, 8), Err(ConfigError::EmptyMap)));
        assert!(matches!(
            WorldGrid::from_rows(&["###", "##", "###"], 8),
            Err(ConfigError::RaggedRow { row: 1, expected: 3, found: 2 })
        ));
        assert!(matches!(
            WorldGrid::from_rows(&["###", "#x#", "###"], 8),
            Err(ConfigError::UnknownTile { row: 1, column: 1, tile: 'x' })
        ));
        assert!(matches!(WorldGrid::from_rows(&MAZE, 0), Err(ConfigError::InvalidTileSize(0))));
        // 2^19 would wrap in fixed point
        assert!(matches!(
            WorldGrid::from_rows(&MAZE, 1 << 19),
            Err(ConfigError::InvalidTileSize(524_288))
        ));
    }

    #[test]
    fn test_open_border_is_rejected() {
        let grid = WorldGrid::from_rows(&["####", "#...", "####"], 8).unwrap();
        assert!(matches!(grid.validate_border(), Err(ConfigError::OpenBorder { x: 3, y: 1 })));
    }
}
