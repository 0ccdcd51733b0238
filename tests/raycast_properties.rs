use tilecast::game::angle::{Angle, SinLut};
use tilecast::game::config::{build_world, InitialConfig};
use tilecast::game::fixed_math::{abs, to_fixed, FixedNum, FixedVec2};
use tilecast::game::render::projector::{draw_column, project};
use tilecast::game::render::raycaster::{cast_column, cast_view, RayHit, WallFace};
use tilecast::game::render::framebuffer::{palette_index, FrameBuffer};
use tilecast::game::render::RenderTarget;
use tilecast::game::simulation::{PlayerState, SimConfig};
use tilecast::game::world::WorldGrid;

fn open_box() -> (WorldGrid, SimConfig) {
    let mut config = InitialConfig::default();
    config.map = [
        "########",
        "#......#",
        "#......#",
        "#......#",
        "#......#",
        "#......#",
        "#......#",
        "########",
    ]
    .iter()
    .map(|r| r.to_string())
    .collect();
    let setup = build_world(&config).unwrap();
    (setup.grid, setup.sim_config)
}

fn render(hits: &[RayHit], config: &SimConfig) -> FrameBuffer {
    let mut fb = FrameBuffer::new(config.screen_width, config.screen_height);
    for hit in hits {
        let x0 = hit.column as i32;
        draw_column(&mut fb, x0, x0 + config.column_width as i32, project(hit, config).as_ref());
    }
    fb
}

#[test]
fn test_wall_one_tile_away_fills_the_screen() {
    let (grid, config) = open_box();
    let player = PlayerState { position: FixedVec2::from_ints(48, 28), heading: Angle::ZERO };
    let hit = cast_column(config.screen_width / 2, &player, &grid, &SinLut::new(), &config);

    assert_eq!(hit.hit, Some(WallFace::EastWest));
    assert!(abs(hit.distance - config.tile_size) <= FixedNum::ONE);

    let slice = project(&hit, &config).unwrap();
    assert!(slice.bottom - slice.top >= config.screen_height as i32 - 1);
}

#[test]
fn test_open_space_draws_no_walls() {
    let (grid, mut config) = open_box();
    config.max_ray_length = to_fixed(3);
    let player = PlayerState { position: FixedVec2::from_ints(28, 28), heading: Angle(0x1234) };

    let mut hits = Vec::new();
    cast_view(&player, &grid, &SinLut::new(), &config, &mut hits);
    assert!(hits.iter().all(|h| h.hit.is_none() && h.distance == config.max_ray_length));

    let fb = render(&hits, &config);
    assert!(fb.back().iter().all(|&p| p == palette_index::SKY || p == palette_index::FLOOR));
}

#[test]
fn test_fish_eye_corrected_distances_bounded_by_raw() {
    let (grid, config) = open_box();
    let player = PlayerState { position: FixedVec2::from_ints(28, 28), heading: Angle::ZERO };
    let trig = SinLut::new();

    let mut hits = Vec::new();
    cast_view(&player, &grid, &trig, &config, &mut hits);
    let center = hits[hits.len() / 2];
    assert_eq!(center.hit, Some(WallFace::EastWest));

    for hit in &hits {
        assert!(hit.distance <= hit.raw_distance, "column {}", hit.column);
        // Every ray ending on the same east wall is at least as long as the
        // perpendicular one
        if hit.hit == Some(WallFace::EastWest) {
            assert!(center.distance <= hit.raw_distance, "column {}", hit.column);
        }
    }
}

#[test]
fn test_flat_wall_renders_as_even_band() {
    let (grid, config) = open_box();
    let player = PlayerState { position: FixedVec2::from_ints(28, 28), heading: Angle::ZERO };
    let trig = SinLut::new();

    // Middle third of the view looks straight at the east wall
    let mut hits = Vec::new();
    cast_view(&player, &grid, &trig, &config, &mut hits);
    let heights: Vec<i32> = hits[80..160]
        .iter()
        .map(|h| project(h, &config).map(|s| s.bottom - s.top).unwrap_or(0))
        .collect();
    let min = heights.iter().copied().min().unwrap_or(0);
    let max = heights.iter().copied().max().unwrap_or(0);
    assert!(min > 0);
    assert!(max - min <= 3, "heights range {}..={}", min, max);
}

#[test]
fn test_rendered_frame_has_sky_wall_floor_order() {
    let (grid, config) = open_box();
    let player = PlayerState { position: FixedVec2::from_ints(28, 28), heading: Angle::ZERO };
    let mut hits = Vec::new();
    cast_view(&player, &grid, &SinLut::new(), &config, &mut hits);
    let mut fb = render(&hits, &config);

    assert_eq!(fb.pixel(120, 0), palette_index::SKY);
    assert_eq!(fb.pixel(120, 80), palette_index::WALL);
    assert_eq!(fb.pixel(120, 159), palette_index::FLOOR);

    fb.present();
    assert_eq!(fb.front()[80 * 240 + 120], palette_index::WALL);
    assert_eq!(fb.width(), 240);
}
