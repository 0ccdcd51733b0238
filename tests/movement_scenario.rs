use tilecast::game::angle::{Angle, SinLut};
use tilecast::game::config::{build_world, InitialConfig};
use tilecast::game::fixed_math::{to_fixed, FixedNum};
use tilecast::game::simulation::collision::circle_hits_walls;
use tilecast::game::simulation::{InputState, LogicalButton, PlayerState, SimConfig, TIMER_HZ};
use tilecast::game::world::WorldGrid;

/// About one 60 Hz frame of hardware ticks.
const FRAME_TICKS: u16 = 4_369;

fn setup() -> (PlayerState, WorldGrid, SimConfig) {
    let setup = build_world(&InitialConfig::default()).unwrap();
    (setup.player, setup.grid, setup.sim_config)
}

fn held(buttons: &[LogicalButton]) -> InputState {
    InputState::poll(|b| buttons.contains(&b))
}

fn assert_clear_of_walls(player: &PlayerState, grid: &WorldGrid, config: &SimConfig) {
    let (tx, ty) = grid.tile_of(player.position.x, player.position.y);
    assert!(!grid.is_wall(tx, ty), "inside wall tile ({}, {})", tx, ty);
    assert!(
        !circle_hits_walls(grid, player.position, config.player_radius),
        "body overlaps a wall at ({}, {})",
        player.position.x,
        player.position.y
    );
}

#[test]
fn test_walking_into_top_left_corner() {
    let (mut player, grid, config) = setup();
    let trig = SinLut::new();
    player.position = grid.tile_center(1, 1);
    let input = held(&[LogicalButton::Forward]);

    // Straight up, straight left and diagonally into the corner, each for far
    // more than a tile of intended travel
    for heading in [Angle::THREE_QUARTER_TURN, Angle::HALF_TURN, Angle(0xA000)] {
        player.heading = heading;
        for _ in 0..120 {
            player.update(FRAME_TICKS, &input, &grid, &trig, &config);
            assert_clear_of_walls(&player, &grid, &config);
        }
    }

    // Pressed into the corner, one radius from both border walls
    assert!(player.position.x - config.player_radius >= to_fixed(8));
    assert!(player.position.y - config.player_radius >= to_fixed(8));
    assert!(player.position.x < to_fixed(12));
    assert!(player.position.y < to_fixed(12));
}

#[test]
fn test_random_walk_never_overlaps_walls() {
    let (mut player, grid, config) = setup();
    let trig = SinLut::new();
    let mut rng = fastrand::Rng::with_seed(7);

    for _ in 0..5_000 {
        let buttons: Vec<LogicalButton> = LogicalButton::ALL.iter().copied().filter(|_| rng.bool()).collect();
        let ticks = rng.u16(1_000..20_000);
        player.update(ticks, &held(&buttons), &grid, &trig, &config);
        assert_clear_of_walls(&player, &grid, &config);
    }
}

#[test]
fn test_speed_is_frame_rate_independent() {
    let (start, grid, config) = setup();
    let trig = SinLut::new();
    let input = held(&[LogicalButton::Forward]);

    // An eighth of a second as one frame or as eight frames
    let mut coarse = start.clone();
    coarse.update((TIMER_HZ / 8) as u16, &input, &grid, &trig, &config);

    let mut fine = start.clone();
    for _ in 0..8 {
        fine.update((TIMER_HZ / 64) as u16, &input, &grid, &trig, &config);
    }

    assert_eq!(coarse.position, fine.position);
    assert_eq!(coarse.position.x - start.position.x, to_fixed(3));
}

#[test]
fn test_zero_elapsed_ticks_do_not_move() {
    let (mut player, grid, config) = setup();
    let before = player.clone();
    let input = held(&LogicalButton::ALL[..]);
    player.update(0, &input, &grid, &SinLut::new(), &config);
    assert_eq!(player, before);
    assert_eq!(config.linear_speed, FixedNum::from_num(24));
}
