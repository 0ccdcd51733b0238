/// The player body and its per-frame movement.
///
/// Movement is computed from elapsed hardware ticks, so speeds are in units
/// per second regardless of frame rate. Each axis is clamped separately
/// against the walls (vertical first), which lets the player slide along a
/// wall when moving into it at an angle.

use bevy::prelude::*;

use crate::game::angle::{Angle, TrigTable};
use crate::game::fixed_math::{div, mul, to_fixed, to_int, FixedNum, FixedVec2, FRAC_1_SQRT_2};
use crate::game::world::WorldGrid;

use super::clock::TIMER_HZ;
use super::collision::{clamp_steps, Axis};
use super::resources::SimConfig;

/// Position and view direction of the player.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub position: FixedVec2,
    pub heading: Angle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalButton {
    Forward,
    Backward,
    StrafeLeft,
    StrafeRight,
    TurnLeft,
    TurnRight,
}

impl LogicalButton {
    pub const ALL: [LogicalButton; 6] = [
        LogicalButton::Forward,
        LogicalButton::Backward,
        LogicalButton::StrafeLeft,
        LogicalButton::StrafeRight,
        LogicalButton::TurnLeft,
        LogicalButton::TurnRight,
    ];
}

/// Buttons held this frame, sampled once before movement.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub strafe_left: bool,
    pub strafe_right: bool,
    pub turn_left: bool,
    pub turn_right: bool,
}

impl InputState {
    /// Query every logical button exactly once.
    pub fn poll(is_down: impl Fn(LogicalButton) -> bool) -> Self {
        Self {
            forward: is_down(LogicalButton::Forward),
            backward: is_down(LogicalButton::Backward),
            strafe_left: is_down(LogicalButton::StrafeLeft),
            strafe_right: is_down(LogicalButton::StrafeRight),
            turn_left: is_down(LogicalButton::TurnLeft),
            turn_right: is_down(LogicalButton::TurnRight),
        }
    }

    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

/// `positive` minus `negative`, each contributing `amount` when held.
fn signed_intent(positive: bool, negative: bool, amount: FixedNum) -> FixedNum {
    match (positive, negative) {
        (true, false) => amount,
        (false, true) => -amount,
        _ => FixedNum::ZERO,
    }
}

impl PlayerState {
    /// Advance the player by `elapsed_ticks` of the 262144 Hz counter.
    ///
    /// Heading changes first and is never collision checked. Then the
    /// displacement along the new heading is split into y and x, each clamped
    /// by [`clamp_steps`]; x is clamped at the already updated y.
    ///
    /// Strafing left is positive: with y growing down, `h - quarter turn`
    /// points to the player's left.
    pub fn update<T: TrigTable + ?Sized>(
        &mut self,
        elapsed_ticks: u16,
        input: &InputState,
        grid: &WorldGrid,
        trig: &T,
        config: &SimConfig,
    ) {
        let secs = div(to_fixed(elapsed_ticks as i32), to_fixed(TIMER_HZ as i32));
        let linear = mul(config.linear_speed, secs);
        let angular = to_int(mul(config.angular_speed, secs));

        let mut forward = signed_intent(input.forward, input.backward, linear);
        let mut strafe = signed_intent(input.strafe_left, input.strafe_right, linear);
        let rotate = match (input.turn_right, input.turn_left) {
            (true, false) => angular,
            (false, true) => -angular,
            _ => 0,
        };

        if forward != FixedNum::ZERO && strafe != FixedNum::ZERO {
            forward = mul(forward, FRAC_1_SQRT_2);
            strafe = mul(strafe, FRAC_1_SQRT_2);
        }

        self.heading = self.heading.wrapping_offset(rotate);
        let heading = self.heading;
        let left = heading - Angle::QUARTER_TURN;

        let dy = mul(forward, trig.sin(heading)) + mul(strafe, trig.sin(left));
        let dy = clamp_steps(grid, self.position.y, dy, self.position.x, Axis::Vertical, config.player_radius);
        self.position.y += dy;

        let dx = mul(forward, trig.cos(heading)) + mul(strafe, trig.cos(left));
        let dx = clamp_steps(grid, self.position.x, dx, self.position.y, Axis::Horizontal, config.player_radius);
        self.position.x += dx;
    }
}
