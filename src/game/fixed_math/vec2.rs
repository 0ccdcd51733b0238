use serde::{Deserialize, Serialize};

use super::{mul, to_fixed, FixedNum};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixedVec2 {
    pub x: FixedNum,
    pub y: FixedNum,
}

impl FixedVec2 {
    pub const ZERO: Self = Self { x: FixedNum::ZERO, y: FixedNum::ZERO };

    pub const fn new(x: FixedNum, y: FixedNum) -> Self {
        Self { x, y }
    }

    pub const fn from_ints(x: i32, y: i32) -> Self {
        Self { x: to_fixed(x), y: to_fixed(y) }
    }

    /// Scale both components with the engine's truncating [`mul`].
    pub fn scale(self, factor: FixedNum) -> Self {
        Self {
            x: mul(self.x, factor),
            y: mul(self.y, factor),
        }
    }

    pub fn length_squared(self) -> FixedNum {
        mul(self.x, self.x) + mul(self.y, self.y)
    }
}

impl std::ops::Add for FixedVec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl std::ops::AddAssign for FixedVec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub for FixedVec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl std::ops::Neg for FixedVec2 {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self { x: -self.x, y: -self.y }
    }
}
