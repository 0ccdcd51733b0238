//! Binary angles and table-driven trigonometry.
//!
//! A full turn is 65536 units, so an [`Angle`] is a `u16` and every addition
//! or subtraction wraps exactly like the hardware register arithmetic it stands
//! in for. Sine and cosine come from a [`TrigTable`] implementation injected
//! into the simulation; [`SinLut`] is the production table.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::game::fixed_math::{FixedNum, FRAC_BITS};

/// Angle in units of 1/65536 of a turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Angle(pub u16);

impl Angle {
    pub const ZERO: Self = Self(0);
    pub const QUARTER_TURN: Self = Self(0x4000);
    pub const HALF_TURN: Self = Self(0x8000);
    pub const THREE_QUARTER_TURN: Self = Self(0xC000);

    /// Add a signed offset, wrapping modulo a full turn.
    #[inline]
    pub fn wrapping_offset(self, units: i32) -> Self {
        Self(self.0.wrapping_add(units as u16))
    }
}

impl std::ops::Add for Angle {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.wrapping_add(rhs.0))
    }
}

impl std::ops::Sub for Angle {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.wrapping_sub(rhs.0))
    }
}

impl std::ops::AddAssign for Angle {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.wrapping_add(rhs.0);
    }
}

/// Sine/cosine provider over the 65536-unit angle domain.
///
/// Results are 12-bit fixed point in `[-1, 1]`.
pub trait TrigTable {
    fn sin(&self, angle: Angle) -> FixedNum;

    fn cos(&self, angle: Angle) -> FixedNum {
        self.sin(angle + Angle::QUARTER_TURN)
    }
}

/// log2 of the number of table entries.
const LUT_BITS: u32 = 12;
const LUT_SIZE: usize = 1 << LUT_BITS;
const LUT_SHIFT: u32 = 16 - LUT_BITS;

/// Precomputed sine table, one entry per 16 angle units.
///
/// Lookups truncate to the entry at or below the angle; there is no
/// interpolation. Entries at the cardinal angles are exact.
#[derive(Resource, Clone)]
pub struct SinLut {
    table: Box<[i16]>,
}

impl SinLut {
    pub fn new() -> Self {
        let scale = (1 << FRAC_BITS) as f64;
        let table = (0..LUT_SIZE)
            .map(|i| {
                let radians = i as f64 * std::f64::consts::TAU / LUT_SIZE as f64;
                (radians.sin() * scale).round() as i16
            })
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self { table }
    }
}

impl Default for SinLut {
    fn default() -> Self {
        Self::new()
    }
}

impl TrigTable for SinLut {
    #[inline]
    fn sin(&self, angle: Angle) -> FixedNum {
        FixedNum::from_bits(self.table[(angle.0 >> LUT_SHIFT) as usize] as i32)
    }
}
