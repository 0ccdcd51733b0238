//! Deterministic fixed-point mathematics.
//!
//! Every position, distance and speed in the engine is a [`FixedNum`]: a signed
//! 32-bit integer with 12 fractional bits (1 unit = 1/4096). The free functions
//! here pin down the exact rounding and truncation policy the geometry relies on.
//! Changing any of them shifts which tile a ray or a player body appears to
//! touch by one sub-pixel, so they are spelled out on raw bits instead of
//! leaning on the operator impls of the `fixed` crate.

use fixed::types::{I20F12, U20F12};

pub use vec2::FixedVec2;

mod vec2;


/// Fixed-point number type used throughout the engine.
///
/// I20F12: 20 integer bits, 12 fractional bits. Range is roughly ±524288 with
/// a precision of 1/4096.
pub type FixedNum = I20F12;

/// Unsigned counterpart for quantities that are never negative.
pub type FixedUNum = U20F12;

/// Number of fractional bits.
pub const FRAC_BITS: u32 = 12;

const HALF_UNIT: i64 = 1 << (FRAC_BITS - 1);

/// 1/sqrt(2) rounded to 12 fractional bits (2896/4096).
pub const FRAC_1_SQRT_2: FixedNum = FixedNum::from_bits(2896);

/// Integer to fixed-point. Bits shifted past the top are lost silently.
#[inline]
pub const fn to_fixed(value: i32) -> FixedNum {
    FixedNum::from_bits(value << FRAC_BITS)
}

/// Fixed-point to the nearest integer, ties away from zero.
///
/// The half unit is added for positive values and subtracted for negative
/// ones, so `-2.5` becomes `-3` and `2.5` becomes `3`.
#[inline]
pub fn to_int(value: FixedNum) -> i32 {
    let bits = value.to_bits() as i64;
    if bits >= 0 {
        ((bits + HALF_UNIT) >> FRAC_BITS) as i32
    } else {
        -((-bits + HALF_UNIT) >> FRAC_BITS) as i32
    }
}

/// Unsigned integer to fixed-point.
#[inline]
pub const fn to_ufixed(value: u32) -> FixedUNum {
    FixedUNum::from_bits(value << FRAC_BITS)
}

/// Unsigned fixed-point to the nearest integer, ties rounded up.
#[inline]
pub fn to_uint(value: FixedUNum) -> u32 {
    ((value.to_bits() as u64 + HALF_UNIT as u64) >> FRAC_BITS) as u32
}

/// Widening multiply, then an arithmetic shift back down (truncates toward
/// negative infinity).
#[inline]
pub fn mul(a: FixedNum, b: FixedNum) -> FixedNum {
    let wide = a.to_bits() as i64 * b.to_bits() as i64;
    FixedNum::from_bits((wide >> FRAC_BITS) as i32)
}

/// Widening divide.
///
/// # Panics
///
/// Panics if `b` is zero. Callers that cannot rule that out use
/// [`checked_div`].
#[inline]
pub fn div(a: FixedNum, b: FixedNum) -> FixedNum {
    let wide = (a.to_bits() as i64) << FRAC_BITS;
    FixedNum::from_bits((wide / b.to_bits() as i64) as i32)
}

/// Widening divide that returns `None` for a zero divisor or a quotient that
/// does not fit in 32 bits.
#[inline]
pub fn checked_div(a: FixedNum, b: FixedNum) -> Option<FixedNum> {
    if b == FixedNum::ZERO {
        return None;
    }
    let wide = ((a.to_bits() as i64) << FRAC_BITS) / b.to_bits() as i64;
    i32::try_from(wide).ok().map(FixedNum::from_bits)
}

#[inline]
pub fn abs(value: FixedNum) -> FixedNum {
    FixedNum::from_bits(value.to_bits().wrapping_abs())
}
