//! Logarithmic height mapping (spec §4.5, §9).
//!
//! `n = floor((theta0/theta) * ln((H + r0)/r0) / ln(1 + theta0))`, where
//! `r0` is the Earth radius and `theta`/`theta0` are the standard's two
//! height constants. The magnitude `|n|` is bit-sliced per level by
//! `constants::height_bit_range` and rendered in that level's radix; the
//! sign is carried separately as the 3D code's height-sign digit.
//!
//! Two variants of `theta`/`theta0` circulate in reference implementations
//! of this standard (spec §9, open question): a later one that carries
//! both constants in radians (`theta0 = pi/180`), and an earlier one that
//! leaves `theta0 = 1` and plugs it into `ln(1 + theta0)` without the
//! degree-to-radian conversion the later version applies. The two are
//! algebraically equal only if that conversion happens in both places, so
//! they are not interchangeable; this module implements the later,
//! radian-consistent version as the default and the earlier one behind the
//! `legacy-height-theta` feature, so both can be exercised without forking
//! the crate.

use std::f64::consts::PI;

use crate::constants::{self, Radix};
use crate::error::{GridError, Result};

/// Earth radius, metres (spec §4.5).
const EARTH_RADIUS_M: f64 = 6_378_137.0;

const MAGNITUDE_BITS: u32 = 31;
const MAX_MAGNITUDE: u32 = (1u32 << MAGNITUDE_BITS) - 1;

#[cfg(not(feature = "legacy-height-theta"))]
fn theta0() -> f64 {
    PI / 180.0
}

#[cfg(not(feature = "legacy-height-theta"))]
fn theta() -> f64 {
    PI / (180.0 * 3600.0 * 2048.0)
}

#[cfg(feature = "legacy-height-theta")]
fn theta0() -> f64 {
    1.0
}

#[cfg(feature = "legacy-height-theta")]
fn theta() -> f64 {
    1.0 / (2048.0 * 3600.0)
}

fn ln_denominator() -> f64 {
    (1.0 + theta0()).ln()
}

/// Maps a height in metres to `(negative, magnitude)`, where `magnitude`
/// fits in 31 bits.
pub fn height_to_n(height: f64) -> Result<(bool, u32)> {
    if !height.is_finite() {
        return Err(GridError::invalid_argument("height is not finite"));
    }
    let ratio = (height + EARTH_RADIUS_M) / EARTH_RADIUS_M;
    if ratio <= 0.0 {
        return Err(GridError::invalid_argument(format!(
            "height {height} is at or below the geocentric reference"
        )));
    }
    let n_real = (theta0() / theta()) * ratio.ln() / ln_denominator();
    let n = n_real.floor();
    let magnitude = n.abs();
    if magnitude > MAX_MAGNITUDE as f64 || magnitude.is_nan() {
        return Err(GridError::invalid_argument(format!(
            "height {height} is out of the representable range"
        )));
    }
    Ok((n < 0.0, magnitude as u32))
}

/// Inverts `height_to_n`: reconstructs the slab base height for a given
/// sign and 31-bit magnitude.
pub fn n_to_height(negative: bool, magnitude: u32) -> f64 {
    let magnitude = (magnitude & MAX_MAGNITUDE) as f64;
    let exponent = magnitude * theta() / theta0();
    let h_base = (1.0 + theta0()).powf(exponent) * EARTH_RADIUS_M - EARTH_RADIUS_M;
    if negative {
        -h_base
    } else {
        h_base
    }
}

/// Extracts the bits for `level` out of the 31-bit magnitude buffer.
/// `constants::height_bit_range` is 1-indexed from the LSB, inclusive.
fn extract_bits(magnitude: u32, range: (u32, u32)) -> u32 {
    let (lo, hi) = range;
    let width = hi - lo + 1;
    let mask = if width >= 32 { u32::MAX } else { (1u32 << width) - 1 };
    (magnitude >> (lo - 1)) & mask
}

fn insert_bits(buf: &mut u32, range: (u32, u32), value: u32) {
    let (lo, hi) = range;
    let width = hi - lo + 1;
    let mask = if width >= 32 { u32::MAX } else { (1u32 << width) - 1 };
    *buf |= (value & mask) << (lo - 1);
}

/// Renders a raw (already level-scoped) value in this level's height radix
/// and width, without extracting it from a larger magnitude buffer first.
/// Used by child-cell enumeration, which builds codes by direct
/// concatenation rather than round-tripping through a height in metres.
pub(crate) fn render_level_value(level: u8, value: u32) -> String {
    render(value, constants::height_radix(level), constants::height_frag_len(level))
}

fn render(value: u32, radix: Radix, width: usize) -> String {
    let s = match radix {
        Radix::Binary => format!("{value:b}"),
        Radix::Octal => format!("{value:o}"),
        Radix::Decimal => format!("{value}"),
        Radix::Hex => format!("{value:X}"),
    };
    format!("{s:0>width$}", width = width)
}

fn parse(code: &str, frag: &str, radix: Radix) -> Result<u32> {
    let r = match radix {
        Radix::Binary => 2,
        Radix::Octal => 8,
        Radix::Decimal => 10,
        Radix::Hex => 16,
    };
    u32::from_str_radix(frag, r)
        .map_err(|_| GridError::invalid_code(code, format!("height fragment {frag:?} not base-{r}")))
}

/// Renders the height fragment text for one level, given the full 31-bit
/// magnitude.
pub fn fragment_for_level(level: u8, magnitude: u32) -> String {
    let value = extract_bits(magnitude, constants::height_bit_range(level));
    render(value, constants::height_radix(level), constants::height_frag_len(level))
}

/// Parses a level's height fragment text and folds it into `magnitude`.
pub fn accumulate_fragment(code: &str, level: u8, frag: &str, magnitude: &mut u32) -> Result<()> {
    let value = parse(code, frag, constants::height_radix(level))?;
    insert_bits(magnitude, constants::height_bit_range(level), value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn zero_height_round_trips() {
        let (neg, mag) = height_to_n(0.0).unwrap();
        assert!(!neg);
        assert_eq!(mag, 0);
        let back = n_to_height(neg, mag);
        assert_abs_diff_eq!(back, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn negative_height_preserves_sign() {
        let (neg, mag) = height_to_n(-500.0).unwrap();
        assert!(neg);
        let back = n_to_height(neg, mag);
        assert!(back < 0.0);
    }

    #[test]
    fn magnitude_fits_in_31_bits() {
        let (_, mag) = height_to_n(8848.86).unwrap();
        assert!(mag <= MAX_MAGNITUDE);
    }

    #[test]
    fn bit_range_round_trips_through_fragments() {
        let (_, mag) = height_to_n(123_456.0).unwrap();
        let mut rebuilt = 0u32;
        for level in 1..=10u8 {
            let frag = fragment_for_level(level, mag);
            accumulate_fragment("x", level, &frag, &mut rebuilt).unwrap();
        }
        assert_eq!(rebuilt, mag);
    }

    #[test]
    fn rejects_non_finite_height() {
        assert!(height_to_n(f64::NAN).is_err());
        assert!(height_to_n(f64::INFINITY).is_err());
    }

    #[test]
    fn rejects_height_at_or_below_geocentric_reference() {
        assert!(height_to_n(-EARTH_RADIUS_M).is_err());
        assert!(height_to_n(-EARTH_RADIUS_M - 1.0).is_err());
    }

    #[test]
    fn increasing_height_never_decreases_encoded_magnitude() {
        let mut previous = 0u32;
        for height in [0.0, 10.0, 100.0, 1_000.0, 8_848.86, 100_000.0] {
            let (negative, mag) = height_to_n(height).unwrap();
            assert!(!negative);
            assert!(mag >= previous, "height {height} regressed magnitude");
            previous = mag;
        }
    }
}
