//! Per-level grid tables from GB/T 39409-2020 (spec §3). Indexed `level - 1`.
//!
//! These are ground truth: row order is significant and every table here
//! must line up level-for-level with every other table in this file.

use rust_decimal::Decimal;

use crate::error::{GridError, Result};

pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 10;

/// `(lon_fanout, lat_fanout)` per level.
const FANOUT: [(u32, u32); 10] = [
    (60, 22),
    (12, 8),
    (2, 3),
    (15, 10),
    (15, 15),
    (2, 2),
    (8, 8),
    (8, 8),
    (8, 8),
    (8, 8),
];

/// 2D fragment length in characters, per level.
const FRAG2D_LEN: [usize; 10] = [3, 2, 1, 2, 2, 1, 2, 2, 2, 2];

/// Cumulative 2D code length *including* the leading hemisphere letter.
const CUMULATIVE_2D_LEN: [usize; 10] = [4, 6, 7, 9, 11, 12, 14, 16, 18, 20];

/// Height field bit-width, per level.
const HEIGHT_BITS: [u32; 10] = [6, 3, 1, 4, 4, 1, 3, 3, 3, 3];

/// Height fragment length in characters, per level (level 1 is the lone
/// 2-character exception: 6 bits rendered in decimal needs two digits).
const HEIGHT_FRAG_LEN: [usize; 10] = [2, 1, 1, 1, 1, 1, 1, 1, 1, 1];

/// Height bit-range within the 32-bit magnitude buffer, 1-indexed from the
/// LSB, inclusive `(low, high)`.
const HEIGHT_BIT_RANGE: [(u32, u32); 10] = [
    (26, 31),
    (23, 25),
    (22, 22),
    (18, 21),
    (14, 17),
    (13, 13),
    (10, 12),
    (7, 9),
    (4, 6),
    (1, 3),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Radix {
    Binary = 2,
    Octal = 8,
    Decimal = 10,
    Hex = 16,
}

const HEIGHT_RADIX: [Radix; 10] = [
    Radix::Decimal,
    Radix::Octal,
    Radix::Binary,
    Radix::Hex,
    Radix::Hex,
    Radix::Binary,
    Radix::Octal,
    Radix::Octal,
    Radix::Octal,
    Radix::Octal,
];

/// Cumulative 3D code length including the 2-character prefix (hemisphere
/// letter + height sign digit). Derived from the fragment composition rule
/// in SPEC_FULL.md §4.5/DESIGN.md rather than transcribed from spec.md's
/// worked total table, which has an off-by-one at level 1 — see DESIGN.md.
const CUMULATIVE_3D_LEN: [usize; 10] = [7, 10, 12, 15, 18, 20, 23, 26, 29, 32];

pub fn validate_level(level: u8) -> Result<()> {
    if (MIN_LEVEL..=MAX_LEVEL).contains(&level) {
        Ok(())
    } else {
        Err(GridError::invalid_argument(format!(
            "level {level} out of range [{MIN_LEVEL}, {MAX_LEVEL}]"
        )))
    }
}

fn idx(level: u8) -> usize {
    (level - 1) as usize
}

pub fn fanout(level: u8) -> (u32, u32) {
    FANOUT[idx(level)]
}

pub fn frag2d_len(level: u8) -> usize {
    FRAG2D_LEN[idx(level)]
}

pub fn cumulative_2d_len(level: u8) -> usize {
    CUMULATIVE_2D_LEN[idx(level)]
}

pub fn cumulative_3d_len(level: u8) -> usize {
    CUMULATIVE_3D_LEN[idx(level)]
}

pub fn height_bits(level: u8) -> u32 {
    HEIGHT_BITS[idx(level)]
}

pub fn height_frag_len(level: u8) -> usize {
    HEIGHT_FRAG_LEN[idx(level)]
}

pub fn height_radix(level: u8) -> Radix {
    HEIGHT_RADIX[idx(level)]
}

pub fn height_bit_range(level: u8) -> (u32, u32) {
    HEIGHT_BIT_RANGE[idx(level)]
}

/// H-adjustment bounds `(max_lng, max_lat)` used at levels 2, 4, 5, 7..10.
/// Per spec §4.3 these are stated directly rather than derived from
/// `fanout() - 1` (level 4 and 5 share bounds despite differing fan-out).
pub fn h_adjust_bounds(level: u8) -> (i32, i32) {
    match level {
        2 => (11, 7),
        4 | 5 => (14, 14),
        7..=10 => (7, 7),
        _ => unreachable!("h_adjust_bounds not defined for level {level}"),
    }
}

/// Exact cell width/height in degrees, as an exact fraction (spec §4.1,
/// §9: arithmetic here must not drift after repeated division/subtraction).
pub fn delta_lon_deg(level: u8) -> Decimal {
    let (num, den): (i64, i64) = match level {
        1 => (6, 1),
        2 => (1, 2),
        3 => (1, 4),
        4 => (1, 60),
        5 => (1, 900),
        6 => (1, 1800),
        7 => (1, 14400),
        8 => (1, 115200),
        9 => (1, 921600),
        10 => (1, 7372800),
        _ => unreachable!(),
    };
    Decimal::from(num) / Decimal::from(den)
}

pub fn delta_lat_deg(level: u8) -> Decimal {
    let (num, den): (i64, i64) = match level {
        1 => (4, 1),
        2 => (1, 2),
        3 => (1, 6),
        4 => (1, 60),
        5 => (1, 900),
        6 => (1, 1800),
        7 => (1, 14400),
        8 => (1, 115200),
        9 => (1, 921600),
        10 => (1, 7372800),
        _ => unreachable!(),
    };
    Decimal::from(num) / Decimal::from(den)
}

/// Same cell dimensions, in arc-seconds, as `f64`. Safe to accumulate in
/// floating point: every entry is a negative power of two or a small
/// integer (spec §9).
pub fn delta_lon_sec(level: u8) -> f64 {
    match level {
        1 => 21600.0,
        2 => 1800.0,
        3 => 900.0,
        4 => 60.0,
        5 => 4.0,
        6 => 2.0,
        7 => 0.25,
        8 => 0.03125,
        9 => 0.00390625,
        10 => 0.00048828125,
        _ => unreachable!(),
    }
}

pub fn delta_lat_sec(level: u8) -> f64 {
    match level {
        1 => 14400.0,
        2 => 1800.0,
        3 => 600.0,
        4 => 60.0,
        5 => 4.0,
        6 => 2.0,
        7 => 0.25,
        8 => 0.03125,
        9 => 0.00390625,
        10 => 0.00048828125,
        _ => unreachable!(),
    }
}

pub fn delta_lon_deg_f64(level: u8) -> f64 {
    delta_lon_sec(level) / 3600.0
}

pub fn delta_lat_deg_f64(level: u8) -> f64 {
    delta_lat_sec(level) / 3600.0
}

/// Infers the level from a 2D code's length. `None` if no level matches.
pub fn level_from_2d_len(len: usize) -> Option<u8> {
    CUMULATIVE_2D_LEN
        .iter()
        .position(|&l| l == len)
        .map(|i| (i + 1) as u8)
}

/// Infers the level from a 3D code's length. `None` if no level matches.
pub fn level_from_3d_len(len: usize) -> Option<u8> {
    CUMULATIVE_3D_LEN
        .iter()
        .position(|&l| l == len)
        .map(|i| (i + 1) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cumulative_2d_matches_fragment_sum() {
        let mut total = 1usize; // hemisphere letter
        for level in 1..=10u8 {
            total += frag2d_len(level);
            assert_eq!(total, cumulative_2d_len(level), "level {level}");
        }
    }

    #[test]
    fn cumulative_3d_matches_fragment_sum() {
        let mut total = 2usize; // hemisphere letter + height sign digit
        for level in 1..=10u8 {
            total += frag2d_len(level) + height_frag_len(level);
            assert_eq!(total, cumulative_3d_len(level), "level {level}");
        }
    }

    #[test]
    fn height_bits_sum_to_31() {
        let total: u32 = HEIGHT_BITS.iter().sum();
        assert_eq!(total, 31);
    }

    #[test]
    fn level_from_len_roundtrips() {
        for level in 1..=10u8 {
            assert_eq!(level_from_2d_len(cumulative_2d_len(level)), Some(level));
            assert_eq!(level_from_3d_len(cumulative_3d_len(level)), Some(level));
        }
        assert_eq!(level_from_2d_len(999), None);
    }
}
