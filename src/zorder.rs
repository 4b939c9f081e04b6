//! Per-hemisphere Z-order tables used at levels 3 and 6 (spec §4.3).
//!
//! Rather than flipping coordinates at the input and sharing one canonical
//! table, the standard stores four distinct tables, one per hemisphere
//! (spec §9). The forward tables below are `[row = lat][col = lng] -> value`;
//! the inverse tables are built once, lazily, the same way the `LOOKUP_*`
//! tables in a Hilbert-curve cell decomposition are built: small, immutable,
//! published once and read from every thread afterwards.

use lazy_static::lazy_static;

use crate::hemisphere::Hemisphere;

const LEVEL3_NE: [[u8; 2]; 3] = [[0, 1], [2, 3], [4, 5]];
const LEVEL3_NW: [[u8; 2]; 3] = [[1, 0], [3, 2], [5, 4]];
const LEVEL3_SW: [[u8; 2]; 3] = [[5, 4], [3, 2], [1, 0]];
const LEVEL3_SE: [[u8; 2]; 3] = [[4, 5], [2, 3], [0, 1]];

const LEVEL6_NE: [[u8; 2]; 2] = [[0, 1], [2, 3]];
const LEVEL6_NW: [[u8; 2]; 2] = [[1, 0], [3, 2]];
const LEVEL6_SW: [[u8; 2]; 2] = [[3, 2], [1, 0]];
const LEVEL6_SE: [[u8; 2]; 2] = [[2, 3], [0, 1]];

fn level3_table(h: Hemisphere) -> &'static [[u8; 2]; 3] {
    match h {
        Hemisphere::Ne => &LEVEL3_NE,
        Hemisphere::Nw => &LEVEL3_NW,
        Hemisphere::Sw => &LEVEL3_SW,
        Hemisphere::Se => &LEVEL3_SE,
    }
}

fn level6_table(h: Hemisphere) -> &'static [[u8; 2]; 2] {
    match h {
        Hemisphere::Ne => &LEVEL6_NE,
        Hemisphere::Nw => &LEVEL6_NW,
        Hemisphere::Sw => &LEVEL6_SW,
        Hemisphere::Se => &LEVEL6_SE,
    }
}

/// `value = table[lat_row][lng_col]`.
pub fn level3_encode(h: Hemisphere, lng: i32, lat: i32) -> u8 {
    level3_table(h)[lat as usize][lng as usize]
}

pub fn level6_encode(h: Hemisphere, lng: i32, lat: i32) -> u8 {
    level6_table(h)[lat as usize][lng as usize]
}

lazy_static! {
    static ref LEVEL3_INVERSE: [[(i32, i32); 6]; 4] = build_inverse3();
    static ref LEVEL6_INVERSE: [[(i32, i32); 4]; 4] = build_inverse6();
}

fn hemisphere_index(h: Hemisphere) -> usize {
    match h {
        Hemisphere::Ne => 0,
        Hemisphere::Nw => 1,
        Hemisphere::Sw => 2,
        Hemisphere::Se => 3,
    }
}

fn build_inverse3() -> [[(i32, i32); 6]; 4] {
    let mut out = [[(0, 0); 6]; 4];
    for h in [
        Hemisphere::Ne,
        Hemisphere::Nw,
        Hemisphere::Sw,
        Hemisphere::Se,
    ] {
        let table = level3_table(h);
        let slot = &mut out[hemisphere_index(h)];
        for (row, cols) in table.iter().enumerate() {
            for (col, &value) in cols.iter().enumerate() {
                slot[value as usize] = (col as i32, row as i32);
            }
        }
    }
    out
}

fn build_inverse6() -> [[(i32, i32); 4]; 4] {
    let mut out = [[(0, 0); 4]; 4];
    for h in [
        Hemisphere::Ne,
        Hemisphere::Nw,
        Hemisphere::Sw,
        Hemisphere::Se,
    ] {
        let table = level6_table(h);
        let slot = &mut out[hemisphere_index(h)];
        for (row, cols) in table.iter().enumerate() {
            for (col, &value) in cols.iter().enumerate() {
                slot[value as usize] = (col as i32, row as i32);
            }
        }
    }
    out
}

/// Returns `(lng, lat)` for a given Z-order value, or `None` if the value
/// is outside `0..6`.
pub fn level3_decode(h: Hemisphere, value: u8) -> Option<(i32, i32)> {
    if value >= 6 {
        return None;
    }
    Some(LEVEL3_INVERSE[hemisphere_index(h)][value as usize])
}

/// Returns `(lng, lat)` for a given Z-order value, or `None` if the value
/// is outside `0..4`.
pub fn level6_decode(h: Hemisphere, value: u8) -> Option<(i32, i32)> {
    if value >= 4 {
        return None;
    }
    Some(LEVEL6_INVERSE[hemisphere_index(h)][value as usize])
}
