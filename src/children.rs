//! Child-cell enumeration (spec §4.6): every code at level L has
//! `fanout(L+1)` children one level finer, formed by appending one more
//! fragment to the parent code. Enumeration is purely combinatorial over
//! the child level's local index space and the same `encode_fragment`
//! used by the 2D encoder, so it never round-trips through float
//! coordinates or the lossy height mapping.

use std::collections::HashSet;

use crate::codec2d::encode_fragment;
use crate::constants;
use crate::error::{GridError, Result};
use crate::height;
use crate::hemisphere::Hemisphere;

/// All 2D children one level below `code`.
pub fn children_2d(code: &str) -> Result<HashSet<String>> {
    let level = constants::level_from_2d_len(code.chars().count())
        .ok_or_else(|| GridError::invalid_code(code, "length matches no known level"))?;
    if level == constants::MAX_LEVEL {
        return Err(GridError::invalid_argument(
            "level 10 is the finest level and has no children",
        ));
    }
    let child_level = level + 1;
    let h = Hemisphere::from_code(code)?;
    let (fan_lon, fan_lat) = constants::fanout(child_level);

    let mut out = HashSet::with_capacity((fan_lon * fan_lat) as usize);
    for tp in 0..fan_lat as i32 {
        for lp in 0..fan_lon as i32 {
            let frag = encode_fragment(child_level, lp, tp, h);
            out.insert(format!("{code}{frag}"));
        }
    }
    Ok(out)
}

/// All 3D children one level below `code`: the Cartesian product of the
/// 2D child cells and the child level's height slabs.
pub fn children_3d(code: &str) -> Result<HashSet<String>> {
    let level = constants::level_from_3d_len(code.chars().count())
        .ok_or_else(|| GridError::invalid_code(code, "length matches no known level"))?;
    if level == constants::MAX_LEVEL {
        return Err(GridError::invalid_argument(
            "level 10 is the finest level and has no children",
        ));
    }
    let child_level = level + 1;
    let h = Hemisphere::from_parts(code.starts_with('N'), parse_level1_lon(code)?);
    let (fan_lon, fan_lat) = constants::fanout(child_level);
    let height_fanout = 1u32 << constants::height_bits(child_level);

    let mut out = HashSet::with_capacity((fan_lon * fan_lat * height_fanout) as usize);
    for tp in 0..fan_lat as i32 {
        for lp in 0..fan_lon as i32 {
            let frag2d = encode_fragment(child_level, lp, tp, h);
            for slab in 0..height_fanout {
                let frag_h = height::render_level_value(child_level, slab);
                out.insert(format!("{code}{frag2d}{frag_h}"));
            }
        }
    }
    Ok(out)
}

fn parse_level1_lon(code: &str) -> Result<u32> {
    let chars: Vec<char> = code.chars().collect();
    if chars.len() < 4 {
        return Err(GridError::invalid_code(code, "3D code shorter than 4 characters"));
    }
    let digits: String = chars[2..4].iter().collect();
    digits
        .parse()
        .map_err(|_| GridError::invalid_code(code, format!("longitude digits {digits:?} not decimal")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec2d::{decode_2d, encode_2d};
    use crate::codec3d::{decode_3d, encode_3d};
    use crate::point::GeoPoint;

    #[test]
    fn children_2d_count_matches_fanout() {
        let p = GeoPoint::try_new(120.5830508, 31.1415575).unwrap();
        let code = encode_2d(&p, 3).unwrap();
        let kids = children_2d(&code).unwrap();
        let (fan_lon, fan_lat) = constants::fanout(4);
        assert_eq!(kids.len(), (fan_lon * fan_lat) as usize);
        for k in &kids {
            assert!(k.starts_with(&code));
            assert_eq!(k.chars().count(), constants::cumulative_2d_len(4));
        }
    }

    #[test]
    fn children_2d_each_decode_back_into_parent() {
        let p = GeoPoint::try_new(-73.9857, 40.7484).unwrap();
        let code = encode_2d(&p, 5).unwrap();
        for child in children_2d(&code).unwrap() {
            let parent_again = &child[..code.chars().count()];
            assert_eq!(parent_again, code);
            decode_2d(&child).unwrap();
        }
    }

    #[test]
    fn level_10_has_no_children() {
        let p = GeoPoint::try_new(0.0, 0.0).unwrap();
        let code = encode_2d(&p, 10).unwrap();
        assert!(children_2d(&code).is_err());
    }

    #[test]
    fn children_3d_count_matches_fanout_times_height_slabs() {
        let p = GeoPoint::try_new_with_height(2.3488, 48.8534, 35.0).unwrap();
        let code = encode_3d(&p, 2).unwrap();
        let kids = children_3d(&code).unwrap();
        let (fan_lon, fan_lat) = constants::fanout(3);
        let height_fanout = 1usize << constants::height_bits(3);
        assert_eq!(kids.len(), (fan_lon * fan_lat) as usize * height_fanout);
        for k in &kids {
            assert!(k.starts_with(&code));
            decode_3d(k).unwrap();
        }
    }
}
