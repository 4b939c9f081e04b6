//! 3D encode/decode (spec §4.5): adds a height-sign digit after the
//! hemisphere letter, then interleaves each level's 2D fragment with that
//! level's height fragment (spec §4.5, §9).

use num_traits::ToPrimitive;
use rust_decimal::Decimal;

use crate::codec2d::{decode_fragment, encode_fragment};
use crate::constants;
use crate::error::{GridError, Result};
use crate::height;
use crate::hemisphere::Hemisphere;
use crate::point::GeoPoint;

const POLAR_LIMIT: f64 = 88.0;

/// Encodes a point (with height) into a 3D grid code at the given level.
pub fn encode_3d(point: &GeoPoint, level: u8) -> Result<String> {
    constants::validate_level(level)?;
    if point.lat.abs() >= POLAR_LIMIT {
        return Err(GridError::unsupported_polar(format!(
            "|latitude| {} >= {POLAR_LIMIT} is not defined by this standard",
            point.lat.abs()
        )));
    }

    let h = Hemisphere::from_point(point.lon, point.lat);
    let (negative, magnitude) = height::height_to_n(point.height)?;

    let mut code = String::with_capacity(constants::cumulative_3d_len(level));
    code.push(h.lat_char());
    code.push(if negative { '1' } else { '0' });

    let lon_signed = Decimal::from_f64_retain(point.lon)
        .ok_or_else(|| GridError::invalid_argument("longitude not representable as decimal"))?;
    let lat_abs = Decimal::from_f64_retain(point.lat.abs())
        .ok_or_else(|| GridError::invalid_argument("latitude not representable as decimal"))?;

    let mut base_lon = Decimal::ZERO;
    let mut base_lat = Decimal::ZERO;

    for i in 1..=level {
        let delta_lon = constants::delta_lon_deg(i);
        let delta_lat = constants::delta_lat_deg(i);
        let lon_i = if i == 1 { lon_signed } else { lon_signed.abs() };

        let lp = ((lon_i - base_lon) / delta_lon).floor();
        let tp = ((lat_abs - base_lat) / delta_lat).floor();
        let lp = lp
            .to_i32()
            .ok_or_else(|| GridError::invalid_argument("longitude index overflow"))?;
        let tp = tp
            .to_i32()
            .ok_or_else(|| GridError::invalid_argument("latitude index overflow"))?;

        if i == 1 {
            let base_step = if lp >= 0 {
                Decimal::from(lp)
            } else {
                Decimal::from(-lp - 1)
            };
            base_lon += base_step * delta_lon;
            base_lat += Decimal::from(tp) * delta_lat;

            code.push_str(&format!("{:02}", lp + 31));
            code.push((b'A' + tp as u8) as char);
        } else {
            base_lon += Decimal::from(lp) * delta_lon;
            base_lat += Decimal::from(tp) * delta_lat;
            code.push_str(&encode_fragment(i, lp, tp, h));
        }

        code.push_str(&height::fragment_for_level(i, magnitude));
    }

    Ok(code)
}

/// Decodes a 3D grid code to the south-west-bottom corner of its cell.
pub fn decode_3d(code: &str) -> Result<GeoPoint> {
    let chars: Vec<char> = code.chars().collect();
    let level = constants::level_from_3d_len(chars.len())
        .ok_or_else(|| GridError::invalid_code(code, "length matches no known level"))?;

    let lat_sign = match chars[0] {
        'N' => 1.0,
        'S' => -1.0,
        other => {
            return Err(GridError::invalid_code(
                code,
                format!("hemisphere prefix {other:?} is neither N nor S"),
            ))
        }
    };
    let height_negative = match chars[1] {
        '0' => false,
        '1' => true,
        other => {
            return Err(GridError::invalid_code(
                code,
                format!("height sign digit {other:?} is neither 0 nor 1"),
            ))
        }
    };

    let mut pos = 2usize;
    let mut sum_lon_sec = 0.0f64;
    let mut sum_lat_sec = 0.0f64;
    let mut magnitude = 0u32;
    let mut h: Option<Hemisphere> = None;
    let mut lon_sign = 1.0;

    for i in 1..=level {
        if i == 1 {
            let lon_digits: String = chars[pos..pos + 2].iter().collect();
            let lon_raw: i32 = lon_digits.parse().map_err(|_| {
                GridError::invalid_code(code, format!("longitude digits {lon_digits:?} not decimal"))
            })?;
            let lat_char = chars[pos + 2];
            if !('A'..='V').contains(&lat_char) {
                return Err(GridError::invalid_code(
                    code,
                    format!("level-1 latitude char {lat_char:?} outside A..V"),
                ));
            }
            if lon_raw == 0 {
                return Err(GridError::unsupported_polar(
                    "level-1 longitude index 0 is reserved for polar regions",
                ));
            }
            let resolved = Hemisphere::from_parts(chars[0] == 'N', lon_raw as u32);
            lon_sign = resolved.lon_sign();
            h = Some(resolved);

            let lat_idx = (lat_char as u8 - b'A') as i32;
            let lon_remapped = if lon_raw >= 31 { lon_raw - 31 } else { 30 - lon_raw };

            sum_lon_sec += lon_remapped as f64 * constants::delta_lon_sec(1);
            sum_lat_sec += lat_idx as f64 * constants::delta_lat_sec(1);
            pos += 3;
        } else {
            let flen = constants::frag2d_len(i);
            if pos + flen > chars.len() {
                return Err(GridError::invalid_code(code, "truncated 2D fragment"));
            }
            let frag: String = chars[pos..pos + flen].iter().collect();
            let (lp, tp) = decode_fragment(code, i, &frag, h.expect("hemisphere resolved at level 1"))?;
            sum_lon_sec += lp as f64 * constants::delta_lon_sec(i);
            sum_lat_sec += tp as f64 * constants::delta_lat_sec(i);
            pos += flen;
        }

        let hflen = constants::height_frag_len(i);
        if pos + hflen > chars.len() {
            return Err(GridError::invalid_code(code, "truncated height fragment"));
        }
        let hfrag: String = chars[pos..pos + hflen].iter().collect();
        height::accumulate_fragment(code, i, &hfrag, &mut magnitude)?;
        pos += hflen;
    }

    let lon = lon_sign * sum_lon_sec / 3600.0;
    let lat = lat_sign * sum_lat_sec / 3600.0;
    let height_m = height::n_to_height(height_negative, magnitude);
    GeoPoint::try_new_with_height(lon, lat, height_m)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_matches_cumulative_table_for_every_level() {
        let p = GeoPoint::try_new_with_height(120.5830508, 31.1415575, 120.0).unwrap();
        for level in 1..=10u8 {
            let code = encode_3d(&p, level).unwrap();
            assert_eq!(code.chars().count(), constants::cumulative_3d_len(level));
        }
    }

    #[test]
    fn second_char_reflects_height_sign() {
        let above = GeoPoint::try_new_with_height(0.0, 0.0, 50.0).unwrap();
        let below = GeoPoint::try_new_with_height(0.0, 0.0, -50.0).unwrap();
        let code_above = encode_3d(&above, 3).unwrap();
        let code_below = encode_3d(&below, 3).unwrap();
        assert_eq!(code_above.chars().nth(1), Some('0'));
        assert_eq!(code_below.chars().nth(1), Some('1'));
    }

    #[test]
    fn round_trip_recovers_height_sign_and_rough_magnitude() {
        let points = [
            (120.5830508, 31.1415575, 8848.86),
            (-73.9857, 40.7484, -15.0),
            (2.3488, 48.8534, 0.0),
        ];
        for &(lon, lat, height) in &points {
            let p = GeoPoint::try_new_with_height(lon, lat, height).unwrap();
            for level in [1u8, 3, 6, 10] {
                let code = encode_3d(&p, level).unwrap();
                let back = decode_3d(&code).unwrap();
                assert_eq!(back.height >= 0.0, height >= 0.0, "level {level}");
                let re = encode_3d(&back, level).unwrap();
                assert_eq!(re, code, "level {level} point ({lon},{lat},{height})");
            }
        }
    }

    #[test]
    fn rejects_truncated_code() {
        assert!(decode_3d("N0").is_err());
    }
}
