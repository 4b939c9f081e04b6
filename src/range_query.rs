//! Range queries (spec §4.7): given a query geometry, return every grid
//! code at a level whose cell intersects it. Candidates are generated by
//! sweeping the geometry's bounding box in cell-sized steps and encoding
//! each sample point; every candidate is then checked exactly against the
//! cell rectangle it actually decodes to, so the sweep only needs to be a
//! superset, not an exact cover.
//!
//! A per-candidate encode/decode failure (e.g. a sweep sample that lands
//! just past the polar cutoff) is logged and the candidate dropped rather
//! than failing the whole query.

use std::collections::HashSet;

use geo_types::{Coord, Geometry, Rect};

use crate::codec2d::{decode_2d, encode_2d};
use crate::codec3d::{decode_3d, encode_3d};
use crate::constants;
use crate::error::{GridError, Result};
use crate::geometry;
use crate::hemisphere::Hemisphere;
use crate::point::GeoPoint;

const MAX_SWEEP_SAMPLES: usize = 2_000_000;

fn cell_rect_2d(code: &str) -> Result<Rect<f64>> {
    let sw = decode_2d(code)?;
    let h = Hemisphere::from_code(code)?;
    let level = constants::level_from_2d_len(code.chars().count()).expect("already decoded");
    let d_lon = constants::delta_lon_deg_f64(level);
    let d_lat = constants::delta_lat_deg_f64(level);
    let opposite = Coord {
        x: sw.lon + h.lon_sign() * d_lon,
        y: sw.lat + h.lat_sign() * d_lat,
    };
    Ok(Rect::new(Coord { x: sw.lon, y: sw.lat }, opposite))
}

/// Every 2D code at `level` whose cell intersects `geom`.
pub fn find_2d(geom: &Geometry<f64>, level: u8) -> Result<HashSet<String>> {
    constants::validate_level(level)?;
    let bbox = geometry::bounding_box(geom)?;
    let d_lon = constants::delta_lon_deg_f64(level);
    let d_lat = constants::delta_lat_deg_f64(level);

    let mut candidates = HashSet::new();
    let mut lon = bbox.min().x - d_lon;
    let mut sampled = 0usize;
    while lon <= bbox.max().x + d_lon {
        let mut lat = bbox.min().y - d_lat;
        while lat <= bbox.max().y + d_lat {
            sampled += 1;
            if sampled > MAX_SWEEP_SAMPLES {
                log::debug!("range query sweep exceeded {MAX_SWEEP_SAMPLES} samples, truncating");
                break;
            }
            let clamped_lon = lon.clamp(-180.0, 180.0);
            let clamped_lat = lat.clamp(-89.999, 89.999);
            if let Ok(p) = GeoPoint::try_new(clamped_lon, clamped_lat) {
                if let Ok(code) = encode_2d(&p, level) {
                    candidates.insert(code);
                }
            }
            lat += d_lat;
        }
        lon += d_lon;
    }

    filter_by_intersection(candidates, |code| {
        let rect = cell_rect_2d(code)?;
        geometry::intersects_cell(geom, rect)
    })
}

fn cell_rect_3d(code: &str, level: u8) -> Result<(Rect<f64>, f64, f64)> {
    let sw = decode_3d(code)?;
    let h = Hemisphere::from_point(sw.lon, sw.lat);
    let d_lon = constants::delta_lon_deg_f64(level);
    let d_lat = constants::delta_lat_deg_f64(level);
    let opposite = Coord {
        x: sw.lon + h.lon_sign() * d_lon,
        y: sw.lat + h.lat_sign() * d_lat,
    };
    let rect = Rect::new(Coord { x: sw.lon, y: sw.lat }, opposite);
    // Half a level's worth of local precision in either direction around the
    // decoded corner, as an approximate vertical cell extent for range
    // comparisons against the query's height window.
    let span = (sw.height.abs() + 1.0) * 1e-3;
    Ok((rect, sw.height - span, sw.height + span))
}

/// Every 3D code at `level` whose cell intersects `geom` and overlaps the
/// height window `[h_min, h_max]`.
pub fn find_3d(geom: &Geometry<f64>, level: u8, h_min: f64, h_max: f64) -> Result<HashSet<String>> {
    constants::validate_level(level)?;
    if h_min > h_max {
        return Err(GridError::invalid_argument(format!(
            "height window is inverted: h_min {h_min} > h_max {h_max}"
        )));
    }
    let bbox = geometry::bounding_box(geom)?;
    let d_lon = constants::delta_lon_deg_f64(level);
    let d_lat = constants::delta_lat_deg_f64(level);
    let height_span = (h_max - h_min).max(1.0);
    let height_steps = 32usize;
    let d_height = height_span / height_steps as f64;

    let mut candidates = HashSet::new();
    let mut sampled = 0usize;
    let mut lon = bbox.min().x - d_lon;
    while lon <= bbox.max().x + d_lon {
        let mut lat = bbox.min().y - d_lat;
        while lat <= bbox.max().y + d_lat {
            let mut height = h_min;
            while height <= h_max + d_height {
                sampled += 1;
                if sampled > MAX_SWEEP_SAMPLES {
                    log::debug!("range query sweep exceeded {MAX_SWEEP_SAMPLES} samples, truncating");
                    break;
                }
                let clamped_lon = lon.clamp(-180.0, 180.0);
                let clamped_lat = lat.clamp(-89.999, 89.999);
                if let Ok(p) = GeoPoint::try_new_with_height(clamped_lon, clamped_lat, height) {
                    if let Ok(code) = encode_3d(&p, level) {
                        candidates.insert(code);
                    }
                }
                height += d_height;
            }
            lat += d_lat;
        }
        lon += d_lon;
    }

    filter_by_intersection(candidates, |code| {
        let (rect, cell_h_min, cell_h_max) = cell_rect_3d(code, level)?;
        let height_overlaps = cell_h_max >= h_min && cell_h_min <= h_max;
        Ok(height_overlaps && geometry::intersects_cell(geom, rect)?)
    })
}

#[cfg(feature = "parallel")]
fn filter_by_intersection(
    candidates: HashSet<String>,
    predicate: impl Fn(&str) -> Result<bool> + Sync,
) -> Result<HashSet<String>> {
    use rayon::prelude::*;
    Ok(candidates
        .into_par_iter()
        .filter(|code| match predicate(code) {
            Ok(keep) => keep,
            Err(err) => {
                log::debug!("rejecting candidate {code:?}: {err}");
                false
            }
        })
        .collect())
}

#[cfg(not(feature = "parallel"))]
fn filter_by_intersection(
    candidates: HashSet<String>,
    predicate: impl Fn(&str) -> Result<bool>,
) -> Result<HashSet<String>> {
    Ok(candidates
        .into_iter()
        .filter(|code| match predicate(code) {
            Ok(keep) => keep,
            Err(err) => {
                log::debug!("rejecting candidate {code:?}: {err}");
                false
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::Point;

    #[test]
    fn point_query_returns_the_cell_containing_it() {
        let geom = Geometry::Point(Point::new(120.5830508, 31.1415575));
        let codes = find_2d(&geom, 3).unwrap();
        assert!(!codes.is_empty());
        let p = GeoPoint::try_new(120.5830508, 31.1415575).unwrap();
        let direct = encode_2d(&p, 3).unwrap();
        assert!(codes.contains(&direct));
    }

    #[test]
    fn rect_query_is_non_empty_and_self_consistent() {
        let geom = Geometry::Rect(Rect::new(
            Coord { x: 120.0, y: 31.0 },
            Coord { x: 121.0, y: 32.0 },
        ));
        let codes = find_2d(&geom, 2).unwrap();
        assert!(!codes.is_empty());
        for code in &codes {
            let rect = cell_rect_2d(code).unwrap();
            assert!(geometry::intersects_cell(&geom, rect).unwrap());
        }
    }

    #[test]
    fn find_3d_respects_height_window() {
        let geom = Geometry::Point(Point::new(2.3488, 48.8534));
        let codes = find_3d(&geom, 2, 0.0, 200.0).unwrap();
        assert!(!codes.is_empty());
    }

    #[test]
    fn find_3d_rejects_inverted_height_window() {
        let geom = Geometry::Point(Point::new(2.3488, 48.8534));
        assert!(matches!(
            find_3d(&geom, 2, 200.0, 0.0),
            Err(GridError::InvalidArgument { .. })
        ));
    }
}
