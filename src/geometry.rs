//! Minimal planar-geometry predicates needed by range queries (spec §4.7,
//! §9: full geometric algebra is explicitly out of scope). Coordinates are
//! plain `geo_types` values; this module owns only the handful of
//! intersection tests a grid-cell range query needs, not a geometry
//! kernel.

use geo_types::{Coord, Geometry, Line, Point, Polygon, Rect};

use crate::error::{GridError, Result};

/// The bounding box of any supported query geometry.
pub fn bounding_box(geom: &Geometry<f64>) -> Result<Rect<f64>> {
    match geom {
        Geometry::Point(p) => Ok(Rect::new(p.0, p.0)),
        Geometry::Line(l) => Ok(Rect::new(l.start, l.end)),
        Geometry::Polygon(poly) => polygon_bbox(poly),
        Geometry::Rect(r) => Ok(*r),
        other => Err(GridError::invalid_argument(format!(
            "unsupported query geometry variant: {other:?}"
        ))),
    }
}

fn polygon_bbox(poly: &Polygon<f64>) -> Result<Rect<f64>> {
    let mut coords = poly.exterior().coords();
    let first = coords
        .next()
        .ok_or_else(|| GridError::invalid_argument("polygon has no exterior ring"))?;
    let (mut min_x, mut min_y) = (first.x, first.y);
    let (mut max_x, mut max_y) = (first.x, first.y);
    for c in coords {
        min_x = min_x.min(c.x);
        min_y = min_y.min(c.y);
        max_x = max_x.max(c.x);
        max_y = max_y.max(c.y);
    }
    Ok(Rect::new(
        Coord { x: min_x, y: min_y },
        Coord { x: max_x, y: max_y },
    ))
}

/// Whether `geom` intersects the axis-aligned `cell`.
pub fn intersects_cell(geom: &Geometry<f64>, cell: Rect<f64>) -> Result<bool> {
    match geom {
        Geometry::Point(p) => Ok(rect_contains_point(cell, *p)),
        Geometry::Line(l) => Ok(segment_intersects_rect(*l, cell)),
        Geometry::Polygon(poly) => Ok(polygon_intersects_rect(poly, cell)),
        Geometry::Rect(r) => Ok(rects_intersect(*r, cell)),
        other => Err(GridError::invalid_argument(format!(
            "unsupported query geometry variant: {other:?}"
        ))),
    }
}

fn rect_contains_point(rect: Rect<f64>, p: Point<f64>) -> bool {
    p.x() >= rect.min().x && p.x() <= rect.max().x && p.y() >= rect.min().y && p.y() <= rect.max().y
}

fn rects_intersect(a: Rect<f64>, b: Rect<f64>) -> bool {
    a.min().x <= b.max().x && a.max().x >= b.min().x && a.min().y <= b.max().y && a.max().y >= b.min().y
}

/// Cohen-Sutherland outcode bits, used to cheaply reject segments that lie
/// entirely to one side of the cell before falling back to an exact clip.
fn outcode(rect: Rect<f64>, c: Coord<f64>) -> u8 {
    let mut code = 0u8;
    if c.x < rect.min().x {
        code |= 1;
    } else if c.x > rect.max().x {
        code |= 2;
    }
    if c.y < rect.min().y {
        code |= 4;
    } else if c.y > rect.max().y {
        code |= 8;
    }
    code
}

fn segment_intersects_rect(line: Line<f64>, rect: Rect<f64>) -> bool {
    let mut a = line.start;
    let mut b = line.end;
    let mut code_a = outcode(rect, a);
    let mut code_b = outcode(rect, b);

    loop {
        if code_a == 0 || code_b == 0 {
            return true;
        }
        if code_a & code_b != 0 {
            return false;
        }
        let code_out = if code_a != 0 { code_a } else { code_b };
        let (dx, dy) = (b.x - a.x, b.y - a.y);
        let new = if code_out & 8 != 0 {
            Coord {
                x: a.x + dx * (rect.max().y - a.y) / dy,
                y: rect.max().y,
            }
        } else if code_out & 4 != 0 {
            Coord {
                x: a.x + dx * (rect.min().y - a.y) / dy,
                y: rect.min().y,
            }
        } else if code_out & 2 != 0 {
            Coord {
                x: rect.max().x,
                y: a.y + dy * (rect.max().x - a.x) / dx,
            }
        } else {
            Coord {
                x: rect.min().x,
                y: a.y + dy * (rect.min().x - a.x) / dx,
            }
        };
        if code_out == code_a {
            a = new;
            code_a = outcode(rect, a);
        } else {
            b = new;
            code_b = outcode(rect, b);
        }
    }
}

fn point_in_polygon(poly: &Polygon<f64>, c: Coord<f64>) -> bool {
    let ring = poly.exterior();
    let coords: Vec<Coord<f64>> = ring.coords().copied().collect();
    let mut inside = false;
    let n = coords.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (coords[i].x, coords[i].y);
        let (xj, yj) = (coords[j].x, coords[j].y);
        if (yi > c.y) != (yj > c.y) && c.x < (xj - xi) * (c.y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn polygon_intersects_rect(poly: &Polygon<f64>, rect: Rect<f64>) -> bool {
    let ring = poly.exterior();
    let coords: Vec<Coord<f64>> = ring.coords().copied().collect();
    if coords.iter().any(|&c| rect_contains_point(rect, Point(c))) {
        return true;
    }
    for corner in [
        rect.min(),
        Coord { x: rect.max().x, y: rect.min().y },
        rect.max(),
        Coord { x: rect.min().x, y: rect.max().y },
    ] {
        if point_in_polygon(poly, corner) {
            return true;
        }
    }
    let rect_edges = [
        Line::new(rect.min(), Coord { x: rect.max().x, y: rect.min().y }),
        Line::new(Coord { x: rect.max().x, y: rect.min().y }, rect.max()),
        Line::new(rect.max(), Coord { x: rect.min().x, y: rect.max().y }),
        Line::new(Coord { x: rect.min().x, y: rect.max().y }, rect.min()),
    ];
    for w in coords.windows(2) {
        let poly_edge = Line::new(w[0], w[1]);
        if rect_edges.iter().any(|&e| segments_cross(poly_edge, e)) {
            return true;
        }
    }
    false
}

fn orientation(a: Coord<f64>, b: Coord<f64>, c: Coord<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn on_segment(a: Coord<f64>, b: Coord<f64>, c: Coord<f64>) -> bool {
    c.x >= a.x.min(b.x) && c.x <= a.x.max(b.x) && c.y >= a.y.min(b.y) && c.y <= a.y.max(b.y)
}

fn segments_cross(l1: Line<f64>, l2: Line<f64>) -> bool {
    let (p1, q1, p2, q2) = (l1.start, l1.end, l2.start, l2.end);
    let o1 = orientation(p1, q1, p2);
    let o2 = orientation(p1, q1, q2);
    let o3 = orientation(p2, q2, p1);
    let o4 = orientation(p2, q2, q1);

    if (o1 > 0.0) != (o2 > 0.0) && (o3 > 0.0) != (o4 > 0.0) {
        return true;
    }
    (o1 == 0.0 && on_segment(p1, q1, p2))
        || (o2 == 0.0 && on_segment(p1, q1, q2))
        || (o3 == 0.0 && on_segment(p2, q2, p1))
        || (o4 == 0.0 && on_segment(p2, q2, q1))
}
