use std::fs;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use geo_types::{Coord, Geometry, Line, LineString, Point, Polygon};

use beidou_grid::error::GridError;
use beidou_grid::{children_2d, children_3d, decode_2d, decode_3d, encode_2d, encode_3d, find_2d, find_3d, GeoPoint};

#[derive(Parser)]
#[command(name = "beidou-grid", about = "GB/T 39409-2020 BeiDou grid location codec")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encode a 2D point into a grid code.
    Encode2d {
        lon: f64,
        lat: f64,
        #[arg(long, default_value_t = 10)]
        level: u8,
    },
    /// Decode a 2D grid code into its south-west corner.
    Decode2d { code: String },
    /// Encode a 3D point into a grid code.
    Encode3d {
        lon: f64,
        lat: f64,
        height: f64,
        #[arg(long, default_value_t = 10)]
        level: u8,
    },
    /// Decode a 3D grid code into its south-west-bottom corner.
    Decode3d { code: String },
    /// List the children of a grid code one level finer.
    Children {
        code: String,
        #[arg(long)]
        three_d: bool,
    },
    /// Find every code at a level whose cell intersects a GeoJSON geometry.
    Intersect {
        geojson_path: String,
        #[arg(long, default_value_t = 10)]
        level: u8,
        #[arg(long)]
        height_min: Option<f64>,
        #[arg(long)]
        height_max: Option<f64>,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            exit_code_for(&err)
        }
    }
}

fn exit_code_for(err: &GridError) -> ExitCode {
    match err {
        GridError::InvalidArgument { .. } => ExitCode::from(2),
        GridError::InvalidCode { .. } => ExitCode::from(3),
        GridError::UnsupportedPolar { .. } => ExitCode::from(4),
    }
}

fn run(command: Command) -> beidou_grid::Result<()> {
    match command {
        Command::Encode2d { lon, lat, level } => {
            let point = GeoPoint::try_new(lon, lat)?;
            println!("{}", encode_2d(&point, level)?);
        }
        Command::Decode2d { code } => {
            let point = decode_2d(&code)?;
            println!("{} {}", point.lon, point.lat);
        }
        Command::Encode3d { lon, lat, height, level } => {
            let point = GeoPoint::try_new_with_height(lon, lat, height)?;
            println!("{}", encode_3d(&point, level)?);
        }
        Command::Decode3d { code } => {
            let point = decode_3d(&code)?;
            println!("{} {} {}", point.lon, point.lat, point.height);
        }
        Command::Children { code, three_d } => {
            let mut kids: Vec<String> = if three_d {
                children_3d(&code)?.into_iter().collect()
            } else {
                children_2d(&code)?.into_iter().collect()
            };
            kids.sort();
            for k in kids {
                println!("{k}");
            }
        }
        Command::Intersect {
            geojson_path,
            level,
            height_min,
            height_max,
        } => {
            let text = fs::read_to_string(&geojson_path)
                .map_err(|e| GridError::invalid_argument(format!("reading {geojson_path:?}: {e}")))?;
            let value: serde_json::Value = serde_json::from_str(&text)
                .map_err(|e| GridError::invalid_argument(format!("parsing GeoJSON: {e}")))?;
            let geom = geometry_from_geojson(&value)?;

            let mut codes: Vec<String> = if let (Some(h_min), Some(h_max)) = (height_min, height_max) {
                find_3d(&geom, level, h_min, h_max)?.into_iter().collect()
            } else {
                find_2d(&geom, level)?.into_iter().collect()
            };
            codes.sort();
            for c in codes {
                println!("{c}");
            }
        }
    }
    Ok(())
}

/// Converts a minimal subset of GeoJSON (Point, LineString, Polygon) into
/// `geo_types::Geometry`. Not a general GeoJSON reader: only what the
/// `intersect` subcommand needs.
fn geometry_from_geojson(value: &serde_json::Value) -> beidou_grid::Result<Geometry<f64>> {
    let geometry = value.get("geometry").unwrap_or(value);
    let kind = geometry
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or_else(|| GridError::invalid_argument("GeoJSON object missing \"type\""))?;
    let coords = geometry
        .get("coordinates")
        .ok_or_else(|| GridError::invalid_argument("GeoJSON object missing \"coordinates\""))?;

    match kind {
        "Point" => {
            let c = parse_coord(coords)?;
            Ok(Geometry::Point(Point::new(c.x, c.y)))
        }
        "LineString" => {
            let points = parse_coord_list(coords)?;
            let (first, last) = (
                *points.first().ok_or_else(|| GridError::invalid_argument("empty LineString"))?,
                *points.last().ok_or_else(|| GridError::invalid_argument("empty LineString"))?,
            );
            Ok(Geometry::Line(Line::new(first, last)))
        }
        "Polygon" => {
            let rings = coords
                .as_array()
                .ok_or_else(|| GridError::invalid_argument("Polygon coordinates must be an array"))?;
            let exterior = rings
                .first()
                .ok_or_else(|| GridError::invalid_argument("Polygon has no exterior ring"))?;
            let points = parse_coord_list(exterior)?;
            Ok(Geometry::Polygon(Polygon::new(LineString::from(points), vec![])))
        }
        other => Err(GridError::invalid_argument(format!(
            "unsupported GeoJSON geometry type {other:?}"
        ))),
    }
}

fn parse_coord(value: &serde_json::Value) -> beidou_grid::Result<Coord<f64>> {
    let arr = value
        .as_array()
        .ok_or_else(|| GridError::invalid_argument("coordinate is not an array"))?;
    let x = arr
        .first()
        .and_then(|v| v.as_f64())
        .ok_or_else(|| GridError::invalid_argument("coordinate missing x"))?;
    let y = arr
        .get(1)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| GridError::invalid_argument("coordinate missing y"))?;
    Ok(Coord { x, y })
}

fn parse_coord_list(value: &serde_json::Value) -> beidou_grid::Result<Vec<Coord<f64>>> {
    let arr = value
        .as_array()
        .ok_or_else(|| GridError::invalid_argument("coordinate list is not an array"))?;
    arr.iter().map(parse_coord).collect()
}
