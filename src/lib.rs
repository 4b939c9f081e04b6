//! Codec for GB/T 39409-2020 BeiDou grid location codes: hierarchical,
//! hemisphere-aware textual encoding of geographic coordinates into
//! rectangular grid cells across ten levels of refinement, in 2D and 3D
//! variants, plus child-cell enumeration and geometry range queries.

pub mod children;
pub mod codec2d;
pub mod codec3d;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod height;
pub mod hemisphere;
pub mod point;
pub mod range_query;
mod zorder;

pub use children::{children_2d, children_3d};
pub use codec2d::{decode_2d, encode_2d};
pub use codec3d::{decode_3d, encode_3d};
pub use error::{GridError, Result};
pub use hemisphere::Hemisphere;
pub use point::GeoPoint;
pub use range_query::{find_2d, find_3d};
