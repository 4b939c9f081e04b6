use crate::error::{GridError, Result};

/// One of the four quadrants the grid subdivides the globe into. Zero
/// coordinates sit in NE: 0° latitude is north, 0° longitude is east
/// (spec §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hemisphere {
    Ne,
    Nw,
    Se,
    Sw,
}

impl Hemisphere {
    pub fn from_point(lon: f64, lat: f64) -> Hemisphere {
        match (lat >= 0.0, lon >= 0.0) {
            (true, true) => Hemisphere::Ne,
            (true, false) => Hemisphere::Nw,
            (false, true) => Hemisphere::Se,
            (false, false) => Hemisphere::Sw,
        }
    }

    /// Recovers the hemisphere from a code prefix: the first character
    /// gives the latitude direction, the level-1 longitude digits (chars
    /// 2..3) give the longitude direction (spec §4.2).
    pub fn from_code(code: &str) -> Result<Hemisphere> {
        let chars: Vec<char> = code.chars().collect();
        if chars.len() < 3 {
            return Err(GridError::invalid_code(
                code,
                "code shorter than 3 characters",
            ));
        }
        let north = chars[0] == 'N';
        let lon_digits: String = chars[1..3].iter().collect();
        let lon_index: u32 = lon_digits.parse().map_err(|_| {
            GridError::invalid_code(code, format!("longitude digits {lon_digits:?} not decimal"))
        })?;
        Ok(Hemisphere::from_parts(north, lon_index))
    }

    /// Same determination as `from_code`, for callers that have already
    /// located the hemisphere letter and the level-1 longitude digits
    /// themselves (3D codes carry a height-sign digit between the two).
    pub(crate) fn from_parts(north: bool, lon_index: u32) -> Hemisphere {
        let east = lon_index >= 31;
        match (north, east) {
            (true, true) => Hemisphere::Ne,
            (true, false) => Hemisphere::Nw,
            (false, true) => Hemisphere::Se,
            (false, false) => Hemisphere::Sw,
        }
    }

    /// The leading character of a code encoding this hemisphere's latitude
    /// direction.
    pub fn lat_char(self) -> char {
        match self {
            Hemisphere::Ne | Hemisphere::Nw => 'N',
            Hemisphere::Se | Hemisphere::Sw => 'S',
        }
    }

    pub fn lon_sign(self) -> f64 {
        match self {
            Hemisphere::Ne | Hemisphere::Se => 1.0,
            Hemisphere::Nw | Hemisphere::Sw => -1.0,
        }
    }

    pub fn lat_sign(self) -> f64 {
        match self {
            Hemisphere::Ne | Hemisphere::Nw => 1.0,
            Hemisphere::Se | Hemisphere::Sw => -1.0,
        }
    }
}

/// Maps a raw `(lng, lat)` cell index pair into the orientation used by a
/// given hemisphere, against the bounds `(max_lng, max_lat)` (spec §4.3).
/// This is an involution: applying it twice with the same bounds returns
/// the original pair, which is what lets the decoder reuse it to invert
/// the encoder's step.
pub fn h_adjust(h: Hemisphere, lng: i32, lat: i32, max_lng: i32, max_lat: i32) -> (i32, i32) {
    match h {
        Hemisphere::Ne => (lng, lat),
        Hemisphere::Nw => (lng, max_lat - lat),
        Hemisphere::Sw => (max_lng - lng, max_lat - lat),
        Hemisphere::Se => (max_lng - lng, lat),
    }
}
