use serde::Serialize;
use std::fmt;

/// One of the eight compass points used to describe wind bearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Cardinal {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

const COMPASS: [Cardinal; 8] = [
    Cardinal::N,
    Cardinal::NE,
    Cardinal::E,
    Cardinal::SE,
    Cardinal::S,
    Cardinal::SW,
    Cardinal::W,
    Cardinal::NW,
];

impl Cardinal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cardinal::N => "N",
            Cardinal::NE => "NE",
            Cardinal::E => "E",
            Cardinal::SE => "SE",
            Cardinal::S => "S",
            Cardinal::SW => "SW",
            Cardinal::W => "W",
            Cardinal::NW => "NW",
        }
    }
}

impl fmt::Display for Cardinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label a wind bearing with the nearest of the eight compass points.
///
/// Bearings outside `[0, 360)` wrap around; NaN is treated as north.
pub fn degrees_to_cardinal(degrees: f64) -> Cardinal {
    // `as` saturates and maps NaN to 0
    let sector = (degrees / 45.0).round() as i64;
    COMPASS[sector.rem_euclid(8) as usize]
}
