//! Track output and semantic projection.
//!
//! Of everything a recording carries, consumers of this crate want a small
//! projection: the track-point triple (timestamp, latitude, longitude) and
//! the session's sport. The tables here map those fields by global message
//! identifier and field number; every other decoded message projects to
//! nothing, which is an expected outcome rather than an error.

use chrono::{DateTime, Utc};

use crate::wire::data::{DecodedMessage, Value};

/// Unix timestamp of the format epoch, 1989-12-31T00:00:00Z.
const EPOCH_UNIX_SECONDS: i64 = 631_065_600;

/// Global message identifiers with mapped field meanings.
const GLOBAL_SESSION: u16 = 18;
const GLOBAL_RECORD: u16 = 20;

/// Field numbers of a track-point record.
const RECORD_POSITION_LAT: u8 = 0;
const RECORD_POSITION_LONG: u8 = 1;
const RECORD_TIMESTAMP: u8 = 253;

/// Field number of a session's sport code.
const SESSION_SPORT: u8 = 5;

/// One timestamped coordinate of a track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    pub time: DateTime<Utc>,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

/// Sport classification of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sport {
    Generic,
    Running,
    Cycling,
    Transition,
    FitnessEquipment,
    Swimming,
    Walking,
    Hiking,
    EBiking,
    /// A code outside the mapped table.
    Other(u8),
}

impl Sport {
    /// Classify a sport code from a session message.
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Generic,
            1 => Self::Running,
            2 => Self::Cycling,
            3 => Self::Transition,
            4 => Self::FitnessEquipment,
            5 => Self::Swimming,
            11 => Self::Walking,
            17 => Self::Hiking,
            21 => Self::EBiking,
            code => Self::Other(code),
        }
    }

    /// The classification as a display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Running => "running",
            Self::Cycling => "cycling",
            Self::Transition => "transition",
            Self::FitnessEquipment => "fitness_equipment",
            Self::Swimming => "swimming",
            Self::Walking => "walking",
            Self::Hiking => "hiking",
            Self::EBiking => "e_biking",
            Self::Other(_) => "unknown",
        }
    }
}

impl std::fmt::Display for Sport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The output of one decode pass.
///
/// An alternate track source standing in for the binary decoder (a reader
/// of some plain-text track format, say) should produce this same shape:
/// ordered points already in degrees and wall-clock time, with nothing left
/// for consumers to interpret.
#[derive(Debug, Clone, Default)]
pub struct Activity {
    /// Track points, in stream order.
    pub track: Vec<TrackPoint>,
    /// Sport of the first session message carrying one.
    pub sport: Option<Sport>,
}

/// Convert a semicircle-encoded angle to degrees.
///
/// Semicircles are signed 32-bit integers scaled so that ±2³¹ spans ±180°.
pub fn semicircles_to_degrees(v: i32) -> f64 {
    v as f64 * (180.0 / 2_147_483_648.0)
}

/// Convert seconds since the format epoch to wall-clock time.
pub fn timestamp_to_time(seconds: u32) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(EPOCH_UNIX_SECONDS + i64::from(seconds), 0)
}

/// Project a decoded message into the pass output.
pub(crate) fn project(message: &DecodedMessage, out: &mut Activity) {
    match message.global {
        GLOBAL_RECORD => {
            if let Some(point) = track_point(message) {
                out.track.push(point);
            }
        }
        GLOBAL_SESSION => {
            let Some(code) = message.field(SESSION_SPORT).and_then(Value::as_u8) else {
                return;
            };

            if code != u8::MAX && out.sport.is_none() {
                out.sport = Some(Sport::from_code(code));
            }
        }
        _ => {}
    }
}

/// Build a track point from a record message.
///
/// Records legitimately omit position (and occasionally time), or carry the
/// base type's invalid marker in their place; either way there is no point
/// to emit.
fn track_point(message: &DecodedMessage) -> Option<TrackPoint> {
    let seconds = message
        .field(RECORD_TIMESTAMP)?
        .as_u32()
        .filter(|&v| v != u32::MAX)?;
    let latitude = message
        .field(RECORD_POSITION_LAT)?
        .as_i32()
        .filter(|&v| v != i32::MAX)?;
    let longitude = message
        .field(RECORD_POSITION_LONG)?
        .as_i32()
        .filter(|&v| v != i32::MAX)?;

    Some(TrackPoint {
        time: timestamp_to_time(seconds)?,
        latitude: semicircles_to_degrees(latitude),
        longitude: semicircles_to_degrees(longitude),
    })
}
