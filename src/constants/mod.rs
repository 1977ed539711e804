//! Constants module for ephemeris handling and time conversion

// Time constants
/// Seconds in a day
pub const DAY_S: f64 = 86_400.0;
/// Milliseconds in a day
pub const DAY_MS: i64 = 86_400_000;
/// Julian date of the Unix epoch (1970-01-01T00:00:00)
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;
/// Fixed TDB minus UTC offset in milliseconds (32.184 s + 37 leap seconds, rounded)
///
/// No leap-second table is consulted; this is the offset valid since 2017.
pub const TDB_MINUS_UTC_MS: i64 = 69_183;

// Sampling
/// Spacing between two consecutive trajectory samples in seconds
pub const STEP_S: f64 = 60.0;

// Physics
/// Newtonian constant of gravitation in m^3 kg^-1 s^-2 (CODATA 2018)
pub const G: f64 = 6.674_30e-11;
/// Kilometers to meters
pub const KM_TO_M: f64 = 1_000.0;
/// km^3/s^2 to m^3/s^2
pub const KM3_TO_M3: f64 = 1e9;

// Cache layout
/// Default root of the on-disk cache
pub const DEFAULT_DATA_DIR: &str = "./data";
/// File name of the shared metadata document
pub const META_FILE: &str = "meta.json";
/// File name of the tracked bodies list
pub const TRACK_FILE: &str = "track_bodies.json";
/// Horizons file API endpoint
pub const HORIZONS_FILE_API: &str = "https://ssd.jpl.nasa.gov/api/horizons_file.api";
