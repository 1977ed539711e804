//! Decoder for Horizons text responses
//!
//! A response is a free-text header describing the target (name, physical
//! constants in whatever notation the source body's page uses), followed by
//! the vector table between `$$SOE` and `$$EOE` markers. Extraction is best
//! effort: anything not recognized keeps its default.

use crate::constants::{G, KM3_TO_M3, KM_TO_M};
use lazy_static::lazy_static;
use nalgebra::Vector3;
use regex::{Captures, Regex};

/// Column header prepended to the reduced CSV
pub const CSV_HEADER: &str = "JDTDB, Calendar Date (TDB), X, Y, Z, VX, VY, VZ, ";

const START_OF_ENTRIES: &str = "$$SOE";
const END_OF_ENTRIES: &str = "$$EOE";
const TARGET_LABEL: &str = "Target body name:";
const TABLE_LABEL: &str = "Calendar Date (TDB)";

/// A decimal number as it appears in Horizons headers
macro_rules! num {
    () => {
        r"([+-]?\d*\.\d+|\d+)"
    };
}

lazy_static! {
    /// GM notations, tried in priority order; the first hit wins
    static ref GM_PATTERNS: Vec<Regex> = vec![
        Regex::new(concat!(r"GM\s*\(km\^3/s\^2\)\s*=\s*", num!())).unwrap(),
        Regex::new(concat!(r"GM,\s*km\^3/s\^2\s*=\s*", num!())).unwrap(),
        Regex::new(concat!(r"GM\s*\(planet\)\s*km\^3/s\^2\s*=\s*", num!())).unwrap(),
        Regex::new(concat!(r"GM\s*=\s*", num!())).unwrap(),
    ];

    /// `Mass (10^e1 kg) = m (10^e2)`, converted to GM when no GM line matched
    static ref MASS_PATTERN: Regex = Regex::new(concat!(
        r"Mass\s*\(10\^([+-]?\d+)\s*kg\s*\)\s*=\s*",
        num!(),
        r"\s*\(10\^([+-]?\d+)\)"
    ))
    .unwrap();

    /// Single-value radius notations; every match overwrites the previous guess
    static ref MEAN_RADIUS_PATTERNS: Vec<Regex> = vec![
        Regex::new(concat!(r"Mean\s*radius\s*\(km\)\s*=\s*", num!(), r"(\s*\+-\s*", num!(), ")?")).unwrap(),
        Regex::new(concat!(r"Vol\.\s*mean\s*radius,\s*km\s*=\s*", num!(), r"(\s*\+-\s*", num!(), ")?")).unwrap(),
        Regex::new(concat!(r"Vol\.\s*mean\s*radius\s*\(km\)\s*=\s*", num!(), r"(\s*\+-\s*", num!(), ")?")).unwrap(),
        Regex::new(concat!(r"Vol\.\s*Mean\s*Radius\s*\(km\)\s*=\s*", num!(), r"\s*\+-\s*", num!())).unwrap(),
    ];

    /// `Radius (km) = a x b x c`
    static ref TRIAXIAL_RADIUS_PATTERN: Regex = Regex::new(concat!(
        r"Radius\s*\(km\)\s*=\s*",
        num!(),
        r"\s*x\s*",
        num!(),
        r"\s*x\s*",
        num!()
    ))
    .unwrap();

    /// Radius with uncertainty, and the comet/asteroid `RAD=` field
    static ref PLAIN_RADIUS_PATTERNS: Vec<Regex> = vec![
        Regex::new(concat!(r"Radius\s*\(km\)\s*=\s*", num!(), r"\s*\+-\s*", num!())).unwrap(),
        Regex::new(concat!(r"Radius\s*\(km,\s*IAU2015\)\s*=\s*", num!(), r"\s*\+-\s*", num!())).unwrap(),
        Regex::new(concat!(r"RAD\s*=\s*", num!())).unwrap(),
    ];
}

/// Everything extracted from one Horizons response
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedResult {
    /// Target name, e.g. `Earth (399)`
    pub name: String,
    /// Header text preceding the vector table
    pub desc: String,
    /// Vector table rows prefixed with [`CSV_HEADER`]
    pub csv: String,
    /// Gravitational parameter in m^3/s^2, 0 when not found
    pub gm: f64,
    /// Radius in meters, `(1, 1, 1)` when not found
    pub radius: Vector3<f64>,
    /// Whether a gravitational parameter (or mass) was found
    pub is_big: bool,
}

impl Default for DecodedResult {
    fn default() -> Self {
        Self {
            name: String::new(),
            desc: String::new(),
            csv: String::new(),
            gm: 0.0,
            radius: Vector3::new(1.0, 1.0, 1.0),
            is_big: false,
        }
    }
}

impl DecodedResult {
    /// Whether the response carried a vector table
    pub fn has_table(&self) -> bool {
        !self.csv.is_empty()
    }
}

fn capture_f64(caps: &Captures, index: usize) -> Option<f64> {
    caps.get(index)?.as_str().parse().ok()
}

/// Extract the name following `Target body name:` up to its last closing parenthesis
fn target_name(line: &str, label_at: usize) -> String {
    let rest = &line[label_at..];
    let end = rest.rfind(')').map(|i| i + 1).unwrap_or(rest.len());
    rest[..end]
        .get(TARGET_LABEL.len() + 1..)
        .unwrap_or("")
        .to_string()
}

/// First direct GM notation matching `line`, in m^3/s^2
fn match_gm(line: &str) -> Option<f64> {
    GM_PATTERNS
        .iter()
        .find_map(|re| re.captures(line).and_then(|c| capture_f64(&c, 1)))
        .map(|gm| gm * KM3_TO_M3)
}

/// GM derived from a `Mass (10^e kg)` notation, in m^3/s^2
fn match_mass_gm(line: &str) -> Option<f64> {
    let caps = MASS_PATTERN.captures(line)?;
    let exponent: i32 = caps.get(1)?.as_str().parse().ok()?;
    let mantissa = capture_f64(&caps, 2)?;
    let secondary: i32 = caps.get(3)?.as_str().parse().ok()?;
    Some(mantissa * 10f64.powi(exponent + secondary) * G)
}

/// Radius notation matching `line`, in meters; the last matching pattern wins
fn match_radius(line: &str) -> Option<Vector3<f64>> {
    let mut radius = None;
    let sphere = |r: f64| Vector3::new(r, r, r) * KM_TO_M;

    for re in MEAN_RADIUS_PATTERNS.iter() {
        if let Some(r) = re.captures(line).and_then(|c| capture_f64(&c, 1)) {
            radius = Some(sphere(r));
        }
    }
    if let Some(caps) = TRIAXIAL_RADIUS_PATTERN.captures(line) {
        if let (Some(a), Some(b), Some(c)) = (
            capture_f64(&caps, 1),
            capture_f64(&caps, 2),
            capture_f64(&caps, 3),
        ) {
            radius = Some(Vector3::new(a, b, c) * KM_TO_M);
        }
    }
    for re in PLAIN_RADIUS_PATTERNS.iter() {
        if let Some(r) = re.captures(line).and_then(|c| capture_f64(&c, 1)) {
            radius = Some(sphere(r));
        }
    }
    radius
}

/// Decode a raw Horizons response
///
/// Lines before `$$SOE` form the description and are scanned for the target
/// name and physical constants. Header scanning ends at the table label line
/// (or any other line once the description has ended). Lines between `$$SOE`
/// and `$$EOE` are copied into the CSV; everything after `$$EOE` is ignored.
///
/// GM uses the first direct notation found, falling back to the first mass
/// notation; radius keeps the last match.
pub fn decode_horizons_result(content: &str) -> DecodedResult {
    let mut result = DecodedResult::default();
    let mut in_table = false;
    let mut in_desc = true;
    // A mass-derived GM only stands until a direct GM notation shows up
    let mut gm_is_direct = false;

    for line in content.lines() {
        if line == START_OF_ENTRIES {
            in_table = true;
            in_desc = false;
            result.csv.push_str(CSV_HEADER);
            result.csv.push('\n');
        } else if line == END_OF_ENTRIES {
            break;
        } else if in_table {
            result.csv.push_str(line);
            result.csv.push('\n');
        } else if in_desc && !line.contains(TABLE_LABEL) {
            result.desc.push_str(line);
            result.desc.push('\n');

            if let Some(at) = line.find(TARGET_LABEL) {
                result.name = target_name(line, at);
            }
            if !gm_is_direct {
                if let Some(gm) = match_gm(line) {
                    result.gm = gm;
                    result.is_big = true;
                    gm_is_direct = true;
                } else if !result.is_big {
                    if let Some(gm) = match_mass_gm(line) {
                        result.gm = gm;
                        result.is_big = true;
                    }
                }
            }
            if let Some(radius) = match_radius(line) {
                result.radius = radius;
            }
        } else {
            in_desc = false;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    const EARTH_RESPONSE: &str = "\
*******************************************************************************
 Revised: April 12, 2021                 Earth                              399

 GEOPHYSICAL PROPERTIES (revised May 9, 2022):
 Vol. Mean Radius (km)    = 6371.01+-0.02   Mass x10^24 (kg)= 5.97219+-0.0006
 Mass layers:
 GM, km^3/s^2             = 398600.435436   Mass ratio (Sun/Earth) = 332946.0487
*******************************************************************************
Ephemeris / API_USER Mon Jan  6 02:01:52 2025 Pasadena, USA      / Horizons
*******************************************************************************
Target body name: Earth (399)                     {source: DE441}
Center body name: Solar System Barycenter (0)     {source: DE441}
*******************************************************************************
            JDTDB,            Calendar Date (TDB),                      X,                      Y,                      Z,                     VX,                     VY,                     VZ,
**************************************************************************************************************************************************************************************************
$$SOE
2460676.500000000, A.D. 2025-Jan-01 00:00:00.0000, -2.7e+07,  1.3e+08, -9.4e+03, -2.9e+01, -5.5e+00,  1.2e-03,
2460676.500694444, A.D. 2025-Jan-01 00:01:00.0000, -2.8e+07,  1.3e+08, -9.3e+03, -2.9e+01, -5.6e+00,  1.2e-03,
$$EOE
**************************************************************************************************************************************************************************************************
Coordinate system description:
 GM (km^3/s^2) = 1
";

    #[test]
    fn test_decode_earth() {
        let decoded = decode_horizons_result(EARTH_RESPONSE);

        assert_eq!(decoded.name, "Earth (399)");
        assert!(decoded.is_big);
        assert_relative_eq!(decoded.gm, 398600.435436e9, max_relative = 1e-12);
        assert_relative_eq!(decoded.radius.x, 6371.01e3, max_relative = 1e-12);
        assert_eq!(decoded.radius.x, decoded.radius.z);

        let lines: Vec<&str> = decoded.csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert!(lines[1].starts_with("2460676.500000000"));

        assert!(decoded.desc.contains("GEOPHYSICAL PROPERTIES"));
        assert!(decoded.desc.contains("Target body name"));
        assert!(!decoded.desc.contains("JDTDB"));
        assert!(!decoded.desc.contains("Coordinate system"));
    }

    #[test]
    fn test_gm_priority_over_mass() {
        let text = "Mass (10^20 kg) = 5 (10^1)\nGM (km^3/s^2) = 100\n$$SOE\n$$EOE\n";
        let decoded = decode_horizons_result(text);

        assert!(decoded.is_big);
        assert_relative_eq!(decoded.gm, 100.0 * 1e9, max_relative = 1e-12);
    }

    #[test]
    fn test_first_gm_wins_across_lines() {
        let text = "GM, km^3/s^2 = 42\nGM (km^3/s^2) = 100\n";
        let decoded = decode_horizons_result(text);
        assert_relative_eq!(decoded.gm, 42.0e9, max_relative = 1e-12);
    }

    #[test]
    fn test_mass_to_gm() {
        let decoded = decode_horizons_result("Mass (10^20 kg) = 5 (10^1)\n");
        assert!(decoded.is_big);
        assert_relative_eq!(decoded.gm, 5.0 * 1e21 * G, max_relative = 1e-12);
    }

    #[test]
    fn test_last_radius_wins() {
        let text = "Mean radius (km) = 10\nRAD= 2.5\n";
        let decoded = decode_horizons_result(text);
        assert_relative_eq!(decoded.radius.x, 2500.0, max_relative = 1e-12);
        assert!(!decoded.is_big);
    }

    #[rstest]
    #[case("GM (km^3/s^2) = 22031.86855", 22031.86855e9)]
    #[case("GM, km^3/s^2  = 126686531.9", 126686531.9e9)]
    #[case("GM (planet) km^3/s^2 = 37931206.2", 37931206.2e9)]
    #[case("GM= 4902.800118", 4902.800118e9)]
    fn test_gm_notations(#[case] line: &str, #[case] expected: f64) {
        let decoded = decode_horizons_result(line);
        assert!(decoded.is_big);
        assert_relative_eq!(decoded.gm, expected, max_relative = 1e-12);
    }

    #[rstest]
    #[case("Mean radius (km)      = 1737.53+-0.03", [1737.53, 1737.53, 1737.53])]
    #[case("Vol. mean radius, km = 3389.92+-0.04", [3389.92, 3389.92, 3389.92])]
    #[case("Vol. mean radius (km) = 2439.4+-0.1", [2439.4, 2439.4, 2439.4])]
    #[case("Vol. Mean Radius (km) = 24622+-19", [24622.0, 24622.0, 24622.0])]
    #[case("Radius (km) = 13.0 x 11.4 x 9.1", [13.0, 11.4, 9.1])]
    #[case("Radius (km) = 252.1 +- 0.2", [252.1, 252.1, 252.1])]
    #[case("Radius (km, IAU2015) = 695700 +- 140", [695700.0, 695700.0, 695700.0])]
    #[case("RAD= 0.65", [0.65, 0.65, 0.65])]
    fn test_radius_notations(#[case] line: &str, #[case] expected_km: [f64; 3]) {
        let decoded = decode_horizons_result(line);
        for (got, want) in decoded.radius.iter().zip(expected_km) {
            assert_relative_eq!(*got, want * 1e3, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_malformed_input_keeps_defaults() {
        let decoded = decode_horizons_result("API error: no such object\n");

        assert_eq!(decoded.name, "");
        assert_eq!(decoded.csv, "");
        assert!(!decoded.has_table());
        assert_eq!(decoded.gm, 0.0);
        assert_eq!(decoded.radius, Vector3::new(1.0, 1.0, 1.0));
        assert!(!decoded.is_big);
    }

    #[test]
    fn test_header_scan_stops_at_table_label() {
        let text = "JDTDB, Calendar Date (TDB), X\nGM (km^3/s^2) = 5\n$$SOE\nrow\n$$EOE\n";
        let decoded = decode_horizons_result(text);

        assert!(!decoded.is_big);
        assert_eq!(decoded.desc, "");
        assert_eq!(decoded.csv.lines().nth(1), Some("row"));
    }

    #[test]
    fn test_target_name_without_parenthesis() {
        let decoded = decode_horizons_result("Target body name: 1P/Halley\n");
        assert_eq!(decoded.name, "1P/Halley");
    }
}
