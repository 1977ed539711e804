//! Horizons target identifiers and names
//!
//! Horizons uses NAIF integer codes as command strings for major bodies.
//! Only the bodies a viewer commonly tracks are listed here.

use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    /// Map from identifier strings to display names
    static ref TARGET_NAMES: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        for &(id, name) in TARGET_NAME_PAIRS.iter() {
            m.entry(id).or_insert(name);
        }
        m
    };
}

/// Display name of a known identifier
pub fn target_name(id: &str) -> Option<&'static str> {
    TARGET_NAMES.get(id.trim()).copied()
}

/// Whether the identifier refers to the solar system or a planetary barycenter
pub fn is_barycenter(id: &str) -> bool {
    matches!(id.trim().parse::<i32>(), Ok(0..=9))
}

/// Pairs of (identifier, name) for solar system bodies
const TARGET_NAME_PAIRS: &[(&str, &str)] = &[
    ("0", "Solar System Barycenter"),
    ("1", "Mercury Barycenter"),
    ("2", "Venus Barycenter"),
    ("3", "Earth-Moon Barycenter"),
    ("4", "Mars Barycenter"),
    ("5", "Jupiter Barycenter"),
    ("6", "Saturn Barycenter"),
    ("7", "Uranus Barycenter"),
    ("8", "Neptune Barycenter"),
    ("9", "Pluto Barycenter"),
    ("10", "Sun"),
    ("199", "Mercury"),
    ("299", "Venus"),
    ("399", "Earth"),
    ("301", "Moon"),
    ("499", "Mars"),
    ("401", "Phobos"),
    ("402", "Deimos"),
    ("599", "Jupiter"),
    ("501", "Io"),
    ("502", "Europa"),
    ("503", "Ganymede"),
    ("504", "Callisto"),
    ("699", "Saturn"),
    ("606", "Titan"),
    ("799", "Uranus"),
    ("899", "Neptune"),
    ("801", "Triton"),
    ("999", "Pluto"),
    ("901", "Charon"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_name() {
        assert_eq!(target_name("399"), Some("Earth"));
        assert_eq!(target_name(" 10 "), Some("Sun"));
        assert_eq!(target_name("C/2023 A3"), None);
    }

    #[test]
    fn test_is_barycenter() {
        assert!(is_barycenter("0"));
        assert!(is_barycenter("5"));
        assert!(!is_barycenter("10"));
        assert!(!is_barycenter("399"));
        assert!(!is_barycenter("DES=1P;"));
    }
}
