//! Travel modes and the evaluated mode combinations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A transport mode as named by the routing engine.
///
/// Query modes (`WALK`, `BICYCLE`, `CAR`, `TRANSIT`) and the concrete
/// scheduled modes the engine reports on itinerary segments (`BUS`, `TRAM`,
/// ...) share one type. Unknown names are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Mode {
    Walk,
    Bicycle,
    Car,
    Transit,
    Bus,
    Tram,
    Rail,
    Subway,
    Ferry,
    Other(String),
}

impl Mode {
    /// Returns the engine's name for this mode.
    pub fn as_str(&self) -> &str {
        match self {
            Mode::Walk => "WALK",
            Mode::Bicycle => "BICYCLE",
            Mode::Car => "CAR",
            Mode::Transit => "TRANSIT",
            Mode::Bus => "BUS",
            Mode::Tram => "TRAM",
            Mode::Rail => "RAIL",
            Mode::Subway => "SUBWAY",
            Mode::Ferry => "FERRY",
            Mode::Other(name) => name,
        }
    }

    /// True for modes that run to a timetable, where boarding involves a wait.
    pub fn is_scheduled(&self) -> bool {
        matches!(
            self,
            Mode::Transit | Mode::Bus | Mode::Tram | Mode::Rail | Mode::Subway | Mode::Ferry
        )
    }
}

impl FromStr for Mode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Mode::from(s.to_string()))
    }
}

impl From<String> for Mode {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "WALK" => Mode::Walk,
            "BICYCLE" => Mode::Bicycle,
            "CAR" => Mode::Car,
            "TRANSIT" => Mode::Transit,
            "BUS" => Mode::Bus,
            "TRAM" => Mode::Tram,
            "RAIL" => Mode::Rail,
            "SUBWAY" => Mode::Subway,
            "FERRY" => Mode::Ferry,
            _ => Mode::Other(s),
        }
    }
}

impl From<Mode> for String {
    fn from(mode: Mode) -> Self {
        mode.as_str().to_string()
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Joins a mode set into a stable key such as `WALK+TRANSIT`.
pub fn mode_key(modes: &[Mode]) -> String {
    modes
        .iter()
        .map(Mode::as_str)
        .collect::<Vec<_>>()
        .join("+")
}

/// One of the five evaluated travel strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModeCombination {
    WalkTransit,
    Car,
    BicycleTransit,
    CarTransit,
    Bicycle,
}

impl ModeCombination {
    /// All combinations, in output table order.
    pub const ALL: [ModeCombination; 5] = [
        ModeCombination::WalkTransit,
        ModeCombination::Car,
        ModeCombination::BicycleTransit,
        ModeCombination::CarTransit,
        ModeCombination::Bicycle,
    ];

    /// The label written to the `mode_transport` column.
    pub fn label(&self) -> &'static str {
        match self {
            ModeCombination::WalkTransit => "Walk+Transit",
            ModeCombination::Car => "CAR",
            ModeCombination::BicycleTransit => "Bicycle+Transit",
            ModeCombination::CarTransit => "Car+Transit",
            ModeCombination::Bicycle => "Bicycle",
        }
    }

    /// The private-vehicle access mode for park-and-ride combinations.
    pub fn access_mode(&self) -> Option<Mode> {
        match self {
            ModeCombination::BicycleTransit => Some(Mode::Bicycle),
            ModeCombination::CarTransit => Some(Mode::Car),
            _ => None,
        }
    }
}

impl fmt::Display for ModeCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_modes_case_insensitively() {
        assert_eq!("walk".parse::<Mode>().unwrap(), Mode::Walk);
        assert_eq!("BUS".parse::<Mode>().unwrap(), Mode::Bus);
        assert_eq!(" Tram ".parse::<Mode>().unwrap(), Mode::Tram);
    }

    #[test]
    fn unknown_mode_kept_verbatim() {
        let mode: Mode = "GONDOLA".parse().unwrap();
        assert_eq!(mode, Mode::Other("GONDOLA".to_string()));
        assert_eq!(mode.to_string(), "GONDOLA");
    }

    #[test]
    fn scheduled_modes() {
        assert!(Mode::Bus.is_scheduled());
        assert!(Mode::Tram.is_scheduled());
        assert!(!Mode::Walk.is_scheduled());
        assert!(!Mode::Car.is_scheduled());
        assert!(!Mode::Other("GONDOLA".into()).is_scheduled());
    }

    #[test]
    fn serde_uses_engine_names() {
        let json = serde_json::to_string(&vec![Mode::Walk, Mode::Transit]).unwrap();
        assert_eq!(json, r#"["WALK","TRANSIT"]"#);

        let modes: Vec<Mode> = serde_json::from_str(r#"["BICYCLE","bus"]"#).unwrap();
        assert_eq!(modes, vec![Mode::Bicycle, Mode::Bus]);
    }

    #[test]
    fn key_joins_in_order() {
        assert_eq!(mode_key(&[Mode::Walk, Mode::Transit]), "WALK+TRANSIT");
        assert_eq!(mode_key(&[Mode::Car]), "CAR");
    }

    #[test]
    fn combination_labels_and_access() {
        assert_eq!(ModeCombination::Car.label(), "CAR");
        assert_eq!(ModeCombination::BicycleTransit.label(), "Bicycle+Transit");
        assert_eq!(
            ModeCombination::CarTransit.access_mode(),
            Some(Mode::Car)
        );
        assert_eq!(ModeCombination::WalkTransit.access_mode(), None);
        assert_eq!(ModeCombination::ALL.len(), 5);
    }
}
