use std::path::Path;

use tracing::warn;

use crate::model::*;

pub const DEFAULT_HOURLY_RATE: Amount = 50;
pub const DEFAULT_FLOORS: u32 = 1;

/// Runtime configuration, read from `PARKLOT_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotConfig {
    pub layout: LotLayout,
    pub hourly_rate: Amount,
    pub metrics_port: Option<u16>,
    /// Drive time from the console instead of the wall clock.
    pub manual_clock: bool,
}

impl Default for LotConfig {
    fn default() -> Self {
        Self {
            layout: LotLayout::uniform(DEFAULT_FLOORS, default_floor()),
            hourly_rate: DEFAULT_HOURLY_RATE,
            metrics_port: None,
            manual_clock: false,
        }
    }
}

/// 50 car, 40 motorcycle and 10 truck spots.
pub fn default_floor() -> FloorLayout {
    FloorLayout::new([
        (VehicleCategory::Car, 50),
        (VehicleCategory::Motorcycle, 40),
        (VehicleCategory::Truck, 10),
    ])
}

impl LotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. `PARKLOT_LAYOUT` (a JSON file) wins over
    /// `PARKLOT_FLOORS`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let layout = match lookup("PARKLOT_LAYOUT") {
            Some(path) => load_layout(Path::new(&path))?,
            None => {
                let floors = parse_or(&lookup, "PARKLOT_FLOORS", DEFAULT_FLOORS)?;
                LotLayout::uniform(floors, default_floor())
            }
        };
        let hourly_rate = parse_or(&lookup, "PARKLOT_HOURLY_RATE", DEFAULT_HOURLY_RATE)?;
        let metrics_port = lookup("PARKLOT_METRICS_PORT").and_then(|s| match s.parse() {
            Ok(port) => Some(port),
            Err(_) => {
                warn!("ignoring unparsable PARKLOT_METRICS_PORT={s}");
                None
            }
        });
        let manual_clock = lookup("PARKLOT_MANUAL_CLOCK")
            .is_some_and(|s| matches!(s.as_str(), "1" | "true" | "yes"));

        Ok(Self {
            layout,
            hourly_rate,
            metrics_port,
            manual_clock,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key, raw)),
        None => Ok(default),
    }
}

/// Read a layout file: `{"floors": [{"car": 50, "motorcycle": 40}, ...]}`.
pub fn load_layout(path: &Path) -> Result<LotLayout, ConfigError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

// ── Errors ────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Invalid(&'static str, String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read layout: {e}"),
            ConfigError::Json(e) => write!(f, "bad layout file: {e}"),
            ConfigError::Invalid(key, value) => write!(f, "invalid {key}: {value:?}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let cfg = LotConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, LotConfig::default());
        assert_eq!(cfg.layout.floors.len(), 1);
        assert_eq!(cfg.layout.floors[0].total(), 100);
    }

    #[test]
    fn floors_and_rate_from_env() {
        let cfg = LotConfig::from_lookup(lookup(&[
            ("PARKLOT_FLOORS", "3"),
            ("PARKLOT_HOURLY_RATE", "20"),
            ("PARKLOT_METRICS_PORT", "9100"),
            ("PARKLOT_MANUAL_CLOCK", "1"),
        ]))
        .unwrap();
        assert_eq!(cfg.layout.floors.len(), 3);
        assert_eq!(cfg.hourly_rate, 20);
        assert_eq!(cfg.metrics_port, Some(9100));
        assert!(cfg.manual_clock);
    }

    #[test]
    fn bad_rate_is_an_error() {
        let result = LotConfig::from_lookup(lookup(&[("PARKLOT_HOURLY_RATE", "lots")]));
        let err = result.unwrap_err();
        assert!(err.to_string().contains("PARKLOT_HOURLY_RATE"));
    }

    #[test]
    fn bad_metrics_port_is_ignored() {
        let cfg = LotConfig::from_lookup(lookup(&[("PARKLOT_METRICS_PORT", "99999")])).unwrap();
        assert_eq!(cfg.metrics_port, None);
    }

    #[test]
    fn layout_file_wins_over_floor_count() {
        let dir = std::env::temp_dir().join("parklot_test_config");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("layout.json");
        std::fs::write(&path, r#"{"floors":[{"car":1,"bike":1}]}"#).unwrap();

        let cfg = LotConfig::from_lookup(lookup(&[
            ("PARKLOT_LAYOUT", path.to_str().unwrap()),
            ("PARKLOT_FLOORS", "4"),
        ]))
        .unwrap();
        assert_eq!(cfg.layout.floors.len(), 1);
        assert_eq!(cfg.layout.floors[0].total(), 2);
    }

    #[test]
    fn missing_layout_file() {
        let result = LotConfig::from_lookup(lookup(&[("PARKLOT_LAYOUT", "/nonexistent/parklot.json")]));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn layout_file_with_repeated_category() {
        let dir = std::env::temp_dir().join("parklot_test_config");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("repeated.json");
        std::fs::write(&path, r#"{"floors":[{"bike":5,"motorcycle":2}]}"#).unwrap();
        let result = LotConfig::from_lookup(lookup(&[("PARKLOT_LAYOUT", path.to_str().unwrap())]));
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn malformed_layout_file() {
        let dir = std::env::temp_dir().join("parklot_test_config");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.json");
        std::fs::write(&path, r#"{"floors":[{"hovercraft":1}]}"#).unwrap();
        let result = load_layout(&path);
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }
}
