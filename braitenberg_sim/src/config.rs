//! JSON configuration files.
//!
//! Every field is optional; anything missing takes its `Default` value:
//!
//! ```json
//! {
//!   "seed": 7,
//!   "vehicle_count": 25,
//!   "field": { "frequency_divisor": 5.0, "noise": "perlin" },
//!   "vehicle": { "wheel_distance": 2.0, "coupling": "direct" },
//!   "out_of_bounds": { "constant": 0.0 }
//! }
//! ```

use crate::SimError;
use braitenberg_core::SimulationConfig;
use std::path::Path;
use tracing::debug;

/// Parses and validates a configuration document.
pub fn parse_config(json: &str) -> Result<SimulationConfig, SimError> {
    let config: SimulationConfig = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
}

/// Reads, parses and validates a configuration file.
pub fn load_config(path: impl AsRef<Path>) -> Result<SimulationConfig, SimError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)?;
    let config = parse_config(&json)?;
    debug!("Loaded config from {}: {:?}", path.display(), config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use braitenberg_core::{Coupling, NoiseKind, OutOfBounds};

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(parse_config("{}").unwrap(), SimulationConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let config = parse_config(
            r#"{
                "seed": 7,
                "vehicle_count": 25,
                "field": { "frequency_divisor": 5.0, "noise": "perlin" },
                "vehicle": { "wheel_distance": 2.0, "coupling": "direct" },
                "out_of_bounds": { "constant": 0.0 }
            }"#,
        )
        .unwrap();

        assert_eq!(config.seed, 7);
        assert_eq!(config.vehicle_count, 25);
        assert_eq!(config.field.width, 800);
        assert_eq!(config.field.frequency_divisor, 5.0);
        assert_eq!(config.field.noise, NoiseKind::Perlin);
        assert_eq!(config.vehicle.wheel_distance, 2.0);
        assert_eq!(config.vehicle.size, 10.0);
        assert_eq!(config.vehicle.coupling, Coupling::Direct);
        assert_eq!(config.out_of_bounds, OutOfBounds::Constant(0.0));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = parse_config(r#"{ "vehicle_count": 0 }"#).unwrap_err();
        assert!(matches!(err, SimError::Config(_)));

        let err = parse_config(r#"{ "seed": "abc" }"#).unwrap_err();
        assert!(matches!(err, SimError::Json(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config("/nonexistent/braitenberg.json").unwrap_err();
        assert!(matches!(err, SimError::Io(_)));
    }
}
