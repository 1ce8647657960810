//! JSON export of simulation runs for offline rendering.

use braitenberg_core::{ScalarField, Snapshot, VehicleState};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Every vehicle at one tick.
#[derive(Debug, Clone, Serialize)]
pub struct SimFrame {
    pub tick: u64,
    pub vehicles: Vec<VehicleState>,
}

impl From<Snapshot> for SimFrame {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            tick: snapshot.tick,
            vehicles: snapshot.vehicles,
        }
    }
}

/// Complete simulation export.
#[derive(Debug, Clone, Serialize)]
pub struct SimExport {
    /// Scenario name
    pub scenario: String,

    /// Seed used
    pub seed: u64,

    /// Heat grid, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<ScalarField>,

    /// Sampled frames, oldest first
    pub frames: Vec<SimFrame>,

    /// Final results
    pub passed: bool,
}

impl SimExport {
    pub fn new(scenario: &str, seed: u64) -> Self {
        Self {
            scenario: scenario.to_string(),
            seed,
            field: None,
            frames: Vec::new(),
            passed: false,
        }
    }

    pub fn with_field(mut self, field: ScalarField) -> Self {
        self.field = Some(field);
        self
    }

    pub fn add_frame(&mut self, frame: SimFrame) {
        self.frames.push(frame);
    }

    pub fn finalize(&mut self, passed: bool) {
        self.passed = passed;
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_json_shape() {
        let field = ScalarField::from_values(2, 1, vec![0.25, -0.5]).unwrap();
        let mut export = SimExport::new("crossed", 3).with_field(field);
        export.add_frame(SimFrame {
            tick: 0,
            vehicles: vec![VehicleState {
                x: 1.0,
                y: 2.0,
                theta: 0.5,
                size: 10.0,
            }],
        });
        export.finalize(true);

        let value = serde_json::to_value(&export).unwrap();
        assert_eq!(value["scenario"], "crossed");
        assert_eq!(value["seed"], 3);
        assert_eq!(value["passed"], true);
        assert_eq!(value["field"]["width"], 2);
        assert_eq!(value["frames"][0]["vehicles"][0]["size"], 10.0);
    }

    #[test]
    fn test_field_omitted_when_absent() {
        let export = SimExport::new("direct", 1);
        let value = serde_json::to_value(&export).unwrap();
        assert!(value.get("field").is_none());
    }

    #[test]
    fn test_write_to_file() {
        let path = std::env::temp_dir()
            .join(format!("braitenberg_export_{}.json", std::process::id()));
        let export = SimExport::new("crossed", 5);
        export.write_to_file(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"scenario\": \"crossed\""));
        std::fs::remove_file(&path).unwrap();
    }
}
