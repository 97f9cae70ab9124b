use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{HandoverError, HandoverResult};
use crate::models::CycleInput;

/// Parse one cycle or a batch of cycles from JSON text.
///
/// Errors name the JSON path of the offending value, e.g.
/// `satellites[2].constellation`.
pub fn parse_cycles(json: &str) -> HandoverResult<Vec<CycleInput>> {
    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| HandoverError::Input(format!("Invalid JSON: {}", e)))?;

    // A file holds either one cycle or an array of cycles
    if value.is_array() {
        deserialize_tracked(value)
    } else {
        deserialize_tracked(value).map(|cycle: CycleInput| vec![cycle])
    }
}

/// Read cycles from a JSON file.
pub fn read_cycles<P: AsRef<Path>>(path: P) -> HandoverResult<Vec<CycleInput>> {
    let content = fs::read_to_string(path.as_ref()).map_err(|e| {
        HandoverError::Input(format!(
            "Failed to read input file {}: {}",
            path.as_ref().display(),
            e
        ))
    })?;

    let cycles = parse_cycles(&content)?;
    log::info!(
        "Loaded {} cycle(s) from {}",
        cycles.len(),
        path.as_ref().display()
    );
    Ok(cycles)
}

fn deserialize_tracked<T>(value: serde_json::Value) -> HandoverResult<T>
where
    T: for<'de> Deserialize<'de>,
{
    serde_path_to_error::deserialize(value).map_err(|e| {
        let path = e.path().to_string();
        HandoverError::Input(format!("{}: {}", path, e.into_inner()))
    })
}
