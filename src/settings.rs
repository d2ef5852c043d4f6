//! Collision settings
//!
//! Iteration caps and tolerances for the narrow phase, persisted as JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::Result;

/// Precision preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PrecisionPreset {
    Fast,
    #[default]
    Balanced,
    Exact,
}

impl PrecisionPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrecisionPreset::Fast => "Fast",
            PrecisionPreset::Balanced => "Balanced",
            PrecisionPreset::Exact => "Exact",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "fast" => Some(PrecisionPreset::Fast),
            "balanced" | "default" => Some(PrecisionPreset::Balanced),
            "exact" | "precise" => Some(PrecisionPreset::Exact),
            _ => None,
        }
    }

    /// GJK loop cap for this preset
    pub fn max_gjk_iterations(&self) -> u32 {
        match self {
            PrecisionPreset::Fast => 16,
            PrecisionPreset::Balanced => MAX_GJK_ITERATIONS,
            PrecisionPreset::Exact => 128,
        }
    }

    /// EPA expansion cap for this preset
    pub fn max_epa_iterations(&self) -> u32 {
        match self {
            PrecisionPreset::Fast => 8,
            PrecisionPreset::Balanced => MAX_EPA_ITERATIONS,
            PrecisionPreset::Exact => 128,
        }
    }

    /// Polytope growth under which EPA stops
    pub fn epa_tolerance(&self) -> f32 {
        match self {
            PrecisionPreset::Fast => 1.0e-2,
            PrecisionPreset::Balanced => EPA_TOLERANCE,
            PrecisionPreset::Exact => 1.0e-6,
        }
    }
}

/// How EPA picks the polytope edge it expands next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EdgeMetric {
    /// Smallest dot product of the edge's two endpoints. Cheap, but can pick a
    /// far edge on elongated polytopes.
    EndpointDot,
    /// Smallest distance from the origin to the edge's supporting line
    #[default]
    Distance,
}

/// Where colliders get their candidate groups from each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BroadPhaseMode {
    /// Groups are supplied by the caller via `CollisionWorld::set_broad_phase`
    External,
    /// Groups are rebuilt every frame from bounding circles
    #[default]
    Bounds,
}

/// Narrow-phase settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionSettings {
    /// Preset the numeric fields were derived from
    pub precision: PrecisionPreset,

    // === GJK ===
    /// Loop passes before a pair is reported undecided (treated as no collision)
    pub max_gjk_iterations: u32,

    // === EPA ===
    /// Expansions before the last candidate normal is accepted
    pub max_epa_iterations: u32,
    /// Minimum growth of the polytope along the candidate normal
    pub epa_tolerance: f32,
    /// Squared per-axis difference under which successive normals match
    pub normal_convergence: f32,
    /// Closest-edge selection
    pub edge_metric: EdgeMetric,

    // === Broad phase ===
    pub broad_phase: BroadPhaseMode,
}

impl Default for CollisionSettings {
    fn default() -> Self {
        Self::from_preset(PrecisionPreset::Balanced)
    }
}

impl CollisionSettings {
    /// Create settings from a precision preset (applies preset defaults)
    pub fn from_preset(preset: PrecisionPreset) -> Self {
        let mut settings = Self {
            precision: preset,
            max_gjk_iterations: 0,
            max_epa_iterations: 0,
            epa_tolerance: 0.0,
            normal_convergence: NORMAL_CONVERGENCE,
            edge_metric: EdgeMetric::Distance,
            broad_phase: BroadPhaseMode::Bounds,
        };
        settings.apply_preset(preset);
        settings
    }

    /// Apply a precision preset (updates preset-dependent settings)
    pub fn apply_preset(&mut self, preset: PrecisionPreset) {
        self.precision = preset;
        self.max_gjk_iterations = preset.max_gjk_iterations();
        self.max_epa_iterations = preset.max_epa_iterations();
        self.epa_tolerance = preset.epa_tolerance();
    }

    /// Parse settings from JSON
    ///
    /// Preset-dependent fields that are missing take the values of the
    /// document's `precision`; fields that are present override the preset.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let mut settings: Self = serde_json::from_value(value.clone())?;

        let given = |key: &str| value.get(key).is_some();
        let preset = settings.precision;
        if !given("max_gjk_iterations") {
            settings.max_gjk_iterations = preset.max_gjk_iterations();
        }
        if !given("max_epa_iterations") {
            settings.max_epa_iterations = preset.max_epa_iterations();
        }
        if !given("epa_tolerance") {
            settings.epa_tolerance = preset.epa_tolerance();
        }
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(settings) => {
                log::info!("Loaded collision settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Using default collision settings ({})", e);
                Self::default()
            }
        }
    }

    /// Save settings to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_balanced() {
        let settings = CollisionSettings::default();
        assert_eq!(settings.precision, PrecisionPreset::Balanced);
        assert_eq!(settings.max_gjk_iterations, MAX_GJK_ITERATIONS);
        assert_eq!(settings.max_epa_iterations, MAX_EPA_ITERATIONS);
        assert_eq!(settings.edge_metric, EdgeMetric::Distance);
    }

    #[test]
    fn test_preset_from_str() {
        assert_eq!(PrecisionPreset::from_str("FAST"), Some(PrecisionPreset::Fast));
        assert_eq!(PrecisionPreset::from_str("precise"), Some(PrecisionPreset::Exact));
        assert_eq!(PrecisionPreset::from_str("turbo"), None);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings =
            CollisionSettings::from_json(r#"{ "edge_metric": "EndpointDot", "max_epa_iterations": 4 }"#)
                .unwrap();
        assert_eq!(settings.edge_metric, EdgeMetric::EndpointDot);
        assert_eq!(settings.max_epa_iterations, 4);
        assert_eq!(settings.max_gjk_iterations, MAX_GJK_ITERATIONS);
    }

    #[test]
    fn test_json_preset_fills_missing_limits() {
        let settings = CollisionSettings::from_json(r#"{ "precision": "Exact" }"#).unwrap();
        assert_eq!(settings.precision, PrecisionPreset::Exact);
        assert_eq!(settings.max_gjk_iterations, 128);
        assert_eq!(settings.max_epa_iterations, 128);
        assert_eq!(settings.epa_tolerance, 1.0e-6);

        let settings =
            CollisionSettings::from_json(r#"{ "precision": "Fast", "max_epa_iterations": 4 }"#)
                .unwrap();
        assert_eq!(settings.max_gjk_iterations, 16);
        assert_eq!(settings.max_epa_iterations, 4);
        assert_eq!(settings.epa_tolerance, 1.0e-2);
    }

    #[test]
    fn test_json_roundtrip_keeps_preset() {
        let settings = CollisionSettings::from_preset(PrecisionPreset::Exact);
        let back = CollisionSettings::from_json(&settings.to_json().unwrap()).unwrap();
        assert_eq!(back.precision, PrecisionPreset::Exact);
        assert_eq!(back.max_gjk_iterations, 128);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(CollisionSettings::from_json("{ not json").is_err());
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let settings = CollisionSettings::load("/definitely/not/here.json");
        assert_eq!(settings.precision, PrecisionPreset::Balanced);
    }
}
