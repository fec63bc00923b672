//! Simulation configuration
//!
//! Loaded from a JSON file by the headless runner; every field falls back to
//! its default when missing.

use std::path::Path;

use anyhow::Context;
use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Ship tuning applied to every spawned ship
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipTuning {
    pub thrust_amt: f64,
    pub rotation_speed: f64,
    pub has_backward_thrusters: bool,
    /// Ships carry a gun and fire at their target
    pub armed: bool,
}

impl Default for ShipTuning {
    fn default() -> Self {
        Self {
            thrust_amt: SHIP_THRUST_AMT,
            rotation_speed: SHIP_ROTATION_SPEED,
            has_backward_thrusters: true,
            armed: true,
        }
    }
}

/// Shield tuning applied to every spawned shield
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShieldTuning {
    /// Ships spawn wrapped in a shield
    pub enabled: bool,
    pub radius: f64,
    pub defense: f64,
    pub health_recharge_amt: f64,
}

impl Default for ShieldTuning {
    fn default() -> Self {
        Self {
            enabled: true,
            radius: SHIELD_RADIUS,
            defense: SHIELD_DEFENSE,
            health_recharge_amt: SHIELD_RECHARGE,
        }
    }
}

/// Layout of the skirmish the headless runner builds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SkirmishLayout {
    pub teams: u32,
    pub ships_per_team: u32,
    /// Place a portal in the middle of the map
    pub portal: bool,
}

impl Default for SkirmishLayout {
    fn default() -> Self {
        Self {
            teams: 2,
            ships_per_team: 4,
            portal: true,
        }
    }
}

/// Simulation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Map extent (width, height)
    pub map_size: DVec2,
    /// RNG seed for reproducible runs
    pub seed: u64,
    /// Seconds per frame
    pub dt: f64,
    /// Frames the headless runner simulates
    pub frames: u32,
    /// Restitution given to bodies that don't override it
    pub collision_damping: f64,
    pub ship: ShipTuning,
    pub shield: ShieldTuning,
    pub skirmish: SkirmishLayout,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            map_size: DVec2::new(MAP_WIDTH, MAP_HEIGHT),
            seed: 12345,
            dt: FRAME_DT,
            frames: 3600,
            collision_damping: DEFAULT_COLLISION_DAMPING,
            ship: ShipTuning::default(),
            shield: ShieldTuning::default(),
            skirmish: SkirmishLayout::default(),
        }
    }
}

impl SimConfig {
    /// Time-step-scaled displacement unit for one frame (1.0 at 60 Hz)
    pub fn dx(&self) -> f64 {
        self.dt / FRAME_DT
    }

    /// Parse settings from JSON text
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::from_json(&json)
            .with_context(|| format!("parsing config {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Serialize settings as pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
