//! World grid cells.
//!
//! A [`Chunk`] is one cell of the world grid. It owns the environmental state
//! the vegetation simulation reads (moisture, temperature, light, ...) and the
//! resource pools it consumes, plus the plants living on it.

use crate::plant::{PlantId, PlantInstance};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Upper bound of every percentage-style chunk attribute.
pub const ATTRIBUTE_MAX: f64 = 100.0;

/// Chunks keyed by grid coordinate. `BTreeMap` keeps tick iteration order
/// deterministic.
pub type ChunkMap = BTreeMap<ChunkKey, Chunk>;

/// Grid coordinate of a chunk, written `"x,y"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ChunkKey {
    pub x: i32,
    pub y: i32,
}

impl ChunkKey {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to `other`, in chunks.
    pub fn distance_squared(self, other: ChunkKey) -> i64 {
        let dx = self.x as i64 - other.x as i64;
        let dy = self.y as i64 - other.y as i64;
        dx * dx + dy * dy
    }
}

impl fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Error returned when parsing a malformed chunk key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid chunk key '{0}' (expected \"x,y\")")]
pub struct ChunkKeyError(String);

impl FromStr for ChunkKey {
    type Err = ChunkKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| ChunkKeyError(s.to_string()))?;
        let x = x.trim().parse().map_err(|_| ChunkKeyError(s.to_string()))?;
        let y = y.trim().parse().map_err(|_| ChunkKeyError(s.to_string()))?;
        Ok(Self { x, y })
    }
}

impl From<ChunkKey> for String {
    fn from(key: ChunkKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for ChunkKey {
    type Error = ChunkKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A single cell of the world grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Chunk {
    pub x: i32,
    pub y: i32,
    /// Soil moisture, 0-100.
    pub moisture: f64,
    /// Air temperature in degrees Celsius.
    pub temperature: f64,
    /// Light reaching the ground, 0-100.
    pub light_level: f64,
    /// How much people disturb this cell, 0-100.
    pub human_presence: f64,
    /// Wind strength, 0-100.
    pub wind_level: f64,
    /// Derived from the plants living here; recomputed every tick.
    pub vegetation_density: f64,
    /// Density recorded by the previous tick.
    pub previous_vegetation_density: f64,
    /// Whether the last tick moved density by more than the narrative threshold.
    pub vegetation_changed_significantly: bool,
    /// Soil nutrition pool, 0-100.
    pub nutrition: f64,
    /// Fertilizer pool, 0-100.
    pub fertilizer_level: f64,
    /// Remaining ticks (and water units) of active watering.
    pub water_timer: f64,
    /// How well the soil holds water; scales evaporation of `water_timer`.
    pub water_retention: f64,
    pub plants: Vec<PlantInstance>,
}

impl Chunk {
    /// Create a temperate, empty chunk at `(x, y)`.
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            moisture: 50.0,
            temperature: 18.0,
            light_level: 80.0,
            human_presence: 0.0,
            wind_level: 10.0,
            vegetation_density: 0.0,
            previous_vegetation_density: 0.0,
            vegetation_changed_significantly: false,
            nutrition: 50.0,
            fertilizer_level: 0.0,
            water_timer: 0.0,
            water_retention: 1.0,
            plants: Vec::new(),
        }
    }

    pub fn key(&self) -> ChunkKey {
        ChunkKey::new(self.x, self.y)
    }

    /// Whether the chunk is currently being watered.
    pub fn is_watered(&self) -> bool {
        self.water_timer > 0.0
    }

    /// Player action: water the soil for `ticks` ticks.
    pub fn water(&mut self, ticks: f64) {
        if ticks > 0.0 {
            self.water_timer += ticks;
        }
    }

    /// Player action: spread fertilizer.
    pub fn fertilize(&mut self, amount: f64) {
        if amount > 0.0 {
            self.fertilizer_level = (self.fertilizer_level + amount).min(ATTRIBUTE_MAX);
        }
    }

    /// Return nutrients to the soil (e.g. from a decomposing plant).
    pub fn enrich(&mut self, amount: f64) {
        if amount > 0.0 {
            self.nutrition = (self.nutrition + amount).min(ATTRIBUTE_MAX);
        }
    }

    pub fn plant(&self, id: PlantId) -> Option<&PlantInstance> {
        self.plants.iter().find(|p| p.id == id)
    }

    pub fn plant_mut(&mut self, id: PlantId) -> Option<&mut PlantInstance> {
        self.plants.iter_mut().find(|p| p.id == id)
    }

    /// Clamp every bounded attribute back into range.
    pub fn clamp_attributes(&mut self) {
        self.moisture = self.moisture.clamp(0.0, ATTRIBUTE_MAX);
        self.light_level = self.light_level.clamp(0.0, ATTRIBUTE_MAX);
        self.human_presence = self.human_presence.clamp(0.0, ATTRIBUTE_MAX);
        self.wind_level = self.wind_level.clamp(0.0, ATTRIBUTE_MAX);
        self.vegetation_density = self.vegetation_density.clamp(0.0, ATTRIBUTE_MAX);
        self.nutrition = self.nutrition.clamp(0.0, ATTRIBUTE_MAX);
        self.fertilizer_level = self.fertilizer_level.clamp(0.0, ATTRIBUTE_MAX);
        self.water_timer = self.water_timer.max(0.0);
    }
}

impl Default for Chunk {
    fn default() -> Self {
        Self::new(0, 0)
    }
}
