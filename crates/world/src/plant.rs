//! Plant species templates and living plant instances.
//!
//! [`PlantDefinition`] is authored content (usually JSON) shared by every
//! instance of a species through an `Arc`. Optional sections are modelled as
//! `Option`s: an absent section means the behaviour does not apply to the
//! species, never an error.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Identifier of a plant instance, unique within one growth engine.
pub type PlantId = u64;

/// Default ticks between part events at an environment multiplier of 1.0.
pub const DEFAULT_PART_INTERVAL: u64 = 40;

/// Inclusive numeric range used by environment preferences.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// How far `value` lies outside the range (0 when inside).
    pub fn distance(&self, value: f64) -> f64 {
        if value < self.min {
            self.min - value
        } else if value > self.max {
            value - self.max
        } else {
            0.0
        }
    }
}

/// Growth pace and per-maturity-point resource costs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GrowthProfile {
    /// Maturity points gained per tick in ideal conditions.
    pub maturity_rate: f64,
    /// Species-specific growth multiplier.
    pub growth_multiplier: f64,
    /// Nutrition consumed per maturity point gained.
    pub nutrition_cost: f64,
    /// Fertilizer consumed per maturity point gained.
    pub fertilizer_cost: f64,
    /// Water consumed per maturity point gained.
    pub water_cost: f64,
}

impl Default for GrowthProfile {
    fn default() -> Self {
        Self {
            maturity_rate: 1.0,
            growth_multiplier: 1.0,
            nutrition_cost: 0.05,
            fertilizer_cost: 0.0,
            water_cost: 0.1,
        }
    }
}

/// Conditions a species prefers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnvironmentPreference {
    pub moisture: Bounds,
    pub temperature: Bounds,
    /// Degrees outside `temperature` at which the temperature score hits zero.
    pub temperature_tolerance: f64,
    /// Light level below which growth slows.
    pub min_light: f64,
    /// Human presence the species shrugs off.
    pub human_tolerance: f64,
}

impl Default for EnvironmentPreference {
    fn default() -> Self {
        Self {
            moisture: Bounds::new(40.0, 80.0),
            temperature: Bounds::new(10.0, 28.0),
            temperature_tolerance: 15.0,
            min_light: 30.0,
            human_tolerance: 40.0,
        }
    }
}

/// Explicit bounds that must hold before a plant can spread.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReproductionRequirements {
    pub moisture: Option<Bounds>,
    pub temperature: Option<Bounds>,
    pub max_vegetation_density: Option<f64>,
}

/// How a mature plant spreads to neighbouring chunks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReproductionRule {
    /// Per-tick probability of spreading once requirements are met.
    pub chance: f64,
    /// Upper bound of offspring per successful roll.
    pub max_offspring: u32,
    /// Spread radius in chunks (Euclidean).
    pub range: f64,
    #[serde(default)]
    pub requirements: Option<ReproductionRequirements>,
}

/// Resistance to environmental stress.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Resilience {
    /// Hit points lost per tick at full stress; engine default when unset.
    pub stress_damage: Option<f64>,
    /// 0-1, softens the penalty for too little moisture.
    pub drought_resistance: f64,
    /// 0-1, softens the penalty for temperatures below the preferred range.
    pub cold_resistance: f64,
    /// 0-1, softens the penalty for temperatures above the preferred range.
    pub heat_resistance: f64,
}

/// Category of a harvestable part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartKind {
    Fruit,
    Leaf,
    Flower,
    Seed,
    Root,
    #[default]
    Other,
}

impl PartKind {
    /// Leaf-like parts are shed faster in wind.
    pub fn is_wind_sensitive(self) -> bool {
        matches!(self, PartKind::Leaf | PartKind::Flower)
    }
}

/// Template of a harvestable part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartDefinition {
    pub name: String,
    #[serde(default)]
    pub kind: PartKind,
    pub max_qty: u32,
    #[serde(default)]
    pub initial_qty: u32,
    /// Base probability of growing one unit per event.
    pub grow_prob: f64,
    /// Base probability of dropping one unit per event.
    pub drop_prob: f64,
    #[serde(default)]
    pub stamina_cost: u32,
    #[serde(default = "default_part_interval")]
    pub base_interval: u64,
}

fn default_part_interval() -> u64 {
    DEFAULT_PART_INTERVAL
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantProperties {
    pub parts: Vec<PartDefinition>,
}

/// Immutable species template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantDefinition {
    pub id: String,
    pub name: String,
    pub hp: f64,
    #[serde(default)]
    pub growth: GrowthProfile,
    #[serde(default)]
    pub environment: EnvironmentPreference,
    /// Density points added to the chunk at full maturity.
    #[serde(default)]
    pub vegetation_contribution: f64,
    #[serde(default)]
    pub reproduction: Option<ReproductionRule>,
    #[serde(default)]
    pub resilience: Option<Resilience>,
    #[serde(default)]
    pub plant_properties: Option<PlantProperties>,
}

impl PlantDefinition {
    /// Part templates, empty when the species has none.
    pub fn part_definitions(&self) -> &[PartDefinition] {
        self.plant_properties
            .as_ref()
            .map(|props| props.parts.as_slice())
            .unwrap_or(&[])
    }
}

/// Per-instance state of one harvestable part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantPart {
    pub name: String,
    pub kind: PartKind,
    pub current_qty: u32,
    pub max_qty: u32,
    /// Simulated tick of the next grow/drop check; `None` when nothing is due.
    pub next_tick: Option<u64>,
    /// Consecutive unsuitable ticks.
    pub decay_counter: u32,
    /// Environment multiplier used when `next_tick` was computed.
    pub last_env_multiplier: f64,
    pub stamina_cost: u32,
    pub grow_prob: f64,
    pub drop_prob: f64,
    pub base_interval: u64,
}

impl PlantPart {
    pub fn from_definition(definition: &PartDefinition) -> Self {
        Self {
            name: definition.name.clone(),
            kind: definition.kind,
            current_qty: definition.initial_qty.min(definition.max_qty),
            max_qty: definition.max_qty,
            next_tick: None,
            decay_counter: 0,
            last_env_multiplier: 1.0,
            stamina_cost: definition.stamina_cost,
            grow_prob: definition.grow_prob,
            drop_prob: definition.drop_prob,
            base_interval: definition.base_interval,
        }
    }

    pub fn is_full(&self) -> bool {
        self.current_qty >= self.max_qty
    }
}

/// One living plant on a chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantInstance {
    pub id: PlantId,
    pub definition: Arc<PlantDefinition>,
    pub hp: f64,
    /// 0-100.
    pub maturity: f64,
    /// Ticks lived.
    pub age: u64,
    pub parts: Vec<PlantPart>,
    /// Set once any part has held at least one unit.
    pub bore_parts: bool,
}

impl PlantInstance {
    /// Fresh seedling: full hp, zero maturity and age.
    pub fn new(id: PlantId, definition: Arc<PlantDefinition>) -> Self {
        let parts: Vec<PlantPart> = definition
            .part_definitions()
            .iter()
            .map(PlantPart::from_definition)
            .collect();
        let bore_parts = parts.iter().any(|p| p.current_qty > 0);
        Self {
            id,
            hp: definition.hp,
            maturity: 0.0,
            age: 0,
            parts,
            bore_parts,
            definition,
        }
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0.0
    }

    pub fn part(&self, name: &str) -> Option<&PlantPart> {
        self.parts.iter().find(|p| p.name == name)
    }

    pub fn part_mut(&mut self, name: &str) -> Option<&mut PlantPart> {
        self.parts.iter_mut().find(|p| p.name == name)
    }

    /// True once the plant has borne parts and every part is back at zero.
    pub fn parts_exhausted(&self) -> bool {
        self.bore_parts && !self.parts.is_empty() && self.parts.iter().all(|p| p.current_qty == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn berry_json() -> &'static str {
        r#"{
            "id": "berry",
            "name": "berry bush",
            "hp": 30,
            "vegetationContribution": 12,
            "plantProperties": {
                "parts": [
                    { "name": "berries", "kind": "fruit", "maxQty": 5, "growProb": 0.6, "dropProb": 0.1, "staminaCost": 2 }
                ]
            }
        }"#
    }

    #[test]
    fn definition_parses_with_optional_sections_absent() {
        let def: PlantDefinition = serde_json::from_str(berry_json()).unwrap();
        assert!(def.reproduction.is_none());
        assert!(def.resilience.is_none());
        assert_eq!(def.growth, GrowthProfile::default());
        assert_eq!(def.part_definitions().len(), 1);
        assert_eq!(def.part_definitions()[0].base_interval, DEFAULT_PART_INTERVAL);
    }

    #[test]
    fn new_instance_starts_as_seedling() {
        let def: Arc<PlantDefinition> = Arc::new(serde_json::from_str(berry_json()).unwrap());
        let plant = PlantInstance::new(7, def);
        assert_eq!(plant.hp, 30.0);
        assert_eq!(plant.maturity, 0.0);
        assert_eq!(plant.age, 0);
        assert_eq!(plant.parts[0].current_qty, 0);
        assert!(!plant.bore_parts);
        assert!(!plant.parts_exhausted());
    }

    #[test]
    fn bounds_distance() {
        let b = Bounds::new(10.0, 20.0);
        assert_eq!(b.distance(15.0), 0.0);
        assert_eq!(b.distance(5.0), 5.0);
        assert_eq!(b.distance(26.0), 6.0);
        assert!(b.contains(10.0));
        assert!(!b.contains(20.5));
    }

    #[test]
    fn leaf_like_parts_feel_the_wind() {
        assert!(PartKind::Leaf.is_wind_sensitive());
        assert!(PartKind::Flower.is_wind_sensitive());
        assert!(!PartKind::Fruit.is_wind_sensitive());
    }
}
