//! Per-tick plant life simulation.
//!
//! [`PlantGrowthEngine::update_plants`] walks every chunk in key order and, for
//! each plant, applies environmental stress, growth bounded by the scarcest
//! resource, and reproduction. Offspring are placed only after every chunk
//! was visited so a plant never sees siblings spawned earlier in the same
//! tick. Harvestable parts are then advanced by the [`PartScheduler`] and the
//! chunk's vegetation density is recomputed from the surviving plants.

use crate::chunk::{Chunk, ChunkKey, ChunkMap, ATTRIBUTE_MAX};
use crate::environment::{Season, WorldProfile};
use crate::narrative::{keys, EnglishCatalog, NarrativeMessage, Translate};
use crate::parts::{PartScheduler, DEFAULT_MAX_EVENTS_PER_CHUNK};
use crate::plant::{PlantDefinition, PlantId, PlantInstance};
use crate::suitability::{assess, Suitability};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, trace};
use wildgrove_core::{Seed, SeededRng};

/// Growth bonus per point of soil nutrition.
pub const NUTRITION_BONUS: f64 = 0.005;
/// Growth bonus per point of fertilizer (double the nutrition weight).
pub const FERTILIZER_BONUS: f64 = 0.01;
/// Growth factor while the chunk is being watered.
pub const WATERED_GROWTH_FACTOR: f64 = 1.2;
/// Maturity a plant needs before it can spread.
pub const REPRODUCTION_MATURITY: f64 = 80.0;
/// Maximum maturity.
pub const FULL_MATURITY: f64 = 100.0;
/// Share of a dead plant's hit points returned to the soil as nutrition.
pub const DECOMPOSITION_RATE: f64 = 0.1;
/// Density change that counts as noticeable.
pub const DENSITY_NARRATIVE_THRESHOLD: f64 = 10.0;

/// Tunables of the growth engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GrowthConfig {
    /// Offspring are not placed on chunks holding this many plants.
    pub max_plants_per_chunk: usize,
    /// Ceiling of part events per chunk per tick.
    pub max_events_per_chunk: usize,
    /// Stress level above which plants take damage.
    pub stress_threshold: f64,
    /// Damage at full stress for species without their own value.
    pub default_stress_damage: f64,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            max_plants_per_chunk: 8,
            max_events_per_chunk: DEFAULT_MAX_EVENTS_PER_CHUNK,
            stress_threshold: 0.7,
            default_stress_damage: 10.0,
        }
    }
}

fn default_translator() -> Arc<dyn Translate> {
    Arc::new(EnglishCatalog)
}

/// Offspring waiting to be placed once the tick's chunk pass is done.
struct PendingSpawn {
    source: ChunkKey,
    definition: Arc<PlantDefinition>,
    count: usize,
    range: f64,
}

/// Simulates plant life across a chunk map.
///
/// The engine owns its random stream and the plant id counter; both are
/// serialized so a reloaded world continues exactly where it stopped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantGrowthEngine {
    config: GrowthConfig,
    rng: SeededRng,
    next_plant_id: PlantId,
    #[serde(skip, default = "default_translator")]
    translator: Arc<dyn Translate>,
}

impl PlantGrowthEngine {
    pub fn new(seed: Seed) -> Self {
        Self::with_config(seed, GrowthConfig::default())
    }

    pub fn with_config(seed: Seed, config: GrowthConfig) -> Self {
        Self {
            config,
            rng: SeededRng::new(seed),
            next_plant_id: 1,
            translator: default_translator(),
        }
    }

    /// Replace the localisation used for narrative text.
    pub fn with_translator(mut self, translator: Arc<dyn Translate>) -> Self {
        self.translator = translator;
        self
    }

    pub fn set_translator(&mut self, translator: Arc<dyn Translate>) {
        self.translator = translator;
    }

    /// Render a narrative key with the engine's translator.
    pub fn translate(&self, key: &str, params: &[(&str, &str)]) -> String {
        self.translator.t(key, params)
    }

    pub fn config(&self) -> &GrowthConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: GrowthConfig) {
        self.config = config;
    }

    /// Current seed of the engine's stream.
    pub fn seed(&self) -> Seed {
        self.rng.seed()
    }

    /// Place a fresh seedling of `definition` on `chunk`.
    pub fn add_plant(&mut self, chunk: &mut Chunk, definition: Arc<PlantDefinition>) -> PlantId {
        let id = self.next_plant_id;
        self.next_plant_id += 1;
        debug!(chunk = %chunk.key(), plant = id, species = %definition.id, "plant added");
        chunk.plants.push(PlantInstance::new(id, definition));
        id
    }

    /// Simulate one tick for every chunk and return the narrative produced.
    pub fn update_plants(
        &mut self,
        current_tick: u64,
        chunks: &mut ChunkMap,
        season: Season,
        profile: Option<&WorldProfile>,
    ) -> Vec<NarrativeMessage> {
        let scheduler = PartScheduler::new(self.config.max_events_per_chunk);
        let translator = Arc::clone(&self.translator);
        let mut messages = Vec::new();
        let mut pending = Vec::new();
        let mut events = 0usize;

        for (key, chunk) in chunks.iter_mut() {
            self.update_chunk(*key, chunk, season, profile, &mut messages, &mut pending);

            let outcome = scheduler.process_due_plant_parts(
                chunk,
                current_tick,
                season,
                profile,
                translator.as_ref(),
            );
            events += outcome.events_processed;
            messages.extend(outcome.messages);

            let evaporation = 1.0 / chunk.water_retention.max(0.01);
            chunk.water_timer = (chunk.water_timer - evaporation).max(0.0);
            refresh_density(chunk);
            chunk.clamp_attributes();
        }

        let spawned = self.place_offspring(chunks, pending);
        debug!(
            tick = current_tick,
            events,
            spawned,
            messages = messages.len(),
            "plants updated"
        );
        messages
    }

    /// Pull-based vegetation narrative: text only when the last tick moved
    /// density by more than the threshold.
    pub fn get_vegetation_narrative_for_chunk(&self, chunk: &Chunk) -> Option<String> {
        let delta = chunk.vegetation_density - chunk.previous_vegetation_density;
        if delta > DENSITY_NARRATIVE_THRESHOLD {
            Some(self.translator.t(keys::VEGETATION_DENSER, &[]))
        } else if delta < -DENSITY_NARRATIVE_THRESHOLD {
            Some(self.translator.t(keys::VEGETATION_THINNER, &[]))
        } else {
            None
        }
    }

    fn update_chunk(
        &mut self,
        key: ChunkKey,
        chunk: &mut Chunk,
        season: Season,
        profile: Option<&WorldProfile>,
        messages: &mut Vec<NarrativeMessage>,
        pending: &mut Vec<PendingSpawn>,
    ) {
        let plants = std::mem::take(&mut chunk.plants);
        let mut survivors = Vec::with_capacity(plants.len());

        for mut plant in plants {
            plant.age += 1;
            let suitability = assess(chunk, &plant.definition, season, profile);

            if suitability.stress_level > self.config.stress_threshold {
                let damage = plant
                    .definition
                    .resilience
                    .and_then(|r| r.stress_damage)
                    .unwrap_or(self.config.default_stress_damage);
                plant.hp -= damage * suitability.stress_level;
            }

            if plant.is_dead() {
                debug!(chunk = %key, plant = plant.id, "plant died");
                messages.push(NarrativeMessage::narrative(
                    self.translator.t(keys::PLANT_DIED, &[("name", plant.name())]),
                ));
                chunk.enrich(plant.definition.hp * DECOMPOSITION_RATE);
                continue;
            }

            if suitability.can_grow && plant.maturity < FULL_MATURITY {
                grow(chunk, &mut plant, &suitability, season, profile);
            }

            if let Some(spawn) = self.roll_reproduction(key, &plant, &suitability) {
                pending.push(spawn);
            }

            survivors.push(plant);
        }

        chunk.plants = survivors;
    }

    fn roll_reproduction(
        &mut self,
        key: ChunkKey,
        plant: &PlantInstance,
        suitability: &Suitability,
    ) -> Option<PendingSpawn> {
        let rule = plant.definition.reproduction.as_ref()?;
        if plant.maturity < REPRODUCTION_MATURITY || !suitability.can_reproduce {
            return None;
        }
        if !self.rng.chance(rule.chance) {
            return None;
        }
        let max_offspring = rule.max_offspring.max(1) as f64;
        let count = (self.rng.next_f64() * max_offspring).floor() as usize + 1;
        Some(PendingSpawn {
            source: key,
            definition: Arc::clone(&plant.definition),
            count,
            range: rule.range,
        })
    }

    fn place_offspring(&mut self, chunks: &mut ChunkMap, pending: Vec<PendingSpawn>) -> usize {
        let mut placed = 0;
        for spawn in pending {
            let range_sq = spawn.range * spawn.range;
            let mut spots: Vec<ChunkKey> = chunks
                .keys()
                .copied()
                .filter(|k| *k != spawn.source && (spawn.source.distance_squared(*k) as f64) <= range_sq)
                .collect();
            let picked = self.rng.shuffle_prefix(&mut spots, spawn.count);

            for target in &spots[..picked] {
                let Some(chunk) = chunks.get_mut(target) else {
                    continue;
                };
                if chunk.plants.len() >= self.config.max_plants_per_chunk {
                    trace!(chunk = %target, "offspring skipped, chunk full");
                    continue;
                }
                self.add_plant(chunk, Arc::clone(&spawn.definition));
                placed += 1;
            }
        }
        placed
    }
}

/// Resource-bounded maturity gain for one plant.
fn grow(
    chunk: &mut Chunk,
    plant: &mut PlantInstance,
    suitability: &Suitability,
    season: Season,
    profile: Option<&WorldProfile>,
) {
    let growth = plant.definition.growth;
    let multiplier = growth.growth_multiplier
        * season.growth_multiplier()
        * profile.map_or(1.0, |p| p.growth_multiplier);

    let base_gain = ((1.0 - suitability.stress_level) * multiplier * growth.maturity_rate).max(0.0);
    let growth_bonus =
        1.0 + chunk.nutrition * NUTRITION_BONUS + chunk.fertilizer_level * FERTILIZER_BONUS;
    let water_factor = if chunk.is_watered() {
        WATERED_GROWTH_FACTOR
    } else {
        1.0
    };
    let potential = base_gain * growth_bonus * water_factor;
    if potential <= 0.0 {
        return;
    }

    let water_available = chunk.water_timer + chunk.moisture;
    let factor = scarcity(chunk.nutrition, potential * growth.nutrition_cost)
        .min(scarcity(chunk.fertilizer_level, potential * growth.fertilizer_cost))
        .min(scarcity(water_available, potential * growth.water_cost))
        .min(1.0);
    let gain = potential * factor;

    plant.maturity = (plant.maturity + gain).min(FULL_MATURITY);

    chunk.nutrition = (chunk.nutrition - gain * growth.nutrition_cost).max(0.0);
    chunk.fertilizer_level = (chunk.fertilizer_level - gain * growth.fertilizer_cost).max(0.0);

    let mut water = gain * growth.water_cost;
    let from_timer = water.min(chunk.water_timer);
    chunk.water_timer -= from_timer;
    water -= from_timer;
    chunk.moisture = (chunk.moisture - water).max(0.0);

    trace!(plant = plant.id, gain, maturity = plant.maturity, "plant grew");
}

fn scarcity(available: f64, needed: f64) -> f64 {
    if needed > 0.0 && available < needed {
        (available / needed).max(0.0)
    } else {
        1.0
    }
}

/// Recompute density from living plants and record the change.
fn refresh_density(chunk: &mut Chunk) {
    let density: f64 = chunk
        .plants
        .iter()
        .map(|p| p.definition.vegetation_contribution * (p.maturity / FULL_MATURITY))
        .sum();
    chunk.previous_vegetation_density = chunk.vegetation_density;
    chunk.vegetation_density = density.clamp(0.0, ATTRIBUTE_MAX);
    chunk.vegetation_changed_significantly = (chunk.vegetation_density
        - chunk.previous_vegetation_density)
        .abs()
        > DENSITY_NARRATIVE_THRESHOLD;
}
