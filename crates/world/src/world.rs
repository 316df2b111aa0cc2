//! The tick driver: owns the chunk map and advances every subsystem.

use crate::chunk::{Chunk, ChunkKey, ChunkMap, ATTRIBUTE_MAX};
use crate::clock::SimClock;
use crate::environment::WorldProfile;
use crate::growth::{GrowthConfig, PlantGrowthEngine};
use crate::narrative::{keys, NarrativeMessage};
use crate::parts::{harvest_part, HarvestError, HarvestOutcome};
use crate::plant::{PlantDefinition, PlantId};
use crate::species::builtin_species;
use crate::weather::Weather;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use wildgrove_core::{scoped_rng, seed_from_key, Seed, SeededRng, SimTick};

/// Plants seeded per chunk at generation time, at most.
const INITIAL_PLANTS_PER_CHUNK: i64 = 3;
/// Canopy shade at full vegetation density.
const MAX_CANOPY_SHADE: f64 = 0.4;

/// Complete simulation state; this is what a save slot holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct World {
    seed: Seed,
    pub chunks: ChunkMap,
    pub clock: SimClock,
    pub weather: Weather,
    pub engine: PlantGrowthEngine,
    pub profile: WorldProfile,
}

impl World {
    /// Empty world with default clock, weather and engine.
    pub fn new(seed: Seed) -> Self {
        Self {
            seed,
            chunks: ChunkMap::new(),
            clock: SimClock::default(),
            weather: Weather::default(),
            engine: PlantGrowthEngine::new(seed_from_key(&format!("{}:plants", seed.get()))),
            profile: WorldProfile::default(),
        }
    }

    /// Build a `width` x `height` grid with seeded conditions and the built-in
    /// species.
    pub fn generate(seed: Seed, width: i32, height: i32) -> Self {
        Self::generate_with_species(seed, width, height, &builtin_species())
    }

    /// Like [`World::generate`] but planting from `species`.
    pub fn generate_with_species(
        seed: Seed,
        width: i32,
        height: i32,
        species: &[Arc<PlantDefinition>],
    ) -> Self {
        let mut world = Self::new(seed);
        let mut rng = scoped_rng(seed, "terrain", SimTick::ZERO);
        for y in 0..height.max(0) {
            for x in 0..width.max(0) {
                world
                    .chunks
                    .insert(ChunkKey::new(x, y), generate_chunk(x, y, &mut rng));
            }
        }
        world.seed_vegetation(species);
        info!(
            seed = %seed,
            chunks = world.chunks.len(),
            plants = world.plant_count(),
            "world generated"
        );
        world
    }

    /// Scatter seedlings of `species` over every chunk.
    pub fn seed_vegetation(&mut self, species: &[Arc<PlantDefinition>]) {
        if species.is_empty() {
            return;
        }
        let mut rng = scoped_rng(self.seed, "vegetation", self.clock.tick);
        for chunk in self.chunks.values_mut() {
            let count = rng.next_int(0, INITIAL_PLANTS_PER_CHUNK + 1);
            for _ in 0..count {
                let pick = rng.next_int(0, species.len() as i64) as usize;
                self.engine.add_plant(chunk, Arc::clone(&species[pick]));
            }
        }
    }

    pub fn seed(&self) -> Seed {
        self.seed
    }

    pub fn with_profile(mut self, profile: WorldProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_growth_config(mut self, config: GrowthConfig) -> Self {
        self.engine.set_config(config);
        self
    }

    pub fn with_clock(mut self, clock: SimClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn chunk(&self, key: ChunkKey) -> Option<&Chunk> {
        self.chunks.get(&key)
    }

    pub fn chunk_mut(&mut self, key: ChunkKey) -> Option<&mut Chunk> {
        self.chunks.get_mut(&key)
    }

    pub fn plant_count(&self) -> usize {
        self.chunks.values().map(|c| c.plants.len()).sum()
    }

    /// Advance one tick and return the narrative produced.
    pub fn tick(&mut self) -> Vec<NarrativeMessage> {
        let previous_season = self.clock.season();
        self.clock.advance();
        let season = self.clock.season();
        let mut messages = Vec::new();

        if season != previous_season {
            info!(tick = self.clock.tick.0, %season, "season changed");
            let name = season.to_string();
            messages.push(NarrativeMessage::system(
                self.engine.translate(keys::SEASON_CHANGED, &[("season", &name)]),
            ));
        }

        if let Some(change) = self.weather.step(self.seed, self.clock.tick) {
            debug!(tick = self.clock.tick.0, from = ?change.from, to = ?change.to, "weather changed");
            let name = change.to.to_string();
            messages.push(NarrativeMessage::narrative(
                self.engine.translate(keys::WEATHER_CHANGED, &[("weather", &name)]),
            ));
        }

        let daylight = self.clock.daylight_level() * self.weather.state.light_modifier();
        for chunk in self.chunks.values_mut() {
            self.weather.apply_to_chunk(chunk);
            let shade = MAX_CANOPY_SHADE * chunk.vegetation_density / ATTRIBUTE_MAX;
            chunk.light_level = daylight * (1.0 - shade);
        }

        messages.extend(self.engine.update_plants(
            self.clock.tick.0,
            &mut self.chunks,
            season,
            Some(&self.profile),
        ));
        messages
    }

    /// Run `ticks` ticks, collecting all narrative.
    pub fn run(&mut self, ticks: u64) -> Vec<NarrativeMessage> {
        let mut messages = Vec::new();
        for _ in 0..ticks {
            messages.extend(self.tick());
        }
        messages
    }

    /// Player "listen" action: vegetation narrative for one chunk.
    pub fn listen(&self, key: ChunkKey) -> Option<String> {
        self.chunk(key)
            .and_then(|chunk| self.engine.get_vegetation_narrative_for_chunk(chunk))
    }

    pub fn add_plant(&mut self, key: ChunkKey, definition: Arc<PlantDefinition>) -> Option<PlantId> {
        let chunk = self.chunks.get_mut(&key)?;
        Some(self.engine.add_plant(chunk, definition))
    }

    pub fn water(&mut self, key: ChunkKey, ticks: f64) -> bool {
        match self.chunks.get_mut(&key) {
            Some(chunk) => {
                chunk.water(ticks);
                true
            }
            None => false,
        }
    }

    pub fn fertilize(&mut self, key: ChunkKey, amount: f64) -> bool {
        match self.chunks.get_mut(&key) {
            Some(chunk) => {
                chunk.fertilize(amount);
                true
            }
            None => false,
        }
    }

    pub fn harvest(
        &mut self,
        key: ChunkKey,
        plant_id: PlantId,
        part_name: &str,
        qty: u32,
    ) -> Result<HarvestOutcome, HarvestError> {
        let chunk = self
            .chunks
            .get_mut(&key)
            .ok_or(HarvestError::ChunkNotFound(key))?;
        harvest_part(chunk, plant_id, part_name, qty)
    }
}

fn generate_chunk(x: i32, y: i32, rng: &mut SeededRng) -> Chunk {
    let mut chunk = Chunk::new(x, y);
    chunk.moisture = 20.0 + rng.next_f64() * 70.0;
    chunk.temperature = 5.0 + rng.next_f64() * 25.0;
    chunk.human_presence = rng.next_f64() * 40.0;
    chunk.wind_level = rng.next_f64() * 30.0;
    chunk.nutrition = 30.0 + rng.next_f64() * 50.0;
    chunk.water_retention = 0.5 + rng.next_f64() * 1.5;
    chunk
}
