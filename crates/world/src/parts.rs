//! Scheduled grow/drop events for harvestable plant parts.
//!
//! Every part carries the simulated tick of its next check. Schedules are
//! derived from string-keyed seeds (`"x,y,plant,part,purpose"`) so the same
//! world state always produces the same timeline, no matter how many ticks
//! elapsed between two calls. Catch-up after long gaps is bounded by a per
//! chunk event ceiling.

use crate::chunk::{Chunk, ChunkKey, ATTRIBUTE_MAX};
use crate::environment::{Season, WorldProfile};
use crate::narrative::{keys, NarrativeMessage, Translate};
use crate::plant::{PlantId, PlantPart};
use crate::suitability::{assess, Suitability};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use wildgrove_core::{random, seed_from_key, SeededRng};

/// Default ceiling of events processed per chunk per call.
pub const DEFAULT_MAX_EVENTS_PER_CHUNK: usize = 100;
/// Consecutive unsuitable ticks before a part starts wilting.
pub const DECAY_THRESHOLD: u32 = 10;
/// Relative change of the environment multiplier that forces a reschedule.
pub const RESCHEDULE_DRIFT: f64 = 0.2;
/// Extra drop chance for leaf-like parts at full wind.
pub const LEAF_WIND_BONUS: f64 = 0.1;
/// Floor applied to the multiplier when computing intervals.
const MIN_ENV_MULTIPLIER: f64 = 0.1;

/// Seed key for a part and purpose, e.g. `"3,-1,17,berries,event:420"`.
pub fn part_seed_key(chunk: ChunkKey, plant_id: PlantId, part_name: &str, purpose: &str) -> String {
    format!("{},{},{},{},{}", chunk.x, chunk.y, plant_id, part_name, purpose)
}

/// How fast parts cycle in the current conditions; higher means sooner events.
pub fn environment_multiplier(suitability: &Suitability, season: Season) -> f64 {
    suitability.score * season.growth_multiplier()
}

/// Tick of the next event for `part`, always strictly after `current_time`.
///
/// The interval is `base_interval / max(env, 0.1)` scaled by a jitter in
/// `[0.5, 1.5)` drawn from `seed_key`.
pub fn schedule_next_event(
    part: &PlantPart,
    env_multiplier: f64,
    current_time: u64,
    seed_key: &str,
) -> u64 {
    let (jitter, _) = random(seed_from_key(seed_key));
    let base = part.base_interval.max(1) as f64;
    let interval = base / env_multiplier.max(MIN_ENV_MULTIPLIER) * (0.5 + jitter);
    current_time.saturating_add((interval.round() as u64).max(1))
}

fn drifted(previous: f64, current: f64) -> bool {
    if previous <= 0.0 {
        return current > 0.0;
    }
    ((current - previous) / previous).abs() > RESCHEDULE_DRIFT
}

/// Result of one [`PartScheduler::process_due_plant_parts`] call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartEventOutcome {
    pub messages: Vec<NarrativeMessage>,
    pub events_processed: usize,
}

/// Processes due part events chunk by chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartScheduler {
    pub max_events_per_chunk: usize,
}

impl Default for PartScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_EVENTS_PER_CHUNK)
    }
}

impl PartScheduler {
    pub fn new(max_events_per_chunk: usize) -> Self {
        Self {
            max_events_per_chunk,
        }
    }

    /// Advance every part on `chunk` up to `simulated_time`.
    ///
    /// Wilting is applied once per call. Plants that bore parts and lost all
    /// of them are removed with a "withered" message.
    pub fn process_due_plant_parts(
        &self,
        chunk: &mut Chunk,
        simulated_time: u64,
        season: Season,
        profile: Option<&WorldProfile>,
        translator: &dyn Translate,
    ) -> PartEventOutcome {
        let key = chunk.key();
        let wind = (chunk.wind_level / ATTRIBUTE_MAX).clamp(0.0, 1.0);
        let mut plants = std::mem::take(&mut chunk.plants);
        let mut events = 0usize;

        for plant in plants.iter_mut().filter(|p| !p.parts.is_empty()) {
            let suitability = assess(chunk, &plant.definition, season, profile);
            let env = environment_multiplier(&suitability, season);

            for part in plant.parts.iter_mut() {
                if suitability.can_grow {
                    part.decay_counter = 0;
                } else {
                    part.decay_counter = part.decay_counter.saturating_add(1);
                    if part.decay_counter >= DECAY_THRESHOLD && part.current_qty > 0 {
                        part.current_qty -= 1;
                    }
                }

                match part.next_tick {
                    None if !part.is_full() => {
                        let seed_key = part_seed_key(
                            key,
                            plant.id,
                            &part.name,
                            &format!("schedule:{simulated_time}"),
                        );
                        part.next_tick =
                            Some(schedule_next_event(part, env, simulated_time, &seed_key));
                        part.last_env_multiplier = env;
                    }
                    Some(next) if next > simulated_time && drifted(part.last_env_multiplier, env) => {
                        let seed_key = part_seed_key(
                            key,
                            plant.id,
                            &part.name,
                            &format!("drift:{simulated_time}"),
                        );
                        part.next_tick =
                            Some(schedule_next_event(part, env, simulated_time, &seed_key));
                        part.last_env_multiplier = env;
                    }
                    _ => {}
                }

                while let Some(due) = part.next_tick {
                    if due > simulated_time || events >= self.max_events_per_chunk {
                        break;
                    }
                    events += 1;
                    if run_event(key, plant.id, part, due, env, wind) {
                        plant.bore_parts = true;
                    }
                }
            }
        }

        let mut messages = Vec::new();
        plants.retain(|plant| {
            if plant.parts_exhausted() {
                debug!(chunk = %key, plant = plant.id, "plant withered");
                messages.push(NarrativeMessage::narrative(
                    translator.t(keys::PLANT_WITHERED, &[("name", plant.name())]),
                ));
                false
            } else {
                true
            }
        });
        chunk.plants = plants;

        PartEventOutcome {
            messages,
            events_processed: events,
        }
    }
}

/// One grow/drop check at tick `due`. Returns whether the part grew.
fn run_event(
    chunk: ChunkKey,
    plant_id: PlantId,
    part: &mut PlantPart,
    due: u64,
    env: f64,
    wind: f64,
) -> bool {
    let event_key = part_seed_key(chunk, plant_id, &part.name, &format!("event:{due}"));
    let mut rng = SeededRng::new(seed_from_key(&event_key));

    let grew = part.current_qty < part.max_qty && rng.next_f64() < part.grow_prob * env;
    if grew {
        part.current_qty += 1;
    }

    let mut drop_chance = part.drop_prob * env;
    if part.kind.is_wind_sensitive() {
        drop_chance += LEAF_WIND_BONUS * wind;
    }
    if part.current_qty > 0 && rng.next_f64() < drop_chance {
        part.current_qty -= 1;
    }

    if part.is_full() {
        part.next_tick = None;
    } else {
        let schedule_key = part_seed_key(chunk, plant_id, &part.name, &format!("schedule:{due}"));
        part.next_tick = Some(schedule_next_event(part, env, due, &schedule_key));
        part.last_env_multiplier = env;
    }
    grew
}

/// What a successful harvest yielded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestOutcome {
    pub harvested: u32,
    pub stamina_spent: u32,
    pub remaining: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HarvestError {
    #[error("no chunk at {0}")]
    ChunkNotFound(ChunkKey),
    #[error("plant {0} not found")]
    PlantNotFound(PlantId),
    #[error("plant {plant} has no part named '{part}'")]
    PartNotFound { plant: PlantId, part: String },
    #[error("part '{0}' has nothing to harvest")]
    NothingToHarvest(String),
    #[error("harvest quantity must be positive")]
    ZeroQuantity,
}

/// Take up to `qty` units of a part.
///
/// A part that was full has no pending event; clearing its schedule lets the
/// next scheduler pass pick it up again.
pub fn harvest_part(
    chunk: &mut Chunk,
    plant_id: PlantId,
    part_name: &str,
    qty: u32,
) -> Result<HarvestOutcome, HarvestError> {
    if qty == 0 {
        return Err(HarvestError::ZeroQuantity);
    }
    let plant = chunk
        .plant_mut(plant_id)
        .ok_or(HarvestError::PlantNotFound(plant_id))?;
    let part = plant
        .part_mut(part_name)
        .ok_or_else(|| HarvestError::PartNotFound {
            plant: plant_id,
            part: part_name.to_string(),
        })?;
    if part.current_qty == 0 {
        return Err(HarvestError::NothingToHarvest(part_name.to_string()));
    }

    let was_full = part.is_full();
    let harvested = qty.min(part.current_qty);
    part.current_qty -= harvested;
    if was_full {
        part.next_tick = None;
    }

    Ok(HarvestOutcome {
        harvested,
        stamina_spent: part.stamina_cost.saturating_mul(harvested),
        remaining: part.current_qty,
    })
}
