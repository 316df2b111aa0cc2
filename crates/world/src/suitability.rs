//! Environmental suitability of a chunk for a species.

use crate::chunk::{Chunk, ATTRIBUTE_MAX};
use crate::environment::{Season, WorldProfile};
use crate::plant::PlantDefinition;

/// Minimum score at which a plant can grow.
pub const GROW_THRESHOLD: f64 = 0.3;
/// Minimum score at which a plant can reproduce.
pub const REPRODUCE_THRESHOLD: f64 = 0.5;
/// Moisture bonus while a chunk is being watered.
pub const WATERED_MOISTURE_BONUS: f64 = 20.0;
/// Moisture points outside the preferred range at which the score hits zero.
const MOISTURE_FALLOFF: f64 = 50.0;
/// Share of the score that light can take away.
const LIGHT_WEIGHT: f64 = 0.3;
/// Score lost per point of human presence above the species tolerance.
const HUMAN_PENALTY_PER_POINT: f64 = 0.005;

/// Result of [`assess`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Suitability {
    /// 0-1.
    pub score: f64,
    /// `1 - score`.
    pub stress_level: f64,
    pub can_grow: bool,
    pub can_reproduce: bool,
}

/// Moisture the plant experiences, including watering and world bias.
pub fn effective_moisture(chunk: &Chunk, profile: Option<&WorldProfile>) -> f64 {
    let mut moisture = chunk.moisture + profile.map_or(0.0, |p| p.moisture_offset);
    if chunk.is_watered() {
        moisture += WATERED_MOISTURE_BONUS;
    }
    moisture.clamp(0.0, ATTRIBUTE_MAX)
}

/// Temperature the plant experiences, including season and world bias.
pub fn effective_temperature(chunk: &Chunk, season: Season, profile: Option<&WorldProfile>) -> f64 {
    chunk.temperature + season.temperature_shift() + profile.map_or(0.0, |p| p.temperature_offset)
}

/// Score how well `chunk` suits `definition` right now.
pub fn assess(
    chunk: &Chunk,
    definition: &PlantDefinition,
    season: Season,
    profile: Option<&WorldProfile>,
) -> Suitability {
    let env = &definition.environment;
    let resilience = definition.resilience.unwrap_or_default();

    let moisture = effective_moisture(chunk, profile);
    let mut moisture_score = (1.0 - env.moisture.distance(moisture) / MOISTURE_FALLOFF).clamp(0.0, 1.0);
    if moisture < env.moisture.min {
        moisture_score = soften(moisture_score, resilience.drought_resistance);
    }

    let temperature = effective_temperature(chunk, season, profile);
    let tolerance = env.temperature_tolerance.max(1.0);
    let mut temperature_score = (1.0 - env.temperature.distance(temperature) / tolerance).clamp(0.0, 1.0);
    if temperature < env.temperature.min {
        temperature_score = soften(temperature_score, resilience.cold_resistance);
    } else if temperature > env.temperature.max {
        temperature_score = soften(temperature_score, resilience.heat_resistance);
    }

    let light_score = if env.min_light <= 0.0 {
        1.0
    } else {
        (chunk.light_level / env.min_light).clamp(0.0, 1.0)
    };

    let human_penalty =
        (chunk.human_presence - env.human_tolerance).max(0.0) * HUMAN_PENALTY_PER_POINT;

    let base = (moisture_score * temperature_score).sqrt();
    let lit = base * (1.0 - LIGHT_WEIGHT + LIGHT_WEIGHT * light_score);
    let score = (lit * season.suitability_factor() - human_penalty).clamp(0.0, 1.0);

    let can_grow = score >= GROW_THRESHOLD;
    let can_reproduce = can_grow
        && score >= REPRODUCE_THRESHOLD
        && reproduction_requirements_met(chunk, definition, moisture, temperature);

    Suitability {
        score,
        stress_level: 1.0 - score,
        can_grow,
        can_reproduce,
    }
}

fn soften(score: f64, resistance: f64) -> f64 {
    let resistance = resistance.clamp(0.0, 1.0);
    1.0 - (1.0 - score) * (1.0 - resistance)
}

fn reproduction_requirements_met(
    chunk: &Chunk,
    definition: &PlantDefinition,
    moisture: f64,
    temperature: f64,
) -> bool {
    let Some(requirements) = definition
        .reproduction
        .as_ref()
        .and_then(|rule| rule.requirements.as_ref())
    else {
        return true;
    };

    requirements.moisture.map_or(true, |b| b.contains(moisture))
        && requirements.temperature.map_or(true, |b| b.contains(temperature))
        && requirements
            .max_vegetation_density
            .map_or(true, |max| chunk.vegetation_density <= max)
}
