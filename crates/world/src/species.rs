//! Built-in species used when no content pack provides plants.

use crate::plant::{
    Bounds, EnvironmentPreference, GrowthProfile, PartDefinition, PartKind, PlantDefinition,
    PlantProperties, ReproductionRequirements, ReproductionRule, Resilience,
};
use std::sync::Arc;

/// The default species set, in a stable order.
pub fn builtin_species() -> Vec<Arc<PlantDefinition>> {
    vec![
        Arc::new(wild_blackberry()),
        Arc::new(river_fern()),
        Arc::new(mountain_pine()),
        Arc::new(dune_grass()),
    ]
}

fn wild_blackberry() -> PlantDefinition {
    PlantDefinition {
        id: "wild_blackberry".into(),
        name: "wild blackberry".into(),
        hp: 40.0,
        growth: GrowthProfile {
            maturity_rate: 1.2,
            nutrition_cost: 0.06,
            fertilizer_cost: 0.02,
            ..GrowthProfile::default()
        },
        environment: EnvironmentPreference {
            moisture: Bounds::new(40.0, 80.0),
            temperature: Bounds::new(12.0, 28.0),
            human_tolerance: 50.0,
            ..EnvironmentPreference::default()
        },
        vegetation_contribution: 18.0,
        reproduction: Some(ReproductionRule {
            chance: 0.02,
            max_offspring: 2,
            range: 2.0,
            requirements: Some(ReproductionRequirements {
                max_vegetation_density: Some(70.0),
                ..ReproductionRequirements::default()
            }),
        }),
        resilience: Some(Resilience {
            drought_resistance: 0.3,
            ..Resilience::default()
        }),
        plant_properties: Some(PlantProperties {
            parts: vec![PartDefinition {
                name: "berries".into(),
                kind: PartKind::Fruit,
                max_qty: 6,
                initial_qty: 0,
                grow_prob: 0.6,
                drop_prob: 0.05,
                stamina_cost: 2,
                base_interval: 30,
            }],
        }),
    }
}

fn river_fern() -> PlantDefinition {
    PlantDefinition {
        id: "river_fern".into(),
        name: "river fern".into(),
        hp: 25.0,
        growth: GrowthProfile {
            maturity_rate: 1.5,
            water_cost: 0.2,
            ..GrowthProfile::default()
        },
        environment: EnvironmentPreference {
            moisture: Bounds::new(55.0, 95.0),
            temperature: Bounds::new(12.0, 26.0),
            temperature_tolerance: 12.0,
            min_light: 25.0,
            human_tolerance: 30.0,
        },
        vegetation_contribution: 10.0,
        reproduction: Some(ReproductionRule {
            chance: 0.05,
            max_offspring: 3,
            range: 1.5,
            requirements: None,
        }),
        resilience: Some(Resilience {
            cold_resistance: 0.2,
            ..Resilience::default()
        }),
        plant_properties: Some(PlantProperties {
            parts: vec![PartDefinition {
                name: "fronds".into(),
                kind: PartKind::Leaf,
                max_qty: 8,
                initial_qty: 2,
                grow_prob: 0.5,
                drop_prob: 0.15,
                stamina_cost: 1,
                base_interval: 20,
            }],
        }),
    }
}

fn mountain_pine() -> PlantDefinition {
    PlantDefinition {
        id: "mountain_pine".into(),
        name: "mountain pine".into(),
        hp: 120.0,
        growth: GrowthProfile {
            maturity_rate: 0.3,
            nutrition_cost: 0.02,
            water_cost: 0.05,
            ..GrowthProfile::default()
        },
        environment: EnvironmentPreference {
            moisture: Bounds::new(25.0, 70.0),
            temperature: Bounds::new(-5.0, 20.0),
            temperature_tolerance: 20.0,
            min_light: 40.0,
            human_tolerance: 60.0,
        },
        vegetation_contribution: 35.0,
        reproduction: Some(ReproductionRule {
            chance: 0.01,
            max_offspring: 1,
            range: 3.0,
            requirements: Some(ReproductionRequirements {
                temperature: Some(Bounds::new(-10.0, 22.0)),
                ..ReproductionRequirements::default()
            }),
        }),
        resilience: Some(Resilience {
            stress_damage: Some(4.0),
            drought_resistance: 0.5,
            cold_resistance: 0.8,
            heat_resistance: 0.1,
        }),
        plant_properties: None,
    }
}

/// Bare template: every optional section is absent.
fn dune_grass() -> PlantDefinition {
    PlantDefinition {
        id: "dune_grass".into(),
        name: "dune grass".into(),
        hp: 15.0,
        growth: GrowthProfile {
            maturity_rate: 2.0,
            water_cost: 0.03,
            ..GrowthProfile::default()
        },
        environment: EnvironmentPreference {
            moisture: Bounds::new(10.0, 50.0),
            temperature: Bounds::new(14.0, 34.0),
            ..EnvironmentPreference::default()
        },
        vegetation_contribution: 6.0,
        reproduction: None,
        resilience: None,
        plant_properties: None,
    }
}
