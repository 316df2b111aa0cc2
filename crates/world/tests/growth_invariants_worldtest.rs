//! Long-running invariants of the growth engine and part scheduler.

use std::sync::Arc;
use std::time::Instant;
use wildgrove_core::Seed;
use wildgrove_testkit::{
    ExecutionMetrics, MetricsReportBuilder, MetricsSink, TestResult, VegetationMetrics,
};
use wildgrove_world::{
    builtin_species, Chunk, ChunkKey, ChunkMap, EnglishCatalog, MessageKind, PartDefinition,
    PartKind, PartScheduler, PlantDefinition, PlantGrowthEngine, PlantProperties, Season, World,
    ATTRIBUTE_MAX,
};

fn assert_chunk_invariants(chunk: &Chunk) {
    assert!(chunk.nutrition >= 0.0, "nutrition {}", chunk.nutrition);
    assert!(chunk.fertilizer_level >= 0.0);
    assert!(chunk.water_timer >= 0.0);
    assert!(chunk.moisture >= 0.0);
    assert!((0.0..=ATTRIBUTE_MAX).contains(&chunk.vegetation_density));
    for plant in &chunk.plants {
        assert!(plant.maturity <= 100.0, "maturity {}", plant.maturity);
        assert!(plant.maturity >= 0.0);
        assert!(plant.hp > 0.0, "dead plant left in chunk");
        for part in &plant.parts {
            assert!(part.current_qty <= part.max_qty);
        }
    }
}

#[test]
fn invariants_hold_over_long_runs() {
    let started = Instant::now();
    let mut metrics = VegetationMetrics::default();

    for seed in [1u64, 42, 9001] {
        let mut world = World::generate(Seed::new(seed), 6, 6);
        metrics.plants_initial += world.plant_count();
        for _ in 0..1_500 {
            metrics.narrative_messages += world.tick().len();
            for chunk in world.chunks.values() {
                assert_chunk_invariants(chunk);
            }
        }
        metrics.ticks += 1_500;
        metrics.chunks += world.chunks.len();
        metrics.plants_final += world.plant_count();
        for chunk in world.chunks.values() {
            metrics.max_density = metrics.max_density.max(chunk.vegetation_density);
            metrics.avg_density += chunk.vegetation_density;
        }
    }
    metrics.avg_density /= metrics.chunks.max(1) as f64;

    let report = MetricsReportBuilder::new("growth_invariants")
        .result(TestResult::Pass)
        .vegetation(metrics)
        .execution(ExecutionMetrics {
            duration_seconds: started.elapsed().as_secs_f64(),
            assertions_checked: None,
        })
        .build();
    let path = std::env::temp_dir().join("wildgrove-growth-invariants.json");
    MetricsSink::create(&path)
        .and_then(|sink| sink.write(&report))
        .expect("metrics written");
}

#[test]
fn dying_plant_is_removed_with_named_message() {
    let mut engine = PlantGrowthEngine::new(Seed::new(12));
    let mut chunks = ChunkMap::new();
    let mut chunk = Chunk::new(0, 0);
    chunk.moisture = 0.0;
    chunk.temperature = 50.0;
    let fern = builtin_species()
        .into_iter()
        .find(|d| d.id == "river_fern")
        .unwrap();
    engine.add_plant(&mut chunk, fern);
    chunk.plants[0].hp = 0.5;
    chunks.insert(ChunkKey::new(0, 0), chunk);

    let messages = engine.update_plants(1, &mut chunks, Season::Summer, None);

    assert!(chunks[&ChunkKey::new(0, 0)].plants.is_empty());
    let died: Vec<_> = messages
        .iter()
        .filter(|m| m.kind == MessageKind::Narrative && m.text.contains("river fern"))
        .collect();
    assert_eq!(died.len(), 1);
    assert!(died[0].text.contains("died"));
}

#[test]
fn event_cap_bounds_work_after_long_gap() {
    let definition = Arc::new(PlantDefinition {
        id: "sprawl".into(),
        name: "sprawling vine".into(),
        hp: 50.0,
        growth: Default::default(),
        environment: Default::default(),
        vegetation_contribution: 4.0,
        reproduction: None,
        resilience: None,
        plant_properties: Some(PlantProperties {
            parts: (0..4)
                .map(|i| PartDefinition {
                    name: format!("tendril-{i}"),
                    kind: PartKind::Leaf,
                    max_qty: 1_000_000,
                    initial_qty: 1,
                    grow_prob: 0.5,
                    drop_prob: 0.1,
                    stamina_cost: 0,
                    base_interval: 5,
                })
                .collect(),
        }),
    });

    let mut engine = PlantGrowthEngine::new(Seed::new(5));
    let mut chunk = Chunk::new(0, 0);
    chunk.moisture = 60.0;
    for _ in 0..3 {
        engine.add_plant(&mut chunk, Arc::clone(&definition));
    }
    for plant in &mut chunk.plants {
        for part in &mut plant.parts {
            part.next_tick = Some(0);
            part.last_env_multiplier = 1.0;
        }
    }

    let scheduler = PartScheduler::new(100);
    let outcome =
        scheduler.process_due_plant_parts(&mut chunk, 10_000, Season::Summer, None, &EnglishCatalog);
    assert!(outcome.events_processed <= 100);
    assert_eq!(outcome.events_processed, 100);

    let total_after_second: usize = (0..5)
        .map(|_| {
            scheduler
                .process_due_plant_parts(&mut chunk, 10_000, Season::Summer, None, &EnglishCatalog)
                .events_processed
        })
        .inspect(|n| assert!(*n <= 100))
        .sum();
    assert!(total_after_second > 0);
}

#[test]
fn offspring_never_exceed_chunk_capacity() {
    let mut world = World::generate(Seed::new(77), 4, 4);
    let cap = world.engine.config().max_plants_per_chunk;
    for _ in 0..2_000 {
        world.tick();
    }
    for chunk in world.chunks.values() {
        assert!(chunk.plants.len() <= cap, "{} plants", chunk.plants.len());
    }
}
