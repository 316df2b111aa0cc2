//! wildgrove: headless driver for the vegetation simulation and loot rules.

mod config;
mod content_packs;
mod saves;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::{info, warn};
use wildgrove_core::{roll_loot, Seed};
use wildgrove_world::{ChunkKey, World};

use crate::config::{SimConfig, DEFAULT_CONFIG_PATH};
use crate::content_packs::load_pack_content_lenient;
use crate::saves::{DirectorySaveRepository, SaveRepository};

#[derive(Parser, Debug)]
#[command(author, version, about = "Deterministic vegetation simulation and loot rolls", long_about = None)]
struct Cli {
    /// Simulation config file (TOML)
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the vegetation simulation and print narrative messages
    Simulate(SimulateArgs),
    /// Roll loot once, or roll a named table from the content packs
    Loot(LootArgs),
    /// List the species available to the simulation
    Species,
    /// Manage save slots
    #[command(subcommand)]
    Saves(SavesCommand),
    /// Write the effective configuration to the config path
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug)]
struct SimulateArgs {
    /// World seed (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Grid width in chunks
    #[arg(long)]
    width: Option<i32>,

    /// Grid height in chunks
    #[arg(long)]
    height: Option<i32>,

    /// Number of ticks to simulate
    #[arg(long)]
    ticks: Option<u64>,

    /// Continue from a save slot instead of generating a new world
    #[arg(long)]
    resume: Option<String>,

    /// Save the final state to this slot
    #[arg(long)]
    save: Option<String>,

    /// Print messages as JSON lines
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct LootArgs {
    /// Seed of the roll
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Base drop chance in percent
    #[arg(long, default_value_t = 50.0)]
    base_chance: f64,

    /// Item rarity tier (1-5)
    #[arg(long, default_value_t = 1)]
    rarity: i32,

    /// Encounter difficulty tier (1-5)
    #[arg(long, default_value_t = 1)]
    difficulty: i32,

    /// Roll every entry of this content pack loot table instead
    #[arg(long)]
    table: Option<String>,
}

#[derive(Subcommand, Debug)]
enum SavesCommand {
    /// List save slots, most recent first
    List,
    /// Delete a save slot
    Delete { slot: String },
}

fn main() -> Result<()> {
    // Initialize tracing with WARN level by default (can be overridden via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = SimConfig::load_from_path(&cli.config);

    match cli.command {
        Command::Simulate(args) => simulate(&config, args),
        Command::Loot(args) => loot(&config, args),
        Command::Species => species(&config),
        Command::Saves(command) => manage_saves(&config, command),
        Command::InitConfig { force } => {
            if cli.config.exists() && !force {
                bail!(
                    "{} already exists (use --force to overwrite)",
                    cli.config.display()
                );
            }
            config.save_to_path(&cli.config)?;
            println!("wrote {}", cli.config.display());
            Ok(())
        }
    }
}

fn simulate(config: &SimConfig, args: SimulateArgs) -> Result<()> {
    let repo = DirectorySaveRepository::new(&config.saves_dir);

    let mut world = match &args.resume {
        Some(slot) => {
            let mut world = repo.load(slot)?;
            world.engine.set_config(config.growth);
            world
        }
        None => {
            let seed = args.seed.or(config.world_seed).unwrap_or_else(|| {
                let seed = rand::random::<u32>() as u64;
                warn!(seed, "No world seed configured; picked one at random");
                seed
            });
            let content = load_pack_content_lenient(&config.content_packs_dir);
            World::generate_with_species(
                Seed::new(seed),
                args.width.unwrap_or(config.width),
                args.height.unwrap_or(config.height),
                &content.species_with_builtins(),
            )
            .with_clock(config.clock())
            .with_growth_config(config.growth)
            .with_profile(config.profile)
        }
    };

    let ticks = args.ticks.unwrap_or(config.ticks);
    info!(seed = %world.seed(), ticks, "simulation starting");

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for _ in 0..ticks {
        let messages = world.tick();
        let tick = world.clock.tick;
        for message in messages {
            if args.json {
                serde_json::to_writer(&mut out, &serde_json::json!({
                    "tick": tick,
                    "message": message,
                }))?;
                writeln!(out)?;
            } else {
                writeln!(out, "[{:>6}] {}", tick.0, message.text)?;
            }
        }
    }

    if !args.json {
        writeln!(
            out,
            "tick {} ({}, day {}): {} plants across {} chunks, weather {}",
            world.clock.tick.0,
            world.clock.season(),
            world.clock.day(),
            world.plant_count(),
            world.chunks.len(),
            world.weather.state
        )?;
        if let Some(line) = world.listen(ChunkKey::new(0, 0)) {
            writeln!(out, "{line}")?;
        }
    }
    out.flush()?;

    if let Some(slot) = &args.save {
        let summary = repo.save(slot, &world)?;
        eprintln!("saved slot '{}' at tick {}", summary.slot, summary.tick);
    }
    Ok(())
}

fn loot(config: &SimConfig, args: LootArgs) -> Result<()> {
    let seed = Seed::new(args.seed);
    let output = match &args.table {
        Some(name) => {
            let content = load_pack_content_lenient(&config.content_packs_dir);
            let table = content
                .loot_tables
                .get(name)
                .with_context(|| format!("Loot table '{name}' not found in content packs"))?;
            let (drops, next_seed) = table.roll(seed, args.difficulty);
            serde_json::json!({ "drops": drops, "nextSeed": next_seed })
        }
        None => serde_json::to_value(roll_loot(
            seed,
            args.base_chance,
            args.rarity,
            args.difficulty,
        ))?,
    };
    println!("{output}");
    Ok(())
}

fn species(config: &SimConfig) -> Result<()> {
    let content = load_pack_content_lenient(&config.content_packs_dir);
    for def in content.species_with_builtins() {
        let parts: Vec<&str> = def
            .part_definitions()
            .iter()
            .map(|part| part.name.as_str())
            .collect();
        println!(
            "{:<20} {:<20} hp {:>5.1}  parts [{}]",
            def.id,
            def.name,
            def.hp,
            parts.join(", ")
        );
    }
    Ok(())
}

fn manage_saves(config: &SimConfig, command: SavesCommand) -> Result<()> {
    let repo = DirectorySaveRepository::new(&config.saves_dir);
    match command {
        SavesCommand::List => {
            let summaries = repo.list_save_summaries()?;
            if summaries.is_empty() {
                println!("no saves under {}", repo.root().display());
            }
            for summary in summaries {
                println!(
                    "{:<16} seed {:>10}  tick {:>8}  {:<6}  {} plants  saved {}",
                    summary.slot,
                    summary.seed,
                    summary.tick,
                    summary.season,
                    summary.plants,
                    summary.saved_at.format("%Y-%m-%d %H:%M:%S")
                );
            }
        }
        SavesCommand::Delete { slot } => {
            repo.delete(&slot)?;
            println!("deleted slot '{slot}'");
        }
    }
    Ok(())
}
